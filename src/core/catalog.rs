//! Purpose: Own the product catalog and its persistence under one storage key.
//! Exports: `CatalogStore`, `InitOutcome`, `PRODUCTS_STORAGE_KEY`.
//! Role: Single writer of the persisted catalog; used by `Storefront` and the CLI.
//! Invariants: Every mutation writes the whole catalog as one JSON array blob.
//! Invariants: New ids are `max(existing) + 1`, or 1 for an empty catalog.
//! Invariants: An unparsable stored blob is treated as absent and reseeded.
//! Invariants: A failed write leaves the in-memory catalog unchanged.

use crate::core::error::{Error, ErrorKind};
use crate::core::product::{Product, ProductDraft, seed_products};
use crate::core::storage::Storage;

pub const PRODUCTS_STORAGE_KEY: &str = "prestige_products";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InitOutcome {
    Loaded,
    Seeded,
    Reseeded,
}

#[derive(Debug)]
pub struct CatalogStore<S: Storage> {
    storage: S,
    key: String,
    products: Vec<Product>,
}

impl<S: Storage> CatalogStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, PRODUCTS_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            products: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    pub fn initialize(&mut self) -> Result<InitOutcome, Error> {
        match self.load() {
            Ok(Some(products)) => {
                tracing::debug!(count = products.len(), "catalog loaded");
                self.products = products;
                Ok(InitOutcome::Loaded)
            }
            Ok(None) => {
                self.commit(seed_products())?;
                tracing::info!(count = self.products.len(), "catalog seeded");
                Ok(InitOutcome::Seeded)
            }
            Err(err) if err.kind() == ErrorKind::Corrupt => {
                tracing::warn!(error = %err, "stored catalog is unreadable; reseeding defaults");
                self.commit(seed_products())?;
                Ok(InitOutcome::Reseeded)
            }
            Err(err) => Err(err),
        }
    }

    /// Reads the stored catalog without touching in-memory state.
    pub fn load(&self) -> Result<Option<Vec<Product>>, Error> {
        let Some(blob) = self.storage.get_item(&self.key)? else {
            return Ok(None);
        };
        serde_json::from_str::<Vec<Product>>(&blob)
            .map(Some)
            .map_err(|err| {
                Error::new(ErrorKind::Corrupt)
                    .with_message("stored catalog is not a valid product list")
                    .with_key(&self.key)
                    .with_source(err)
            })
    }

    pub fn save(&mut self) -> Result<(), Error> {
        let blob = encode(&self.products)?;
        self.storage.set_item(&self.key, &blob)
    }

    /// `max(existing) + 1`, or 1 when empty. Fails once ids are exhausted.
    pub fn next_id(&self) -> Result<u64, Error> {
        let Some(max) = self.products.iter().map(|product| product.id).max() else {
            return Ok(1);
        };
        max.checked_add(1).ok_or_else(|| {
            Error::new(ErrorKind::Corrupt)
                .with_message(format!("product id {max} leaves no room for a new id"))
                .with_key(&self.key)
        })
    }

    pub fn create(&mut self, draft: ProductDraft) -> Result<Product, Error> {
        let product = draft.into_product(self.next_id()?);
        let mut products = self.products.clone();
        products.push(product.clone());
        self.commit(products)?;
        tracing::info!(id = product.id, name = %product.name, "product created");
        Ok(product)
    }

    pub fn update(&mut self, id: u64, draft: ProductDraft) -> Result<Product, Error> {
        let index = self.index_of(id)?;
        let product = draft.into_product(id);
        let mut products = self.products.clone();
        products[index] = product.clone();
        self.commit(products)?;
        tracing::info!(id, "product updated");
        Ok(product)
    }

    pub fn delete(&mut self, id: u64) -> Result<Product, Error> {
        let index = self.index_of(id)?;
        let mut products = self.products.clone();
        let removed = products.remove(index);
        self.commit(products)?;
        tracing::info!(id, "product deleted");
        Ok(removed)
    }

    /// Drops the stored catalog and seeds the defaults again.
    pub fn reset(&mut self) -> Result<(), Error> {
        self.storage.remove_item(&self.key)?;
        self.commit(seed_products())
    }

    // In-memory state only changes after the write succeeds.
    fn commit(&mut self, products: Vec<Product>) -> Result<(), Error> {
        let blob = encode(&products)?;
        self.storage.set_item(&self.key, &blob)?;
        self.products = products;
        Ok(())
    }

    fn index_of(&self, id: u64) -> Result<usize, Error> {
        self.products
            .iter()
            .position(|product| product.id == id)
            .ok_or_else(|| {
                Error::new(ErrorKind::NotFound).with_message(format!("no product with id {id}"))
            })
    }
}

fn encode(products: &[Product]) -> Result<String, Error> {
    serde_json::to_string(products).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode catalog")
            .with_source(err)
    })
}

#[cfg(test)]
mod tests {
    use super::{CatalogStore, InitOutcome, PRODUCTS_STORAGE_KEY};
    use crate::core::error::{Error, ErrorKind};
    use crate::core::product::{DEFAULT_IMAGE, ProductDraft};
    use crate::core::storage::{MemoryStorage, Storage};

    // Reads pass through; writes fail once `fail_writes` is set.
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        fail_writes: bool,
    }

    impl Storage for FlakyStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
            self.inner.get_item(key)
        }

        fn set_item(&mut self, key: &str, value: &str) -> Result<(), Error> {
            if self.fail_writes {
                return Err(Error::new(ErrorKind::Io).with_message("disk full"));
            }
            self.inner.set_item(key, value)
        }

        fn remove_item(&mut self, key: &str) -> Result<(), Error> {
            self.inner.remove_item(key)
        }
    }

    fn empty_store() -> CatalogStore<MemoryStorage> {
        let mut storage = MemoryStorage::new();
        storage.set_item(PRODUCTS_STORAGE_KEY, "[]").expect("set");
        let mut store = CatalogStore::new(storage);
        assert_eq!(store.initialize().expect("init"), InitOutcome::Loaded);
        store
    }

    #[test]
    fn next_id_is_one_for_empty_catalog() {
        assert_eq!(empty_store().next_id().expect("id"), 1);
    }

    #[test]
    fn next_id_follows_max_not_len() {
        let mut store = empty_store();
        for name in ["a", "b", "c", "d", "e"] {
            store.create(ProductDraft::new(name, 1.0)).expect("create");
        }
        store.delete(3).expect("delete");
        store.delete(4).expect("delete");
        let ids: Vec<u64> = store.products().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 5]);
        assert_eq!(store.next_id().expect("id"), 6);
    }

    #[test]
    fn initialize_seeds_and_persists_when_absent() {
        let mut store = CatalogStore::new(MemoryStorage::new());
        assert_eq!(store.initialize().expect("init"), InitOutcome::Seeded);
        assert_eq!(store.len(), 7);
        let persisted = store.load().expect("load").expect("present");
        assert_eq!(persisted, store.products());

        assert_eq!(store.initialize().expect("init"), InitOutcome::Loaded);
        assert_eq!(store.len(), 7);
    }

    #[test]
    fn initialize_reseeds_corrupt_blob() {
        let mut storage = MemoryStorage::new();
        storage.set_item(PRODUCTS_STORAGE_KEY, "{not json").expect("set");
        let mut store = CatalogStore::new(storage);
        assert_eq!(store.initialize().expect("init"), InitOutcome::Reseeded);
        assert_eq!(store.len(), 7);
        assert!(store.load().expect("load").is_some());
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut store = empty_store();
        store
            .create(ProductDraft::new("Hat", 19.99).with_description("A hat"))
            .expect("create");
        store
            .create(ProductDraft::new("Scarf", 7.5).with_image("img/scarf.webp"))
            .expect("create");
        store.save().expect("save");
        let loaded = store.load().expect("load").expect("present");
        assert_eq!(loaded, store.products());
    }

    #[test]
    fn create_defaults_image_and_appends() {
        let mut store = CatalogStore::new(MemoryStorage::new());
        store.initialize().expect("init");
        let created = store
            .create(ProductDraft::parse("Hat", "19.99", "", "A hat").expect("draft"))
            .expect("create");
        assert_eq!(created.id, 8);
        assert_eq!(created.image, DEFAULT_IMAGE);
        assert_eq!(store.load().expect("load").expect("present").len(), 8);
    }

    #[test]
    fn update_and_delete_unknown_id_are_not_found() {
        let mut store = empty_store();
        let err = store
            .update(42, ProductDraft::new("x", 1.0))
            .expect_err("err");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = store.delete(42).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(store.is_empty());
    }

    #[test]
    fn update_replaces_in_place() {
        let mut store = CatalogStore::new(MemoryStorage::new());
        store.initialize().expect("init");
        store
            .update(
                2,
                ProductDraft::new("Camiseta Nueva", 22.5)
                    .with_image("img/new.webp")
                    .with_description("Nueva camiseta"),
            )
            .expect("update");
        let updated = store.get(2).expect("product");
        assert_eq!(updated.name, "Camiseta Nueva");
        assert_eq!(store.products()[1].id, 2);
        assert_eq!(store.len(), 7);
    }

    #[test]
    fn reset_restores_seed() {
        let mut store = CatalogStore::new(MemoryStorage::new());
        store.initialize().expect("init");
        store.delete(1).expect("delete");
        store.reset().expect("reset");
        assert_eq!(store.len(), 7);
        assert_eq!(store.get(1).map(|p| p.name.as_str()), Some("Chaqueta Vintage"));
    }

    #[test]
    fn next_id_refuses_to_overflow() {
        let mut storage = MemoryStorage::new();
        let blob = format!(
            r#"[{{"id":{},"name":"Max","price":1.0,"image":"a","description":"b"}}]"#,
            u64::MAX
        );
        storage.set_item(PRODUCTS_STORAGE_KEY, &blob).expect("set");
        let mut store = CatalogStore::new(storage);
        assert_eq!(store.initialize().expect("init"), InitOutcome::Loaded);

        let err = store.next_id().expect_err("overflow");
        assert_eq!(err.kind(), ErrorKind::Corrupt);
        let err = store
            .create(ProductDraft::new("Hat", 1.0))
            .expect_err("no id left");
        assert_eq!(err.kind(), ErrorKind::Corrupt);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn failed_write_keeps_memory_and_storage_in_step() {
        let mut store = CatalogStore::new(FlakyStorage::default());
        store.initialize().expect("init");
        let before = store.products().to_vec();

        let mut storage = store.into_storage();
        storage.fail_writes = true;
        let mut store = CatalogStore::new(storage);
        store.initialize().expect("load");

        let err = store
            .create(ProductDraft::new("Hat", 19.99))
            .expect_err("create");
        assert_eq!(err.kind(), ErrorKind::Io);
        store
            .update(2, ProductDraft::new("Camiseta", 1.0))
            .expect_err("update");
        store.delete(1).expect_err("delete");

        assert_eq!(store.products(), before.as_slice());
        assert_eq!(store.load().expect("load").expect("present"), before);
    }
}

// Key-value storage backends standing in for browser local storage.
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use libc::{EACCES, EPERM};

use crate::core::error::{Error, ErrorKind, io_error_kind};
use crate::storage_paths::{KeyResolveError, resolve_key_path};

/// Whole-value key-value store. Every `set_item` replaces the value atomically.
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), Error>;
    fn remove_item(&mut self, key: &str) -> Result<(), Error>;
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), Error> {
        self.items.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under `dir`. Writers serialize on a sidecar
/// lock file and publish by renaming a fully written temp file.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, Error> {
        resolve_key_path(key, &self.dir).map_err(|err| map_key_error(err, key))
    }

    fn lock(&self, path: &Path) -> Result<WriteLock, Error> {
        let lock_path = sidecar(path, "lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)
            .map_err(|err| {
                Error::new(io_error_kind(&err))
                    .with_path(&lock_path)
                    .with_source(err)
            })?;
        file.lock_exclusive().map_err(|err| {
            Error::new(lock_error_kind(&err))
                .with_message("failed to lock storage key")
                .with_path(&lock_path)
                .with_source(err)
        })?;
        Ok(WriteLock { file })
    }
}

struct WriteLock {
    file: File,
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        let path = self.path_for(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(Error::new(io_error_kind(&err))
                    .with_message("failed to read storage key")
                    .with_key(key)
                    .with_path(&path)
                    .with_source(err));
            }
        };
        String::from_utf8(bytes).map(Some).map_err(|err| {
            Error::new(ErrorKind::Corrupt)
                .with_message("stored value is not valid UTF-8")
                .with_key(key)
                .with_path(&path)
                .with_source(err)
        })
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), Error> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|err| {
            Error::new(io_error_kind(&err))
                .with_message("failed to create storage directory")
                .with_path(&self.dir)
                .with_source(err)
        })?;

        let _lock = self.lock(&path)?;
        let tmp = sidecar(&path, "tmp");
        write_file(&tmp, value)?;
        fs::rename(&tmp, &path).map_err(|err| {
            Error::new(io_error_kind(&err))
                .with_message("failed to publish storage key")
                .with_key(key)
                .with_path(&path)
                .with_source(err)
        })?;
        tracing::debug!(key, path = %path.display(), bytes = value.len(), "storage key written");
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), Error> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::new(io_error_kind(&err))
                .with_message("failed to remove storage key")
                .with_key(key)
                .with_path(&path)
                .with_source(err)),
        }
    }
}

fn write_file(path: &Path, value: &str) -> Result<(), Error> {
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)
        .map_err(|err| Error::new(io_error_kind(&err)).with_path(path).with_source(err))?;
    file.write_all(value.as_bytes())
        .map_err(|err| Error::new(ErrorKind::Io).with_path(path).with_source(err))?;
    file.sync_all()
        .map_err(|err| Error::new(ErrorKind::Io).with_path(path).with_source(err))?;
    Ok(())
}

fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

fn lock_error_kind(err: &io::Error) -> ErrorKind {
    let errno = err.raw_os_error().unwrap_or_default();
    if errno == EACCES || errno == EPERM {
        return ErrorKind::Permission;
    }
    match err.kind() {
        io::ErrorKind::WouldBlock => ErrorKind::Busy,
        io::ErrorKind::PermissionDenied => ErrorKind::Permission,
        _ => ErrorKind::Io,
    }
}

fn map_key_error(err: KeyResolveError, key: &str) -> Error {
    match err {
        KeyResolveError::Empty => {
            Error::new(ErrorKind::Usage).with_message("storage key must not be empty")
        }
        KeyResolveError::ContainsPathSeparator => Error::new(ErrorKind::Usage)
            .with_message("storage key must not contain path separators")
            .with_key(key),
    }
}

#[cfg(test)]
mod tests {
    use super::{FileStorage, MemoryStorage, Storage};
    use crate::core::catalog::{CatalogStore, InitOutcome};
    use crate::core::error::ErrorKind;

    #[test]
    fn memory_storage_set_get_remove() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get_item("k").expect("get"), None);
        storage.set_item("k", "[1]").expect("set");
        assert_eq!(storage.get_item("k").expect("get").as_deref(), Some("[1]"));
        storage.set_item("k", "[2]").expect("set");
        assert_eq!(storage.len(), 1);
        storage.remove_item("k").expect("remove");
        assert!(storage.is_empty());
    }

    #[test]
    fn file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("storage");

        let mut first = FileStorage::new(&root);
        first.set_item("prestige_products", "[]").expect("set");

        let second = FileStorage::new(&root);
        assert_eq!(
            second.get_item("prestige_products").expect("get").as_deref(),
            Some("[]")
        );
        assert!(root.join("prestige_products.json").exists());
        assert!(!root.join("prestige_products.json.tmp").exists());
    }

    #[test]
    fn file_storage_missing_key_is_none_and_remove_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut storage = FileStorage::new(dir.path());
        assert_eq!(storage.get_item("absent").expect("get"), None);
        storage.remove_item("absent").expect("remove");
    }

    #[test]
    fn file_storage_rejects_path_like_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut storage = FileStorage::new(dir.path());
        let err = storage.set_item("../escape", "x").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn file_storage_reports_non_utf8_value_as_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("prestige_products.json"), [0xff, 0xfe, 0x00])
            .expect("write");
        let storage = FileStorage::new(dir.path());
        let err = storage.get_item("prestige_products").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Corrupt);
        assert_eq!(err.key(), Some("prestige_products"));
    }

    #[test]
    fn catalog_over_non_utf8_file_is_reseeded() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("prestige_products.json"), [0xff, 0xfe, 0x00])
            .expect("write");
        let mut catalog = CatalogStore::new(FileStorage::new(dir.path()));
        assert_eq!(catalog.initialize().expect("init"), InitOutcome::Reseeded);
        assert_eq!(catalog.len(), 7);
        let stored = std::fs::read_to_string(dir.path().join("prestige_products.json"))
            .expect("read");
        assert!(stored.contains("Chaqueta Vintage"));
    }

    #[test]
    fn lock_errors_map_to_expected_kinds() {
        let err = std::io::Error::from_raw_os_error(libc::EWOULDBLOCK);
        assert_eq!(super::lock_error_kind(&err), ErrorKind::Busy);

        let err = std::io::Error::from_raw_os_error(libc::EACCES);
        assert_eq!(super::lock_error_kind(&err), ErrorKind::Permission);

        let err = std::io::Error::from_raw_os_error(libc::EBADF);
        assert_eq!(super::lock_error_kind(&err), ErrorKind::Io);
    }
}

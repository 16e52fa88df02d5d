//! Purpose: Wire catalog, cart, forms, overlays, and timers behind typed UI events.
//! Exports: `Storefront`, `StorefrontConfig`, `UiEvent`, `ConfirmAction`.
//! Role: The single owner of storefront state; hosts call `dispatch` and `advance`.
//! Invariants: Every catalog mutation is persisted and followed by a full grid render.
//! Invariants: Every cart mutation is followed by a full cart render.
//! Invariants: Unknown product ids from the page are silent no-ops, never errors.
//! Invariants: Deferred work runs only from `advance`, in due order, and is never cancelled.

use std::time::Duration;

use crate::core::cart::{Cart, format_total};
use crate::core::catalog::{CatalogStore, InitOutcome, PRODUCTS_STORAGE_KEY};
use crate::core::error::{Error, ErrorKind};
use crate::core::product::{Product, ProductDraft};
use crate::core::reveal::{
    GALLERY_REVEAL_THRESHOLD, PRODUCT_REVEAL_THRESHOLD, RevealObserver, SECTION_REVEAL_THRESHOLD,
};
use crate::core::storage::Storage;
use crate::core::timer::Timers;
use crate::core::validate::{
    ErrorSlots, Field, FormKind, FormValues, validate_field, validate_form,
};
use crate::page::{Page, SubmitMode};
use crate::render::{MountPoints, render_cart, render_products};
use crate::ui::confirm::{ConfirmDialog, PendingConfirm};
use crate::ui::toast::{TOAST_EXIT, TOAST_VISIBLE, ToastId, Toasts};

pub const CART_EMPTY_MESSAGE: &str = "⚠ Your cart is empty";
const REVEAL_SECTIONS: [&str; 2] = ["about", "contact"];

#[derive(Clone, Debug)]
pub struct StorefrontConfig {
    pub storage_key: String,
    pub mounts: MountPoints,
    pub toast_visible: Duration,
    pub toast_exit: Duration,
    pub checkout_clear_delay: Duration,
    pub contact_clear_delay: Duration,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            storage_key: PRODUCTS_STORAGE_KEY.to_string(),
            mounts: MountPoints::default(),
            toast_visible: TOAST_VISIBLE,
            toast_exit: TOAST_EXIT,
            checkout_clear_delay: Duration::from_secs(5),
            contact_clear_delay: Duration::from_secs(5),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum UiEvent {
    Input { field: Field, value: String },
    Blur(Field),
    Submit(FormKind),
    EditProduct(u64),
    CancelEdit,
    DeleteProduct(u64),
    AddToCart(u64),
    RemoveFromCart(usize),
    CartLinkClicked,
    CheckoutClicked,
    ConfirmAccepted,
    ConfirmCancelled,
    OverlayClicked,
    Intersect { element: String, ratio: f64 },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfirmAction {
    DeleteProduct(u64),
}

// Each timer carries only what it needs to act when it fires.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Deferred {
    ToastExit(ToastId),
    ToastRemove(ToastId),
    ClearCheckout,
    ClearContactMessage,
}

#[derive(Debug)]
pub struct Storefront<S: Storage> {
    config: StorefrontConfig,
    catalog: CatalogStore<S>,
    cart: Cart,
    editing: Option<u64>,
    values: FormValues,
    errors: ErrorSlots,
    page: Page,
    toasts: Toasts,
    confirm: ConfirmDialog<ConfirmAction>,
    timers: Timers<Deferred>,
    product_reveal: RevealObserver,
    gallery_reveal: RevealObserver,
    section_reveal: RevealObserver,
}

impl<S: Storage> Storefront<S> {
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, StorefrontConfig::default())
    }

    pub fn with_config(storage: S, config: StorefrontConfig) -> Self {
        let catalog = CatalogStore::with_key(storage, config.storage_key.clone());
        Self {
            config,
            catalog,
            cart: Cart::new(),
            editing: None,
            values: FormValues::new(),
            errors: ErrorSlots::new(),
            page: Page::new(),
            toasts: Toasts::new(),
            confirm: ConfirmDialog::new(),
            timers: Timers::new(),
            product_reveal: RevealObserver::new(PRODUCT_REVEAL_THRESHOLD),
            gallery_reveal: RevealObserver::new(GALLERY_REVEAL_THRESHOLD),
            section_reveal: RevealObserver::new(SECTION_REVEAL_THRESHOLD),
        }
    }

    /// Loads (or seeds) the catalog and renders the initial page.
    pub fn start(&mut self) -> Result<InitOutcome, Error> {
        let outcome = self.catalog.initialize()?;
        self.rerender_products();
        self.rerender_cart();
        self.section_reveal.observe_all(REVEAL_SECTIONS);
        Ok(outcome)
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn catalog(&self) -> &CatalogStore<S> {
        &self.catalog
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    pub fn errors(&self) -> &ErrorSlots {
        &self.errors
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn editing(&self) -> Option<u64> {
        self.editing
    }

    pub fn confirmation(&self) -> Option<&PendingConfirm<ConfirmAction>> {
        self.confirm.pending()
    }

    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    pub fn is_revealed(&self, element: &str) -> bool {
        self.product_reveal.is_revealed(element)
            || self.gallery_reveal.is_revealed(element)
            || self.section_reveal.is_revealed(element)
    }

    pub fn observe_gallery<I, E>(&mut self, items: I)
    where
        I: IntoIterator<Item = E>,
        E: Into<String>,
    {
        self.gallery_reveal.observe_all(items);
    }

    pub fn dispatch(&mut self, event: UiEvent) -> Result<(), Error> {
        match event {
            UiEvent::Input { field, value } => {
                self.values.set(field, value);
                Ok(())
            }
            UiEvent::Blur(field) => {
                validate_field(field, &self.values, &mut self.errors);
                Ok(())
            }
            UiEvent::Submit(FormKind::Product) => self.submit_product(),
            UiEvent::Submit(FormKind::Checkout) => {
                self.submit_checkout();
                Ok(())
            }
            UiEvent::Submit(FormKind::Contact) => {
                self.submit_contact();
                Ok(())
            }
            UiEvent::EditProduct(id) => {
                self.edit_product(id);
                Ok(())
            }
            UiEvent::CancelEdit => {
                self.cancel_edit();
                Ok(())
            }
            UiEvent::DeleteProduct(id) => self.request_delete(id),
            UiEvent::AddToCart(id) => {
                let Some(product) = self.catalog.get(id) else {
                    tracing::debug!(id, "add to cart ignored; unknown product");
                    return Ok(());
                };
                let (name, price) = (product.name.clone(), product.price);
                self.add_to_cart(name, price);
                Ok(())
            }
            UiEvent::RemoveFromCart(index) => self.remove_from_cart(index),
            UiEvent::CartLinkClicked => {
                self.toggle_cart();
                Ok(())
            }
            UiEvent::CheckoutClicked => {
                self.show_checkout();
                Ok(())
            }
            UiEvent::ConfirmAccepted => self.accept_confirmation(),
            UiEvent::ConfirmCancelled | UiEvent::OverlayClicked => {
                self.confirm.cancel();
                Ok(())
            }
            UiEvent::Intersect { element, ratio } => {
                let revealed = self.product_reveal.intersect(&element, ratio)
                    || self.gallery_reveal.intersect(&element, ratio)
                    || self.section_reveal.intersect(&element, ratio);
                if revealed {
                    tracing::debug!(element = %element, ratio, "element revealed");
                }
                Ok(())
            }
        }
    }

    /// Moves the virtual clock forward, firing every timer that falls due.
    pub fn advance(&mut self, by: Duration) {
        let until = self.timers.now() + by;
        while let Some(task) = self.timers.pop_due(until) {
            self.run_deferred(task);
        }
        self.timers.advance_to(until);
    }

    pub fn notify(&mut self, message: impl Into<String>) -> ToastId {
        let id = self.toasts.push(message);
        self.timers
            .schedule(self.config.toast_visible, Deferred::ToastExit(id));
        id
    }

    pub fn add_to_cart(&mut self, name: impl Into<String>, price: f64) {
        self.cart.add(name, price);
        self.rerender_cart();
        self.page.cart_visible = true;
        self.notify("✓ Product added to cart");
    }

    pub fn remove_from_cart(&mut self, index: usize) -> Result<(), Error> {
        let removed = self.cart.remove(index)?;
        tracing::debug!(index, name = %removed.name, "cart item removed");
        self.rerender_cart();
        if self.cart.is_empty() {
            self.page.cart_visible = false;
        }
        self.notify("Product removed from cart");
        Ok(())
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.rerender_cart();
        self.page.cart_visible = false;
        self.page.checkout_visible = false;
    }

    pub fn edit_product(&mut self, id: u64) {
        let Some(product) = self.catalog.get(id).cloned() else {
            tracing::debug!(id, "edit ignored; unknown product");
            return;
        };
        self.editing = Some(id);
        fill_product_form(&mut self.values, &product);
        self.page.submit_mode = SubmitMode::Update;
        self.page.scroll_to(FormKind::Product.form_id());
        self.notify("📝 Edit mode enabled");
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.values.reset(FormKind::Product);
        self.page.submit_mode = SubmitMode::Create;
        self.errors.clear_form(FormKind::Product);
    }

    /// Opens the delete confirmation; unknown ids show nothing.
    pub fn request_delete(&mut self, id: u64) -> Result<(), Error> {
        let Some(product) = self.catalog.get(id) else {
            tracing::debug!(id, "delete ignored; unknown product");
            return Ok(());
        };
        let message = format!("Are you sure you want to delete \"{}\"?", product.name);
        self.confirm.open(message, ConfirmAction::DeleteProduct(id))
    }

    fn accept_confirmation(&mut self) -> Result<(), Error> {
        let Some(action) = self.confirm.accept() else {
            return Ok(());
        };
        match action {
            ConfirmAction::DeleteProduct(id) => match self.catalog.delete(id) {
                Ok(_) => {
                    if self.editing == Some(id) {
                        self.cancel_edit();
                    }
                    self.rerender_products();
                    self.notify("✓ Product deleted");
                    Ok(())
                }
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    tracing::debug!(id, "confirmed delete found nothing to remove");
                    Ok(())
                }
                Err(err) => Err(err),
            },
        }
    }

    fn submit_product(&mut self) -> Result<(), Error> {
        if !validate_form(FormKind::Product, &self.values, &mut self.errors) {
            return Ok(());
        }
        let draft = ProductDraft::parse(
            self.values.get(Field::ProductName),
            self.values.get(Field::ProductPrice),
            self.values.get(Field::ProductImage),
            self.values.get(Field::ProductDescription),
        )?;

        match self.editing {
            Some(id) => match self.catalog.update(id, draft) {
                Ok(_) => {
                    self.rerender_products();
                    self.notify("✓ Product updated successfully");
                }
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    tracing::debug!(id, "update ignored; product no longer exists");
                }
                Err(err) => return Err(err),
            },
            None => {
                self.catalog.create(draft)?;
                self.rerender_products();
                self.notify("✓ Product added successfully!");
            }
        }

        self.cancel_edit();
        self.page.scroll_to(&self.config.mounts.product_grid);
        Ok(())
    }

    fn submit_checkout(&mut self) {
        if !validate_form(FormKind::Checkout, &self.values, &mut self.errors) {
            return;
        }
        if self.cart.is_empty() {
            self.notify(CART_EMPTY_MESSAGE);
            return;
        }
        self.page.payment_message = format!(
            "Thank you, {}! Your purchase of {}€ has been processed. We will send an email to {}.",
            self.values.trimmed(Field::CheckoutName),
            format_total(self.cart.total()),
            self.values.trimmed(Field::CheckoutEmail),
        );
        self.values.reset(FormKind::Checkout);
        self.errors.clear_form(FormKind::Checkout);
        self.timers
            .schedule(self.config.checkout_clear_delay, Deferred::ClearCheckout);
    }

    fn submit_contact(&mut self) {
        if !validate_form(FormKind::Contact, &self.values, &mut self.errors) {
            return;
        }
        self.page.contact_message = format!(
            "Thank you, {}! We have received your message. We will reply soon.",
            self.values.trimmed(Field::ContactName),
        );
        self.values.reset(FormKind::Contact);
        self.errors.clear_form(FormKind::Contact);
        self.timers.schedule(
            self.config.contact_clear_delay,
            Deferred::ClearContactMessage,
        );
    }

    fn toggle_cart(&mut self) {
        if self.cart.is_empty() {
            self.notify(CART_EMPTY_MESSAGE);
            return;
        }
        self.page.cart_visible = !self.page.cart_visible;
    }

    fn show_checkout(&mut self) {
        if self.cart.is_empty() {
            self.notify(CART_EMPTY_MESSAGE);
            return;
        }
        self.page.cart_visible = false;
        self.page.checkout_visible = true;
        self.page.scroll_to("checkout");
    }

    fn run_deferred(&mut self, task: Deferred) {
        match task {
            Deferred::ToastExit(id) => {
                if self.toasts.begin_exit(id) {
                    self.timers
                        .schedule(self.config.toast_exit, Deferred::ToastRemove(id));
                }
            }
            Deferred::ToastRemove(id) => {
                self.toasts.remove(id);
            }
            Deferred::ClearCheckout => {
                self.clear_cart();
                self.page.payment_message.clear();
            }
            Deferred::ClearContactMessage => {
                self.page.contact_message.clear();
            }
        }
    }

    fn rerender_products(&mut self) {
        let cards = render_products(
            self.catalog.products(),
            &self.config.mounts,
            &mut self.page,
        );
        self.product_reveal.observe_all(cards);
    }

    fn rerender_cart(&mut self) {
        render_cart(&self.cart, &self.config.mounts, &mut self.page);
    }
}

fn fill_product_form(values: &mut FormValues, product: &Product) {
    values.set(Field::ProductName, product.name.clone());
    values.set(Field::ProductPrice, product.price.to_string());
    values.set(Field::ProductImage, product.image.clone());
    values.set(Field::ProductDescription, product.description.clone());
}

#[cfg(test)]
mod tests {
    use super::{CART_EMPTY_MESSAGE, ConfirmAction, Storefront, UiEvent};
    use crate::core::storage::MemoryStorage;
    use crate::core::validate::{Field, FormKind};
    use crate::page::SubmitMode;
    use std::time::Duration;

    fn started() -> Storefront<MemoryStorage> {
        let mut store = Storefront::new(MemoryStorage::new());
        store.start().expect("start");
        store
    }

    fn type_into(store: &mut Storefront<MemoryStorage>, field: Field, value: &str) {
        store
            .dispatch(UiEvent::Input {
                field,
                value: value.to_string(),
            })
            .expect("input");
    }

    #[test]
    fn toast_lives_three_seconds_plus_exit() {
        let mut store = started();
        store.notify("hello");
        store.advance(Duration::from_millis(2_999));
        assert_eq!(store.toasts().messages(), vec!["hello"]);
        store.advance(Duration::from_millis(1));
        assert_eq!(store.toasts().active().len(), 1);
        store.advance(Duration::from_millis(399));
        assert_eq!(store.toasts().active().len(), 1);
        store.advance(Duration::from_millis(1));
        assert!(store.toasts().active().is_empty());
        assert_eq!(store.pending_timers(), 0);
    }

    #[test]
    fn edit_fills_form_and_submit_updates() {
        let mut store = started();
        store.dispatch(UiEvent::EditProduct(3)).expect("edit");
        assert_eq!(store.editing(), Some(3));
        assert_eq!(store.values().get(Field::ProductName), "Sudadera");
        assert_eq!(store.values().get(Field::ProductPrice), "40");
        assert_eq!(store.page().submit_mode, SubmitMode::Update);
        assert_eq!(store.page().scrolled_to.as_deref(), Some("add-product-form"));

        type_into(&mut store, Field::ProductPrice, "45.50");
        store
            .dispatch(UiEvent::Submit(FormKind::Product))
            .expect("submit");

        assert_eq!(store.editing(), None);
        assert_eq!(store.page().submit_mode, SubmitMode::Create);
        assert_eq!(store.catalog().get(3).map(|p| p.price), Some(45.5));
        assert_eq!(store.catalog().len(), 7);
        assert_eq!(store.values().get(Field::ProductName), "");
        let grid = store.page().mount("product-grid").expect("grid");
        assert!(grid.contains("45.5€"));
    }

    #[test]
    fn edit_unknown_product_is_noop() {
        let mut store = started();
        store.dispatch(UiEvent::EditProduct(99)).expect("edit");
        assert_eq!(store.editing(), None);
        assert!(store.toasts().active().is_empty());
    }

    #[test]
    fn invalid_product_submit_shows_all_errors_and_keeps_catalog() {
        let mut store = started();
        type_into(&mut store, Field::ProductName, "Ha");
        type_into(&mut store, Field::ProductPrice, "12.345");
        store
            .dispatch(UiEvent::Submit(FormKind::Product))
            .expect("submit");
        assert_eq!(store.catalog().len(), 7);
        assert_eq!(store.errors().get(Field::ProductName), "min 3 chars");
        assert_eq!(store.errors().get(Field::ProductPrice), "invalid price");
        assert_eq!(store.errors().get(Field::ProductImage), "image URL required");
        assert_eq!(
            store.errors().get(Field::ProductDescription),
            "description required"
        );
    }

    #[test]
    fn blur_validates_single_field() {
        let mut store = started();
        type_into(&mut store, Field::ContactEmail, "a@b");
        store
            .dispatch(UiEvent::Blur(Field::ContactEmail))
            .expect("blur");
        assert_eq!(store.errors().get(Field::ContactEmail), "invalid email");
        assert_eq!(store.errors().get(Field::ContactName), "");
    }

    #[test]
    fn delete_flow_requires_confirmation() {
        let mut store = started();
        store.dispatch(UiEvent::DeleteProduct(2)).expect("delete");
        let pending = store.confirmation().expect("dialog");
        assert_eq!(pending.action, ConfirmAction::DeleteProduct(2));
        assert!(pending.message.contains("Camiseta Urbana"));
        assert_eq!(store.catalog().len(), 7);

        store.dispatch(UiEvent::OverlayClicked).expect("overlay");
        assert!(store.confirmation().is_none());
        assert_eq!(store.catalog().len(), 7);

        store.dispatch(UiEvent::DeleteProduct(2)).expect("delete");
        store.dispatch(UiEvent::ConfirmAccepted).expect("accept");
        assert!(store.confirmation().is_none());
        assert_eq!(store.catalog().len(), 6);
        assert!(store.catalog().get(2).is_none());
        assert_eq!(store.toasts().messages(), vec!["✓ Product deleted"]);
    }

    #[test]
    fn cart_link_and_checkout_respect_empty_cart() {
        let mut store = started();
        store.dispatch(UiEvent::CartLinkClicked).expect("click");
        store.dispatch(UiEvent::CheckoutClicked).expect("click");
        assert!(!store.page().cart_visible);
        assert!(!store.page().checkout_visible);
        assert_eq!(
            store.toasts().messages(),
            vec![CART_EMPTY_MESSAGE, CART_EMPTY_MESSAGE]
        );

        store.dispatch(UiEvent::AddToCart(1)).expect("add");
        assert!(store.page().cart_visible);
        store.dispatch(UiEvent::CartLinkClicked).expect("toggle");
        assert!(!store.page().cart_visible);
        store.dispatch(UiEvent::CheckoutClicked).expect("checkout");
        assert!(store.page().checkout_visible);
        assert_eq!(store.page().scrolled_to.as_deref(), Some("checkout"));
    }

    #[test]
    fn removing_last_item_hides_cart() {
        let mut store = started();
        store.dispatch(UiEvent::AddToCart(4)).expect("add");
        store.dispatch(UiEvent::RemoveFromCart(0)).expect("remove");
        assert!(store.cart().is_empty());
        assert!(!store.page().cart_visible);
        assert_eq!(store.page().mount("cart-link"), Some("Cart (0)"));
        assert_eq!(store.page().mount("cart-total"), Some("0.00"));
    }

    #[test]
    fn contact_message_clears_after_delay() {
        let mut store = started();
        type_into(&mut store, Field::ContactName, "Lucía");
        type_into(&mut store, Field::ContactEmail, "lucia@example.com");
        type_into(&mut store, Field::ContactSubject, "Pedido");
        type_into(&mut store, Field::ContactMessage, "¿Tenéis talla M?");
        store
            .dispatch(UiEvent::Submit(FormKind::Contact))
            .expect("submit");
        assert_eq!(
            store.page().contact_message,
            "Thank you, Lucía! We have received your message. We will reply soon."
        );
        assert_eq!(store.values().get(Field::ContactName), "");

        store.advance(Duration::from_millis(4_999));
        assert!(!store.page().contact_message.is_empty());
        store.advance(Duration::from_millis(1));
        assert!(store.page().contact_message.is_empty());
    }

    #[test]
    fn product_cards_reveal_once() {
        let mut store = started();
        let reveal = |store: &mut Storefront<MemoryStorage>, ratio: f64| {
            store
                .dispatch(UiEvent::Intersect {
                    element: "product-1".to_string(),
                    ratio,
                })
                .expect("intersect");
        };
        reveal(&mut store, 0.05);
        assert!(!store.is_revealed("product-1"));
        reveal(&mut store, 0.1);
        assert!(store.is_revealed("product-1"));

        store
            .dispatch(UiEvent::Intersect {
                element: "about".to_string(),
                ratio: 0.15,
            })
            .expect("intersect");
        assert!(!store.is_revealed("about"));
        store
            .dispatch(UiEvent::Intersect {
                element: "about".to_string(),
                ratio: 0.2,
            })
            .expect("intersect");
        assert!(store.is_revealed("about"));
    }
}

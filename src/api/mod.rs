//! Purpose: Define the public Rust API boundary for the storefront core.
//! Exports: Store, storage, validation, rendering, and event types used by hosts and the CLI.
//! Role: Additive-only surface; hosts should not need to reach into `core` paths.
//! Invariants: Everything a host needs to drive a `Storefront` is re-exported here.

pub use crate::core::cart::{Cart, CartItem, format_total};
pub use crate::core::catalog::{CatalogStore, InitOutcome, PRODUCTS_STORAGE_KEY};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::product::{DEFAULT_DESCRIPTION, DEFAULT_IMAGE, Product, ProductDraft};
pub use crate::core::reveal::RevealObserver;
pub use crate::core::storage::{FileStorage, MemoryStorage, Storage};
pub use crate::core::validate::{
    ErrorSlots, Field, FormKind, FormValues, check, validate_field, validate_form,
};
pub use crate::page::{Page, SubmitMode};
pub use crate::render::{MountPoints, MountTarget, format_price, render_cart, render_products};
pub use crate::storefront::{
    CART_EMPTY_MESSAGE, ConfirmAction, Storefront, StorefrontConfig, UiEvent,
};
pub use crate::ui::confirm::PendingConfirm;
pub use crate::ui::toast::{Toast, ToastPhase, Toasts};

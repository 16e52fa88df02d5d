// Transient page overlays: toast notifications and the confirmation modal.
pub mod confirm;
pub mod toast;

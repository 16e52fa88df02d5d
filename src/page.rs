// In-memory page state: mount markup plus the handful of panel flags and
// status texts the storefront toggles outside the rendered mounts.
use std::collections::BTreeMap;

use crate::render::MountTarget;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SubmitMode {
    #[default]
    Create,
    Update,
}

impl SubmitMode {
    pub fn label(self) -> &'static str {
        match self {
            SubmitMode::Create => "Add Product",
            SubmitMode::Update => "Update Product",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Page {
    mounts: BTreeMap<String, String>,
    pub cart_visible: bool,
    pub checkout_visible: bool,
    pub payment_message: String,
    pub contact_message: String,
    pub submit_mode: SubmitMode,
    pub scrolled_to: Option<String>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&self, id: &str) -> Option<&str> {
        self.mounts.get(id).map(String::as_str)
    }

    pub fn mounts(&self) -> &BTreeMap<String, String> {
        &self.mounts
    }

    /// The cancel-edit button exists exactly while the product form is in update mode.
    pub fn cancel_edit_visible(&self) -> bool {
        self.submit_mode == SubmitMode::Update
    }

    pub fn scroll_to(&mut self, element: &str) {
        self.scrolled_to = Some(element.to_string());
    }
}

impl MountTarget for Page {
    fn replace(&mut self, mount: &str, markup: String) {
        self.mounts.insert(mount.to_string(), markup);
    }
}

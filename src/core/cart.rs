// Session-scoped shopping cart. Never persisted.
use serde::Serialize;

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CartItem {
    pub name: String,
    pub price: f64,
}

#[derive(Clone, Debug, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add(&mut self, name: impl Into<String>, price: f64) {
        self.items.push(CartItem {
            name: name.into(),
            price,
        });
    }

    pub fn remove(&mut self, index: usize) -> Result<CartItem, Error> {
        if index >= self.items.len() {
            return Err(Error::new(ErrorKind::NotFound).with_message(format!(
                "cart index {index} out of range (len {})",
                self.items.len()
            )));
        }
        Ok(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    // Recomputed on every read so it cannot drift from the item list.
    // Folds from +0.0 so an empty cart never formats as "-0.00".
    pub fn total(&self) -> f64 {
        self.items.iter().fold(0.0, |acc, item| acc + item.price)
    }
}

pub fn format_total(total: f64) -> String {
    format!("{total:.2}")
}

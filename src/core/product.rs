//! Purpose: Define the persisted `Product` record and its input draft.
//! Exports: `Product`, `ProductDraft`, `seed_products`, default field values.
//! Role: Shared record shape for the catalog store, renderer, and CLI JSON.
//! Invariants: Serialized field names are exactly `id`, `name`, `price`, `image`, `description`.
//! Invariants: Drafts never carry an id; ids are assigned by the catalog store.

use serde::{Deserialize, Serialize};

use crate::core::error::{Error, ErrorKind};

pub const DEFAULT_IMAGE: &str = "img/default-product.jpg";
pub const DEFAULT_DESCRIPTION: &str = "No description";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub price: f64,
    pub image: String,
    pub description: String,
}

/// Field values for a create or update, already trimmed and validated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub price: f64,
    pub image: Option<String>,
    pub description: Option<String>,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
            image: None,
            description: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builds a draft from raw form text. Empty image/description become `None`.
    pub fn parse(name: &str, price: &str, image: &str, description: &str) -> Result<Self, Error> {
        let price_text = price.trim();
        let price = price_text.parse::<f64>().map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("invalid price: {price_text:?}"))
                .with_source(err)
        })?;
        // Non-finite prices serialize as `null` and would make the stored catalog unreadable.
        if !price.is_finite() || price <= 0.0 {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("invalid price: {price_text:?}")));
        }
        Ok(Self {
            name: name.trim().to_string(),
            price,
            image: non_empty(image),
            description: non_empty(description),
        })
    }

    pub(crate) fn into_product(self, id: u64) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            image: self.image.unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            description: self
                .description
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn seed_products() -> Vec<Product> {
    let seed = [
        (1, "Chaqueta Vintage", 50.0, "img/vintage-jacket.webp", "Chaqueta vintage de los años 90"),
        (2, "Camiseta Urbana", 20.0, "img/vintage-tshirt.webp", "Camiseta urbana de algodón"),
        (3, "Sudadera", 40.0, "img/hoodie-prestige.jpg", "Sudadera con capucha vintage"),
        (4, "Zapatillas", 100.0, "img/af1.webp", "Zapatillas deportivas retro"),
        (5, "Calcetines", 15.0, "img/prestige-socks.webp", "Pack de calcetines vintage"),
        (6, "Pantalones", 25.0, "img/vintage-pants.webp", "Pantalones vintage wide leg"),
        (7, "Cinturón", 50.0, "img/vintage-belt.webp", "Cinturón de cuero vintage"),
    ];
    seed.into_iter()
        .map(|(id, name, price, image, description)| Product {
            id,
            name: name.to_string(),
            price,
            image: image.to_string(),
            description: description.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_DESCRIPTION, DEFAULT_IMAGE, ProductDraft, seed_products};
    use crate::core::error::ErrorKind;

    #[test]
    fn parse_defaults_empty_optional_fields() {
        let draft = ProductDraft::parse(" Hat ", "19.99", "  ", "").expect("draft");
        assert_eq!(draft.name, "Hat");
        assert_eq!(draft.price, 19.99);
        assert_eq!(draft.image, None);

        let product = draft.into_product(8);
        assert_eq!(product.image, DEFAULT_IMAGE);
        assert_eq!(product.description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn parse_rejects_non_numeric_price() {
        let err = ProductDraft::parse("Hat", "abc", "", "").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn parse_rejects_unrepresentable_and_non_positive_prices() {
        for price in ["1".repeat(400), "inf".to_string(), "NaN".to_string(), "0".to_string()] {
            let err = ProductDraft::parse("Hat", &price, "", "").expect_err("err");
            assert_eq!(err.kind(), ErrorKind::Usage);
        }
    }

    #[test]
    fn seed_has_seven_sequential_ids() {
        let ids: Vec<u64> = seed_products().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn product_json_uses_plain_field_names() {
        let product = ProductDraft::new("Hat", 19.99).with_image("img/hat.webp").into_product(3);
        let value = serde_json::to_value(&product).expect("json");
        assert_eq!(value["id"], 3);
        assert_eq!(value["name"], "Hat");
        assert_eq!(value["image"], "img/hat.webp");
        assert_eq!(value["description"], DEFAULT_DESCRIPTION);
    }
}

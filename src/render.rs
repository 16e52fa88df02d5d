//! Purpose: Project catalog and cart state into markup for named mount points.
//! Exports: `MountPoints`, `MountTarget`, `render_products`, `render_cart`, `format_price`.
//! Role: The seam between storefront state and whatever presentation layer hosts it.
//! Invariants: Every call rebuilds its mounts from scratch; output is deterministic.
//! Invariants: All product and cart text is HTML-escaped before it is embedded.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::core::cart::{Cart, format_total};
use crate::core::product::{DEFAULT_IMAGE, Product};

pub const CURRENCY_SUFFIX: &str = "€";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MountPoints {
    pub product_grid: String,
    pub cart_items: String,
    pub cart_total: String,
    pub checkout_total: String,
    pub cart_count: String,
}

impl Default for MountPoints {
    fn default() -> Self {
        Self {
            product_grid: "product-grid".to_string(),
            cart_items: "cart-items".to_string(),
            cart_total: "cart-total".to_string(),
            checkout_total: "checkout-total".to_string(),
            cart_count: "cart-link".to_string(),
        }
    }
}

/// Receives whole-mount replacements.
pub trait MountTarget {
    fn replace(&mut self, mount: &str, markup: String);
}

pub fn product_element_id(id: u64) -> String {
    format!("product-{id}")
}

/// Prices print without trailing zeros: `50`, `19.99`.
pub fn format_price(price: f64) -> String {
    format!("{price}{CURRENCY_SUFFIX}")
}

/// Rebuilds the product grid and returns the ids of the rendered cards.
pub fn render_products(
    products: &[Product],
    mounts: &MountPoints,
    target: &mut impl MountTarget,
) -> Vec<String> {
    let mut markup = String::new();
    let mut cards = Vec::with_capacity(products.len());
    for product in products {
        let element_id = product_element_id(product.id);
        push_product_card(&mut markup, product, &element_id);
        cards.push(element_id);
    }
    target.replace(&mounts.product_grid, markup);
    tracing::debug!(cards = cards.len(), "product grid rendered");
    cards
}

fn push_product_card(out: &mut String, product: &Product, element_id: &str) {
    let id = product.id;
    let name_attr = encode_double_quoted_attribute(&product.name);
    out.push_str(&format!(
        concat!(
            "<div class=\"product\" id=\"{element_id}\" data-id=\"{id}\">",
            "<img src=\"{image}\" alt=\"{name_attr}\" onerror=\"this.src='{fallback}'\">",
            "<h3>{name}</h3>",
            "<p class=\"product-price\">{price}</p>",
            "<p class=\"product-description\">{description}</p>",
            "<div class=\"product-buttons\">",
            "<button type=\"button\" class=\"btn-add-cart\" data-action=\"add-to-cart\" data-id=\"{id}\">Add</button>",
            "<button type=\"button\" class=\"btn-edit\" data-action=\"edit\" data-id=\"{id}\">Edit</button>",
            "<button type=\"button\" class=\"btn-delete\" data-action=\"delete\" data-id=\"{id}\">Delete</button>",
            "</div></div>"
        ),
        element_id = element_id,
        id = id,
        image = encode_double_quoted_attribute(&product.image),
        name_attr = name_attr,
        fallback = DEFAULT_IMAGE,
        name = encode_text(&product.name),
        price = encode_text(&format_price(product.price)),
        description = encode_text(&product.description),
    ));
}

/// Rebuilds the cart list, both total displays, and the cart badge.
pub fn render_cart(cart: &Cart, mounts: &MountPoints, target: &mut impl MountTarget) {
    let mut markup = String::new();
    for (index, item) in cart.items().iter().enumerate() {
        markup.push_str(&format!(
            concat!(
                "<li><span>{name} - {price}</span>",
                "<button type=\"button\" class=\"btn-remove\" data-action=\"remove-from-cart\" data-index=\"{index}\">×</button>",
                "</li>"
            ),
            name = encode_text(&item.name),
            price = encode_text(&format_price(item.price)),
            index = index,
        ));
    }
    let total = format_total(cart.total());
    target.replace(&mounts.cart_items, markup);
    target.replace(&mounts.cart_total, total.clone());
    target.replace(&mounts.checkout_total, total);
    target.replace(&mounts.cart_count, format!("Cart ({})", cart.len()));
}

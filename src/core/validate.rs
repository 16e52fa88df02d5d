//! Purpose: Field-level validation for the product, checkout, and contact forms.
//! Exports: `Field`, `FormKind`, `FormValues`, `ErrorSlots`, `check`, `validate_field`, `validate_form`.
//! Role: Pure predicates plus the error-slot side channel the page displays.
//! Invariants: Inputs are trimmed before any rule; lengths count characters.
//! Invariants: A form validation runs every field rule; it never short-circuits.
//! Invariants: A passing field always leaves its error slot empty.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

pub const MIN_NAME_LENGTH: usize = 3;
pub const MIN_DESCRIPTION_LENGTH: usize = 5;
pub const MIN_ADDRESS_LENGTH: usize = 10;
pub const MIN_SUBJECT_LENGTH: usize = 5;
pub const MIN_MESSAGE_LENGTH: usize = 10;

static PRICE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]{1,2})?$").expect("price pattern"));
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{9,}$").expect("phone pattern"));

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum FormKind {
    Product,
    Checkout,
    Contact,
}

impl FormKind {
    pub const fn fields(self) -> &'static [Field] {
        match self {
            FormKind::Product => &[
                Field::ProductName,
                Field::ProductPrice,
                Field::ProductImage,
                Field::ProductDescription,
            ],
            FormKind::Checkout => &[
                Field::CheckoutName,
                Field::CheckoutEmail,
                Field::CheckoutAddress,
                Field::CheckoutPhone,
            ],
            FormKind::Contact => &[
                Field::ContactName,
                Field::ContactEmail,
                Field::ContactSubject,
                Field::ContactMessage,
            ],
        }
    }

    pub const fn form_id(self) -> &'static str {
        match self {
            FormKind::Product => "add-product-form",
            FormKind::Checkout => "payment-form",
            FormKind::Contact => "contact-form",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Field {
    ProductName,
    ProductPrice,
    ProductImage,
    ProductDescription,
    CheckoutName,
    CheckoutEmail,
    CheckoutAddress,
    CheckoutPhone,
    ContactName,
    ContactEmail,
    ContactSubject,
    ContactMessage,
}

const ALL_FIELDS: [Field; 12] = [
    Field::ProductName,
    Field::ProductPrice,
    Field::ProductImage,
    Field::ProductDescription,
    Field::CheckoutName,
    Field::CheckoutEmail,
    Field::CheckoutAddress,
    Field::CheckoutPhone,
    Field::ContactName,
    Field::ContactEmail,
    Field::ContactSubject,
    Field::ContactMessage,
];

impl Field {
    pub const fn input_id(self) -> &'static str {
        match self {
            Field::ProductName => "product-name",
            Field::ProductPrice => "product-price",
            Field::ProductImage => "product-image",
            Field::ProductDescription => "product-description",
            Field::CheckoutName => "checkout-name",
            Field::CheckoutEmail => "checkout-email",
            Field::CheckoutAddress => "checkout-address",
            Field::CheckoutPhone => "checkout-phone",
            Field::ContactName => "contact-name",
            Field::ContactEmail => "contact-email",
            Field::ContactSubject => "contact-subject",
            Field::ContactMessage => "contact-message",
        }
    }

    /// Id of the sibling element that displays this field's error text.
    pub fn error_slot(self) -> String {
        format!("{}-error", self.input_id())
    }

    pub fn from_input_id(id: &str) -> Option<Field> {
        ALL_FIELDS.into_iter().find(|field| field.input_id() == id)
    }

    pub const fn form(self) -> FormKind {
        match self {
            Field::ProductName
            | Field::ProductPrice
            | Field::ProductImage
            | Field::ProductDescription => FormKind::Product,
            Field::CheckoutName
            | Field::CheckoutEmail
            | Field::CheckoutAddress
            | Field::CheckoutPhone => FormKind::Checkout,
            Field::ContactName
            | Field::ContactEmail
            | Field::ContactSubject
            | Field::ContactMessage => FormKind::Contact,
        }
    }

    const fn empty_message(self) -> &'static str {
        match self {
            Field::ProductName | Field::CheckoutName | Field::ContactName => "name required",
            Field::ProductPrice => "price required",
            Field::ProductImage => "image URL required",
            Field::ProductDescription => "description required",
            Field::CheckoutEmail | Field::ContactEmail => "email required",
            Field::CheckoutAddress => "address required",
            Field::CheckoutPhone => "phone required",
            Field::ContactSubject => "subject required",
            Field::ContactMessage => "message required",
        }
    }
}

/// Checks one trimmed value against its field rule. `Err` carries the display message.
pub fn check(field: Field, raw: &str) -> Result<(), &'static str> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(field.empty_message());
    }
    match field {
        Field::ProductName | Field::CheckoutName | Field::ContactName => {
            min_chars(value, MIN_NAME_LENGTH, "min 3 chars")
        }
        Field::ProductDescription => min_chars(value, MIN_DESCRIPTION_LENGTH, "min 5 chars"),
        Field::ContactSubject => min_chars(value, MIN_SUBJECT_LENGTH, "min 5 chars"),
        Field::CheckoutAddress => min_chars(value, MIN_ADDRESS_LENGTH, "min 10 chars"),
        Field::ContactMessage => min_chars(value, MIN_MESSAGE_LENGTH, "min 10 chars"),
        Field::ProductPrice => check_price(value),
        Field::ProductImage => Ok(()),
        Field::CheckoutEmail | Field::ContactEmail => {
            matches(&EMAIL_PATTERN, value, "invalid email")
        }
        Field::CheckoutPhone => matches(&PHONE_PATTERN, value, "invalid phone"),
    }
}

fn min_chars(value: &str, min: usize, message: &'static str) -> Result<(), &'static str> {
    if value.chars().count() < min {
        return Err(message);
    }
    Ok(())
}

fn matches(pattern: &Regex, value: &str, message: &'static str) -> Result<(), &'static str> {
    if pattern.is_match(value) {
        Ok(())
    } else {
        Err(message)
    }
}

fn check_price(value: &str) -> Result<(), &'static str> {
    matches(&PRICE_PATTERN, value, "invalid price")?;
    match value.parse::<f64>() {
        Ok(price) if !price.is_finite() => Err("invalid price"),
        Ok(price) if price > 0.0 => Ok(()),
        Ok(_) => Err("must be > 0"),
        Err(_) => Err("invalid price"),
    }
}

/// Current raw input text per field, as typed.
#[derive(Clone, Debug, Default)]
pub struct FormValues {
    values: BTreeMap<Field, String>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn get(&self, field: Field) -> &str {
        self.values.get(&field).map_or("", String::as_str)
    }

    pub fn trimmed(&self, field: Field) -> &str {
        self.get(field).trim()
    }

    pub fn reset(&mut self, kind: FormKind) {
        for field in kind.fields() {
            self.values.remove(field);
        }
    }
}

/// Error text per field; an empty or missing entry means "no error shown".
#[derive(Clone, Debug, Default)]
pub struct ErrorSlots {
    slots: BTreeMap<Field, String>,
}

impl ErrorSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> &str {
        self.slots.get(&field).map_or("", String::as_str)
    }

    pub fn set(&mut self, field: Field, message: impl Into<String>) {
        self.slots.insert(field, message.into());
    }

    pub fn clear(&mut self, field: Field) {
        self.slots.remove(&field);
    }

    pub fn clear_form(&mut self, kind: FormKind) {
        for field in kind.fields() {
            self.clear(*field);
        }
    }

    /// Non-empty slots of one form, in field order.
    pub fn errors(&self, kind: FormKind) -> Vec<(Field, &str)> {
        kind.fields()
            .iter()
            .map(|field| (*field, self.get(*field)))
            .filter(|(_, message)| !message.is_empty())
            .collect()
    }
}

pub fn validate_field(field: Field, values: &FormValues, slots: &mut ErrorSlots) -> bool {
    match check(field, values.get(field)) {
        Ok(()) => {
            slots.clear(field);
            true
        }
        Err(message) => {
            slots.set(field, message);
            false
        }
    }
}

pub fn validate_form(kind: FormKind, values: &FormValues, slots: &mut ErrorSlots) -> bool {
    kind.fields()
        .iter()
        .fold(true, |all_ok, field| validate_field(*field, values, slots) & all_ok)
}

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{ProductDraft, ProductField, ProductPayload};

pub const NAME_REQUIRED: &str = "Name is required";
pub const DESCRIPTION_REQUIRED: &str = "Description is required";
pub const PRICE_REQUIRED: &str = "Price is required";
pub const PRICE_NOT_POSITIVE: &str = "Price must be a positive number";
pub const PRICE_OUT_OF_RANGE: &str = "Price is out of range";

/// Field-keyed messages from one validation pass. Empty means valid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<ProductField, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: ProductField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: ProductField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProductField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn insert(&mut self, field: ProductField, message: &str) {
        self.0.insert(field, message.to_owned());
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validation {
    errors: ValidationErrors,
    payload: Option<ProductPayload>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// The request body when every rule passed, otherwise the collected
    /// messages.
    pub fn into_payload(self) -> Result<ProductPayload, ValidationErrors> {
        match self.payload {
            Some(payload) if self.errors.is_empty() => Ok(payload),
            _ => Err(self.errors),
        }
    }
}

/// Checks every rule in one pass; all applicable messages are collected.
pub fn validate(candidate: &ProductDraft) -> Validation {
    let mut errors = ValidationErrors::default();

    if candidate.name.trim().is_empty() {
        errors.insert(ProductField::Name, NAME_REQUIRED);
    }

    if candidate.description.trim().is_empty() {
        errors.insert(ProductField::Description, DESCRIPTION_REQUIRED);
    }

    let price = match parse_price(&candidate.price) {
        Ok(price) => Some(price),
        Err(message) => {
            errors.insert(ProductField::Price, message);
            None
        }
    };

    let payload = match price {
        Some(price) if errors.is_empty() => Some(ProductPayload {
            name: candidate.name.clone(),
            description: candidate.description.clone(),
            price,
        }),
        _ => None,
    };

    Validation { errors, payload }
}

/// Only an untouched (empty) field counts as missing; whitespace is a value
/// that is not a positive number.
fn parse_price(raw: &str) -> Result<Decimal, &'static str> {
    if raw.is_empty() {
        return Err(PRICE_REQUIRED);
    }

    let trimmed = raw.trim();
    let parsed = if trimmed.contains(|ch: char| ch == 'e' || ch == 'E') {
        Decimal::from_scientific(trimmed)
    } else {
        Decimal::from_str(trimmed)
    };

    match parsed {
        Ok(price) if price > Decimal::ZERO => Ok(price),
        Ok(_) => Err(PRICE_NOT_POSITIVE),
        Err(_) if is_unrepresentable_positive(trimmed) => Err(PRICE_OUT_OF_RANGE),
        Err(_) => Err(PRICE_NOT_POSITIVE),
    }
}

/// Numbers that parse as floats but exceed `Decimal`'s range or precision.
fn is_unrepresentable_positive(text: &str) -> bool {
    text.parse::<f64>().is_ok_and(|value| value.is_finite() && value > 0.0)
}

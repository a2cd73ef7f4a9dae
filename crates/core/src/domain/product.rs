use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier assigned by the remote collection. Opaque to the client: it is
/// echoed back in the same JSON shape it arrived in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for ProductId {
    fn from(value: i64) -> Self {
        Self::Numeric(value)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl std::str::FromStr for ProductId {
    type Err = std::convert::Infallible;

    /// Integer-looking input becomes a numeric id so it compares equal to
    /// ids decoded from JSON numbers.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Ok(match trimmed.parse::<i64>() {
            Ok(value) => Self::Numeric(value),
            Err(_) => Self::Text(trimmed.to_owned()),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Validated request body for create and update. The identifier is never
/// part of the body; the remote store owns it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPayload {
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl ProductPayload {
    pub fn into_product(self, id: ProductId) -> Product {
        Product { id, name: self.name, description: self.description, price: self.price }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductField {
    Name,
    Description,
    Price,
}

impl ProductField {
    pub const ALL: [Self; 3] = [Self::Name, Self::Description, Self::Price];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Price => "price",
        }
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form values under edit. Fields are kept as typed so an unparsable price
/// can still be shown back to the user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub name: String,
    pub description: String,
    pub price: String,
}

impl ProductDraft {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self { id: None, name: name.into(), description: description.into(), price: price.into() }
    }

    pub fn field(&self, field: ProductField) -> &str {
        match field {
            ProductField::Name => &self.name,
            ProductField::Description => &self.description,
            ProductField::Price => &self.price,
        }
    }

    pub fn set_field(&mut self, field: ProductField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ProductField::Name => self.name = value,
            ProductField::Description => self.description = value,
            ProductField::Price => self.price = value,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.id.is_none() && ProductField::ALL.iter().all(|field| self.field(*field).is_empty())
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            id: Some(product.id.clone()),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{Product, ProductDraft, ProductField, ProductId, ProductPayload};

    #[test]
    fn product_decodes_numeric_ids_and_prices() {
        let product: Product = serde_json::from_value(json!({
            "id": 7,
            "name": "Lamp",
            "description": "Desk lamp",
            "price": 19.5
        }))
        .expect("product should decode");

        assert_eq!(product.id, ProductId::Numeric(7));
        assert_eq!(product.price, Decimal::new(195, 1));
    }

    #[test]
    fn product_decodes_prices_sent_as_numeric_strings() {
        let product: Product = serde_json::from_str(
            r#"{"id": 3, "name": "Lamp", "description": "Desk lamp", "price": "10.5"}"#,
        )
        .expect("string price should decode");

        assert_eq!(product.price, Decimal::new(105, 1));
    }

    #[test]
    fn product_decodes_text_ids() {
        let product: Product = serde_json::from_value(json!({
            "id": "sku-9",
            "name": "Lamp",
            "description": "Desk lamp",
            "price": 3
        }))
        .expect("product should decode");

        assert_eq!(product.id, ProductId::Text("sku-9".to_owned()));
        assert_eq!(product.id.to_string(), "sku-9");
    }

    #[test]
    fn payload_encodes_price_as_json_number() {
        let payload = ProductPayload {
            name: "B".to_owned(),
            description: "e".to_owned(),
            price: Decimal::new(5, 0),
        };

        let encoded = serde_json::to_value(&payload).expect("payload should encode");
        assert_eq!(encoded, json!({"name": "B", "description": "e", "price": 5.0}));
        assert!(encoded.get("id").is_none());
    }

    #[test]
    fn parsed_ids_match_decoded_numeric_ids() {
        assert_eq!("42".parse::<ProductId>(), Ok(ProductId::Numeric(42)));
        assert_eq!(" abc ".parse::<ProductId>(), Ok(ProductId::Text("abc".to_owned())));
    }

    #[test]
    fn edit_copy_carries_identifier_and_price_text() {
        let product = Product {
            id: ProductId::Numeric(3),
            name: "A".to_owned(),
            description: "d".to_owned(),
            price: Decimal::new(1050, 2),
        };

        let draft = ProductDraft::from(&product);
        assert_eq!(draft.id, Some(ProductId::Numeric(3)));
        assert_eq!(draft.field(ProductField::Price), "10.50");
        assert!(!draft.is_blank());
        assert!(ProductDraft::default().is_blank());
    }
}

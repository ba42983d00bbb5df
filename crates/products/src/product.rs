use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, FieldKind, FieldValue, LookupField};

stockroom_core::serial_id!(
    /// Product identifier (assigned by the store on insert).
    pub struct ProductId,
    "ProductId"
);

/// Prices are stored with cent precision.
pub const MAX_PRICE_SCALE: u32 = 2;

/// Digits allowed before the decimal point (`NUMERIC(12, 2)`).
pub const MAX_PRICE_INTEGER_DIGITS: u32 = 10;

/// Smallest price that no longer fits the stored precision.
fn price_limit() -> Decimal {
    Decimal::from(10_i64.pow(MAX_PRICE_INTEGER_DIGITS))
}

/// Catalog product.
///
/// Inventory records point at a product; that side of the relation is never
/// loaded into or serialized from this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "productID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl Product {
    /// A product that has not been inserted yet.
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: None,
            name: name.into(),
            price,
        }
    }

    pub fn with_id(mut self, id: ProductId) -> Self {
        self.id = Some(id);
        self
    }
}

impl Entity for Product {
    type Id = ProductId;

    const NAME: &'static str = "product";

    const LOOKUPS: &'static [LookupField] = &[
        LookupField::new("name", FieldKind::Text),
        LookupField::new("price", FieldKind::Decimal),
    ];

    fn id(&self) -> Option<ProductId> {
        self.id
    }

    fn assign_id(&mut self, id: ProductId) {
        self.id = Some(id);
    }

    fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("product name must not be blank"));
        }
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(DomainError::validation("product price must not be negative"));
        }
        if self.price >= price_limit() {
            return Err(DomainError::validation(format!(
                "product price must be below {}",
                price_limit()
            )));
        }
        if self.price.normalize().scale() > MAX_PRICE_SCALE {
            return Err(DomainError::validation(format!(
                "product price supports at most {MAX_PRICE_SCALE} decimal places"
            )));
        }
        Ok(())
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "name" => Some(FieldValue::Text(self.name.clone())),
            "price" => Some(FieldValue::Decimal(self.price)),
            _ => None,
        }
    }
}

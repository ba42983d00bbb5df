use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, FieldKind, FieldValue, LookupField};
use stockroom_products::{Product, ProductId};

stockroom_core::serial_id!(
    /// Inventory identifier (assigned by the store on insert).
    pub struct InventoryId,
    "InventoryId"
);

/// Stock of a product at a location.
///
/// `product` holds the resolved owning product, or `None` when unset. Writes
/// persist only the product's identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(rename = "inventoryID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<InventoryId>,
    pub quantity: i32,
    pub location: String,
    #[serde(default)]
    pub product: Option<Product>,
}

impl Inventory {
    pub fn new(quantity: i32, location: impl Into<String>, product: Option<Product>) -> Self {
        Self {
            id: None,
            quantity,
            location: location.into(),
            product,
        }
    }

    pub fn with_id(mut self, id: InventoryId) -> Self {
        self.id = Some(id);
        self
    }

    /// Identifier of the owning product, if one is set and has been persisted.
    pub fn product_id(&self) -> Option<ProductId> {
        self.product.as_ref().and_then(|p| p.id)
    }
}

impl Entity for Inventory {
    type Id = InventoryId;

    const NAME: &'static str = "inventory";

    const LOOKUPS: &'static [LookupField] = &[
        LookupField::new("quantity", FieldKind::Integer),
        LookupField::new("location", FieldKind::Text),
    ];

    fn id(&self) -> Option<InventoryId> {
        self.id
    }

    fn assign_id(&mut self, id: InventoryId) {
        self.id = Some(id);
    }

    fn validate(&self) -> DomainResult<()> {
        if self.quantity < 0 {
            return Err(DomainError::validation("inventory quantity must not be negative"));
        }
        if self.location.trim().is_empty() {
            return Err(DomainError::validation("inventory location must not be blank"));
        }
        if self.product.is_some() && self.product_id().is_none() {
            return Err(DomainError::validation(
                "inventory product reference must be resolved to a stored product",
            ));
        }
        Ok(())
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "quantity" => Some(FieldValue::Integer(self.quantity)),
            "location" => Some(FieldValue::Text(self.location.clone())),
            _ => None,
        }
    }
}

use rust_decimal::Decimal;
use serde::Deserialize;

use stockroom_inventory::{Inventory, InventoryId};
use stockroom_products::{Product, ProductId};

use crate::app::errors::{ApiError, ApiResult};

// -------------------------
// Request DTOs
// -------------------------

/// Product body for `POST` (no id) and `PUT` (with id).
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    #[serde(rename = "productID", default)]
    pub id: Option<ProductId>,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Inventory body; `product` only needs its `productID`.
#[derive(Debug, Deserialize)]
pub struct InventoryRequest {
    #[serde(rename = "inventoryID", default)]
    pub id: Option<InventoryId>,
    pub quantity: i32,
    pub location: String,
    #[serde(default)]
    pub product: Option<ProductRef>,
}

/// Reference to an owning product; every other nested field is ignored.
#[derive(Debug, Deserialize)]
pub struct ProductRef {
    #[serde(rename = "productID", default)]
    pub id: Option<ProductId>,
}

impl ProductRequest {
    pub fn into_new(self) -> ApiResult<Product> {
        if self.id.is_some() {
            return Err(ApiError::validation("a new product cannot already have an ID"));
        }
        Ok(Product::new(self.name, self.price))
    }

    pub fn into_existing(self) -> ApiResult<Product> {
        let id = self
            .id
            .ok_or_else(|| ApiError::validation("product update requires productID"))?;
        Ok(Product::new(self.name, self.price).with_id(id))
    }
}

impl InventoryRequest {
    /// Id of the referenced product, when the body names one.
    pub fn product_id(&self) -> Option<ProductId> {
        self.product.as_ref().and_then(|p| p.id)
    }

    pub fn into_new(self, product: Option<Product>) -> ApiResult<Inventory> {
        if self.id.is_some() {
            return Err(ApiError::validation("a new inventory cannot already have an ID"));
        }
        Ok(Inventory::new(self.quantity, self.location, product))
    }

    pub fn into_existing(self, product: Option<Product>) -> ApiResult<Inventory> {
        let id = self
            .id
            .ok_or_else(|| ApiError::validation("inventory update requires inventoryID"))?;
        Ok(Inventory::new(self.quantity, self.location, product).with_id(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_product_only_needs_its_id() {
        let req: InventoryRequest = serde_json::from_value(json!({
            "quantity": 4,
            "location": "A1",
            "product": { "productID": 2, "name": "ignored" }
        }))
        .unwrap();
        assert_eq!(req.product_id(), Some(ProductId::new(2)));
    }

    #[test]
    fn product_without_id_is_an_unset_reference() {
        let req: InventoryRequest = serde_json::from_value(json!({
            "quantity": 4,
            "location": "A1",
            "product": {}
        }))
        .unwrap();
        assert_eq!(req.product_id(), None);
    }

    #[test]
    fn create_rejects_client_supplied_id() {
        let req: ProductRequest =
            serde_json::from_value(json!({ "productID": 5, "name": "Widget", "price": 1.5 }))
                .unwrap();
        assert!(matches!(req.into_new(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn update_requires_id() {
        let req: ProductRequest =
            serde_json::from_value(json!({ "name": "Widget", "price": 1.5 })).unwrap();
        assert!(matches!(req.into_existing(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn missing_required_fields_fail_to_parse() {
        assert!(serde_json::from_value::<ProductRequest>(json!({ "name": "Widget" })).is_err());
        assert!(serde_json::from_value::<InventoryRequest>(json!({ "quantity": 1 })).is_err());
    }
}

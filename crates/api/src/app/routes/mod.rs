use axum::Router;

use stockroom_inventory::Inventory;
use stockroom_products::Product;

use self::common::Resource;

pub mod common;
pub mod inventory;
pub mod products;
pub mod system;

/// Prefix every resource route is nested under.
pub const API_BASE: &str = "/api/v1";

/// Router for the resource endpoints (mounted at [`API_BASE`]).
pub fn router() -> Router {
    Router::new()
        .nest(Product::PATH, products::router())
        .nest(Inventory::PATH, inventory::router())
}

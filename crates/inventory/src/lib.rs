//! Inventory domain module.
//!
//! A stock record (quantity at a location) with an optional owning product.

pub mod item;

pub use item::{Inventory, InventoryId};

//! Products domain module.
//!
//! The catalog record: a named, priced product. Pure data + field rules; no IO,
//! no HTTP, no storage.

pub mod product;

pub use product::{Product, ProductId, MAX_PRICE_INTEGER_DIGITS, MAX_PRICE_SCALE};

//! `stockroom-core`: persistence-agnostic building blocks.
//!
//! This crate contains the entity contract, the generic repository interface,
//! and the error types shared by every storage backend. No IO lives here.

pub mod entity;
pub mod error;
pub mod id;
pub mod lookup;
pub mod repository;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::SerialId;
pub use lookup::{FieldKind, FieldValue, LookupField};
pub use repository::{
    check_insert, check_lookup, check_update, Repository, RepositoryError, RepositoryResult,
};

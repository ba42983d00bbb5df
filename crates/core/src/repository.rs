//! Generic persistence-access interface.
//!
//! One trait, parameterized by entity and identifier type, implemented once per
//! storage backend and instantiated per entity. Handlers only ever talk to
//! this surface; relation resolution happens before a write reaches it.

use async_trait::async_trait;
use thiserror::Error;

use crate::entity::Entity;
use crate::error::DomainError;
use crate::lookup::FieldValue;

/// Result type used by repository implementations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository-level error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No record with the given identifier exists.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The entity (or a lookup) was rejected before reaching the store.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The store rejected the write (foreign key, unique, not-null, check).
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Connectivity or any other store failure.
    #[error("database error: {0}")]
    Database(String),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }
}

impl From<DomainError> for RepositoryError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::Validation(msg),
        }
    }
}

/// Uniform CRUD access to a single entity type.
///
/// Implementations operate inside a request-scoped session; nothing they
/// write is visible to other sessions until that session commits.
#[async_trait]
pub trait Repository<E, K>: Send
where
    E: Entity<Id = K>,
    K: Send + Sync + 'static,
{
    /// Insert a new record. The store assigns the identifier; the stored
    /// entity (identifier included) is returned.
    async fn create(&mut self, entity: E) -> RepositoryResult<E>;

    /// Look up a record by identifier. A missing record is `Ok(None)`.
    async fn find(&mut self, id: &K) -> RepositoryResult<Option<E>>;

    /// All records, ordered by identifier.
    async fn find_all(&mut self) -> RepositoryResult<Vec<E>>;

    /// All records whose lookup field `field` equals `value`.
    async fn find_by(&mut self, field: &str, value: &FieldValue) -> RepositoryResult<Vec<E>>;

    /// Replace the full stored record carrying the entity's identifier.
    async fn edit(&mut self, entity: E) -> RepositoryResult<E>;

    /// Delete the record with the given identifier.
    ///
    /// Returns [`RepositoryError::NotFound`] when no such record exists; other
    /// records are never touched.
    async fn remove(&mut self, id: &K) -> RepositoryResult<()>;
}

/// Shared pre-checks for `find_by`, so every backend rejects the same lookups.
pub fn check_lookup<E: Entity>(field: &str, value: &FieldValue) -> RepositoryResult<()> {
    let lookup = E::lookup(field).ok_or_else(|| {
        RepositoryError::validation(format!("{} has no lookup field `{field}`", E::NAME))
    })?;
    if lookup.kind != value.kind() {
        return Err(RepositoryError::validation(format!(
            "lookup field `{field}` expects {:?}, got {:?}",
            lookup.kind,
            value.kind()
        )));
    }
    Ok(())
}

/// Shared pre-checks for `create`.
pub fn check_insert<E: Entity>(entity: &E) -> RepositoryResult<()> {
    if let Some(id) = entity.id() {
        return Err(RepositoryError::validation(format!(
            "new {} must not carry an identifier (got {id})",
            E::NAME
        )));
    }
    entity.validate()?;
    Ok(())
}

/// Shared pre-checks for `edit`; returns the identifier to update.
pub fn check_update<E: Entity>(entity: &E) -> RepositoryResult<E::Id> {
    let id = entity.id().ok_or_else(|| {
        RepositoryError::validation(format!("{} update requires an identifier", E::NAME))
    })?;
    entity.validate()?;
    Ok(id)
}

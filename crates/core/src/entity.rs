//! Entity trait: identity + the surface a generic repository needs.

use crate::error::DomainResult;
use crate::id::SerialId;
use crate::lookup::{FieldValue, LookupField};

/// A persisted record type with a store-assigned identifier.
///
/// Instances are transient representations; the store owns the persisted
/// state. An entity without an identifier has not been inserted yet.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Strongly-typed entity identifier.
    type Id: SerialId;

    /// Lower-case entity name used in logs, headers and error messages.
    const NAME: &'static str;

    /// Fields that support lookup-by-field queries.
    const LOOKUPS: &'static [LookupField];

    /// Returns the identifier, if one has been assigned.
    fn id(&self) -> Option<Self::Id>;

    /// Stores the identifier handed out by the store on insert.
    fn assign_id(&mut self, id: Self::Id);

    /// Check field-level constraints before any write.
    fn validate(&self) -> DomainResult<()>;

    /// Current value of a lookup field, `None` for unknown fields.
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    /// Resolve a lookup field by name.
    fn lookup(field: &str) -> Option<&'static LookupField> {
        Self::LOOKUPS.iter().find(|l| l.name == field)
    }
}

//! Lookup-by-field values.
//!
//! The only query shape supported beyond "by id" and "all": equality on a
//! single declared field.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{DomainError, DomainResult};

/// Storage type of a lookup field.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
}

/// A field that an entity exposes for equality lookups.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LookupField {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl LookupField {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }

    /// Parse a raw (query-string) value according to this field's kind.
    pub fn parse(&self, raw: &str) -> DomainResult<FieldValue> {
        let invalid = |e: &dyn fmt::Display| {
            DomainError::validation(format!("invalid value for `{}`: {e}", self.name))
        };
        match self.kind {
            FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
            FieldKind::Integer => raw
                .trim()
                .parse::<i32>()
                .map(FieldValue::Integer)
                .map_err(|e| invalid(&e)),
            FieldKind::Decimal => Decimal::from_str(raw.trim())
                .map(FieldValue::Decimal)
                .map_err(|e| invalid(&e)),
        }
    }
}

/// A typed value to compare a lookup field against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i32),
    Decimal(Decimal),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Integer(_) => FieldKind::Integer,
            FieldValue::Decimal(_) => FieldKind::Decimal,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(v) => f.write_str(v),
            FieldValue::Integer(v) => fmt::Display::fmt(v, f),
            FieldValue::Decimal(v) => fmt::Display::fmt(v, f),
        }
    }
}

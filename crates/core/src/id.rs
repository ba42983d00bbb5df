//! Store-assigned integer identifiers.

use core::fmt::{Debug, Display};
use core::hash::Hash;
use core::str::FromStr;

use crate::error::DomainError;

/// Identifier backed by a store sequence (`serial` column or in-memory counter).
pub trait SerialId:
    Copy + Eq + Ord + Hash + Debug + Display + FromStr<Err = DomainError> + Send + Sync + 'static
{
    fn from_raw(raw: i32) -> Self;

    fn raw(self) -> i32;
}

/// Declare a transparent `i32` identifier newtype implementing [`SerialId`].
///
/// The generated type serializes as a bare integer and parses from its decimal
/// form, which is what path segments such as `/api/product/7` carry.
#[macro_export]
macro_rules! serial_id {
    ($(#[$meta:meta])* $vis:vis struct $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Copy,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[serde(transparent)]
        $vis struct $t(i32);

        impl $t {
            pub fn new(raw: i32) -> Self {
                Self(raw)
            }
        }

        impl $crate::SerialId for $t {
            fn from_raw(raw: i32) -> Self {
                Self(raw)
            }

            fn raw(self) -> i32 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl core::str::FromStr for $t {
            type Err = $crate::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i32>()
                    .map(Self)
                    .map_err(|e| $crate::DomainError::invalid_id(format!("{}: {}", $name, e)))
            }
        }
    };
}

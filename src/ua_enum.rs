// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

use crate::Error;

/// Implemented by simple OPC-UA enumerations.
pub trait UaEnum: Sized {
    /// The numeric wire representation of the enumeration.
    type Repr: Copy;

    /// The enumerant for a numeric value, or an error for a value that
    /// names no enumerant.
    fn from_repr(repr: Self::Repr) -> Result<Self, Error>;

    /// The numeric value of this enumerant.
    fn into_repr(self) -> Self::Repr;

    /// The `NAME_VALUE` string of this enumerant, e.g. `KEY_1`. This is
    /// what the non-reversible JSON form emits.
    fn as_str(&self) -> &'static str;

    /// Parse a `NAME_VALUE` string back into an enumerant.
    fn from_str(val: &str) -> Result<Self, Error>;
}

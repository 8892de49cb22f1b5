// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

use crate::{UAString, UaNullable};

/// XML element, represented as a string.
///
/// Constructors are not checked, so the contents are not guaranteed to
/// be valid XML, or really XML at all.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement(UAString);

impl XmlElement {
    /// Create a new null XmlElement.
    pub fn null() -> Self {
        Self(UAString::null())
    }

    /// Test if the element is null.
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// The inner string.
    pub fn as_string(&self) -> &UAString {
        &self.0
    }
}

impl std::fmt::Display for XmlElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for XmlElement {
    fn from(value: String) -> Self {
        Self(UAString::from(value))
    }
}

impl From<&str> for XmlElement {
    fn from(value: &str) -> Self {
        Self(UAString::from(value))
    }
}

impl From<UAString> for XmlElement {
    fn from(value: UAString) -> Self {
        Self(value)
    }
}

impl UaNullable for XmlElement {
    fn is_ua_null(&self) -> bool {
        self.0.is_null()
    }
}

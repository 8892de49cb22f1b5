// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! The OPC-UA string type.

use std::fmt;

use crate::UaNullable;

/// An OPC-UA string: UTF-8 text or the null value. Null and empty are
/// different strings on the wire, which is why this is not a plain
/// `String`. The name avoids colliding with [`std::string::String`].
#[derive(Eq, PartialEq, Debug, Clone, Hash, Default)]
pub struct UAString(Option<String>);

impl UAString {
    /// The null string.
    pub fn null() -> UAString {
        UAString(None)
    }

    /// True for the null string, false for any actual text.
    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// True for the null string and for empty text.
    pub fn is_empty(&self) -> bool {
        self.0.as_deref().map_or(true, str::is_empty)
    }

    /// The text as a `&str`, `None` for the null string.
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// The inner optional string.
    pub fn value(&self) -> &Option<String> {
        &self.0
    }

    /// Replace the inner value.
    pub fn set_value(&mut self, value: Option<String>) {
        self.0 = value;
    }

    /// Length of the text in bytes, or -1 for the null string. This is
    /// the length the OPC-UA encodings use.
    pub fn len(&self) -> isize {
        self.0.as_deref().map_or(-1, |s| s.len() as isize)
    }
}

impl fmt::Display for UAString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_deref() {
            Some(s) => f.write_str(s),
            None => f.write_str("[null]"),
        }
    }
}

impl UaNullable for UAString {
    fn is_ua_null(&self) -> bool {
        self.is_null()
    }
}

impl AsRef<str> for UAString {
    fn as_ref(&self) -> &str {
        self.0.as_deref().unwrap_or_default()
    }
}

impl From<&str> for UAString {
    fn from(value: &str) -> Self {
        UAString(Some(value.to_owned()))
    }
}

impl From<String> for UAString {
    fn from(value: String) -> Self {
        UAString(Some(value))
    }
}

impl From<&String> for UAString {
    fn from(value: &String) -> Self {
        UAString(Some(value.clone()))
    }
}

impl From<Option<String>> for UAString {
    fn from(value: Option<String>) -> Self {
        UAString(value)
    }
}

impl From<UAString> for String {
    fn from(value: UAString) -> Self {
        value.0.unwrap_or_default()
    }
}

impl PartialEq<str> for UAString {
    fn eq(&self, other: &str) -> bool {
        self.0.as_deref() == Some(other)
    }
}

// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Contains the implementation of `ByteString`.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::UaNullable;

/// A sequence of octets. A null byte string is distinct from an empty one.
/// On the JSON wire a byte string is a base64 encoded string.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Default)]
pub struct ByteString {
    /// The raw bytes, `None` for the null byte string.
    pub value: Option<Vec<u8>>,
}

impl UaNullable for ByteString {
    fn is_ua_null(&self) -> bool {
        self.is_null()
    }
}

impl fmt::Display for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_base64())
    }
}

impl AsRef<[u8]> for ByteString {
    fn as_ref(&self) -> &[u8] {
        self.value.as_deref().unwrap_or(&[])
    }
}

impl<'a> From<&'a [u8]> for ByteString {
    fn from(value: &'a [u8]) -> Self {
        ByteString {
            value: Some(value.to_vec()),
        }
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(value: Vec<u8>) -> Self {
        ByteString { value: Some(value) }
    }
}

impl<const N: usize> From<[u8; N]> for ByteString {
    fn from(value: [u8; N]) -> Self {
        ByteString {
            value: Some(value.to_vec()),
        }
    }
}

impl ByteString {
    /// Create a null byte string (not the same as an empty byte string).
    pub fn null() -> ByteString {
        ByteString { value: None }
    }

    /// Test if the byte string is null.
    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    /// Test if the byte string is null or empty.
    pub fn is_empty(&self) -> bool {
        self.value.as_deref().map_or(true, |v| v.is_empty())
    }

    /// Returns the length in bytes or -1 for null.
    pub fn len(&self) -> isize {
        match &self.value {
            Some(v) => v.len() as isize,
            None => -1,
        }
    }

    /// Creates a byte string from a base64 encoded string.
    pub fn from_base64(data: &str) -> Option<ByteString> {
        STANDARD.decode(data).map(Self::from).ok()
    }

    /// Encode the byte string to a base64 encoded string. The null byte
    /// string encodes as the empty string.
    pub fn as_base64(&self) -> String {
        match &self.value {
            Some(v) => STANDARD.encode(v),
            None => String::new(),
        }
    }
}

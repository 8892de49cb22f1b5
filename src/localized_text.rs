// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Contains the definition of `LocalizedText`.

use std::fmt;

use crate::{string::UAString, UaNullable};

/// Human readable text with an optional locale identifier. In the
/// reversible form this is an object `{Locale, Text}`, in the
/// non-reversible form just the text is emitted.
#[derive(PartialEq, Debug, Clone, Eq, Hash, Default)]
pub struct LocalizedText {
    /// The locale, e.g. "en".
    pub locale: UAString,
    /// The text in that locale.
    pub text: UAString,
}

impl UaNullable for LocalizedText {
    fn is_ua_null(&self) -> bool {
        self.is_null()
    }
}

impl fmt::Display for LocalizedText {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl<'a> From<&'a str> for LocalizedText {
    fn from(value: &'a str) -> Self {
        Self {
            locale: UAString::null(),
            text: UAString::from(value),
        }
    }
}

impl From<String> for LocalizedText {
    fn from(value: String) -> Self {
        Self {
            locale: UAString::null(),
            text: UAString::from(value),
        }
    }
}

impl LocalizedText {
    /// Create a new localized text with a locale.
    pub fn new(locale: &str, text: &str) -> LocalizedText {
        LocalizedText {
            locale: UAString::from(locale),
            text: UAString::from(text),
        }
    }

    /// The null localized text: no locale, no text.
    pub fn null() -> LocalizedText {
        LocalizedText {
            locale: UAString::null(),
            text: UAString::null(),
        }
    }

    /// Test if the localized text is null.
    pub fn is_null(&self) -> bool {
        self.locale.is_null() && self.text.is_null()
    }
}

// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Shared encoding infrastructure: the [`Error`] type both halves of the
//! codec raise, the [`EncodingLimits`] record, and the [`UaNullable`]
//! trait behind reversible field elision.

use std::{error::Error as StdError, fmt};

use log::error;

use crate::status_code::StatusCode;

/// Result of an encoding or decoding operation.
pub type EncodingResult<T> = Result<T, Error>;

type DynError = Box<dyn StdError + Send + Sync>;

/// Error raised by the codec, tagged with an OPC-UA status code:
/// `BadEncodingError` for malformed or inconsistent data in either
/// direction, `BadEncodingLimitsExceeded` for a violated length, array
/// or depth limit. The inner source carries the human readable detail.
#[derive(Debug)]
pub struct Error {
    status: StatusCode,
    context: DynError,
}

impl Error {
    /// An error with an explicit status code.
    pub fn new(status: StatusCode, context: impl Into<DynError>) -> Self {
        Self {
            status,
            context: context.into(),
        }
    }

    /// A `BadEncodingError` with the given detail.
    pub fn encoding(context: impl Into<DynError>) -> Self {
        Self::new(StatusCode::BadEncodingError, context)
    }

    /// A `BadEncodingLimitsExceeded` with the given detail.
    pub fn limits_exceeded(context: impl Into<DynError>) -> Self {
        Self::new(StatusCode::BadEncodingLimitsExceeded, context)
    }

    /// The status code of this error.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.context)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.context.as_ref())
    }
}

// Collapsing an error to its bare status code is lossy, so the detail
// is logged at that point.
impl From<Error> for StatusCode {
    fn from(value: Error) -> Self {
        error!("{}", value);
        value.status
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::encoding(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::encoding(value)
    }
}

impl From<struson::writer::JsonNumberError> for Error {
    fn from(value: struson::writer::JsonNumberError) -> Self {
        Self::encoding(value)
    }
}

/// Default decoding depth when none is configured.
pub const MAX_DECODING_DEPTH: usize = 100;

/// Limits applied while encoding and decoding. A limit of zero disables
/// the corresponding check, except for `max_decoding_depth` which is
/// always enforced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodingLimits {
    /// Maximum length in bytes (not chars!) of a string. 0 means no limit.
    pub max_string_length: usize,
    /// Maximum length in bytes of a byte string. 0 means no limit.
    pub max_byte_string_length: usize,
    /// Maximum number of array elements. 0 means no limit.
    pub max_array_length: usize,
    /// Maximum nesting depth of the document being decoded. Guards
    /// against adversarial inputs with deeply recursive variants.
    pub max_decoding_depth: usize,
}

impl Default for EncodingLimits {
    fn default() -> Self {
        Self {
            max_string_length: 0,
            max_byte_string_length: 0,
            max_array_length: 0,
            max_decoding_depth: MAX_DECODING_DEPTH,
        }
    }
}

impl EncodingLimits {
    /// Limits suitable for decoding small payloads, e.g. nested
    /// extension object bodies that are not expected to be large.
    pub fn minimal() -> Self {
        Self {
            max_string_length: 8192,
            max_byte_string_length: 8192,
            max_array_length: 8192,
            max_decoding_depth: MAX_DECODING_DEPTH,
        }
    }
}

/// Implemented by every OPC-UA type to report whether a value is the
/// null/default value of its type. In the reversible form a named field
/// holding such a value is not emitted at all, and the decoder restores
/// it from the field's absence.
pub trait UaNullable {
    /// True if this value can be left out of a reversible document.
    fn is_ua_null(&self) -> bool {
        false
    }
}

impl<T: UaNullable> UaNullable for Option<T> {
    fn is_ua_null(&self) -> bool {
        self.as_ref().map_or(true, UaNullable::is_ua_null)
    }
}

impl<T: UaNullable> UaNullable for Box<T> {
    fn is_ua_null(&self) -> bool {
        T::is_ua_null(self)
    }
}

// An empty vec is an actual empty array, not null
impl<T: UaNullable> UaNullable for Vec<T> {}

impl UaNullable for String {}
impl UaNullable for str {}

macro_rules! null_when_zero {
    ($($t:ty => $zero:expr),+ $(,)?) => {
        $(
            impl UaNullable for $t {
                fn is_ua_null(&self) -> bool {
                    *self == $zero
                }
            }
        )+
    };
}

null_when_zero! {
    bool => false,
    u8 => 0, u16 => 0, u32 => 0, u64 => 0,
    i8 => 0, i16 => 0, i32 => 0, i64 => 0,
    f32 => 0.0, f64 => 0.0,
}

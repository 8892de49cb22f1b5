// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Contains the implementation of `StatusCode`, a wrapped `u32` where zero
//! means `Good`. Only the subset of codes this library and its callers
//! commonly need is named; unknown codes are preserved as raw values.

use std::fmt;

use crate::UaNullable;

/// A numeric identifier for an error or condition associated with a value
/// or an operation. The top two bits encode the severity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct StatusCode(u32);

const SEVERITY_MASK: u32 = 0xC000_0000;
const SEVERITY_UNCERTAIN: u32 = 0x4000_0000;
const SEVERITY_BAD: u32 = 0x8000_0000;

macro_rules! status_codes {
    ($(($name:ident, $value:expr, $doc:expr),)*) => {
        #[allow(non_upper_case_globals)]
        impl StatusCode {
            $(
                #[doc = $doc]
                pub const $name: StatusCode = StatusCode($value);
            )*

            /// The canonical symbolic name of this status code, if it is
            /// one of the named codes.
            pub fn name(&self) -> Option<&'static str> {
                match self.0 {
                    $($value => Some(stringify!($name)),)*
                    _ => None,
                }
            }
        }
    };
}

status_codes! {
    (Good, 0x0000_0000, "The operation succeeded."),
    (Uncertain, 0x4000_0000, "The operation was uncertain."),
    (Bad, 0x8000_0000, "The operation failed."),
    (BadUnexpectedError, 0x8001_0000, "An unexpected error occurred."),
    (BadInternalError, 0x8002_0000, "An internal error occurred as a result of a programming or configuration error."),
    (BadOutOfMemory, 0x8003_0000, "Not enough memory to complete the operation."),
    (BadResourceUnavailable, 0x8004_0000, "An operating system resource is not available."),
    (BadCommunicationError, 0x8005_0000, "A low level communication error occurred."),
    (BadEncodingError, 0x8006_0000, "Encoding halted because of invalid data in the objects being serialized."),
    (BadDecodingError, 0x8007_0000, "Decoding halted because of invalid data in the stream."),
    (BadEncodingLimitsExceeded, 0x8008_0000, "The message encoding/decoding limits imposed by the stack have been exceeded."),
    (BadUnknownResponse, 0x8009_0000, "An unrecognized response was received from the server."),
    (BadTimeout, 0x800A_0000, "The operation timed out."),
    (BadServiceUnsupported, 0x800B_0000, "The server does not support the requested service."),
    (BadShutdown, 0x800C_0000, "The operation was cancelled because the application is shutting down."),
    (BadServerNotConnected, 0x800D_0000, "The operation could not complete because the client is not connected to the server."),
    (BadServerHalted, 0x800E_0000, "The server has stopped and cannot process any requests."),
    (BadNothingToDo, 0x800F_0000, "No processing could be done because there was nothing to do."),
    (BadTooManyOperations, 0x8010_0000, "The request could not be processed because it specified too many operations."),
    (BadDataTypeIdUnknown, 0x8011_0000, "The extension object cannot be (de)serialized because the data type id is not recognized."),
    (BadUserAccessDenied, 0x801F_0000, "User does not have permission to perform the requested operation."),
    (BadSessionIdInvalid, 0x8025_0000, "The session id is not valid."),
    (BadTimestampsToReturnInvalid, 0x802B_0000, "The timestamps to return parameter is invalid."),
    (BadNodeIdInvalid, 0x8033_0000, "The syntax of the node id is not valid."),
    (BadNodeIdUnknown, 0x8034_0000, "The node id refers to a node that does not exist in the server address space."),
    (BadAttributeIdInvalid, 0x8035_0000, "The attribute is not supported for the specified node."),
    (BadIndexRangeInvalid, 0x8036_0000, "The syntax of the index range parameter is invalid."),
    (BadIndexRangeNoData, 0x8037_0000, "No data exists within the range of indexes specified."),
    (BadDataEncodingInvalid, 0x8038_0000, "The data encoding is invalid."),
    (BadDataEncodingUnsupported, 0x8039_0000, "The server does not support the requested data encoding for the node."),
    (BadNotReadable, 0x803A_0000, "The access level does not allow reading or subscribing to the node."),
    (BadNotWritable, 0x803B_0000, "The access level does not allow writing to the node."),
    (BadOutOfRange, 0x803C_0000, "The value was out of range."),
    (BadNotSupported, 0x803D_0000, "The requested operation is not supported."),
    (BadNotFound, 0x803E_0000, "A requested item was not found or a search operation ended without success."),
    (BadTypeMismatch, 0x8074_0000, "The value supplied for the attribute is not of the same type as the attribute's value."),
    (BadInvalidArgument, 0x80AB_0000, "One or more arguments are invalid."),
}

impl StatusCode {
    /// Wrap a raw status code value.
    pub const fn from_u32(value: u32) -> Self {
        Self(value)
    }

    /// The raw status code value.
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// True if the severity is good.
    pub fn is_good(&self) -> bool {
        self.0 & SEVERITY_MASK == 0
    }

    /// True if the severity is uncertain.
    pub fn is_uncertain(&self) -> bool {
        self.0 & SEVERITY_MASK == SEVERITY_UNCERTAIN
    }

    /// True if the severity is bad.
    pub fn is_bad(&self) -> bool {
        self.0 & SEVERITY_BAD != 0
    }
}

impl UaNullable for StatusCode {
    fn is_ua_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for StatusCode {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<StatusCode> for u32 {
    fn from(value: StatusCode) -> Self {
        value.0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "StatusCode({:#010X})", self.0),
        }
    }
}

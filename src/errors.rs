// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! Errors raised by misuse of the library API, as opposed to errors
//! produced while encoding or decoding a document.

use thiserror::Error;

use crate::{StatusCode, VariantScalarTypeId};

/// Rust OpcUa specific errors
#[allow(missing_docs)]
#[derive(Error, Debug)]
pub enum OpcUaError {
    #[error("Received an unexpected variant type")]
    UnexpectedVariantType {
        variant_id: Option<VariantScalarTypeId>,
        message: String,
    },
    #[error("The requested namespace does not exist")]
    NamespaceDoesNotExist(String),
    #[error("Operation returned a StatusCode error: {0}")]
    StatusCodeError(StatusCode),
    #[error("Generic error: {0}")]
    Error(crate::Error),
}

impl From<StatusCode> for OpcUaError {
    fn from(value: StatusCode) -> Self {
        OpcUaError::StatusCodeError(value)
    }
}

impl From<crate::Error> for OpcUaError {
    fn from(value: crate::Error) -> Self {
        OpcUaError::Error(value)
    }
}

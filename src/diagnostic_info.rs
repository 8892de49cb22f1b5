// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Contains the implementation of `DiagnosticInfo`.

use crate::{status_code::StatusCode, string::UAString, UaNullable};

/// Detailed error and diagnostic information associated with a
/// StatusCode. The `i32` fields are indices into a string table carried
/// separately by the operation response; `None` corresponds to the `-1`
/// sentinel of the binary encoding and is not emitted on the JSON wire.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct DiagnosticInfo {
    /// A symbolic name for the status code.
    pub symbolic_id: Option<i32>,
    /// A namespace that qualifies the symbolic id.
    pub namespace_uri: Option<i32>,
    /// The locale used for the localized text.
    pub locale: Option<i32>,
    /// A human readable summary of the status code.
    pub localized_text: Option<i32>,
    /// Detailed application specific diagnostic information.
    pub additional_info: Option<UAString>,
    /// A status code provided by an underlying system.
    pub inner_status_code: Option<StatusCode>,
    /// Diagnostic info associated with the inner status code.
    pub inner_diagnostic_info: Option<Box<DiagnosticInfo>>,
}

impl UaNullable for DiagnosticInfo {
    fn is_ua_null(&self) -> bool {
        self.symbolic_id.is_none()
            && self.namespace_uri.is_none()
            && self.locale.is_none()
            && self.localized_text.is_none()
            && self.additional_info.is_none()
            && self.inner_status_code.is_none()
            && self.inner_diagnostic_info.is_none()
    }
}

impl DiagnosticInfo {
    /// Return an empty diagnostic info.
    pub fn null() -> DiagnosticInfo {
        DiagnosticInfo::default()
    }
}

// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Contains the definition of `DataValue`.

use crate::{date_time::DateTime, status_code::StatusCode, variant::Variant, UaNullable};

/// A value with an associated status code and timestamps. This is the
/// canonical result of reading the value of a node. Every field is
/// optional and absent fields are not emitted in the reversible form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataValue {
    /// The value.
    pub value: Option<Variant>,
    /// The status associated with the value. An absent status means Good.
    pub status: Option<StatusCode>,
    /// The time the value was sampled at the source.
    pub source_timestamp: Option<DateTime>,
    /// 10 picosecond intervals for the source timestamp.
    pub source_picoseconds: Option<u16>,
    /// The time the server obtained the value.
    pub server_timestamp: Option<DateTime>,
    /// 10 picosecond intervals for the server timestamp.
    pub server_picoseconds: Option<u16>,
}

impl UaNullable for DataValue {
    fn is_ua_null(&self) -> bool {
        self.value.is_none()
            && self.status.is_none()
            && self.source_timestamp.is_none()
            && self.source_picoseconds.is_none()
            && self.server_timestamp.is_none()
            && self.server_picoseconds.is_none()
    }
}

impl From<Variant> for DataValue {
    fn from(value: Variant) -> Self {
        DataValue {
            value: Some(value),
            ..Default::default()
        }
    }
}

impl DataValue {
    /// Create a data value with only a value set.
    pub fn new_now(value: impl Into<Variant>) -> DataValue {
        let now = DateTime::now();
        DataValue {
            value: Some(value.into()),
            status: Some(StatusCode::Good),
            source_timestamp: Some(now),
            server_timestamp: Some(now),
            ..Default::default()
        }
    }

    /// The status of this value, substituting Good when absent.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::Good)
    }

    /// Test if the status is good, i.e. the value is usable.
    pub fn is_valid(&self) -> bool {
        self.status().is_good()
    }
}

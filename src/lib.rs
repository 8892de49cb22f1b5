// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! The OPC UA JSON data encoding, as defined in OPC UA Part 6, section
//! 5.4, in both its reversible and non-reversible forms.
//!
//! The crate models the OPC UA built-in types, scalars through
//! [`Variant`] and [`ExtensionObject`], and provides a [`json::JsonEncoder`]
//! writing them to a streaming JSON writer and a [`json::JsonDecoder`]
//! reading them back out of a parsed document in any field order.
//!
//! ```
//! use opcua_json::{json::JsonCodec, ContextOwned, Variant};
//!
//! let codec = JsonCodec::new(ContextOwned::default());
//! let mut buffer = Vec::new();
//! let mut encoder = codec.encoder(&mut buffer);
//! encoder.write_variant(None, &Variant::from(42i32)).unwrap();
//! encoder.finish().unwrap();
//! assert_eq!(buffer, br#"{"Type":6,"Body":42}"#);
//! ```

#![warn(missing_docs)]

mod basic_types;
mod byte_string;
mod context;
mod data_value;
mod date_time;
mod diagnostic_info;
mod encoding;
mod errors;
mod expanded_node_id;
mod extension_object;
mod guid;
mod localized_text;
pub mod node_id;
mod qualified_name;
mod status_code;
mod string;
pub mod type_loader;
mod ua_enum;
mod variant;
mod xml_element;

pub mod json;

#[cfg(test)]
mod tests;

pub use basic_types::{ids, Argument, CoreTypeLoader, EUInformation, TimestampsToReturn};
pub use byte_string::ByteString;
pub use context::{Context, ContextOwned, NamespaceTable, UriTable, BASE_NAMESPACE_URI};
pub use data_value::DataValue;
pub use date_time::DateTime;
pub use diagnostic_info::DiagnosticInfo;
pub use encoding::{EncodingLimits, EncodingResult, Error, UaNullable, MAX_DECODING_DEPTH};
pub use errors::OpcUaError;
pub use expanded_node_id::ExpandedNodeId;
pub use extension_object::{
    DynEncodable, ExpandedMessageInfo, ExtensionObject, ExtensionObjectBody,
};
pub use guid::Guid;
pub use localized_text::LocalizedText;
pub use node_id::{Identifier, NodeId};
pub use qualified_name::QualifiedName;
pub use status_code::StatusCode;
pub use string::UAString;
pub use type_loader::{
    StaticTypeLoader, TypeLoader, TypeLoaderCollection, TypeLoaderInstance, TypeLoaderPriority,
};
pub use ua_enum::UaEnum;
pub use variant::{Array, Variant, VariantScalarTypeId};
pub use xml_element::XmlElement;

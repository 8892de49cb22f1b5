// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Core utilities for OPC-UA JSON encoding and decoding.
//!
//! The codec has two halves: [`JsonEncoder`] emits a document through a
//! streaming JSON writer, [`JsonDecoder`] parses the whole input into a
//! random-access document up front and reads it field by field, in any
//! order. Structured types participate through the [`JsonEncodable`] and
//! [`JsonDecodable`] hooks, which call back into the typed operations of
//! the codec.

mod decoder;
mod encoder;
mod provider;

pub use decoder::{JsonDecoder, JsonDecoderOptions, XmlLoadFun};
pub use encoder::{JsonEncoder, JsonEncoderOptions};
pub use provider::JsonCodec;

use crate::EncodingResult;

/// Trait for a structured type that can write itself to a JSON encoder.
///
/// The hook is invoked with the enclosing JSON object already open: an
/// implementation writes its *fields*, each through one of the typed
/// write operations with a field name, and nothing else.
pub trait JsonEncodable: std::fmt::Debug {
    /// Write the fields of this type to the encoder.
    fn encode(&self, encoder: &mut JsonEncoder<'_>) -> EncodingResult<()>;
}

/// Trait for a structured type that can read itself from a JSON decoder.
///
/// The decoder is positioned on the JSON element holding the value;
/// implementations read their fields by name, in any order.
pub trait JsonDecodable: Sized {
    /// Decode Self from the decoder.
    fn decode(decoder: &mut JsonDecoder<'_>) -> EncodingResult<Self>;
}

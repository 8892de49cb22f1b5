// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! The [`JsonDecoder`], reading OPC-UA values back out of a parsed JSON
//! document.
//!
//! The decoder owns the document and navigates it with an explicit
//! stack: reading a named field pushes the property, runs the typed read
//! against it and pops it again on every exit path. A named field that
//! is absent or null is never pushed; the read returns the default value
//! of its type instead. Since the document is random-access, property
//! order in the source has no effect on the result.

use std::{io::Cursor, io::Read, str::FromStr, sync::Arc};

use log::warn;
use serde_json::Value;

use crate::{
    node_id::Identifier, Array, ByteString, Context, DataValue, DateTime, DiagnosticInfo,
    DynEncodable, EncodingResult, Error, ExpandedNodeId, ExtensionObject, ExtensionObjectBody,
    Guid, LocalizedText, NodeId, QualifiedName, StatusCode, UAString, UaEnum, Variant,
    VariantScalarTypeId, XmlElement,
};

use super::JsonDecodable;

/// Deserialization hook for typed extension object bodies embedded as
/// XML. The XML codec is not part of this library; a caller that needs
/// typed XML bodies supplies one through [`JsonDecoderOptions`].
pub type XmlLoadFun = Arc<
    dyn Fn(&Context<'_>, &NodeId, &XmlElement) -> EncodingResult<Box<dyn DynEncodable>>
        + Send
        + Sync,
>;

/// Options for a [`JsonDecoder`].
#[derive(Clone, Default)]
pub struct JsonDecoderOptions {
    /// Hook used to decode typed extension object bodies carried as XML.
    /// Without one such bodies are preserved as raw [`XmlElement`]s.
    pub xml_loader: Option<XmlLoadFun>,
}

impl std::fmt::Debug for JsonDecoderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonDecoderOptions")
            .field("xml_loader", &self.xml_loader.is_some())
            .finish()
    }
}

enum PathElement {
    Field(String),
    Index(usize),
}

static JSON_NULL: Value = Value::Null;

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn unexpected_kind(value: &Value, expected: &str) -> Error {
    Error::encoding(format!(
        "Unexpected JSON {}, expected {}",
        kind_name(value),
        expected
    ))
}

// Named readers for the integer types that fit in a JSON number.
macro_rules! read_signed_method {
    ($name:ident, $t:ty) => {
        /// Read a number. A missing or null named field reads as zero.
        pub fn $name(&mut self, field: Option<&str>) -> EncodingResult<$t> {
            self.read_field(field, || Default::default(), |d| {
                let v = d.top();
                if v.is_null() {
                    return Ok(Default::default());
                }
                v.as_i64()
                    .and_then(|n| <$t>::try_from(n).ok())
                    .ok_or_else(|| unexpected_kind(v, stringify!($t)))
            })
        }
    };
}

macro_rules! read_unsigned_method {
    ($name:ident, $t:ty) => {
        /// Read a number. A missing or null named field reads as zero.
        pub fn $name(&mut self, field: Option<&str>) -> EncodingResult<$t> {
            self.read_field(field, || Default::default(), |d| {
                let v = d.top();
                if v.is_null() {
                    return Ok(Default::default());
                }
                v.as_u64()
                    .and_then(|n| <$t>::try_from(n).ok())
                    .ok_or_else(|| unexpected_kind(v, stringify!($t)))
            })
        }
    };
}

macro_rules! read_array_method {
    ($name:ident, $one:ident, $t:ty) => {
        /// Read an array. A missing or null named field reads as `None`.
        pub fn $name(&mut self, field: Option<&str>) -> EncodingResult<Option<Vec<$t>>> {
            self.read_array_with(field, |d| d.$one(None))
        }
    };
}

/// Decoder for the OPC-UA JSON encoding, operating on a document parsed
/// into memory. See the module documentation for the navigation model.
pub struct JsonDecoder<'a> {
    root: Value,
    stack: Vec<PathElement>,
    ctx: Context<'a>,
    options: JsonDecoderOptions,
}

impl<'a> JsonDecoder<'a> {
    /// Create a decoder over an already parsed document.
    pub fn new(root: Value, ctx: Context<'a>, options: JsonDecoderOptions) -> Self {
        Self {
            root,
            stack: Vec::new(),
            ctx,
            options,
        }
    }

    /// Create a decoder by parsing a byte slice.
    pub fn from_slice(
        data: &[u8],
        ctx: Context<'a>,
        options: JsonDecoderOptions,
    ) -> EncodingResult<Self> {
        let root = serde_json::from_slice(data)?;
        Ok(Self::new(root, ctx, options))
    }

    /// Create a decoder by reading a stream to its end.
    pub fn from_reader(
        reader: &mut dyn Read,
        ctx: Context<'a>,
        options: JsonDecoderOptions,
    ) -> EncodingResult<Self> {
        let root = serde_json::from_reader(reader)?;
        Ok(Self::new(root, ctx, options))
    }

    /// The encoding context this decoder works against.
    pub fn context(&self) -> &Context<'a> {
        &self.ctx
    }

    /// Does nothing. Present for interface parity with decoders for
    /// encodings that scope element names by namespace.
    pub fn push_namespace(&mut self, _namespace_uri: &str) {}

    /// Does nothing, see [`JsonDecoder::push_namespace`].
    pub fn pop_namespace(&mut self) {}

    /// The JSON element the decoder is currently positioned on.
    fn top(&self) -> &Value {
        let mut current = &self.root;
        for element in &self.stack {
            current = match element {
                PathElement::Field(name) => current.get(name.as_str()),
                PathElement::Index(index) => current.get(*index),
            }
            .unwrap_or(&JSON_NULL);
        }
        current
    }

    fn push(&mut self, element: PathElement) -> EncodingResult<()> {
        if self.stack.len() >= self.ctx.limits().max_decoding_depth {
            return Err(Error::encoding(
                "Decoding aborted, maximum nesting depth reached",
            ));
        }
        self.stack.push(element);
        Ok(())
    }

    fn pop(&mut self) {
        self.stack.pop();
    }

    /// Test if the current element has a property that is present and
    /// not null.
    fn has_field(&self, name: &str) -> bool {
        matches!(self.top().get(name), Some(v) if !v.is_null())
    }

    /// Push the named property if it is present and not null, reporting
    /// whether it was pushed.
    fn try_push_field(&mut self, name: &str) -> EncodingResult<bool> {
        if !self.has_field(name) {
            return Ok(false);
        }
        self.push(PathElement::Field(name.to_owned()))?;
        Ok(true)
    }

    /// Run `read` against the named property, or produce the default if
    /// it is missing or null. The property is popped on every exit path.
    fn read_field<T>(
        &mut self,
        field: Option<&str>,
        default: impl FnOnce() -> T,
        read: impl FnOnce(&mut Self) -> EncodingResult<T>,
    ) -> EncodingResult<T> {
        match field {
            Some(name) => {
                if !self.try_push_field(name)? {
                    return Ok(default());
                }
                let result = read(self);
                self.pop();
                result
            }
            None => read(self),
        }
    }

    /// Read a boolean. A missing or null named field reads as false.
    pub fn read_bool(&mut self, field: Option<&str>) -> EncodingResult<bool> {
        self.read_field(field, || false, |d| {
            let v = d.top();
            if v.is_null() {
                return Ok(false);
            }
            v.as_bool().ok_or_else(|| unexpected_kind(v, "boolean"))
        })
    }

    read_signed_method!(read_i8, i8);
    read_unsigned_method!(read_u8, u8);
    read_signed_method!(read_i16, i16);
    read_unsigned_method!(read_u16, u16);
    read_signed_method!(read_i32, i32);
    read_unsigned_method!(read_u32, u32);

    /// Read a 64-bit signed integer. Both the JSON string form mandated
    /// for 64-bit values and a plain JSON number are accepted.
    pub fn read_i64(&mut self, field: Option<&str>) -> EncodingResult<i64> {
        self.read_field(field, || 0, |d| {
            let v = d.top();
            match v {
                Value::Null => Ok(0),
                Value::Number(n) => n.as_i64().ok_or_else(|| unexpected_kind(v, "i64")),
                Value::String(s) => s
                    .parse::<i64>()
                    .map_err(|e| Error::encoding(format!("Cannot parse i64 {s:?}: {e}"))),
                other => Err(unexpected_kind(other, "i64")),
            }
        })
    }

    /// Read a 64-bit unsigned integer. Both the JSON string form
    /// mandated for 64-bit values and a plain JSON number are accepted.
    pub fn read_u64(&mut self, field: Option<&str>) -> EncodingResult<u64> {
        self.read_field(field, || 0, |d| {
            let v = d.top();
            match v {
                Value::Null => Ok(0),
                Value::Number(n) => n.as_u64().ok_or_else(|| unexpected_kind(v, "u64")),
                Value::String(s) => s
                    .parse::<u64>()
                    .map_err(|e| Error::encoding(format!("Cannot parse u64 {s:?}: {e}"))),
                other => Err(unexpected_kind(other, "u64")),
            }
        })
    }

    fn read_f64_value(&mut self) -> EncodingResult<f64> {
        let v = self.top();
        match v {
            Value::Null => Ok(0.0),
            Value::Number(n) => n.as_f64().ok_or_else(|| unexpected_kind(v, "number")),
            Value::String(s) => match s.as_str() {
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                "NaN" => Ok(f64::NAN),
                // Not part of the encoding, but parsing numeric strings
                // costs nothing and helps interoperability.
                other => other
                    .parse::<f64>()
                    .map_err(|e| Error::encoding(format!("Cannot parse number {other:?}: {e}"))),
            },
            other => Err(unexpected_kind(other, "number")),
        }
    }

    /// Read a single precision float, accepting the string forms of NaN
    /// and the infinities.
    pub fn read_f32(&mut self, field: Option<&str>) -> EncodingResult<f32> {
        self.read_field(field, || 0.0, |d| d.read_f64_value().map(|v| v as f32))
    }

    /// Read a double precision float, accepting the string forms of NaN
    /// and the infinities.
    pub fn read_f64(&mut self, field: Option<&str>) -> EncodingResult<f64> {
        self.read_field(field, || 0.0, |d| d.read_f64_value())
    }

    fn read_string_value(&mut self) -> EncodingResult<UAString> {
        let v = self.top();
        match v {
            Value::Null => Ok(UAString::null()),
            Value::String(s) => {
                let max = self.ctx.limits().max_string_length;
                if max > 0 && s.len() > max {
                    Err(Error::limits_exceeded(format!(
                        "String length {} exceeds configured limit {}",
                        s.len(),
                        max
                    )))
                } else {
                    Ok(UAString::from(s.as_str()))
                }
            }
            other => Err(unexpected_kind(other, "string")),
        }
    }

    /// Read a string. A missing or null named field reads as the null
    /// string.
    pub fn read_string(&mut self, field: Option<&str>) -> EncodingResult<UAString> {
        self.read_field(field, UAString::null, |d| d.read_string_value())
    }

    /// Read a date time from its ISO 8601 form, clamping values outside
    /// the representable range.
    pub fn read_date_time(&mut self, field: Option<&str>) -> EncodingResult<DateTime> {
        self.read_field(field, DateTime::null, |d| {
            let v = d.top();
            match v {
                Value::Null => Ok(DateTime::null()),
                Value::String(s) => DateTime::from_str(s),
                other => Err(unexpected_kind(other, "date time string")),
            }
        })
    }

    /// Read a Guid from its hyphenated string form.
    pub fn read_guid(&mut self, field: Option<&str>) -> EncodingResult<Guid> {
        self.read_field(field, Guid::null, |d| {
            let v = d.top();
            match v {
                Value::Null => Ok(Guid::null()),
                Value::String(s) => Guid::from_str(s).map_err(|e| {
                    warn!("Unable to decode GUID {s:?}");
                    Error::encoding(format!("Cannot parse Guid {s:?}: {e}"))
                }),
                other => Err(unexpected_kind(other, "guid string")),
            }
        })
    }

    fn read_byte_string_value(&mut self) -> EncodingResult<ByteString> {
        let v = self.top();
        match v {
            Value::Null => Ok(ByteString::null()),
            Value::String(s) => {
                let bytes = ByteString::from_base64(s)
                    .ok_or_else(|| Error::encoding("Cannot decode base64 byte string"))?;
                let max = self.ctx.limits().max_byte_string_length;
                if max > 0 && bytes.as_ref().len() > max {
                    Err(Error::limits_exceeded(format!(
                        "ByteString length {} exceeds configured limit {}",
                        bytes.as_ref().len(),
                        max
                    )))
                } else {
                    Ok(bytes)
                }
            }
            other => Err(unexpected_kind(other, "base64 string")),
        }
    }

    /// Read a byte string from its base64 form.
    pub fn read_byte_string(&mut self, field: Option<&str>) -> EncodingResult<ByteString> {
        self.read_field(field, ByteString::null, |d| d.read_byte_string_value())
    }

    /// Read an XML element, stored on the wire as a string.
    pub fn read_xml_element(&mut self, field: Option<&str>) -> EncodingResult<XmlElement> {
        Ok(XmlElement::from(self.read_string(field)?))
    }

    /// Read a status code from its numeric form.
    pub fn read_status_code(&mut self, field: Option<&str>) -> EncodingResult<StatusCode> {
        Ok(StatusCode::from_u32(self.read_u32(field)?))
    }

    /// Read an enumeration value. Only the numeric reversible form is
    /// accepted; the `Name_Value` string form does not round-trip.
    pub fn read_enum<T>(&mut self, field: Option<&str>) -> EncodingResult<T>
    where
        T: UaEnum<Repr = i32>,
    {
        T::from_repr(self.read_i32(field)?)
    }

    fn read_identifier(&mut self, id_type: u16) -> EncodingResult<Identifier> {
        match id_type {
            0 => Ok(Identifier::Numeric(self.read_u32(Some("Id"))?)),
            1 => {
                let s = self.read_string(Some("Id"))?;
                if s.is_empty() {
                    Err(Error::encoding("Invalid node ID, empty identifier"))
                } else {
                    Ok(Identifier::String(s))
                }
            }
            2 => {
                if !self.try_push_field("Id")? {
                    return Err(Error::encoding("Invalid node ID, missing identifier"));
                }
                let guid = self.read_guid(None);
                self.pop();
                Ok(Identifier::Guid(guid?))
            }
            3 => {
                let b = self.read_byte_string(Some("Id"))?;
                if b.is_null() || b.is_empty() {
                    Err(Error::encoding("Invalid node ID, missing identifier"))
                } else {
                    Ok(Identifier::ByteString(b))
                }
            }
            r => Err(Error::encoding(format!(
                "Failed to deserialize node ID, got unexpected IdType {r}"
            ))),
        }
    }

    fn read_node_id_value(&mut self) -> EncodingResult<NodeId> {
        let v = self.top();
        match v {
            Value::Null => return Ok(NodeId::null()),
            Value::Object(_) => (),
            other => return Err(unexpected_kind(other, "NodeId object")),
        }
        let id_type = self.read_u16(Some("IdType"))?;
        let namespace = self.read_u16(Some("Namespace"))?;
        let identifier = self.read_identifier(id_type)?;
        Ok(NodeId {
            namespace,
            identifier,
        })
    }

    /// Read a node id.
    pub fn read_node_id(&mut self, field: Option<&str>) -> EncodingResult<NodeId> {
        self.read_field(field, NodeId::null, |d| d.read_node_id_value())
    }

    fn read_expanded_node_id_value(&mut self) -> EncodingResult<ExpandedNodeId> {
        let v = self.top();
        match v {
            Value::Null => return Ok(ExpandedNodeId::null()),
            Value::Object(_) => (),
            other => return Err(unexpected_kind(other, "ExpandedNodeId object")),
        }
        let id_type = self.read_u16(Some("IdType"))?;
        let server_index = self.read_u32(Some("ServerUri"))?;
        let (namespace, namespace_uri) = match self.top().get("Namespace") {
            None | Some(Value::Null) => (0, UAString::null()),
            Some(Value::Number(_)) => (self.read_u16(Some("Namespace"))?, UAString::null()),
            Some(Value::String(s)) => (0, UAString::from(s.as_str())),
            Some(other) => return Err(unexpected_kind(other, "number or string")),
        };
        let identifier = self.read_identifier(id_type)?;
        Ok(ExpandedNodeId {
            node_id: NodeId {
                namespace,
                identifier,
            },
            namespace_uri,
            server_index,
        })
    }

    /// Read an expanded node id. A JSON number in `Namespace` is the
    /// namespace index, a JSON string an explicit namespace URI.
    pub fn read_expanded_node_id(
        &mut self,
        field: Option<&str>,
    ) -> EncodingResult<ExpandedNodeId> {
        self.read_field(field, ExpandedNodeId::null, |d| {
            d.read_expanded_node_id_value()
        })
    }

    fn read_qualified_name_value(&mut self) -> EncodingResult<QualifiedName> {
        let v = self.top();
        match v {
            Value::Null => return Ok(QualifiedName::null()),
            Value::Object(_) => (),
            other => return Err(unexpected_kind(other, "QualifiedName object")),
        }
        let name = self.read_string(Some("Name"))?;
        let namespace_index = match self.top().get("Uri") {
            None | Some(Value::Null) => 0,
            Some(Value::Number(_)) => self.read_u16(Some("Uri"))?,
            // The non-reversible form carries the resolved URI; accept
            // it when it maps back onto the namespace table.
            Some(Value::String(s)) => self.ctx.namespaces().index_of(s).ok_or_else(|| {
                Error::encoding(format!("Unknown namespace URI {s:?} in qualified name"))
            })?,
            Some(other) => return Err(unexpected_kind(other, "number or string")),
        };
        Ok(QualifiedName {
            namespace_index,
            name,
        })
    }

    /// Read a qualified name.
    pub fn read_qualified_name(&mut self, field: Option<&str>) -> EncodingResult<QualifiedName> {
        self.read_field(field, QualifiedName::null, |d| d.read_qualified_name_value())
    }

    fn read_localized_text_value(&mut self) -> EncodingResult<LocalizedText> {
        let v = self.top();
        match v {
            Value::Null => Ok(LocalizedText::null()),
            // The non-reversible form is the bare text
            Value::String(s) => Ok(LocalizedText {
                locale: UAString::null(),
                text: UAString::from(s.as_str()),
            }),
            Value::Object(_) => Ok(LocalizedText {
                locale: self.read_string(Some("Locale"))?,
                text: self.read_string(Some("Text"))?,
            }),
            other => Err(unexpected_kind(other, "LocalizedText object")),
        }
    }

    /// Read a localized text. The bare string of the non-reversible form
    /// is accepted and becomes the text with no locale.
    pub fn read_localized_text(&mut self, field: Option<&str>) -> EncodingResult<LocalizedText> {
        self.read_field(field, LocalizedText::null, |d| d.read_localized_text_value())
    }

    fn read_data_value_value(&mut self) -> EncodingResult<DataValue> {
        let v = self.top();
        match v {
            Value::Null => return Ok(DataValue::default()),
            Value::Object(_) => (),
            other => return Err(unexpected_kind(other, "DataValue object")),
        }
        let mut dv = DataValue::default();
        if self.has_field("Value") {
            dv.value = Some(self.read_variant(Some("Value"))?);
        }
        if self.has_field("Status") {
            dv.status = Some(self.read_status_code(Some("Status"))?);
        }
        if self.has_field("SourceTimestamp") {
            dv.source_timestamp = Some(self.read_date_time(Some("SourceTimestamp"))?);
        }
        if self.has_field("SourcePicoseconds") {
            dv.source_picoseconds = Some(self.read_u16(Some("SourcePicoseconds"))?);
        }
        if self.has_field("ServerTimestamp") {
            dv.server_timestamp = Some(self.read_date_time(Some("ServerTimestamp"))?);
        }
        if self.has_field("ServerPicoseconds") {
            dv.server_picoseconds = Some(self.read_u16(Some("ServerPicoseconds"))?);
        }
        Ok(dv)
    }

    /// Read a data value.
    pub fn read_data_value(&mut self, field: Option<&str>) -> EncodingResult<DataValue> {
        self.read_field(field, DataValue::default, |d| d.read_data_value_value())
    }

    fn read_diagnostic_info_value(&mut self) -> EncodingResult<DiagnosticInfo> {
        let v = self.top();
        match v {
            Value::Null => return Ok(DiagnosticInfo::null()),
            Value::Object(_) => (),
            other => return Err(unexpected_kind(other, "DiagnosticInfo object")),
        }
        let mut di = DiagnosticInfo::null();
        if self.has_field("SymbolicId") {
            di.symbolic_id = Some(self.read_i32(Some("SymbolicId"))?);
        }
        if self.has_field("NamespaceUri") {
            di.namespace_uri = Some(self.read_i32(Some("NamespaceUri"))?);
        }
        if self.has_field("Locale") {
            di.locale = Some(self.read_i32(Some("Locale"))?);
        }
        if self.has_field("LocalizedText") {
            di.localized_text = Some(self.read_i32(Some("LocalizedText"))?);
        }
        if self.has_field("AdditionalInfo") {
            di.additional_info = Some(self.read_string(Some("AdditionalInfo"))?);
        }
        if self.has_field("InnerStatusCode") {
            di.inner_status_code = Some(self.read_status_code(Some("InnerStatusCode"))?);
        }
        if self.has_field("InnerDiagnosticInfo") {
            di.inner_diagnostic_info = Some(Box::new(
                self.read_diagnostic_info(Some("InnerDiagnosticInfo"))?,
            ));
        }
        Ok(di)
    }

    /// Read a diagnostic info, including its chain of inner infos. The
    /// nesting depth limit applies to the chain.
    pub fn read_diagnostic_info(&mut self, field: Option<&str>) -> EncodingResult<DiagnosticInfo> {
        self.read_field(field, DiagnosticInfo::null, |d| {
            d.read_diagnostic_info_value()
        })
    }

    fn read_variant_scalar(&mut self, type_id: VariantScalarTypeId) -> EncodingResult<Variant> {
        Ok(match type_id {
            VariantScalarTypeId::Boolean => Variant::Boolean(self.read_bool(None)?),
            VariantScalarTypeId::SByte => Variant::SByte(self.read_i8(None)?),
            VariantScalarTypeId::Byte => Variant::Byte(self.read_u8(None)?),
            VariantScalarTypeId::Int16 => Variant::Int16(self.read_i16(None)?),
            VariantScalarTypeId::UInt16 => Variant::UInt16(self.read_u16(None)?),
            VariantScalarTypeId::Int32 => Variant::Int32(self.read_i32(None)?),
            VariantScalarTypeId::UInt32 => Variant::UInt32(self.read_u32(None)?),
            VariantScalarTypeId::Int64 => Variant::Int64(self.read_i64(None)?),
            VariantScalarTypeId::UInt64 => Variant::UInt64(self.read_u64(None)?),
            VariantScalarTypeId::Float => Variant::Float(self.read_f32(None)?),
            VariantScalarTypeId::Double => Variant::Double(self.read_f64(None)?),
            VariantScalarTypeId::String => Variant::String(self.read_string(None)?),
            VariantScalarTypeId::DateTime => Variant::DateTime(self.read_date_time(None)?),
            VariantScalarTypeId::Guid => Variant::Guid(self.read_guid(None)?),
            VariantScalarTypeId::ByteString => Variant::ByteString(self.read_byte_string(None)?),
            VariantScalarTypeId::XmlElement => Variant::XmlElement(self.read_xml_element(None)?),
            VariantScalarTypeId::NodeId => Variant::NodeId(self.read_node_id(None)?),
            VariantScalarTypeId::ExpandedNodeId => {
                Variant::ExpandedNodeId(self.read_expanded_node_id(None)?)
            }
            VariantScalarTypeId::StatusCode => Variant::StatusCode(self.read_status_code(None)?),
            VariantScalarTypeId::QualifiedName => {
                Variant::QualifiedName(self.read_qualified_name(None)?)
            }
            VariantScalarTypeId::LocalizedText => {
                Variant::LocalizedText(self.read_localized_text(None)?)
            }
            VariantScalarTypeId::ExtensionObject => {
                Variant::ExtensionObject(self.read_extension_object(None)?)
            }
            VariantScalarTypeId::DataValue => {
                Variant::DataValue(Box::new(self.read_data_value(None)?))
            }
            VariantScalarTypeId::Variant => Variant::Variant(Box::new(self.read_variant(None)?)),
            VariantScalarTypeId::DiagnosticInfo => {
                Variant::DiagnosticInfo(Box::new(self.read_diagnostic_info(None)?))
            }
        })
    }

    fn read_variant_matrix(
        &mut self,
        dimensions: &[u32],
        level: usize,
        type_id: VariantScalarTypeId,
        out: &mut Vec<Variant>,
    ) -> EncodingResult<()> {
        let len = match self.top().as_array() {
            Some(a) => a.len(),
            None => {
                return Err(Error::encoding(format!(
                    "Multi-dimensional variant body must nest {} levels of arrays",
                    dimensions.len()
                )))
            }
        };
        if len != dimensions[level] as usize {
            return Err(Error::encoding(format!(
                "Variant body length {} does not match dimension {} at level {}",
                len, dimensions[level], level
            )));
        }
        for i in 0..len {
            self.push(PathElement::Index(i))?;
            let result = if level + 1 == dimensions.len() {
                if self.top().is_array() {
                    Err(Error::encoding(
                        "Multi-dimensional variant body nests deeper than its dimensions",
                    ))
                } else {
                    self.read_variant_scalar(type_id).map(|v| out.push(v))
                }
            } else {
                self.read_variant_matrix(dimensions, level + 1, type_id, out)
            };
            self.pop();
            result?;
        }
        Ok(())
    }

    fn read_variant_value(&mut self) -> EncodingResult<Variant> {
        let v = self.top();
        match v {
            Value::Null => return Ok(Variant::Empty),
            Value::Object(_) => (),
            other => return Err(unexpected_kind(other, "Variant object")),
        }
        let raw_type = self.read_u32(Some("Type"))?;
        if raw_type == 0 {
            return Ok(Variant::Empty);
        }
        let type_id = VariantScalarTypeId::try_from(raw_type)
            .map_err(|_| Error::encoding(format!("Unsupported variant type {raw_type}")))?;
        if self.top().get("Body").is_none() {
            return Err(Error::encoding("Variant is missing its Body"));
        }
        let dimensions = match self.read_i32_array(Some("Dimensions"))? {
            Some(dims) => {
                let mut out = Vec::with_capacity(dims.len());
                for d in dims {
                    out.push(u32::try_from(d).map_err(|_| {
                        Error::encoding(format!("Negative variant dimension {d}"))
                    })?);
                }
                Some(out)
            }
            None => None,
        };
        match dimensions {
            Some(dims) if dims.len() > 1 => {
                let product = dims
                    .iter()
                    .try_fold(1u64, |acc, d| acc.checked_mul(*d as u64))
                    .ok_or_else(|| {
                        Error::limits_exceeded("Variant dimension product overflows")
                    })?;
                let max = self.ctx.limits().max_array_length;
                // Checked up front, before any array contents are read
                if max > 0 && product > max as u64 {
                    return Err(Error::limits_exceeded(format!(
                        "Variant dimension product {} exceeds configured limit {}",
                        product, max
                    )));
                }
                if !self.try_push_field("Body")? {
                    return Err(Error::encoding(
                        "Multi-dimensional variant body must be an array",
                    ));
                }
                let mut values = Vec::new();
                let result = self.read_variant_matrix(&dims, 0, type_id, &mut values);
                self.pop();
                result?;
                Ok(Variant::Array(Box::new(Array::new_multi(
                    type_id, values, dims,
                )?)))
            }
            dims => {
                // Scalar or one-dimensional, decided by the shape of the body
                let is_array = matches!(self.top().get("Body"), Some(Value::Array(_)));
                if is_array {
                    let values = self
                        .read_array_with(Some("Body"), |d| d.read_variant_scalar(type_id))?
                        .unwrap_or_default();
                    let array = match dims {
                        Some(d) => Array::new_multi(type_id, values, d)?,
                        None => Array::new(type_id, values)?,
                    };
                    Ok(Variant::Array(Box::new(array)))
                } else if dims.is_some() {
                    Err(Error::encoding(
                        "Unexpected dimensions for scalar variant value",
                    ))
                } else if !self.try_push_field("Body")? {
                    // An explicit null body decodes as the default value
                    Ok(Variant::default_scalar(type_id))
                } else {
                    let result = self.read_variant_scalar(type_id);
                    self.pop();
                    result
                }
            }
        }
    }

    /// Read a variant. Multi-dimensional bodies are validated against
    /// their `Dimensions` and flattened row-major.
    pub fn read_variant(&mut self, field: Option<&str>) -> EncodingResult<Variant> {
        self.read_field(field, || Variant::Empty, |d| d.read_variant_value())
    }

    fn load_structured(&mut self, node_id: &NodeId) -> EncodingResult<Box<dyn DynEncodable>> {
        let loaders = self.ctx.loaders();
        for loader in loaders {
            if let Some(result) = loader.load_from_json(node_id, self) {
                return result;
            }
        }
        warn!("No type loader defined for {node_id}");
        Err(Error::encoding(format!(
            "No type loader defined for {node_id}"
        )))
    }

    fn load_binary(
        &mut self,
        node_id: &NodeId,
        stream: &mut dyn Read,
    ) -> EncodingResult<Box<dyn DynEncodable>> {
        let ctx = self.ctx.clone();
        let loaders = self.ctx.loaders();
        for loader in loaders {
            if let Some(result) = loader.load_from_binary(node_id, stream, &ctx) {
                return result;
            }
        }
        Err(Error::encoding(format!(
            "No type loader defined for {node_id}"
        )))
    }

    fn read_extension_object_value(&mut self) -> EncodingResult<ExtensionObject> {
        let v = self.top();
        match v {
            Value::Null => return Ok(ExtensionObject::null()),
            Value::Object(_) => (),
            other => return Err(unexpected_kind(other, "ExtensionObject object")),
        }
        let encoding = self.read_u32(Some("Encoding"))?;
        if encoding > 2 {
            return Err(Error::encoding(format!(
                "Unexpected extension object encoding {encoding}"
            )));
        }
        let type_id = self.read_node_id(Some("TypeId"))?;
        let expanded = ExpandedNodeId::from(&type_id);
        match encoding {
            0 => {
                if !self.try_push_field("Body")? {
                    return Ok(ExtensionObject {
                        type_id: expanded,
                        body: ExtensionObjectBody::None,
                    });
                }
                let result = if self.top().is_object() {
                    self.load_structured(&type_id)
                } else {
                    Err(unexpected_kind(self.top(), "structured body object"))
                };
                self.pop();
                Ok(ExtensionObject {
                    type_id: expanded,
                    body: ExtensionObjectBody::Encodable(result?),
                })
            }
            1 => {
                let bytes = self.read_byte_string(Some("Body"))?;
                let Some(raw) = bytes.value else {
                    return Ok(ExtensionObject {
                        type_id: expanded,
                        body: ExtensionObjectBody::None,
                    });
                };
                let mut cursor = Cursor::new(raw);
                let body = self.load_binary(&type_id, &mut cursor)?;
                Ok(ExtensionObject {
                    type_id: expanded,
                    body: ExtensionObjectBody::Encodable(body),
                })
            }
            _ => {
                let xml = self.read_xml_element(Some("Body"))?;
                if xml.is_null() {
                    return Ok(ExtensionObject {
                        type_id: expanded,
                        body: ExtensionObjectBody::None,
                    });
                }
                match self.options.xml_loader.clone() {
                    Some(loader) => {
                        let body = loader(&self.ctx, &type_id, &xml)?;
                        Ok(ExtensionObject {
                            type_id: expanded,
                            body: ExtensionObjectBody::Encodable(body),
                        })
                    }
                    // Without an XML decoder the fragment is preserved as is
                    None => Ok(ExtensionObject {
                        type_id: expanded,
                        body: ExtensionObjectBody::Xml(xml),
                    }),
                }
            }
        }
    }

    /// Read an extension object, reifying structured bodies through the
    /// type loaders on the context.
    pub fn read_extension_object(&mut self, field: Option<&str>) -> EncodingResult<ExtensionObject> {
        self.read_field(field, ExtensionObject::null, |d| {
            d.read_extension_object_value()
        })
    }

    /// Read a structured value through its [`JsonDecodable`] hook. A
    /// missing named field decodes as the all-default instance.
    pub fn read_encodable<T>(&mut self, field: Option<&str>) -> EncodingResult<T>
    where
        T: JsonDecodable,
    {
        match field {
            Some(name) => {
                // Pushed even when absent: the hook then reads defaults
                // for all of its fields.
                self.push(PathElement::Field(name.to_owned()))?;
                let result = T::decode(self);
                self.pop();
                result
            }
            None => T::decode(self),
        }
    }

    /// Decode a whole message from the root object of the document. The
    /// counterpart of [`super::JsonEncoder::encode_message`].
    pub fn decode_message<T>(&mut self) -> EncodingResult<T>
    where
        T: JsonDecodable,
    {
        T::decode(self)
    }

    fn read_array_value<T>(
        &mut self,
        mut read_one: impl FnMut(&mut Self) -> EncodingResult<T>,
    ) -> EncodingResult<Option<Vec<T>>> {
        let v = self.top();
        let len = match v {
            Value::Null => return Ok(None),
            Value::Array(a) => a.len(),
            other => return Err(unexpected_kind(other, "array")),
        };
        let max = self.ctx.limits().max_array_length;
        if max > 0 && len > max {
            return Err(Error::limits_exceeded(format!(
                "Array length {} exceeds configured limit {}",
                len, max
            )));
        }
        let mut out = Vec::with_capacity(len);
        for i in 0..len {
            self.push(PathElement::Index(i))?;
            let result = read_one(self);
            self.pop();
            out.push(result?);
        }
        Ok(Some(out))
    }

    /// Read an array with an element reader. A missing or null named
    /// field reads as `None`, anything but a JSON array is an error.
    pub fn read_array_with<T>(
        &mut self,
        field: Option<&str>,
        read_one: impl FnMut(&mut Self) -> EncodingResult<T>,
    ) -> EncodingResult<Option<Vec<T>>> {
        match field {
            Some(name) => {
                if !self.try_push_field(name)? {
                    return Ok(None);
                }
                let result = self.read_array_value(read_one);
                self.pop();
                result
            }
            None => self.read_array_value(read_one),
        }
    }

    /// Read an array of enumeration values.
    pub fn read_enum_array<T>(&mut self, field: Option<&str>) -> EncodingResult<Option<Vec<T>>>
    where
        T: UaEnum<Repr = i32>,
    {
        self.read_array_with(field, |d| d.read_enum(None))
    }

    /// Read an array of structured values.
    pub fn read_encodable_array<T>(
        &mut self,
        field: Option<&str>,
    ) -> EncodingResult<Option<Vec<T>>>
    where
        T: JsonDecodable,
    {
        self.read_array_with(field, |d| d.read_encodable(None))
    }

    read_array_method!(read_bool_array, read_bool, bool);
    read_array_method!(read_i8_array, read_i8, i8);
    read_array_method!(read_u8_array, read_u8, u8);
    read_array_method!(read_i16_array, read_i16, i16);
    read_array_method!(read_u16_array, read_u16, u16);
    read_array_method!(read_i32_array, read_i32, i32);
    read_array_method!(read_u32_array, read_u32, u32);
    read_array_method!(read_i64_array, read_i64, i64);
    read_array_method!(read_u64_array, read_u64, u64);
    read_array_method!(read_f32_array, read_f32, f32);
    read_array_method!(read_f64_array, read_f64, f64);
    read_array_method!(read_string_array, read_string, UAString);
    read_array_method!(read_date_time_array, read_date_time, DateTime);
    read_array_method!(read_guid_array, read_guid, Guid);
    read_array_method!(read_byte_string_array, read_byte_string, ByteString);
    read_array_method!(read_xml_element_array, read_xml_element, XmlElement);
    read_array_method!(read_status_code_array, read_status_code, StatusCode);
    read_array_method!(read_node_id_array, read_node_id, NodeId);
    read_array_method!(
        read_expanded_node_id_array,
        read_expanded_node_id,
        ExpandedNodeId
    );
    read_array_method!(read_qualified_name_array, read_qualified_name, QualifiedName);
    read_array_method!(read_localized_text_array, read_localized_text, LocalizedText);
    read_array_method!(read_data_value_array, read_data_value, DataValue);
    read_array_method!(read_variant_array, read_variant, Variant);
    read_array_method!(
        read_extension_object_array,
        read_extension_object,
        ExtensionObject
    );
    read_array_method!(
        read_diagnostic_info_array,
        read_diagnostic_info,
        DiagnosticInfo
    );
}

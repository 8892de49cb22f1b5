// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! The [`JsonEncoder`], emitting OPC-UA values as JSON through a
//! streaming writer.

use std::io::Write;

use struson::writer::{JsonStreamWriter, JsonWriter, WriterSettings};

use crate::{
    ByteString, Context, DataValue, DateTime, DiagnosticInfo, EncodingResult, Error,
    ExpandedNodeId, ExtensionObject, ExtensionObjectBody, Guid, LocalizedText, NodeId,
    QualifiedName, StatusCode, UAString, UaEnum, UaNullable, Variant, XmlElement,
    node_id::Identifier,
};

use super::JsonEncodable;

const VALUE_INFINITY: &str = "Infinity";
const VALUE_NEG_INFINITY: &str = "-Infinity";
const VALUE_NAN: &str = "NaN";

/// Options for a [`JsonEncoder`].
#[derive(Debug, Clone)]
pub struct JsonEncoderOptions {
    /// Emit the reversible form. On by default. The non-reversible form
    /// is lossy and meant for consumers such as dashboards: default
    /// fields are written explicitly, envelopes are dropped, and
    /// namespace and server indexes are resolved to URIs.
    pub reversible: bool,
    /// Pretty print the output.
    pub indented: bool,
}

impl Default for JsonEncoderOptions {
    fn default() -> Self {
        Self {
            reversible: true,
            indented: false,
        }
    }
}

/// Streaming encoder for the OPC-UA JSON encoding.
///
/// Every write operation takes an optional field name. With a name the
/// operation emits a property inside the currently open JSON object, and
/// in the reversible form a named default value is not emitted at all.
/// Without a name the bare value is emitted; this is how array elements
/// and variant bodies are written.
pub struct JsonEncoder<'a> {
    stream: JsonStreamWriter<&'a mut dyn Write>,
    ctx: Context<'a>,
    reversible: bool,
}

// Writers for integers that fit in a JSON number, and for the JSON
// string form used by the 64-bit types.
macro_rules! write_number_method {
    ($name:ident, $t:ty) => {
        /// Write a number, eliding named defaults in the reversible form.
        pub fn $name(&mut self, field: Option<&str>, value: $t) -> EncodingResult<()> {
            if self.elide(field, &value) {
                return Ok(());
            }
            self.begin_field(field)?;
            self.stream.number_value(value)?;
            Ok(())
        }
    };
}

macro_rules! write_number_as_string_method {
    ($name:ident, $t:ty) => {
        /// Write a 64-bit number as a base-10 JSON string, eliding named
        /// defaults in the reversible form.
        pub fn $name(&mut self, field: Option<&str>, value: $t) -> EncodingResult<()> {
            if self.elide(field, &value) {
                return Ok(());
            }
            self.begin_field(field)?;
            self.stream.string_value(&value.to_string())?;
            Ok(())
        }
    };
}

macro_rules! write_float_method {
    ($name:ident, $t:ty) => {
        /// Write a floating point number. NaN and the infinities are not
        /// valid JSON numbers and are written as strings.
        pub fn $name(&mut self, field: Option<&str>, value: $t) -> EncodingResult<()> {
            if self.elide(field, &value) {
                return Ok(());
            }
            self.begin_field(field)?;
            if value.is_infinite() {
                if value.is_sign_positive() {
                    self.stream.string_value(VALUE_INFINITY)?;
                } else {
                    self.stream.string_value(VALUE_NEG_INFINITY)?;
                }
            } else if value.is_nan() {
                self.stream.string_value(VALUE_NAN)?;
            } else {
                self.stream.fp_number_value(value)?;
            }
            Ok(())
        }
    };
}

macro_rules! write_array_copy_method {
    ($name:ident, $one:ident, $t:ty) => {
        /// Write an array, or null / nothing for the absent array.
        pub fn $name(&mut self, field: Option<&str>, values: Option<&[$t]>) -> EncodingResult<()> {
            self.write_array_with(field, values, |enc, v| enc.$one(None, *v))
        }
    };
}

macro_rules! write_array_ref_method {
    ($name:ident, $one:ident, $t:ty) => {
        /// Write an array, or null / nothing for the absent array.
        pub fn $name(&mut self, field: Option<&str>, values: Option<&[$t]>) -> EncodingResult<()> {
            self.write_array_with(field, values, |enc, v| enc.$one(None, v))
        }
    };
}

impl<'a> JsonEncoder<'a> {
    /// Create an encoder writing to `sink`.
    pub fn new(
        sink: &'a mut dyn Write,
        ctx: Context<'a>,
        options: JsonEncoderOptions,
    ) -> Self {
        let stream = if options.indented {
            JsonStreamWriter::new_custom(
                sink,
                WriterSettings {
                    pretty_print: true,
                    ..Default::default()
                },
            )
        } else {
            JsonStreamWriter::new(sink)
        };
        Self {
            stream,
            ctx,
            reversible: options.reversible,
        }
    }

    /// The encoding context this encoder works against.
    pub fn context(&self) -> &Context<'a> {
        &self.ctx
    }

    /// Whether this encoder emits the reversible form.
    pub fn is_reversible(&self) -> bool {
        self.reversible
    }

    /// Flush the remaining output and finish the document. Must be
    /// called once all values are written; dropping the encoder without
    /// finishing leaves the sink truncated.
    pub fn finish(self) -> EncodingResult<()> {
        self.stream.finish_document()?;
        Ok(())
    }

    /// Does nothing. Present for interface parity with encoders for
    /// encodings that scope element names by namespace.
    pub fn push_namespace(&mut self, _namespace_uri: &str) {}

    /// Does nothing, see [`JsonEncoder::push_namespace`].
    pub fn pop_namespace(&mut self) {}

    fn begin_field(&mut self, field: Option<&str>) -> EncodingResult<()> {
        if let Some(name) = field {
            self.stream.name(name)?;
        }
        Ok(())
    }

    fn elide(&self, field: Option<&str>, value: &dyn UaNullable) -> bool {
        self.reversible && field.is_some() && value.is_ua_null()
    }

    fn write_null_value(&mut self, field: Option<&str>) -> EncodingResult<()> {
        self.begin_field(field)?;
        self.stream.null_value()?;
        Ok(())
    }

    fn check_string_limit(&self, len: usize) -> EncodingResult<()> {
        let max = self.ctx.limits().max_string_length;
        if max > 0 && len > max {
            Err(Error::limits_exceeded(format!(
                "String length {} exceeds configured limit {}",
                len, max
            )))
        } else {
            Ok(())
        }
    }

    fn check_byte_string_limit(&self, len: usize) -> EncodingResult<()> {
        let max = self.ctx.limits().max_byte_string_length;
        if max > 0 && len > max {
            Err(Error::limits_exceeded(format!(
                "ByteString length {} exceeds configured limit {}",
                len, max
            )))
        } else {
            Ok(())
        }
    }

    fn check_array_limit(&self, len: usize) -> EncodingResult<()> {
        let max = self.ctx.limits().max_array_length;
        if max > 0 && len > max {
            Err(Error::limits_exceeded(format!(
                "Array length {} exceeds configured limit {}",
                len, max
            )))
        } else {
            Ok(())
        }
    }

    /// Write a boolean, eliding a named false in the reversible form.
    pub fn write_bool(&mut self, field: Option<&str>, value: bool) -> EncodingResult<()> {
        if self.elide(field, &value) {
            return Ok(());
        }
        self.begin_field(field)?;
        self.stream.bool_value(value)?;
        Ok(())
    }

    write_number_method!(write_i8, i8);
    write_number_method!(write_u8, u8);
    write_number_method!(write_i16, i16);
    write_number_method!(write_u16, u16);
    write_number_method!(write_i32, i32);
    write_number_method!(write_u32, u32);
    write_number_as_string_method!(write_i64, i64);
    write_number_as_string_method!(write_u64, u64);
    write_float_method!(write_f32, f32);
    write_float_method!(write_f64, f64);

    /// Write a string, or null for the null string.
    pub fn write_string(&mut self, field: Option<&str>, value: &UAString) -> EncodingResult<()> {
        if self.elide(field, value) {
            return Ok(());
        }
        match value.value() {
            Some(s) => {
                self.check_string_limit(s.len())?;
                self.begin_field(field)?;
                self.stream.string_value(s)?;
                Ok(())
            }
            None => self.write_null_value(field),
        }
    }

    /// Write a date time as an ISO 8601 string.
    pub fn write_date_time(&mut self, field: Option<&str>, value: &DateTime) -> EncodingResult<()> {
        if self.elide(field, value) {
            return Ok(());
        }
        self.begin_field(field)?;
        self.stream.string_value(&value.to_rfc3339())?;
        Ok(())
    }

    /// Write a Guid as its hyphenated string form.
    pub fn write_guid(&mut self, field: Option<&str>, value: &Guid) -> EncodingResult<()> {
        if self.elide(field, value) {
            return Ok(());
        }
        self.begin_field(field)?;
        self.stream.string_value(&value.to_string())?;
        Ok(())
    }

    /// Write a byte string as base64, or null for the null byte string.
    pub fn write_byte_string(
        &mut self,
        field: Option<&str>,
        value: &ByteString,
    ) -> EncodingResult<()> {
        if self.elide(field, value) {
            return Ok(());
        }
        match &value.value {
            Some(v) => {
                self.check_byte_string_limit(v.len())?;
                self.begin_field(field)?;
                self.stream.string_value(&value.as_base64())?;
                Ok(())
            }
            None => self.write_null_value(field),
        }
    }

    /// Write an XML element as a string.
    pub fn write_xml_element(
        &mut self,
        field: Option<&str>,
        value: &XmlElement,
    ) -> EncodingResult<()> {
        self.write_string(field, value.as_string())
    }

    /// Write a status code. The reversible form is the plain number. The
    /// non-reversible form elides a named Good and writes anything else
    /// as an object with the code and its symbolic name.
    pub fn write_status_code(
        &mut self,
        field: Option<&str>,
        value: StatusCode,
    ) -> EncodingResult<()> {
        if self.reversible {
            return self.write_u32(field, value.bits());
        }
        if field.is_some() && value.bits() == 0 {
            return Ok(());
        }
        self.begin_field(field)?;
        self.stream.begin_object()?;
        self.stream.name("Code")?;
        self.stream.number_value(value.bits())?;
        if let Some(symbol) = value.name() {
            self.stream.name("Symbol")?;
            self.stream.string_value(symbol)?;
        }
        self.stream.end_object()?;
        Ok(())
    }

    /// Write an enumeration: the numeric value in the reversible form,
    /// the `Name_Value` string in the non-reversible form.
    pub fn write_enum<T>(&mut self, field: Option<&str>, value: T) -> EncodingResult<()>
    where
        T: UaEnum<Repr = i32> + Copy,
    {
        if self.reversible {
            self.write_i32(field, value.into_repr())
        } else {
            self.begin_field(field)?;
            self.stream.string_value(value.as_str())?;
            Ok(())
        }
    }

    fn write_identifier(&mut self, identifier: &Identifier) -> EncodingResult<()> {
        match identifier {
            Identifier::Numeric(n) => {
                self.write_u32(Some("Id"), *n)?;
            }
            Identifier::String(s) => {
                self.write_u16(Some("IdType"), 1)?;
                self.write_string(Some("Id"), s)?;
            }
            Identifier::Guid(g) => {
                self.write_u16(Some("IdType"), 2)?;
                self.write_guid(Some("Id"), g)?;
            }
            Identifier::ByteString(b) => {
                self.write_u16(Some("IdType"), 3)?;
                self.write_byte_string(Some("Id"), b)?;
            }
        }
        Ok(())
    }

    // Namespace rules shared by NodeId and friends: the reversible form
    // carries the index, the non-reversible form substitutes the URI
    // where one is known. Index 1 is always carried as a number.
    fn write_namespace_index(&mut self, namespace: u16) -> EncodingResult<()> {
        if self.reversible || namespace == 1 {
            self.write_u16(Some("Namespace"), namespace)?;
        } else if namespace > 1 {
            match self.ctx.namespaces().uri(namespace) {
                Some(uri) => {
                    let uri = uri.to_owned();
                    self.stream.name("Namespace")?;
                    self.stream.string_value(&uri)?;
                }
                None => self.write_u16(Some("Namespace"), namespace)?,
            }
        }
        Ok(())
    }

    /// Write a node id.
    pub fn write_node_id(&mut self, field: Option<&str>, value: &NodeId) -> EncodingResult<()> {
        if self.elide(field, value) {
            return Ok(());
        }
        if value.is_null() {
            return self.write_null_value(field);
        }
        self.begin_field(field)?;
        self.stream.begin_object()?;
        self.write_identifier(&value.identifier)?;
        self.write_namespace_index(value.namespace)?;
        self.stream.end_object()?;
        Ok(())
    }

    /// Write an expanded node id.
    pub fn write_expanded_node_id(
        &mut self,
        field: Option<&str>,
        value: &ExpandedNodeId,
    ) -> EncodingResult<()> {
        if self.elide(field, value) {
            return Ok(());
        }
        if value.is_null() {
            return self.write_null_value(field);
        }
        self.begin_field(field)?;
        self.stream.begin_object()?;
        self.write_identifier(&value.node_id.identifier)?;
        match value.namespace_uri.value() {
            Some(uri) => {
                let uri = uri.clone();
                self.stream.name("Namespace")?;
                self.stream.string_value(&uri)?;
            }
            None => self.write_namespace_index(value.node_id.namespace)?,
        }
        // Kept for wire compatibility with the reference implementation,
        // which emits the index alongside the resolved URI.
        if !self.reversible && value.node_id.namespace > 1 {
            self.write_u16(Some("NamespaceIndex"), value.node_id.namespace)?;
        }
        if self.reversible {
            self.write_u32(Some("ServerUri"), value.server_index)?;
        } else if value.server_index > 0 {
            let uri = u16::try_from(value.server_index)
                .ok()
                .and_then(|i| self.ctx.server_uris().uri(i))
                .map(str::to_owned);
            match uri {
                Some(uri) => {
                    self.stream.name("ServerUri")?;
                    self.stream.string_value(&uri)?;
                }
                None => self.write_u32(Some("ServerUri"), value.server_index)?,
            }
        }
        self.stream.end_object()?;
        Ok(())
    }

    /// Write a qualified name as an object with `Name` and `Uri`.
    pub fn write_qualified_name(
        &mut self,
        field: Option<&str>,
        value: &QualifiedName,
    ) -> EncodingResult<()> {
        if self.elide(field, value) {
            return Ok(());
        }
        if value.is_null() {
            return self.write_null_value(field);
        }
        self.begin_field(field)?;
        self.stream.begin_object()?;
        self.write_string(Some("Name"), &value.name)?;
        match value.namespace_index {
            0 => (),
            1 => self.write_u16(Some("Uri"), 1)?,
            n if !self.reversible => match self.ctx.namespaces().uri(n) {
                Some(uri) => {
                    let uri = uri.to_owned();
                    self.stream.name("Uri")?;
                    self.stream.string_value(&uri)?;
                }
                None => self.write_u16(Some("Uri"), n)?,
            },
            n => self.write_u16(Some("Uri"), n)?,
        }
        self.stream.end_object()?;
        Ok(())
    }

    /// Write a localized text: `{Locale, Text}` in the reversible form,
    /// the bare text in the non-reversible form.
    pub fn write_localized_text(
        &mut self,
        field: Option<&str>,
        value: &LocalizedText,
    ) -> EncodingResult<()> {
        if self.elide(field, value) {
            return Ok(());
        }
        if !self.reversible {
            self.begin_field(field)?;
            match value.text.value() {
                Some(text) => {
                    let text = text.clone();
                    self.stream.string_value(&text)?;
                }
                None => self.stream.null_value()?,
            }
            return Ok(());
        }
        if value.is_null() {
            return self.write_null_value(field);
        }
        self.begin_field(field)?;
        self.stream.begin_object()?;
        self.write_string(Some("Locale"), &value.locale)?;
        self.write_string(Some("Text"), &value.text)?;
        self.stream.end_object()?;
        Ok(())
    }

    /// Write a data value. Fields that are not present are not emitted.
    pub fn write_data_value(
        &mut self,
        field: Option<&str>,
        value: &DataValue,
    ) -> EncodingResult<()> {
        if self.elide(field, value) {
            return Ok(());
        }
        if value.is_ua_null() {
            return self.write_null_value(field);
        }
        self.begin_field(field)?;
        self.stream.begin_object()?;
        if let Some(v) = &value.value {
            self.write_variant(Some("Value"), v)?;
        }
        if let Some(status) = value.status {
            self.write_status_code(Some("Status"), status)?;
        }
        if let Some(t) = &value.source_timestamp {
            self.write_date_time(Some("SourceTimestamp"), t)?;
        }
        if let Some(p) = value.source_picoseconds {
            self.write_u16(Some("SourcePicoseconds"), p)?;
        }
        if let Some(t) = &value.server_timestamp {
            self.write_date_time(Some("ServerTimestamp"), t)?;
        }
        if let Some(p) = value.server_picoseconds {
            self.write_u16(Some("ServerPicoseconds"), p)?;
        }
        self.stream.end_object()?;
        Ok(())
    }

    /// Write a diagnostic info.
    pub fn write_diagnostic_info(
        &mut self,
        field: Option<&str>,
        value: &DiagnosticInfo,
    ) -> EncodingResult<()> {
        if self.elide(field, value) {
            return Ok(());
        }
        if value.is_ua_null() {
            return self.write_null_value(field);
        }
        self.begin_field(field)?;
        self.stream.begin_object()?;
        // Indices into the string table are written whenever present,
        // index 0 included, so these cannot go through write_i32.
        for (name, index) in [
            ("SymbolicId", value.symbolic_id),
            ("NamespaceUri", value.namespace_uri),
            ("Locale", value.locale),
            ("LocalizedText", value.localized_text),
        ] {
            if let Some(index) = index {
                self.stream.name(name)?;
                self.stream.number_value(index)?;
            }
        }
        if let Some(info) = &value.additional_info {
            self.write_string(Some("AdditionalInfo"), info)?;
        }
        if let Some(status) = value.inner_status_code {
            self.write_status_code(Some("InnerStatusCode"), status)?;
        }
        if let Some(inner) = &value.inner_diagnostic_info {
            self.write_diagnostic_info(Some("InnerDiagnosticInfo"), inner)?;
        }
        self.stream.end_object()?;
        Ok(())
    }

    fn write_variant_scalar(&mut self, value: &Variant) -> EncodingResult<()> {
        match value {
            Variant::Empty => Ok(self.stream.null_value()?),
            Variant::Boolean(v) => self.write_bool(None, *v),
            Variant::SByte(v) => self.write_i8(None, *v),
            Variant::Byte(v) => self.write_u8(None, *v),
            Variant::Int16(v) => self.write_i16(None, *v),
            Variant::UInt16(v) => self.write_u16(None, *v),
            Variant::Int32(v) => self.write_i32(None, *v),
            Variant::UInt32(v) => self.write_u32(None, *v),
            Variant::Int64(v) => self.write_i64(None, *v),
            Variant::UInt64(v) => self.write_u64(None, *v),
            Variant::Float(v) => self.write_f32(None, *v),
            Variant::Double(v) => self.write_f64(None, *v),
            Variant::String(v) => self.write_string(None, v),
            Variant::DateTime(v) => self.write_date_time(None, v),
            Variant::Guid(v) => self.write_guid(None, v),
            Variant::StatusCode(v) => self.write_status_code(None, *v),
            Variant::ByteString(v) => self.write_byte_string(None, v),
            Variant::XmlElement(v) => self.write_xml_element(None, v),
            Variant::QualifiedName(v) => self.write_qualified_name(None, v),
            Variant::LocalizedText(v) => self.write_localized_text(None, v),
            Variant::NodeId(v) => self.write_node_id(None, v),
            Variant::ExpandedNodeId(v) => self.write_expanded_node_id(None, v),
            Variant::ExtensionObject(v) => self.write_extension_object(None, v),
            Variant::DataValue(v) => self.write_data_value(None, v),
            Variant::Variant(v) => self.write_variant(None, v),
            Variant::DiagnosticInfo(v) => self.write_diagnostic_info(None, v),
            Variant::Array(_) => Err(Error::encoding(
                "Nested arrays cannot appear as variant array elements",
            )),
        }
    }

    fn write_variant_matrix(
        &mut self,
        values: &[Variant],
        dimensions: &[u32],
        level: usize,
        next: &mut usize,
    ) -> EncodingResult<()> {
        self.stream.begin_array()?;
        for _ in 0..dimensions[level] {
            if level + 1 == dimensions.len() {
                self.write_variant_scalar(&values[*next])?;
                *next += 1;
            } else {
                self.write_variant_matrix(values, dimensions, level + 1, next)?;
            }
        }
        self.stream.end_array()?;
        Ok(())
    }

    fn write_variant_body(&mut self, value: &Variant) -> EncodingResult<()> {
        match value {
            Variant::Array(a) => {
                self.check_array_limit(a.values.len())?;
                match a.dimensions.as_deref() {
                    Some(dims) if dims.len() > 1 => {
                        let product = dims
                            .iter()
                            .try_fold(1u64, |acc, d| acc.checked_mul(*d as u64));
                        if product != Some(a.values.len() as u64) {
                            return Err(Error::encoding(format!(
                                "Variant dimensions {:?} do not match {} values",
                                dims,
                                a.values.len()
                            )));
                        }
                        self.write_variant_matrix(&a.values, dims, 0, &mut 0)
                    }
                    _ => {
                        self.stream.begin_array()?;
                        for v in &a.values {
                            self.write_variant_scalar(v)?;
                        }
                        self.stream.end_array()?;
                        Ok(())
                    }
                }
            }
            scalar => self.write_variant_scalar(scalar),
        }
    }

    /// Write a variant. The reversible form is the envelope
    /// `{Type, Body, Dimensions}` where `Dimensions` appears only for
    /// matrices; the non-reversible form is the bare body.
    pub fn write_variant(&mut self, field: Option<&str>, value: &Variant) -> EncodingResult<()> {
        if self.elide(field, value) {
            return Ok(());
        }
        if value.is_empty() {
            return self.write_null_value(field);
        }
        if !self.reversible {
            self.begin_field(field)?;
            return self.write_variant_body(value);
        }
        // Empty is handled above, the type tag is always known here
        let Some(type_id) = value.scalar_type_id().map(|t| t as u32) else {
            return self.write_null_value(field);
        };
        self.begin_field(field)?;
        self.stream.begin_object()?;
        self.stream.name("Type")?;
        self.stream.number_value(type_id)?;
        self.stream.name("Body")?;
        self.write_variant_body(value)?;
        if let Variant::Array(a) = value {
            if let Some(dims) = a.dimensions.as_deref() {
                if dims.len() > 1 {
                    self.stream.name("Dimensions")?;
                    self.stream.begin_array()?;
                    for d in dims {
                        self.stream.number_value(*d)?;
                    }
                    self.stream.end_array()?;
                }
            }
        }
        self.stream.end_object()?;
        Ok(())
    }

    /// Write an extension object. The reversible form carries the type
    /// id and the body; the non-reversible form only the bare body.
    pub fn write_extension_object(
        &mut self,
        field: Option<&str>,
        value: &ExtensionObject,
    ) -> EncodingResult<()> {
        if self.elide(field, value) {
            return Ok(());
        }
        if value.is_null() {
            return self.write_null_value(field);
        }
        if !self.reversible {
            self.begin_field(field)?;
            return match &value.body {
                ExtensionObjectBody::None => Ok(self.stream.null_value()?),
                ExtensionObjectBody::Encodable(body) => {
                    self.stream.begin_object()?;
                    body.encode(self)?;
                    self.stream.end_object()?;
                    Ok(())
                }
                ExtensionObjectBody::ByteString(bytes) => self.write_byte_string(None, bytes),
                ExtensionObjectBody::Xml(xml) => self.write_xml_element(None, xml),
            };
        }
        let type_id = value.type_id.try_resolve(self.ctx.namespaces()).ok_or_else(|| {
            Error::encoding(format!(
                "Cannot resolve extension object type ID {}",
                value.type_id
            ))
        })?;
        if type_id.is_null() && !value.body.is_none() {
            return Err(Error::encoding(
                "Extension object with a body must carry a known type ID",
            ));
        }
        let type_id = type_id.into_owned();
        self.begin_field(field)?;
        self.stream.begin_object()?;
        self.write_node_id(Some("TypeId"), &type_id)?;
        match &value.body {
            ExtensionObjectBody::None => (),
            ExtensionObjectBody::Encodable(body) => {
                self.write_encodable(Some("Body"), body.as_ref())?;
            }
            ExtensionObjectBody::ByteString(bytes) => {
                self.write_u32(Some("Encoding"), 1)?;
                self.write_byte_string(Some("Body"), bytes)?;
            }
            ExtensionObjectBody::Xml(xml) => {
                self.write_u32(Some("Encoding"), 2)?;
                self.write_xml_element(Some("Body"), xml)?;
            }
        }
        self.stream.end_object()?;
        Ok(())
    }

    /// Write a structured value as a JSON object, delegating the fields
    /// to its [`JsonEncodable`] hook.
    pub fn write_encodable<T>(&mut self, field: Option<&str>, value: &T) -> EncodingResult<()>
    where
        T: JsonEncodable + ?Sized,
    {
        self.begin_field(field)?;
        self.stream.begin_object()?;
        value.encode(self)?;
        self.stream.end_object()?;
        Ok(())
    }

    /// Encode a whole message as the root object of the document. The
    /// counterpart of [`super::JsonDecoder::decode_message`].
    pub fn encode_message<T>(&mut self, value: &T) -> EncodingResult<()>
    where
        T: JsonEncodable + ?Sized,
    {
        self.write_encodable(None, value)
    }

    fn write_array_with<T>(
        &mut self,
        field: Option<&str>,
        values: Option<&[T]>,
        write_one: impl Fn(&mut Self, &T) -> EncodingResult<()>,
    ) -> EncodingResult<()> {
        let Some(values) = values else {
            if self.reversible && field.is_some() {
                return Ok(());
            }
            return self.write_null_value(field);
        };
        self.check_array_limit(values.len())?;
        self.begin_field(field)?;
        self.stream.begin_array()?;
        for value in values {
            write_one(self, value)?;
        }
        self.stream.end_array()?;
        Ok(())
    }

    /// Write an array of enumeration values.
    pub fn write_enum_array<T>(
        &mut self,
        field: Option<&str>,
        values: Option<&[T]>,
    ) -> EncodingResult<()>
    where
        T: UaEnum<Repr = i32> + Copy,
    {
        self.write_array_with(field, values, |enc, v| enc.write_enum(None, *v))
    }

    /// Write an array of structured values.
    pub fn write_encodable_array<T>(
        &mut self,
        field: Option<&str>,
        values: Option<&[T]>,
    ) -> EncodingResult<()>
    where
        T: JsonEncodable,
    {
        self.write_array_with(field, values, |enc, v| enc.write_encodable(None, v))
    }

    write_array_copy_method!(write_bool_array, write_bool, bool);
    write_array_copy_method!(write_i8_array, write_i8, i8);
    write_array_copy_method!(write_u8_array, write_u8, u8);
    write_array_copy_method!(write_i16_array, write_i16, i16);
    write_array_copy_method!(write_u16_array, write_u16, u16);
    write_array_copy_method!(write_i32_array, write_i32, i32);
    write_array_copy_method!(write_u32_array, write_u32, u32);
    write_array_copy_method!(write_i64_array, write_i64, i64);
    write_array_copy_method!(write_u64_array, write_u64, u64);
    write_array_copy_method!(write_f32_array, write_f32, f32);
    write_array_copy_method!(write_f64_array, write_f64, f64);
    write_array_copy_method!(write_status_code_array, write_status_code, StatusCode);
    write_array_ref_method!(write_string_array, write_string, UAString);
    write_array_ref_method!(write_date_time_array, write_date_time, DateTime);
    write_array_ref_method!(write_guid_array, write_guid, Guid);
    write_array_ref_method!(write_byte_string_array, write_byte_string, ByteString);
    write_array_ref_method!(write_xml_element_array, write_xml_element, XmlElement);
    write_array_ref_method!(write_node_id_array, write_node_id, NodeId);
    write_array_ref_method!(
        write_expanded_node_id_array,
        write_expanded_node_id,
        ExpandedNodeId
    );
    write_array_ref_method!(write_qualified_name_array, write_qualified_name, QualifiedName);
    write_array_ref_method!(write_localized_text_array, write_localized_text, LocalizedText);
    write_array_ref_method!(write_data_value_array, write_data_value, DataValue);
    write_array_ref_method!(write_variant_array, write_variant, Variant);
    write_array_ref_method!(
        write_extension_object_array,
        write_extension_object,
        ExtensionObject
    );
    write_array_ref_method!(
        write_diagnostic_info_array,
        write_diagnostic_info,
        DiagnosticInfo
    );
}

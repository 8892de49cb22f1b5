// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Contains the implementation of `Variant`, the self-describing union of
//! all built-in types, and `Array`, its single- or multi-dimensional
//! array payload.

use std::fmt;

use crate::{
    ByteString, DataValue, DateTime, DiagnosticInfo, Error, ExpandedNodeId, ExtensionObject, Guid,
    LocalizedText, NodeId, QualifiedName, StatusCode, UAString, UaNullable, XmlElement,
};

/// The numeric tag identifying the scalar type carried by a variant on
/// the JSON wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum VariantScalarTypeId {
    /// A two-state logical value.
    Boolean = 1,
    /// An integer between -128 and 127.
    SByte = 2,
    /// An integer between 0 and 255.
    Byte = 3,
    /// An integer between -32768 and 32767.
    Int16 = 4,
    /// An integer between 0 and 65535.
    UInt16 = 5,
    /// A 32-bit signed integer.
    Int32 = 6,
    /// A 32-bit unsigned integer.
    UInt32 = 7,
    /// A 64-bit signed integer.
    Int64 = 8,
    /// A 64-bit unsigned integer.
    UInt64 = 9,
    /// An IEEE single precision floating point value.
    Float = 10,
    /// An IEEE double precision floating point value.
    Double = 11,
    /// A sequence of Unicode characters.
    String = 12,
    /// An instant in time.
    DateTime = 13,
    /// A 16-byte globally unique identifier.
    Guid = 14,
    /// A sequence of octets.
    ByteString = 15,
    /// An XML element.
    XmlElement = 16,
    /// An identifier for a node in the address space.
    NodeId = 17,
    /// A NodeId qualified with a namespace URI and server index.
    ExpandedNodeId = 18,
    /// A numeric status code.
    StatusCode = 19,
    /// A name qualified by a namespace.
    QualifiedName = 20,
    /// Human readable text with an optional locale.
    LocalizedText = 21,
    /// A structure carried with its type identifier.
    ExtensionObject = 22,
    /// A value with status and timestamps.
    DataValue = 23,
    /// A nested variant.
    Variant = 24,
    /// Detailed diagnostic information.
    DiagnosticInfo = 25,
}

impl TryFrom<u32> for VariantScalarTypeId {
    type Error = ();

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Self::Boolean,
            2 => Self::SByte,
            3 => Self::Byte,
            4 => Self::Int16,
            5 => Self::UInt16,
            6 => Self::Int32,
            7 => Self::UInt32,
            8 => Self::Int64,
            9 => Self::UInt64,
            10 => Self::Float,
            11 => Self::Double,
            12 => Self::String,
            13 => Self::DateTime,
            14 => Self::Guid,
            15 => Self::ByteString,
            16 => Self::XmlElement,
            17 => Self::NodeId,
            18 => Self::ExpandedNodeId,
            19 => Self::StatusCode,
            20 => Self::QualifiedName,
            21 => Self::LocalizedText,
            22 => Self::ExtensionObject,
            23 => Self::DataValue,
            24 => Self::Variant,
            25 => Self::DiagnosticInfo,
            _ => return Err(()),
        })
    }
}

/// A union of all of the built-in types. A variant holds either nothing,
/// one scalar value, or an [`Array`] of values of one scalar type.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Variant {
    /// The null variant, carrying no value at all.
    #[default]
    Empty,
    /// A boolean.
    Boolean(bool),
    /// A signed byte.
    SByte(i8),
    /// An unsigned byte.
    Byte(u8),
    /// A 16-bit signed integer.
    Int16(i16),
    /// A 16-bit unsigned integer.
    UInt16(u16),
    /// A 32-bit signed integer.
    Int32(i32),
    /// A 32-bit unsigned integer.
    UInt32(u32),
    /// A 64-bit signed integer.
    Int64(i64),
    /// A 64-bit unsigned integer.
    UInt64(u64),
    /// A single precision float.
    Float(f32),
    /// A double precision float.
    Double(f64),
    /// A string.
    String(UAString),
    /// A date time.
    DateTime(DateTime),
    /// A Guid.
    Guid(Guid),
    /// A status code.
    StatusCode(StatusCode),
    /// A byte string.
    ByteString(ByteString),
    /// An XML element.
    XmlElement(XmlElement),
    /// A qualified name.
    QualifiedName(QualifiedName),
    /// A localized text.
    LocalizedText(LocalizedText),
    /// A node id.
    NodeId(NodeId),
    /// An expanded node id.
    ExpandedNodeId(ExpandedNodeId),
    /// An extension object.
    ExtensionObject(ExtensionObject),
    /// A data value.
    DataValue(Box<DataValue>),
    /// A nested variant.
    Variant(Box<Variant>),
    /// A diagnostic info.
    DiagnosticInfo(Box<DiagnosticInfo>),
    /// An array of scalar values, optionally multi-dimensional.
    Array(Box<Array>),
}

macro_rules! variant_from {
    ($t:ty, $variant:ident) => {
        impl From<$t> for Variant {
            fn from(value: $t) -> Self {
                Variant::$variant(value)
            }
        }
    };
}

variant_from!(bool, Boolean);
variant_from!(i8, SByte);
variant_from!(u8, Byte);
variant_from!(i16, Int16);
variant_from!(u16, UInt16);
variant_from!(i32, Int32);
variant_from!(u32, UInt32);
variant_from!(i64, Int64);
variant_from!(u64, UInt64);
variant_from!(f32, Float);
variant_from!(f64, Double);
variant_from!(UAString, String);
variant_from!(DateTime, DateTime);
variant_from!(Guid, Guid);
variant_from!(StatusCode, StatusCode);
variant_from!(ByteString, ByteString);
variant_from!(XmlElement, XmlElement);
variant_from!(QualifiedName, QualifiedName);
variant_from!(LocalizedText, LocalizedText);
variant_from!(NodeId, NodeId);
variant_from!(ExpandedNodeId, ExpandedNodeId);
variant_from!(ExtensionObject, ExtensionObject);

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::String(UAString::from(value))
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Variant::String(UAString::from(value))
    }
}

impl From<DataValue> for Variant {
    fn from(value: DataValue) -> Self {
        Variant::DataValue(Box::new(value))
    }
}

impl From<DiagnosticInfo> for Variant {
    fn from(value: DiagnosticInfo) -> Self {
        Variant::DiagnosticInfo(Box::new(value))
    }
}

impl From<Array> for Variant {
    fn from(value: Array) -> Self {
        Variant::Array(Box::new(value))
    }
}

impl UaNullable for Variant {
    fn is_ua_null(&self) -> bool {
        matches!(self, Variant::Empty)
    }
}

impl Variant {
    /// The scalar type tag of this variant, `None` for the null variant.
    /// An array reports the scalar type of its elements.
    pub fn scalar_type_id(&self) -> Option<VariantScalarTypeId> {
        match self {
            Variant::Empty => None,
            Variant::Boolean(_) => Some(VariantScalarTypeId::Boolean),
            Variant::SByte(_) => Some(VariantScalarTypeId::SByte),
            Variant::Byte(_) => Some(VariantScalarTypeId::Byte),
            Variant::Int16(_) => Some(VariantScalarTypeId::Int16),
            Variant::UInt16(_) => Some(VariantScalarTypeId::UInt16),
            Variant::Int32(_) => Some(VariantScalarTypeId::Int32),
            Variant::UInt32(_) => Some(VariantScalarTypeId::UInt32),
            Variant::Int64(_) => Some(VariantScalarTypeId::Int64),
            Variant::UInt64(_) => Some(VariantScalarTypeId::UInt64),
            Variant::Float(_) => Some(VariantScalarTypeId::Float),
            Variant::Double(_) => Some(VariantScalarTypeId::Double),
            Variant::String(_) => Some(VariantScalarTypeId::String),
            Variant::DateTime(_) => Some(VariantScalarTypeId::DateTime),
            Variant::Guid(_) => Some(VariantScalarTypeId::Guid),
            Variant::StatusCode(_) => Some(VariantScalarTypeId::StatusCode),
            Variant::ByteString(_) => Some(VariantScalarTypeId::ByteString),
            Variant::XmlElement(_) => Some(VariantScalarTypeId::XmlElement),
            Variant::QualifiedName(_) => Some(VariantScalarTypeId::QualifiedName),
            Variant::LocalizedText(_) => Some(VariantScalarTypeId::LocalizedText),
            Variant::NodeId(_) => Some(VariantScalarTypeId::NodeId),
            Variant::ExpandedNodeId(_) => Some(VariantScalarTypeId::ExpandedNodeId),
            Variant::ExtensionObject(_) => Some(VariantScalarTypeId::ExtensionObject),
            Variant::DataValue(_) => Some(VariantScalarTypeId::DataValue),
            Variant::Variant(_) => Some(VariantScalarTypeId::Variant),
            Variant::DiagnosticInfo(_) => Some(VariantScalarTypeId::DiagnosticInfo),
            Variant::Array(a) => Some(a.value_type),
        }
    }

    /// Test if this variant is the null variant.
    pub fn is_empty(&self) -> bool {
        matches!(self, Variant::Empty)
    }

    /// Test if this variant holds an array.
    pub fn is_array(&self) -> bool {
        matches!(self, Variant::Array(_))
    }

    /// The default scalar value for a type tag, i.e. what a missing or
    /// null body decodes to.
    pub fn default_scalar(type_id: VariantScalarTypeId) -> Variant {
        match type_id {
            VariantScalarTypeId::Boolean => Variant::from(bool::default()),
            VariantScalarTypeId::SByte => Variant::from(i8::default()),
            VariantScalarTypeId::Byte => Variant::from(u8::default()),
            VariantScalarTypeId::Int16 => Variant::from(i16::default()),
            VariantScalarTypeId::UInt16 => Variant::from(u16::default()),
            VariantScalarTypeId::Int32 => Variant::from(i32::default()),
            VariantScalarTypeId::UInt32 => Variant::from(u32::default()),
            VariantScalarTypeId::Int64 => Variant::from(i64::default()),
            VariantScalarTypeId::UInt64 => Variant::from(u64::default()),
            VariantScalarTypeId::Float => Variant::from(f32::default()),
            VariantScalarTypeId::Double => Variant::from(f64::default()),
            VariantScalarTypeId::String => Variant::from(UAString::null()),
            VariantScalarTypeId::DateTime => Variant::from(DateTime::null()),
            VariantScalarTypeId::Guid => Variant::from(Guid::null()),
            VariantScalarTypeId::StatusCode => Variant::from(StatusCode::Good),
            VariantScalarTypeId::ByteString => Variant::from(ByteString::null()),
            VariantScalarTypeId::XmlElement => Variant::from(XmlElement::null()),
            VariantScalarTypeId::QualifiedName => Variant::from(QualifiedName::null()),
            VariantScalarTypeId::LocalizedText => Variant::from(LocalizedText::null()),
            VariantScalarTypeId::NodeId => Variant::from(NodeId::null()),
            VariantScalarTypeId::ExpandedNodeId => Variant::from(ExpandedNodeId::null()),
            VariantScalarTypeId::ExtensionObject => Variant::from(ExtensionObject::null()),
            VariantScalarTypeId::DataValue => Variant::from(DataValue::default()),
            VariantScalarTypeId::Variant => Variant::Variant(Box::default()),
            VariantScalarTypeId::DiagnosticInfo => Variant::from(DiagnosticInfo::null()),
        }
    }
}

/// An array of variant values of a single scalar type. When `dimensions`
/// holds two or more entries the flat `values` are interpreted as a
/// matrix in row-major order, with the last dimension varying fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    /// The scalar type of every element.
    pub value_type: VariantScalarTypeId,
    /// Flat list of values.
    pub values: Vec<Variant>,
    /// Dimensions of a multi-dimensional array. `None` or a single entry
    /// means the array is one-dimensional.
    pub dimensions: Option<Vec<u32>>,
}

impl Array {
    /// Create a one-dimensional array. Fails if an element is not a
    /// scalar of `value_type`.
    pub fn new(
        value_type: VariantScalarTypeId,
        values: impl Into<Vec<Variant>>,
    ) -> Result<Array, Error> {
        let values = values.into();
        validate_elements(value_type, &values)?;
        Ok(Array {
            value_type,
            values,
            dimensions: None,
        })
    }

    /// Create a multi-dimensional array. The product of `dimensions`
    /// must equal the number of values.
    pub fn new_multi(
        value_type: VariantScalarTypeId,
        values: impl Into<Vec<Variant>>,
        dimensions: Vec<u32>,
    ) -> Result<Array, Error> {
        let values = values.into();
        validate_elements(value_type, &values)?;
        let expected = dimensions
            .iter()
            .try_fold(1u64, |acc, d| acc.checked_mul(*d as u64));
        if expected != Some(values.len() as u64) {
            return Err(Error::encoding(format!(
                "Array dimensions {:?} do not match the number of values {}",
                dimensions,
                values.len()
            )));
        }
        Ok(Array {
            value_type,
            values,
            dimensions: Some(dimensions),
        })
    }

    /// Create a one-dimensional array from values convertible to Variant.
    pub fn from_values<T: Into<Variant>>(
        value_type: VariantScalarTypeId,
        values: impl IntoIterator<Item = T>,
    ) -> Result<Array, Error> {
        Self::new(value_type, values.into_iter().map(Into::into).collect::<Vec<_>>())
    }

    /// Rank of the array. One-dimensional arrays have rank 1.
    pub fn rank(&self) -> usize {
        match &self.dimensions {
            Some(d) => d.len().max(1),
            None => 1,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Test if the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn validate_elements(value_type: VariantScalarTypeId, values: &[Variant]) -> Result<(), Error> {
    for v in values {
        let ok = match v {
            Variant::Array(_) => false,
            // Nested variants may hold anything, including arrays
            _ if value_type == VariantScalarTypeId::Variant => true,
            Variant::Empty => false,
            other => other.scalar_type_id() == Some(value_type),
        };
        if !ok {
            return Err(Error::encoding(format!(
                "Array element {:?} is not a scalar {:?}",
                v, value_type
            )));
        }
    }
    Ok(())
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Empty => write!(f, "[null]"),
            Variant::Boolean(v) => write!(f, "{}", v),
            Variant::SByte(v) => write!(f, "{}", v),
            Variant::Byte(v) => write!(f, "{}", v),
            Variant::Int16(v) => write!(f, "{}", v),
            Variant::UInt16(v) => write!(f, "{}", v),
            Variant::Int32(v) => write!(f, "{}", v),
            Variant::UInt32(v) => write!(f, "{}", v),
            Variant::Int64(v) => write!(f, "{}", v),
            Variant::UInt64(v) => write!(f, "{}", v),
            Variant::Float(v) => write!(f, "{}", v),
            Variant::Double(v) => write!(f, "{}", v),
            Variant::String(v) => write!(f, "{}", v),
            Variant::DateTime(v) => write!(f, "{}", v),
            Variant::Guid(v) => write!(f, "{}", v),
            Variant::StatusCode(v) => write!(f, "{}", v),
            Variant::ByteString(v) => write!(f, "{}", v),
            Variant::XmlElement(v) => write!(f, "{}", v),
            Variant::QualifiedName(v) => write!(f, "{}", v),
            Variant::LocalizedText(v) => write!(f, "{}", v),
            Variant::NodeId(v) => write!(f, "{}", v),
            Variant::ExpandedNodeId(v) => write!(f, "{}", v),
            Variant::ExtensionObject(_) => write!(f, "[extension object]"),
            Variant::DataValue(_) => write!(f, "[data value]"),
            Variant::Variant(v) => write!(f, "{}", v),
            Variant::DiagnosticInfo(_) => write!(f, "[diagnostic info]"),
            Variant::Array(_) => write!(f, "[array]"),
        }
    }
}

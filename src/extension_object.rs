// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Contains the implementation of `ExtensionObject`.

use std::any::Any;

use crate::{
    json::JsonEncodable, ByteString, ExpandedNodeId, UaNullable, XmlElement,
};

/// Trait supplying the type identifiers of a structured type: the id of
/// its data type and the id the codec writes as the `TypeId` of an
/// extension object wrapping it.
pub trait ExpandedMessageInfo {
    /// The id of the JSON encoding for this type.
    fn full_json_type_id(&self) -> ExpandedNodeId;

    /// The id of the data type itself.
    fn full_data_type_id(&self) -> ExpandedNodeId;
}

/// Trait for an OPC-UA struct that can be stored in an extension object
/// and encoded dynamically.
///
/// This is automatically implemented for anything that implements
/// [`JsonEncodable`], [`ExpandedMessageInfo`], [`Send`], [`Sync`],
/// [`Clone`] and [`PartialEq`].
pub trait DynEncodable: JsonEncodable + Any + Send + Sync {
    /// The id of the JSON encoding of this type.
    fn json_type_id(&self) -> ExpandedNodeId;

    /// The id of the data type itself.
    fn data_type_id(&self) -> ExpandedNodeId;

    /// Convert into a boxed `Any`, so the concrete type can be taken
    /// back out by value.
    fn as_dyn_any(self: Box<Self>) -> Box<dyn Any + Send + Sync + 'static>;

    /// Borrow as `Any`, so the concrete type can be borrowed back out.
    fn as_dyn_any_ref(&self) -> &(dyn Any + Send + Sync);

    /// Clone behind the trait object; backs `Clone` for
    /// [`ExtensionObject`].
    fn clone_box(&self) -> Box<dyn DynEncodable>;

    /// Equality behind the trait object: true when `other` is the same
    /// concrete type and compares equal.
    fn dyn_eq(&self, other: &dyn DynEncodable) -> bool;

    /// The Rust type name, useful in logs.
    fn type_name(&self) -> &'static str;
}

impl<T> DynEncodable for T
where
    T: JsonEncodable + ExpandedMessageInfo + Any + Send + Sync + Clone + PartialEq,
{
    fn json_type_id(&self) -> ExpandedNodeId {
        self.full_json_type_id()
    }

    fn data_type_id(&self) -> ExpandedNodeId {
        self.full_data_type_id()
    }

    fn as_dyn_any(self: Box<Self>) -> Box<dyn Any + Send + Sync + 'static> {
        self
    }

    fn as_dyn_any_ref(&self) -> &(dyn Any + Send + Sync) {
        self
    }

    fn clone_box(&self) -> Box<dyn DynEncodable> {
        Box::new(self.clone())
    }

    fn dyn_eq(&self, other: &dyn DynEncodable) -> bool {
        match other.as_dyn_any_ref().downcast_ref::<T>() {
            Some(o) => o == self,
            None => false,
        }
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

impl PartialEq for dyn DynEncodable {
    fn eq(&self, other: &dyn DynEncodable) -> bool {
        self.dyn_eq(other)
    }
}

/// The body of an extension object: a decoded structured value, an
/// opaque binary blob, or an embedded XML fragment. The wire encoding
/// tag is implied: 0 for structured, 1 for byte string, 2 for XML.
#[derive(Debug)]
pub enum ExtensionObjectBody {
    /// No body at all.
    None,
    /// A structured value that encodes itself through the codec.
    Encodable(Box<dyn DynEncodable>),
    /// An opaque byte string, e.g. an OPC-UA binary encoded value that
    /// was never decoded.
    ByteString(ByteString),
    /// An XML fragment.
    Xml(XmlElement),
}

impl Clone for ExtensionObjectBody {
    fn clone(&self) -> Self {
        match self {
            Self::None => Self::None,
            Self::Encodable(b) => Self::Encodable(b.clone_box()),
            Self::ByteString(b) => Self::ByteString(b.clone()),
            Self::Xml(x) => Self::Xml(x.clone()),
        }
    }
}

impl PartialEq for ExtensionObjectBody {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Encodable(a), Self::Encodable(b)) => a.dyn_eq(b.as_ref()),
            (Self::ByteString(a), Self::ByteString(b)) => a == b,
            (Self::Xml(a), Self::Xml(b)) => a == b,
            _ => false,
        }
    }
}

impl ExtensionObjectBody {
    /// Test if there is no body.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The wire encoding tag of this body shape.
    pub fn encoding_tag(&self) -> u32 {
        match self {
            Self::None | Self::Encodable(_) => 0,
            Self::ByteString(_) => 1,
            Self::Xml(_) => 2,
        }
    }
}

/// A structure carried together with the identifier of its data type
/// encoding, so that a receiver that knows the type can reify it and one
/// that does not can at least pass it along.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtensionObject {
    /// Identifier of the type and encoding of the body.
    pub type_id: ExpandedNodeId,
    /// The body itself.
    pub body: ExtensionObjectBody,
}

impl Default for ExtensionObjectBody {
    fn default() -> Self {
        Self::None
    }
}

impl UaNullable for ExtensionObject {
    fn is_ua_null(&self) -> bool {
        self.is_null()
    }
}

impl ExtensionObject {
    /// Create an extension object with an explicit type id and body.
    pub fn new(type_id: impl Into<ExpandedNodeId>, body: ExtensionObjectBody) -> Self {
        Self {
            type_id: type_id.into(),
            body,
        }
    }

    /// Create an extension object wrapping `value`, deriving the type id
    /// from the value itself.
    pub fn from_message<T>(value: T) -> Self
    where
        T: DynEncodable + ExpandedMessageInfo,
    {
        Self {
            type_id: value.full_json_type_id(),
            body: ExtensionObjectBody::Encodable(Box::new(value)),
        }
    }

    /// An extension object with no type and no body.
    pub fn null() -> Self {
        Self::default()
    }

    /// Test if the object has neither type nor body.
    pub fn is_null(&self) -> bool {
        self.type_id.is_null() && self.body.is_none()
    }

    /// Try to downcast the body to a structured value of type `T`.
    pub fn body_as<T: DynEncodable>(&self) -> Option<&T> {
        match &self.body {
            ExtensionObjectBody::Encodable(b) => b.as_dyn_any_ref().downcast_ref(),
            _ => None,
        }
    }

    /// Take the body out of the object, downcast to `T`.
    pub fn into_body<T: DynEncodable>(self) -> Option<T> {
        match self.body {
            ExtensionObjectBody::Encodable(b) => {
                b.as_dyn_any().downcast().ok().map(|v: Box<T>| *v)
            }
            _ => None,
        }
    }
}

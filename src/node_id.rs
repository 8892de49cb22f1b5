// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! `NodeId` and its identifier union.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;

use crate::{ByteString, Guid, StatusCode, UAString, UaNullable};

/// The identifier part of a node id. The JSON encoding tags the four
/// kinds 0 through 3, in the order they are declared here.
#[derive(Eq, PartialEq, Clone, Debug, Hash)]
pub enum Identifier {
    /// A numeric identifier, `i=123`.
    Numeric(u32),
    /// A string identifier, `s=Some.Name`.
    String(UAString),
    /// A GUID identifier, `g=...`.
    Guid(Guid),
    /// An opaque identifier, `b=<base64>`.
    ByteString(ByteString),
}

impl Identifier {
    /// The numeric `IdType` tag of this identifier kind.
    pub fn id_type(&self) -> u32 {
        match self {
            Identifier::Numeric(_) => 0,
            Identifier::String(_) => 1,
            Identifier::Guid(_) => 2,
            Identifier::ByteString(_) => 3,
        }
    }

    fn parse(kind: &str, value: &str) -> Option<Identifier> {
        match kind {
            "i" => value.parse::<u32>().ok().map(Identifier::Numeric),
            "s" => Some(Identifier::String(value.into())),
            "g" => Guid::from_str(value).ok().map(Identifier::Guid),
            "b" => ByteString::from_base64(value).map(Identifier::ByteString),
            _ => None,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Identifier::Numeric(v) => write!(f, "i={}", v),
            Identifier::String(v) => write!(f, "s={}", v),
            Identifier::Guid(v) => write!(f, "g={}", v),
            Identifier::ByteString(v) => write!(f, "b={}", v.as_base64()),
        }
    }
}

impl FromStr for Identifier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, value) = s.split_once('=').ok_or(())?;
        Identifier::parse(kind, value).ok_or(())
    }
}

macro_rules! identifier_from {
    ($($t:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$t> for Identifier {
                fn from(v: $t) -> Self {
                    Identifier::$variant(v.into())
                }
            }
        )+
    };
}

identifier_from! {
    u32 => Numeric,
    UAString => String,
    Guid => Guid,
    ByteString => ByteString,
}

impl From<&str> for Identifier {
    fn from(v: &str) -> Self {
        Identifier::String(v.into())
    }
}

impl From<String> for Identifier {
    fn from(v: String) -> Self {
        Identifier::String(v.into())
    }
}

/// An identifier for a node in the address space of an OPC UA server:
/// an [`Identifier`] qualified by a namespace index.
#[derive(PartialEq, Eq, Clone, Debug, Hash)]
pub struct NodeId {
    /// Index into the namespace table.
    pub namespace: u16,
    /// The identifier within that namespace.
    pub identifier: Identifier,
}

impl NodeId {
    /// Create a node id from anything convertible to an identifier:
    /// `u32`, strings, [`Guid`] or [`ByteString`].
    pub fn new<T>(namespace: u16, value: T) -> NodeId
    where
        T: 'static + Into<Identifier>,
    {
        NodeId {
            namespace,
            identifier: value.into(),
        }
    }

    /// The null node id, `i=0` in namespace 0.
    pub fn null() -> NodeId {
        NodeId::new(0, 0u32)
    }

    /// True for the null node id.
    pub fn is_null(&self) -> bool {
        self.namespace == 0 && matches!(self.identifier, Identifier::Numeric(0))
    }

    /// True if the identifier is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self.identifier, Identifier::Numeric(_))
    }

    /// The numeric identifier value, if the identifier is numeric.
    pub fn as_u32(&self) -> Option<u32> {
        match self.identifier {
            Identifier::Numeric(v) => Some(v),
            _ => None,
        }
    }
}

impl Default for NodeId {
    fn default() -> Self {
        NodeId::null()
    }
}

impl UaNullable for NodeId {
    fn is_ua_null(&self) -> bool {
        self.is_null()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // String form per part 6, 5.3.1.10: ns=<index>;<identifier>,
        // with the prefix dropped for namespace 0
        if self.namespace != 0 {
            write!(f, "ns={};", self.namespace)?;
        }
        self.identifier.fmt(f)
    }
}

static NODE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:ns=(?P<ns>[0-9]+);)?(?P<k>[isgb])=(?P<v>.+)$").unwrap());

impl FromStr for NodeId {
    type Err = StatusCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = NODE_ID_RE.captures(s).ok_or(StatusCode::BadNodeIdInvalid)?;
        let namespace = match captures.name("ns") {
            Some(m) => m
                .as_str()
                .parse::<u16>()
                .map_err(|_| StatusCode::BadNodeIdInvalid)?,
            None => 0,
        };
        Identifier::parse(&captures["k"], &captures["v"])
            .map(|identifier| NodeId {
                namespace,
                identifier,
            })
            .ok_or(StatusCode::BadNodeIdInvalid)
    }
}

impl From<&NodeId> for NodeId {
    fn from(v: &NodeId) -> Self {
        v.clone()
    }
}

impl From<(u16, &str)> for NodeId {
    fn from(v: (u16, &str)) -> Self {
        Self::new(v.0, v.1.to_owned())
    }
}

impl From<(u16, u32)> for NodeId {
    fn from(v: (u16, u32)) -> Self {
        Self::new(v.0, v.1)
    }
}

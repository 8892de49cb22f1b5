// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Contains the implementation of `ExpandedNodeId`.

use std::{borrow::Cow, fmt, str::FromStr, sync::LazyLock};

use regex::Regex;

use crate::{
    context::NamespaceTable, node_id::Identifier, status_code::StatusCode, NodeId, UAString,
    UaNullable,
};

/// A NodeId that allows the namespace URI to be specified instead of an index,
/// and which may refer to a node on another server.
#[derive(PartialEq, Eq, Clone, Debug, Hash, Default)]
pub struct ExpandedNodeId {
    /// The inner node id, whose namespace index only applies when the
    /// namespace URI is null.
    pub node_id: NodeId,
    /// The namespace URI. When set it overrides the namespace index.
    pub namespace_uri: UAString,
    /// Index into the server table, 0 is the local server.
    pub server_index: u32,
}

impl UaNullable for ExpandedNodeId {
    fn is_ua_null(&self) -> bool {
        self.is_null()
    }
}

impl fmt::Display for ExpandedNodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Formatted from the format specified in 5.3.1.11 part 6
        if self.server_index != 0 {
            write!(f, "svr={};", self.server_index)?;
        }
        if !self.namespace_uri.is_null() {
            write!(f, "nsu={};{}", escape_uri(self.namespace_uri.as_ref()), self.node_id.identifier)
        } else {
            write!(f, "{}", self.node_id)
        }
    }
}

fn escape_uri(uri: &str) -> String {
    uri.replace('%', "%25").replace(';', "%3b")
}

fn unescape_uri(uri: &str) -> String {
    uri.replace("%3b", ";").replace("%3B", ";").replace("%25", "%")
}

impl From<NodeId> for ExpandedNodeId {
    fn from(node_id: NodeId) -> Self {
        ExpandedNodeId {
            node_id,
            namespace_uri: UAString::null(),
            server_index: 0,
        }
    }
}

impl From<&NodeId> for ExpandedNodeId {
    fn from(node_id: &NodeId) -> Self {
        Self::from(node_id.clone())
    }
}

impl FromStr for ExpandedNodeId {
    type Err = StatusCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Parses a node from a string using the format specified in 5.3.1.11 part 6
        //
        // svr=<serverindex>;ns=<namespaceindex>;<type>=<value>
        // or
        // svr=<serverindex>;nsu=<uri>;<type>=<value>
        static RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^(svr=(?P<svr>[0-9]+);)?(ns=(?P<ns>[0-9]+);|nsu=(?P<nsu>[^;]+);)?(?P<t>[isgb]=.+)$")
                .unwrap()
        });

        let captures = RE.captures(s).ok_or(StatusCode::BadNodeIdInvalid)?;

        let server_index = captures
            .name("svr")
            .map(|svr| svr.as_str().parse::<u32>())
            .transpose()
            .map_err(|_| StatusCode::BadNodeIdInvalid)?
            .unwrap_or(0);

        let namespace = captures
            .name("ns")
            .map(|ns| ns.as_str().parse::<u16>())
            .transpose()
            .map_err(|_| StatusCode::BadNodeIdInvalid)?
            .unwrap_or(0);

        let namespace_uri = match captures.name("nsu") {
            Some(uri) => UAString::from(unescape_uri(uri.as_str())),
            None => UAString::null(),
        };

        let t = captures.name("t").unwrap();
        let identifier =
            Identifier::from_str(t.as_str()).map_err(|_| StatusCode::BadNodeIdInvalid)?;

        Ok(ExpandedNodeId {
            node_id: NodeId {
                namespace,
                identifier,
            },
            namespace_uri,
            server_index,
        })
    }
}

impl ExpandedNodeId {
    /// Creates an expanded node id from a node id, with no URI or server index.
    pub fn new(value: impl Into<NodeId>) -> ExpandedNodeId {
        ExpandedNodeId {
            node_id: value.into(),
            namespace_uri: UAString::null(),
            server_index: 0,
        }
    }

    /// Returns a null expanded node id.
    pub fn null() -> ExpandedNodeId {
        Self::new(NodeId::null())
    }

    /// Test if the expanded node id is null.
    pub fn is_null(&self) -> bool {
        self.node_id.is_null() && self.namespace_uri.is_null() && self.server_index == 0
    }

    /// Try to resolve this into a plain NodeId against a namespace table.
    /// Fails with `None` if the namespace URI is set but not present in
    /// the table. Only node ids on the local server can be resolved.
    pub fn try_resolve<'a>(&'a self, namespaces: &NamespaceTable) -> Option<Cow<'a, NodeId>> {
        if self.server_index != 0 {
            return None;
        }
        match self.namespace_uri.value() {
            Some(uri) => namespaces.index_of(uri).map(|namespace| {
                Cow::Owned(NodeId {
                    namespace,
                    identifier: self.node_id.identifier.clone(),
                })
            }),
            None => Some(Cow::Borrowed(&self.node_id)),
        }
    }
}

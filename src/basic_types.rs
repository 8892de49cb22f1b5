// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! A small set of concrete types from the core namespace: the
//! `TimestampsToReturn` enumeration and the `Argument` and
//! `EUInformation` structures, together with the type loader that
//! registers them. Larger deployments bring their own generated types
//! and loaders; these exist so that the codec is usable out of the box.

use std::sync::LazyLock;

use crate::{
    json::{JsonDecodable, JsonDecoder, JsonEncodable, JsonEncoder},
    type_loader::{json_decode_to_enc, StaticTypeLoader, TypeLoaderInstance},
    context::BASE_NAMESPACE_URI,
    EncodingResult, Error, ExpandedMessageInfo, ExpandedNodeId, LocalizedText, NodeId, UAString,
    UaEnum,
};

/// Numeric ids of the core namespace nodes this library refers to.
pub mod ids {
    /// The `TimestampsToReturn` data type.
    pub const TIMESTAMPS_TO_RETURN: u32 = 625;
    /// The `Argument` data type.
    pub const ARGUMENT: u32 = 296;
    /// The `Argument` default JSON encoding.
    pub const ARGUMENT_ENCODING_DEFAULT_JSON: u32 = 15081;
    /// The `EUInformation` data type.
    pub const EU_INFORMATION: u32 = 887;
    /// The `EUInformation` default JSON encoding.
    pub const EU_INFORMATION_ENCODING_DEFAULT_JSON: u32 = 15376;
}

/// Which timestamps a read or monitoring operation should return.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum TimestampsToReturn {
    /// Return the source timestamp.
    #[default]
    Source = 0,
    /// Return the server timestamp.
    Server = 1,
    /// Return both timestamps.
    Both = 2,
    /// Return no timestamps.
    Neither = 3,
    /// No value specified.
    Invalid = 4,
}

impl UaEnum for TimestampsToReturn {
    type Repr = i32;

    fn from_repr(repr: Self::Repr) -> Result<Self, Error> {
        Ok(match repr {
            0 => Self::Source,
            1 => Self::Server,
            2 => Self::Both,
            3 => Self::Neither,
            4 => Self::Invalid,
            r => {
                return Err(Error::encoding(format!(
                    "Unexpected TimestampsToReturn value {r}"
                )))
            }
        })
    }

    fn into_repr(self) -> Self::Repr {
        self as i32
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "Source_0",
            Self::Server => "Server_1",
            Self::Both => "Both_2",
            Self::Neither => "Neither_3",
            Self::Invalid => "Invalid_4",
        }
    }

    fn from_str(val: &str) -> Result<Self, Error> {
        match val {
            "Source_0" => Ok(Self::Source),
            "Server_1" => Ok(Self::Server),
            "Both_2" => Ok(Self::Both),
            "Neither_3" => Ok(Self::Neither),
            "Invalid_4" => Ok(Self::Invalid),
            r => Err(Error::encoding(format!(
                "Unexpected TimestampsToReturn value {r}"
            ))),
        }
    }
}

/// An argument to a method call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Argument {
    /// The name of the argument.
    pub name: UAString,
    /// The data type of the argument value.
    pub data_type: NodeId,
    /// Scalar (-1) or the rank of the array the argument takes.
    pub value_rank: i32,
    /// Expected array dimensions, if the value rank says it is an array.
    pub array_dimensions: Option<Vec<u32>>,
    /// A description of the argument.
    pub description: LocalizedText,
}

impl JsonEncodable for Argument {
    fn encode(&self, encoder: &mut JsonEncoder<'_>) -> EncodingResult<()> {
        encoder.write_string(Some("Name"), &self.name)?;
        encoder.write_node_id(Some("DataType"), &self.data_type)?;
        encoder.write_i32(Some("ValueRank"), self.value_rank)?;
        encoder.write_u32_array(Some("ArrayDimensions"), self.array_dimensions.as_deref())?;
        encoder.write_localized_text(Some("Description"), &self.description)?;
        Ok(())
    }
}

impl JsonDecodable for Argument {
    fn decode(decoder: &mut JsonDecoder<'_>) -> EncodingResult<Self> {
        Ok(Self {
            name: decoder.read_string(Some("Name"))?,
            data_type: decoder.read_node_id(Some("DataType"))?,
            value_rank: decoder.read_i32(Some("ValueRank"))?,
            array_dimensions: decoder.read_u32_array(Some("ArrayDimensions"))?,
            description: decoder.read_localized_text(Some("Description"))?,
        })
    }
}

impl ExpandedMessageInfo for Argument {
    fn full_json_type_id(&self) -> ExpandedNodeId {
        ExpandedNodeId::new(NodeId::new(0, ids::ARGUMENT_ENCODING_DEFAULT_JSON))
    }

    fn full_data_type_id(&self) -> ExpandedNodeId {
        ExpandedNodeId::new(NodeId::new(0, ids::ARGUMENT))
    }
}

/// Information about an engineering unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EUInformation {
    /// Organization defining the unit ids, typically UNECE.
    pub namespace_uri: UAString,
    /// The identifier of the unit in that namespace.
    pub unit_id: i32,
    /// The display name of the unit, e.g. "°C".
    pub display_name: LocalizedText,
    /// The full name of the unit.
    pub description: LocalizedText,
}

impl JsonEncodable for EUInformation {
    fn encode(&self, encoder: &mut JsonEncoder<'_>) -> EncodingResult<()> {
        encoder.write_string(Some("NamespaceUri"), &self.namespace_uri)?;
        encoder.write_i32(Some("UnitId"), self.unit_id)?;
        encoder.write_localized_text(Some("DisplayName"), &self.display_name)?;
        encoder.write_localized_text(Some("Description"), &self.description)?;
        Ok(())
    }
}

impl JsonDecodable for EUInformation {
    fn decode(decoder: &mut JsonDecoder<'_>) -> EncodingResult<Self> {
        Ok(Self {
            namespace_uri: decoder.read_string(Some("NamespaceUri"))?,
            unit_id: decoder.read_i32(Some("UnitId"))?,
            display_name: decoder.read_localized_text(Some("DisplayName"))?,
            description: decoder.read_localized_text(Some("Description"))?,
        })
    }
}

impl ExpandedMessageInfo for EUInformation {
    fn full_json_type_id(&self) -> ExpandedNodeId {
        ExpandedNodeId::new(NodeId::new(0, ids::EU_INFORMATION_ENCODING_DEFAULT_JSON))
    }

    fn full_data_type_id(&self) -> ExpandedNodeId {
        ExpandedNodeId::new(NodeId::new(0, ids::EU_INFORMATION))
    }
}

static CORE_TYPES: LazyLock<TypeLoaderInstance> = LazyLock::new(|| {
    let mut instance = TypeLoaderInstance::new();
    instance.add_json_type(
        ids::ARGUMENT,
        ids::ARGUMENT_ENCODING_DEFAULT_JSON,
        json_decode_to_enc::<Argument>,
    );
    instance.add_json_type(
        ids::EU_INFORMATION,
        ids::EU_INFORMATION_ENCODING_DEFAULT_JSON,
        json_decode_to_enc::<EUInformation>,
    );
    instance
});

/// Type loader for the structures in this module.
pub struct CoreTypeLoader;

impl StaticTypeLoader for CoreTypeLoader {
    fn instance() -> &'static TypeLoaderInstance {
        &CORE_TYPES
    }

    fn namespace() -> &'static str {
        BASE_NAMESPACE_URI
    }
}

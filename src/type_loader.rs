// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! The [`TypeLoader`] trait: the codec's window into the type library.
//!
//! An extension object on the wire carries a type id and an opaque body.
//! To turn that body back into a concrete structure the decoder asks the
//! loaders registered on the context, in priority order, until one
//! recognizes the id. A loader that does not know the id answers `None`
//! so the next one gets a chance; an error means the id matched but the
//! body was bad.

use std::{io::Read, sync::Arc};

use hashbrown::HashMap;

use crate::{
    json::{JsonDecodable, JsonDecoder},
    Context, DynEncodable, EncodingResult, Error, NodeId,
};

/// Deserialization function for a structured type from a JSON body.
pub type JsonLoadFun = fn(&mut JsonDecoder<'_>) -> EncodingResult<Box<dyn DynEncodable>>;

/// Deserialization function for a structured type from an OPC-UA binary
/// body. The binary codec is not part of this library; implementations
/// bring their own.
pub type BinaryLoadFun =
    fn(&mut dyn Read, &Context<'_>) -> EncodingResult<Box<dyn DynEncodable>>;

#[derive(Default, Clone, Copy)]
struct LoadFuns {
    json: Option<JsonLoadFun>,
    binary: Option<BinaryLoadFun>,
}

/// Registry mapping the numeric part of data type and encoding ids to
/// deserialization functions. Typically built once per type set and
/// held in a static.
#[derive(Default)]
pub struct TypeLoaderInstance {
    types: HashMap<u32, LoadFuns>,
}

/// Adapt a [`JsonDecodable`] type to the shape [`TypeLoaderInstance`]
/// registers.
pub fn json_decode_to_enc<T: DynEncodable + JsonDecodable>(
    decoder: &mut JsonDecoder<'_>,
) -> EncodingResult<Box<dyn DynEncodable>> {
    Ok(Box::new(T::decode(decoder)?))
}

impl TypeLoaderInstance {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a JSON decode function under a data type id and its
    /// encoding id.
    pub fn add_json_type(&mut self, data_type: u32, encoding_type: u32, fun: JsonLoadFun) {
        for id in [data_type, encoding_type] {
            self.types.entry(id).or_default().json = Some(fun);
        }
    }

    /// Register a binary decode function under a data type id and its
    /// encoding id.
    pub fn add_binary_type(&mut self, data_type: u32, encoding_type: u32, fun: BinaryLoadFun) {
        for id in [data_type, encoding_type] {
            self.types.entry(id).or_default().binary = Some(fun);
        }
    }

    /// Decode the type registered for `ty` from JSON, `None` if nothing
    /// is registered.
    pub fn decode_json(
        &self,
        ty: u32,
        decoder: &mut JsonDecoder<'_>,
    ) -> Option<EncodingResult<Box<dyn DynEncodable>>> {
        let fun = self.types.get(&ty)?.json?;
        Some(fun(decoder))
    }

    /// Decode the type registered for `ty` from OPC-UA binary, `None`
    /// if nothing is registered.
    pub fn decode_binary(
        &self,
        ty: u32,
        stream: &mut dyn Read,
        ctx: &Context<'_>,
    ) -> Option<EncodingResult<Box<dyn DynEncodable>>> {
        let fun = self.types.get(&ty)?.binary?;
        Some(fun(stream, ctx))
    }
}

/// Priority of a type loader. Loaders are consulted in this order, so a
/// more specific implementation wins when several handle the same id.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TypeLoaderPriority {
    /// Reserved for the core namespace.
    Core,
    /// Any generated or library provided type loader.
    Generated,
    /// A dynamic type loader with a custom priority above the generated
    /// ones.
    Dynamic(u32),
    /// Always consulted last.
    Fallback,
}

impl TypeLoaderPriority {
    fn rank(&self) -> u32 {
        match self {
            Self::Core => 0,
            Self::Generated => 1,
            Self::Dynamic(v) => *v,
            Self::Fallback => u32::MAX,
        }
    }
}

impl PartialOrd for TypeLoaderPriority {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeLoaderPriority {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

/// A collection of types the decoder can reify. See the module docs for
/// the `None` versus error contract.
pub trait TypeLoader: Send + Sync {
    /// Decode the type identified by `node_id` from the JSON body the
    /// decoder is currently positioned on.
    fn load_from_json(
        &self,
        node_id: &NodeId,
        decoder: &mut JsonDecoder<'_>,
    ) -> Option<EncodingResult<Box<dyn DynEncodable>>>;

    /// Decode the type identified by `node_id` from an OPC-UA binary
    /// stream. By default no binary types are known.
    fn load_from_binary(
        &self,
        node_id: &NodeId,
        stream: &mut dyn Read,
        ctx: &Context<'_>,
    ) -> Option<EncodingResult<Box<dyn DynEncodable>>> {
        let _ = (node_id, stream, ctx);
        None
    }

    /// Where this loader sorts among the registered loaders.
    fn priority(&self) -> TypeLoaderPriority {
        TypeLoaderPriority::Generated
    }
}

/// Shortcut for loaders backed by a static [`TypeLoaderInstance`] and a
/// namespace fixed at compile time; implementing this implements
/// [`TypeLoader`].
pub trait StaticTypeLoader {
    /// The registry of this loader.
    fn instance() -> &'static TypeLoaderInstance;

    /// The namespace URI whose ids this loader owns.
    fn namespace() -> &'static str;
}

fn numeric_id(node_id: &NodeId) -> EncodingResult<u32> {
    node_id.as_u32().ok_or_else(|| {
        Error::encoding("Unsupported encoding ID. Only numeric encoding IDs are currently supported")
    })
}

impl<T> TypeLoader for T
where
    T: StaticTypeLoader + Send + Sync + 'static,
{
    fn load_from_json(
        &self,
        node_id: &NodeId,
        decoder: &mut JsonDecoder<'_>,
    ) -> Option<EncodingResult<Box<dyn DynEncodable>>> {
        let own_index = decoder.context().namespaces().index_of(Self::namespace())?;
        if own_index != node_id.namespace {
            return None;
        }
        match numeric_id(node_id) {
            Ok(id) => Self::instance().decode_json(id, decoder),
            Err(e) => Some(Err(e)),
        }
    }

    fn load_from_binary(
        &self,
        node_id: &NodeId,
        stream: &mut dyn Read,
        ctx: &Context<'_>,
    ) -> Option<EncodingResult<Box<dyn DynEncodable>>> {
        let own_index = ctx.namespaces().index_of(Self::namespace())?;
        if own_index != node_id.namespace {
            return None;
        }
        match numeric_id(node_id) {
            Ok(id) => Self::instance().decode_binary(id, stream, ctx),
            Err(e) => Some(Err(e)),
        }
    }
}

/// The loaders registered on a context, kept sorted by priority.
#[derive(Clone)]
pub struct TypeLoaderCollection {
    loaders: Vec<Arc<dyn TypeLoader>>,
}

impl std::fmt::Debug for TypeLoaderCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TypeLoaderCollection({} loaders)", self.loaders.len())
    }
}

impl Default for TypeLoaderCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeLoaderCollection {
    /// A collection holding the loader for the types this library ships.
    pub fn new() -> Self {
        Self {
            loaders: vec![Arc::new(crate::basic_types::CoreTypeLoader)],
        }
    }

    /// A collection with no loaders at all, not even the built-in ones.
    /// Usually only useful for testing.
    pub fn new_empty() -> Self {
        Self {
            loaders: Vec::new(),
        }
    }

    /// Add a loader, keeping the collection sorted.
    pub fn add_type_loader(&mut self, loader: impl TypeLoader + 'static) {
        self.add(Arc::new(loader));
    }

    /// Add a shared loader, keeping the collection sorted.
    pub fn add(&mut self, loader: Arc<dyn TypeLoader>) {
        let index = self
            .loaders
            .iter()
            .position(|l| l.priority() > loader.priority())
            .unwrap_or(self.loaders.len());
        self.loaders.insert(index, loader);
    }

    /// Iterate the loaders in priority order.
    pub fn iter(&self) -> <&Self as IntoIterator>::IntoIter {
        self.into_iter()
    }
}

impl<'a> IntoIterator for &'a TypeLoaderCollection {
    type Item = &'a Arc<dyn TypeLoader>;

    type IntoIter = <&'a [Arc<dyn TypeLoader>] as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.loaders.iter()
    }
}

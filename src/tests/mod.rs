use serde_json::Value;

use crate::{
    json::{JsonDecoder, JsonDecoderOptions, JsonEncodable, JsonEncoder, JsonEncoderOptions},
    ContextOwned, EncodingResult,
};

mod json;

pub(crate) fn ctx() -> ContextOwned {
    ContextOwned::default()
}

/// Run a closure against an encoder and return the produced document.
pub(crate) fn write_with(
    ctx: &ContextOwned,
    options: JsonEncoderOptions,
    f: impl FnOnce(&mut JsonEncoder<'_>) -> EncodingResult<()>,
) -> EncodingResult<String> {
    let mut buffer = Vec::new();
    let mut encoder = JsonEncoder::new(&mut buffer, ctx.context(), options);
    f(&mut encoder)?;
    encoder.finish()?;
    Ok(String::from_utf8(buffer).unwrap())
}

pub(crate) fn to_string(
    ctx: &ContextOwned,
    f: impl FnOnce(&mut JsonEncoder<'_>) -> EncodingResult<()>,
) -> EncodingResult<String> {
    write_with(ctx, JsonEncoderOptions::default(), f)
}

pub(crate) fn to_value(
    ctx: &ContextOwned,
    f: impl FnOnce(&mut JsonEncoder<'_>) -> EncodingResult<()>,
) -> EncodingResult<Value> {
    Ok(serde_json::from_str(&to_string(ctx, f)?).unwrap())
}

pub(crate) fn to_string_non_reversible(
    ctx: &ContextOwned,
    f: impl FnOnce(&mut JsonEncoder<'_>) -> EncodingResult<()>,
) -> EncodingResult<String> {
    write_with(
        ctx,
        JsonEncoderOptions {
            reversible: false,
            ..Default::default()
        },
        f,
    )
}

pub(crate) fn to_value_non_reversible(
    ctx: &ContextOwned,
    f: impl FnOnce(&mut JsonEncoder<'_>) -> EncodingResult<()>,
) -> EncodingResult<Value> {
    Ok(serde_json::from_str(&to_string_non_reversible(ctx, f)?).unwrap())
}

/// A decoder over an in-memory document.
pub(crate) fn decoder<'a>(ctx: &'a ContextOwned, doc: Value) -> JsonDecoder<'a> {
    JsonDecoder::new(doc, ctx.context(), JsonDecoderOptions::default())
}

/// Adapter so tests can write named fields without defining a type for
/// every shape: wraps a closure as an encodable structure.
pub(crate) struct Fields<F>(pub F);

impl<F> std::fmt::Debug for Fields<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fields")
    }
}

impl<F> JsonEncodable for Fields<F>
where
    F: Fn(&mut JsonEncoder<'_>) -> EncodingResult<()>,
{
    fn encode(&self, encoder: &mut JsonEncoder<'_>) -> EncodingResult<()> {
        (self.0)(encoder)
    }
}

/// Encode a set of named fields as a JSON object and parse the result.
pub(crate) fn object_to_value(
    ctx: &ContextOwned,
    f: impl Fn(&mut JsonEncoder<'_>) -> EncodingResult<()>,
) -> EncodingResult<Value> {
    to_value(ctx, |e| e.encode_message(&Fields(f)))
}

/// The non-reversible counterpart of [`object_to_value`].
pub(crate) fn object_to_value_non_reversible(
    ctx: &ContextOwned,
    f: impl Fn(&mut JsonEncoder<'_>) -> EncodingResult<()>,
) -> EncodingResult<Value> {
    to_value_non_reversible(ctx, |e| e.encode_message(&Fields(f)))
}

// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! The [`JsonCodec`] provider: owns an encoding context and a pair of
//! option records, and constructs encoders and decoders over the
//! supported sinks and sources.

use std::io::{Read, Write};

use crate::{ContextOwned, EncodingResult};

use super::{
    decoder::{JsonDecoder, JsonDecoderOptions},
    encoder::{JsonEncoder, JsonEncoderOptions},
    JsonDecodable, JsonEncodable,
};

/// Factory for encoder and decoder instances sharing one encoding
/// context.
///
/// Encoders write to a caller supplied sink or to an internal byte
/// buffer; decoders read from a stream, a contiguous byte buffer, or a
/// segmented buffer. Sinks and sources passed in by reference remain
/// owned, and open, by the caller.
#[derive(Debug, Default)]
pub struct JsonCodec {
    ctx: ContextOwned,
    encoder_options: JsonEncoderOptions,
    decoder_options: JsonDecoderOptions,
}

impl JsonCodec {
    /// Create a codec over a context with default options.
    pub fn new(ctx: ContextOwned) -> Self {
        Self {
            ctx,
            encoder_options: JsonEncoderOptions::default(),
            decoder_options: JsonDecoderOptions::default(),
        }
    }

    /// Replace the encoder options.
    pub fn with_encoder_options(mut self, options: JsonEncoderOptions) -> Self {
        self.encoder_options = options;
        self
    }

    /// Replace the decoder options.
    pub fn with_decoder_options(mut self, options: JsonDecoderOptions) -> Self {
        self.decoder_options = options;
        self
    }

    /// The owned context of this codec.
    pub fn context(&self) -> &ContextOwned {
        &self.ctx
    }

    /// The owned context of this codec, mutably.
    pub fn context_mut(&mut self) -> &mut ContextOwned {
        &mut self.ctx
    }

    /// Create an encoder over a sink stream. The stream stays open when
    /// the encoder is finished.
    pub fn encoder<'a>(&'a self, sink: &'a mut dyn Write) -> JsonEncoder<'a> {
        JsonEncoder::new(sink, self.ctx.context(), self.encoder_options.clone())
    }

    /// Encode one message into a fresh byte buffer.
    pub fn encode_message_to_vec<T>(&self, message: &T) -> EncodingResult<Vec<u8>>
    where
        T: JsonEncodable + ?Sized,
    {
        let mut buffer = Vec::new();
        let mut encoder = JsonEncoder::new(
            &mut buffer,
            self.ctx.context(),
            self.encoder_options.clone(),
        );
        encoder.encode_message(message)?;
        encoder.finish()?;
        Ok(buffer)
    }

    /// Create a decoder over a source stream. The stream is read to its
    /// end up front and stays open beyond that.
    pub fn decoder_from_stream<'a>(
        &'a self,
        source: &mut dyn Read,
    ) -> EncodingResult<JsonDecoder<'a>> {
        JsonDecoder::from_reader(source, self.ctx.context(), self.decoder_options.clone())
    }

    /// Create a decoder over a contiguous byte buffer.
    pub fn decoder_from_slice<'a>(&'a self, data: &[u8]) -> EncodingResult<JsonDecoder<'a>> {
        JsonDecoder::from_slice(data, self.ctx.context(), self.decoder_options.clone())
    }

    /// Create a decoder over a segmented byte buffer, e.g. a message
    /// reassembled from chunks.
    pub fn decoder_from_chunks<'a>(
        &'a self,
        chunks: &[&[u8]],
    ) -> EncodingResult<JsonDecoder<'a>> {
        let mut data = Vec::with_capacity(chunks.iter().map(|c| c.len()).sum());
        for chunk in chunks {
            data.extend_from_slice(chunk);
        }
        self.decoder_from_slice(&data)
    }

    /// Decode one message from a byte buffer.
    pub fn decode_message<T>(&self, data: &[u8]) -> EncodingResult<T>
    where
        T: JsonDecodable,
    {
        self.decoder_from_slice(data)?.decode_message()
    }
}

//! # Protobuf <-> JSON Codec
//!
//! This module implements `tonic::codec::Codec` so `tonic` can carry dynamic messages.
//!
//! 1. **Encoder**: takes an already validated `DynamicMessage` and writes its Protobuf bytes.
//! 2. **Decoder**: reads Protobuf bytes into a `DynamicMessage` of the configured descriptor and
//!    converts it to a `serde_json::Value` using the *proto* field names (`model_id`, not
//!    `modelId`), which is the casing the JSON/HTTP API uses as well.
//!
//! The codec is symmetric: a client decodes with the method's output descriptor, a server
//! decodes with the method's input descriptor.
use prost::Message;
use prost_reflect::{DynamicMessage, MessageDescriptor, SerializeOptions};
use tonic::{
    Status,
    codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder},
};

/// Serialization settings for decoded messages.
///
/// Enum values are written as numbers and 64-bit integers as JSON numbers so the output
/// matches what the JSON/HTTP API returns.
pub fn json_options() -> SerializeOptions {
    SerializeOptions::new()
        .use_proto_field_name(true)
        .use_enum_numbers(true)
        .stringify_64_bit_integers(false)
}

/// Converts a dynamic message into JSON with proto field names.
pub fn message_to_json(message: &DynamicMessage) -> Result<serde_json::Value, serde_json::Error> {
    message.serialize_with_options(serde_json::value::Serializer, &json_options())
}

/// A Codec that encodes `DynamicMessage`s and decodes into `serde_json::Value`.
pub struct JsonCodec {
    /// Schema of the messages read from the wire.
    decode_desc: MessageDescriptor,
}

impl JsonCodec {
    /// Creates a new `JsonCodec` decoding messages of type `decode_desc`.
    pub fn new(decode_desc: MessageDescriptor) -> Self {
        Self { decode_desc }
    }
}

impl Codec for JsonCodec {
    type Encode = DynamicMessage;
    type Decode = serde_json::Value;

    type Encoder = ProtoEncoder;
    type Decoder = JsonDecoder;

    fn encoder(&mut self) -> Self::Encoder {
        ProtoEncoder
    }

    fn decoder(&mut self) -> Self::Decoder {
        JsonDecoder(self.decode_desc.clone())
    }
}

/// Writes a dynamic message as Protobuf bytes.
pub struct ProtoEncoder;

impl Encoder for ProtoEncoder {
    type Item = DynamicMessage;
    type Error = Status;

    fn encode(&mut self, item: Self::Item, dst: &mut EncodeBuf<'_>) -> Result<(), Self::Error> {
        item.encode_raw(dst);
        Ok(())
    }
}

/// Responsible for decoding Protobuf bytes into a JSON value.
pub struct JsonDecoder(MessageDescriptor);

impl Decoder for JsonDecoder {
    type Item = serde_json::Value;
    type Error = Status;

    fn decode(&mut self, src: &mut DecodeBuf<'_>) -> Result<Option<Self::Item>, Self::Error> {
        let mut msg = DynamicMessage::new(self.0.clone());
        msg.merge(src)
            .map_err(|e| Status::internal(format!("Failed to decode Protobuf bytes: {}", e)))?;

        let value = message_to_json(&msg)
            .map_err(|e| Status::internal(format!("Failed to map response to JSON: {}", e)))?;

        Ok(Some(value))
    }
}

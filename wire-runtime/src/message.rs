use std::fmt;

use crate::codec::{ProtoReader, ProtoWriter};
use crate::error::{BuildError, DecodeResult};
use crate::unknown::UnknownFields;

/// An immutable generated message
///
/// Implemented by `#[derive(wire::Message)]`. Values are never modified
/// after construction; to change one, go through [`Message::to_builder`].
pub trait Message: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    type Builder: MessageBuilder<Message = Self>;

    /// Fully-qualified proto name, e.g. `squareup.Person`
    const TYPE_NAME: &'static str;

    fn unknown_fields(&self) -> &UnknownFields;

    /// Structural hash, computed once and cached
    fn hash_code(&self) -> i32;

    /// A builder holding a copy of every field and the unknown fields
    fn to_builder(&self) -> Self::Builder;

    /// Writes declared fields in declaration order, then unknown fields
    fn encode_to(&self, writer: &mut ProtoWriter);

    /// Reads fields until the end of `reader`
    fn decode_from(reader: &mut ProtoReader<'_>) -> DecodeResult<Self>;

    fn encode(&self) -> Vec<u8> {
        let mut writer = ProtoWriter::new();
        self.encode_to(&mut writer);
        writer.into_bytes()
    }

    fn decode(bytes: &[u8]) -> DecodeResult<Self> {
        Self::decode_from(&mut ProtoReader::new(bytes))
    }
}

/// Mutable staging area for a [`Message`]
pub trait MessageBuilder: Default {
    type Message: Message<Builder = Self>;

    /// Freezes the current values into a message
    fn build(self) -> Result<Self::Message, BuildError>;

    fn unknown_fields_mut(&mut self) -> &mut UnknownFields;
}

/// A generated proto enum
///
/// Implemented by `#[derive(wire::Enum)]`.
pub trait WireEnum: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    const TYPE_NAME: &'static str;

    fn value(self) -> i32;

    /// The constant with this wire value, if the enum declares one
    fn from_value(value: i32) -> Option<Self>;
}

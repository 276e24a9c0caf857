//! Encoders and decoders for each proto value type.
//!
//! An adapter is a zero-sized marker naming how one proto type maps to a
//! Rust value and onto the wire. Generated code picks adapters by the
//! field's declared proto type, so `int32`, `sint32` and `sfixed32` share
//! `i32` values but differ on the wire.

use std::marker::PhantomData;

use crate::codec::{ProtoReader, ProtoWriter, WireType, decode_zigzag32, decode_zigzag64};
use crate::codec::{encode_zigzag32, encode_zigzag64};
use crate::error::{DecodeError, DecodeResult};
use crate::message::{Message, WireEnum};

pub trait ProtoAdapter {
    type Value;

    const WIRE_TYPE: WireType;

    /// Whether repeated values may use the packed encoding
    const PACKABLE: bool;

    /// Writes the payload only, without a key
    fn encode(writer: &mut ProtoWriter, value: &Self::Value);

    /// Reads the payload of a field whose key was just read
    fn decode(reader: &mut ProtoReader<'_>) -> DecodeResult<Self::Value>;

    fn encode_with_tag(writer: &mut ProtoWriter, tag: u32, value: &Self::Value) {
        writer.write_key(tag, Self::WIRE_TYPE);
        Self::encode(writer, value);
    }
}

macro_rules! varint_adapter {
    ($(#[$doc:meta])* $name:ident, $value:ty, |$v:ident| $encode:expr, |$raw:ident| $decode:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl ProtoAdapter for $name {
            type Value = $value;
            const WIRE_TYPE: WireType = WireType::Varint;
            const PACKABLE: bool = true;

            fn encode(writer: &mut ProtoWriter, value: &$value) {
                let $v = *value;
                writer.write_varint($encode);
            }

            fn decode(reader: &mut ProtoReader<'_>) -> DecodeResult<$value> {
                let $raw = reader.read_varint()?;
                Ok($decode)
            }
        }
    };
}

varint_adapter!(
    /// `int32`: negative values are sign-extended to ten bytes
    Int32, i32, |v| i64::from(v) as u64, |raw| raw as i32
);
varint_adapter!(Int64, i64, |v| v as u64, |raw| raw as i64);
varint_adapter!(UInt32, u32, |v| u64::from(v), |raw| raw as u32);
varint_adapter!(UInt64, u64, |v| v, |raw| raw);
varint_adapter!(
    SInt32, i32, |v| u64::from(encode_zigzag32(v)), |raw| decode_zigzag32(raw as u32)
);
varint_adapter!(SInt64, i64, |v| encode_zigzag64(v), |raw| decode_zigzag64(raw));
varint_adapter!(Bool, bool, |v| u64::from(v), |raw| raw != 0);

macro_rules! fixed_adapter {
    ($name:ident, $value:ty, $wire:ident, $write:ident, $read:ident, |$v:ident| $encode:expr, |$raw:ident| $decode:expr) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl ProtoAdapter for $name {
            type Value = $value;
            const WIRE_TYPE: WireType = WireType::$wire;
            const PACKABLE: bool = true;

            fn encode(writer: &mut ProtoWriter, value: &$value) {
                let $v = *value;
                writer.$write($encode);
            }

            fn decode(reader: &mut ProtoReader<'_>) -> DecodeResult<$value> {
                let $raw = reader.$read()?;
                Ok($decode)
            }
        }
    };
}

fixed_adapter!(Fixed32, u32, Fixed32, write_fixed32, read_fixed32, |v| v, |raw| raw);
fixed_adapter!(Fixed64, u64, Fixed64, write_fixed64, read_fixed64, |v| v, |raw| raw);
fixed_adapter!(SFixed32, i32, Fixed32, write_fixed32, read_fixed32, |v| v as u32, |raw| raw as i32);
fixed_adapter!(SFixed64, i64, Fixed64, write_fixed64, read_fixed64, |v| v as u64, |raw| raw as i64);
fixed_adapter!(
    Float,
    f32,
    Fixed32,
    write_fixed32,
    read_fixed32,
    |v| v.to_bits(),
    |raw| f32::from_bits(raw)
);
fixed_adapter!(
    Double,
    f64,
    Fixed64,
    write_fixed64,
    read_fixed64,
    |v| v.to_bits(),
    |raw| f64::from_bits(raw)
);

/// `string`: UTF-8 checked on decode
#[derive(Debug, Clone, Copy, Default)]
pub struct Str;

impl ProtoAdapter for Str {
    type Value = String;
    const WIRE_TYPE: WireType = WireType::LengthDelimited;
    const PACKABLE: bool = false;

    fn encode(writer: &mut ProtoWriter, value: &String) {
        writer.write_length_delimited(value.as_bytes());
    }

    fn decode(reader: &mut ProtoReader<'_>) -> DecodeResult<String> {
        let bytes = reader.read_length_delimited()?;
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| DecodeError::InvalidUtf8)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Bytes;

impl ProtoAdapter for Bytes {
    type Value = Vec<u8>;
    const WIRE_TYPE: WireType = WireType::LengthDelimited;
    const PACKABLE: bool = false;

    fn encode(writer: &mut ProtoWriter, value: &Vec<u8>) {
        writer.write_length_delimited(value);
    }

    fn decode(reader: &mut ProtoReader<'_>) -> DecodeResult<Vec<u8>> {
        Ok(reader.read_length_delimited()?.to_vec())
    }
}

/// Nested message, length-delimited
pub struct MessageAdapter<M>(PhantomData<M>);

impl<M: Message> ProtoAdapter for MessageAdapter<M> {
    type Value = M;
    const WIRE_TYPE: WireType = WireType::LengthDelimited;
    const PACKABLE: bool = false;

    fn encode(writer: &mut ProtoWriter, value: &M) {
        let mut nested = ProtoWriter::new();
        value.encode_to(&mut nested);
        writer.write_length_delimited(nested.as_bytes());
    }

    fn decode(reader: &mut ProtoReader<'_>) -> DecodeResult<M> {
        let bytes = reader.read_length_delimited()?;
        M::decode_from(&mut reader.nested(bytes)?)
    }
}

/// Enum constant as an `int32` varint
///
/// Decoding an undeclared value fails here; field decoding checks values
/// first and routes unknown ones to the unknown-field ledger.
pub struct EnumAdapter<E>(PhantomData<E>);

impl<E: WireEnum> ProtoAdapter for EnumAdapter<E> {
    type Value = E;
    const WIRE_TYPE: WireType = WireType::Varint;
    const PACKABLE: bool = true;

    fn encode(writer: &mut ProtoWriter, value: &E) {
        Int32::encode(writer, &value.value());
    }

    fn decode(reader: &mut ProtoReader<'_>) -> DecodeResult<E> {
        let offset = reader.position();
        let value = Int32::decode(reader)?;
        E::from_value(value).ok_or(DecodeError::UnknownEnumValue {
            type_name: E::TYPE_NAME,
            value,
            offset,
        })
    }
}

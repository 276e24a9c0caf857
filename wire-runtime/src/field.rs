//! Per-field encode and decode steps used by derived message code.
//!
//! Decoding never rejects a field because of its shape: a wire type the
//! declared field cannot accept, or an enum value the enum does not
//! declare, is kept in the unknown-field ledger instead.

use crate::adapter::{MessageAdapter, ProtoAdapter};
use crate::codec::{FieldKey, ProtoReader, ProtoWriter, WireType};
use crate::error::DecodeResult;
use crate::message::{Message, WireEnum};
use crate::unknown::UnknownFields;

pub fn merge_single<A: ProtoAdapter>(
    reader: &mut ProtoReader<'_>,
    key: FieldKey,
    slot: &mut Option<A::Value>,
    unknown: &mut UnknownFields,
) -> DecodeResult<()> {
    if key.wire_type != A::WIRE_TYPE {
        return unknown.capture(reader, key);
    }
    *slot = Some(A::decode(reader)?);
    Ok(())
}

/// Accepts both the packed and the one-value-per-field encodings
pub fn merge_repeated<A: ProtoAdapter>(
    reader: &mut ProtoReader<'_>,
    key: FieldKey,
    values: &mut Vec<A::Value>,
    unknown: &mut UnknownFields,
) -> DecodeResult<()> {
    if A::PACKABLE && key.wire_type == WireType::LengthDelimited {
        let mut packed = ProtoReader::new(reader.read_length_delimited()?);
        while !packed.is_at_end() {
            values.push(A::decode(&mut packed)?);
        }
        return Ok(());
    }
    if key.wire_type != A::WIRE_TYPE {
        return unknown.capture(reader, key);
    }
    values.push(A::decode(reader)?);
    Ok(())
}

/// A later occurrence replaces an earlier one
pub fn merge_message<M: Message>(
    reader: &mut ProtoReader<'_>,
    key: FieldKey,
    slot: &mut Option<Box<M>>,
    unknown: &mut UnknownFields,
) -> DecodeResult<()> {
    if key.wire_type != WireType::LengthDelimited {
        return unknown.capture(reader, key);
    }
    *slot = Some(Box::new(MessageAdapter::<M>::decode(reader)?));
    Ok(())
}

pub fn merge_enum<E: WireEnum>(
    reader: &mut ProtoReader<'_>,
    key: FieldKey,
    slot: &mut Option<E>,
    unknown: &mut UnknownFields,
) -> DecodeResult<()> {
    if key.wire_type != WireType::Varint {
        return unknown.capture(reader, key);
    }
    let mut lookahead = reader.clone();
    match E::from_value(lookahead.read_varint()? as i32) {
        Some(constant) => {
            *reader = lookahead;
            *slot = Some(constant);
            Ok(())
        }
        None => unknown.capture(reader, key),
    }
}

pub fn merge_repeated_enum<E: WireEnum>(
    reader: &mut ProtoReader<'_>,
    key: FieldKey,
    values: &mut Vec<E>,
    unknown: &mut UnknownFields,
) -> DecodeResult<()> {
    match key.wire_type {
        WireType::LengthDelimited => {
            let mut packed = ProtoReader::new(reader.read_length_delimited()?);
            while !packed.is_at_end() {
                let raw = packed.read_varint()?;
                match E::from_value(raw as i32) {
                    Some(constant) => values.push(constant),
                    None => unknown.add_varint(key.tag, raw),
                }
            }
            Ok(())
        }
        WireType::Varint => {
            let mut single: Option<E> = None;
            merge_enum(reader, key, &mut single, unknown)?;
            values.extend(single);
            Ok(())
        }
        _ => unknown.capture(reader, key),
    }
}

pub fn write_single<A: ProtoAdapter>(
    writer: &mut ProtoWriter,
    tag: u32,
    value: Option<&A::Value>,
) {
    if let Some(value) = value {
        A::encode_with_tag(writer, tag, value);
    }
}

/// Packed encoding applies only to packable types and is skipped when empty
pub fn write_repeated<A: ProtoAdapter>(
    writer: &mut ProtoWriter,
    tag: u32,
    values: &[A::Value],
    packed: bool,
) {
    if packed && A::PACKABLE {
        if values.is_empty() {
            return;
        }
        let mut body = ProtoWriter::new();
        for value in values {
            A::encode(&mut body, value);
        }
        writer.write_key(tag, WireType::LengthDelimited);
        writer.write_length_delimited(body.as_bytes());
    } else {
        for value in values {
            A::encode_with_tag(writer, tag, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{Int32, Str};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Color {
        Red,
        Blue,
    }

    impl WireEnum for Color {
        const TYPE_NAME: &'static str = "test.Color";

        fn value(self) -> i32 {
            match self {
                Color::Red => 0,
                Color::Blue => 2,
            }
        }

        fn from_value(value: i32) -> Option<Self> {
            match value {
                0 => Some(Color::Red),
                2 => Some(Color::Blue),
                _ => None,
            }
        }
    }

    fn first_key<'a>(bytes: &'a [u8]) -> (ProtoReader<'a>, FieldKey) {
        let mut reader = ProtoReader::new(bytes);
        let key = reader.read_key().unwrap().unwrap();
        (reader, key)
    }

    #[test]
    fn test_wire_type_mismatch_goes_to_ledger() {
        let mut writer = ProtoWriter::new();
        Int32::encode_with_tag(&mut writer, 1, &5);
        let bytes = writer.into_bytes();

        let (mut reader, key) = first_key(&bytes);
        let mut slot: Option<String> = None;
        let mut unknown = UnknownFields::new();
        merge_single::<Str>(&mut reader, key, &mut slot, &mut unknown).unwrap();

        assert_eq!(slot, None);
        assert_eq!(unknown.get(1), Some(bytes.as_slice()));
    }

    #[test]
    fn test_repeated_accepts_packed_and_unpacked() {
        let mut writer = ProtoWriter::new();
        write_repeated::<Int32>(&mut writer, 4, &[1, 2], true);
        write_repeated::<Int32>(&mut writer, 4, &[3], false);
        let bytes = writer.into_bytes();

        let mut reader = ProtoReader::new(&bytes);
        let mut values = Vec::new();
        let mut unknown = UnknownFields::new();
        while let Some(key) = reader.read_key().unwrap() {
            merge_repeated::<Int32>(&mut reader, key, &mut values, &mut unknown).unwrap();
        }

        assert_eq!(values, [1, 2, 3]);
        assert!(unknown.is_empty());
    }

    #[test]
    fn test_empty_packed_writes_nothing() {
        let mut writer = ProtoWriter::new();
        write_repeated::<Int32>(&mut writer, 4, &[], true);
        assert!(writer.is_empty());
    }

    #[test]
    fn test_unknown_enum_value_is_preserved() {
        let mut writer = ProtoWriter::new();
        Int32::encode_with_tag(&mut writer, 3, &9);
        let bytes = writer.into_bytes();

        let (mut reader, key) = first_key(&bytes);
        let mut slot: Option<Color> = None;
        let mut unknown = UnknownFields::new();
        merge_enum(&mut reader, key, &mut slot, &mut unknown).unwrap();

        assert_eq!(slot, None);
        assert!(reader.is_at_end());
        assert_eq!(unknown.get(3), Some(bytes.as_slice()));
    }

    #[test]
    fn test_packed_enums_split_known_and_unknown() {
        let mut writer = ProtoWriter::new();
        writer.write_key(5, WireType::LengthDelimited);
        writer.write_length_delimited(&[0x02, 0x07, 0x00]);
        let bytes = writer.into_bytes();

        let (mut reader, key) = first_key(&bytes);
        let mut values: Vec<Color> = Vec::new();
        let mut unknown = UnknownFields::new();
        merge_repeated_enum(&mut reader, key, &mut values, &mut unknown).unwrap();

        assert_eq!(values, [Color::Blue, Color::Red]);
        assert_eq!(unknown.get(5), Some([0x28, 0x07].as_slice()));
    }
}

//! Protocol buffer wire format primitives.
//!
//! A field on the wire is a varint key `(tag << 3) | wire_type` followed by
//! a payload whose shape depends on the wire type.

use bytes::BufMut;

use crate::error::{DecodeError, DecodeResult};

/// How a field's payload is framed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    Varint,
    Fixed64,
    LengthDelimited,
    StartGroup,
    EndGroup,
    Fixed32,
}

impl WireType {
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            3 => Some(WireType::StartGroup),
            4 => Some(WireType::EndGroup),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            WireType::Varint => 0,
            WireType::Fixed64 => 1,
            WireType::LengthDelimited => 2,
            WireType::StartGroup => 3,
            WireType::EndGroup => 4,
            WireType::Fixed32 => 5,
        }
    }
}

/// Largest tag a field key can carry
pub const MAX_TAG: u32 = (1 << 29) - 1;

/// Deepest nesting of messages and groups a reader will descend into
pub const RECURSION_LIMIT: u32 = 100;

/// A decoded field key and the offset where it began
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldKey {
    pub tag: u32,
    pub wire_type: WireType,
    /// Offset of the key's first byte, so the raw field can be captured
    pub start: usize,
}

pub fn encode_zigzag32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

pub fn decode_zigzag32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

pub fn encode_zigzag64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

pub fn decode_zigzag64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Appends wire-format fields to a growable buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtoWriter {
    buf: Vec<u8>,
}

impl ProtoWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_varint(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.buf.put_u8((value as u8) | 0x80);
            value >>= 7;
        }
        self.buf.put_u8(value as u8);
    }

    pub fn write_fixed32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    pub fn write_fixed64(&mut self, value: u64) {
        self.buf.put_u64_le(value);
    }

    pub fn write_key(&mut self, tag: u32, wire_type: WireType) {
        self.write_varint(u64::from(tag << 3 | u32::from(wire_type.bits())));
    }

    /// Writes a length prefix followed by `bytes`
    pub fn write_length_delimited(&mut self, bytes: &[u8]) {
        self.write_varint(bytes.len() as u64);
        self.buf.put_slice(bytes);
    }

    /// Writes `bytes` verbatim
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over an encoded message
#[derive(Debug, Clone)]
pub struct ProtoReader<'a> {
    data: &'a [u8],
    pos: usize,
    depth: u32,
}

impl<'a> ProtoReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            depth: 0,
        }
    }

    /// Reader over an embedded message, one level deeper than this one
    pub fn nested(&self, data: &'a [u8]) -> DecodeResult<ProtoReader<'a>> {
        let depth = self.depth + 1;
        if depth > RECURSION_LIMIT {
            return Err(DecodeError::RecursionLimitExceeded {
                limit: RECURSION_LIMIT,
            });
        }
        Ok(ProtoReader {
            data,
            pos: 0,
            depth,
        })
    }

    /// Levels of nesting above this reader
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Bytes consumed since `start`
    pub fn since(&self, start: usize) -> &'a [u8] {
        &self.data[start.min(self.pos)..self.pos]
    }

    fn take(&mut self, len: usize) -> DecodeResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(DecodeError::Truncated { offset: self.pos })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_varint(&mut self) -> DecodeResult<u64> {
        let start = self.pos;
        let mut value = 0u64;
        for shift in (0..70).step_by(7) {
            let Some(&byte) = self.data.get(self.pos) else {
                return Err(DecodeError::Truncated { offset: self.pos });
            };
            self.pos += 1;
            value |= u64::from(byte & 0x7f).checked_shl(shift).unwrap_or(0);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(DecodeError::VarintTooLong { offset: start })
    }

    pub fn read_fixed32(&mut self) -> DecodeResult<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_fixed64(&mut self) -> DecodeResult<u64> {
        let bytes = self.take(8)?;
        let mut array = [0u8; 8];
        array.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(array))
    }

    pub fn read_length_delimited(&mut self) -> DecodeResult<&'a [u8]> {
        let offset = self.pos;
        let len = usize::try_from(self.read_varint()?)
            .map_err(|_| DecodeError::Truncated { offset })?;
        self.take(len)
    }

    /// Reads the next field key, or `None` at the end of input
    pub fn read_key(&mut self) -> DecodeResult<Option<FieldKey>> {
        if self.is_at_end() {
            return Ok(None);
        }
        let start = self.pos;
        let key = self.read_varint()?;
        let tag = u32::try_from(key >> 3)
            .ok()
            .filter(|tag| *tag <= MAX_TAG)
            .ok_or(DecodeError::TagOutOfRange { offset: start })?;
        if tag == 0 {
            return Err(DecodeError::ZeroTag { offset: start });
        }
        let bits = (key & 0x7) as u8;
        let wire_type =
            WireType::from_bits(bits).ok_or(DecodeError::InvalidWireType { tag, bits })?;
        Ok(Some(FieldKey {
            tag,
            wire_type,
            start,
        }))
    }

    /// Skips the payload of a field whose key was just read
    pub fn skip_field(&mut self, tag: u32, wire_type: WireType) -> DecodeResult<()> {
        match wire_type {
            WireType::Varint => {
                self.read_varint()?;
            }
            WireType::Fixed64 => {
                self.take(8)?;
            }
            WireType::LengthDelimited => {
                self.read_length_delimited()?;
            }
            WireType::Fixed32 => {
                self.take(4)?;
            }
            WireType::StartGroup => {
                if self.depth >= RECURSION_LIMIT {
                    return Err(DecodeError::RecursionLimitExceeded {
                        limit: RECURSION_LIMIT,
                    });
                }
                self.depth += 1;
                loop {
                    let Some(key) = self.read_key()? else {
                        return Err(DecodeError::Truncated { offset: self.pos });
                    };
                    if key.wire_type == WireType::EndGroup {
                        if key.tag == tag {
                            break;
                        }
                        return Err(DecodeError::UnexpectedEndGroup { tag: key.tag });
                    }
                    self.skip_field(key.tag, key.wire_type)?;
                }
                self.depth -= 1;
            }
            WireType::EndGroup => return Err(DecodeError::UnexpectedEndGroup { tag }),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_varint_encoding() {
        let mut writer = ProtoWriter::new();
        writer.write_varint(1);
        writer.write_varint(300);
        writer.write_varint(u64::MAX);
        assert_eq!(
            writer.as_bytes(),
            [0x01, 0xac, 0x02, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]
        );

        let mut reader = ProtoReader::new(writer.as_bytes());
        assert_eq!(reader.read_varint(), Ok(1));
        assert_eq!(reader.read_varint(), Ok(300));
        assert_eq!(reader.read_varint(), Ok(u64::MAX));
        assert!(reader.is_at_end());
    }

    #[test]
    fn test_zigzag() {
        assert_eq!(encode_zigzag32(0), 0);
        assert_eq!(encode_zigzag32(-1), 1);
        assert_eq!(encode_zigzag32(1), 2);
        assert_eq!(encode_zigzag32(i32::MIN), u32::MAX);
        assert_eq!(decode_zigzag32(u32::MAX), i32::MIN);
        assert_eq!(encode_zigzag64(-2), 3);
        assert_eq!(decode_zigzag64(3), -2);
    }

    #[test]
    fn test_truncated_and_oversized_input() {
        assert_eq!(
            ProtoReader::new(&[0x80]).read_varint(),
            Err(DecodeError::Truncated { offset: 1 })
        );
        assert_eq!(
            ProtoReader::new(&[0xff; 11]).read_varint(),
            Err(DecodeError::VarintTooLong { offset: 0 })
        );
        assert_eq!(
            ProtoReader::new(&[0x03, b'a']).read_length_delimited(),
            Err(DecodeError::Truncated { offset: 1 })
        );
        assert_eq!(
            ProtoReader::new(&[1, 2, 3]).read_fixed32(),
            Err(DecodeError::Truncated { offset: 0 })
        );
    }

    #[test]
    fn test_keys() {
        let mut writer = ProtoWriter::new();
        writer.write_key(7, WireType::LengthDelimited);
        let mut reader = ProtoReader::new(writer.as_bytes());
        assert_eq!(
            reader.read_key(),
            Ok(Some(FieldKey {
                tag: 7,
                wire_type: WireType::LengthDelimited,
                start: 0
            }))
        );
        assert_eq!(reader.read_key(), Ok(None));

        assert_eq!(
            ProtoReader::new(&[0x00]).read_key(),
            Err(DecodeError::ZeroTag { offset: 0 })
        );
        assert_eq!(
            ProtoReader::new(&[0x0e]).read_key(),
            Err(DecodeError::InvalidWireType { tag: 1, bits: 6 })
        );
    }

    #[test]
    fn test_skip_nested_groups() {
        let mut writer = ProtoWriter::new();
        writer.write_key(1, WireType::StartGroup);
        writer.write_key(2, WireType::Varint);
        writer.write_varint(150);
        writer.write_key(3, WireType::StartGroup);
        writer.write_key(3, WireType::EndGroup);
        writer.write_key(1, WireType::EndGroup);
        writer.write_key(4, WireType::Fixed32);
        writer.write_fixed32(9);

        let mut reader = ProtoReader::new(writer.as_bytes());
        let key = reader.read_key().unwrap().unwrap();
        reader.skip_field(key.tag, key.wire_type).unwrap();
        assert_eq!(reader.since(key.start).len(), 7);

        let key = reader.read_key().unwrap().unwrap();
        assert_eq!(key.tag, 4);
        reader.skip_field(key.tag, key.wire_type).unwrap();
        assert!(reader.is_at_end());
    }

    #[test]
    fn test_nested_reader_depth_is_bounded() {
        let mut reader = ProtoReader::new(&[]);
        for _ in 0..RECURSION_LIMIT {
            reader = reader.nested(&[]).unwrap();
        }
        assert_eq!(reader.depth(), RECURSION_LIMIT);
        assert_eq!(
            reader.nested(&[]).unwrap_err(),
            DecodeError::RecursionLimitExceeded {
                limit: RECURSION_LIMIT
            }
        );
    }

    #[test]
    fn test_deep_groups_are_rejected() {
        let levels = RECURSION_LIMIT as usize + 1;
        let mut writer = ProtoWriter::new();
        for _ in 0..levels {
            writer.write_key(1, WireType::StartGroup);
        }
        for _ in 0..levels {
            writer.write_key(1, WireType::EndGroup);
        }

        let mut reader = ProtoReader::new(writer.as_bytes());
        let key = reader.read_key().unwrap().unwrap();
        assert_eq!(
            reader.skip_field(key.tag, key.wire_type),
            Err(DecodeError::RecursionLimitExceeded {
                limit: RECURSION_LIMIT
            })
        );
    }

    #[test]
    fn test_groups_at_the_limit_are_skipped() {
        let levels = RECURSION_LIMIT as usize;
        let mut writer = ProtoWriter::new();
        for _ in 0..levels {
            writer.write_key(1, WireType::StartGroup);
        }
        for _ in 0..levels {
            writer.write_key(1, WireType::EndGroup);
        }

        let mut reader = ProtoReader::new(writer.as_bytes());
        let key = reader.read_key().unwrap().unwrap();
        reader.skip_field(key.tag, key.wire_type).unwrap();
        assert!(reader.is_at_end());
        assert_eq!(reader.depth(), 0);
    }

    proptest! {
        #[test]
        fn prop_varint_round_trip(value in any::<u64>()) {
            let mut writer = ProtoWriter::new();
            writer.write_varint(value);
            prop_assert!(writer.len() <= 10);

            let mut reader = ProtoReader::new(writer.as_bytes());
            prop_assert_eq!(reader.read_varint(), Ok(value));
            prop_assert!(reader.is_at_end());
        }

        #[test]
        fn prop_zigzag_round_trip(small in any::<i32>(), large in any::<i64>()) {
            prop_assert_eq!(decode_zigzag32(encode_zigzag32(small)), small);
            prop_assert_eq!(decode_zigzag64(encode_zigzag64(large)), large);
            // zigzag32 agrees with zigzag64 over the i32 range
            prop_assert_eq!(encode_zigzag32(small) as u64, encode_zigzag64(i64::from(small)));
        }
    }

    #[test]
    fn test_mismatched_end_group() {
        let mut writer = ProtoWriter::new();
        writer.write_key(1, WireType::StartGroup);
        writer.write_key(2, WireType::EndGroup);

        let mut reader = ProtoReader::new(writer.as_bytes());
        let key = reader.read_key().unwrap().unwrap();
        assert_eq!(
            reader.skip_field(key.tag, key.wire_type),
            Err(DecodeError::UnexpectedEndGroup { tag: 2 })
        );
    }
}

//! Ledger of fields a decoder did not recognise.
//!
//! Each entry keeps the raw wire bytes of one or more occurrences of a tag,
//! keys included, so re-encoding reproduces them exactly. Entries keep the
//! order in which their tags were first seen.
//!
//! Occurrences of one tag are grouped under its entry. Input that
//! interleaves two unknown tags (`9, 7, 9`) is re-encoded grouped
//! (`9, 9, 7`); the bytes of each tag keep their relative order.

use crate::codec::{FieldKey, ProtoReader, ProtoWriter, WireType};
use crate::error::DecodeResult;
use crate::hash::ContractHash;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    tag: u32,
    raw: Vec<u8>,
}

/// Raw bytes of unrecognised fields, keyed by tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownFields {
    entries: Vec<Entry>,
}

impl UnknownFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct tags
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Appends an already-encoded field (key included) under `tag`
    pub fn add(&mut self, tag: u32, raw: &[u8]) {
        match self.entries.iter_mut().find(|entry| entry.tag == tag) {
            Some(entry) => entry.raw.extend_from_slice(raw),
            None => self.entries.push(Entry {
                tag,
                raw: raw.to_vec(),
            }),
        }
    }

    /// Records a varint field, used for enum values outside the enum
    pub fn add_varint(&mut self, tag: u32, value: u64) {
        let mut writer = ProtoWriter::new();
        writer.write_key(tag, WireType::Varint);
        writer.write_varint(value);
        self.add(tag, writer.as_bytes());
    }

    /// Skips the field whose key was just read and records its raw bytes
    pub fn capture(&mut self, reader: &mut ProtoReader<'_>, key: FieldKey) -> DecodeResult<()> {
        reader.skip_field(key.tag, key.wire_type)?;
        self.add(key.tag, reader.since(key.start));
        Ok(())
    }

    pub fn get(&self, tag: u32) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|entry| entry.tag == tag)
            .map(|entry| entry.raw.as_slice())
    }

    pub fn tags(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().map(|entry| entry.tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[u8])> {
        self.entries
            .iter()
            .map(|entry| (entry.tag, entry.raw.as_slice()))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Writes every recorded field verbatim, grouped by tag in first-seen order
    pub fn write_to(&self, writer: &mut ProtoWriter) {
        for entry in &self.entries {
            writer.write_raw(&entry.raw);
        }
    }
}

impl ContractHash for UnknownFields {
    fn contract_hash(&self) -> i32 {
        self.entries.iter().fold(0i32, |h, entry| {
            let h = h.wrapping_mul(31).wrapping_add(entry.tag as i32);
            h.wrapping_mul(31).wrapping_add(entry.raw.contract_hash())
        })
    }
}

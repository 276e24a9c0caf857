//! Deterministic 32-bit hashing for message values.
//!
//! Message hashes must be stable across processes and platforms, so field
//! contributions use fixed integer formulas instead of [`std::hash::Hasher`].
//! Integers hash to themselves (64-bit values fold their halves), booleans
//! to 1231 and 1237, floats to their bit patterns, strings to the polynomial
//! `31 * h + c` over UTF-16 code units, and byte strings and sequences to
//! `31 * h + element` seeded with 1.

use std::fmt;
use std::sync::OnceLock;

/// Stable 32-bit hash of a field value
pub trait ContractHash {
    fn contract_hash(&self) -> i32;
}

impl ContractHash for i32 {
    fn contract_hash(&self) -> i32 {
        *self
    }
}

impl ContractHash for u32 {
    fn contract_hash(&self) -> i32 {
        *self as i32
    }
}

impl ContractHash for i64 {
    fn contract_hash(&self) -> i32 {
        fold64(*self as u64)
    }
}

impl ContractHash for u64 {
    fn contract_hash(&self) -> i32 {
        fold64(*self)
    }
}

impl ContractHash for bool {
    fn contract_hash(&self) -> i32 {
        if *self { 1231 } else { 1237 }
    }
}

impl ContractHash for f32 {
    fn contract_hash(&self) -> i32 {
        let bits = if self.is_nan() { 0x7fc0_0000 } else { self.to_bits() };
        bits as i32
    }
}

impl ContractHash for f64 {
    fn contract_hash(&self) -> i32 {
        let bits = if self.is_nan() {
            0x7ff8_0000_0000_0000
        } else {
            self.to_bits()
        };
        fold64(bits)
    }
}

impl ContractHash for str {
    fn contract_hash(&self) -> i32 {
        self.encode_utf16()
            .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
    }
}

impl ContractHash for String {
    fn contract_hash(&self) -> i32 {
        self.as_str().contract_hash()
    }
}

impl ContractHash for [u8] {
    fn contract_hash(&self) -> i32 {
        self.iter().fold(1i32, |h, byte| {
            h.wrapping_mul(31).wrapping_add(i32::from(*byte as i8))
        })
    }
}

impl ContractHash for Vec<u8> {
    fn contract_hash(&self) -> i32 {
        self.as_slice().contract_hash()
    }
}

impl<T: ContractHash + ?Sized> ContractHash for Box<T> {
    fn contract_hash(&self) -> i32 {
        (**self).contract_hash()
    }
}

fn fold64(value: u64) -> i32 {
    (value ^ (value >> 32)) as u32 as i32
}

/// Hash of an element sequence, 1 when empty
pub fn sequence_hash<T: ContractHash>(elements: &[T]) -> i32 {
    elements.iter().fold(1i32, |h, element| {
        h.wrapping_mul(31).wrapping_add(element.contract_hash())
    })
}

/// One step of the message hash: `acc * 37 + contribution`
pub fn combine(acc: i32, contribution: i32) -> i32 {
    acc.wrapping_mul(37).wrapping_add(contribution)
}

/// Write-once slot for a message's hash
///
/// Cloning keeps the cached value; equal messages have equal hashes.
#[derive(Clone, Default)]
pub struct HashCache(OnceLock<i32>);

impl HashCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<i32> {
        self.0.get().copied()
    }

    pub fn get_or_init(&self, compute: impl FnOnce() -> i32) -> i32 {
        *self.0.get_or_init(compute)
    }
}

impl fmt::Debug for HashCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(hash) => write!(f, "HashCache({hash})"),
            None => f.write_str("HashCache(<unset>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_hashes() {
        assert_eq!(42i32.contract_hash(), 42);
        assert_eq!(u32::MAX.contract_hash(), -1);
        assert_eq!((-1i64).contract_hash(), 0);
        assert_eq!((1i64 << 32).contract_hash(), 1);
        assert_eq!(true.contract_hash(), 1231);
        assert_eq!(false.contract_hash(), 1237);
        assert_eq!(1.0f32.contract_hash(), 0x3f80_0000);
        assert_eq!(f32::NAN.contract_hash(), (-f32::NAN).contract_hash());
        assert_eq!(1.0f64.contract_hash(), 0x3ff0_0000);
    }

    #[test]
    fn test_string_hash_uses_utf16_units() {
        assert_eq!("".contract_hash(), 0);
        assert_eq!("a".contract_hash(), 97);
        assert_eq!("ab".contract_hash(), 97 * 31 + 98);
        // One code point outside the BMP is two UTF-16 units.
        let expected = 0xd83di32.wrapping_mul(31).wrapping_add(0xde00);
        assert_eq!("\u{1f600}".contract_hash(), expected);
    }

    #[test]
    fn test_bytes_hash_uses_signed_bytes() {
        assert_eq!(Vec::<u8>::new().contract_hash(), 1);
        assert_eq!(vec![1u8].contract_hash(), 32);
        assert_eq!(vec![0xffu8].contract_hash(), 30);
    }

    #[test]
    fn test_sequences_and_combine() {
        assert_eq!(sequence_hash::<i32>(&[]), 1);
        assert_eq!(sequence_hash(&[1, 2]), (31 + 1) * 31 + 2);
        assert_eq!(combine(0, 5), 5);
        assert_eq!(combine(1, 0), 37);
    }

    #[test]
    fn test_hash_cache_is_write_once() {
        let cache = HashCache::new();
        assert_eq!(cache.get(), None);
        assert_eq!(cache.get_or_init(|| 7), 7);
        assert_eq!(cache.get_or_init(|| 8), 7);
        assert_eq!(cache.clone().get(), Some(7));
    }
}

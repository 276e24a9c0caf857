use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::hash::{ContractHash, sequence_hash};

/// Immutable sequence held by a repeated message field
///
/// Built from a copy of its input, so later changes to a builder's `Vec`
/// never reach a message built from it. Clones share storage.
pub struct Repeated<T>(Arc<[T]>);

impl<T> Repeated<T> {
    pub fn new() -> Self {
        Self(Arc::from(Vec::new()))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }
}

impl<T> Default for Repeated<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Repeated<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Deref for Repeated<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> AsRef<[T]> for Repeated<T> {
    fn as_ref(&self) -> &[T] {
        &self.0
    }
}

impl<T: PartialEq> PartialEq for Repeated<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0[..] == other.0[..]
    }
}

impl<T: Eq> Eq for Repeated<T> {}

impl<T: fmt::Debug> fmt::Debug for Repeated<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl<T> From<Vec<T>> for Repeated<T> {
    fn from(values: Vec<T>) -> Self {
        Self(Arc::from(values))
    }
}

impl<T: Clone> From<&[T]> for Repeated<T> {
    fn from(values: &[T]) -> Self {
        Self(Arc::from(values))
    }
}

impl<T, const N: usize> From<[T; N]> for Repeated<T> {
    fn from(values: [T; N]) -> Self {
        Self::from(Vec::from(values))
    }
}

impl<T> FromIterator<T> for Repeated<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a, T> IntoIterator for &'a Repeated<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T: ContractHash> ContractHash for Repeated<T> {
    fn contract_hash(&self) -> i32 {
        sequence_hash(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copies_its_input() {
        let mut source = vec![1, 2, 3];
        let repeated = Repeated::from(source.as_slice());
        source.push(4);

        assert_eq!(repeated.len(), 3);
        assert_eq!(&repeated[..], [1, 2, 3]);
    }

    #[test]
    fn test_equality_is_elementwise() {
        let a: Repeated<String> = ["x".to_string(), "y".to_string()].into();
        let b: Repeated<String> = vec!["x".to_string(), "y".to_string()].into();
        let c: Repeated<String> = Repeated::default();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(c.is_empty());
    }

    #[test]
    fn test_empty_hashes_to_one() {
        assert_eq!(Repeated::<i32>::new().contract_hash(), 1);
        assert_eq!(Repeated::from(vec![5]).contract_hash(), 31 + 5);
    }

    #[test]
    fn test_clones_share_storage() {
        let a: Repeated<i32> = (0..4).collect();
        let b = a.clone();
        assert!(std::ptr::eq(a.as_slice(), b.as_slice()));
    }
}

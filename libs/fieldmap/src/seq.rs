//! Sequence helpers.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use rand::Rng;

use crate::error::{Error, Result};

/// `len` elements of `source` starting at `start`.
pub fn sub_sequence<T>(source: &[T], start: usize, len: usize) -> Result<&[T]> {
    let end = start
        .checked_add(len)
        .filter(|end| *end <= source.len())
        .ok_or_else(|| {
            Error::invalid_argument(format!(
                "range {start}..{start}+{len} out of bounds for length {}",
                source.len()
            ))
        })?;
    Ok(&source[start..end])
}

/// Elements of `source` from `start` to the end.
pub fn sub_sequence_from<T>(source: &[T], start: usize) -> Result<&[T]> {
    let len = source.len().checked_sub(start).ok_or_else(|| {
        Error::invalid_argument(format!(
            "start {start} out of bounds for length {}",
            source.len()
        ))
    })?;
    sub_sequence(source, start, len)
}

/// Uniformly chosen element of `source`.
///
/// The caller owns the random source; there is no shared generator.
pub fn random_element<'a, T, R: Rng + ?Sized>(source: &'a [T], rng: &mut R) -> Result<&'a T> {
    if source.is_empty() {
        return Err(Error::invalid_argument("source not valid"));
    }
    Ok(&source[rng.gen_range(0..source.len())])
}

/// Clone of the value for `key`, or `V::default()` when absent.
pub fn get_or_default<K, Q, V>(map: &HashMap<K, V>, key: &Q) -> V
where
    K: Borrow<Q> + Eq + Hash,
    Q: Eq + Hash + ?Sized,
    V: Clone + Default,
{
    map.get(key).cloned().unwrap_or_default()
}

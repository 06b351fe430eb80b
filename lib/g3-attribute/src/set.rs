/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::borrow::Borrow;
use std::fmt::{self, Write};
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::Arc;

use foldhash::fast::FixedState;
use smallvec::SmallVec;

use crate::{Key, KeyValue, Value};

const INLINE_ATTRIBUTES: usize = 8;

// distinct from the seed used by hash maps keyed on the set, so that the
// bits selecting a shard are not the same bits selecting a bucket
const SET_HASH_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// The canonical form of an attribute list, before it is interned.
///
/// Lists that are already strictly sorted by key are borrowed as is.
/// Anything else is sorted and deduplicated on the stack.
pub enum Canonical<'a> {
    Borrowed(&'a [KeyValue]),
    Owned(SmallVec<[KeyValue; INLINE_ATTRIBUTES]>),
}

impl Canonical<'_> {
    #[inline]
    pub fn as_slice(&self) -> &[KeyValue] {
        match self {
            Canonical::Borrowed(s) => s,
            Canonical::Owned(v) => v.as_slice(),
        }
    }

    #[inline]
    pub fn is_borrowed(&self) -> bool {
        matches!(self, Canonical::Borrowed(_))
    }

    /// Intern into an `AttributeSet`, with at most one allocation.
    pub fn to_set(&self) -> AttributeSet {
        AttributeSet::from_canonical_slice(self.as_slice())
    }

    #[inline]
    pub fn hash_value(&self) -> u64 {
        set_hash(self.as_slice())
    }
}

fn is_strictly_sorted(kvs: &[KeyValue]) -> bool {
    kvs.windows(2).all(|w| w[0].key < w[1].key)
}

fn sort_dedup(mut list: SmallVec<[KeyValue; INLINE_ATTRIBUTES]>) -> Canonical<'static> {
    // stable, so for equal keys the input order is kept and the last one wins
    list.sort_by(|a, b| a.key.cmp(&b.key));

    let mut out: SmallVec<[KeyValue; INLINE_ATTRIBUTES]> = SmallVec::with_capacity(list.len());
    for kv in list {
        match out.last_mut() {
            Some(last) if last.key == kv.key => *last = kv,
            _ => out.push(kv),
        }
    }
    Canonical::Owned(out)
}

/// Canonicalize an attribute list: sorted by key, last occurrence wins on
/// duplicate keys.
pub fn canonicalize(kvs: &[KeyValue]) -> Canonical<'_> {
    if is_strictly_sorted(kvs) {
        return Canonical::Borrowed(kvs);
    }
    sort_dedup(kvs.iter().cloned().collect())
}

/// Hash of a canonical attribute list, stable within the process.
pub fn set_hash(kvs: &[KeyValue]) -> u64 {
    FixedState::with_seed(SET_HASH_SEED).hash_one(kvs)
}

/// An immutable, canonical set of attributes.
///
/// Equality and hashing depend only on the canonical content, so sets built
/// from permutations of the same pairs are interchangeable map keys. The
/// empty set holds no allocation.
#[derive(Clone, Default)]
pub struct AttributeSet {
    inner: Option<Arc<[KeyValue]>>,
}

impl AttributeSet {
    pub const EMPTY: AttributeSet = AttributeSet { inner: None };

    pub fn from_kvs(kvs: &[KeyValue]) -> Self {
        canonicalize(kvs).to_set()
    }

    fn from_canonical_slice(kvs: &[KeyValue]) -> Self {
        if kvs.is_empty() {
            AttributeSet::EMPTY
        } else {
            AttributeSet {
                inner: Some(Arc::from(kvs)),
            }
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[KeyValue] {
        match &self.inner {
            Some(s) => s,
            None => &[],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &KeyValue> {
        self.as_slice().iter()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        let kvs = self.as_slice();
        kvs.binary_search_by(|kv| kv.key.as_str().cmp(key))
            .ok()
            .map(|i| &kvs[i].value)
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.get(key.as_str()).is_some()
    }

    pub fn display(&self) -> DisplayAttributeSet<'_> {
        DisplayAttributeSet {
            inner: self,
            assign_delimiter: '=',
            next_delimiter: ',',
        }
    }
}

impl PartialEq for AttributeSet {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for AttributeSet {}

impl Hash for AttributeSet {
    // must match the hash of the borrowed slice form
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state)
    }
}

impl Borrow<[KeyValue]> for AttributeSet {
    fn borrow(&self) -> &[KeyValue] {
        self.as_slice()
    }
}

impl From<&[KeyValue]> for AttributeSet {
    fn from(kvs: &[KeyValue]) -> Self {
        AttributeSet::from_kvs(kvs)
    }
}

impl<const N: usize> From<[KeyValue; N]> for AttributeSet {
    fn from(kvs: [KeyValue; N]) -> Self {
        AttributeSet::from_kvs(&kvs)
    }
}

impl FromIterator<KeyValue> for AttributeSet {
    fn from_iter<T: IntoIterator<Item = KeyValue>>(iter: T) -> Self {
        let list: SmallVec<[KeyValue; INLINE_ATTRIBUTES]> = iter.into_iter().collect();
        if is_strictly_sorted(&list) {
            AttributeSet::from_canonical_slice(&list)
        } else {
            sort_dedup(list).to_set()
        }
    }
}

impl fmt::Debug for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|kv| (kv.key.as_str(), &kv.value)))
            .finish()
    }
}

pub struct DisplayAttributeSet<'a> {
    inner: &'a AttributeSet,
    assign_delimiter: char,
    next_delimiter: char,
}

impl fmt::Display for DisplayAttributeSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.inner.iter();
        let Some(kv) = iter.next() else {
            return Ok(());
        };
        f.write_str(kv.key.as_str())?;
        f.write_char(self.assign_delimiter)?;
        kv.value.fmt(f)?;

        for kv in iter {
            f.write_char(self.next_delimiter)?;
            f.write_str(kv.key.as_str())?;
            f.write_char(self.assign_delimiter)?;
            kv.value.fmt(f)?;
        }
        Ok(())
    }
}

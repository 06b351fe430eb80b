/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use foldhash::fast::FixedState;

use g3_attribute::{AttributeSet, Canonical};

use crate::aggregate::{AggregationKind, AggregationRecord, Snapshot};
use crate::{Number, Temporality};

pub(crate) const MAX_SHARD_COUNT: usize = 256;

type Shard<N> = RwLock<HashMap<AttributeSet, Arc<AggregationRecord<N>>, FixedState>>;

/// Round up to a power of two within `1..=MAX_SHARD_COUNT`.
pub(crate) fn normalize_shard_count(count: usize) -> usize {
    count.clamp(1, MAX_SHARD_COUNT).next_power_of_two()
}

pub(crate) fn default_shard_count() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    normalize_shard_count(cpus.saturating_mul(4))
}

pub(crate) struct SeriesSnapshot {
    pub(crate) points: Vec<(AttributeSet, Snapshot)>,
    pub(crate) incomplete: bool,
}

/// Attribute set to aggregation record map of one instrument for one reader.
///
/// Records are created on first use and live as long as the store under
/// cumulative temporality, so the memory used grows with the number of
/// distinct attribute sets ever recorded. Delta collection drops records
/// that saw no update since the previous collection.
///
/// Recorders take a shard read lock, a new attribute set takes the write
/// lock once. `std::sync::RwLock` may park new readers behind a queued
/// writer, so an insert arriving while a collection holds a shard read lock
/// stalls the recorders of that shard until the lock is released. Collection
/// therefore only copies the record handles under the lock and snapshots
/// them after it is released.
pub(crate) struct SeriesStore<N: Number> {
    kind: AggregationKind,
    shards: Box<[Shard<N>]>,
    mask: u64,
}

impl<N: Number> SeriesStore<N> {
    pub(crate) fn new(kind: AggregationKind, shard_count: usize) -> Self {
        let shard_count = normalize_shard_count(shard_count);
        let shards = (0..shard_count)
            .map(|_| RwLock::new(HashMap::with_hasher(FixedState::with_seed(0))))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        SeriesStore {
            kind,
            shards,
            mask: (shard_count - 1) as u64,
        }
    }

    #[inline]
    fn shard(&self, hash: u64) -> &Shard<N> {
        &self.shards[(hash & self.mask) as usize]
    }

    pub(crate) fn measure(&self, value: N, canonical: &Canonical<'_>) {
        let kvs = canonical.as_slice();
        let shard = self.shard(canonical.hash_value());

        {
            let map = shard.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(record) = map.get(kvs) {
                record.update(value);
                return;
            }
        }

        let mut map = shard.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(record) = map.get(kvs) {
            record.update(value);
        } else {
            let record = AggregationRecord::new(&self.kind);
            record.update(value);
            map.insert(canonical.to_set(), Arc::new(record));
        }
    }

    pub(crate) fn snapshot_all(
        &self,
        temporality: Temporality,
        deadline: Option<Instant>,
    ) -> SeriesSnapshot {
        let mut points = Vec::new();
        let mut incomplete = false;

        for shard in self.shards.iter() {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                incomplete = true;
                break;
            }

            let records = shard
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .map(|(attrs, record)| (attrs.clone(), record.clone()))
                .collect::<Vec<_>>();

            match temporality {
                Temporality::Cumulative => {
                    for (attrs, record) in records {
                        if let Some(s) = record.snapshot(temporality) {
                            points.push((attrs, s));
                        }
                    }
                }
                Temporality::Delta => {
                    let mut stale = Vec::new();
                    for (attrs, record) in records {
                        if !record.begin_delta() {
                            stale.push(attrs);
                            continue;
                        }
                        if let Some(s) = record.snapshot(temporality) {
                            points.push((attrs, s));
                        }
                    }
                    if !stale.is_empty() {
                        let mut map = shard.write().unwrap_or_else(PoisonError::into_inner);
                        for attrs in stale {
                            // updated again after it was checked
                            if map.get(&attrs).is_some_and(|r| !r.is_stale()) {
                                continue;
                            }
                            map.remove(&attrs);
                        }
                    }
                }
            }
        }

        SeriesSnapshot { points, incomplete }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.read().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    #[cfg(test)]
    pub(crate) fn shard_count(&self) -> usize {
        self.shards.len()
    }
}

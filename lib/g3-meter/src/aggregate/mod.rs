/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

use g3_histogram::{BucketBoundaries, BucketCounts};

use crate::{MetricValue, Number, Temporality};

mod sum;
use sum::SumState;

mod last_value;
use last_value::LastValueState;

mod distribution;
use distribution::DistributionState;

/// How measurements of one instrument are folded together.
#[derive(Clone, Debug)]
pub(crate) enum AggregationKind {
    Sum,
    LastValue,
    Distribution(Arc<BucketBoundaries>),
}

pub(crate) enum Snapshot {
    Sum(MetricValue),
    LastValue {
        value: MetricValue,
        time: DateTime<Utc>,
    },
    Distribution(BucketCounts),
}

enum RecordState<N: Number> {
    Sum(SumState<N>),
    LastValue(LastValueState<N>),
    Distribution(DistributionState),
}

/// Mutable state of one series.
///
/// `updates` is bumped after every update is applied, and `collected`
/// holds the value of `updates` seen by the previous delta collection.
pub(crate) struct AggregationRecord<N: Number> {
    state: RecordState<N>,
    updates: AtomicU64,
    collected: AtomicU64,
}

impl<N: Number> AggregationRecord<N> {
    pub(crate) fn new(kind: &AggregationKind) -> Self {
        let state = match kind {
            AggregationKind::Sum => RecordState::Sum(SumState::default()),
            AggregationKind::LastValue => RecordState::LastValue(LastValueState::default()),
            AggregationKind::Distribution(bounds) => {
                RecordState::Distribution(DistributionState::new(bounds.clone()))
            }
        };
        AggregationRecord {
            state,
            updates: AtomicU64::new(0),
            collected: AtomicU64::new(0),
        }
    }

    pub(crate) fn update(&self, v: N) {
        match &self.state {
            RecordState::Sum(s) => s.add(v),
            RecordState::LastValue(s) => s.set(v),
            RecordState::Distribution(s) => s.record(v.as_f64()),
        }
        self.updates.fetch_add(1, Ordering::Release);
    }

    pub(crate) fn snapshot(&self, temporality: Temporality) -> Option<Snapshot> {
        match (&self.state, temporality) {
            (RecordState::Sum(s), Temporality::Cumulative) => Some(Snapshot::Sum(s.load())),
            (RecordState::Sum(s), Temporality::Delta) => Some(Snapshot::Sum(s.take())),
            (RecordState::LastValue(s), _) => s
                .get()
                .map(|(value, time)| Snapshot::LastValue { value, time }),
            (RecordState::Distribution(s), Temporality::Cumulative) => {
                Some(Snapshot::Distribution(s.load()))
            }
            (RecordState::Distribution(s), Temporality::Delta) => {
                Some(Snapshot::Distribution(s.take()))
            }
        }
    }

    /// Mark the start of a delta collection for this record, returning
    /// whether there were updates since the previous one.
    pub(crate) fn begin_delta(&self) -> bool {
        let updates = self.updates.load(Ordering::Acquire);
        self.collected.swap(updates, Ordering::Relaxed) != updates
    }

    /// No update since the previous delta collection.
    ///
    /// Only meaningful while no writer can reach the record.
    pub(crate) fn is_stale(&self) -> bool {
        self.updates.load(Ordering::Acquire) == self.collected.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_of(s: Option<Snapshot>) -> MetricValue {
        match s {
            Some(Snapshot::Sum(v)) => v,
            _ => panic!("not a sum snapshot"),
        }
    }

    #[test]
    fn sum_cumulative() {
        let r = AggregationRecord::<i64>::new(&AggregationKind::Sum);
        r.update(1);
        r.update(2);
        assert_eq!(sum_of(r.snapshot(Temporality::Cumulative)), MetricValue::Signed(3));
        r.update(3);
        assert_eq!(sum_of(r.snapshot(Temporality::Cumulative)), MetricValue::Signed(6));
    }

    #[test]
    fn sum_delta() {
        let r = AggregationRecord::<f64>::new(&AggregationKind::Sum);
        r.update(1.5);
        assert!(r.begin_delta());
        assert_eq!(sum_of(r.snapshot(Temporality::Delta)), MetricValue::Double(1.5));
        assert!(r.is_stale());
        assert!(!r.begin_delta());
        assert_eq!(sum_of(r.snapshot(Temporality::Delta)), MetricValue::Double(0.0));

        r.update(2.0);
        assert!(!r.is_stale());
        assert!(r.begin_delta());
        assert_eq!(sum_of(r.snapshot(Temporality::Delta)), MetricValue::Double(2.0));
    }

    #[test]
    fn last_value() {
        let r = AggregationRecord::<i64>::new(&AggregationKind::LastValue);
        assert!(r.snapshot(Temporality::Cumulative).is_none());
        r.update(7);
        r.update(-3);
        for t in [Temporality::Cumulative, Temporality::Delta] {
            match r.snapshot(t) {
                Some(Snapshot::LastValue { value, .. }) => {
                    assert_eq!(value, MetricValue::Signed(-3))
                }
                _ => panic!("not a last value snapshot"),
            }
        }
    }

    #[test]
    fn distribution() {
        let bounds = Arc::new(BucketBoundaries::new(vec![1.0, 5.0]).unwrap());
        let r = AggregationRecord::<i64>::new(&AggregationKind::Distribution(bounds));
        r.update(0);
        r.update(3);
        r.update(9);
        r.update(4);

        let Some(Snapshot::Distribution(c)) = r.snapshot(Temporality::Cumulative) else {
            panic!("not a distribution snapshot");
        };
        assert_eq!(c.counts(), &[1, 2, 1]);
        assert_eq!(c.sum(), 16.0);

        let Some(Snapshot::Distribution(c)) = r.snapshot(Temporality::Delta) else {
            panic!("not a distribution snapshot");
        };
        assert_eq!(c.count(), 4);
        let Some(Snapshot::Distribution(c)) = r.snapshot(Temporality::Delta) else {
            panic!("not a distribution snapshot");
        };
        assert!(c.is_empty());
        assert_eq!(c.counts(), &[0, 0, 0]);
    }
}

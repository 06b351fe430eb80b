/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use g3_attribute::KeyValue;
use g3_histogram::BucketBoundaries;

use crate::aggregate::Snapshot;
use crate::data::{DataPoint, GaugePoint, HistogramPoint, MetricData};
use crate::diagnostic::Diagnostics;
use crate::pipeline::{Collectable, Collected};
use crate::store::SeriesStore;
use crate::{InstrumentId, InstrumentKind, MetricsError, Number, Temporality};

/// Recording side of a synchronous instrument.
///
/// There is one series store per reader, an instrument without any store
/// drops every measurement.
pub(crate) struct SyncInstrument<N: Number> {
    id: Arc<InstrumentId>,
    stores: Vec<Arc<SeriesStore<N>>>,
    diagnostics: Diagnostics,
}

impl<N: Number> SyncInstrument<N> {
    pub(crate) fn new(
        id: Arc<InstrumentId>,
        stores: Vec<Arc<SeriesStore<N>>>,
        diagnostics: Diagnostics,
    ) -> Self {
        SyncInstrument {
            id,
            stores,
            diagnostics,
        }
    }

    pub(crate) fn noop(id: Arc<InstrumentId>) -> Self {
        SyncInstrument::new(id, Vec::new(), Diagnostics::default())
    }

    #[inline]
    pub(crate) fn id(&self) -> &Arc<InstrumentId> {
        &self.id
    }

    fn measure(&self, value: N, attributes: &[KeyValue]) {
        if self.stores.is_empty() {
            return;
        }
        if !value.is_finite() {
            self.report_invalid("value is not finite");
            return;
        }
        if value.is_negative() && !self.id.kind().allow_negative() {
            self.report_invalid("value should not be negative");
            return;
        }

        let canonical = g3_attribute::canonicalize(attributes);
        for store in &self.stores {
            store.measure(value, &canonical);
        }
    }

    #[cold]
    fn report_invalid(&self, reason: &'static str) {
        self.diagnostics.report(MetricsError::InvalidMeasurement {
            instrument: self.id.name().to_string(),
            reason,
        });
    }
}

macro_rules! impl_sync_handle {
    ($name:ident) => {
        impl<N: Number> $name<N> {
            pub(crate) fn from_inner(inner: Arc<SyncInstrument<N>>) -> Self {
                $name { inner }
            }

            pub fn id(&self) -> &InstrumentId {
                self.inner.id()
            }

            /// Whether the two handles record into the same instrument.
            pub fn ptr_eq(a: &Self, b: &Self) -> bool {
                Arc::ptr_eq(&a.inner, &b.inner)
            }

            /// Instruments from a shut down or no-op provider record nothing.
            pub fn is_noop(&self) -> bool {
                self.inner.stores.is_empty()
            }
        }

        impl<N: Number> Clone for $name<N> {
            fn clone(&self) -> Self {
                $name {
                    inner: self.inner.clone(),
                }
            }
        }

        impl<N: Number> fmt::Debug for $name<N> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name))
                    .field(self.inner.id())
                    .finish()
            }
        }
    };
}

/// Monotonic sum, negative values are rejected.
pub struct Counter<N: Number> {
    inner: Arc<SyncInstrument<N>>,
}

impl<N: Number> Counter<N> {
    #[inline]
    pub fn add(&self, value: N, attributes: &[KeyValue]) {
        self.inner.measure(value, attributes);
    }
}

impl_sync_handle!(Counter);

pub struct UpDownCounter<N: Number> {
    inner: Arc<SyncInstrument<N>>,
}

impl<N: Number> UpDownCounter<N> {
    #[inline]
    pub fn add(&self, value: N, attributes: &[KeyValue]) {
        self.inner.measure(value, attributes);
    }
}

impl_sync_handle!(UpDownCounter);

/// Distribution of non negative values over explicit buckets.
pub struct Histogram<N: Number> {
    inner: Arc<SyncInstrument<N>>,
}

impl<N: Number> Histogram<N> {
    #[inline]
    pub fn record(&self, value: N, attributes: &[KeyValue]) {
        self.inner.measure(value, attributes);
    }
}

impl_sync_handle!(Histogram);

pub struct Gauge<N: Number> {
    inner: Arc<SyncInstrument<N>>,
}

impl<N: Number> Gauge<N> {
    #[inline]
    pub fn record(&self, value: N, attributes: &[KeyValue]) {
        self.inner.measure(value, attributes);
    }
}

impl_sync_handle!(Gauge);

/// Collection side of a synchronous instrument, for one reader.
pub(crate) struct SyncCollector<N: Number> {
    id: Arc<InstrumentId>,
    store: Arc<SeriesStore<N>>,
    boundaries: Arc<BucketBoundaries>,
}

impl<N: Number> SyncCollector<N> {
    pub(crate) fn new(
        id: Arc<InstrumentId>,
        store: Arc<SeriesStore<N>>,
        boundaries: Arc<BucketBoundaries>,
    ) -> Self {
        SyncCollector {
            id,
            store,
            boundaries,
        }
    }
}

impl<N: Number> Collectable for SyncCollector<N> {
    fn id(&self) -> &Arc<InstrumentId> {
        &self.id
    }

    fn collect(&self, temporality: Temporality, deadline: Option<Instant>) -> Collected {
        let snapshot = self.store.snapshot_all(temporality, deadline);
        let incomplete = snapshot.incomplete;
        if snapshot.points.is_empty() {
            return Collected {
                data: None,
                incomplete,
                error: None,
            };
        }

        let kind = self.id.kind();
        let data = match kind {
            InstrumentKind::Gauge => {
                let points = snapshot
                    .points
                    .into_iter()
                    .filter_map(|(attributes, s)| match s {
                        Snapshot::LastValue { value, time } => Some(GaugePoint {
                            attributes,
                            value,
                            time,
                        }),
                        _ => None,
                    })
                    .collect();
                MetricData::Gauge { points }
            }
            InstrumentKind::Histogram => {
                let points = snapshot
                    .points
                    .into_iter()
                    .filter_map(|(attributes, s)| match s {
                        Snapshot::Distribution(counts) => {
                            Some(HistogramPoint { attributes, counts })
                        }
                        _ => None,
                    })
                    .collect();
                MetricData::Histogram {
                    temporality,
                    boundaries: self.boundaries.clone(),
                    points,
                }
            }
            _ => {
                let points = snapshot
                    .points
                    .into_iter()
                    .filter_map(|(attributes, s)| match s {
                        Snapshot::Sum(value) => Some(DataPoint { attributes, value }),
                        _ => None,
                    })
                    .collect();
                MetricData::Sum {
                    temporality,
                    monotonic: kind.is_monotonic(),
                    points,
                }
            }
        };

        Collected {
            data: Some(data),
            incomplete,
            error: None,
        }
    }
}

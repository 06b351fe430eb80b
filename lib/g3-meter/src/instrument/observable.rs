/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use chrono::Utc;
use foldhash::fast::FixedState;

use g3_attribute::{AttributeSet, KeyValue};

use crate::data::{DataPoint, GaugePoint, MetricData};
use crate::diagnostic::Diagnostics;
use crate::pipeline::{Collectable, Collected};
use crate::{InstrumentId, InstrumentKind, MetricsError, Number, Temporality};

/// Receives the values reported by an observable instrument callback.
pub trait Observer<N> {
    fn observe(&self, value: N, attributes: &[KeyValue]);
}

pub type Callback<N> = Arc<dyn Fn(&dyn Observer<N>) + Send + Sync>;

type ObservationMap<N> = HashMap<AttributeSet, N, FixedState>;

/// Callbacks of an observable instrument, shared by all readers.
pub(crate) struct ObservableInstrument<N: Number> {
    id: Arc<InstrumentId>,
    callbacks: Mutex<Vec<Callback<N>>>,
    diagnostics: Diagnostics,
}

impl<N: Number> ObservableInstrument<N> {
    pub(crate) fn new(
        id: Arc<InstrumentId>,
        callbacks: Vec<Callback<N>>,
        diagnostics: Diagnostics,
    ) -> Self {
        ObservableInstrument {
            id,
            callbacks: Mutex::new(callbacks),
            diagnostics,
        }
    }

    #[inline]
    pub(crate) fn id(&self) -> &Arc<InstrumentId> {
        &self.id
    }

    pub(crate) fn add_callbacks(&self, callbacks: Vec<Callback<N>>) {
        let mut list = self
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        list.extend(callbacks);
    }

    fn callback_count(&self) -> usize {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Run all callbacks, the last value observed for an attribute set wins.
    ///
    /// Values observed by callbacks that completed are kept when another
    /// callback panics, the panic is returned as the error.
    fn observe_all(&self) -> (ObservationMap<N>, Option<MetricsError>) {
        // not holding the lock while running user code
        let callbacks = self
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let observations = Observations {
            id: &self.id,
            diagnostics: &self.diagnostics,
            values: RefCell::new(HashMap::with_hasher(FixedState::with_seed(0))),
        };
        let observer: &dyn Observer<N> = &observations;
        let mut panicked = false;
        for cb in callbacks {
            if panic::catch_unwind(AssertUnwindSafe(|| cb(observer))).is_err() {
                panicked = true;
            }
        }

        let error = if panicked {
            let e = MetricsError::CallbackPanicked(self.id.name().to_string());
            self.diagnostics.report(e.clone());
            Some(e)
        } else {
            None
        };
        (observations.values.into_inner(), error)
    }
}

struct Observations<'a, N: Number> {
    id: &'a InstrumentId,
    diagnostics: &'a Diagnostics,
    values: RefCell<ObservationMap<N>>,
}

impl<N: Number> Observer<N> for Observations<'_, N> {
    fn observe(&self, value: N, attributes: &[KeyValue]) {
        let reason = if !value.is_finite() {
            "value is not finite"
        } else if value.is_negative() && !self.id.kind().allow_negative() {
            "value should not be negative"
        } else {
            let set = g3_attribute::canonicalize(attributes).to_set();
            self.values.borrow_mut().insert(set, value);
            return;
        };
        self.diagnostics.report(MetricsError::InvalidMeasurement {
            instrument: self.id.name().to_string(),
            reason,
        });
    }
}

macro_rules! impl_observable_handle {
    ($name:ident) => {
        pub struct $name<N: Number> {
            inner: Arc<ObservableInstrument<N>>,
        }

        impl<N: Number> $name<N> {
            pub(crate) fn from_inner(inner: Arc<ObservableInstrument<N>>) -> Self {
                $name { inner }
            }

            pub fn id(&self) -> &InstrumentId {
                self.inner.id()
            }

            pub fn ptr_eq(a: &Self, b: &Self) -> bool {
                Arc::ptr_eq(&a.inner, &b.inner)
            }

            pub fn callback_count(&self) -> usize {
                self.inner.callback_count()
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

impl_observable_handle!(ObservableCounter);
impl_observable_handle!(ObservableUpDownCounter);
impl_observable_handle!(ObservableGauge);

/// Collection side of an observable instrument, for one reader.
///
/// Sums are observed as totals, the previous totals are kept to compute
/// deltas.
pub(crate) struct ObservableCollector<N: Number> {
    inner: Arc<ObservableInstrument<N>>,
    previous: Mutex<ObservationMap<N>>,
}

impl<N: Number> ObservableCollector<N> {
    pub(crate) fn new(inner: Arc<ObservableInstrument<N>>) -> Self {
        ObservableCollector {
            inner,
            previous: Mutex::new(HashMap::with_hasher(FixedState::with_seed(0))),
        }
    }

    fn sum_points(
        &self,
        temporality: Temporality,
        values: ObservationMap<N>,
        partial: bool,
    ) -> Vec<DataPoint> {
        match temporality {
            Temporality::Cumulative => values
                .into_iter()
                .map(|(attributes, v)| DataPoint {
                    attributes,
                    value: v.into_metric_value(),
                })
                .collect(),
            Temporality::Delta => {
                let mut previous = self
                    .previous
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                let points = values
                    .iter()
                    .map(|(attributes, v)| {
                        let delta = match previous.get(attributes) {
                            Some(p) => v.sub(*p),
                            None => *v,
                        };
                        DataPoint {
                            attributes: attributes.clone(),
                            value: delta.into_metric_value(),
                        }
                    })
                    .collect();
                if partial {
                    // a failed callback may own the missing series
                    previous.extend(values);
                } else {
                    // series not observed this time are forgotten
                    *previous = values;
                }
                points
            }
        }
    }
}

impl<N: Number> Collectable for ObservableCollector<N> {
    fn id(&self) -> &Arc<InstrumentId> {
        self.inner.id()
    }

    fn collect(&self, temporality: Temporality, _deadline: Option<Instant>) -> Collected {
        let (values, error) = self.inner.observe_all();
        if values.is_empty() {
            if temporality == Temporality::Delta && error.is_none() {
                self.previous
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clear();
            }
            return Collected {
                data: None,
                incomplete: false,
                error,
            };
        }

        let kind = self.inner.id().kind();
        let data = match kind {
            InstrumentKind::ObservableGauge => {
                let time = Utc::now();
                let points = values
                    .into_iter()
                    .map(|(attributes, v)| GaugePoint {
                        attributes,
                        value: v.into_metric_value(),
                        time,
                    })
                    .collect();
                MetricData::Gauge { points }
            }
            _ => MetricData::Sum {
                temporality,
                monotonic: kind.is_monotonic(),
                points: self.sum_points(temporality, values, error.is_some()),
            },
        };
        Collected {
            data: Some(data),
            incomplete: false,
            error,
        }
    }
}

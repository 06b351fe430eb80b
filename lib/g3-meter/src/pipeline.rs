/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::debug;

use crate::data::{Metric, MetricData, MetricPayload, ScopeMetrics};
use crate::reader::Producer;
use crate::{InstrumentId, MetricsError, Scope, Temporality};

#[derive(Default)]
pub(crate) struct Collected {
    pub(crate) data: Option<MetricData>,
    pub(crate) incomplete: bool,
    pub(crate) error: Option<MetricsError>,
}

/// The per reader collection side of an instrument.
pub(crate) trait Collectable: Send + Sync {
    fn id(&self) -> &Arc<InstrumentId>;
    fn collect(&self, temporality: Temporality, deadline: Option<Instant>) -> Collected;
}

pub(crate) type ArcCollectable = Arc<dyn Collectable>;

struct ScopeEntry {
    scope: Arc<Scope>,
    instruments: Vec<ArcCollectable>,
}

/// Everything a reader collects, in registration order.
pub(crate) struct Pipeline {
    temporality: Temporality,
    collect_timeout: Option<Duration>,
    start_time: DateTime<Utc>,
    last_collect: Mutex<DateTime<Utc>>,
    scopes: Mutex<Vec<ScopeEntry>>,
    shutdown: AtomicBool,
}

impl Pipeline {
    pub(crate) fn new(
        temporality: Temporality,
        collect_timeout: Option<Duration>,
        start_time: DateTime<Utc>,
    ) -> Self {
        Pipeline {
            temporality,
            collect_timeout,
            start_time,
            last_collect: Mutex::new(start_time),
            scopes: Mutex::new(Vec::new()),
            shutdown: AtomicBool::new(false),
        }
    }

    #[inline]
    pub(crate) fn temporality(&self) -> Temporality {
        self.temporality
    }

    pub(crate) fn register(&self, scope: &Arc<Scope>, instrument: ArcCollectable) {
        debug!(
            "{} reader: registered instrument {}",
            self.temporality,
            instrument.id()
        );
        let mut scopes = self.scopes.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = scopes.iter_mut().find(|e| &e.scope == scope) {
            entry.instruments.push(instrument);
        } else {
            scopes.push(ScopeEntry {
                scope: scope.clone(),
                instruments: vec![instrument],
            });
        }
    }

    /// Returns true if it was not shut down before.
    pub(crate) fn shutdown(&self) -> bool {
        !self.shutdown.swap(true, Ordering::AcqRel)
    }

    #[inline]
    pub(crate) fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    pub(crate) fn produce(&self, deadline: Option<Instant>) -> Result<MetricPayload, MetricsError> {
        if self.is_shutdown() {
            return Err(MetricsError::ReaderShutdown);
        }
        let deadline = match (deadline, self.collect_timeout) {
            (Some(d), _) => Some(d),
            (None, Some(timeout)) => Some(Instant::now() + timeout),
            (None, None) => None,
        };

        // instruments registered after this point are left to the next cycle
        let scopes = self
            .scopes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|e| (e.scope.clone(), e.instruments.clone()))
            .collect::<Vec<_>>();

        let mut payload_scopes = Vec::with_capacity(scopes.len());
        let mut incomplete = false;
        let mut errors = Vec::new();
        'scopes: for (scope, instruments) in scopes {
            let mut metrics = Vec::new();
            for instrument in instruments {
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    incomplete = true;
                    if !metrics.is_empty() {
                        payload_scopes.push(ScopeMetrics {
                            scope: scope.clone(),
                            metrics,
                        });
                    }
                    break 'scopes;
                }

                let collected = instrument.collect(self.temporality, deadline);
                incomplete |= collected.incomplete;
                if let Some(e) = collected.error {
                    errors.push(e);
                }
                if let Some(data) = collected.data {
                    metrics.push(Metric {
                        id: instrument.id().clone(),
                        data,
                    });
                }
            }
            if !metrics.is_empty() {
                payload_scopes.push(ScopeMetrics { scope, metrics });
            }
        }
        if incomplete {
            errors.push(MetricsError::DeadlineExpired);
        }

        let time = Utc::now();
        let start_time = match self.temporality {
            Temporality::Cumulative => self.start_time,
            Temporality::Delta => {
                let mut last = self
                    .last_collect
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                if incomplete {
                    // unvisited records still hold data from this window
                    *last
                } else {
                    std::mem::replace(&mut *last, time)
                }
            }
        };

        Ok(MetricPayload {
            time,
            start_time,
            scopes: payload_scopes,
            incomplete,
            errors,
        })
    }
}

/// The producer handed to an exporter.
///
/// Holds a weak reference, the exporter is owned by the provider which also
/// owns the pipeline.
pub(crate) struct ReaderProducer {
    pipeline: Weak<Pipeline>,
}

impl ReaderProducer {
    pub(crate) fn new(pipeline: &Arc<Pipeline>) -> Self {
        ReaderProducer {
            pipeline: Arc::downgrade(pipeline),
        }
    }

    fn produce_with(&self, deadline: Option<Instant>) -> Result<MetricPayload, MetricsError> {
        let Some(pipeline) = self.pipeline.upgrade() else {
            return Err(MetricsError::ReaderShutdown);
        };
        pipeline.produce(deadline)
    }
}

impl Producer for ReaderProducer {
    fn produce(&self) -> Result<MetricPayload, MetricsError> {
        self.produce_with(None)
    }

    fn produce_until(&self, deadline: Instant) -> Result<MetricPayload, MetricsError> {
        self.produce_with(Some(deadline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InstrumentKind, NumberKind};

    struct Fixed {
        id: Arc<InstrumentId>,
        value: i64,
    }

    impl Collectable for Fixed {
        fn id(&self) -> &Arc<InstrumentId> {
            &self.id
        }

        fn collect(&self, temporality: Temporality, _deadline: Option<Instant>) -> Collected {
            Collected {
                data: Some(MetricData::Sum {
                    temporality,
                    monotonic: true,
                    points: vec![crate::data::DataPoint {
                        attributes: Default::default(),
                        value: crate::MetricValue::Signed(self.value),
                    }],
                }),
                incomplete: false,
                error: None,
            }
        }
    }

    fn fixed(scope: &Arc<Scope>, name: &str, value: i64) -> ArcCollectable {
        let id = InstrumentId::new(
            scope.clone(),
            name.to_string(),
            InstrumentKind::Counter,
            NumberKind::I64,
            String::new(),
            String::new(),
        );
        Arc::new(Fixed {
            id: Arc::new(id),
            value,
        })
    }

    #[test]
    fn empty() {
        let pipeline = Pipeline::new(Temporality::Cumulative, None, Utc::now());
        let payload = pipeline.produce(None).unwrap();
        assert!(payload.is_empty());
        assert!(!payload.is_partial());
    }

    #[test]
    fn group_by_scope() {
        let pipeline = Pipeline::new(Temporality::Cumulative, None, Utc::now());
        let a = Arc::new(Scope::new("a"));
        let b = Arc::new(Scope::new("b"));
        pipeline.register(&a, fixed(&a, "x", 1));
        pipeline.register(&b, fixed(&b, "y", 2));
        pipeline.register(&a, fixed(&a, "z", 3));

        let payload = pipeline.produce(None).unwrap();
        assert_eq!(payload.scopes.len(), 2);
        assert_eq!(payload.scopes[0].scope.name(), "a");
        assert_eq!(payload.scopes[0].metrics.len(), 2);
        assert_eq!(payload.metric_count(), 3);
        assert!(payload.metric("y").is_some());
    }

    #[test]
    fn expired_deadline() {
        let pipeline = Pipeline::new(Temporality::Cumulative, None, Utc::now());
        let a = Arc::new(Scope::new("a"));
        pipeline.register(&a, fixed(&a, "x", 1));
        let payload = pipeline.produce(Some(Instant::now())).unwrap();
        assert!(payload.incomplete);
        assert!(payload.is_empty());
        assert_eq!(payload.errors, vec![MetricsError::DeadlineExpired]);
    }

    #[test]
    fn delta_start_time() {
        let start = Utc::now();
        let pipeline = Pipeline::new(Temporality::Delta, None, start);
        let p1 = pipeline.produce(None).unwrap();
        assert_eq!(p1.start_time, start);
        let p2 = pipeline.produce(None).unwrap();
        assert_eq!(p2.start_time, p1.time);
    }

    #[test]
    fn delta_start_time_after_incomplete() {
        let start = Utc::now();
        let pipeline = Pipeline::new(Temporality::Delta, None, start);
        let a = Arc::new(Scope::new("a"));
        pipeline.register(&a, fixed(&a, "x", 1));

        let p1 = pipeline.produce(Some(Instant::now())).unwrap();
        assert!(p1.incomplete);
        assert_eq!(p1.start_time, start);
        let p2 = pipeline.produce(None).unwrap();
        assert!(!p2.incomplete);
        assert_eq!(p2.start_time, start);
        let p3 = pipeline.produce(None).unwrap();
        assert_eq!(p3.start_time, p2.time);
    }

    #[test]
    fn shutdown() {
        let pipeline = Arc::new(Pipeline::new(Temporality::Cumulative, None, Utc::now()));
        let producer = ReaderProducer::new(&pipeline);
        assert!(producer.produce().is_ok());
        assert!(pipeline.shutdown());
        assert!(!pipeline.shutdown());
        assert_eq!(producer.produce().unwrap_err(), MetricsError::ReaderShutdown);

        drop(pipeline);
        assert_eq!(producer.produce().unwrap_err(), MetricsError::ReaderShutdown);
    }
}

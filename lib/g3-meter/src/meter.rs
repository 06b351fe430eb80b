/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use foldhash::fast::FixedState;
use log::debug;

use g3_histogram::BucketBoundaries;

use crate::config::ProviderConfig;
use crate::diagnostic::Diagnostics;
use crate::instrument::{
    Callback, Counter, Gauge, Histogram, InstrumentBuilder, InstrumentKind, ObservableBuilder,
    ObservableCollector, ObservableCounter, ObservableGauge, ObservableHandle,
    ObservableInstrument, ObservableUpDownCounter, SyncCollector, SyncHandle, SyncInstrument,
    UpDownCounter,
};
use crate::pipeline::Pipeline;
use crate::store::SeriesStore;
use crate::{InstrumentId, MetricsError, Number, Scope};

struct Registered {
    id: Arc<InstrumentId>,
    instrument: Arc<dyn Any + Send + Sync>,
}

struct MeterInner {
    scope: Arc<Scope>,
    pipelines: Arc<[Arc<Pipeline>]>,
    config: Arc<ProviderConfig>,
    diagnostics: Diagnostics,
    instruments: Mutex<HashMap<String, Vec<Registered>, FixedState>>,
}

/// Creates instruments for one instrumentation scope.
///
/// Requesting an instrument with the same identity again returns the
/// existing one.
#[derive(Clone)]
pub struct Meter {
    inner: Arc<MeterInner>,
}

macro_rules! sync_builder {
    ($i64_name:ident, $f64_name:ident, $handle:ident) => {
        pub fn $i64_name<S: Into<String>>(&self, name: S) -> InstrumentBuilder<'_, $handle<i64>> {
            InstrumentBuilder::new(self, name.into())
        }

        pub fn $f64_name<S: Into<String>>(&self, name: S) -> InstrumentBuilder<'_, $handle<f64>> {
            InstrumentBuilder::new(self, name.into())
        }
    };
}

macro_rules! observable_builder {
    ($i64_name:ident, $f64_name:ident, $handle:ident) => {
        pub fn $i64_name<S: Into<String>>(
            &self,
            name: S,
        ) -> ObservableBuilder<'_, $handle<i64>> {
            ObservableBuilder::new(self, name.into())
        }

        pub fn $f64_name<S: Into<String>>(
            &self,
            name: S,
        ) -> ObservableBuilder<'_, $handle<f64>> {
            ObservableBuilder::new(self, name.into())
        }
    };
}

impl Meter {
    pub(crate) fn new(
        scope: Arc<Scope>,
        pipelines: Arc<[Arc<Pipeline>]>,
        config: Arc<ProviderConfig>,
        diagnostics: Diagnostics,
    ) -> Self {
        Meter {
            inner: Arc::new(MeterInner {
                scope,
                pipelines,
                config,
                diagnostics,
                instruments: Mutex::new(HashMap::with_hasher(FixedState::with_seed(0))),
            }),
        }
    }

    /// A meter whose instruments record nothing.
    pub fn noop() -> Self {
        Meter::new(
            Arc::new(Scope::default()),
            Arc::new([]),
            Arc::new(ProviderConfig::default()),
            Diagnostics::default(),
        )
    }

    #[inline]
    pub fn scope(&self) -> &Scope {
        &self.inner.scope
    }

    fn is_noop(&self) -> bool {
        self.inner.pipelines.iter().all(|p| p.is_shutdown())
    }

    sync_builder!(i64_counter, f64_counter, Counter);
    sync_builder!(i64_up_down_counter, f64_up_down_counter, UpDownCounter);
    sync_builder!(i64_histogram, f64_histogram, Histogram);
    sync_builder!(i64_gauge, f64_gauge, Gauge);

    observable_builder!(i64_observable_counter, f64_observable_counter, ObservableCounter);
    observable_builder!(
        i64_observable_up_down_counter,
        f64_observable_up_down_counter,
        ObservableUpDownCounter
    );
    observable_builder!(i64_observable_gauge, f64_observable_gauge, ObservableGauge);

    fn new_id<N: Number>(
        &self,
        name: String,
        kind: InstrumentKind,
        unit: String,
        description: String,
    ) -> Arc<InstrumentId> {
        Arc::new(InstrumentId::new(
            self.inner.scope.clone(),
            name,
            kind,
            N::KIND,
            unit,
            description,
        ))
    }

    /// Check the name, returns false if a no-op instrument should be used.
    fn check_name(&self, id: &InstrumentId) -> bool {
        if let Err(e) = crate::validate_instrument_name(id.name()) {
            self.inner
                .diagnostics
                .report(MetricsError::InvalidInstrumentName {
                    name: id.name().to_string(),
                    reason: e.to_string(),
                });
            return false;
        }
        !self.is_noop()
    }

    /// Find an instrument with the same identity, report a conflict if only
    /// the name matches.
    fn lookup<T: Any + Send + Sync>(
        &self,
        map: &HashMap<String, Vec<Registered>, FixedState>,
        id: &InstrumentId,
    ) -> Option<Arc<T>> {
        let list = map.get(id.name())?;
        if let Some(r) = list.iter().find(|r| r.id.as_ref() == id) {
            return r.instrument.clone().downcast::<T>().ok();
        }
        if let Some(r) = list.first() {
            self.inner
                .diagnostics
                .report(MetricsError::DuplicateInstrument {
                    scope: self.inner.scope.to_string(),
                    name: id.name().to_string(),
                    existing: r.id.to_string(),
                    requested: id.to_string(),
                });
        }
        None
    }

    fn histogram_boundaries(
        &self,
        id: &InstrumentId,
        boundaries: Option<Vec<f64>>,
    ) -> Arc<BucketBoundaries> {
        let Some(bounds) = boundaries else {
            return self.inner.config.histogram_boundaries().clone();
        };
        if id.kind() != InstrumentKind::Histogram {
            return self.inner.config.histogram_boundaries().clone();
        }
        match BucketBoundaries::new(bounds) {
            Ok(b) => Arc::new(b),
            Err(e) => {
                self.inner
                    .diagnostics
                    .report(MetricsError::InvalidBoundaries {
                        instrument: id.name().to_string(),
                        reason: e.to_string(),
                    });
                self.inner.config.histogram_boundaries().clone()
            }
        }
    }

    pub(crate) fn create_sync<T: SyncHandle>(
        &self,
        name: String,
        unit: String,
        description: String,
        boundaries: Option<Vec<f64>>,
    ) -> T {
        let id = self.new_id::<T::Number>(name, T::KIND, unit, description);
        if !self.check_name(&id) {
            return T::from_inner(Arc::new(SyncInstrument::noop(id)));
        }

        let mut map = self
            .inner
            .instruments
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = self.lookup::<SyncInstrument<T::Number>>(&map, &id) {
            return T::from_inner(existing);
        }

        let boundaries = self.histogram_boundaries(&id, boundaries);
        let aggregation = id.kind().aggregation(&boundaries);
        let mut stores = Vec::with_capacity(self.inner.pipelines.len());
        for pipeline in self.inner.pipelines.iter() {
            let store = Arc::new(SeriesStore::new(
                aggregation.clone(),
                self.inner.config.shard_count(),
            ));
            let collector = SyncCollector::new(id.clone(), store.clone(), boundaries.clone());
            pipeline.register(&self.inner.scope, Arc::new(collector));
            stores.push(store);
        }

        let instrument = Arc::new(SyncInstrument::new(
            id.clone(),
            stores,
            self.inner.diagnostics.clone(),
        ));
        debug!("meter {}: created instrument {id}", self.inner.scope);
        map.entry(id.name().to_string()).or_default().push(Registered {
            id,
            instrument: instrument.clone(),
        });
        T::from_inner(instrument)
    }

    pub(crate) fn create_observable<T: ObservableHandle>(
        &self,
        name: String,
        unit: String,
        description: String,
        callbacks: Vec<Callback<T::Number>>,
    ) -> T {
        let id = self.new_id::<T::Number>(name, T::KIND, unit, description);
        if !self.check_name(&id) {
            return T::from_inner(Arc::new(ObservableInstrument::new(
                id,
                Vec::new(),
                Diagnostics::default(),
            )));
        }

        let mut map = self
            .inner
            .instruments
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = self.lookup::<ObservableInstrument<T::Number>>(&map, &id) {
            existing.add_callbacks(callbacks);
            return T::from_inner(existing);
        }

        let instrument = Arc::new(ObservableInstrument::new(
            id.clone(),
            callbacks,
            self.inner.diagnostics.clone(),
        ));
        for pipeline in self.inner.pipelines.iter() {
            let collector = ObservableCollector::new(instrument.clone());
            pipeline.register(&self.inner.scope, Arc::new(collector));
        }
        debug!("meter {}: created instrument {id}", self.inner.scope);
        map.entry(id.name().to_string()).or_default().push(Registered {
            id,
            instrument: instrument.clone(),
        });
        T::from_inner(instrument)
    }
}

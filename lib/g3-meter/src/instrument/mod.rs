/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::sync::Arc;

use g3_histogram::BucketBoundaries;

use crate::aggregate::AggregationKind;

mod id;
pub use id::{InstrumentId, Scope};

mod name;
pub use name::{NameError, validate_instrument_name};

mod sync;
pub(crate) use sync::{SyncCollector, SyncInstrument};
pub use sync::{Counter, Gauge, Histogram, UpDownCounter};

mod observable;
pub(crate) use observable::{ObservableCollector, ObservableInstrument};
pub use observable::{
    Callback, ObservableCounter, ObservableGauge, ObservableUpDownCounter, Observer,
};

mod builder;
pub(crate) use builder::{ObservableHandle, SyncHandle};
pub use builder::{InstrumentBuilder, ObservableBuilder};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InstrumentKind {
    Counter,
    UpDownCounter,
    Histogram,
    Gauge,
    ObservableCounter,
    ObservableUpDownCounter,
    ObservableGauge,
}

impl InstrumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentKind::Counter => "counter",
            InstrumentKind::UpDownCounter => "up_down_counter",
            InstrumentKind::Histogram => "histogram",
            InstrumentKind::Gauge => "gauge",
            InstrumentKind::ObservableCounter => "observable_counter",
            InstrumentKind::ObservableUpDownCounter => "observable_up_down_counter",
            InstrumentKind::ObservableGauge => "observable_gauge",
        }
    }

    pub fn is_monotonic(&self) -> bool {
        matches!(
            self,
            InstrumentKind::Counter | InstrumentKind::ObservableCounter
        )
    }

    pub fn is_observable(&self) -> bool {
        matches!(
            self,
            InstrumentKind::ObservableCounter
                | InstrumentKind::ObservableUpDownCounter
                | InstrumentKind::ObservableGauge
        )
    }

    /// Whether negative measurements are accepted.
    pub fn allow_negative(&self) -> bool {
        !matches!(
            self,
            InstrumentKind::Counter | InstrumentKind::ObservableCounter | InstrumentKind::Histogram
        )
    }

    pub(crate) fn aggregation(&self, boundaries: &Arc<BucketBoundaries>) -> AggregationKind {
        match self {
            InstrumentKind::Counter
            | InstrumentKind::UpDownCounter
            | InstrumentKind::ObservableCounter
            | InstrumentKind::ObservableUpDownCounter => AggregationKind::Sum,
            InstrumentKind::Gauge | InstrumentKind::ObservableGauge => AggregationKind::LastValue,
            InstrumentKind::Histogram => AggregationKind::Distribution(boundaries.clone()),
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

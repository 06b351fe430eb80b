/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

mod error;
pub use error::MetricsError;

mod number;
pub use number::{AtomicNumber, Number, NumberKind};

mod value;
pub use value::MetricValue;

mod temporality;
pub use temporality::Temporality;

mod aggregate;
mod pipeline;
mod store;

mod instrument;
pub use instrument::{
    Callback, Counter, Gauge, Histogram, InstrumentBuilder, InstrumentId, InstrumentKind, NameError,
    ObservableBuilder, ObservableCounter, ObservableGauge, ObservableUpDownCounter, Observer, Scope,
    UpDownCounter, validate_instrument_name,
};

mod meter;
pub use meter::Meter;

mod provider;
pub use provider::{MeterProvider, MeterProviderBuilder};

mod config;
pub use config::ProviderConfig;

pub mod data;
pub use data::MetricPayload;

pub mod diagnostic;
pub mod global;

mod reader;
pub use reader::{ArcExporter, Exporter, MemoryExporter, Producer, Reader};

pub use g3_attribute::{AttributeSet, Key, KeyValue, Value};
pub use g3_histogram::{BucketBoundaries, BucketCounts};

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::marker::PhantomData;
use std::sync::Arc;

use super::{
    Callback, Counter, Gauge, Histogram, InstrumentKind, ObservableCounter, ObservableGauge,
    ObservableInstrument, ObservableUpDownCounter, Observer, SyncInstrument, UpDownCounter,
};
use crate::{Meter, Number};

pub(crate) trait SyncHandle: Sized {
    type Number: Number;
    const KIND: InstrumentKind;

    fn from_inner(inner: Arc<SyncInstrument<Self::Number>>) -> Self;
}

pub(crate) trait ObservableHandle: Sized {
    type Number: Number;
    const KIND: InstrumentKind;

    fn from_inner(inner: Arc<ObservableInstrument<Self::Number>>) -> Self;
}

macro_rules! sync_handle {
    ($name:ident, $kind:ident) => {
        impl<N: Number> SyncHandle for $name<N> {
            type Number = N;
            const KIND: InstrumentKind = InstrumentKind::$kind;

            fn from_inner(inner: Arc<SyncInstrument<N>>) -> Self {
                $name::from_inner(inner)
            }
        }
    };
}

sync_handle!(Counter, Counter);
sync_handle!(UpDownCounter, UpDownCounter);
sync_handle!(Histogram, Histogram);
sync_handle!(Gauge, Gauge);

macro_rules! observable_handle {
    ($name:ident) => {
        impl<N: Number> ObservableHandle for $name<N> {
            type Number = N;
            const KIND: InstrumentKind = InstrumentKind::$name;

            fn from_inner(inner: Arc<ObservableInstrument<N>>) -> Self {
                $name::from_inner(inner)
            }
        }
    };
}

observable_handle!(ObservableCounter);
observable_handle!(ObservableUpDownCounter);
observable_handle!(ObservableGauge);

/// Options of a synchronous instrument, created by the `Meter`.
pub struct InstrumentBuilder<'a, T> {
    meter: &'a Meter,
    name: String,
    unit: String,
    description: String,
    boundaries: Option<Vec<f64>>,
    _handle: PhantomData<T>,
}

#[allow(private_bounds)]
impl<'a, T: SyncHandle> InstrumentBuilder<'a, T> {
    pub(crate) fn new(meter: &'a Meter, name: String) -> Self {
        InstrumentBuilder {
            meter,
            name,
            unit: String::new(),
            description: String::new(),
            boundaries: None,
            _handle: PhantomData,
        }
    }

    pub fn with_unit<S: Into<String>>(mut self, unit: S) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    /// Explicit bucket upper bounds, only used by histograms.
    pub fn with_boundaries(mut self, boundaries: Vec<f64>) -> Self {
        self.boundaries = Some(boundaries);
        self
    }

    pub fn build(self) -> T {
        self.meter
            .create_sync(self.name, self.unit, self.description, self.boundaries)
    }
}

/// Options of an observable instrument, created by the `Meter`.
#[allow(private_bounds)]
pub struct ObservableBuilder<'a, T: ObservableHandle> {
    meter: &'a Meter,
    name: String,
    unit: String,
    description: String,
    callbacks: Vec<Callback<T::Number>>,
}

#[allow(private_bounds)]
impl<'a, T: ObservableHandle> ObservableBuilder<'a, T> {
    pub(crate) fn new(meter: &'a Meter, name: String) -> Self {
        ObservableBuilder {
            meter,
            name,
            unit: String::new(),
            description: String::new(),
            callbacks: Vec::new(),
        }
    }

    pub fn with_unit<S: Into<String>>(mut self, unit: S) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    /// Add a callback to run on every collection.
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&dyn Observer<T::Number>) + Send + Sync + 'static,
    {
        self.callbacks.push(Arc::new(callback));
        self
    }

    pub fn build(self) -> T {
        self.meter
            .create_observable(self.name, self.unit, self.description, self.callbacks)
    }
}

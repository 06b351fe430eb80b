/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

use crate::{MetricValue, Number};

pub(super) struct LastValueState<N: Number> {
    inner: Mutex<Option<(N, DateTime<Utc>)>>,
}

impl<N: Number> Default for LastValueState<N> {
    fn default() -> Self {
        LastValueState {
            inner: Mutex::new(None),
        }
    }
}

impl<N: Number> LastValueState<N> {
    pub(super) fn set(&self, v: N) {
        let now = Utc::now();
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        *inner = Some((v, now));
    }

    /// The latest value is kept after collection, gauges are never reset.
    pub(super) fn get(&self) -> Option<(MetricValue, DateTime<Utc>)> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.map(|(v, time)| (v.into_metric_value(), time))
    }
}

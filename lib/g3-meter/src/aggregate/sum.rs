/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use crate::{AtomicNumber, MetricValue, Number};

pub(super) struct SumState<N: Number> {
    value: N::Atomic,
}

impl<N: Number> Default for SumState<N> {
    fn default() -> Self {
        SumState {
            value: <N::Atomic as AtomicNumber<N>>::new(N::ZERO),
        }
    }
}

impl<N: Number> SumState<N> {
    #[inline]
    pub(super) fn add(&self, v: N) {
        self.value.add(v);
    }

    pub(super) fn load(&self) -> MetricValue {
        self.value.load().into_metric_value()
    }

    pub(super) fn take(&self) -> MetricValue {
        self.value.take().into_metric_value()
    }
}

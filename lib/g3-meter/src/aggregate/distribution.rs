/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::sync::{Arc, Mutex, PoisonError};

use g3_histogram::{BucketBoundaries, BucketCounts};

pub(super) struct DistributionState {
    bounds: Arc<BucketBoundaries>,
    counts: Mutex<BucketCounts>,
}

impl DistributionState {
    pub(super) fn new(bounds: Arc<BucketBoundaries>) -> Self {
        let counts = BucketCounts::new(bounds.bucket_count());
        DistributionState {
            bounds,
            counts: Mutex::new(counts),
        }
    }

    pub(super) fn record(&self, v: f64) {
        let index = self.bounds.bucket_index(v);
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        counts.record(index, v);
    }

    pub(super) fn load(&self) -> BucketCounts {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(super) fn take(&self) -> BucketCounts {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

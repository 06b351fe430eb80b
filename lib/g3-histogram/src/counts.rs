/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::mem;

/// Bucket counts with running count, sum, min and max.
///
/// This is plain data, the owner is responsible for synchronization.
#[derive(Clone, Debug, PartialEq)]
pub struct BucketCounts {
    counts: Vec<u64>,
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
}

impl BucketCounts {
    pub fn new(bucket_count: usize) -> Self {
        BucketCounts {
            counts: vec![0; bucket_count],
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Record `v` into the bucket at `index`, out of range indexes go to
    /// the last bucket.
    pub fn record(&mut self, index: usize, v: f64) {
        let last = self.counts.len().saturating_sub(1);
        if let Some(c) = self.counts.get_mut(index.min(last)) {
            *c += 1;
        }
        self.count += 1;
        self.sum += v;
        if v < self.min {
            self.min = v;
        }
        if v > self.max {
            self.max = v;
        }
    }

    pub fn reset(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = 0);
        self.count = 0;
        self.sum = 0.0;
        self.min = f64::INFINITY;
        self.max = f64::NEG_INFINITY;
    }

    /// Return the current state and reset to empty, keeping the bucket
    /// layout.
    pub fn take(&mut self) -> BucketCounts {
        let empty = BucketCounts::new(self.counts.len());
        mem::replace(self, empty)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    #[inline]
    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn min(&self) -> Option<f64> {
        if self.is_empty() { None } else { Some(self.min) }
    }

    pub fn max(&self) -> Option<f64> {
        if self.is_empty() { None } else { Some(self.max) }
    }
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use crate::BoundaryError;

pub const DEFAULT_BOUNDARIES: [f64; 15] = [
    0.0, 5.0, 10.0, 25.0, 50.0, 75.0, 100.0, 250.0, 500.0, 750.0, 1000.0, 2500.0, 5000.0, 7500.0,
    10000.0,
];

/// Explicit upper bounds of histogram buckets.
///
/// With `n` boundaries there are `n + 1` buckets. Bucket `i` holds values in
/// `(bounds[i-1], bounds[i]]`, the last bucket holds everything above the
/// last boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct BucketBoundaries {
    bounds: Box<[f64]>,
}

impl BucketBoundaries {
    pub fn new(bounds: Vec<f64>) -> Result<Self, BoundaryError> {
        for (i, b) in bounds.iter().enumerate() {
            if !b.is_finite() {
                return Err(BoundaryError::NotFinite(i));
            }
            if i > 0 && *b <= bounds[i - 1] {
                return Err(BoundaryError::NotSorted(i));
            }
        }
        Ok(BucketBoundaries {
            bounds: bounds.into_boxed_slice(),
        })
    }

    pub fn linear(start: f64, width: f64, count: usize) -> Result<Self, BoundaryError> {
        if !(width > 0.0) {
            return Err(BoundaryError::InvalidParameter("width should be positive"));
        }
        if count == 0 {
            return Err(BoundaryError::InvalidParameter("count should not be zero"));
        }
        let bounds = (0..count).map(|i| start + width * i as f64).collect();
        BucketBoundaries::new(bounds)
    }

    pub fn exponential(start: f64, factor: f64, count: usize) -> Result<Self, BoundaryError> {
        if !(start > 0.0) {
            return Err(BoundaryError::InvalidParameter("start should be positive"));
        }
        if !(factor > 1.0) {
            return Err(BoundaryError::InvalidParameter(
                "factor should be greater than 1",
            ));
        }
        if count == 0 {
            return Err(BoundaryError::InvalidParameter("count should not be zero"));
        }
        let mut bounds = Vec::with_capacity(count);
        let mut next = start;
        for _ in 0..count {
            bounds.push(next);
            next *= factor;
        }
        BucketBoundaries::new(bounds)
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.bounds
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.bounds.len() + 1
    }

    /// Find the bucket for `v` with a binary search over the bounds.
    #[inline]
    pub fn bucket_index(&self, v: f64) -> usize {
        self.bounds.partition_point(|b| *b < v)
    }
}

impl Default for BucketBoundaries {
    fn default() -> Self {
        BucketBoundaries {
            bounds: Box::new(DEFAULT_BOUNDARIES),
        }
    }
}

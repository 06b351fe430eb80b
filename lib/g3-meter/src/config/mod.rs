/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::time::Duration;

use g3_histogram::BucketBoundaries;

use crate::Temporality;

#[cfg(feature = "yaml")]
mod yaml;

#[derive(Clone, Debug, PartialEq)]
pub struct ProviderConfig {
    pub(crate) shard_count: usize,
    pub(crate) temporality: Temporality,
    pub(crate) collect_timeout: Option<Duration>,
    pub(crate) flush_interval: Option<Duration>,
    pub(crate) histogram_boundaries: Arc<BucketBoundaries>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            shard_count: crate::store::default_shard_count(),
            temporality: Temporality::Cumulative,
            collect_timeout: None,
            flush_interval: None,
            histogram_boundaries: Arc::new(BucketBoundaries::default()),
        }
    }
}

impl ProviderConfig {
    /// Number of shards of each series store, rounded up to a power of two
    /// and capped at 256.
    pub fn set_shard_count(&mut self, count: usize) {
        self.shard_count = crate::store::normalize_shard_count(count);
    }

    #[inline]
    pub fn shard_count(&self) -> usize {
        self.shard_count
    }

    /// Temporality of readers that do not set their own.
    pub fn set_temporality(&mut self, temporality: Temporality) {
        self.temporality = temporality;
    }

    #[inline]
    pub fn temporality(&self) -> Temporality {
        self.temporality
    }

    pub fn set_collect_timeout(&mut self, timeout: Duration) {
        self.collect_timeout = Some(timeout);
    }

    #[inline]
    pub fn collect_timeout(&self) -> Option<Duration> {
        self.collect_timeout
    }

    /// Flush all exporters periodically, needs a tokio runtime when the
    /// provider is built.
    pub fn set_flush_interval(&mut self, interval: Duration) {
        self.flush_interval = Some(interval);
    }

    #[inline]
    pub fn flush_interval(&self) -> Option<Duration> {
        self.flush_interval
    }

    /// Boundaries of histograms created without explicit ones.
    pub fn set_histogram_boundaries(&mut self, boundaries: BucketBoundaries) {
        self.histogram_boundaries = Arc::new(boundaries);
    }

    #[inline]
    pub fn histogram_boundaries(&self) -> &Arc<BucketBoundaries> {
        &self.histogram_boundaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default() {
        let config = ProviderConfig::default();
        assert!(config.shard_count().is_power_of_two());
        assert_eq!(config.temporality(), Temporality::Cumulative);
        assert!(config.collect_timeout().is_none());
        assert!(config.flush_interval().is_none());
        assert_eq!(config.histogram_boundaries().len(), 15);
    }

    #[test]
    fn shard_count() {
        let mut config = ProviderConfig::default();
        config.set_shard_count(5);
        assert_eq!(config.shard_count(), 8);
        config.set_shard_count(0);
        assert_eq!(config.shard_count(), 1);
        config.set_shard_count(1 << 20);
        assert_eq!(config.shard_count(), 256);
    }
}

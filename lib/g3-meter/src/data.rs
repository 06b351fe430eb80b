/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use chrono::{DateTime, Utc};

use g3_attribute::AttributeSet;
use g3_histogram::{BucketBoundaries, BucketCounts};

use crate::{InstrumentId, MetricValue, MetricsError, Scope, Temporality};

/// The result of one collection cycle of one reader.
#[derive(Clone, Debug)]
pub struct MetricPayload {
    pub time: DateTime<Utc>,
    pub start_time: DateTime<Utc>,
    pub scopes: Vec<ScopeMetrics>,
    /// Set if the collection deadline expired before every instrument was read.
    pub incomplete: bool,
    /// Per instrument failures, the other instruments are still collected.
    pub errors: Vec<MetricsError>,
}

impl MetricPayload {
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn is_partial(&self) -> bool {
        self.incomplete || !self.errors.is_empty()
    }

    /// Find a metric by instrument name in any scope.
    pub fn metric(&self, name: &str) -> Option<&Metric> {
        self.scopes
            .iter()
            .flat_map(|s| s.metrics.iter())
            .find(|m| m.id.name() == name)
    }

    pub fn metric_count(&self) -> usize {
        self.scopes.iter().map(|s| s.metrics.len()).sum()
    }
}

#[derive(Clone, Debug)]
pub struct ScopeMetrics {
    pub scope: Arc<Scope>,
    pub metrics: Vec<Metric>,
}

#[derive(Clone, Debug)]
pub struct Metric {
    pub id: Arc<InstrumentId>,
    pub data: MetricData,
}

#[derive(Clone, Debug)]
pub enum MetricData {
    Sum {
        temporality: Temporality,
        monotonic: bool,
        points: Vec<DataPoint>,
    },
    Gauge {
        points: Vec<GaugePoint>,
    },
    Histogram {
        temporality: Temporality,
        boundaries: Arc<BucketBoundaries>,
        points: Vec<HistogramPoint>,
    },
}

impl MetricData {
    pub fn point_count(&self) -> usize {
        match self {
            MetricData::Sum { points, .. } => points.len(),
            MetricData::Gauge { points } => points.len(),
            MetricData::Histogram { points, .. } => points.len(),
        }
    }

    /// The sum or gauge value recorded for `attributes`.
    pub fn value_of(&self, attributes: &AttributeSet) -> Option<MetricValue> {
        match self {
            MetricData::Sum { points, .. } => points
                .iter()
                .find(|p| &p.attributes == attributes)
                .map(|p| p.value),
            MetricData::Gauge { points } => points
                .iter()
                .find(|p| &p.attributes == attributes)
                .map(|p| p.value),
            MetricData::Histogram { .. } => None,
        }
    }

    pub fn histogram_of(&self, attributes: &AttributeSet) -> Option<&BucketCounts> {
        match self {
            MetricData::Histogram { points, .. } => points
                .iter()
                .find(|p| &p.attributes == attributes)
                .map(|p| &p.counts),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DataPoint {
    pub attributes: AttributeSet,
    pub value: MetricValue,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GaugePoint {
    pub attributes: AttributeSet,
    pub value: MetricValue,
    pub time: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HistogramPoint {
    pub attributes: AttributeSet,
    pub counts: BucketCounts,
}

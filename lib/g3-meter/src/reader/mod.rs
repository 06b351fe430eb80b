/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::{MetricPayload, MetricsError, Temporality};

mod memory;
pub use memory::MemoryExporter;

mod periodic;
pub(crate) use periodic::PeriodicFlush;

/// Pull side of a reader.
pub trait Producer: Send + Sync {
    /// Collect everything the reader knows about, safe to be called
    /// concurrently with recording.
    fn produce(&self) -> Result<MetricPayload, MetricsError>;

    /// Like `produce`, but stop reading instruments once `deadline` is reached
    /// and flag the payload as incomplete.
    fn produce_until(&self, deadline: Instant) -> Result<MetricPayload, MetricsError>;
}

/// The consumer of a reader, in charge of the transport.
#[async_trait]
pub trait Exporter: Send + Sync {
    /// Called once when the reader is attached to a provider.
    fn register(&self, producer: Arc<dyn Producer>);

    /// Run a collect and export cycle to its end.
    async fn flush(&self) -> Result<(), MetricsError>;

    async fn shutdown(&self) -> Result<(), MetricsError>;
}

pub type ArcExporter = Arc<dyn Exporter>;

/// Connects an exporter to a provider.
#[derive(Clone)]
pub struct Reader {
    exporter: ArcExporter,
    temporality: Option<Temporality>,
    collect_timeout: Option<Duration>,
    producer: Arc<OnceLock<Arc<dyn Producer>>>,
}

impl Reader {
    pub fn new(exporter: ArcExporter) -> Self {
        Reader {
            exporter,
            temporality: None,
            collect_timeout: None,
            producer: Arc::new(OnceLock::new()),
        }
    }

    /// Override the provider default temporality.
    pub fn with_temporality(mut self, temporality: Temporality) -> Self {
        self.temporality = Some(temporality);
        self
    }

    /// Override the provider default collect timeout.
    pub fn with_collect_timeout(mut self, timeout: Duration) -> Self {
        self.collect_timeout = Some(timeout);
        self
    }

    #[inline]
    pub(crate) fn exporter(&self) -> &ArcExporter {
        &self.exporter
    }

    #[inline]
    pub(crate) fn temporality(&self) -> Option<Temporality> {
        self.temporality
    }

    #[inline]
    pub(crate) fn collect_timeout(&self) -> Option<Duration> {
        self.collect_timeout
    }

    /// Attach the producer of the provider pipeline, a reader is only bound
    /// to the first provider it is added to.
    pub(crate) fn register(&self, producer: Arc<dyn Producer>) -> bool {
        if self.producer.set(producer.clone()).is_err() {
            return false;
        }
        self.exporter.register(producer);
        true
    }

    /// Collect directly, without going through the exporter.
    pub fn collect(&self) -> Result<MetricPayload, MetricsError> {
        match self.producer.get() {
            Some(p) => p.produce(),
            None => Err(MetricsError::NotRegistered),
        }
    }
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use log::debug;

use super::{Exporter, Producer};
use crate::{MetricPayload, MetricsError};

/// Exporter keeping the latest payloads in memory.
pub struct MemoryExporter {
    store_count: usize,
    producer: Mutex<Option<Arc<dyn Producer>>>,
    payloads: Mutex<VecDeque<Arc<MetricPayload>>>,
    shutdown: AtomicBool,
}

impl MemoryExporter {
    pub fn new(store_count: usize) -> Self {
        let store_count = store_count.max(1);
        MemoryExporter {
            store_count,
            producer: Mutex::new(None),
            payloads: Mutex::new(VecDeque::with_capacity(store_count)),
            shutdown: AtomicBool::new(false),
        }
    }

    fn producer(&self) -> Result<Arc<dyn Producer>, MetricsError> {
        self.producer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(MetricsError::NotRegistered)
    }

    /// Pull a payload without storing it.
    pub fn collect(&self) -> Result<MetricPayload, MetricsError> {
        if self.is_shutdown() {
            return Err(MetricsError::ReaderShutdown);
        }
        self.producer()?.produce()
    }

    /// Stored payloads, newest first.
    pub fn payloads(&self) -> Vec<Arc<MetricPayload>> {
        self.payloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn last_payload(&self) -> Option<Arc<MetricPayload>> {
        self.payloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .front()
            .cloned()
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}

impl Default for MemoryExporter {
    fn default() -> Self {
        MemoryExporter::new(1)
    }
}

#[async_trait]
impl Exporter for MemoryExporter {
    fn register(&self, producer: Arc<dyn Producer>) {
        let mut slot = self.producer.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(producer);
    }

    async fn flush(&self) -> Result<(), MetricsError> {
        let payload = self.collect()?;
        debug!(
            "memory exporter: stored payload with {} metrics",
            payload.metric_count()
        );
        let mut payloads = self.payloads.lock().unwrap_or_else(PoisonError::into_inner);
        payloads.push_front(Arc::new(payload));
        payloads.truncate(self.store_count);
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), MetricsError> {
        if self.shutdown.swap(true, Ordering::AcqRel) {
            return Err(MetricsError::AlreadyShutdown);
        }
        self.producer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}

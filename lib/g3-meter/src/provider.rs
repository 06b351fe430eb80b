/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use foldhash::fast::FixedState;
use log::{debug, info, warn};
use tokio::sync::broadcast;

use crate::config::ProviderConfig;
use crate::diagnostic::{DiagnosticHandler, Diagnostics};
use crate::pipeline::{Pipeline, ReaderProducer};
use crate::reader::{ArcExporter, PeriodicFlush, Reader};
use crate::{Meter, MetricsError, Scope};

#[derive(Default)]
pub struct MeterProviderBuilder {
    readers: Vec<Reader>,
    config: ProviderConfig,
    diagnostic_handler: Option<Arc<dyn DiagnosticHandler>>,
}

impl MeterProviderBuilder {
    pub fn with_reader(mut self, reader: Reader) -> Self {
        self.readers.push(reader);
        self
    }

    pub fn with_config(mut self, config: ProviderConfig) -> Self {
        self.config = config;
        self
    }

    /// Send usage errors of this provider to `handler` instead of the
    /// process wide one.
    pub fn with_diagnostic_handler(mut self, handler: Arc<dyn DiagnosticHandler>) -> Self {
        self.diagnostic_handler = Some(handler);
        self
    }

    pub fn build(self) -> MeterProvider {
        let start_time = Utc::now();
        let diagnostics = Diagnostics::new(self.diagnostic_handler);

        let mut pipelines = Vec::with_capacity(self.readers.len());
        let mut exporters = Vec::with_capacity(self.readers.len());
        for reader in self.readers {
            let temporality = reader.temporality().unwrap_or(self.config.temporality());
            let collect_timeout = reader.collect_timeout().or(self.config.collect_timeout());
            let pipeline = Arc::new(Pipeline::new(temporality, collect_timeout, start_time));
            if !reader.register(Arc::new(ReaderProducer::new(&pipeline))) {
                warn!("reader already attached to another provider, skipped");
                continue;
            }
            exporters.push(reader.exporter().clone());
            pipelines.push(pipeline);
        }

        let mut flush_stop = None;
        if let Some(interval) = self.config.flush_interval() {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let (stop_sender, stop_receiver) = broadcast::channel(1);
                    let task = PeriodicFlush::new(
                        interval,
                        exporters.clone(),
                        diagnostics.clone(),
                        stop_receiver,
                    );
                    handle.spawn(task.into_running());
                    flush_stop = Some(stop_sender);
                }
                Err(_) => warn!("no tokio runtime found, periodic flush disabled"),
            }
        }

        debug!("meter provider created with {} readers", pipelines.len());
        MeterProvider {
            inner: Arc::new(ProviderInner {
                pipelines: Arc::from(pipelines),
                exporters,
                config: Arc::new(self.config),
                diagnostics,
                meters: Mutex::new(HashMap::with_hasher(FixedState::with_seed(0))),
                shutdown: AtomicBool::new(false),
                flush_stop,
            }),
        }
    }
}

struct ProviderInner {
    pipelines: Arc<[Arc<Pipeline>]>,
    exporters: Vec<ArcExporter>,
    config: Arc<ProviderConfig>,
    diagnostics: Diagnostics,
    meters: Mutex<HashMap<Scope, Meter, FixedState>>,
    shutdown: AtomicBool,
    flush_stop: Option<broadcast::Sender<()>>,
}

/// Owns the readers, hands out meters.
#[derive(Clone)]
pub struct MeterProvider {
    inner: Arc<ProviderInner>,
}

impl MeterProvider {
    pub fn builder() -> MeterProviderBuilder {
        MeterProviderBuilder::default()
    }

    /// A provider without reader, all its instruments record nothing.
    pub fn noop() -> Self {
        MeterProviderBuilder::default().build()
    }

    pub fn meter<S: Into<String>>(&self, name: S) -> Meter {
        self.scoped_meter(Scope::new(name))
    }

    pub fn versioned_meter<S: Into<String>>(
        &self,
        name: S,
        version: Option<&str>,
        schema_url: Option<&str>,
    ) -> Meter {
        let mut scope = Scope::new(name);
        if let Some(version) = version {
            scope = scope.with_version(version);
        }
        if let Some(schema_url) = schema_url {
            scope = scope.with_schema_url(schema_url);
        }
        self.scoped_meter(scope)
    }

    /// Get the meter of `scope`, there is only one meter per scope.
    pub fn scoped_meter(&self, scope: Scope) -> Meter {
        if self.is_shutdown() {
            return Meter::noop();
        }
        let mut meters = self
            .inner
            .meters
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        meters
            .entry(scope)
            .or_insert_with_key(|scope| {
                debug!("meter {scope} created");
                Meter::new(
                    Arc::new(scope.clone()),
                    self.inner.pipelines.clone(),
                    self.inner.config.clone(),
                    self.inner.diagnostics.clone(),
                )
            })
            .clone()
    }

    pub fn is_shutdown(&self) -> bool {
        self.inner.shutdown.load(Ordering::Acquire)
    }

    #[inline]
    pub fn config(&self) -> &ProviderConfig {
        &self.inner.config
    }

    /// Run a collect and export cycle on every reader.
    ///
    /// All exporters are flushed even if some of them fail, the first error
    /// is returned.
    pub async fn force_flush(&self) -> Result<(), MetricsError> {
        if self.is_shutdown() {
            return Err(MetricsError::AlreadyShutdown);
        }
        self.flush_exporters().await
    }

    async fn flush_exporters(&self) -> Result<(), MetricsError> {
        let mut result = Ok(());
        for exporter in &self.inner.exporters {
            if let Err(e) = exporter.flush().await {
                self.inner.diagnostics.report(e.clone());
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }

    /// Flush, then shut down every reader and its exporter.
    ///
    /// Only the first call does the work, later ones return `AlreadyShutdown`.
    pub async fn shutdown(&self) -> Result<(), MetricsError> {
        if self.inner.shutdown.swap(true, Ordering::AcqRel) {
            return Err(MetricsError::AlreadyShutdown);
        }
        if let Some(sender) = &self.inner.flush_stop {
            let _ = sender.send(());
        }

        let mut result = self.flush_exporters().await;
        for pipeline in self.inner.pipelines.iter() {
            pipeline.shutdown();
        }
        for exporter in &self.inner.exporters {
            if let Err(e) = exporter.shutdown().await {
                self.inner.diagnostics.report(e.clone());
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        self.inner
            .meters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();

        info!(
            "meter provider shut down, {} readers released",
            self.inner.pipelines.len()
        );
        result
    }
}

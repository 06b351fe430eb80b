/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use log::debug;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use super::ArcExporter;
use crate::diagnostic::Diagnostics;

/// Flush all exporters at a fixed interval until stopped.
pub(crate) struct PeriodicFlush {
    interval: Duration,
    exporters: Vec<ArcExporter>,
    diagnostics: Diagnostics,
    stop_receiver: broadcast::Receiver<()>,
}

impl PeriodicFlush {
    pub(crate) fn new(
        interval: Duration,
        exporters: Vec<ArcExporter>,
        diagnostics: Diagnostics,
        stop_receiver: broadcast::Receiver<()>,
    ) -> Self {
        PeriodicFlush {
            interval,
            exporters,
            diagnostics,
            stop_receiver,
        }
    }

    pub(crate) async fn into_running(mut self) {
        let start = tokio::time::Instant::now() + self.interval;
        let mut interval = tokio::time::interval_at(start, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                r = self.stop_receiver.recv() => {
                    match r {
                        Ok(_) => break,
                        Err(broadcast::error::RecvError::Closed) => break,
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    }
                }
                _ = interval.tick() => {
                    self.flush_all().await;
                }
            }
        }
        debug!("periodic flush stopped");
    }

    async fn flush_all(&self) {
        for exporter in &self.exporters {
            if let Err(e) = exporter.flush().await {
                self.diagnostics.report(e);
            }
        }
    }
}

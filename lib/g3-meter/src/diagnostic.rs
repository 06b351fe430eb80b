/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

//! Side channel for usage and collection errors.
//!
//! Reporting never blocks and never fails the caller. Without an installed
//! handler the errors are logged, at most one line per error kind every 64s.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};
use std::time::Instant;

use arc_swap::ArcSwapOption;
use log::warn;
use tokio::sync::mpsc;

use crate::MetricsError;

pub trait DiagnosticHandler: Send + Sync {
    fn handle(&self, error: &MetricsError);
}

static GLOBAL_HANDLER: LazyLock<ArcSwapOption<Arc<dyn DiagnosticHandler>>> =
    LazyLock::new(|| ArcSwapOption::new(None));

static REPORTED: AtomicU64 = AtomicU64::new(0);
static SUPPRESSED: AtomicU64 = AtomicU64::new(0);

static LOG_START: LazyLock<Instant> = LazyLock::new(Instant::now);
static LAST_LOG_SLICE: [AtomicU64; MetricsError::KIND_COUNT] =
    [const { AtomicU64::new(u64::MAX) }; MetricsError::KIND_COUNT];

/// Install a process wide handler, replacing the logging one.
pub fn set_handler(handler: Arc<dyn DiagnosticHandler>) {
    GLOBAL_HANDLER.store(Some(Arc::new(handler)));
}

/// Go back to the logging handler.
pub fn reset_handler() {
    GLOBAL_HANDLER.store(None);
}

pub fn report(error: MetricsError) {
    REPORTED.fetch_add(1, Ordering::Relaxed);
    match &*GLOBAL_HANDLER.load() {
        Some(handler) => handler.handle(&error),
        None => log_rate_limited(&error),
    }
}

/// Total number of reported errors.
pub fn reported_count() -> u64 {
    REPORTED.load(Ordering::Relaxed)
}

/// Number of errors the logging handler did not print.
pub fn suppressed_count() -> u64 {
    SUPPRESSED.load(Ordering::Relaxed)
}

fn log_rate_limited(error: &MetricsError) {
    let time_slice = LOG_START.elapsed().as_secs() >> 6; // every 64s
    let last = &LAST_LOG_SLICE[error.kind_index()];
    if last.swap(time_slice, Ordering::Relaxed) != time_slice {
        warn!("metrics error: {error}");
    } else {
        SUPPRESSED.fetch_add(1, Ordering::Relaxed);
    }
}

/// Handler that forwards every error to a channel.
pub struct ChannelHandler {
    sender: mpsc::UnboundedSender<MetricsError>,
}

impl ChannelHandler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MetricsError>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (ChannelHandler { sender }, receiver)
    }
}

impl DiagnosticHandler for ChannelHandler {
    fn handle(&self, error: &MetricsError) {
        let _ = self.sender.send(error.clone());
    }
}

/// The handler used by one provider and everything created from it.
#[derive(Clone, Default)]
pub(crate) struct Diagnostics {
    handler: Option<Arc<dyn DiagnosticHandler>>,
}

impl Diagnostics {
    pub(crate) fn new(handler: Option<Arc<dyn DiagnosticHandler>>) -> Self {
        Diagnostics { handler }
    }

    pub(crate) fn report(&self, error: MetricsError) {
        match &self.handler {
            Some(handler) => {
                REPORTED.fetch_add(1, Ordering::Relaxed);
                handler.handle(&error);
            }
            None => report(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel() {
        let (handler, mut receiver) = ChannelHandler::new();
        let diagnostics = Diagnostics::new(Some(Arc::new(handler)));
        let before = reported_count();
        diagnostics.report(MetricsError::NotRegistered);
        assert!(reported_count() > before);
        assert_eq!(receiver.try_recv().unwrap(), MetricsError::NotRegistered);
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn rate_limited_log() {
        let before = suppressed_count();
        log_rate_limited(&MetricsError::DeadlineExpired);
        log_rate_limited(&MetricsError::DeadlineExpired);
        log_rate_limited(&MetricsError::DeadlineExpired);
        assert!(suppressed_count() >= before + 2);
    }

    #[test]
    fn closed_channel() {
        let (handler, receiver) = ChannelHandler::new();
        drop(receiver);
        handler.handle(&MetricsError::ReaderShutdown);
    }
}

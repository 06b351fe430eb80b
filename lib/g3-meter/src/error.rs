/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MetricsError {
    #[error("invalid measurement for instrument {instrument}: {reason}")]
    InvalidMeasurement {
        instrument: String,
        reason: &'static str,
    },
    #[error("invalid instrument name {name:?}: {reason}")]
    InvalidInstrumentName { name: String, reason: String },
    #[error("invalid histogram boundaries for instrument {instrument}: {reason}")]
    InvalidBoundaries { instrument: String, reason: String },
    #[error(
        "instrument {name} in scope {scope} already registered as {existing}, conflicting request {requested}"
    )]
    DuplicateInstrument {
        scope: String,
        name: String,
        existing: String,
        requested: String,
    },
    #[error("callback of instrument {0} panicked")]
    CallbackPanicked(String),
    #[error("collection deadline expired")]
    DeadlineExpired,
    #[error("reader has been shut down")]
    ReaderShutdown,
    #[error("meter provider has already been shut down")]
    AlreadyShutdown,
    #[error("no producer registered")]
    NotRegistered,
    #[error("exporter error: {0}")]
    Exporter(String),
}

impl MetricsError {
    pub(crate) const KIND_COUNT: usize = 10;

    pub(crate) fn kind_index(&self) -> usize {
        match self {
            MetricsError::InvalidMeasurement { .. } => 0,
            MetricsError::InvalidInstrumentName { .. } => 1,
            MetricsError::InvalidBoundaries { .. } => 2,
            MetricsError::DuplicateInstrument { .. } => 3,
            MetricsError::CallbackPanicked(_) => 4,
            MetricsError::DeadlineExpired => 5,
            MetricsError::ReaderShutdown => 6,
            MetricsError::AlreadyShutdown => 7,
            MetricsError::NotRegistered => 8,
            MetricsError::Exporter(_) => 9,
        }
    }
}

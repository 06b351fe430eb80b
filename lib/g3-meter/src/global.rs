/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

//! Process wide meter provider.
//!
//! A no-op provider is in place until one is installed with
//! [`set_meter_provider`], and [`shutdown_meter_provider`] tears the
//! installed one down.

use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwapOption;

use crate::{Meter, MeterProvider, MetricsError};

static GLOBAL_PROVIDER: LazyLock<ArcSwapOption<MeterProvider>> =
    LazyLock::new(|| ArcSwapOption::new(None));

/// Install `provider`, returning the previous one.
pub fn set_meter_provider(provider: MeterProvider) -> Option<MeterProvider> {
    GLOBAL_PROVIDER
        .swap(Some(Arc::new(provider)))
        .map(|old| old.as_ref().clone())
}

pub fn meter_provider() -> MeterProvider {
    match GLOBAL_PROVIDER.load_full() {
        Some(provider) => provider.as_ref().clone(),
        None => MeterProvider::noop(),
    }
}

pub fn meter<S: Into<String>>(name: S) -> Meter {
    meter_provider().meter(name)
}

/// Remove the installed provider and shut it down.
pub async fn shutdown_meter_provider() -> Result<(), MetricsError> {
    match GLOBAL_PROVIDER.swap(None) {
        Some(provider) => provider.shutdown().await,
        None => Ok(()),
    }
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2026 ByteDance and/or its affiliates.
 */

mod boundaries;
pub use boundaries::{BucketBoundaries, DEFAULT_BOUNDARIES};

mod counts;
pub use counts::BucketCounts;

mod error;
pub use error::BoundaryError;

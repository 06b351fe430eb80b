/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BoundaryError {
    #[error("boundary #{0} is not a finite number")]
    NotFinite(usize),
    #[error("boundary #{0} is not greater than the previous one")]
    NotSorted(usize),
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
}

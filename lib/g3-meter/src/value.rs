/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025-2026 ByteDance and/or its affiliates.
 */

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Signed(i64),
    Double(f64),
}

impl MetricValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            MetricValue::Signed(i) => *i as f64,
            MetricValue::Double(f) => *f,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetricValue::Signed(i) => Some(*i),
            MetricValue::Double(_) => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Signed(i) => f.write_str(itoa::Buffer::new().format(*i)),
            MetricValue::Double(v) => f.write_str(ryu::Buffer::new().format(*v)),
        }
    }
}

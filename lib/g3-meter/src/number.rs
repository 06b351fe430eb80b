/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use portable_atomic::AtomicF64;

use crate::MetricValue;

mod private {
    pub trait Sealed {}

    impl Sealed for i64 {}
    impl Sealed for f64 {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NumberKind {
    I64,
    F64,
}

impl NumberKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberKind::I64 => "i64",
            NumberKind::F64 => "f64",
        }
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic storage for a running sum.
pub trait AtomicNumber<N>: Send + Sync {
    fn new(v: N) -> Self;
    fn add(&self, v: N);
    fn load(&self) -> N;
    /// Read and reset to zero in one step.
    fn take(&self) -> N;
}

/// Numeric domain of an instrument, implemented for `i64` and `f64` only.
pub trait Number: private::Sealed + Copy + PartialOrd + Send + Sync + fmt::Debug + 'static {
    type Atomic: AtomicNumber<Self>;

    const ZERO: Self;
    const KIND: NumberKind;

    fn is_negative(self) -> bool;
    fn is_finite(self) -> bool;
    fn sub(self, other: Self) -> Self;
    fn as_f64(self) -> f64;
    fn into_metric_value(self) -> MetricValue;
}

impl AtomicNumber<i64> for AtomicI64 {
    fn new(v: i64) -> Self {
        AtomicI64::new(v)
    }

    #[inline]
    fn add(&self, v: i64) {
        self.fetch_add(v, Ordering::Release);
    }

    #[inline]
    fn load(&self) -> i64 {
        AtomicI64::load(self, Ordering::Acquire)
    }

    #[inline]
    fn take(&self) -> i64 {
        self.swap(0, Ordering::AcqRel)
    }
}

impl AtomicNumber<f64> for AtomicF64 {
    fn new(v: f64) -> Self {
        AtomicF64::new(v)
    }

    #[inline]
    fn add(&self, v: f64) {
        self.fetch_add(v, Ordering::Release);
    }

    #[inline]
    fn load(&self) -> f64 {
        AtomicF64::load(self, Ordering::Acquire)
    }

    #[inline]
    fn take(&self) -> f64 {
        self.swap(0.0, Ordering::AcqRel)
    }
}

impl Number for i64 {
    type Atomic = AtomicI64;

    const ZERO: Self = 0;
    const KIND: NumberKind = NumberKind::I64;

    #[inline]
    fn is_negative(self) -> bool {
        self < 0
    }

    #[inline]
    fn is_finite(self) -> bool {
        true
    }

    #[inline]
    fn sub(self, other: Self) -> Self {
        self.wrapping_sub(other)
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn into_metric_value(self) -> MetricValue {
        MetricValue::Signed(self)
    }
}

impl Number for f64 {
    type Atomic = AtomicF64;

    const ZERO: Self = 0.0;
    const KIND: NumberKind = NumberKind::F64;

    #[inline]
    fn is_negative(self) -> bool {
        self < 0.0
    }

    #[inline]
    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }

    #[inline]
    fn sub(self, other: Self) -> Self {
        self - other
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self
    }

    #[inline]
    fn into_metric_value(self) -> MetricValue {
        MetricValue::Double(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_i64() {
        let a = <<i64 as Number>::Atomic as AtomicNumber<i64>>::new(0);
        a.add(5);
        a.add(-2);
        assert_eq!(AtomicNumber::load(&a), 3);
        assert_eq!(a.take(), 3);
        assert_eq!(AtomicNumber::load(&a), 0);
    }

    #[test]
    fn atomic_f64() {
        let a = <<f64 as Number>::Atomic as AtomicNumber<f64>>::new(0.0);
        a.add(1.5);
        a.add(2.25);
        assert_eq!(AtomicNumber::load(&a), 3.75);
        assert_eq!(a.take(), 3.75);
        assert_eq!(AtomicNumber::load(&a), 0.0);
    }

    #[test]
    fn domain() {
        assert!((-1_i64).is_negative());
        assert!(!0_i64.is_negative());
        assert!((-0.5_f64).is_negative());
        assert!(!Number::is_finite(f64::NAN));
        assert!(!Number::is_finite(f64::INFINITY));
        assert!(Number::is_finite(1_i64));
        assert_eq!(Number::sub(i64::MIN, 1), i64::MAX);
    }
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::fmt::{self, Write};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use smol_str::SmolStr;

/// A homogeneous array attribute value.
#[derive(Clone, Debug)]
pub enum Array {
    Bool(Arc<[bool]>),
    I64(Arc<[i64]>),
    F64(Arc<[f64]>),
    String(Arc<[SmolStr]>),
}

/// An attribute value.
///
/// Floats are compared and hashed by their bit pattern, so `NaN` equals
/// itself and `0.0` differs from `-0.0`. This keeps the type usable as
/// part of a map key.
#[derive(Clone, Debug)]
pub enum Value {
    Bool(bool),
    I64(i64),
    F64(f64),
    String(SmolStr),
    Array(Array),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

fn f64_slice_bits_eq(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Array::Bool(a), Array::Bool(b)) => a == b,
            (Array::I64(a), Array::I64(b)) => a == b,
            (Array::F64(a), Array::F64(b)) => f64_slice_bits_eq(a, b),
            (Array::String(a), Array::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Array {}

impl Hash for Array {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Array::Bool(a) => {
                state.write_u8(0);
                a.hash(state);
            }
            Array::I64(a) => {
                state.write_u8(1);
                a.hash(state);
            }
            Array::F64(a) => {
                state.write_u8(2);
                state.write_usize(a.len());
                for f in a.iter() {
                    state.write_u64(f.to_bits());
                }
            }
            Array::String(a) => {
                state.write_u8(3);
                a.hash(state);
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Bool(b) => {
                state.write_u8(0);
                b.hash(state);
            }
            Value::I64(i) => {
                state.write_u8(1);
                i.hash(state);
            }
            Value::F64(f) => {
                state.write_u8(2);
                state.write_u64(f.to_bits());
            }
            Value::String(s) => {
                state.write_u8(3);
                s.hash(state);
            }
            Value::Array(a) => {
                state.write_u8(4);
                a.hash(state);
            }
        }
    }
}

fn write_list<T, F>(f: &mut fmt::Formatter<'_>, list: &[T], mut write_one: F) -> fmt::Result
where
    F: FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
{
    f.write_char('[')?;
    let mut iter = list.iter();
    if let Some(v) = iter.next() {
        write_one(f, v)?;
        for v in iter {
            f.write_char(',')?;
            write_one(f, v)?;
        }
    }
    f.write_char(']')
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Array::Bool(a) => write_list(f, a, |f, v| write!(f, "{v}")),
            Array::I64(a) => write_list(f, a, |f, v| write!(f, "{v}")),
            Array::F64(a) => write_list(f, a, |f, v| write!(f, "{v}")),
            Array::String(a) => write_list(f, a, |f, v| f.write_str(v.as_str())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::I64(i) => write!(f, "{i}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::String(s) => f.write_str(s.as_str()),
            Value::Array(a) => a.fmt(f),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I64(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::I64(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(SmolStr::new(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(SmolStr::from(v))
    }
}

impl From<SmolStr> for Value {
    fn from(v: SmolStr) -> Self {
        Value::String(v)
    }
}

impl From<Array> for Value {
    fn from(v: Array) -> Self {
        Value::Array(v)
    }
}

impl From<Vec<bool>> for Value {
    fn from(v: Vec<bool>) -> Self {
        Value::Array(Array::Bool(v.into()))
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::Array(Array::I64(v.into()))
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Array(Array::F64(v.into()))
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        let list: Vec<SmolStr> = v.into_iter().map(SmolStr::new).collect();
        Value::Array(Array::String(list.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::BuildHasher;

    use foldhash::fast::FixedState;

    fn hash_of(v: &Value) -> u64 {
        FixedState::with_seed(0).hash_one(v)
    }

    #[test]
    fn float_bits() {
        assert_eq!(Value::F64(f64::NAN), Value::F64(f64::NAN));
        assert_eq!(hash_of(&Value::F64(f64::NAN)), hash_of(&Value::F64(f64::NAN)));
        assert_ne!(Value::F64(0.0), Value::F64(-0.0));
        assert_eq!(Value::F64(1.5), Value::F64(1.5));
    }

    #[test]
    fn kind_mismatch() {
        assert_ne!(Value::I64(1), Value::F64(1.0));
        assert_ne!(Value::from("true"), Value::Bool(true));
        assert_ne!(
            Value::from(vec![1_i64, 2]),
            Value::from(vec![1.0_f64, 2.0])
        );
    }

    #[test]
    fn display() {
        assert_eq!(Value::from("abc").to_string(), "abc");
        assert_eq!(Value::from(12_i64).to_string(), "12");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(vec![1_i64, 2, 3]).to_string(), "[1,2,3]");
        assert_eq!(Value::from(vec!["a", "b"]).to_string(), "[a,b]");
        assert_eq!(Value::from(Vec::<bool>::new()).to_string(), "[]");
    }
}

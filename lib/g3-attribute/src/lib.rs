/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

mod key;
pub use key::Key;

mod value;
pub use value::{Array, Value};

mod kv;
pub use kv::KeyValue;

mod set;
pub use set::{AttributeSet, Canonical, DisplayAttributeSet, canonicalize, set_hash};

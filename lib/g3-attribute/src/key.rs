/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::fmt;

use smol_str::SmolStr;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(SmolStr);

impl Key {
    pub const fn from_static_str(s: &'static str) -> Self {
        Key(SmolStr::new_static(s))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key(SmolStr::new(s))
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key(SmolStr::from(s))
    }
}

impl From<SmolStr> for Key {
    fn from(s: SmolStr) -> Self {
        Key(s)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

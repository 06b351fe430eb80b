/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::sync::Arc;

use crate::{InstrumentKind, NumberKind};

/// Instrumentation scope of a meter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Scope {
    name: String,
    version: Option<String>,
    schema_url: Option<String>,
}

impl Scope {
    pub fn new<T: Into<String>>(name: T) -> Self {
        Scope {
            name: name.into(),
            version: None,
            schema_url: None,
        }
    }

    pub fn with_version<T: Into<String>>(mut self, version: T) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_schema_url<T: Into<String>>(mut self, schema_url: T) -> Self {
        self.schema_url = Some(schema_url.into());
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    #[inline]
    pub fn schema_url(&self) -> Option<&str> {
        self.schema_url.as_deref()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}@{v}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Identity of an instrument, unique within a provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InstrumentId {
    scope: Arc<Scope>,
    name: String,
    kind: InstrumentKind,
    number: NumberKind,
    unit: String,
    description: String,
}

impl InstrumentId {
    pub(crate) fn new(
        scope: Arc<Scope>,
        name: String,
        kind: InstrumentKind,
        number: NumberKind,
        unit: String,
        description: String,
    ) -> Self {
        InstrumentId {
            scope,
            name,
            kind,
            number,
            unit,
            description,
        }
    }

    #[inline]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> InstrumentKind {
        self.kind
    }

    #[inline]
    pub fn number(&self) -> NumberKind {
        self.number
    }

    #[inline]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}, {}>", self.name, self.kind, self.number)?;
        if !self.unit.is_empty() {
            write!(f, "[{}]", self.unit)?;
        }
        if !self.description.is_empty() {
            write!(f, " {:?}", self.description)?;
        }
        Ok(())
    }
}

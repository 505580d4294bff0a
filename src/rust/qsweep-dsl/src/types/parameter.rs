// Copyright 2026 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use crate::types::{ParameterUid, Unit};
use crate::{Error, Result};

/// Handle to a physical parameter: identity, display name, unit and numeric
/// domain. Current values are owned by the parameter store, not the handle.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub uid: ParameterUid,
    pub name: String,
    pub unit: Unit,
    min: f64,
    max: f64,
}

impl Parameter {
    pub fn new(uid: impl Into<ParameterUid>, name: &str, unit: Unit) -> Self {
        Parameter {
            uid: uid.into(),
            name: name.to_string(),
            unit,
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }

    pub fn with_domain(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Checks a prospective value against the parameter's domain.
    pub fn check(&self, value: f64) -> Result<()> {
        if !value.is_finite() || value < self.min || value > self.max {
            return Err(Error::DomainViolation {
                name: self.name.clone(),
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

// Copyright 2026 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use qsweep_units::RegisterMapper;

use crate::channel::RegisterBinding;
use crate::types::Parameter;
use crate::{Error, Result};

fn check_common_unit(parameters: &[Parameter]) -> Result<()> {
    if parameters.is_empty() {
        return Err(Error::EmptySweep);
    }
    let unit = parameters[0].unit;
    if parameters.iter().any(|p| p.unit != unit) {
        let mut units: Vec<String> = parameters.iter().map(|p| p.unit.to_string()).collect();
        units.sort();
        units.dedup();
        return Err(Error::UnitMismatch { units });
    }
    Ok(())
}

/// A parameter variation the host performs by re-setting values and
/// re-running the device program.
///
/// One sweep may drive several parameters in lockstep; they must share a
/// unit. The unit check runs before any value list is computed.
#[derive(Debug, Clone, PartialEq)]
pub struct SoftwareSweep {
    pub parameters: Vec<Parameter>,
    pub values: Vec<f64>,
}

impl SoftwareSweep {
    /// A sweep over an explicit, ordered value list.
    pub fn from_values(parameters: Vec<Parameter>, values: Vec<f64>) -> Result<Self> {
        check_common_unit(&parameters)?;
        if values.is_empty() {
            return Err(Error::EmptyValues);
        }
        Ok(SoftwareSweep { parameters, values })
    }

    /// A sweep over `count` linearly spaced values from `start` to `stop`,
    /// both inclusive.
    pub fn linspace(parameters: Vec<Parameter>, start: f64, stop: f64, count: u32) -> Result<Self> {
        check_common_unit(&parameters)?;
        if count == 0 {
            return Err(Error::EmptyValues);
        }
        let values = if count == 1 {
            vec![start]
        } else {
            let step = (stop - start) / f64::from(count - 1);
            (0..count).map(|k| start + f64::from(k) * step).collect()
        };
        Ok(SoftwareSweep { parameters, values })
    }

    /// Drops the first generated value.
    pub fn skip_first(mut self) -> Self {
        if !self.values.is_empty() {
            self.values.remove(0);
        }
        self
    }

    /// Drops the last generated value.
    pub fn skip_last(mut self) -> Self {
        self.values.pop();
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A parameter variation the device performs itself, by incrementing a
/// register inside one program run.
///
/// The descriptor stays in physical units; [`HardwareSweep::resolve`] turns
/// it into exact register codes against the parameter's register mapper.
#[derive(Debug, Clone, PartialEq)]
pub struct HardwareSweep {
    pub parameter: Parameter,
    pub start: f64,
    pub stop: f64,
    pub count: u32,
    skip_first: bool,
    skip_last: bool,
}

impl HardwareSweep {
    pub fn new(parameter: Parameter, start: f64, stop: f64, count: u32) -> Result<Self> {
        if count < 2 {
            return Err(Error::BadSweepCount { count });
        }
        Ok(HardwareSweep {
            parameter,
            start,
            stop,
            count,
            skip_first: false,
            skip_last: false,
        })
    }

    pub fn with_skip_first(mut self) -> Self {
        self.skip_first = true;
        self
    }

    pub fn with_skip_last(mut self) -> Self {
        self.skip_last = true;
        self
    }

    /// Quantizes the sweep boundaries into register codes.
    ///
    /// The device realizes the sweep as `start + k * step` in exact integer
    /// arithmetic; the returned value list is recovered from those codes so
    /// the reported coordinates are exactly what the hardware produces.
    pub fn resolve(
        &self,
        binding: RegisterBinding,
        mapper: &RegisterMapper,
    ) -> Result<ResolvedHardwareSweep> {
        let first = mapper.float_to_int(self.start)?;
        let step_int = mapper.step_code(self.start, self.stop, self.count)?;
        let mut codes: Vec<i64> = (0..i64::from(self.count))
            .map(|k| first + k * step_int)
            .collect();
        for &code in &codes {
            mapper.ensure_in_range(code)?;
        }
        if self.skip_first {
            codes.remove(0);
        }
        if self.skip_last {
            codes.pop();
        }
        if codes.is_empty() {
            return Err(Error::EmptyValues);
        }
        let values: Vec<f64> = codes.iter().map(|&code| mapper.int_to_float(code)).collect();
        Ok(ResolvedHardwareSweep {
            parameter: self.parameter.clone(),
            binding,
            step_int,
            codes,
            values,
        })
    }
}

/// A hardware sweep with its register arithmetic fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedHardwareSweep {
    pub parameter: Parameter,
    pub binding: RegisterBinding,
    pub step_int: i64,
    /// Register codes the device will step through, after skip trimming.
    pub codes: Vec<i64>,
    /// Physical values realized by `codes`, same length and order.
    pub values: Vec<f64>,
}

impl ResolvedHardwareSweep {
    pub fn start_int(&self) -> i64 {
        self.codes[0]
    }

    pub fn stop_int(&self) -> i64 {
        self.codes[self.codes.len() - 1]
    }

    pub fn count(&self) -> usize {
        self.codes.len()
    }
}

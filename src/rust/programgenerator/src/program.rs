// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use qsweep_dsl::{ChannelIndex, Parameter};

use crate::directive::Directive;
use crate::{Error, Result};

/// Host-side knobs of a built program.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramOptions {
    /// Hardware repetitions averaged on the board.
    pub reps: u32,
    /// Timeline headroom before the loops start, seconds.
    pub initial_delay: f64,
    /// Delay appended after the last readout of each shot, seconds.
    pub final_delay: f64,
    /// Execution pause at the end of each shot, seconds.
    pub final_wait: f64,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        ProgramOptions {
            reps: 1000,
            initial_delay: 1e-6,
            final_delay: 1e-6,
            final_wait: 0.0,
        }
    }
}

impl ProgramOptions {
    pub fn validate(&self) -> Result<()> {
        if self.reps == 0 {
            return Err(Error::InvalidOptions {
                reason: "reps must be at least 1".to_string(),
            });
        }
        for (name, value) in [
            ("initial_delay", self.initial_delay),
            ("final_delay", self.final_delay),
            ("final_wait", self.final_wait),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidOptions {
                    reason: format!("{name} must be finite and non-negative, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Per-channel acquisition multiplicity of one shot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadoutShape {
    pub channel: ChannelIndex,
    pub reads_per_shot: u32,
}

/// One hardware sweep axis of a built program, in build order.
///
/// `values` are the physical values the register walk realizes, after skip
/// trimming; their length is the axis sample count.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepAxis {
    pub parameter: Parameter,
    pub values: Vec<f64>,
}

/// A hardware-executable program for one combination of software-sweep
/// values. Built, executed once, discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltProgram {
    pub directives: Vec<Directive>,
    pub reps: u32,
    pub initial_delay_cycles: i64,
    pub final_delay_cycles: i64,
    pub final_wait_cycles: i64,
    pub readout_shape: Vec<ReadoutShape>,
    /// Axes in build order (reverse of declaration order). The last axis is
    /// the innermost loop and varies fastest in the flattened sample stream.
    pub sweep_axes: Vec<SweepAxis>,
}

impl BuiltProgram {
    /// Number of sample points one rep produces per read, the product of all
    /// axis lengths.
    pub fn points_per_read(&self) -> usize {
        self.sweep_axes.iter().map(|axis| axis.values.len()).product()
    }

    /// Total acquisitions per shot across all readout channels.
    pub fn reads_per_shot_total(&self) -> u32 {
        self.readout_shape.iter().map(|shape| shape.reads_per_shot).sum()
    }
}

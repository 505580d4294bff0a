// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use num_complex::Complex64;

use programgenerator::{BuiltProgram, Directive};
use qsweep_dsl::{ChannelIndex, Parameter};

use crate::driver::Driver;
use crate::{Error, Result};

/// Flattened coordinate grid of one hardware sweep axis.
///
/// `grid` pairs index-for-index with the flattened sample stream: entry `k`
/// is this axis's physical value at sample point `k`.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisCoordinates {
    pub parameter: Parameter,
    pub grid: Vec<f64>,
}

/// Averaged complex samples of one readout channel, split per read.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSamples {
    pub channel: ChannelIndex,
    /// One value list per acquisition of the shot; each list has one entry
    /// per hardware sample point.
    pub reads: Vec<Vec<Complex64>>,
}

/// Output of one hardware execution: samples plus the coordinate grid of
/// every hardware sweep axis, in build order.
#[derive(Debug, Clone, PartialEq)]
pub struct HardwareResult {
    pub readouts: Vec<ChannelSamples>,
    pub axes: Vec<AxisCoordinates>,
    /// Sample points per read, the product of all axis lengths.
    pub points: usize,
}

/// Replays the program onto the driver and blocks on the acquisition.
///
/// Driver errors propagate unchanged; no retry happens at this layer. A
/// mismatch between the program's declared readout shape and the returned
/// blocks aborts with a shape error rather than truncating data.
pub fn acquire(
    driver: &mut impl Driver,
    program: &BuiltProgram,
    soft_avgs: u32,
    progress: bool,
) -> Result<HardwareResult> {
    driver
        .configure_timeline(
            program.initial_delay_cycles,
            program.final_delay_cycles,
            program.final_wait_cycles,
        )
        .map_err(Error::Device)?;
    for directive in &program.directives {
        match directive {
            Directive::DeclareGenerator(d) => driver.declare_generator(d),
            Directive::DeclareReadout(d) => driver.declare_readout(d),
            Directive::ConfigureReadout(d) => driver.configure_readout(d),
            Directive::ConfigurePulse(d) => driver.configure_pulse(d),
            Directive::RegisterSweep(d) => driver.add_register_sweep(d),
            Directive::Settle(d) => driver.settle(d),
            Directive::SchedulePulse(d) => driver.schedule_pulse(d),
            Directive::ScheduleTrigger(d) => driver.schedule_trigger(d),
            Directive::Advance(d) => driver.advance(d),
        }
        .map_err(Error::Device)?;
    }

    let blocks = driver
        .acquire(program.reps, soft_avgs, progress)
        .map_err(Error::Device)?;

    let points = program.points_per_read();
    if blocks.len() != program.readout_shape.len() {
        return Err(Error::ReadoutCountMismatch {
            expected: program.readout_shape.len(),
            actual: blocks.len(),
        });
    }

    let mut readouts = Vec::with_capacity(blocks.len());
    for (block, shape) in blocks.iter().zip(&program.readout_shape) {
        if block.channel != shape.channel {
            return Err(Error::MissingReadoutBlock {
                channel: shape.channel,
            });
        }
        let expected = shape.reads_per_shot as usize * points;
        if block.iq.len() != expected {
            return Err(Error::ShapeMismatch {
                channel: block.channel,
                expected,
                actual: block.iq.len(),
            });
        }
        let reads = block
            .iq
            .chunks_exact(points)
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|&[i, q]| Complex64::new(i, q))
                    .collect::<Vec<_>>()
            })
            .collect();
        readouts.push(ChannelSamples {
            channel: block.channel,
            reads,
        });
    }

    let lengths: Vec<usize> = program
        .sweep_axes
        .iter()
        .map(|axis| axis.values.len())
        .collect();
    let axes = program
        .sweep_axes
        .iter()
        .enumerate()
        .map(|(index, axis)| AxisCoordinates {
            parameter: axis.parameter.clone(),
            grid: mesh_column(&lengths, &axis.values, index),
        })
        .collect();

    Ok(HardwareResult {
        readouts,
        axes,
        points,
    })
}

/// Row-major outer-product mesh: axis `index`'s value at every flattened
/// sample point. The last axis varies fastest, matching the device's loop
/// nesting.
fn mesh_column(lengths: &[usize], values: &[f64], index: usize) -> Vec<f64> {
    let before: usize = lengths[..index].iter().product();
    let after: usize = lengths[index + 1..].iter().product();
    let mut grid = Vec::with_capacity(before * values.len() * after);
    for _ in 0..before {
        for value in values {
            for _ in 0..after {
                grid.push(*value);
            }
        }
    }
    grid
}

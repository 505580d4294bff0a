// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use programgenerator::{build, resolve_sweeps, ProgramOptions};
use qsweep_dsl::{
    FirmwareConfig, HardwareSweep, Parameter, ParameterStore, Protocol, SoftwareSweep, Unit,
};

use crate::driver::Driver;
use crate::result::{assemble_block, data_columns, DataColumn};
use crate::session::MeasurementSession;
use crate::{executor, Error, Result};

/// Knobs of one experiment run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub program: ProgramOptions,
    /// Repeat-and-average count performed by re-invoking the built program
    /// without rebuilding it.
    pub soft_avgs: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            program: ProgramOptions::default(),
            soft_avgs: 1,
        }
    }
}

impl RunOptions {
    fn validate(&self) -> Result<()> {
        if self.soft_avgs == 0 {
            return Err(Error::InvalidOptions {
                reason: "soft_avgs must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// What a run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Result blocks appended to the session, one per software-sweep point.
    pub blocks: usize,
    /// Rows per block, the product of all hardware axis lengths.
    pub points_per_block: usize,
    pub data_columns: usize,
    /// `blocks * points_per_block * data_columns`.
    pub total_samples: usize,
}

/// Runs a protocol over the Cartesian product of all software sweeps, with
/// the hardware sweeps folded into every built program.
///
/// Software combinations are visited in declaration order, first-declared
/// sweep outermost. Each iteration re-sets the swept parameters, rebuilds
/// the program, executes it, and appends one result block. Errors surface
/// immediately: blocks already appended stay appended, and parameter values
/// set by earlier iterations are not rolled back.
#[allow(clippy::too_many_arguments)]
pub fn run<D: Driver, S: MeasurementSession>(
    driver: &mut D,
    session: &mut S,
    protocol: &Protocol,
    store: &mut ParameterStore,
    firmware: &FirmwareConfig,
    software_sweeps: &[SoftwareSweep],
    hardware_sweeps: &[HardwareSweep],
    options: &RunOptions,
) -> Result<RunSummary> {
    options.validate()?;
    for sweep in software_sweeps {
        if sweep.is_empty() {
            return Err(Error::Dsl(qsweep_dsl::Error::EmptyValues));
        }
    }
    // Quantize hardware sweeps now: an unbound parameter or an overflowing
    // step must fail before any device I/O.
    let resolved = resolve_sweeps(protocol, firmware, hardware_sweeps)?;

    let outcome = (|| {
        let mut setpoints: Vec<String> = Vec::new();
        for sweep in software_sweeps {
            for parameter in &sweep.parameters {
                store.set(parameter, sweep.values[0])?;
                store.claim_for_sweep(parameter)?;
                session
                    .register_column(&parameter.name, parameter.unit, &[])
                    .map_err(Error::Session)?;
                setpoints.push(parameter.name.clone());
            }
        }
        for sweep in &resolved {
            store.set(&sweep.parameter, sweep.values[0])?;
            store.claim_for_sweep(&sweep.parameter)?;
            session
                .register_column(&sweep.parameter.name, sweep.parameter.unit, &[])
                .map_err(Error::Session)?;
            setpoints.push(sweep.parameter.name.clone());
        }

        // Discovery build: learn the readout shape without running anything.
        let discovery = build(protocol, store, firmware, &[], &options.program)?;
        if discovery.reads_per_shot_total() == 0 {
            return Err(Error::EmptyReadout);
        }
        let columns = data_columns(&discovery.readout_shape);
        for column in &columns {
            session
                .register_column(&column.name, Unit::Dimensionless, &setpoints)
                .map_err(Error::Session)?;
        }

        sweep_loop(
            driver,
            session,
            protocol,
            store,
            firmware,
            software_sweeps,
            hardware_sweeps,
            options,
            &columns,
        )
    })();
    store.release_sweeps();
    outcome
}

#[allow(clippy::too_many_arguments)]
fn sweep_loop<D: Driver, S: MeasurementSession>(
    driver: &mut D,
    session: &mut S,
    protocol: &Protocol,
    store: &mut ParameterStore,
    firmware: &FirmwareConfig,
    software_sweeps: &[SoftwareSweep],
    hardware_sweeps: &[HardwareSweep],
    options: &RunOptions,
    columns: &[DataColumn],
) -> Result<RunSummary> {
    if software_sweeps.is_empty() {
        let program = build(protocol, store, firmware, hardware_sweeps, &options.program)?;
        let hardware = executor::acquire(driver, &program, options.soft_avgs, true)?;
        let block = assemble_block(&[], &hardware, columns)?;
        session.append_row(&block).map_err(Error::Session)?;
        return Ok(RunSummary {
            blocks: 1,
            points_per_block: hardware.points,
            data_columns: columns.len(),
            total_samples: hardware.points * columns.len(),
        });
    }

    let value_lists: Vec<Vec<f64>> = software_sweeps
        .iter()
        .map(|sweep| sweep.values.clone())
        .collect();
    let total: usize = value_lists.iter().map(Vec::len).product();
    let mut blocks = 0usize;
    let mut points_per_block = 0usize;
    for (iteration, combination) in CartesianProduct::new(value_lists).enumerate() {
        qsweep_log::progress!("software sweep point {}/{}", iteration + 1, total);
        let mut coordinates: Vec<(Parameter, f64)> = Vec::new();
        for (sweep, &value) in software_sweeps.iter().zip(&combination) {
            for parameter in &sweep.parameters {
                store.set(parameter, value)?;
                coordinates.push((parameter.clone(), value));
            }
        }
        let program = build(protocol, store, firmware, hardware_sweeps, &options.program)?;
        let hardware = executor::acquire(driver, &program, options.soft_avgs, false)?;
        let block = assemble_block(&coordinates, &hardware, columns)?;
        session.append_row(&block).map_err(Error::Session)?;
        blocks += 1;
        points_per_block = hardware.points;
    }
    Ok(RunSummary {
        blocks,
        points_per_block,
        data_columns: columns.len(),
        total_samples: blocks * points_per_block * columns.len(),
    })
}

/// Iterates the Cartesian product of the value lists in declaration order:
/// the first list is the outermost loop, the last list varies fastest.
struct CartesianProduct {
    lists: Vec<Vec<f64>>,
    index: Vec<usize>,
    done: bool,
}

impl CartesianProduct {
    fn new(lists: Vec<Vec<f64>>) -> Self {
        let done = lists.is_empty() || lists.iter().any(Vec::is_empty);
        let index = vec![0; lists.len()];
        CartesianProduct { lists, index, done }
    }
}

impl Iterator for CartesianProduct {
    type Item = Vec<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item: Vec<f64> = self
            .index
            .iter()
            .zip(&self.lists)
            .map(|(&position, list)| list[position])
            .collect();
        // odometer increment, rightmost digit fastest
        for position in (0..self.lists.len()).rev() {
            self.index[position] += 1;
            if self.index[position] < self.lists[position].len() {
                return Some(item);
            }
            self.index[position] = 0;
        }
        self.done = true;
        Some(item)
    }
}

// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use indexmap::IndexMap;
use numeric_array::NumericArray;

use programgenerator::ReadoutShape;
use qsweep_dsl::{ChannelIndex, Parameter};

use crate::executor::HardwareResult;
use crate::{Error, Result};

/// One acquired data column: a (readout channel, read index) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataColumn {
    pub name: String,
    pub channel: ChannelIndex,
    pub read_index: u32,
}

/// Data column names for a readout shape.
///
/// The base name is `iq`; the read index is appended when a channel
/// acquires more than once per shot, and the channel number when more than
/// one readout channel participates.
pub fn data_columns(shape: &[ReadoutShape]) -> Vec<DataColumn> {
    let multi_channel = shape.len() > 1;
    let mut columns = Vec::new();
    for entry in shape {
        for read_index in 0..entry.reads_per_shot {
            let mut name = "iq".to_string();
            if entry.reads_per_shot > 1 {
                name.push_str(&read_index.to_string());
            }
            if multi_channel {
                name.push_str(&format!("_ch{}", entry.channel));
            }
            columns.push(DataColumn {
                name,
                channel: entry.channel,
                read_index,
            });
        }
    }
    columns
}

/// One assembled result block: column name to value array, all arrays of
/// equal length (the number of hardware sample points).
///
/// Column order is fixed: software coordinate columns in sweep declaration
/// order, hardware coordinate columns in build order, then the data columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultBlock {
    pub columns: IndexMap<String, NumericArray>,
}

impl ResultBlock {
    /// Rows in this block, one per hardware sample point.
    pub fn rows(&self) -> usize {
        self.columns.first().map_or(0, |(_, array)| array.len())
    }
}

/// Folds one hardware result into a column block.
///
/// Every software coordinate is broadcast across all hardware sample points;
/// hardware coordinates come in as flattened meshes already aligned with the
/// sample stream. Complex samples stay complex.
pub fn assemble_block(
    software_coordinates: &[(Parameter, f64)],
    hardware: &HardwareResult,
    columns: &[DataColumn],
) -> Result<ResultBlock> {
    let mut block = ResultBlock::default();
    for (parameter, value) in software_coordinates {
        block.columns.insert(
            parameter.name.clone(),
            NumericArray::broadcast_float(*value, hardware.points),
        );
    }
    for axis in &hardware.axes {
        block
            .columns
            .insert(axis.parameter.name.clone(), axis.grid.clone().into());
    }
    for column in columns {
        let samples = hardware
            .readouts
            .iter()
            .find(|readout| readout.channel == column.channel)
            .ok_or(Error::MissingReadoutBlock {
                channel: column.channel,
            })?;
        let read = samples
            .reads
            .get(column.read_index as usize)
            .ok_or(Error::ShapeMismatch {
                channel: column.channel,
                expected: column.read_index as usize + 1,
                actual: samples.reads.len(),
            })?;
        block
            .columns
            .insert(column.name.clone(), read.clone().into());
    }
    Ok(block)
}

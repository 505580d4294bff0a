// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use anyhow::anyhow;
use indexmap::IndexMap;
use numeric_array::NumericArray;

use qsweep_dsl::Unit;

use crate::result::ResultBlock;

/// The measurement-session collaborator: column registration and row
/// persistence. Layout of the persisted data is entirely the session's
/// responsibility.
pub trait MeasurementSession {
    /// Announces a column before any data arrives. `setpoint_columns` names
    /// the coordinate columns a data column is indexed by; empty for the
    /// coordinate columns themselves.
    fn register_column(
        &mut self,
        name: &str,
        unit: Unit,
        setpoint_columns: &[String],
    ) -> anyhow::Result<()>;

    /// Appends one result block, all columns at once.
    fn append_row(&mut self, block: &ResultBlock) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub unit: Unit,
    pub setpoints: Vec<String>,
}

/// A session that accumulates everything in memory. The reference
/// implementation for tests and for callers that post-process results
/// themselves instead of persisting them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InMemorySession {
    specs: IndexMap<String, ColumnSpec>,
    data: IndexMap<String, NumericArray>,
}

impl InMemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column_names(&self) -> Vec<&String> {
        self.specs.keys().collect()
    }

    pub fn spec(&self, name: &str) -> Option<&ColumnSpec> {
        self.specs.get(name)
    }

    /// Accumulated values of a column across all appended blocks.
    pub fn column(&self, name: &str) -> Option<&NumericArray> {
        self.data.get(name)
    }

    /// Rows accumulated so far, taken from the first data column.
    pub fn rows(&self) -> usize {
        self.data.first().map_or(0, |(_, array)| array.len())
    }
}

impl MeasurementSession for InMemorySession {
    fn register_column(
        &mut self,
        name: &str,
        unit: Unit,
        setpoint_columns: &[String],
    ) -> anyhow::Result<()> {
        if self.specs.contains_key(name) {
            return Err(anyhow!("column '{name}' registered twice"));
        }
        self.specs.insert(
            name.to_string(),
            ColumnSpec {
                unit,
                setpoints: setpoint_columns.to_vec(),
            },
        );
        Ok(())
    }

    fn append_row(&mut self, block: &ResultBlock) -> anyhow::Result<()> {
        for (name, values) in &block.columns {
            if !self.specs.contains_key(name) {
                return Err(anyhow!("column '{name}' was never registered"));
            }
            match self.data.get_mut(name) {
                Some(existing) => existing
                    .try_extend(values)
                    .map_err(|err| anyhow!("column '{name}': {err}"))?,
                None => {
                    self.data.insert(name.clone(), values.clone());
                }
            }
        }
        Ok(())
    }
}

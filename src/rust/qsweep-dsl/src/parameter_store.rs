// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use crate::types::{Parameter, ParameterUid};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    parameter: Parameter,
    value: f64,
    swept: bool,
}

/// Current values of every physical parameter of an experiment.
///
/// The store is the single owner of parameter state: the orchestrator writes
/// it, the program builder reads it. Whether a parameter is currently swept
/// is a plain query against this side table; parameters never register
/// themselves anywhere.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterStore {
    entries: HashMap<ParameterUid, Entry>,
}

impl ParameterStore {
    /// Current value of a parameter, if it has an entry.
    pub fn get(&self, uid: ParameterUid) -> Option<f64> {
        self.entries.get(&uid).map(|entry| entry.value)
    }

    /// Current value of a parameter; missing entries are an error named
    /// after the handle.
    pub fn require(&self, parameter: &Parameter) -> Result<f64> {
        self.get(parameter.uid).ok_or_else(|| Error::UnknownParameter {
            name: parameter.name.clone(),
        })
    }

    /// Sets a parameter, enforcing its numeric domain.
    pub fn set(&mut self, parameter: &Parameter, value: f64) -> Result<()> {
        parameter.check(value)?;
        let entry = self
            .entries
            .entry(parameter.uid)
            .or_insert_with(|| Entry {
                parameter: parameter.clone(),
                value,
                swept: false,
            });
        entry.value = value;
        Ok(())
    }

    /// Claims a parameter for a sweep. Fails if another sweep already holds
    /// it; two sweeps driving one register would race.
    pub fn claim_for_sweep(&mut self, parameter: &Parameter) -> Result<()> {
        let entry = self
            .entries
            .get_mut(&parameter.uid)
            .ok_or_else(|| Error::UnknownParameter {
                name: parameter.name.clone(),
            })?;
        if entry.swept {
            return Err(Error::AlreadySwept {
                name: parameter.name.clone(),
            });
        }
        entry.swept = true;
        Ok(())
    }

    /// Whether a parameter is currently claimed by a sweep.
    pub fn is_swept(&self, uid: ParameterUid) -> bool {
        self.entries.get(&uid).is_some_and(|entry| entry.swept)
    }

    /// Releases all sweep claims, leaving values in place.
    pub fn release_sweeps(&mut self) {
        for entry in self.entries.values_mut() {
            entry.swept = false;
        }
    }
}

#[derive(Default)]
pub struct ParameterStoreBuilder {
    entries: Vec<(Parameter, f64)>,
}

impl ParameterStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(mut self, parameter: Parameter, initial: f64) -> Self {
        self.entries.push((parameter, initial));
        self
    }

    /// Builds the store, validating every initial value against its domain.
    pub fn build(self) -> Result<ParameterStore> {
        let mut store = ParameterStore::default();
        for (parameter, initial) in self.entries {
            store.set(&parameter, initial)?;
        }
        Ok(store)
    }
}

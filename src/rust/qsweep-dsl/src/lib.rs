// Copyright 2026 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Vocabulary for describing sweep experiments on pulse-sequencing boards:
//! channels, parameters, sweep descriptors, instructions and protocols.

pub mod channel;
pub mod firmware;
pub mod instruction;
pub mod parameter_store;
pub mod protocol;
pub mod types;

pub use channel::{
    ChannelIndex, GeneratorChannel, GeneratorRegister, NyquistZone, ReadoutChannel, ReadoutStyle,
    RegisterBinding,
};
pub use firmware::FirmwareConfig;
pub use instruction::{Delay, Instruction, PlayPulse, PulseStyle, TimeSpec, Trigger};
pub use parameter_store::{ParameterStore, ParameterStoreBuilder};
pub use protocol::{Protocol, SweepTarget};
pub use types::{HardwareSweep, Parameter, ParameterUid, ResolvedHardwareSweep, SoftwareSweep, Unit};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("software sweep mixes parameter units: {units:?}")]
    UnitMismatch { units: Vec<String> },
    #[error("sweep declared over no parameters")]
    EmptySweep,
    #[error("sweep value list is empty")]
    EmptyValues,
    #[error("hardware sweep needs at least two points, got {count}")]
    BadSweepCount { count: u32 },
    #[error("value {value} for parameter '{name}' is outside [{min}, {max}]")]
    DomainViolation {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("parameter '{name}' has no entry in the parameter store")]
    UnknownParameter { name: String },
    #[error("parameter '{name}' is already claimed by another sweep")]
    AlreadySwept { name: String },
    #[error("parameter '{name}' has unit {actual}, expected {expected}")]
    WrongUnit {
        name: String,
        expected: Unit,
        actual: Unit,
    },
    #[error("unknown generator channel {channel}")]
    UnknownGenerator { channel: ChannelIndex },
    #[error("unknown readout channel {channel}")]
    UnknownReadout { channel: ChannelIndex },
    #[error("no register binding for hardware sweep over '{name}'")]
    NoRegisterBinding { name: String },
    #[error("invalid firmware description: {reason}")]
    InvalidFirmware { reason: String },
    #[error("cannot parse firmware description")]
    FirmwareParse(#[from] serde_json::Error),
    #[error(transparent)]
    Units(#[from] qsweep_units::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Runs sweep experiments: replays built programs onto the device driver,
//! iterates software sweeps, and folds raw samples into coordinate-indexed
//! result blocks for the measurement session.

pub mod driver;
pub mod executor;
pub mod orchestrator;
pub mod result;
pub mod session;

pub use driver::{Driver, ReadoutBlock};
pub use executor::{AxisCoordinates, ChannelSamples, HardwareResult};
pub use orchestrator::{run, RunOptions, RunSummary};
pub use result::{DataColumn, ResultBlock};
pub use session::{InMemorySession, MeasurementSession};

use qsweep_dsl::ChannelIndex;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid run options: {reason}")]
    InvalidOptions { reason: String },
    #[error("protocol declares no readout acquisitions")]
    EmptyReadout,
    #[error("device returned {actual} readout blocks, expected {expected}")]
    ReadoutCountMismatch { expected: usize, actual: usize },
    #[error("readout channel {channel} returned {actual} samples, expected {expected}")]
    ShapeMismatch {
        channel: ChannelIndex,
        expected: usize,
        actual: usize,
    },
    #[error("no sample block for readout channel {channel}")]
    MissingReadoutBlock { channel: ChannelIndex },
    #[error("device error")]
    Device(#[source] anyhow::Error),
    #[error("measurement session error")]
    Session(#[source] anyhow::Error),
    #[error(transparent)]
    Program(#[from] programgenerator::Error),
    #[error(transparent)]
    Dsl(#[from] qsweep_dsl::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
pub(crate) mod test_support;

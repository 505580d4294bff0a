// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Turns a protocol plus hardware sweeps into a device-executable program:
//! channel declarations, pulse configuration with integer register codes,
//! register-increment loop directives and body scheduling.

pub mod directive;
pub mod generate;
pub mod program;

pub use directive::{
    Advance, ConfigurePulse, ConfigureReadout, DeclareGenerator, DeclareReadout, Directive,
    RegisterSweep, SchedulePulse, ScheduleTrigger, Settle,
};
pub use generate::{build, resolve_sweeps};
pub use program::{BuiltProgram, ProgramOptions, ReadoutShape, SweepAxis};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid program options: {reason}")]
    InvalidOptions { reason: String },
    #[error(transparent)]
    Dsl(#[from] qsweep_dsl::Error),
    #[error(transparent)]
    Units(#[from] qsweep_units::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

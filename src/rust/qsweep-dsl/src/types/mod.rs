// Copyright 2026 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

mod parameter;
mod sweep;
mod uid;
mod unit;

pub use parameter::Parameter;
pub use sweep::{HardwareSweep, ResolvedHardwareSweep, SoftwareSweep};
pub use uid::ParameterUid;
pub use unit::Unit;

// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use programgenerator::{
    Advance, ConfigurePulse, ConfigureReadout, DeclareGenerator, DeclareReadout, RegisterSweep,
    SchedulePulse, ScheduleTrigger, Settle,
};
use qsweep_dsl::ChannelIndex;

/// Raw samples of one readout channel, as the driver hands them back.
///
/// `iq` holds averaged in-phase/quadrature pairs, flattened as
/// `[read_index][sweep points]` with the innermost sweep axis varying
/// fastest. Length must be `reads_per_shot * points_per_read`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadoutBlock {
    pub channel: ChannelIndex,
    pub iq: Vec<[f64; 2]>,
}

/// The low-level device driver.
///
/// The execution engine replays a built program onto these methods and then
/// issues one blocking [`Driver::acquire`]. Every numeric argument crossing
/// this boundary is a device-native integer; physical-unit conversion
/// happens strictly on the caller's side.
///
/// `acquire` blocks until `reps` hardware repetitions have been averaged,
/// `soft_avgs` times over, re-running the already-loaded program without any
/// host-side rebuild between the repeats. There is no cancellation: the call
/// returns or the driver times out internally. `progress` is advisory only.
pub trait Driver {
    fn configure_timeline(
        &mut self,
        initial_delay_cycles: i64,
        final_delay_cycles: i64,
        final_wait_cycles: i64,
    ) -> anyhow::Result<()>;

    fn declare_generator(&mut self, directive: &DeclareGenerator) -> anyhow::Result<()>;

    fn declare_readout(&mut self, directive: &DeclareReadout) -> anyhow::Result<()>;

    fn configure_readout(&mut self, directive: &ConfigureReadout) -> anyhow::Result<()>;

    fn configure_pulse(&mut self, directive: &ConfigurePulse) -> anyhow::Result<()>;

    fn add_register_sweep(&mut self, directive: &RegisterSweep) -> anyhow::Result<()>;

    fn settle(&mut self, directive: &Settle) -> anyhow::Result<()>;

    fn schedule_pulse(&mut self, directive: &SchedulePulse) -> anyhow::Result<()>;

    fn schedule_trigger(&mut self, directive: &ScheduleTrigger) -> anyhow::Result<()>;

    fn advance(&mut self, directive: &Advance) -> anyhow::Result<()>;

    fn acquire(
        &mut self,
        reps: u32,
        soft_avgs: u32,
        progress: bool,
    ) -> anyhow::Result<Vec<ReadoutBlock>>;
}

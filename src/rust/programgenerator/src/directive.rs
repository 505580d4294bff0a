// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use qsweep_dsl::{ChannelIndex, PulseStyle, RegisterBinding};

/// Declare a generator channel with its Nyquist zone.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclareGenerator {
    pub channel: ChannelIndex,
    pub nyquist_zone: u8,
}

/// Declare a readout channel with its window and downconversion frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclareReadout {
    pub channel: ChannelIndex,
    /// Acquisition window in readout fabric cycles.
    pub length_cycles: i64,
    pub frequency_code: i64,
    pub matching_generator: Option<ChannelIndex>,
}

/// Configure a sequenced readout from within the program.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigureReadout {
    pub channel: ChannelIndex,
    pub frequency_code: i64,
}

/// Load the pulse registers of a generator channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurePulse {
    pub channel: ChannelIndex,
    pub style: PulseStyle,
    pub frequency_code: i64,
    pub phase_code: i64,
    pub gain_code: i64,
    /// Combined envelope-length / control-bit code.
    pub mode_code: i64,
}

/// Attach a register-increment loop to the program.
///
/// Each attached sweep nests inside the previously attached one; the sweep
/// attached last is the innermost loop.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterSweep {
    pub binding: RegisterBinding,
    pub start: i64,
    pub step: i64,
    pub count: u32,
}

/// Pause after configuration so downstream processing catches up before the
/// loop body starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Settle {
    pub cycles: i64,
}

/// Fire the configured pulse on a generator channel.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulePulse {
    pub channel: ChannelIndex,
    /// Shot-relative start in timing-processor cycles; `None` schedules at
    /// the end of the previous pulse on the channel.
    pub t_cycles: Option<i64>,
}

/// Open the readout window(s), optionally firing the probe pulse with them.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleTrigger {
    pub readouts: Vec<ChannelIndex>,
    pub generator: Option<ChannelIndex>,
    pub trig_offset_cycles: i64,
    pub sync_delay_cycles: i64,
}

/// Advance the shot timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Advance {
    pub cycles: i64,
}

/// One entry of a built program. All numeric payloads are device-native
/// integers; physical-unit conversion happened before the directive was
/// emitted.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    DeclareGenerator(DeclareGenerator),
    DeclareReadout(DeclareReadout),
    ConfigureReadout(ConfigureReadout),
    ConfigurePulse(ConfigurePulse),
    RegisterSweep(RegisterSweep),
    Settle(Settle),
    SchedulePulse(SchedulePulse),
    ScheduleTrigger(ScheduleTrigger),
    Advance(Advance),
}

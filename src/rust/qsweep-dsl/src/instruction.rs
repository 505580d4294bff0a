// Copyright 2026 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use qsweep_units::PulseControl;

use crate::channel::ChannelIndex;
use crate::types::Parameter;

/// Envelope source of a generated pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PulseStyle {
    /// Rectangular envelope held for the programmed length.
    #[default]
    Const,
    /// Previously uploaded arbitrary envelope.
    Envelope,
}

/// When an instruction fires within the shot timeline.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeSpec {
    /// End of the previous pulse on the same channel.
    Auto,
    /// Explicit time in seconds, relative to the start of the shot.
    At(Parameter),
}

/// Play one pulse on a generator channel.
///
/// Every pulse quantity is a parameter handle so that any of them can later
/// be targeted by a sweep; values are resolved against the parameter store
/// when the program is built.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayPulse {
    pub generator: ChannelIndex,
    pub style: PulseStyle,
    pub control: PulseControl,
    /// Carrier frequency, Hz.
    pub frequency: Parameter,
    /// Carrier phase, degrees in [-180, 180).
    pub phase: Parameter,
    /// Amplitude as a fraction of DAC full scale.
    pub gain: Parameter,
    /// Envelope length, seconds.
    pub length: Parameter,
    pub t: TimeSpec,
}

/// Fire the readout window(s), optionally together with the probe pulse.
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub readouts: Vec<ChannelIndex>,
    pub generator: Option<ChannelIndex>,
    /// Delay between firing the pulse and opening the readout window,
    /// seconds of timing-processor time.
    pub trig_offset: Parameter,
    /// Pause appended after the readout before the next shot, seconds.
    pub sync_delay: Parameter,
}

/// Advance the shot timeline without touching any channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Delay {
    pub time: Parameter,
}

/// An atomic hardware action. Immutable once constructed; a protocol holds
/// an ordered sequence of them.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    PlayPulse(PlayPulse),
    Trigger(Trigger),
    Delay(Delay),
}

impl Instruction {
    /// Generator channels this instruction drives.
    pub fn generators(&self) -> Vec<ChannelIndex> {
        match self {
            Instruction::PlayPulse(pulse) => vec![pulse.generator],
            Instruction::Trigger(trigger) => trigger.generator.into_iter().collect(),
            Instruction::Delay(_) => Vec::new(),
        }
    }

    /// Readout channels this instruction fires.
    pub fn readouts(&self) -> Vec<ChannelIndex> {
        match self {
            Instruction::Trigger(trigger) => trigger.readouts.clone(),
            _ => Vec::new(),
        }
    }
}

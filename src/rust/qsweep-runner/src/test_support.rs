// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use anyhow::bail;
use indexmap::IndexMap;

use programgenerator::{
    Advance, ConfigurePulse, ConfigureReadout, DeclareGenerator, DeclareReadout, RegisterSweep,
    SchedulePulse, ScheduleTrigger, Settle,
};
use qsweep_dsl::{
    ChannelIndex, FirmwareConfig, GeneratorChannel, Instruction, Parameter, ParameterStore,
    ParameterStoreBuilder, PlayPulse, Protocol, PulseStyle, ReadoutChannel, TimeSpec, Trigger,
    Unit,
};
use qsweep_units::PulseControl;

use crate::driver::{Driver, ReadoutBlock};

const FIRMWARE_JSON: &str = r#"
{
    "timing_clock_mhz": 430.08,
    "generators": [
        {
            "sampling_mhz": 9830.4,
            "samples_per_cycle": 16,
            "frequency_bits": 32,
            "phase_bits": 32,
            "gain_bits": 16,
            "envelope_length_bits": 16
        }
    ],
    "readouts": [
        {
            "sampling_mhz": 2457.6,
            "samples_per_cycle": 8,
            "frequency_bits": 32
        },
        {
            "sampling_mhz": 2457.6,
            "samples_per_cycle": 8,
            "frequency_bits": 32
        }
    ]
}
"#;

pub(crate) struct Setup {
    pub protocol: Protocol,
    pub firmware: FirmwareConfig,
    pub store: ParameterStore,
    pub freq: Parameter,
    pub phase: Parameter,
    pub gain: Parameter,
}

/// A single-pulse transmission experiment against `readout_count` readout
/// channels, with every pulse parameter in the store.
pub(crate) fn transmission_setup(readout_count: usize) -> Setup {
    let freq = Parameter::new(10, "pulse_freq", Unit::Hertz);
    let phase = Parameter::new(11, "pulse_phase", Unit::Degree).with_domain(-180.0, 180.0);
    let gain = Parameter::new(12, "pulse_gain", Unit::Gain).with_domain(-1.0, 1.0);
    let length = Parameter::new(13, "pulse_length", Unit::Second);
    let trig_offset = Parameter::new(14, "adc_trig_offset", Unit::Second);
    let relax_delay = Parameter::new(15, "relax_delay", Unit::Second);

    let readouts: Vec<ChannelIndex> = (0..readout_count as u8).collect();
    let mut protocol = Protocol::new("transmission");
    protocol.add_generator(GeneratorChannel::new(0).with_matching_readout(0));
    for &channel in &readouts {
        let mut readout = ReadoutChannel::new(channel).with_lo_frequency(1.2e9);
        if channel == 0 {
            readout = readout.with_matching_generator(0);
        }
        protocol.add_readout(readout);
    }
    protocol.add_instruction(Instruction::PlayPulse(PlayPulse {
        generator: 0,
        style: PulseStyle::Const,
        control: PulseControl::default(),
        frequency: freq.clone(),
        phase: phase.clone(),
        gain: gain.clone(),
        length: length.clone(),
        t: TimeSpec::Auto,
    }));
    protocol.add_instruction(Instruction::Trigger(Trigger {
        readouts,
        generator: Some(0),
        trig_offset: trig_offset.clone(),
        sync_delay: relax_delay.clone(),
    }));

    let store = ParameterStoreBuilder::new()
        .with_parameter(freq.clone(), 1.2e9)
        .with_parameter(phase.clone(), 0.0)
        .with_parameter(gain.clone(), 0.5)
        .with_parameter(length, 10e-6)
        .with_parameter(trig_offset, 0.0)
        .with_parameter(relax_delay, 1e-3)
        .build()
        .unwrap();

    Setup {
        protocol,
        firmware: FirmwareConfig::from_json(FIRMWARE_JSON).unwrap(),
        store,
        freq,
        phase,
        gain,
    }
}

/// Driver double that tracks replayed directives and synthesizes sample
/// blocks matching the program it saw.
#[derive(Debug, Default)]
pub(crate) struct MockDriver {
    pub calls: Vec<&'static str>,
    pub acquire_calls: u32,
    /// Fail every acquire.
    pub fail_acquire: bool,
    /// Fail acquires after this many have succeeded.
    pub fail_after_acquires: Option<u32>,
    /// Pad every readout block with this many bogus samples.
    pub extra_samples: usize,
    pub sweep_counts: Vec<u32>,
    pub trigger_reads: IndexMap<ChannelIndex, u32>,
}

impl Driver for MockDriver {
    fn configure_timeline(
        &mut self,
        _initial_delay_cycles: i64,
        _final_delay_cycles: i64,
        _final_wait_cycles: i64,
    ) -> anyhow::Result<()> {
        // a new program replay starts here
        self.sweep_counts.clear();
        self.trigger_reads.clear();
        self.calls.push("configure_timeline");
        Ok(())
    }

    fn declare_generator(&mut self, _directive: &DeclareGenerator) -> anyhow::Result<()> {
        self.calls.push("declare_generator");
        Ok(())
    }

    fn declare_readout(&mut self, _directive: &DeclareReadout) -> anyhow::Result<()> {
        self.calls.push("declare_readout");
        Ok(())
    }

    fn configure_readout(&mut self, _directive: &ConfigureReadout) -> anyhow::Result<()> {
        self.calls.push("configure_readout");
        Ok(())
    }

    fn configure_pulse(&mut self, _directive: &ConfigurePulse) -> anyhow::Result<()> {
        self.calls.push("configure_pulse");
        Ok(())
    }

    fn add_register_sweep(&mut self, directive: &RegisterSweep) -> anyhow::Result<()> {
        self.calls.push("add_register_sweep");
        self.sweep_counts.push(directive.count);
        Ok(())
    }

    fn settle(&mut self, _directive: &Settle) -> anyhow::Result<()> {
        self.calls.push("settle");
        Ok(())
    }

    fn schedule_pulse(&mut self, _directive: &SchedulePulse) -> anyhow::Result<()> {
        self.calls.push("schedule_pulse");
        Ok(())
    }

    fn schedule_trigger(&mut self, directive: &ScheduleTrigger) -> anyhow::Result<()> {
        self.calls.push("schedule_trigger");
        for &channel in &directive.readouts {
            *self.trigger_reads.entry(channel).or_insert(0) += 1;
        }
        Ok(())
    }

    fn advance(&mut self, _directive: &Advance) -> anyhow::Result<()> {
        self.calls.push("advance");
        Ok(())
    }

    fn acquire(
        &mut self,
        _reps: u32,
        _soft_avgs: u32,
        _progress: bool,
    ) -> anyhow::Result<Vec<ReadoutBlock>> {
        self.acquire_calls += 1;
        if self.fail_acquire {
            bail!("device rejected the channel configuration");
        }
        if let Some(limit) = self.fail_after_acquires {
            if self.acquire_calls > limit {
                bail!("device went away mid-sweep");
            }
        }
        let points: usize = self
            .sweep_counts
            .iter()
            .map(|&count| count as usize)
            .product();
        let blocks = self
            .trigger_reads
            .iter()
            .map(|(&channel, &reads)| ReadoutBlock {
                channel,
                iq: vec![[0.5, -0.5]; reads as usize * points + self.extra_samples],
            })
            .collect();
        Ok(blocks)
    }
}

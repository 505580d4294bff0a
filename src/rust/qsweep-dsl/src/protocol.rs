// Copyright 2026 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use indexmap::{IndexMap, IndexSet};

use qsweep_units::RegisterMapper;

use crate::channel::{
    ChannelIndex, GeneratorChannel, GeneratorRegister, ReadoutChannel, RegisterBinding,
};
use crate::firmware::FirmwareConfig;
use crate::instruction::Instruction;
use crate::types::{ParameterUid, Unit};
use crate::{Error, Result};

/// Register binding and encoding function of one sweepable quantity.
///
/// The capability table maps parameter uids to these; the program builder
/// looks sweeps up by uid instead of comparing parameter identity, and the
/// mode/length special case is carried by the mapper variant.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepTarget {
    pub binding: RegisterBinding,
    pub mapper: RegisterMapper,
}

/// A fixed experiment: channel configurations plus an ordered instruction
/// sequence. Channels are owned by the protocol; instructions reference them
/// by index.
#[derive(Debug, Clone, PartialEq)]
pub struct Protocol {
    pub name: String,
    generators: Vec<GeneratorChannel>,
    readouts: Vec<ReadoutChannel>,
    instructions: Vec<Instruction>,
}

impl Protocol {
    pub fn new(name: &str) -> Self {
        Protocol {
            name: name.to_string(),
            generators: Vec::new(),
            readouts: Vec::new(),
            instructions: Vec::new(),
        }
    }

    pub fn add_generator(&mut self, channel: GeneratorChannel) {
        self.generators.push(channel);
    }

    pub fn add_readout(&mut self, channel: ReadoutChannel) {
        self.readouts.push(channel);
    }

    pub fn add_instruction(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn generator_config(&self, channel: ChannelIndex) -> Result<&GeneratorChannel> {
        self.generators
            .iter()
            .find(|g| g.index == channel)
            .ok_or(Error::UnknownGenerator { channel })
    }

    pub fn readout_config(&self, channel: ChannelIndex) -> Result<&ReadoutChannel> {
        self.readouts
            .iter()
            .find(|r| r.index == channel)
            .ok_or(Error::UnknownReadout { channel })
    }

    /// Generator channels referenced by the instructions, in first-use order.
    pub fn referenced_generators(&self) -> IndexSet<ChannelIndex> {
        self.instructions
            .iter()
            .flat_map(Instruction::generators)
            .collect()
    }

    /// Readout channels referenced by the instructions, in first-use order.
    pub fn referenced_readouts(&self) -> IndexSet<ChannelIndex> {
        self.instructions
            .iter()
            .flat_map(Instruction::readouts)
            .collect()
    }

    /// Number of acquisitions each readout channel performs per shot, in
    /// first-use order. One trigger reference is one acquisition.
    pub fn reads_per_shot(&self) -> IndexMap<ChannelIndex, u32> {
        let mut reads: IndexMap<ChannelIndex, u32> = IndexMap::new();
        for instruction in &self.instructions {
            for channel in instruction.readouts() {
                *reads.entry(channel).or_insert(0) += 1;
            }
        }
        reads
    }

    /// The capability table: every hardware-sweepable parameter of this
    /// protocol mapped to its register binding and encoding function.
    ///
    /// When two instructions share a parameter, the first occurrence wins;
    /// the register arithmetic is identical for identically configured
    /// channels.
    pub fn sweep_targets(
        &self,
        firmware: &FirmwareConfig,
    ) -> Result<IndexMap<ParameterUid, SweepTarget>> {
        let mut targets: IndexMap<ParameterUid, SweepTarget> = IndexMap::new();
        for instruction in &self.instructions {
            let Instruction::PlayPulse(pulse) = instruction else {
                continue;
            };
            let channel = pulse.generator;
            let config = self.generator_config(channel)?;
            let entries = [
                (
                    pulse.frequency.uid,
                    GeneratorRegister::Frequency,
                    RegisterMapper::Linear(
                        firmware.generator_frequency(channel, config.matching_readout)?,
                    ),
                ),
                (
                    pulse.phase.uid,
                    GeneratorRegister::Phase,
                    RegisterMapper::Linear(firmware.generator_phase(channel)?),
                ),
                (
                    pulse.gain.uid,
                    GeneratorRegister::Gain,
                    RegisterMapper::Linear(firmware.generator_gain(channel)?),
                ),
                (
                    pulse.length.uid,
                    GeneratorRegister::Mode,
                    RegisterMapper::Mode(firmware.mode_encoder(channel, pulse.control)?),
                ),
            ];
            for (uid, register, mapper) in entries {
                targets
                    .entry(uid)
                    .or_insert_with(|| SweepTarget {
                        binding: RegisterBinding { channel, register },
                        mapper,
                    });
            }
        }
        Ok(targets)
    }

    /// Checks the protocol against its channel set and the firmware: every
    /// referenced channel must be configured and exist on the board, and
    /// pulse parameters must carry the expected units.
    pub fn validate(&self, firmware: &FirmwareConfig) -> Result<()> {
        let expect_unit = |parameter: &crate::types::Parameter, expected: Unit| -> Result<()> {
            if parameter.unit != expected {
                return Err(Error::WrongUnit {
                    name: parameter.name.clone(),
                    expected,
                    actual: parameter.unit,
                });
            }
            Ok(())
        };
        for channel in self.referenced_generators() {
            self.generator_config(channel)?;
            firmware.generator(channel)?;
        }
        for channel in self.referenced_readouts() {
            self.readout_config(channel)?;
            firmware.readout(channel)?;
        }
        for instruction in &self.instructions {
            match instruction {
                Instruction::PlayPulse(pulse) => {
                    expect_unit(&pulse.frequency, Unit::Hertz)?;
                    expect_unit(&pulse.phase, Unit::Degree)?;
                    expect_unit(&pulse.gain, Unit::Gain)?;
                    expect_unit(&pulse.length, Unit::Second)?;
                    if let crate::instruction::TimeSpec::At(t) = &pulse.t {
                        expect_unit(t, Unit::Second)?;
                    }
                }
                Instruction::Trigger(trigger) => {
                    expect_unit(&trigger.trig_offset, Unit::Second)?;
                    expect_unit(&trigger.sync_delay, Unit::Second)?;
                }
                Instruction::Delay(delay) => {
                    expect_unit(&delay.time, Unit::Second)?;
                }
            }
        }
        Ok(())
    }
}

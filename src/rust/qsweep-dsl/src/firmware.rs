// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;

use qsweep_units::{LinearQuantizer, ModeRegisterEncoder, PulseControl};

use crate::channel::ChannelIndex;
use crate::{Error, Result};

/// A generator block as the firmware self-description reports it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneratorInfo {
    pub sampling_mhz: f64,
    /// DAC samples produced per fabric clock cycle.
    pub samples_per_cycle: u32,
    pub frequency_bits: u32,
    pub phase_bits: u32,
    pub gain_bits: u32,
    pub envelope_length_bits: u32,
}

/// A readout block as the firmware self-description reports it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReadoutInfo {
    pub sampling_mhz: f64,
    pub samples_per_cycle: u32,
    pub frequency_bits: u32,
}

/// The board's self-description: clocking and register layout of every
/// generator and readout block. Parsed from the JSON document the firmware
/// publishes; all register mappers are derived from it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FirmwareConfig {
    pub timing_clock_mhz: f64,
    pub generators: Vec<GeneratorInfo>,
    pub readouts: Vec<ReadoutInfo>,
}

impl FirmwareConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: FirmwareConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Error::InvalidFirmware { reason };
        if self.timing_clock_mhz <= 0.0 {
            return Err(invalid(format!(
                "timing clock must be positive, got {} MHz",
                self.timing_clock_mhz
            )));
        }
        for (index, generator) in self.generators.iter().enumerate() {
            if generator.sampling_mhz <= 0.0 || generator.samples_per_cycle == 0 {
                return Err(invalid(format!("generator {index} has invalid clocking")));
            }
            for bits in [
                generator.frequency_bits,
                generator.phase_bits,
                generator.gain_bits,
                generator.envelope_length_bits,
            ] {
                if bits == 0 || bits > 32 {
                    return Err(invalid(format!(
                        "generator {index} declares a {bits}-bit register"
                    )));
                }
            }
        }
        for (index, readout) in self.readouts.iter().enumerate() {
            if readout.sampling_mhz <= 0.0 || readout.samples_per_cycle == 0 {
                return Err(invalid(format!("readout {index} has invalid clocking")));
            }
            if readout.frequency_bits == 0 || readout.frequency_bits > 32 {
                return Err(invalid(format!(
                    "readout {index} declares a {}-bit frequency register",
                    readout.frequency_bits
                )));
            }
        }
        Ok(())
    }

    pub fn generator(&self, channel: ChannelIndex) -> Result<&GeneratorInfo> {
        self.generators
            .get(usize::from(channel))
            .ok_or(Error::UnknownGenerator { channel })
    }

    pub fn readout(&self, channel: ChannelIndex) -> Result<&ReadoutInfo> {
        self.readouts
            .get(usize::from(channel))
            .ok_or(Error::UnknownReadout { channel })
    }

    fn generator_frequency_step_hz(info: &GeneratorInfo) -> f64 {
        info.sampling_mhz * 1e6 / 2f64.powi(info.frequency_bits as i32)
    }

    fn readout_frequency_step_hz(info: &ReadoutInfo) -> f64 {
        info.sampling_mhz * 1e6 / 2f64.powi(info.frequency_bits as i32)
    }

    /// Frequency mapper of a generator, in Hz.
    ///
    /// With a matching readout, codes are restricted to the coarser of the
    /// two frequency grids so the tone lands exactly on a readout bin.
    pub fn generator_frequency(
        &self,
        channel: ChannelIndex,
        matching_readout: Option<ChannelIndex>,
    ) -> Result<LinearQuantizer> {
        let generator = self.generator(channel)?;
        let step = Self::generator_frequency_step_hz(generator);
        let granularity = match matching_readout {
            Some(readout) => {
                let readout_step = Self::readout_frequency_step_hz(self.readout(readout)?);
                (readout_step / step).round().max(1.0) as i64
            }
            None => 1,
        };
        Ok(LinearQuantizer::new(1.0 / step, generator.frequency_bits).with_granularity(granularity))
    }

    /// Frequency mapper of a readout channel, in Hz.
    pub fn readout_frequency(
        &self,
        channel: ChannelIndex,
        matching_generator: Option<ChannelIndex>,
    ) -> Result<LinearQuantizer> {
        let readout = self.readout(channel)?;
        let step = Self::readout_frequency_step_hz(readout);
        let granularity = match matching_generator {
            Some(generator) => {
                let generator_step =
                    Self::generator_frequency_step_hz(self.generator(generator)?);
                (generator_step / step).round().max(1.0) as i64
            }
            None => 1,
        };
        Ok(LinearQuantizer::new(1.0 / step, readout.frequency_bits).with_granularity(granularity))
    }

    /// Phase mapper of a generator, in degrees over [-180, 180).
    pub fn generator_phase(&self, channel: ChannelIndex) -> Result<LinearQuantizer> {
        let generator = self.generator(channel)?;
        let scale = 2f64.powi(generator.phase_bits as i32) / 360.0;
        Ok(LinearQuantizer::new(scale, generator.phase_bits))
    }

    /// Gain mapper of a generator: DAC full-scale fraction to amplitude code.
    /// Two guard codes are held back from full scale, matching the DAC's
    /// safe maximum.
    pub fn generator_gain(&self, channel: ChannelIndex) -> Result<LinearQuantizer> {
        let generator = self.generator(channel)?;
        let scale = (1i64 << (generator.gain_bits - 1)) - 2;
        Ok(LinearQuantizer::new(scale as f64, generator.gain_bits))
    }

    /// Fabric clock of a generator block, in Hz.
    pub fn generator_fabric_hz(&self, channel: ChannelIndex) -> Result<f64> {
        let generator = self.generator(channel)?;
        Ok(generator.sampling_mhz * 1e6 / f64::from(generator.samples_per_cycle))
    }

    /// Fabric clock of a readout block, in Hz.
    pub fn readout_fabric_hz(&self, channel: ChannelIndex) -> Result<f64> {
        let readout = self.readout(channel)?;
        Ok(readout.sampling_mhz * 1e6 / f64::from(readout.samples_per_cycle))
    }

    /// Seconds to timing-processor cycles.
    pub fn timing_cycles(&self) -> LinearQuantizer {
        LinearQuantizer::new(self.timing_clock_mhz * 1e6, 32)
    }

    /// Mode-register encoder of a generator, for the given control flags.
    pub fn mode_encoder(
        &self,
        channel: ChannelIndex,
        control: PulseControl,
    ) -> Result<ModeRegisterEncoder> {
        let generator = self.generator(channel)?;
        Ok(ModeRegisterEncoder::new(
            control,
            generator.envelope_length_bits,
            self.generator_fabric_hz(channel)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) const FIRMWARE_JSON: &str = r#"
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
            },
            {
                "sampling_mhz": 6881.28,
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

    #[test]
    fn test_parse_and_validate() {
        let config = FirmwareConfig::from_json(FIRMWARE_JSON).unwrap();
        assert_eq!(config.generators.len(), 2);
        assert_eq!(config.readouts.len(), 2);
        assert_eq!(config.generators[0].frequency_bits, 32);
    }

    #[test]
    fn test_bad_register_width_rejected() {
        let text = FIRMWARE_JSON.replace("\"frequency_bits\": 32", "\"frequency_bits\": 48");
        assert!(matches!(
            FirmwareConfig::from_json(&text),
            Err(Error::InvalidFirmware { .. })
        ));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            FirmwareConfig::from_json("{\"timing_clock_mhz\": }"),
            Err(Error::FirmwareParse(_))
        ));
    }

    #[test]
    fn test_matched_channels_share_a_frequency_grid() {
        let config = FirmwareConfig::from_json(FIRMWARE_JSON).unwrap();
        let generator = config.generator_frequency(0, Some(0)).unwrap();
        let readout_free = config.readout_frequency(0, None).unwrap();
        let readout_matched = config.readout_frequency(0, Some(0)).unwrap();
        // the generator grid is the coarser of the two here; a matched
        // readout is restricted to it, a matched generator is unaffected
        assert!(readout_matched.step() > readout_free.step());
        assert!((readout_matched.step() - generator.step()).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_channel() {
        let config = FirmwareConfig::from_json(FIRMWARE_JSON).unwrap();
        assert!(matches!(
            config.generator(5),
            Err(Error::UnknownGenerator { channel: 5 })
        ));
        assert!(matches!(
            config.readout(9),
            Err(Error::UnknownReadout { channel: 9 })
        ));
    }

    #[test]
    fn test_timing_cycles_round() {
        let config = FirmwareConfig::from_json(FIRMWARE_JSON).unwrap();
        let cycles = config.timing_cycles();
        assert_eq!(cycles.float_to_int(1e-6).unwrap(), 430);
    }
}

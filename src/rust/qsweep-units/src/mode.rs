// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use crate::{Error, Result};

/// Output value a generator holds after a pulse ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SteadySelect {
    #[default]
    Zero,
    Last,
}

/// Whether the envelope is played once or repeats until reprogrammed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    OneShot,
    Periodic,
}

/// Source selection for the generator output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputSelect {
    /// Envelope multiplied with the carrier.
    #[default]
    Product,
    /// Carrier only.
    Carrier,
    /// Envelope only.
    Envelope,
    Zero,
}

/// Control flags that share a register with the envelope length field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PulseControl {
    pub steady_select: SteadySelect,
    pub run_mode: RunMode,
    pub output_select: OutputSelect,
    pub phase_reset: bool,
}

impl PulseControl {
    /// The packed control bits, not yet shifted past the length field.
    pub fn bits(&self) -> i64 {
        let outsel = match self.output_select {
            OutputSelect::Product => 0,
            OutputSelect::Carrier => 1,
            OutputSelect::Envelope => 2,
            OutputSelect::Zero => 3,
        };
        let mode = match self.run_mode {
            RunMode::OneShot => 0,
            RunMode::Periodic => 1,
        };
        let stdysel = match self.steady_select {
            SteadySelect::Zero => 0,
            SteadySelect::Last => 1,
        };
        let phrst = i64::from(self.phase_reset);
        phrst << 4 | stdysel << 3 | mode << 2 | outsel
    }
}

/// Mapper for the mode register, where the envelope length (in generator
/// fabric cycles) occupies the low bits and the [`PulseControl`] flags the
/// bits above it.
///
/// Length and control bits are not independently addressable, so a sweep
/// over pulse length must run through this encoder: sweeping the length with
/// a plain linear mapping would silently corrupt the control bits.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeRegisterEncoder {
    prefix: i64,
    length_bits: u32,
    cycles_per_second: f64,
}

impl ModeRegisterEncoder {
    pub fn new(control: PulseControl, length_bits: u32, fabric_frequency_hz: f64) -> Self {
        ModeRegisterEncoder {
            prefix: control.bits() << length_bits,
            length_bits,
            cycles_per_second: fabric_frequency_hz,
        }
    }

    fn length_mask(&self) -> i64 {
        (1i64 << self.length_bits) - 1
    }

    /// Encodes a pulse length in seconds into a full mode register code.
    pub fn encode(&self, seconds: f64) -> Result<i64> {
        if !seconds.is_finite() {
            return Err(Error::NotFinite { value: seconds });
        }
        let cycles = (seconds * self.cycles_per_second).round() as i64;
        if cycles < 0 || cycles > self.length_mask() {
            return Err(Error::LengthOverflow {
                cycles,
                bits: self.length_bits,
            });
        }
        Ok(self.prefix | cycles)
    }

    /// Recovers the pulse length in seconds from a mode register code.
    ///
    /// Only the length field participates; this is how length coordinates
    /// reported by a hardware sweep are mapped back to physical units.
    pub fn decode(&self, code: i64) -> f64 {
        (code & self.length_mask()) as f64 / self.cycles_per_second
    }

    /// Smallest length increment representable by one code step.
    pub fn step(&self) -> f64 {
        1.0 / self.cycles_per_second
    }

    /// The per-iteration code increment of a length sweep. The control
    /// prefix cancels in the difference, so the step lives entirely in the
    /// length field.
    pub fn step_code(&self, start: f64, stop: f64, count: u32) -> Result<i64> {
        if count < 2 {
            return Err(Error::BadSweepCount { count });
        }
        let start_code = self.encode(start)?;
        let stop_code = self.encode(stop)?;
        Ok(((stop_code - start_code) as f64 / f64::from(count - 1)).round() as i64)
    }

    /// Checks that a code still carries this encoder's control prefix with
    /// the length field in range.
    pub fn ensure_in_range(&self, code: i64) -> Result<()> {
        if code & !self.length_mask() != self.prefix {
            return Err(Error::ForeignModeCode {
                code,
                prefix: self.prefix,
            });
        }
        Ok(())
    }
}

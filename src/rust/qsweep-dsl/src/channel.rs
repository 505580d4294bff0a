// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

pub type ChannelIndex = u8;

/// Nyquist zone a generator synthesizes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NyquistZone {
    #[default]
    First,
    Second,
}

impl NyquistZone {
    pub fn as_int(&self) -> u8 {
        match self {
            NyquistZone::First => 1,
            NyquistZone::Second => 2,
        }
    }
}

/// Configuration of a signal-generator line.
///
/// All attributes must be resolved before a program referencing the channel
/// is built; the builder reads them, it never writes them.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorChannel {
    pub index: ChannelIndex,
    pub nyquist_zone: NyquistZone,
    /// Readout channel whose frequency grid this generator must match, so
    /// that a tone synthesized here lands exactly on a readout bin.
    pub matching_readout: Option<ChannelIndex>,
}

impl GeneratorChannel {
    pub fn new(index: ChannelIndex) -> Self {
        GeneratorChannel {
            index,
            nyquist_zone: NyquistZone::First,
            matching_readout: None,
        }
    }

    pub fn with_nyquist_zone(mut self, zone: NyquistZone) -> Self {
        self.nyquist_zone = zone;
        self
    }

    pub fn with_matching_readout(mut self, readout: ChannelIndex) -> Self {
        self.matching_readout = Some(readout);
        self
    }
}

/// How a readout channel receives its configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadoutStyle {
    /// Frequency and phase are fixed when the channel is declared.
    #[default]
    Static,
    /// The timing processor configures the readout from within the program;
    /// declaration is followed by an explicit configuration directive.
    Sequenced,
}

/// Configuration of a readout line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadoutChannel {
    pub index: ChannelIndex,
    pub style: ReadoutStyle,
    pub matching_generator: Option<ChannelIndex>,
    /// Local-oscillator frequency for digital downconversion, in Hz.
    pub lo_frequency: f64,
    /// Acquisition window length in seconds.
    pub window_length: f64,
}

impl ReadoutChannel {
    pub fn new(index: ChannelIndex) -> Self {
        ReadoutChannel {
            index,
            style: ReadoutStyle::Static,
            matching_generator: None,
            lo_frequency: 0.0,
            window_length: 10e-6,
        }
    }

    pub fn with_style(mut self, style: ReadoutStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_matching_generator(mut self, generator: ChannelIndex) -> Self {
        self.matching_generator = Some(generator);
        self
    }

    pub fn with_lo_frequency(mut self, frequency_hz: f64) -> Self {
        self.lo_frequency = frequency_hz;
        self
    }

    pub fn with_window_length(mut self, seconds: f64) -> Self {
        self.window_length = seconds;
        self
    }
}

/// Sweepable registers of a generator channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorRegister {
    Frequency,
    Phase,
    Gain,
    /// Shared envelope-length / control-bit register. Sweeps over it must go
    /// through the mode encoder, never the linear path.
    Mode,
}

/// Address of one sweepable register on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterBinding {
    pub channel: ChannelIndex,
    pub register: GeneratorRegister,
}

impl std::fmt::Display for RegisterBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let register = match self.register {
            GeneratorRegister::Frequency => "freq",
            GeneratorRegister::Phase => "phase",
            GeneratorRegister::Gain => "gain",
            GeneratorRegister::Mode => "mode",
        };
        write!(f, "gen{}:{register}", self.channel)
    }
}

// Copyright 2026 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

/// Physical unit of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Hertz,
    Second,
    Degree,
    /// Generator amplitude as a fraction of DAC full scale.
    Gain,
    Dimensionless,
}

impl Unit {
    pub fn label(&self) -> &'static str {
        match self {
            Unit::Hertz => "Hz",
            Unit::Second => "s",
            Unit::Degree => "deg",
            Unit::Gain => "",
            Unit::Dimensionless => "",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unit::Hertz => write!(f, "Hz"),
            Unit::Second => write!(f, "s"),
            Unit::Degree => write!(f, "deg"),
            Unit::Gain => write!(f, "gain"),
            Unit::Dimensionless => write!(f, "dimensionless"),
        }
    }
}

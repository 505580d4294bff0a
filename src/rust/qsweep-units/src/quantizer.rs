// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use num_traits::{AsPrimitive, Float};

use crate::{Error, Result};

/// An affine mapping between a physical unit and a signed register code.
///
/// `code = round(value * scale / granularity) * granularity + offset`
///
/// - `scale` is the number of register codes per physical unit.
/// - `granularity` restricts codes to multiples of itself. A generator whose
///   frequency must also land on the grid of a matched readout channel gets
///   `granularity > 1`: the register still counts in generator units, but
///   only every `granularity`-th code is addressable.
/// - `offset` shifts the zero point of the register.
/// - `width` is the signed register width in bits; codes outside it fail.
///
/// # Round-trip
/// `int_to_float(float_to_int(x))` differs from `x` by at most one
/// quantization step, where the step is `granularity / scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearQuantizer {
    scale: f64,
    granularity: i64,
    offset: i64,
    width: u32,
}

impl LinearQuantizer {
    /// Creates a mapper with the given codes-per-unit scale and signed
    /// register width. Granularity 1, offset 0.
    pub fn new(scale: f64, width: u32) -> Self {
        LinearQuantizer {
            scale,
            granularity: 1,
            offset: 0,
            width,
        }
    }

    pub fn with_granularity(mut self, granularity: i64) -> Self {
        self.granularity = granularity.max(1);
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Converts a physical value to the nearest addressable register code.
    pub fn float_to_int<F>(&self, value: F) -> Result<i64>
    where
        F: Float + AsPrimitive<f64>,
    {
        let value: f64 = value.as_();
        if !value.is_finite() {
            return Err(Error::NotFinite { value });
        }
        let steps = (value * self.scale / self.granularity as f64).round() as i64;
        let code = steps * self.granularity + self.offset;
        self.ensure_in_range(code)?;
        Ok(code)
    }

    /// Converts a register code back to the physical value it realizes.
    pub fn int_to_float(&self, code: i64) -> f64 {
        (code - self.offset) as f64 / self.scale
    }

    /// Smallest physical increment representable by one addressable code step.
    pub fn step(&self) -> f64 {
        self.granularity as f64 / self.scale
    }

    /// The per-iteration code increment of a sweep from `start` to `stop` in
    /// `count` points. The offset does not participate: a step is a code
    /// difference, not an absolute code.
    pub fn step_code(&self, start: f64, stop: f64, count: u32) -> Result<i64> {
        if count < 2 {
            return Err(Error::BadSweepCount { count });
        }
        let per_step = (stop - start) / f64::from(count - 1);
        if !per_step.is_finite() {
            return Err(Error::NotFinite { value: per_step });
        }
        let steps = (per_step * self.scale / self.granularity as f64).round() as i64;
        let code = steps * self.granularity;
        self.ensure_in_range(code)?;
        Ok(code)
    }

    pub fn ensure_in_range(&self, code: i64) -> Result<()> {
        let limit = 1i64 << (self.width - 1);
        if code >= limit || code < -limit {
            return Err(Error::CodeOutOfRange {
                code,
                width: self.width,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! assert_approx_eq {
        ($left:expr, $right:expr, $tolerance:expr) => {
            let left = $left;
            let right = $right;
            let tolerance = $tolerance;
            let diff = (left - right).abs();
            if diff >= tolerance {
                panic!(
                    "assertion failed: values are not approximately equal\n  left: {}\n  right: {}\n  difference: {}\n  tolerance: {}",
                    left, right, diff, tolerance
                );
            }
        };
    }

    #[test]
    fn test_basic_conversion() {
        // 430.08 MHz timing clock: codes are clock cycles, values are seconds
        let cycles = LinearQuantizer::new(430.08e6, 32);
        assert_eq!(cycles.float_to_int(0.0).unwrap(), 0);
        assert_eq!(cycles.float_to_int(1e-6).unwrap(), 430);
        assert_approx_eq!(cycles.int_to_float(430), 1e-6, 1e-9);
    }

    #[test]
    fn test_round_trip_within_one_step() {
        let quantizer = LinearQuantizer::new(2_f64.powi(32) / 9830.4e6, 32);
        let step = quantizer.step();
        for value in [0.0, 1.5e9, -3.7e9, 123_456_789.123, 4.9e9] {
            let code = quantizer.float_to_int(value).unwrap();
            assert_approx_eq!(quantizer.int_to_float(code), value, step);
        }
    }

    #[test]
    fn test_granularity_restricts_codes() {
        let quantizer = LinearQuantizer::new(10.0, 32).with_granularity(4);
        // 1.5 units = 15 codes, nearest multiple of 4 is 16
        assert_eq!(quantizer.float_to_int(1.5).unwrap(), 16);
        assert_approx_eq!(quantizer.step(), 0.4, 1e-12);
    }

    #[test]
    fn test_offset_shifts_zero_point() {
        let quantizer = LinearQuantizer::new(2.0, 16).with_offset(100);
        let code = quantizer.float_to_int(5.0).unwrap();
        assert_eq!(code, 110);
        assert_approx_eq!(quantizer.int_to_float(code), 5.0, 1e-12);
    }

    #[test]
    fn test_width_overflow() {
        let quantizer = LinearQuantizer::new(1.0, 16);
        assert_eq!(quantizer.float_to_int(32767.0).unwrap(), 32767);
        assert_eq!(
            quantizer.float_to_int(32768.0).unwrap_err(),
            Error::CodeOutOfRange {
                code: 32768,
                width: 16
            }
        );
        assert!(quantizer.float_to_int(-32768.0).is_ok());
        assert!(quantizer.float_to_int(-32769.0).is_err());
    }

    #[test]
    fn test_step_code_ignores_offset() {
        let quantizer = LinearQuantizer::new(10.0, 32).with_offset(500);
        // 0..=10 in 5 points: 2.5 units per step, 25 codes
        assert_eq!(quantizer.step_code(0.0, 10.0, 5).unwrap(), 25);
        assert_eq!(quantizer.step_code(10.0, 0.0, 5).unwrap(), -25);
    }

    #[test]
    fn test_step_code_rejects_single_point() {
        let quantizer = LinearQuantizer::new(10.0, 32);
        assert_eq!(
            quantizer.step_code(0.0, 1.0, 1).unwrap_err(),
            Error::BadSweepCount { count: 1 }
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        let quantizer = LinearQuantizer::new(10.0, 32);
        assert!(matches!(
            quantizer.float_to_int(f64::NAN),
            Err(Error::NotFinite { .. })
        ));
        assert!(matches!(
            quantizer.float_to_int(f64::INFINITY),
            Err(Error::NotFinite { .. })
        ));
    }

    #[test]
    fn test_exact_integer_walk_matches_floats() {
        // The register arithmetic the device performs: start + k * step.
        // The realized physical values must stay linearly spaced even when
        // the requested boundaries do not land on the grid.
        let quantizer = LinearQuantizer::new(7.3, 32);
        let start = quantizer.float_to_int(1.0).unwrap();
        let step = quantizer.step_code(1.0, 2.0, 11).unwrap();
        let values: Vec<f64> = (0..11)
            .map(|k| quantizer.int_to_float(start + k * step))
            .collect();
        let spacing = values[1] - values[0];
        for pair in values.windows(2) {
            assert_approx_eq!(pair[1] - pair[0], spacing, 1e-12);
        }
    }
}

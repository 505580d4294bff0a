// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use num_complex::Complex64;

/// A homogeneous array of numeric values.
///
/// Used for sweep value lists (`Integer64` register codes, `Float64`
/// physical values) and for result columns (`Float64` coordinates,
/// `Complex64` averaged samples).
#[derive(Debug, Clone, PartialEq)]
pub enum NumericArray {
    Integer64(Vec<i64>),
    Float64(Vec<f64>),
    Complex64(Vec<Complex64>),
}

/// Error returned when combining arrays of different variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantMismatch;

impl std::fmt::Display for VariantMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "numeric array variants do not match")
    }
}

impl std::error::Error for VariantMismatch {}

impl NumericArray {
    pub fn len(&self) -> usize {
        match self {
            NumericArray::Integer64(vec) => vec.len(),
            NumericArray::Float64(vec) => vec.len(),
            NumericArray::Complex64(vec) => vec.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            NumericArray::Integer64(vec) => vec.is_empty(),
            NumericArray::Float64(vec) => vec.is_empty(),
            NumericArray::Complex64(vec) => vec.is_empty(),
        }
    }

    pub fn as_integers(&self) -> Option<&[i64]> {
        match self {
            NumericArray::Integer64(vec) => Some(vec),
            _ => None,
        }
    }

    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            NumericArray::Float64(vec) => Some(vec),
            _ => None,
        }
    }

    pub fn as_complexes(&self) -> Option<&[Complex64]> {
        match self {
            NumericArray::Complex64(vec) => Some(vec),
            _ => None,
        }
    }

    /// An empty array of the same variant as `self`.
    pub fn empty_like(&self) -> Self {
        match self {
            NumericArray::Integer64(_) => NumericArray::Integer64(Vec::new()),
            NumericArray::Float64(_) => NumericArray::Float64(Vec::new()),
            NumericArray::Complex64(_) => NumericArray::Complex64(Vec::new()),
        }
    }

    /// Appends all values of `other` to `self`.
    ///
    /// Fails without modifying `self` when the variants differ.
    pub fn try_extend(&mut self, other: &NumericArray) -> Result<(), VariantMismatch> {
        match (self, other) {
            (NumericArray::Integer64(dst), NumericArray::Integer64(src)) => {
                dst.extend_from_slice(src);
                Ok(())
            }
            (NumericArray::Float64(dst), NumericArray::Float64(src)) => {
                dst.extend_from_slice(src);
                Ok(())
            }
            (NumericArray::Complex64(dst), NumericArray::Complex64(src)) => {
                dst.extend_from_slice(src);
                Ok(())
            }
            _ => Err(VariantMismatch),
        }
    }

    /// A `Float64` array holding `value` repeated `count` times.
    ///
    /// This is the broadcast used to pair one software-sweep coordinate with
    /// every hardware sample point of a result block.
    pub fn broadcast_float(value: f64, count: usize) -> Self {
        NumericArray::Float64(vec![value; count])
    }
}

impl From<Vec<i64>> for NumericArray {
    fn from(values: Vec<i64>) -> Self {
        NumericArray::Integer64(values)
    }
}

impl From<Vec<f64>> for NumericArray {
    fn from(values: Vec<f64>) -> Self {
        NumericArray::Float64(values)
    }
}

impl From<Vec<Complex64>> for NumericArray {
    fn from(values: Vec<Complex64>) -> Self {
        NumericArray::Complex64(values)
    }
}

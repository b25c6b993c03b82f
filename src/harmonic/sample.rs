//! Time-indexed observations fed to the fitting engine.

use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One observation: a position on the time axis and the measured value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub index: f64,
    pub value: f64,
}

impl Sample {
    pub fn new(index: f64, value: f64) -> Self {
        Sample { index, value }
    }

    /// Build a sample from any numeric index/value pair
    pub fn from_pair<I: ToPrimitive, V: ToPrimitive>(index: I, value: V) -> Result<Self> {
        let index = index
            .to_f64()
            .ok_or_else(|| Error::InvalidInput("sample index is not representable as f64".into()))?;
        let value = value
            .to_f64()
            .ok_or_else(|| Error::InvalidInput("sample value is not representable as f64".into()))?;
        Self::checked(index, value)
    }

    /// Reject NaN and infinite coordinates
    pub fn checked(index: f64, value: f64) -> Result<Self> {
        if !index.is_finite() || !value.is_finite() {
            return Err(Error::InvalidInput(format!(
                "sample ({}, {}) is not finite",
                index, value
            )));
        }
        Ok(Sample { index, value })
    }
}

/// Turn a plain value list into samples indexed by position.
pub fn samples_from_values<T: ToPrimitive + Copy>(values: &[T]) -> Result<Vec<Sample>> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| Sample::from_pair(i, *v))
        .collect()
}

pub(crate) fn mean_value(samples: &[Sample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let n = samples.len() as f64;
    let sum: f64 = samples.iter().map(|s| s.value).sum();
    if sum.is_finite() {
        return sum / n;
    }
    // the plain sum overflowed, so scale each value first
    samples.iter().map(|s| s.value / n).sum()
}

/// Observed (min, max) of the values, `None` when there are no samples
pub(crate) fn value_range(samples: &[Sample]) -> Option<(f64, f64)> {
    samples.iter().fold(None, |acc, s| match acc {
        None => Some((s.value, s.value)),
        Some((lo, hi)) => Some((lo.min(s.value), hi.max(s.value))),
    })
}

//! Additive model: a constant offset plus an ordered set of cosine terms.
//!
//! Fitting is a greedy residual decomposition. The offset takes the mean, then
//! each term, longest wavelength first, is fit to whatever the previous terms
//! left unexplained.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::FitConfig;
use crate::error::{Error, Result};
use crate::harmonic::basis::{Basis, BasisRecord, GridSearch};
use crate::harmonic::sample::{mean_value, Sample};

/// JSON-friendly summary of a fitted model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub offset: f64,
    /// MSE of the model against its retained samples
    pub mse: f64,
    pub components: Vec<BasisRecord>,
}

/// Offset plus a sum of [`Basis`] terms
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Base {
    offset: f64,
    components: Vec<Basis>,
    /// Samples of the last fit, kept for [`Base::follow`]
    samples: Vec<Sample>,
}

impl Base {
    /// Build a model from `(phase_init, amplitude, wavelength)` seeds.
    pub fn new(seeds: &[(f64, f64, f64)], offset: f64) -> Result<Self> {
        let components = seeds
            .iter()
            .map(|&(phase_init, amplitude, wavelength)| Basis::new(phase_init, amplitude, wavelength))
            .collect::<Result<Vec<_>>>()?;
        Ok(Base {
            offset,
            components,
            samples: Vec::new(),
        })
    }

    /// Build an unfitted model that searches the given cycle lengths.
    pub fn from_wavelengths(wavelengths: &[f64]) -> Result<Self> {
        let seeds: Vec<(f64, f64, f64)> = wavelengths.iter().map(|&w| (0.0, 0.0, w)).collect();
        Self::new(&seeds, 0.0)
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn components(&self) -> &[Basis] {
        &self.components
    }

    pub fn wavelengths(&self) -> Vec<f64> {
        self.components.iter().map(Basis::wavelength).collect()
    }

    /// Samples retained by the last call to [`Base::fit`]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Offset followed by each component's contribution at `theta`
    pub fn get_all(&self, theta: f64) -> Vec<f64> {
        std::iter::once(self.offset)
            .chain(self.components.iter().map(|basis| basis.get(theta)))
            .collect()
    }

    pub fn get(&self, theta: f64) -> f64 {
        self.offset + self.components.iter().map(|basis| basis.get(theta)).sum::<f64>()
    }

    /// MSE of the whole model, 0 without samples or without components
    pub fn calc_mse(&self, samples: &[Sample]) -> f64 {
        if samples.is_empty() || self.components.is_empty() {
            return 0.0;
        }
        let total: f64 = samples
            .iter()
            .map(|s| {
                let err = s.value - self.get(s.index);
                err * err
            })
            .sum();
        total / samples.len() as f64
    }

    /// Fit offset and components to `samples`, then drop every component
    /// whose amplitude is not above `dropout`.
    pub fn fit(
        &mut self,
        samples: &[Sample],
        max_slit: usize,
        step: usize,
        dropout: f64,
    ) -> Result<&mut Self> {
        GridSearch::new(max_slit, 0.0, step).validate()?;

        // work on copies so a failed fit leaves the model untouched
        let offset = mean_value(samples);
        let mut residual: Vec<Sample> = samples
            .iter()
            .map(|s| Sample::new(s.index, s.value - offset))
            .collect();
        if let Some(bad) = samples
            .iter()
            .zip(&residual)
            .find(|(_, r)| !r.value.is_finite())
            .map(|(s, _)| s)
        {
            return Err(Error::InvalidInput(format!(
                "sample ({}, {}) is not finite relative to the mean {}",
                bad.index, bad.value, offset
            )));
        }

        let mut components = self.components.clone();
        components.sort_by(|a, b| b.wavelength().total_cmp(&a.wavelength()));

        for basis in components.iter_mut() {
            let max_amplitude = residual.iter().fold(0.0_f64, |acc, s| acc.max(s.value.abs()));
            basis.fit_with(&residual, &GridSearch::new(max_slit, max_amplitude, step))?;

            for s in residual.iter_mut() {
                s.value -= basis.get(s.index);
            }
            debug!(
                "fitted component wavelength={} amplitude={:.6} phase_init={:.6}",
                basis.wavelength(),
                basis.amplitude(),
                basis.phase_init()
            );
        }

        self.offset = offset;
        self.components = components;
        let before = self.components.len();
        self.components.retain(|basis| basis.amplitude() > dropout);
        self.samples = samples.to_vec();

        debug!(
            "fitted {} samples: offset={:.6}, kept {}/{} components (dropout {})",
            samples.len(),
            self.offset,
            self.components.len(),
            before,
            dropout
        );

        Ok(self)
    }

    pub fn fit_with(&mut self, samples: &[Sample], config: &FitConfig) -> Result<&mut Self> {
        config.validate()?;
        self.fit(samples, config.max_slit, config.step, config.dropout)
    }

    /// Offset record (infinite wavelength) followed by one record per component.
    pub fn as_object(&self) -> Vec<BasisRecord> {
        std::iter::once(BasisRecord {
            phase_init: 0.0,
            amplitude: self.offset,
            wavelength: f64::INFINITY,
        })
        .chain(self.components.iter().map(Basis::as_object))
        .collect()
    }

    pub fn snapshot(&self) -> ModelSnapshot {
        ModelSnapshot {
            offset: self.offset,
            mse: self.calc_mse(&self.samples),
            components: self.components.iter().map(Basis::as_object).collect(),
        }
    }
}

//! A single sinusoidal term and its grid-search fitter.
//!
//! A basis evaluates `amplitude * cos(phase_init + 2π·θ / wavelength)`.
//! Fitting only moves `phase_init` and `amplitude`; the wavelength is chosen
//! by the caller and stays fixed.

use std::f64::consts::{PI, TAU};

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::harmonic::sample::Sample;

/// Plain parameter record of a basis, as written to reports
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasisRecord {
    pub phase_init: f64,
    pub amplitude: f64,
    pub wavelength: f64,
}

/// Partial update for [`Basis::set`]. `None` leaves the parameter untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BasisPatch {
    pub phase_init: Option<f64>,
    pub amplitude: Option<f64>,
    pub wavelength: Option<f64>,
}

/// Settings of the multi-resolution grid search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSearch {
    /// Number of grid lines per axis and iteration
    pub max_slit: usize,
    /// Upper bound of the amplitude search window
    pub max_amplitude: f64,
    /// Number of narrowing iterations
    pub step: usize,
}

impl GridSearch {
    pub fn new(max_slit: usize, max_amplitude: f64, step: usize) -> Self {
        GridSearch {
            max_slit,
            max_amplitude,
            step,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_slit == 0 {
            return Err(Error::InvalidConfig("max_slit must be at least 1".into()));
        }
        if self.step == 0 {
            return Err(Error::InvalidConfig("step must be at least 1".into()));
        }
        if !self.max_amplitude.is_finite() || self.max_amplitude < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "max_amplitude must be finite and non-negative, got {}",
                self.max_amplitude
            )));
        }
        Ok(())
    }
}

impl Default for GridSearch {
    fn default() -> Self {
        GridSearch {
            max_slit: 4,
            max_amplitude: 1.0,
            step: 10,
        }
    }
}

/// Best-so-far MSE recorded after every narrowing iteration of a fit
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTrace {
    pub best_mse_per_step: Vec<f64>,
    pub best_mse: f64,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    mse: f64,
    phase: f64,
    amplitude: f64,
}

/// One cosine term of the additive model.
#[derive(Debug, Clone, PartialEq)]
pub struct Basis {
    phase_init: f64,
    amplitude: f64,
    wavelength: f64,
}

impl Default for Basis {
    fn default() -> Self {
        Basis {
            phase_init: 0.0,
            amplitude: 1.0,
            wavelength: TAU,
        }
    }
}

impl Basis {
    /// Create a basis. The wavelength must be finite and positive.
    pub fn new(phase_init: f64, amplitude: f64, wavelength: f64) -> Result<Self> {
        Ok(Basis {
            phase_init,
            amplitude,
            wavelength: check_wavelength(wavelength)?,
        })
    }

    pub fn phase_init(&self) -> f64 {
        self.phase_init
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    /// Overwrite the parameters present in `patch`
    pub fn set(&mut self, patch: BasisPatch) -> Result<()> {
        // validate before touching anything so a bad patch leaves self intact
        if let Some(wavelength) = patch.wavelength {
            self.wavelength = check_wavelength(wavelength)?;
        }
        if let Some(phase_init) = patch.phase_init {
            self.phase_init = phase_init;
        }
        if let Some(amplitude) = patch.amplitude {
            self.amplitude = amplitude;
        }
        Ok(())
    }

    pub fn as_object(&self) -> BasisRecord {
        BasisRecord {
            phase_init: self.phase_init,
            amplitude: self.amplitude,
            wavelength: self.wavelength,
        }
    }

    pub fn get(&self, theta: f64) -> f64 {
        evaluate(self.phase_init, self.amplitude, self.wavelength, theta)
    }

    /// Positions within one cycle `[0, wavelength)` where the term equals `y`.
    ///
    /// Returns one position when `y` hits a crest or a trough, two otherwise.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfAmplitudeRange`] when `|y|` exceeds `|amplitude|`.
    pub fn rev(&self, y: f64) -> Result<Vec<f64>> {
        // written so that NaN also lands in the error branch
        if !(y.abs() <= self.amplitude.abs()) {
            return Err(Error::OutOfAmplitudeRange {
                value: y,
                amplitude: self.amplitude,
            });
        }
        if self.amplitude == 0.0 {
            // y is 0 here and every position matches
            return Ok(vec![0.0]);
        }

        let ret = (y / self.amplitude).clamp(-1.0, 1.0).acos();
        let mut candidates = vec![self.angle_to_position(ret - self.phase_init)];
        if ret != 0.0 && ret != PI {
            candidates.push(self.angle_to_position(-ret - self.phase_init));
        }
        Ok(candidates)
    }

    /// Mean squared error against the samples, 0 for an empty set
    pub fn calc_mse(&self, samples: &[Sample]) -> f64 {
        mse_of(self.phase_init, self.amplitude, self.wavelength, samples)
    }

    /// Fit phase and amplitude to `samples` by multi-resolution grid search.
    ///
    /// Each of the `step` iterations evaluates a `max_slit × max_slit` grid over
    /// the current phase and amplitude windows, then narrows both windows to one
    /// grid cell on either side of the best point, clamped to `[0, 2π]` and
    /// `[0, max_amplitude]`.
    pub fn fit(
        &mut self,
        samples: &[Sample],
        max_slit: usize,
        max_amplitude: f64,
        step: usize,
    ) -> Result<&mut Self> {
        self.fit_with(samples, &GridSearch::new(max_slit, max_amplitude, step))
    }

    pub fn fit_with(&mut self, samples: &[Sample], grid: &GridSearch) -> Result<&mut Self> {
        self.fit_traced(samples, grid)?;
        Ok(self)
    }

    /// Same as [`Basis::fit_with`] but also reports the best MSE after each iteration.
    pub fn fit_traced(&mut self, samples: &[Sample], grid: &GridSearch) -> Result<SearchTrace> {
        grid.validate()?;

        let slit = grid.max_slit as f64;
        let (mut phase_lo, mut phase_hi) = (0.0, TAU);
        let (mut amptd_lo, mut amptd_hi) = (0.0, grid.max_amplitude);

        let mut best: Option<Candidate> = None;
        let mut best_mse_per_step = Vec::with_capacity(grid.step);

        for _ in 0..grid.step {
            let phase_cell = (phase_hi - phase_lo) / slit;
            let amptd_cell = (amptd_hi - amptd_lo) / slit;

            for j in 0..grid.max_slit {
                let phase = phase_lo + phase_cell * j as f64;
                for k in 0..grid.max_slit {
                    let amplitude = amptd_lo + amptd_cell * k as f64;
                    let mse = mse_of(phase, amplitude, self.wavelength, samples);
                    let improved = match best {
                        None => true,
                        Some(current) => mse < current.mse,
                    };
                    if improved {
                        best = Some(Candidate {
                            mse,
                            phase,
                            amplitude,
                        });
                    }
                }
            }

            if let Some(current) = best {
                phase_hi = (current.phase + phase_cell).min(TAU);
                phase_lo = (current.phase - phase_cell).max(0.0);
                amptd_hi = (current.amplitude + amptd_cell).min(grid.max_amplitude);
                amptd_lo = (current.amplitude - amptd_cell).max(0.0);
                best_mse_per_step.push(current.mse);
            }
        }

        let best = match best {
            Some(best) => best,
            None => {
                return Err(Error::InvalidConfig(
                    "grid search evaluated no candidates".into(),
                ))
            }
        };
        self.phase_init = best.phase;
        self.amplitude = best.amplitude;

        trace!(
            "basis fit: wavelength={} phase_init={:.6} amplitude={:.6} mse={:.6e}",
            self.wavelength,
            self.phase_init,
            self.amplitude,
            best.mse
        );

        Ok(SearchTrace {
            best_mse_per_step,
            best_mse: best.mse,
        })
    }

    fn angle_to_position(&self, angle: f64) -> f64 {
        normalize_angle(angle) * self.wavelength / TAU
    }
}

/// Reduce an angle into one full turn `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let reduced = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU
    if reduced >= TAU {
        0.0
    } else {
        reduced
    }
}

pub(crate) fn check_wavelength(wavelength: f64) -> Result<f64> {
    if wavelength.is_finite() && wavelength > 0.0 {
        Ok(wavelength)
    } else {
        Err(Error::InvalidConfig(format!(
            "wavelength must be finite and positive, got {}",
            wavelength
        )))
    }
}

fn evaluate(phase_init: f64, amplitude: f64, wavelength: f64, theta: f64) -> f64 {
    amplitude * (phase_init + TAU * theta / wavelength).cos()
}

fn mse_of(phase_init: f64, amplitude: f64, wavelength: f64, samples: &[Sample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let total: f64 = samples
        .iter()
        .map(|s| {
            let err = s.value - evaluate(phase_init, amplitude, wavelength, s.index);
            err * err
        })
        .sum();
    total / samples.len() as f64
}

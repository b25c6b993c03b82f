//! Walk-forward forecasting.
//!
//! At every history position a fresh [`Base`] is fit to the trailing window and
//! asked for the value `gap` positions ahead. Once history runs out, the last
//! window's model keeps extrapolating.

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::config::FollowConfig;
use crate::error::{Error, Result};
use crate::harmonic::base::Base;
use crate::harmonic::sample::{value_range, Sample};
use crate::harmonic::wavelengths::candidate_wavelengths;

/// Pull a prediction that falls under the window minimum back toward it.
///
/// The shortfall is scaled by the window range and the minimum itself, and the
/// result never goes below `min`. Predictions above `max` are left alone.
pub fn regulate(val: f64, min: f64, max: f64) -> f64 {
    if val >= min {
        return val;
    }
    let range = max - min;
    if !(range > 0.0) {
        return min;
    }
    let compressed = min - (min - val) / range * min;
    compressed.max(min)
}

/// Runs the follow procedure with a fixed configuration
#[derive(Debug, Clone)]
pub struct Forecaster {
    config: FollowConfig,
}

impl Forecaster {
    pub fn new(config: FollowConfig) -> Result<Self> {
        config.validate()?;
        Ok(Forecaster { config })
    }

    pub fn config(&self) -> &FollowConfig {
        &self.config
    }

    /// Predictions aligned to positions `0 .. len + gap + further`.
    ///
    /// The first `start_from + gap` entries are zeros, then one regulated
    /// prediction per history position from `start_from` on, then `further`
    /// extrapolated values from the last model.
    pub fn follow(&self, history: &[Sample]) -> Result<Vec<f64>> {
        let mut ret = self.leading_zeros(history.len())?;
        let mut last = Base::default();

        for i in self.config.start_from..history.len() {
            let (prediction, model) = self.fit_window(history, i)?;
            ret.push(prediction);
            last = model;
        }

        self.extrapolate(&mut ret, &last, history.len());
        self.report(history.len(), ret.len());
        Ok(ret)
    }

    /// Same output as [`Forecaster::follow`], with the window fits spread over
    /// the rayon thread pool.
    pub fn follow_parallel(&self, history: &[Sample]) -> Result<Vec<f64>> {
        let mut ret = self.leading_zeros(history.len())?;

        let fitted: Vec<(f64, Base)> = (self.config.start_from..history.len())
            .into_par_iter()
            .map(|i| self.fit_window(history, i))
            .collect::<Result<Vec<_>>>()?;

        ret.extend(fitted.iter().map(|(prediction, _)| *prediction));
        let last = fitted.into_iter().last().map(|(_, model)| model).unwrap_or_default();

        self.extrapolate(&mut ret, &last, history.len());
        self.report(history.len(), ret.len());
        Ok(ret)
    }

    fn leading_zeros(&self, history_len: usize) -> Result<Vec<f64>> {
        // bounds every position computed below
        let total = self.config.output_len(history_len)?;
        let lead = self.config.start_from + self.config.gap;
        let mut ret = Vec::new();
        ret.try_reserve_exact(total).map_err(|err| {
            Error::InvalidConfig(format!("cannot allocate {} forecast values: {}", total, err))
        })?;
        ret.resize(lead, 0.0);
        Ok(ret)
    }

    fn fit_window(&self, history: &[Sample], i: usize) -> Result<(f64, Base)> {
        let config = &self.config;
        let window = &history[(i + 1).saturating_sub(config.tail)..=i];

        let samples: Vec<Sample> = window
            .iter()
            .filter(|s| !config.ignorable.contains(&s.index))
            .copied()
            .collect();
        if samples.is_empty() {
            warn!("window ending at {} has no usable samples", i);
        }

        let wavelengths = if config.wavelengths.is_empty() {
            candidate_wavelengths(i, config.tail)
        } else {
            config.wavelengths.clone()
        };

        let mut model = Base::from_wavelengths(&wavelengths)?;
        model.fit(&samples, config.max_slit, config.step, config.dropout)?;

        // the window always holds history[i], so the range exists
        let (min, max) = value_range(window).unwrap_or((0.0, 0.0));
        let raw = model.get((i + config.gap) as f64);
        let prediction = regulate(raw, min, max);

        debug!(
            "window {}: {} samples, {} components, raw={:.6} regulated={:.6}",
            i,
            samples.len(),
            model.len(),
            raw,
            prediction
        );

        Ok((prediction, model))
    }

    fn extrapolate(&self, ret: &mut Vec<f64>, model: &Base, history_len: usize) {
        for i in history_len..history_len + self.config.further {
            ret.push(model.get((i + self.config.gap) as f64));
        }
    }

    fn report(&self, history_len: usize, output_len: usize) {
        info!(
            "followed {} samples (start_from={}, gap={}, tail={}): {} values incl. {} extrapolated",
            history_len,
            self.config.start_from,
            self.config.gap,
            self.config.tail,
            output_len,
            self.config.further
        );
    }
}

impl Base {
    /// Run the follow procedure over the samples retained by the last fit.
    pub fn follow(&self, config: &FollowConfig) -> Result<Vec<f64>> {
        Forecaster::new(config.clone())?.follow(self.samples())
    }
}

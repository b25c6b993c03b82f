//! Sinusoidal decomposition and walk-forward forecasting
//!
//! This module fits a constant offset plus a sum of cosine terms to a
//! one-dimensional signal and uses the fitted models to forecast.
//!
//! # Components
//!
//! - [`Basis`]: one cosine term, fit by multi-resolution grid search
//! - [`Base`]: offset plus terms, fit by greedy residual decomposition
//! - [`Forecaster`]: refits a small model on a trailing window at every
//!   position and predicts a fixed number of steps ahead

pub mod base;
pub mod basis;
pub mod follow;
pub mod sample;
pub mod wavelengths;

pub use base::{Base, ModelSnapshot};
pub use basis::{normalize_angle, Basis, BasisPatch, BasisRecord, GridSearch, SearchTrace};
pub use follow::{regulate, Forecaster};
pub use sample::{samples_from_values, Sample};
pub use wavelengths::candidate_wavelengths;

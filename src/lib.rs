//! Sinusoidal model fitting and walk-forward forecasting for one-dimensional
//! time-indexed signals.

pub mod config;
pub mod error;
pub mod harmonic;
pub mod io;

// Re-export commonly used types
pub use config::{AppConfig, FitConfig, FollowConfig};
pub use error::{Error, Result};
pub use harmonic::{Base, Basis, BasisRecord, Forecaster, GridSearch, ModelSnapshot, Sample};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Fit and follow settings.
//!
//! Every field has a default, so a configuration file only needs the values it
//! changes. Files are read as TOML, YAML or JSON depending on their extension.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::harmonic::basis::check_wavelength;

/// Directory name under the user configuration directory
pub const CONFIG_DIR_NAME: &str = "wavefit";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Largest follow output a `Vec<f64>` can hold
const MAX_OUTPUT_LEN: usize = isize::MAX as usize / std::mem::size_of::<f64>();

/// Settings for fitting one model to a whole sample set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FitConfig {
    /// Cycle lengths to search
    pub wavelengths: Vec<f64>,
    pub max_slit: usize,
    pub step: usize,
    /// Components with an amplitude at or below this value are dropped
    pub dropout: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        FitConfig {
            wavelengths: default_fit_wavelengths(),
            max_slit: 4,
            step: 10,
            dropout: 0.0005,
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<()> {
        check_grid(self.max_slit, self.step)?;
        check_dropout(self.dropout)?;
        check_wavelengths(&self.wavelengths)
    }
}

/// Settings of the walk-forward procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FollowConfig {
    /// Fixed candidate cycle lengths; empty means generated per window
    pub wavelengths: Vec<f64>,
    /// Sample indices left out of every window fit
    pub ignorable: Vec<f64>,
    /// First history position that gets a prediction
    pub start_from: usize,
    /// How far ahead each window predicts
    pub gap: usize,
    /// Window length
    pub tail: usize,
    /// Positions extrapolated past the end of history
    pub further: usize,
    pub max_slit: usize,
    pub step: usize,
    pub dropout: f64,
}

impl Default for FollowConfig {
    fn default() -> Self {
        FollowConfig {
            wavelengths: Vec::new(),
            ignorable: Vec::new(),
            start_from: 14,
            gap: 7,
            tail: 14,
            further: 28,
            max_slit: 4,
            step: 10,
            dropout: -1.0,
        }
    }
}

impl FollowConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tail == 0 {
            return Err(Error::InvalidConfig("tail must be at least 1".into()));
        }
        check_grid(self.max_slit, self.step)?;
        check_dropout(self.dropout)?;
        check_wavelengths(&self.wavelengths)?;
        self.output_len(0).map(|_| ())
    }

    /// Exact length of the follow output for `history_len` samples.
    ///
    /// Every predicted position is below this length, so a successful call
    /// rules out overflow for the whole run.
    pub fn output_len(&self, history_len: usize) -> Result<usize> {
        history_len
            .max(self.start_from)
            .checked_add(self.gap)
            .and_then(|n| n.checked_add(self.further))
            .filter(|&n| n <= MAX_OUTPUT_LEN)
            .ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "follow output for {} samples is too long (start_from={}, gap={}, further={})",
                    history_len, self.start_from, self.gap, self.further
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            _ => Err(Error::InvalidConfig(format!(
                "unsupported configuration file: {}",
                path.display()
            ))),
        }
    }
}

/// Complete configuration, one section per operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub fit: FitConfig,
    pub follow: FollowConfig,
}

impl AppConfig {
    pub fn parse(contents: &str, format: ConfigFormat) -> Result<Self> {
        let config: AppConfig = match format {
            ConfigFormat::Toml => toml::from_str(contents)?,
            ConfigFormat::Yaml => serde_yaml::from_str(contents)?,
            ConfigFormat::Json => serde_json::from_str(contents)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = fs::read_to_string(path).map_err(Error::Io)?;
        Self::parse(&contents, format)
    }

    /// `<user config dir>/wavefit/config.toml`, if the platform has one
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the file at [`AppConfig::default_path`] when it exists.
    pub fn discover() -> Result<Option<Self>> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_path(path).map(Some),
            _ => Ok(None),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.fit.validate()?;
        self.follow.validate()
    }
}

/// Default fit candidates: every length up to three weeks,
/// weekly multiples up to 24 weeks, and 48 weeks.
pub fn default_fit_wavelengths() -> Vec<f64> {
    (1..=21)
        .chain((28..=168).step_by(7))
        .chain(std::iter::once(336))
        .map(|w| w as f64)
        .collect()
}

fn check_grid(max_slit: usize, step: usize) -> Result<()> {
    if max_slit == 0 {
        return Err(Error::InvalidConfig("max_slit must be at least 1".into()));
    }
    if step == 0 {
        return Err(Error::InvalidConfig("step must be at least 1".into()));
    }
    Ok(())
}

fn check_dropout(dropout: f64) -> Result<()> {
    if dropout.is_nan() {
        return Err(Error::InvalidConfig("dropout must be a number".into()));
    }
    Ok(())
}

fn check_wavelengths(wavelengths: &[f64]) -> Result<()> {
    for &wavelength in wavelengths {
        check_wavelength(wavelength)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fit_wavelengths() {
        let w = default_fit_wavelengths();
        assert_eq!(w.len(), 21 + 21 + 1);
        assert_eq!(w[0], 1.0);
        assert_eq!(w[21], 28.0);
        assert_eq!(*w.last().unwrap(), 336.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::parse("[follow]\ngap = 3\n", ConfigFormat::Toml).unwrap();
        assert_eq!(config.follow.gap, 3);
        assert_eq!(config.follow.tail, 14);
        assert_eq!(config.fit, FitConfig::default());
    }

    #[test]
    fn test_yaml_and_json() {
        let yaml = "fit:\n  max_slit: 8\n  wavelengths: [2.0, 7.0]\n";
        let config = AppConfig::parse(yaml, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.fit.max_slit, 8);
        assert_eq!(config.fit.wavelengths, vec![2.0, 7.0]);

        let json = r#"{"follow": {"further": 5}}"#;
        let config = AppConfig::parse(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.follow.further, 5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(AppConfig::parse("[fit]\nmax_slit = 0\n", ConfigFormat::Toml).is_err());
        assert!(AppConfig::parse("[follow]\ntail = 0\n", ConfigFormat::Toml).is_err());
        assert!(AppConfig::parse("[fit]\nwavelengths = [-1.0]\n", ConfigFormat::Toml).is_err());
        assert!(AppConfig::parse("[fit]\nunknown = 1\n", ConfigFormat::Toml).is_err());
    }

    #[test]
    fn test_follow_output_len() {
        let follow = FollowConfig::default();
        assert_eq!(follow.output_len(0).unwrap(), 14 + 7 + 28);
        assert_eq!(follow.output_len(40).unwrap(), 40 + 7 + 28);
        assert!(follow.output_len(usize::MAX).is_err());

        let huge_gap = FollowConfig {
            gap: usize::MAX,
            ..FollowConfig::default()
        };
        assert!(matches!(huge_gap.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.TOML")).unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.yml")).unwrap(), ConfigFormat::Yaml);
        assert!(ConfigFormat::from_path(Path::new("a.ini")).is_err());
    }
}

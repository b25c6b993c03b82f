//! Test utilities for synthetic signals and scratch files

use std::f64::consts::TAU;
use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;
use wavefit::Sample;

/// Samples of `offset + Σ amplitude·cos(phase + 2π·i/wavelength)` at `0..len`
///
/// Each term is `(phase_init, amplitude, wavelength)`.
pub fn cosine_samples(len: usize, offset: f64, terms: &[(f64, f64, f64)]) -> Vec<Sample> {
    (0..len)
        .map(|i| {
            let x = i as f64;
            let y = offset
                + terms
                    .iter()
                    .map(|&(phase, amplitude, wavelength)| {
                        amplitude * (phase + TAU * x / wavelength).cos()
                    })
                    .sum::<f64>();
            Sample::new(x, y)
        })
        .collect()
}

/// Like [`cosine_samples`] with uniform noise in `[-noise, noise)`, seeded for reproducibility
pub fn noisy_cosine_samples(
    len: usize,
    offset: f64,
    terms: &[(f64, f64, f64)],
    noise: f64,
    seed: u64,
) -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(seed);
    cosine_samples(len, offset, terms)
        .into_iter()
        .map(|s| Sample::new(s.index, s.value + rng.random_range(-noise..noise)))
        .collect()
}

/// Temporary directory removed on drop
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    pub fn new() -> Self {
        ScratchDir {
            dir: tempfile::Builder::new()
                .prefix("wavefit_test_")
                .tempdir()
                .expect("Failed to create scratch directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Write `contents` into `name` inside the scratch directory
pub fn write_file(scratch: &ScratchDir, name: &str, contents: &str) -> PathBuf {
    let path = scratch.join(name);
    fs::write(&path, contents).expect("Failed to write test file");
    path
}

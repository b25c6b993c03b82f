//! Common test utilities module
//!
//! Provides shared utilities for tests including:
//! - Synthetic signal generation
//! - Scratch files in a temporary directory

#![allow(dead_code)]

pub mod test_utils;

pub use test_utils::{cosine_samples, noisy_cosine_samples, write_file, ScratchDir};

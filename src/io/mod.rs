pub mod json;
pub mod tsv;

// Re-export commonly used functions
pub use json::{parse_samples, read_samples, write_model};
pub use tsv::{write_expectation, write_forecast};

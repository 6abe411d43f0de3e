//! Settings validation errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{name} must be between 0 and 90 degrees, got {value}")]
    AngleOutOfRange { name: &'static str, value: f32 },

    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },

    #[error("{name} bounds are inverted: min {min} > max {max}")]
    InvertedBounds { name: &'static str, min: f32, max: f32 },

    #[error("{name} must be greater than zero, got {value}")]
    NotPositive { name: &'static str, value: f32 },

    #[error("{name} must be at least 1")]
    Zero { name: &'static str },

    #[error("block layout needs more than {max} blocks")]
    TooManyBlocks { max: usize },
}

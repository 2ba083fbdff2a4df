//! Error types for the tracking library

use thiserror::Error;

/// Result type alias for the tracking library
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Errors that can occur while configuring or running a tracker
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Degenerate box ({x1}, {y1}, {x2}, {y2}): {reason}")]
    DegenerateBox {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        reason: &'static str,
    },

    #[error("Kalman filter failure: {0}")]
    Filter(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackerError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn filter<S: Into<String>>(msg: S) -> Self {
        Self::Filter(msg.into())
    }

    pub fn input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }
}

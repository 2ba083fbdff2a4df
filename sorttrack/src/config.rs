//! Tracker configuration

use crate::box_tracker::{DEFAULT_MEAS_VAR, DEFAULT_PROC_VAR, DIM_X, DIM_Z};
use crate::error::{Result, TrackerError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the SORT tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// Maximum frames a track may go without a matching detection before it is dropped
    pub max_age: u32,
    /// Minimum consecutive hits before a track is reported
    pub min_hits: u32,
    /// Minimum IoU for associating a detection with a track
    pub iou_threshold: f32,
    /// Minimum score for an unmatched detection to start a new track.
    /// `None` lets every unmatched detection through.
    pub init_tracker_min_score: Option<f32>,
    /// Measurement noise covariance diagonal (x, y, s, r)
    pub measurement_noise: [f32; DIM_Z],
    /// Process noise covariance diagonal (x, y, s, r, dx, dy, ds)
    pub process_noise: [f32; DIM_X],
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            max_age: 1,
            min_hits: 3,
            iou_threshold: 0.3,
            init_tracker_min_score: None,
            measurement_noise: DEFAULT_MEAS_VAR,
            process_noise: DEFAULT_PROC_VAR,
        }
    }
}

impl SortConfig {
    pub fn with_max_age(mut self, max_age: u32) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_min_hits(mut self, min_hits: u32) -> Self {
        self.min_hits = min_hits;
        self
    }

    pub fn with_iou_threshold(mut self, iou_threshold: f32) -> Self {
        self.iou_threshold = iou_threshold;
        self
    }

    pub fn with_init_tracker_min_score(mut self, score: f32) -> Self {
        self.init_tracker_min_score = Some(score);
        self
    }

    pub fn with_measurement_noise(mut self, noise: [f32; DIM_Z]) -> Self {
        self.measurement_noise = noise;
        self
    }

    pub fn with_process_noise(mut self, noise: [f32; DIM_X]) -> Self {
        self.process_noise = noise;
        self
    }

    /// Check every parameter is in range
    pub fn validate(&self) -> Result<()> {
        if self.max_age == 0 {
            return Err(TrackerError::config("max_age must be at least 1"));
        }
        if self.min_hits == 0 {
            return Err(TrackerError::config("min_hits must be at least 1"));
        }
        if !(self.iou_threshold > 0.0 && self.iou_threshold <= 1.0) {
            return Err(TrackerError::config(format!(
                "iou_threshold must be in (0, 1], got {}",
                self.iou_threshold
            )));
        }
        if let Some(score) = self.init_tracker_min_score.filter(|s| !s.is_finite()) {
            return Err(TrackerError::config(format!(
                "init_tracker_min_score must be finite, got {}",
                score
            )));
        }
        if let Some(v) = self.measurement_noise.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
            return Err(TrackerError::config(format!(
                "measurement_noise entries must be positive, got {}",
                v
            )));
        }
        if let Some(v) = self.process_noise.iter().find(|v| !(v.is_finite() && **v >= 0.0)) {
            return Err(TrackerError::config(format!(
                "process_noise entries must be non-negative, got {}",
                v
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SortConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

//! Tracker configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use crate::error::{CoreError, Result};

/// Seconds each step must be held before it counts as done.
pub const DEFAULT_REQUIRED_TIME_PER_STEP: f64 = 7.0;

/// Confidence an observation must exceed to advance the tracker.
pub const DEFAULT_ADVANCE_THRESHOLD: f32 = 0.7;

/// Observations kept in the smoothing window.
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// Confidence below which a frame is recorded as "no detection".
pub const DEFAULT_DETECTION_THRESHOLD: f32 = 0.6;

/// Configuration for a step tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Required dwell time per step, in seconds
    pub required_time_per_step: f64,

    /// Minimum confidence (exclusive) for an observation-driven advance
    pub advance_threshold: f32,

    /// Smoothing window; `None` feeds raw observations straight through
    pub smoothing: Option<SmoothingConfig>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            required_time_per_step: DEFAULT_REQUIRED_TIME_PER_STEP,
            advance_threshold: DEFAULT_ADVANCE_THRESHOLD,
            smoothing: None,
        }
    }
}

impl TrackerConfig {
    /// Defaults used on the live video path, with smoothing enabled.
    pub fn live() -> Self {
        Self {
            smoothing: Some(SmoothingConfig::default()),
            ..Self::default()
        }
    }

    /// Set the required dwell time per step.
    pub fn with_required_time(mut self, seconds: f64) -> Self {
        self.required_time_per_step = seconds;
        self
    }

    /// Set the advance threshold.
    pub fn with_advance_threshold(mut self, threshold: f32) -> Self {
        self.advance_threshold = threshold;
        self
    }

    /// Enable or replace smoothing.
    pub fn with_smoothing(mut self, smoothing: SmoothingConfig) -> Self {
        self.smoothing = Some(smoothing);
        self
    }

    /// Required dwell time as a `Duration`.
    ///
    /// Falls back to [`DEFAULT_REQUIRED_TIME_PER_STEP`] when
    /// `required_time_per_step` is not a positive number of seconds that fits
    /// in a `Duration`.
    pub fn required_time(&self) -> Duration {
        match Duration::try_from_secs_f64(self.required_time_per_step) {
            Ok(required) if !required.is_zero() => required,
            _ => Duration::from_secs_f64(DEFAULT_REQUIRED_TIME_PER_STEP),
        }
    }

    /// Required dwell time in seconds, after the same fallback as
    /// [`required_time`](Self::required_time).
    pub fn required_secs(&self) -> f64 {
        self.required_time().as_secs_f64()
    }

    /// Check that every field is in range.
    pub fn validate(&self) -> Result<()> {
        if !self.required_time_per_step.is_finite() || self.required_time_per_step <= 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "required_time_per_step must be a positive number of seconds, got {}",
                self.required_time_per_step
            )));
        }
        check_unit("advance_threshold", self.advance_threshold)?;
        if let Some(smoothing) = &self.smoothing {
            smoothing.validate()?;
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Smoothing window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Number of recent observations retained
    pub capacity: usize,

    /// Frames below this confidence are stored as "no detection"
    pub detection_threshold: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
            detection_threshold: DEFAULT_DETECTION_THRESHOLD,
        }
    }
}

impl SmoothingConfig {
    /// Check that every field is in range.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CoreError::InvalidConfig(
                "smoothing.capacity must be at least 1".to_string(),
            ));
        }
        check_unit("smoothing.detection_threshold", self.detection_threshold)
    }
}

fn check_unit(field: &str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(CoreError::InvalidConfig(format!(
            "{} must be within [0, 1], got {}",
            field, value
        )));
    }
    Ok(())
}

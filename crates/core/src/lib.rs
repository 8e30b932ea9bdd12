//! Washstep core data models.
//!
//! Steps, observations, status records and transition events shared by the
//! tracker, the inference seam and the command line.

#![warn(missing_docs)]

// Identities
mod id;

// Procedure definition
mod step;
mod config;
mod error;

// Per-frame data and outputs
mod observation;
mod status;
mod event;

// Re-exports
pub use id::{SessionId, StepIndex};

pub use step::{Step, StepCatalog};
pub use config::{
    TrackerConfig, SmoothingConfig, DEFAULT_ADVANCE_THRESHOLD, DEFAULT_DETECTION_THRESHOLD,
    DEFAULT_HISTORY_CAPACITY, DEFAULT_REQUIRED_TIME_PER_STEP,
};
pub use error::{CoreError, Result};

pub use observation::Observation;
pub use status::StepStatus;
pub use event::{TrackerEvent, TrackerEventKind, AdvanceCause};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;

//! Transition events raised by the tracker.

use serde::{Deserialize, Serialize};
use crate::id::StepIndex;
use crate::Time;

/// Something that happened to a tracking session at a specific time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerEvent {
    /// When it happened
    pub timestamp: Time,

    /// What happened
    pub kind: TrackerEventKind,
}

impl TrackerEvent {
    /// Create an event stamped with the current time.
    pub fn now(kind: TrackerEventKind) -> Self {
        Self {
            timestamp: chrono::Utc::now(),
            kind,
        }
    }
}

/// Kinds of tracker transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackerEventKind {
    /// The dwell timer started for the first time in the session
    TimerStarted {
        /// Step being timed
        step: StepIndex,
    },
    /// A step was marked completed
    StepCompleted {
        /// Completed step
        step: StepIndex,
    },
    /// The tracker moved to the next step
    StepAdvanced {
        /// Step left
        from: StepIndex,
        /// Step entered
        to: StepIndex,
        /// What drove the move
        cause: AdvanceCause,
    },
    /// Every step is completed
    WashCompleted,
    /// Session state was wiped
    Reset,
}

/// Why the tracker advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceCause {
    /// A confident observation of the next step
    Observation,
    /// The dwell time on the previous step elapsed
    Dwell,
}

impl AdvanceCause {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AdvanceCause::Observation => "observation",
            AdvanceCause::Dwell => "dwell",
        }
    }
}

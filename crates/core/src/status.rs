//! Status record pushed to or polled by the presentation layer.

use serde::{Deserialize, Serialize};
use crate::id::StepIndex;

/// Snapshot of tracker progress after an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepStatus {
    /// Current step (0-based)
    pub current_step: StepIndex,

    /// Name of the current step
    pub step_name: String,

    /// Seconds spent on the current step
    pub time_in_step: f64,

    /// Seconds required per step
    pub required_time: f64,

    /// Overall completion (0-100)
    pub completion_percentage: f64,

    /// Whether every step has been completed
    pub completed: bool,
}

impl StepStatus {
    /// Fraction of the current step's dwell time already spent, in `[0, 1]`.
    pub fn step_progress(&self) -> f64 {
        if self.required_time <= 0.0 {
            return 1.0;
        }
        (self.time_in_step / self.required_time).clamp(0.0, 1.0)
    }
}

//! Completion time estimation.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::clock::Clock;
use crate::tracker::StepTracker;

/// Estimates how much washing is left, assuming dwell-driven progression.
pub struct CompletionEstimator;

impl CompletionEstimator {
    /// Remaining dwell time until every step is completed.
    pub fn remaining<C: Clock>(&self, tracker: &StepTracker<C>) -> Duration {
        if tracker.is_complete() {
            return Duration::ZERO;
        }

        let required = tracker.config().required_secs();
        let untouched = tracker
            .steps()
            .len()
            .saturating_sub(tracker.completed_steps() + 1) as f64;
        let current_left = (required - tracker.time_in_step()).max(0.0);

        Duration::try_from_secs_f64(untouched * required + current_left).unwrap_or(Duration::MAX)
    }

    /// Estimated wall-clock time of completion.
    pub fn estimate_finish<C: Clock>(&self, tracker: &StepTracker<C>) -> DateTime<Utc> {
        let remaining = chrono::Duration::from_std(self.remaining(tracker))
            .unwrap_or_else(|_| chrono::Duration::zero());
        Utc::now() + remaining
    }
}

impl Default for CompletionEstimator {
    fn default() -> Self {
        Self
    }
}

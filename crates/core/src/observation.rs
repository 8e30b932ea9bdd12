//! Observation model - one inference result for one frame.

use serde::{Deserialize, Serialize};
use crate::id::StepIndex;

/// A single per-frame inference result.
///
/// Confidence is always a finite value in `[0, 1]`; see [`Observation::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Predicted step, `None` when nothing was detected
    pub class_id: Option<StepIndex>,

    /// Model confidence
    pub confidence: f32,
}

impl Observation {
    /// Create an observation, clamping the confidence into `[0, 1]`.
    ///
    /// Non-finite confidences become 0.
    pub fn new(class_id: Option<StepIndex>, confidence: f32) -> Self {
        Self {
            class_id,
            confidence: sanitize_confidence(confidence),
        }
    }

    /// An empty observation.
    pub fn none() -> Self {
        Self {
            class_id: None,
            confidence: 0.0,
        }
    }

    /// Build from a signed class id, as emitted by detectors that use
    /// negative ids for "no detection".
    pub fn from_signed(class_id: Option<i64>, confidence: f32) -> Self {
        let class_id = class_id.and_then(|c| usize::try_from(c).ok());
        Self::new(class_id, confidence)
    }

    /// The class id, if it names one of `step_count` steps.
    pub fn step_within(&self, step_count: usize) -> Option<StepIndex> {
        self.class_id.filter(|c| *c < step_count)
    }
}

impl Default for Observation {
    fn default() -> Self {
        Self::none()
    }
}

fn sanitize_confidence(confidence: f32) -> f32 {
    if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

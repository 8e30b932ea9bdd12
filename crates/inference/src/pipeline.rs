//! Frame pipeline: model in, tracker status out.

use serde::{Deserialize, Serialize};
use tracing::warn;
use washstep_core::{Observation, StepStatus};
use washstep_progress::{Clock, StepTracker, SystemClock};

use crate::classifier::{Frame, StepClassifier};
use crate::report::PredictionReport;

/// Confidence a prediction must exceed to be reported to clients.
pub const DEFAULT_REPORT_THRESHOLD: f32 = 0.5;

/// Pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum confidence (exclusive) for a per-frame report
    pub report_threshold: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            report_threshold: DEFAULT_REPORT_THRESHOLD,
        }
    }
}

/// Result of processing one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameOutcome {
    /// What the model saw in this frame
    pub prediction: PredictionReport,

    /// Tracker status after the frame
    pub status: StepStatus,
}

/// Runs a classifier on each frame and feeds the result to a tracker.
pub struct FramePipeline<M: StepClassifier, C: Clock = SystemClock> {
    classifier: M,
    tracker: StepTracker<C>,
    config: PipelineConfig,
}

impl<M: StepClassifier, C: Clock> FramePipeline<M, C> {
    /// Create a pipeline.
    pub fn new(classifier: M, tracker: StepTracker<C>) -> Self {
        Self {
            classifier,
            tracker,
            config: PipelineConfig::default(),
        }
    }

    /// Set pipeline configuration.
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Process one frame. Never fails: a model error counts as a frame
    /// with no detection.
    pub fn process(&mut self, frame: &Frame) -> FrameOutcome {
        let step_count = self.tracker.steps().len();

        let (observation, prediction) = match self.classifier.predict(frame) {
            Ok(raw) => {
                let observation = raw.decode(step_count);
                let prediction = PredictionReport::from_observation(
                    &observation,
                    self.tracker.steps(),
                    self.config.report_threshold,
                );
                (observation, prediction)
            }
            Err(e) => {
                warn!("Error in step detection: {}", e);
                (Observation::none(), PredictionReport::error())
            }
        };

        FrameOutcome {
            prediction,
            status: self.tracker.observe(observation),
        }
    }

    /// The tracker driven by this pipeline.
    pub fn tracker(&self) -> &StepTracker<C> {
        &self.tracker
    }

    /// Mutable access to the tracker, e.g. to reset it or drain events.
    pub fn tracker_mut(&mut self) -> &mut StepTracker<C> {
        &mut self.tracker
    }

    /// Reset the tracker.
    pub fn reset(&mut self) {
        self.tracker.reset();
    }

    /// Split into classifier and tracker.
    pub fn into_parts(self) -> (M, StepTracker<C>) {
        (self.classifier, self.tracker)
    }
}

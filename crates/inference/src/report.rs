//! Per-frame prediction record for raw push clients.

use serde::{Deserialize, Serialize};
use washstep_core::{Observation, StepCatalog};

/// Step id reported when nothing usable was detected.
pub const NO_STEP: i64 = -1;

/// What the model saw in one frame, independent of tracker state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    /// Detected step, or `-1`
    pub step: i64,

    /// Step name, "No step detected" or "Error"
    pub step_name: String,

    /// Model confidence, 0 when nothing was reported
    pub confidence: f32,
}

impl PredictionReport {
    /// Report an observation, suppressing it at or below `threshold`.
    ///
    /// Classes past the end of the catalog are named `Class {id}`.
    pub fn from_observation(observation: &Observation, catalog: &StepCatalog, threshold: f32) -> Self {
        match observation.class_id {
            Some(class) if observation.confidence > threshold => Self {
                step: class as i64,
                step_name: catalog
                    .name(class)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Class {}", class)),
                confidence: observation.confidence,
            },
            _ => Self::no_step(),
        }
    }

    /// Nothing detected.
    pub fn no_step() -> Self {
        Self {
            step: NO_STEP,
            step_name: "No step detected".to_string(),
            confidence: 0.0,
        }
    }

    /// Inference failed for this frame.
    pub fn error() -> Self {
        Self {
            step: NO_STEP,
            step_name: "Error".to_string(),
            confidence: 0.0,
        }
    }

    /// Whether a step was reported.
    pub fn is_detection(&self) -> bool {
        self.step != NO_STEP
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confident_observation_is_named() {
        let catalog = StepCatalog::who_default();
        let report = PredictionReport::from_observation(&Observation::new(Some(4), 0.8), &catalog, 0.5);
        assert_eq!(report.step, 4);
        assert_eq!(report.step_name, "Pulgares");
        assert!(report.is_detection());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let catalog = StepCatalog::who_default();
        let report = PredictionReport::from_observation(&Observation::new(Some(1), 0.5), &catalog, 0.5);
        assert_eq!(report, PredictionReport::no_step());
        assert!(!report.is_detection());
    }

    #[test]
    fn test_unknown_class_gets_generic_name() {
        let catalog = StepCatalog::who_default();
        let report = PredictionReport::from_observation(&Observation::new(Some(9), 0.9), &catalog, 0.5);
        assert_eq!(report.step, 9);
        assert_eq!(report.step_name, "Class 9");
    }

    #[test]
    fn test_error_report_serializes() {
        let value = serde_json::to_value(PredictionReport::error()).unwrap();
        assert_eq!(value["step"], -1);
        assert_eq!(value["step_name"], "Error");
        assert_eq!(value["confidence"], 0.0);
    }
}

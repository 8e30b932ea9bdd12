//! Raw model outputs and their decoding into observations.
//!
//! Detectors return boxes with a class and score; classifiers return one
//! score per class, either normalised or as logits. Each variant decodes to
//! a single [`Observation`].

use serde::{Deserialize, Serialize};
use washstep_core::Observation;

/// One detector box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Class id; negative ids mean "background"
    pub class_id: i64,

    /// Box score
    pub confidence: f32,

    /// `[x1, y1, x2, y2]` in pixels
    #[serde(default)]
    pub bbox: [f32; 4],
}

/// Output of a model for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum RawPrediction {
    /// Detector boxes
    Detections(Vec<Detection>),
    /// Per-class probabilities
    Probabilities(Vec<f32>),
    /// Per-class logits, softmaxed before use
    Logits(Vec<f32>),
    /// Nothing produced
    Empty,
}

impl RawPrediction {
    /// Reduce to a single observation.
    ///
    /// Detections yield the highest-scoring box. Score vectors yield their
    /// argmax, but only when they cover all `step_count` steps.
    pub fn decode(&self, step_count: usize) -> Observation {
        match self {
            RawPrediction::Detections(detections) => detections
                .iter()
                .filter(|d| d.confidence.is_finite())
                .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
                .map(|d| Observation::from_signed(Some(d.class_id), d.confidence))
                .unwrap_or_default(),
            RawPrediction::Probabilities(scores) => argmax(scores, step_count),
            RawPrediction::Logits(logits) => argmax(&softmax(logits), step_count),
            RawPrediction::Empty => Observation::none(),
        }
    }
}

fn argmax(scores: &[f32], step_count: usize) -> Observation {
    if scores.len() < step_count {
        return Observation::none();
    }
    scores
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_finite())
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(class, score)| Observation::new(Some(class), *score))
        .unwrap_or_default()
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return vec![f32::NAN; logits.len()];
    }
    let exps: Vec<f32> = logits.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().filter(|v| v.is_finite()).sum();
    exps.into_iter().map(|v| v / sum).collect()
}

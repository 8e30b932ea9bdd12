//! Inference seam.
//!
//! The vision model itself lives outside this workspace. This crate defines
//! the capability a model must offer, decodes its raw outputs into
//! observations, and wires a model to a step tracker frame by frame.

#![warn(missing_docs)]

pub mod classifier;
pub mod prediction;
pub mod report;
pub mod pipeline;

pub use classifier::{Frame, StepClassifier, InferenceError};
pub use prediction::{Detection, RawPrediction};
pub use report::PredictionReport;
pub use pipeline::{FramePipeline, FrameOutcome, PipelineConfig};

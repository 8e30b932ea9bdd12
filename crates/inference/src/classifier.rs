//! Classifier capability.

/// One captured frame, passed through to the model untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Encoded or raw pixel data, in whatever layout the model expects
    pub data: Vec<u8>,
}

impl Frame {
    /// Create a frame.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self { width, height, data }
    }
}

/// Errors a model can report for a frame.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// Model weights are missing or failed to load
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// The frame could not be decoded or has the wrong shape
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// The inference backend failed
    #[error("inference backend error: {0}")]
    Backend(String),
}

/// A vision model that classifies frames into washing steps.
///
/// Implementations wrap a real detector or image classifier; the tracker
/// only ever sees the decoded [`crate::RawPrediction`].
pub trait StepClassifier: Send {
    /// Run inference on one frame.
    fn predict(&mut self, frame: &Frame) -> Result<crate::RawPrediction, InferenceError>;
}

impl<T: StepClassifier + ?Sized> StepClassifier for Box<T> {
    fn predict(&mut self, frame: &Frame) -> Result<crate::RawPrediction, InferenceError> {
        (**self).predict(frame)
    }
}

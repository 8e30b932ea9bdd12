//! Step progress tracking.
//!
//! The per-session step tracker, its smoothing window and clocks, completion
//! estimation, and the session registry that pushes updates downstream.

#![warn(missing_docs)]

pub mod clock;
pub mod history;
pub mod tracker;
pub mod estimator;
pub mod sink;
pub mod session;

pub use clock::{Clock, SystemClock, ManualClock};
pub use history::ObservationHistory;
pub use tracker::StepTracker;
pub use estimator::CompletionEstimator;
pub use sink::{StatusSink, SessionUpdate, SinkError, NullSink, BroadcastSink};
pub use session::{SessionManager, SessionError};

//! Push seam towards the presentation layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use washstep_core::{SessionId, StepStatus, TrackerEvent};

/// Status and transitions of one session after a tracker call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUpdate {
    /// Session the update belongs to
    pub session_id: SessionId,

    /// Status after the call
    pub status: StepStatus,

    /// Transitions raised by the call
    pub events: Vec<TrackerEvent>,
}

/// Errors raised while publishing updates.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The sink no longer accepts updates
    #[error("sink closed")]
    Closed,
}

/// Receives every session update, e.g. to forward it over a socket.
#[async_trait]
pub trait StatusSink: Send + Sync {
    /// Publish one update.
    async fn publish(&self, update: &SessionUpdate) -> Result<(), SinkError>;
}

/// Sink that drops every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

#[async_trait]
impl StatusSink for NullSink {
    async fn publish(&self, _update: &SessionUpdate) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Fan-out sink over a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<SessionUpdate>,
}

impl BroadcastSink {
    /// Create a sink buffering up to `capacity` updates per slow receiver.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to future updates.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl StatusSink for BroadcastSink {
    async fn publish(&self, update: &SessionUpdate) -> Result<(), SinkError> {
        // No subscribers is not an error: nobody is watching yet.
        if self.tx.send(update.clone()).is_err() {
            debug!("No subscribers for session {}", update.session_id);
        }
        Ok(())
    }
}

//! Per-session tracker registry.
//!
//! Each active user gets its own tracker. Trackers are not thread-safe on
//! their own, so every one sits behind its own async mutex; calls for the
//! same session are serialized, different sessions proceed independently.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use washstep_core::{Observation, SessionId, StepCatalog, StepStatus, TrackerConfig};

use crate::clock::{Clock, SystemClock};
use crate::sink::{NullSink, SessionUpdate, StatusSink};
use crate::tracker::StepTracker;

/// Errors raised by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session with this id
    #[error("session {0} not found")]
    NotFound(SessionId),
}

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

type SharedTracker<C> = Arc<Mutex<StepTracker<C>>>;

/// Registry of live tracking sessions.
pub struct SessionManager<C: Clock + Clone = SystemClock> {
    sessions: RwLock<HashMap<SessionId, SharedTracker<C>>>,
    catalog: StepCatalog,
    config: TrackerConfig,
    clock: C,
    sink: Arc<dyn StatusSink>,
}

impl SessionManager<SystemClock> {
    /// Create a manager on the system clock.
    pub fn new(catalog: StepCatalog, config: TrackerConfig) -> Self {
        Self::with_clock(catalog, config, SystemClock)
    }
}

impl<C: Clock + Clone + 'static> SessionManager<C> {
    /// Create a manager whose trackers read `clock`.
    pub fn with_clock(catalog: StepCatalog, config: TrackerConfig, clock: C) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            catalog,
            config,
            clock,
            sink: Arc::new(NullSink),
        }
    }

    /// Publish every update to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Start a new session.
    pub async fn create_session(&self) -> SessionId {
        let id = SessionId::new();
        let tracker = StepTracker::with_clock(
            self.catalog.clone(),
            self.config.clone(),
            self.clock.clone(),
        );
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(tracker)));
        info!("Created session {}", id);
        id
    }

    /// Feed one observation to a session.
    pub async fn update(&self, id: SessionId, observation: Observation) -> Result<StepStatus> {
        let tracker = self.tracker(id).await?;
        let update = {
            let mut tracker = tracker.lock().await;
            let status = tracker.observe(observation);
            SessionUpdate {
                session_id: id,
                status,
                events: tracker.take_events(),
            }
        };
        self.publish(&update).await;
        Ok(update.status)
    }

    /// Current status of a session.
    pub async fn status(&self, id: SessionId) -> Result<StepStatus> {
        let tracker = self.tracker(id).await?;
        let status = tracker.lock().await.status();
        Ok(status)
    }

    /// Reset a session to its initial state.
    pub async fn reset(&self, id: SessionId) -> Result<StepStatus> {
        let tracker = self.tracker(id).await?;
        let update = {
            let mut tracker = tracker.lock().await;
            tracker.reset();
            SessionUpdate {
                session_id: id,
                status: tracker.status(),
                events: tracker.take_events(),
            }
        };
        self.publish(&update).await;
        Ok(update.status)
    }

    /// End a session and drop its state.
    pub async fn close_session(&self, id: SessionId) -> Result<()> {
        match self.sessions.write().await.remove(&id) {
            Some(_) => {
                info!("Closed session {}", id);
                Ok(())
            }
            None => Err(SessionError::NotFound(id)),
        }
    }

    /// Ids of every live session.
    pub async fn list_sessions(&self) -> Vec<SessionId> {
        self.sessions.read().await.keys().copied().collect()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no session is live.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    async fn tracker(&self, id: SessionId) -> Result<SharedTracker<C>> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(SessionError::NotFound(id))
    }

    async fn publish(&self, update: &SessionUpdate) {
        if let Err(e) = self.sink.publish(update).await {
            warn!("Failed to publish update for session {}: {}", update.session_id, e);
        }
    }
}

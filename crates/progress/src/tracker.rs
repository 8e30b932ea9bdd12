//! Step progress tracker.
//!
//! Turns a stream of per-frame `(class, confidence)` observations into a
//! stable current step. The tracker advances from step `k` to `k + 1` when
//! either a confident observation of `k + 1` arrives or the dwell time on `k`
//! reaches the configured requirement, whichever happens first in a call.
//! Observations of any other class are ignored.
//!
//! The tracker has no internal locking; wrap it in a mutex when it is shared.

use std::time::Instant;
use tracing::{debug, info, warn};
use washstep_core::{
    AdvanceCause, Observation, StepCatalog, StepIndex, StepStatus, TrackerConfig, TrackerEvent,
    TrackerEventKind,
};

use crate::clock::{Clock, SystemClock};
use crate::history::ObservationHistory;

/// Progress tracker for one washing session.
#[derive(Debug)]
pub struct StepTracker<C: Clock = SystemClock> {
    catalog: StepCatalog,
    config: TrackerConfig,
    clock: C,
    current_step: StepIndex,
    step_start: Option<Instant>,
    step_completed: Vec<bool>,
    history: Option<ObservationHistory>,
    events: Vec<TrackerEvent>,
}

impl StepTracker<SystemClock> {
    /// Create a tracker reading the system clock.
    pub fn new(catalog: StepCatalog, config: TrackerConfig) -> Self {
        Self::with_clock(catalog, config, SystemClock)
    }
}

impl<C: Clock> StepTracker<C> {
    /// Create a tracker reading the given clock.
    ///
    /// An out-of-range config is logged; a dwell time that cannot be
    /// represented falls back to the default (see
    /// [`TrackerConfig::required_time`]).
    pub fn with_clock(catalog: StepCatalog, config: TrackerConfig, clock: C) -> Self {
        if let Err(err) = config.validate() {
            warn!(error = %err, "Tracker created with an invalid config");
        }
        let history = config.smoothing.as_ref().map(ObservationHistory::new);
        let step_completed = vec![false; catalog.len()];
        Self {
            catalog,
            config,
            clock,
            current_step: 0,
            step_start: None,
            step_completed,
            history,
            events: Vec::new(),
        }
    }

    /// Feed one observation. Never fails; missing or out-of-range classes
    /// count as "no detection" for this tick.
    pub fn update(&mut self, class_id: Option<StepIndex>, confidence: f32) -> StepStatus {
        self.observe(Observation::new(class_id, confidence))
    }

    /// Feed one typed observation.
    pub fn observe(&mut self, observation: Observation) -> StepStatus {
        let now = self.clock.now();

        if self.is_complete() {
            return self.status_at(now);
        }

        let effective = self.effective_observation(observation);

        if let Some(class) = effective.class_id {
            if self.step_start.is_none() {
                self.step_start = Some(now);
                self.emit(TrackerEventKind::TimerStarted {
                    step: self.current_step,
                });
            }

            if class == self.current_step + 1 && effective.confidence > self.config.advance_threshold
            {
                self.mark_completed();
                self.advance(now, AdvanceCause::Observation);
            }
        }

        self.check_dwell(now);

        let status = self.status_at(now);
        debug!(
            step = status.current_step,
            time_in_step = status.time_in_step,
            percentage = status.completion_percentage,
            "Tracker updated"
        );
        status
    }

    /// Current status without feeding an observation.
    pub fn status(&self) -> StepStatus {
        self.status_at(self.clock.now())
    }

    /// Current step (0-based).
    pub fn current_step(&self) -> StepIndex {
        self.current_step
    }

    /// Seconds spent on the current step; 0 before the timer has started.
    pub fn time_in_step(&self) -> f64 {
        self.time_in_step_at(self.clock.now())
    }

    /// Overall completion in `[0, 100]`.
    pub fn completion_percentage(&self) -> f64 {
        self.completion_percentage_at(self.clock.now())
    }

    /// Whether every step is completed.
    pub fn is_complete(&self) -> bool {
        self.step_completed.iter().all(|done| *done)
    }

    /// Number of completed steps.
    pub fn completed_steps(&self) -> usize {
        self.step_completed.iter().filter(|done| **done).count()
    }

    /// Whether step `index` has been completed.
    pub fn is_step_completed(&self, index: StepIndex) -> bool {
        self.step_completed.get(index).copied().unwrap_or(false)
    }

    /// Return to the initial state and drop the smoothing window.
    pub fn reset(&mut self) {
        self.current_step = 0;
        self.step_start = None;
        self.step_completed.iter_mut().for_each(|done| *done = false);
        if let Some(history) = self.history.as_mut() {
            history.clear();
        }
        self.events.clear();
        self.emit(TrackerEventKind::Reset);
        info!("Tracker reset");
    }

    /// Drain the events raised since the last call.
    pub fn take_events(&mut self) -> Vec<TrackerEvent> {
        std::mem::take(&mut self.events)
    }

    /// The steps being tracked.
    pub fn steps(&self) -> &StepCatalog {
        &self.catalog
    }

    /// Active configuration.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Smoothing window, when enabled.
    pub fn history(&self) -> Option<&ObservationHistory> {
        self.history.as_ref()
    }

    /// Apply range filtering and, when enabled, smoothing.
    fn effective_observation(&mut self, observation: Observation) -> Observation {
        let in_range = Observation::new(
            observation.step_within(self.catalog.len()),
            observation.confidence,
        );
        match self.history.as_mut() {
            Some(history) => {
                history.push(in_range);
                history.smoothed().unwrap_or_default()
            }
            None => in_range,
        }
    }

    /// Complete the current step once its dwell time has elapsed.
    fn check_dwell(&mut self, now: Instant) {
        let Some(start) = self.step_start else {
            return;
        };
        if self.step_completed[self.current_step] {
            return;
        }
        if now.saturating_duration_since(start) < self.config.required_time() {
            return;
        }

        self.mark_completed();
        if self.current_step < self.catalog.last_index() {
            self.advance(now, AdvanceCause::Dwell);
        } else {
            info!("All {} steps completed", self.catalog.len());
            self.emit(TrackerEventKind::WashCompleted);
        }
    }

    fn mark_completed(&mut self) {
        let step = self.current_step;
        self.step_completed[step] = true;
        self.emit(TrackerEventKind::StepCompleted { step });
    }

    fn advance(&mut self, now: Instant, cause: AdvanceCause) {
        let from = self.current_step;
        let to = from + 1;
        self.current_step = to;
        self.step_start = Some(now);
        info!(
            from,
            to,
            cause = cause.as_str(),
            "Advanced to step '{}'",
            self.catalog.name(to).unwrap_or_default()
        );
        self.emit(TrackerEventKind::StepAdvanced { from, to, cause });
    }

    fn emit(&mut self, kind: TrackerEventKind) {
        self.events.push(TrackerEvent::now(kind));
    }

    fn time_in_step_at(&self, now: Instant) -> f64 {
        self.step_start
            .map(|start| now.saturating_duration_since(start).as_secs_f64())
            .unwrap_or(0.0)
    }

    fn completion_percentage_at(&self, now: Instant) -> f64 {
        if self.is_complete() {
            return 100.0;
        }
        let required = self.config.required_secs();
        let step_progress = (self.time_in_step_at(now) / required).clamp(0.0, 1.0);
        let total = self.catalog.len() as f64;
        ((self.completed_steps() as f64 + step_progress) / total * 100.0).min(100.0)
    }

    fn status_at(&self, now: Instant) -> StepStatus {
        StepStatus {
            current_step: self.current_step,
            step_name: self
                .catalog
                .name(self.current_step)
                .unwrap_or_default()
                .to_string(),
            time_in_step: self.time_in_step_at(now),
            required_time: self.config.required_secs(),
            completion_percentage: self.completion_percentage_at(now),
            completed: self.is_complete(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use washstep_core::SmoothingConfig;

    fn tracker(config: TrackerConfig) -> (StepTracker<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let tracker = StepTracker::with_clock(StepCatalog::who_default(), config, clock.clone());
        (tracker, clock)
    }

    /// Walk the tracker to `step` using confident next-step observations.
    fn walk_to(tracker: &mut StepTracker<ManualClock>, step: StepIndex) {
        tracker.update(Some(0), 0.9);
        for next in 1..=step {
            tracker.update(Some(next), 0.9);
        }
        assert_eq!(tracker.current_step(), step);
    }

    #[test]
    fn test_initial_state() {
        let (tracker, _clock) = tracker(TrackerConfig::default());
        assert_eq!(tracker.current_step(), 0);
        assert_eq!(tracker.time_in_step(), 0.0);
        assert_eq!(tracker.completion_percentage(), 0.0);
        assert!(!tracker.is_complete());
    }

    #[test]
    fn test_repeated_step_zero_auto_advances_after_dwell() {
        let (mut tracker, clock) = tracker(TrackerConfig::default());

        for _ in 0..13 {
            let status = tracker.update(Some(0), 0.95);
            assert_eq!(status.current_step, 0);
            clock.advance_secs(0.5);
        }
        // 6.5s elapsed
        assert_eq!(tracker.update(Some(0), 0.95).current_step, 0);

        clock.advance_secs(0.5);
        let status = tracker.update(Some(0), 0.95);
        assert_eq!(status.current_step, 1);
        assert!(tracker.is_step_completed(0));
        assert_eq!(status.time_in_step, 0.0);
    }

    #[test]
    fn test_confident_next_step_advances_immediately() {
        let (mut tracker, clock) = tracker(TrackerConfig::default());
        walk_to(&mut tracker, 2);

        clock.advance_secs(3.0);
        let status = tracker.update(Some(3), 0.71);
        assert_eq!(status.current_step, 3);
        assert!(status.time_in_step < 1e-9);
        assert!(tracker.is_step_completed(2));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let (mut tracker, _clock) = tracker(TrackerConfig::default());
        tracker.update(Some(0), 0.9);
        tracker.update(Some(1), 0.7);
        assert_eq!(tracker.current_step(), 0);
    }

    #[test]
    fn test_skipped_step_is_ignored() {
        let (mut tracker, _clock) = tracker(TrackerConfig::default());
        walk_to(&mut tracker, 1);
        tracker.update(Some(3), 0.99);
        assert_eq!(tracker.current_step(), 1);
    }

    #[test]
    fn test_backward_observation_is_ignored() {
        let (mut tracker, _clock) = tracker(TrackerConfig::default());
        walk_to(&mut tracker, 3);
        tracker.update(Some(1), 0.99);
        assert_eq!(tracker.current_step(), 3);
        assert!(!tracker.is_step_completed(3));
    }

    #[test]
    fn test_out_of_range_class_is_no_detection() {
        let (mut tracker, clock) = tracker(TrackerConfig::default());
        let status = tracker.update(Some(42), 0.99);
        assert_eq!(status.current_step, 0);

        // The timer only starts on a real detection.
        clock.advance_secs(10.0);
        assert_eq!(tracker.time_in_step(), 0.0);
        assert_eq!(tracker.update(None, 0.0).current_step, 0);
    }

    #[test]
    fn test_only_one_dwell_advance_per_update() {
        let (mut tracker, clock) = tracker(TrackerConfig::default());
        tracker.update(Some(0), 0.9);
        clock.advance_secs(60.0);
        let status = tracker.update(None, 0.0);
        assert_eq!(status.current_step, 1);
        assert_eq!(tracker.completed_steps(), 1);
    }

    #[test]
    fn test_dwell_drives_progress_without_observations() {
        let (mut tracker, clock) = tracker(TrackerConfig::default());
        tracker.update(Some(0), 0.9);
        for expected in 1..6 {
            clock.advance_secs(7.0);
            assert_eq!(tracker.update(None, 0.0).current_step, expected);
        }
        assert!(!tracker.is_complete());
        clock.advance_secs(7.0);
        let status = tracker.update(None, 0.0);
        assert!(status.completed);
        assert_eq!(status.current_step, 5);
    }

    #[test]
    fn test_completion_saturates_and_freezes_step() {
        let (mut tracker, clock) = tracker(TrackerConfig::default());
        walk_to(&mut tracker, 5);
        clock.advance_secs(7.5);
        tracker.update(Some(5), 0.9);
        assert!(tracker.is_complete());
        assert_eq!(tracker.completion_percentage(), 100.0);

        tracker.update(Some(0), 0.99);
        tracker.update(Some(6), 0.99);
        clock.advance_secs(30.0);
        let status = tracker.update(Some(5), 0.99);
        assert_eq!(status.current_step, 5);
        assert_eq!(status.completion_percentage, 100.0);
        assert!(status.completed);
    }

    #[test]
    fn test_completion_percentage_counts_partial_step() {
        let (mut tracker, clock) = tracker(TrackerConfig::default());
        walk_to(&mut tracker, 2);
        clock.advance_secs(3.5);

        // (2 completed + 0.5) / 6 * 100
        let expected = 2.5 / 6.0 * 100.0;
        assert!((tracker.completion_percentage() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let (mut tracker, clock) = tracker(TrackerConfig::live());
        walk_to(&mut tracker, 0);
        clock.advance_secs(8.0);
        tracker.update(Some(1), 0.9);
        assert!(tracker.current_step() > 0);

        tracker.reset();
        assert_eq!(tracker.current_step(), 0);
        assert_eq!(tracker.time_in_step(), 0.0);
        assert!(!tracker.is_complete());
        assert_eq!(tracker.completed_steps(), 0);
        assert!(tracker.history().unwrap().is_empty());

        tracker.reset();
        assert_eq!(tracker.current_step(), 0);
    }

    #[test]
    fn test_smoothing_suppresses_single_frame_flicker() {
        let config = TrackerConfig::default().with_smoothing(SmoothingConfig::default());
        let (mut tracker, _clock) = tracker(config);

        tracker.update(Some(0), 0.9);
        tracker.update(None, 0.0);
        tracker.update(Some(0), 0.8);
        tracker.update(Some(1), 0.95);
        let status = tracker.update(Some(0), 0.6);
        assert_eq!(status.current_step, 0);

        // Sustained observations of the next step win the window.
        tracker.update(Some(1), 0.9);
        tracker.update(Some(1), 0.9);
        assert_eq!(tracker.current_step(), 1);
    }

    #[test]
    fn test_events_record_transitions() {
        let (mut tracker, clock) = tracker(TrackerConfig::default());
        tracker.update(Some(0), 0.9);
        tracker.update(Some(1), 0.9);
        clock.advance_secs(7.0);
        tracker.update(None, 0.0);

        let kinds: Vec<_> = tracker.take_events().into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TrackerEventKind::TimerStarted { step: 0 },
                TrackerEventKind::StepCompleted { step: 0 },
                TrackerEventKind::StepAdvanced { from: 0, to: 1, cause: AdvanceCause::Observation },
                TrackerEventKind::StepCompleted { step: 1 },
                TrackerEventKind::StepAdvanced { from: 1, to: 2, cause: AdvanceCause::Dwell },
            ]
        );
        assert!(tracker.take_events().is_empty());
    }

    #[test]
    fn test_status_reports_step_name_and_required_time() {
        let (mut tracker, _clock) = tracker(TrackerConfig::default().with_required_time(5.0));
        let status = tracker.update(Some(0), 0.9);
        assert_eq!(status.step_name, "Palma con palma");
        assert_eq!(status.required_time, 5.0);
        assert!(!status.completed);
    }

    #[test]
    fn test_invalid_required_time_uses_default_dwell() {
        for seconds in [-1.0, 0.0, f64::NAN, f64::INFINITY, 1e300] {
            let (mut tracker, clock) = tracker(TrackerConfig::default().with_required_time(seconds));
            let status = tracker.update(Some(0), 0.9);
            assert_eq!(status.required_time, 7.0);
            assert_eq!(status.completion_percentage, 0.0);

            clock.advance_secs(7.0);
            let status = tracker.update(Some(0), 0.9);
            assert_eq!(status.current_step, 1, "seconds = {}", seconds);
            assert!(tracker.is_step_completed(0));
        }
    }
}

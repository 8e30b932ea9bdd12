//! Smoothing window over recent observations.
//!
//! Single-frame predictions flicker. The window keeps the last few frames,
//! records weak ones as "no detection", and reports the modal class with the
//! best confidence seen for it.

use std::collections::{BTreeMap, VecDeque};
use washstep_core::{Observation, SmoothingConfig, StepIndex};

/// Bounded history of recent detections, oldest evicted first.
#[derive(Debug, Clone)]
pub struct ObservationHistory {
    entries: VecDeque<Option<(StepIndex, f32)>>,
    capacity: usize,
    detection_threshold: f32,
}

impl ObservationHistory {
    /// Create an empty history.
    ///
    /// A zero capacity is raised to 1.
    pub fn new(config: &SmoothingConfig) -> Self {
        let capacity = config.capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            detection_threshold: config.detection_threshold,
        }
    }

    /// Record one frame.
    ///
    /// Frames without a class, or with confidence below the detection
    /// threshold, are stored as `None`.
    pub fn push(&mut self, observation: Observation) {
        let entry = observation
            .class_id
            .filter(|_| observation.confidence >= self.detection_threshold)
            .map(|class| (class, observation.confidence));

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// The modal class in the window with the highest confidence recorded
    /// for it, or `None` when the window holds no detections.
    ///
    /// Equal counts resolve to the lower class index.
    pub fn smoothed(&self) -> Option<Observation> {
        let mut tally: BTreeMap<StepIndex, (usize, f32)> = BTreeMap::new();
        for (class, confidence) in self.entries.iter().flatten() {
            let slot = tally.entry(*class).or_insert((0, 0.0));
            slot.0 += 1;
            slot.1 = slot.1.max(*confidence);
        }

        let mut best: Option<(StepIndex, usize, f32)> = None;
        for (class, (count, confidence)) in tally {
            match best {
                Some((_, best_count, _)) if count <= best_count => {}
                _ => best = Some((class, count, confidence)),
            }
        }

        best.map(|(class, _, confidence)| Observation::new(Some(class), confidence))
    }

    /// Frames currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum frames held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every frame.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> ObservationHistory {
        ObservationHistory::new(&SmoothingConfig::default())
    }

    #[test]
    fn test_modal_class_wins_over_latest_frame() {
        let mut h = history();
        h.push(Observation::new(Some(0), 0.9));
        h.push(Observation::none());
        h.push(Observation::new(Some(0), 0.8));
        h.push(Observation::new(Some(1), 0.95));
        h.push(Observation::new(Some(0), 0.6));

        let smoothed = h.smoothed().unwrap();
        assert_eq!(smoothed.class_id, Some(0));
        assert!((smoothed.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_weak_frames_are_recorded_as_none() {
        let mut h = history();
        h.push(Observation::new(Some(2), 0.59));
        h.push(Observation::new(Some(2), 0.3));
        assert_eq!(h.len(), 2);
        assert!(h.smoothed().is_none());
    }

    #[test]
    fn test_oldest_frame_is_evicted() {
        let mut h = history();
        h.push(Observation::new(Some(4), 0.9));
        for _ in 0..4 {
            h.push(Observation::new(Some(1), 0.7));
        }
        assert_eq!(h.smoothed().unwrap().class_id, Some(1));

        // Window is full: the next push evicts the class-4 frame.
        h.push(Observation::new(Some(4), 0.9));
        assert_eq!(h.len(), 5);
        h.push(Observation::new(Some(4), 0.9));
        h.push(Observation::new(Some(4), 0.9));
        assert_eq!(h.smoothed().unwrap().class_id, Some(4));
    }

    #[test]
    fn test_tie_prefers_lower_class() {
        let mut h = history();
        h.push(Observation::new(Some(3), 0.99));
        h.push(Observation::new(Some(2), 0.7));
        h.push(Observation::new(Some(3), 0.8));
        h.push(Observation::new(Some(2), 0.75));

        let smoothed = h.smoothed().unwrap();
        assert_eq!(smoothed.class_id, Some(2));
        assert!((smoothed.confidence - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_clear_empties_window() {
        let mut h = history();
        h.push(Observation::new(Some(0), 0.9));
        h.clear();
        assert!(h.is_empty());
        assert!(h.smoothed().is_none());
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let h = ObservationHistory::new(&SmoothingConfig {
            capacity: 0,
            detection_threshold: 0.6,
        });
        assert_eq!(h.capacity(), 1);
    }
}

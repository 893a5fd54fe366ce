//! Stagnation detector: watch the last ten history
//! entries; if actionable decisions converge on a small set of repeated
//! `(action, targetId)` pairs for three consecutive turns, the loop should
//! exit.

use std::collections::HashSet;

use wayfarer_core_types::HistoryEntry;

/// Consecutive stagnant turns required before the loop exits.
pub const STAGNATION_EXIT_THRESHOLD: u32 = 3;

/// Window of trailing history entries inspected each turn.
pub const STAGNATION_WINDOW: usize = 10;

/// Minimum actionable decisions within the window to even consider it.
const MIN_ACTIONABLE: usize = 8;

/// Maximum unique (action, targetId) pairs among those actionable
/// decisions for the window to count as stagnant.
const MAX_UNIQUE_KEYS: usize = 3;

/// Tracks the consecutive-stagnant-turn counter across loop turns.
#[derive(Default)]
pub struct StagnationDetector {
    counter: u32,
}

impl StagnationDetector {
    pub fn new() -> Self {
        Self { counter: 0 }
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Inspect the trailing window of `history` and update the counter:
    /// increment on a stagnant window, otherwise decrement, clamped at
    /// zero. Returns `true` once the counter reaches
    /// [`STAGNATION_EXIT_THRESHOLD`].
    pub fn observe(&mut self, history: &[HistoryEntry]) -> bool {
        let start = history.len().saturating_sub(STAGNATION_WINDOW);
        let recent = &history[start..];

        let actionable: Vec<&HistoryEntry> = recent
            .iter()
            .filter(|e| e.decision.action.is_actionable())
            .collect();

        let unique_keys: HashSet<(&'static str, Option<&str>)> = actionable
            .iter()
            .map(|e| (e.decision.action.as_str(), e.decision.target_id.as_deref()))
            .collect();

        let is_stagnant = actionable.len() >= MIN_ACTIONABLE && unique_keys.len() <= MAX_UNIQUE_KEYS;

        if is_stagnant {
            self.counter += 1;
        } else {
            self.counter = self.counter.saturating_sub(1);
        }

        self.counter >= STAGNATION_EXIT_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_core_types::{ActionKind, Decision};

    fn entry(action: ActionKind, target: Option<&str>) -> HistoryEntry {
        HistoryEntry {
            decision: Decision {
                thought: "t".into(),
                action,
                target_id: target.map(str::to_string),
                value: None,
            },
            timestamp: chrono::Utc::now(),
        }
    }

    fn stagnant_window() -> Vec<HistoryEntry> {
        (0..10)
            .map(|i| entry(ActionKind::Click, Some(if i % 2 == 0 { "3" } else { "4" })))
            .collect()
    }

    #[test]
    fn three_consecutive_stagnant_windows_trigger_exit() {
        let mut detector = StagnationDetector::new();
        let history = stagnant_window();
        assert!(!detector.observe(&history));
        assert!(!detector.observe(&history));
        assert!(detector.observe(&history));
    }

    #[test]
    fn diverse_history_never_triggers() {
        let mut detector = StagnationDetector::new();
        let history: Vec<HistoryEntry> = (0..10)
            .map(|i| entry(ActionKind::Click, Some(&i.to_string())))
            .collect();
        for _ in 0..5 {
            assert!(!detector.observe(&history));
        }
    }

    #[test]
    fn counter_decrements_and_clamps_at_zero_on_healthy_turns() {
        let mut detector = StagnationDetector::new();
        let healthy: Vec<HistoryEntry> = (0..10)
            .map(|i| entry(ActionKind::Click, Some(&i.to_string())))
            .collect();
        detector.observe(&healthy);
        assert_eq!(detector.counter(), 0);
    }

    #[test]
    fn counter_decrements_after_recovering_from_stagnation() {
        let mut detector = StagnationDetector::new();
        let stagnant = stagnant_window();
        let healthy: Vec<HistoryEntry> = (0..10)
            .map(|i| entry(ActionKind::Click, Some(&i.to_string())))
            .collect();
        detector.observe(&stagnant);
        assert_eq!(detector.counter(), 1);
        detector.observe(&healthy);
        assert_eq!(detector.counter(), 0);
    }

    #[test]
    fn few_actionable_entries_does_not_count_as_stagnant() {
        let mut detector = StagnationDetector::new();
        let history = vec![entry(ActionKind::Click, Some("3")), entry(ActionKind::Click, Some("3"))];
        assert!(!detector.observe(&history));
        assert_eq!(detector.counter(), 0);
    }
}

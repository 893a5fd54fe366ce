//! Tunables for the Decision Engine.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DecisionEngineConfig {
    /// History entries fed back into the prompt.
    pub history_window: usize,
    /// Highest-scoring SoM marks described in the prompt.
    pub top_marks: usize,
    /// Visible menu-like labels surfaced in the prompt.
    pub menu_labels: usize,
    /// Trailing history entries inspected for the loop-guard hint.
    pub loop_guard_window: usize,
    /// Repeat count within the loop-guard window that triggers the hint.
    pub loop_guard_threshold: usize,
    /// Retry attempts on rate-limit/temporary provider errors.
    pub retry_attempts: u32,
    /// Backoff unit multiplied by the attempt number (linear backoff).
    pub retry_backoff_unit: Duration,
    /// Navigation-adjacent keywords checked alongside objective keywords
    /// when picking menu-like labels to surface.
    pub navigation_keywords: Vec<String>,
}

impl Default for DecisionEngineConfig {
    fn default() -> Self {
        Self {
            history_window: 10,
            top_marks: 20,
            menu_labels: 10,
            loop_guard_window: 8,
            loop_guard_threshold: 2,
            retry_attempts: 3,
            retry_backoff_unit: Duration::from_millis(1_200),
            navigation_keywords: vec![
                "menu".into(),
                "nav".into(),
                "home".into(),
                "shop".into(),
                "cart".into(),
                "account".into(),
                "search".into(),
                "login".into(),
                "checkout".into(),
                "category".into(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_constants() {
        let config = DecisionEngineConfig::default();
        assert_eq!(config.history_window, 10);
        assert_eq!(config.top_marks, 20);
        assert_eq!(config.loop_guard_window, 8);
        assert_eq!(config.loop_guard_threshold, 2);
        assert_eq!(config.retry_attempts, 3);
    }
}

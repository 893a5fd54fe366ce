//! DOM mutation quiescence policy: wait for a
//! quiet window after the last observed mutation, but never past a hard
//! cap. The in-page mutation observer itself lives in `cdp-adapter`; this
//! is the pure scheduling arithmetic, kept host-side so it is testable
//! without a browser.

use std::time::Duration;

/// No mutation for this long counts as settled.
pub const QUIET_WINDOW: Duration = Duration::from_millis(500);

/// Never wait longer than this regardless of ongoing mutation activity.
pub const HARD_CAP: Duration = Duration::from_secs(3);

/// Given mutation timestamps (ms since traversal was requested, sorted
/// ascending) plus the quiet window and hard cap, return the ms at which
/// traversal should actually start.
///
/// This is the first point in time, after the last mutation in any run of
/// mutations less than `quiet_window_ms` apart, that is itself followed by
/// `quiet_window_ms` of silence — capped at `hard_cap_ms`.
pub fn resolve_stability_ms(
    mutation_timestamps_ms: &[u64],
    quiet_window_ms: u64,
    hard_cap_ms: u64,
) -> u64 {
    let settle_at = match mutation_timestamps_ms.last() {
        None => 0,
        Some(&last) => last + quiet_window_ms,
    };
    settle_at.min(hard_cap_ms)
}

/// Convenience wrapper using the default quiet window and hard cap.
pub fn resolve_stability(mutation_timestamps_ms: &[u64]) -> Duration {
    Duration::from_millis(resolve_stability_ms(
        mutation_timestamps_ms,
        QUIET_WINDOW.as_millis() as u64,
        HARD_CAP.as_millis() as u64,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_mutations_resolves_immediately() {
        assert_eq!(resolve_stability_ms(&[], 500, 3000), 0);
    }

    #[test]
    fn single_mutation_waits_one_quiet_window() {
        assert_eq!(resolve_stability_ms(&[100], 500, 3000), 600);
    }

    #[test]
    fn late_burst_of_mutations_pushes_settle_time_out() {
        // mutations trickling in up to 2900ms still only need one quiet
        // window after the last one, as long as that stays under the cap.
        assert_eq!(resolve_stability_ms(&[100, 900, 2400], 500, 3000), 2900);
    }

    #[test]
    fn settle_time_is_capped() {
        assert_eq!(resolve_stability_ms(&[2900], 500, 3000), 3000);
    }

    #[test]
    fn default_wrapper_matches_spec_constants() {
        let resolved = resolve_stability(&[100]);
        assert_eq!(resolved, Duration::from_millis(600));
    }
}

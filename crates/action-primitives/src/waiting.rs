//! Fixed wait durations used by the action executor and the loop driver.

use std::time::Duration;

/// `wait` action sleep.
pub const WAIT_ACTION: Duration = Duration::from_millis(2000);

/// Post-action settle wait at the end of every loop turn.
pub const LOOP_SETTLE: Duration = Duration::from_secs(1);

/// Wait before the next turn after any exception in the loop (spec
/// section 4.1 failure policy).
pub const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Hydration grace period after initial navigation.
pub const POST_NAVIGATION_HYDRATION: Duration = Duration::from_secs(2);

//! Turn-level model for the cooperative loop.

use std::time::Duration;

/// Settle wait after a successful turn's execution step.
pub const SETTLE_WAIT: Duration = Duration::from_secs(1);

/// Wait imposed after any turn-level exception before re-entering
/// perception.
pub const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Hydration wait after the initial navigation.
pub const HYDRATION_WAIT: Duration = Duration::from_secs(2);

/// Ceiling on initial navigation.
pub const NAVIGATION_CEILING: Duration = Duration::from_secs(30);

/// The six suspension points the loop observes state across (spec
/// section 5), used for tracing spans and metrics labels only — the
/// actual suspending operation lives in the owning crate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SuspensionPoint {
    Navigation,
    MouseStep,
    TypedChar,
    LlmCall,
    SpeechGate,
    ExplicitWait,
}

impl SuspensionPoint {
    pub fn label(&self) -> &'static str {
        match self {
            SuspensionPoint::Navigation => "navigation",
            SuspensionPoint::MouseStep => "mouse_step",
            SuspensionPoint::TypedChar => "typed_char",
            SuspensionPoint::LlmCall => "llm_call",
            SuspensionPoint::SpeechGate => "speech_gate",
            SuspensionPoint::ExplicitWait => "explicit_wait",
        }
    }
}

/// What a single loop turn decided to do.
#[derive(Debug)]
pub enum TurnOutcome {
    /// Keep looping.
    Continue,
    /// Stop the loop; carries the reason for the status/event stream.
    Stop(StopReason),
}

/// Why the loop exited.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum StopReason {
    /// The decision engine returned `done` or `stop`.
    DecisionDone,
    /// The stagnation detector's counter reached its threshold.
    Stagnation,
    /// The active page closed or crashed with no surviving page.
    PageLost,
    /// An operator called `stop`.
    ExternalStop,
    /// Browser/context launch failure or other hard fatal.
    Fatal(String),
}

impl StopReason {
    pub fn label(&self) -> &'static str {
        match self {
            StopReason::DecisionDone => "decision_done",
            StopReason::Stagnation => "stagnation",
            StopReason::PageLost => "page_lost",
            StopReason::ExternalStop => "external_stop",
            StopReason::Fatal(_) => "fatal",
        }
    }
}

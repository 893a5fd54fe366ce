//! The single-slot TTS rendezvous: at most one
//! outstanding speech request per Run; starting a new one cancels any
//! pending watcher; the loop suspends until ack, watchdog timeout, or
//! stop.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;

/// Why a speech wait resolved.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpeechOutcome {
    /// The operator UI sent `tts_done` for this request.
    Acked,
    /// The watchdog elapsed before an ack arrived.
    TimedOut,
    /// A newer speech request superseded this one before it resolved.
    Cancelled,
    /// The run was stopped while this request was outstanding.
    Stopped,
}

struct Pending {
    request_id: String,
    tx: oneshot::Sender<SpeechOutcome>,
}

/// Lower bound of the watchdog window.
pub const WATCHDOG_FLOOR: Duration = Duration::from_secs(7);
/// Upper bound of the watchdog window.
pub const WATCHDOG_CEILING: Duration = Duration::from_secs(45);
/// Per-character allowance feeding the watchdog formula.
const MS_PER_CHAR: u64 = 70;

/// `max(7s, min(45s, text_len * 70ms))`.
pub fn watchdog_for(text_len: usize) -> Duration {
    let scaled = Duration::from_millis(text_len as u64 * MS_PER_CHAR);
    scaled.clamp(WATCHDOG_FLOOR, WATCHDOG_CEILING)
}

/// Holds the at-most-one outstanding speech request for a Run.
#[derive(Default)]
pub struct SpeechGate {
    pending: Mutex<Option<Pending>>,
}

impl SpeechGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new outstanding request, resolving any previous one as
    /// [`SpeechOutcome::Cancelled`] first.
    pub fn begin(&self, request_id: impl Into<String>) -> oneshot::Receiver<SpeechOutcome> {
        let (tx, rx) = oneshot::channel();
        let mut guard = self.pending.lock();
        if let Some(prev) = guard.take() {
            let _ = prev.tx.send(SpeechOutcome::Cancelled);
        }
        *guard = Some(Pending {
            request_id: request_id.into(),
            tx,
        });
        rx
    }

    /// Resolve the outstanding request as acked, if its id still matches.
    /// Returns `false` if no matching request was outstanding (already
    /// timed out, cancelled, or a stale id).
    pub fn ack(&self, request_id: &str) -> bool {
        let mut guard = self.pending.lock();
        let matches = guard.as_ref().map(|p| p.request_id.as_str()) == Some(request_id);
        if matches {
            if let Some(pending) = guard.take() {
                let _ = pending.tx.send(SpeechOutcome::Acked);
                return true;
            }
        }
        false
    }

    /// Resolve the outstanding request (if any) as stopped.
    pub fn stop(&self) {
        if let Some(pending) = self.pending.lock().take() {
            let _ = pending.tx.send(SpeechOutcome::Stopped);
        }
    }

    /// Drop a request from the pending slot without resolving it, once
    /// the caller has already observed it finish via timeout. No-op if
    /// the id no longer matches (an `ack`/`begin` already raced it out).
    pub fn forget(&self, request_id: &str) {
        let mut guard = self.pending.lock();
        if guard.as_ref().map(|p| p.request_id.as_str()) == Some(request_id) {
            *guard = None;
        }
    }

    pub fn has_outstanding(&self) -> bool {
        self.pending.lock().is_some()
    }
}

/// Await a speech receiver against its watchdog deadline, clearing the
/// gate's pending slot on a timeout so a later `ack` for the same id is a
/// harmless no-op.
pub async fn await_outcome(
    gate: &SpeechGate,
    request_id: &str,
    rx: oneshot::Receiver<SpeechOutcome>,
    deadline: Duration,
) -> SpeechOutcome {
    match tokio::time::timeout(deadline, rx).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(_)) => SpeechOutcome::Cancelled,
        Err(_) => {
            gate.forget(request_id);
            SpeechOutcome::TimedOut
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watchdog_clamps_to_floor() {
        assert_eq!(watchdog_for(1), WATCHDOG_FLOOR);
    }

    #[test]
    fn watchdog_clamps_to_ceiling() {
        assert_eq!(watchdog_for(10_000), WATCHDOG_CEILING);
    }

    #[test]
    fn watchdog_scales_linearly_in_range() {
        assert_eq!(watchdog_for(200), Duration::from_millis(14_000));
    }

    #[tokio::test]
    async fn ack_resolves_matching_request() {
        let gate = SpeechGate::new();
        let rx = gate.begin("req-1");
        assert!(gate.ack("req-1"));
        assert_eq!(rx.await.unwrap(), SpeechOutcome::Acked);
    }

    #[tokio::test]
    async fn ack_with_stale_id_is_rejected() {
        let gate = SpeechGate::new();
        let _rx = gate.begin("req-1");
        assert!(!gate.ack("wrong-id"));
    }

    #[tokio::test]
    async fn new_request_cancels_previous() {
        let gate = SpeechGate::new();
        let rx1 = gate.begin("req-1");
        let _rx2 = gate.begin("req-2");
        assert_eq!(rx1.await.unwrap(), SpeechOutcome::Cancelled);
    }

    #[tokio::test]
    async fn stop_resolves_outstanding_request() {
        let gate = SpeechGate::new();
        let rx = gate.begin("req-1");
        gate.stop();
        assert_eq!(rx.await.unwrap(), SpeechOutcome::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_resolves_as_timed_out_and_clears_slot() {
        let gate = SpeechGate::new();
        let rx = gate.begin("req-1");
        let outcome = await_outcome(&gate, "req-1", rx, Duration::from_millis(50)).await;
        assert_eq!(outcome, SpeechOutcome::TimedOut);
        assert!(!gate.has_outstanding());
    }
}

//! The cooperative loop driver: repeatedly runs
//! a turn body until it asks to stop or the cancel token is flipped. No
//! internal parallelism across turns — each turn runs to completion
//! before the next begins, matching the single-threaded cooperative
//! scheduling model.

use async_trait::async_trait;
use tracing::{info, info_span, Instrument};

use crate::cancel::CancelToken;
use crate::metrics;
use crate::model::{StopReason, TurnOutcome, SETTLE_WAIT};

/// One iteration of perceive/decide/act, implemented by the kernel crate
/// against the real `RunController` state. Kept as a trait so the driver
/// itself stays free of any browser, LLM, or artifact concern.
#[async_trait]
pub trait LoopBody: Send + Sync {
    /// Run one full turn. `turn_index` is
    /// 0-based and purely informational (tracing/metrics).
    async fn turn(&mut self, turn_index: u64, cancel: &CancelToken) -> TurnOutcome;
}

/// Drive `body` until it stops or `cancel` is flipped. Returns the reason
/// the loop exited.
pub async fn run(mut body: impl LoopBody, cancel: CancelToken) -> StopReason {
    let mut turn_index: u64 = 0;
    loop {
        if cancel.checkpoint().is_err() {
            return StopReason::ExternalStop;
        }

        metrics::record_turn_started();
        let outcome = body
            .turn(turn_index, &cancel)
            .instrument(info_span!("loop_turn", turn = turn_index))
            .await;
        turn_index += 1;

        match outcome {
            TurnOutcome::Continue => {
                if cancel.checkpoint().is_err() {
                    return StopReason::ExternalStop;
                }
                tokio::time::sleep(SETTLE_WAIT).await;
            }
            TurnOutcome::Stop(reason) => {
                info!(reason = reason.label(), turns = turn_index, "loop exiting");
                metrics::record_turn_stopped(reason.label());
                return reason;
            }
        }
    }
}

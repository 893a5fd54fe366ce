//! Loop-turn counters exposed at `/metrics`: counts feeding the report's
//! action breakdown table, following the workspace's `lazy_static` +
//! `prometheus` registration pattern.

use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, Opts};

lazy_static! {
    pub static ref LOOP_TURNS_TOTAL: IntCounter = IntCounter::new(
        "wayfarer_loop_turns_total",
        "Total number of perceive/decide/act turns executed across all runs"
    )
    .unwrap();
    pub static ref LOOP_STOPS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "wayfarer_loop_stops_total",
            "Loop exits by reason"
        ),
        &["reason"]
    )
    .unwrap();
}

pub fn record_turn_started() {
    LOOP_TURNS_TOTAL.inc();
}

pub fn record_turn_stopped(reason: &str) {
    LOOP_STOPS_TOTAL.with_label_values(&[reason]).inc();
}

/// Register every counter in this module with `registry` (called once by
/// the kernel/root binary at startup).
pub fn register(registry: &prometheus::Registry) -> prometheus::Result<()> {
    registry.register(Box::new(LOOP_TURNS_TOTAL.clone()))?;
    registry.register(Box::new(LOOP_STOPS_TOTAL.clone()))?;
    Ok(())
}

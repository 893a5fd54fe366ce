//! Thought/step event counters feeding the report's action-breakdown
//! table, exposed for the root binary's `/metrics` registry.

use lazy_static::lazy_static;
use prometheus::IntCounter;

lazy_static! {
    pub static ref THOUGHTS_RECORDED_TOTAL: IntCounter = IntCounter::new(
        "wayfarer_thoughts_recorded_total",
        "Thought events recorded onto a Run's timeline"
    )
    .unwrap();
    pub static ref STEPS_RECORDED_TOTAL: IntCounter = IntCounter::new(
        "wayfarer_steps_recorded_total",
        "Step events recorded onto a Run's timeline"
    )
    .unwrap();
}

pub fn record_thought() {
    THOUGHTS_RECORDED_TOTAL.inc();
}

pub fn record_step() {
    STEPS_RECORDED_TOTAL.inc();
}

pub fn register(registry: &prometheus::Registry) -> prometheus::Result<()> {
    registry.register(Box::new(THOUGHTS_RECORDED_TOTAL.clone()))?;
    registry.register(Box::new(STEPS_RECORDED_TOTAL.clone()))?;
    Ok(())
}

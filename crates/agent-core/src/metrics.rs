//! Decision-retry counter, exposed for the root binary's `/metrics`
//! registry.

use lazy_static::lazy_static;
use prometheus::IntCounter;

lazy_static! {
    pub static ref DECISION_RETRIES_TOTAL: IntCounter = IntCounter::new(
        "wayfarer_decision_retries_total",
        "Provider calls re-attempted after a rate-limit or temporary failure"
    )
    .unwrap();
}

pub fn record_decision_retry() {
    DECISION_RETRIES_TOTAL.inc();
}

pub fn register(registry: &prometheus::Registry) -> prometheus::Result<()> {
    registry.register(Box::new(DECISION_RETRIES_TOTAL.clone()))
}

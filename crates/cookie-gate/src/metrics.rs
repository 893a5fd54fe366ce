//! Dismissal counters, by escalation layer, exposed for the root
//! binary's `/metrics` registry.

use lazy_static::lazy_static;
use prometheus::{IntCounterVec, Opts};

lazy_static! {
    pub static ref COOKIE_DISMISSALS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "wayfarer_cookie_dismissals_total",
            "Cookie/consent banners dismissed, by escalation layer"
        ),
        &["layer"]
    )
    .unwrap();
}

pub fn record_dismissal(layer: &str) {
    COOKIE_DISMISSALS_TOTAL.with_label_values(&[layer]).inc();
}

pub fn register(registry: &prometheus::Registry) -> prometheus::Result<()> {
    registry.register(Box::new(COOKIE_DISMISSALS_TOTAL.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_a_dismissal_by_layer() {
        let before = COOKIE_DISMISSALS_TOTAL.with_label_values(&["test_layer_a"]).get();
        record_dismissal("test_layer_a");
        assert_eq!(COOKIE_DISMISSALS_TOTAL.with_label_values(&["test_layer_a"]).get(), before + 1);
    }
}

//! Marks-found counter, exposed for the root binary's `/metrics`
//! registry.

use lazy_static::lazy_static;
use prometheus::IntCounter;

lazy_static! {
    pub static ref SOM_MARKS_FOUND_TOTAL: IntCounter = IntCounter::new(
        "wayfarer_som_marks_found_total",
        "Set-of-Marks candidates accepted across all observations"
    )
    .unwrap();
}

pub fn record_marks_found(count: usize) {
    SOM_MARKS_FOUND_TOTAL.inc_by(count as u64);
}

pub fn register(registry: &prometheus::Registry) -> prometheus::Result<()> {
    registry.register(Box::new(SOM_MARKS_FOUND_TOTAL.clone()))
}

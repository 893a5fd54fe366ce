use std::time::Duration;

use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, Opts};

lazy_static! {
    pub static ref ADAPTER_COMMANDS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("wayfarer_adapter_commands_total", "CDP commands dispatched, by method"),
        &["method"]
    )
    .unwrap();
    pub static ref ADAPTER_COMMAND_SUCCESS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "wayfarer_adapter_command_success_total",
            "CDP commands that completed successfully, by method"
        ),
        &["method"]
    )
    .unwrap();
    pub static ref ADAPTER_COMMAND_FAILURES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "wayfarer_adapter_command_failures_total",
            "CDP commands that returned an error, by method"
        ),
        &["method"]
    )
    .unwrap();
    pub static ref ADAPTER_COMMAND_LATENCY_MICROS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "wayfarer_adapter_command_latency_microseconds_total",
            "Cumulative CDP command latency, by method"
        ),
        &["method"]
    )
    .unwrap();
    pub static ref ADAPTER_EVENTS_TOTAL: IntCounter = IntCounter::new(
        "wayfarer_adapter_events_total",
        "CDP protocol events received from the browser handler"
    )
    .unwrap();
    pub static ref ADAPTER_NETWORK_SUMMARIES_TOTAL: IntCounter = IntCounter::new(
        "wayfarer_adapter_network_summaries_total",
        "Completed navigations whose network activity was summarized"
    )
    .unwrap();
}

/// Record the start of one CDP command dispatch, labelled by its method
/// name (e.g. `"navigate"`, `"mouse_move"`).
pub fn record_command(method: &str) {
    ADAPTER_COMMANDS_TOTAL.with_label_values(&[method]).inc();
}

pub fn record_command_success(method: &str, duration: Duration) {
    ADAPTER_COMMAND_SUCCESS_TOTAL.with_label_values(&[method]).inc();
    let micros = duration.as_micros().min(u64::MAX as u128) as u64;
    ADAPTER_COMMAND_LATENCY_MICROS_TOTAL.with_label_values(&[method]).inc_by(micros);
}

pub fn record_command_failure(method: &str) {
    ADAPTER_COMMAND_FAILURES_TOTAL.with_label_values(&[method]).inc();
}

pub fn record_event() {
    ADAPTER_EVENTS_TOTAL.inc();
}

pub fn record_network_summary() {
    ADAPTER_NETWORK_SUMMARIES_TOTAL.inc();
}

pub fn register(registry: &prometheus::Registry) -> prometheus::Result<()> {
    registry.register(Box::new(ADAPTER_COMMANDS_TOTAL.clone()))?;
    registry.register(Box::new(ADAPTER_COMMAND_SUCCESS_TOTAL.clone()))?;
    registry.register(Box::new(ADAPTER_COMMAND_FAILURES_TOTAL.clone()))?;
    registry.register(Box::new(ADAPTER_COMMAND_LATENCY_MICROS_TOTAL.clone()))?;
    registry.register(Box::new(ADAPTER_EVENTS_TOTAL.clone()))?;
    registry.register(Box::new(ADAPTER_NETWORK_SUMMARIES_TOTAL.clone()))?;
    Ok(())
}

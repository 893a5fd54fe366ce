//! Root binary metrics registry: exposes every crate's prometheus
//! counters at `/metrics` behind a single lazily-registered registry.

use once_cell::sync::{Lazy, OnceCell};
use prometheus::{Encoder, Registry, TextEncoder};
use tracing::error;

static GLOBAL_REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);
static REGISTER_ONCE: OnceCell<()> = OnceCell::new();

/// Register every crate's counters with the global registry. Idempotent:
/// safe to call from every request handler.
pub fn register_metrics() {
    REGISTER_ONCE.get_or_init(|| {
        if let Err(err) = wayfarer_scheduler::metrics::register(&GLOBAL_REGISTRY) {
            error!(error = %err, "failed to register scheduler metrics");
        }
        if let Err(err) = cdp_adapter::metrics::register(&GLOBAL_REGISTRY) {
            error!(error = %err, "failed to register cdp-adapter metrics");
        }
        if let Err(err) = cookie_gate::metrics::register(&GLOBAL_REGISTRY) {
            error!(error = %err, "failed to register cookie-gate metrics");
        }
        if let Err(err) = perceiver_visual::metrics::register(&GLOBAL_REGISTRY) {
            error!(error = %err, "failed to register perceiver-visual metrics");
        }
        if let Err(err) = agent_core::metrics::register(&GLOBAL_REGISTRY) {
            error!(error = %err, "failed to register agent-core metrics");
        }
        if let Err(err) = l6_timeline::metrics::register(&GLOBAL_REGISTRY) {
            error!(error = %err, "failed to register l6-timeline metrics");
        }
    });
}

pub fn global_registry() -> &'static Registry {
    &GLOBAL_REGISTRY
}

/// Gather and encode the registry in the Prometheus text exposition
/// format, returning `(content_type, body)`.
pub fn encode() -> (String, Vec<u8>) {
    let encoder = TextEncoder::new();
    let metric_families = global_registry().gather();
    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %err, "failed to encode prometheus metrics");
    }
    (encoder.format_type().to_string(), buffer)
}

//! Drives the HTTP control surface's `Router` in-process via
//! `tower::ServiceExt::oneshot`, without binding a real socket.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serial_test::serial;
use tower::ServiceExt;

use wayfarer::server::{router, ServeState};
use wayfarer::{Config, RunController};
use wayfarer_event_bus::AgentEventBus;

fn serve_state() -> ServeState {
    let bus = AgentEventBus::new(16);
    let controller = Arc::new(RunController::new(Config::default(), bus));
    ServeState::new(Config::default(), controller)
}

#[tokio::test]
async fn health_reports_no_active_run_before_any_start() {
    let app = router(serve_state());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["active"], false);
}

#[tokio::test]
async fn livez_and_readyz_report_ok_before_any_start() {
    let app = router(serve_state());

    for path in ["/livez", "/readyz"] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{path} should report ready");
    }
}

#[tokio::test]
async fn readyz_reports_last_error_after_a_fatal_start_failure() {
    let app = router(serve_state());

    // Missing target_url is a client error (400), not a fatal controller
    // failure, so readiness is unaffected; assert the baseline body shape.
    let response = app
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["ready"], true);
    assert_eq!(body["active"], false);
    assert!(body["lastError"].is_null());
}

/// Reads the process-global prometheus registry (`wayfarer::metrics`),
/// so this test is `#[serial]` against any other test that touches it.
#[tokio::test]
#[serial]
async fn metrics_exposes_scheduler_counters_in_text_format() {
    let app = router(serve_state());

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(body.contains("wayfarer_loop_turns_total"));
}

#[tokio::test]
async fn models_lists_the_configured_catalogue() {
    let app = router(serve_state());

    let response = app
        .oneshot(Request::builder().uri("/models").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body.as_array().unwrap().len() >= 1);
}

#[tokio::test]
async fn stop_without_an_active_run_reports_conflict() {
    let app = router(serve_state());

    let response = app
        .oneshot(Request::builder().method("POST").uri("/stop").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

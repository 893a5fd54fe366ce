//! Exercises the full `BrowserDriver` surface against `MockDriver` the way
//! a real page would be driven: open a page, navigate, evaluate a script,
//! drive the mouse, and read back a mark's bounding rect.

use cdp_adapter::{BrowserDriver, DriverPoint, MockDriver, MouseButton, ViewportSize};
use serde_json::json;
use std::time::Duration;

fn driver() -> MockDriver {
    MockDriver::new(ViewportSize { width: 1280, height: 800 })
}

#[tokio::test]
async fn navigate_then_evaluate_round_trips_a_stubbed_response() {
    let driver = driver();
    let page = driver.first_page();
    driver
        .navigate(page, "https://shop.example", Duration::from_secs(5))
        .await
        .expect("navigate");

    driver.stub_eval("document.title", json!("Shop Example"));
    let title = driver
        .evaluate(page, "document.title")
        .await
        .expect("evaluate");
    assert_eq!(title, json!("Shop Example"));
}

#[tokio::test]
async fn click_sequence_moves_mouse_down_then_up_at_the_same_point() {
    let driver = driver();
    let page = driver.first_page();
    let point = DriverPoint { x: 42.0, y: 84.0 };

    driver.mouse_move(page, point).await.unwrap();
    driver.mouse_down(page, point, MouseButton::Left).await.unwrap();
    driver.mouse_up(page, point, MouseButton::Left).await.unwrap();

    let calls = driver.calls();
    assert_eq!(calls.len(), 3);
}

#[tokio::test]
async fn bounding_rect_for_mark_is_none_until_registered() {
    let driver = driver();
    let page = driver.first_page();
    assert!(driver.bounding_rect_for_mark(page, 3).await.unwrap().is_none());

    driver.set_mark_rect(
        page,
        3,
        cdp_adapter::DriverRect { x: 1.0, y: 2.0, width: 10.0, height: 20.0 },
    );
    let rect = driver.bounding_rect_for_mark(page, 3).await.unwrap().unwrap();
    assert_eq!(rect.width, 10.0);
}

#[tokio::test]
async fn new_pages_are_tracked_and_independently_addressable() {
    let driver = driver();
    let first = driver.first_page();
    let second = driver.new_page().await.unwrap();
    assert_ne!(first, second);

    let pages = driver.list_pages().await.unwrap();
    assert_eq!(pages.len(), 2);
    assert!(pages.contains(&first));
    assert!(pages.contains(&second));
}

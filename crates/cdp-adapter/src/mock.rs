//! Deterministic double of [`crate::driver::BrowserDriver`], used by unit
//! tests across the workspace and by the trace-replay round-trip check.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::driver::{BrowserDriver, DriverPoint, DriverRect, MouseButton, ViewportSize};
use crate::error::AdapterError;
use crate::ids::PageId;

/// One call captured by [`MockDriver`], in invocation order.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedCall {
    Navigate { page: PageId, url: String },
    MouseMove { page: PageId, point: DriverPoint },
    MouseDown { page: PageId, point: DriverPoint },
    MouseUp { page: PageId, point: DriverPoint },
    WheelScroll { page: PageId, delta_y: f64 },
    TypeChar { page: PageId, ch: char },
    Evaluate { page: PageId, script: String },
}

pub struct MockDriver {
    pages: Mutex<Vec<PageId>>,
    rects: Mutex<HashMap<(PageId, u32), DriverRect>>,
    viewport: ViewportSize,
    calls: Mutex<Vec<RecordedCall>>,
    eval_responses: Mutex<HashMap<String, Value>>,
}

impl MockDriver {
    pub fn new(viewport: ViewportSize) -> Self {
        let page = PageId::new();
        Self {
            pages: Mutex::new(vec![page]),
            rects: Mutex::new(HashMap::new()),
            viewport,
            calls: Mutex::new(Vec::new()),
            eval_responses: Mutex::new(HashMap::new()),
        }
    }

    pub fn first_page(&self) -> PageId {
        self.pages.lock().unwrap()[0]
    }

    pub fn set_mark_rect(&self, page: PageId, mark_id: u32, rect: DriverRect) {
        self.rects.lock().unwrap().insert((page, mark_id), rect);
    }

    /// Register a canned response for an `evaluate` call whose script
    /// contains `script_contains` as a substring.
    pub fn stub_eval(&self, script_contains: impl Into<String>, response: Value) {
        self.eval_responses
            .lock()
            .unwrap()
            .insert(script_contains.into(), response);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BrowserDriver for MockDriver {
    async fn new_page(&self) -> Result<PageId, AdapterError> {
        let page = PageId::new();
        self.pages.lock().unwrap().push(page);
        Ok(page)
    }

    async fn navigate(
        &self,
        page: PageId,
        url: &str,
        _timeout: std::time::Duration,
    ) -> Result<(), AdapterError> {
        self.record(RecordedCall::Navigate {
            page,
            url: url.to_string(),
        });
        Ok(())
    }

    async fn screenshot(&self, _page: PageId) -> Result<Vec<u8>, AdapterError> {
        // Minimal valid 1x1 PNG, enough for artifact-plumbing tests.
        Ok(vec![
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
        ])
    }

    async fn evaluate(&self, page: PageId, script: &str) -> Result<Value, AdapterError> {
        self.record(RecordedCall::Evaluate {
            page,
            script: script.to_string(),
        });
        let responses = self.eval_responses.lock().unwrap();
        for (needle, value) in responses.iter() {
            if script.contains(needle.as_str()) {
                return Ok(value.clone());
            }
        }
        Ok(Value::Null)
    }

    async fn evaluate_in_frame(
        &self,
        page: PageId,
        _frame_id: &str,
        script: &str,
    ) -> Result<Value, AdapterError> {
        self.evaluate(page, script).await
    }

    async fn list_subframes(&self, _page: PageId) -> Result<Vec<String>, AdapterError> {
        Ok(Vec::new())
    }

    async fn mouse_move(&self, page: PageId, point: DriverPoint) -> Result<(), AdapterError> {
        self.record(RecordedCall::MouseMove { page, point });
        Ok(())
    }

    async fn mouse_down(
        &self,
        page: PageId,
        point: DriverPoint,
        _button: MouseButton,
    ) -> Result<(), AdapterError> {
        self.record(RecordedCall::MouseDown { page, point });
        Ok(())
    }

    async fn mouse_up(
        &self,
        page: PageId,
        point: DriverPoint,
        _button: MouseButton,
    ) -> Result<(), AdapterError> {
        self.record(RecordedCall::MouseUp { page, point });
        Ok(())
    }

    async fn wheel_scroll(&self, page: PageId, delta_y: f64) -> Result<(), AdapterError> {
        self.record(RecordedCall::WheelScroll { page, delta_y });
        Ok(())
    }

    async fn type_char(&self, page: PageId, ch: char) -> Result<(), AdapterError> {
        self.record(RecordedCall::TypeChar { page, ch });
        Ok(())
    }

    async fn bounding_rect_for_mark(
        &self,
        page: PageId,
        mark_id: u32,
    ) -> Result<Option<DriverRect>, AdapterError> {
        Ok(self.rects.lock().unwrap().get(&(page, mark_id)).copied())
    }

    async fn viewport_size(&self, _page: PageId) -> Result<ViewportSize, AdapterError> {
        Ok(self.viewport)
    }

    async fn activate_page(&self, _page: PageId) -> Result<(), AdapterError> {
        Ok(())
    }

    async fn list_pages(&self) -> Result<Vec<PageId>, AdapterError> {
        Ok(self.pages.lock().unwrap().clone())
    }

    async fn shutdown(&self) -> Result<(), AdapterError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_in_order() {
        let driver = MockDriver::new(ViewportSize { width: 1280, height: 800 });
        let page = driver.first_page();
        driver.navigate(page, "https://shop.example", std::time::Duration::from_secs(1)).await.unwrap();
        driver.mouse_move(page, DriverPoint { x: 1.0, y: 2.0 }).await.unwrap();
        let calls = driver.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(calls[0], RecordedCall::Navigate { .. }));
        assert!(matches!(calls[1], RecordedCall::MouseMove { .. }));
    }

    #[tokio::test]
    async fn stubbed_eval_matches_by_substring() {
        let driver = MockDriver::new(ViewportSize { width: 1280, height: 800 });
        let page = driver.first_page();
        driver.stub_eval("__som_traverse", serde_json::json!({"count": 1}));
        let result = driver.evaluate(page, "(() => { __som_traverse(); })()").await.unwrap();
        assert_eq!(result["count"], 1);
    }

    #[tokio::test]
    async fn bounding_rect_lookup_by_mark() {
        let driver = MockDriver::new(ViewportSize { width: 1280, height: 800 });
        let page = driver.first_page();
        driver.set_mark_rect(page, 3, DriverRect { x: 10.0, y: 20.0, width: 30.0, height: 40.0 });
        let rect = driver.bounding_rect_for_mark(page, 3).await.unwrap();
        assert_eq!(rect, Some(DriverRect { x: 10.0, y: 20.0, width: 30.0, height: 40.0 }));
        assert_eq!(driver.bounding_rect_for_mark(page, 99).await.unwrap(), None);
    }
}

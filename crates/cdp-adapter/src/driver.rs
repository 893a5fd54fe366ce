//! `BrowserDriver`: the single abstraction every higher layer programs
//! against. A real `chromiumoxide`-backed page
//! and a deterministic [`crate::mock::MockDriver`] both satisfy it, which
//! is what makes the trace replay round-trip testable
//! without a browser.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AdapterError;
use crate::ids::PageId;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriverPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct DriverRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Mouse button held down during a click primitive.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MouseButton {
    Left,
}

/// The operations the rest of the workspace needs from a live page. A
/// single active page is driven at a time; callers pass
/// `page` explicitly so a tab-switch never leaves a stale implicit target.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Open a new blank page and return its id.
    async fn new_page(&self) -> Result<PageId, AdapterError>;

    /// Navigate `page` to `url`, waiting for `domcontentloaded` up to
    /// `timeout`.
    async fn navigate(
        &self,
        page: PageId,
        url: &str,
        timeout: std::time::Duration,
    ) -> Result<(), AdapterError>;

    /// Capture a PNG screenshot of the current viewport.
    async fn screenshot(&self, page: PageId) -> Result<Vec<u8>, AdapterError>;

    /// Evaluate a self-contained JS expression/IIFE in the page's main
    /// world and return its JSON-serialisable result. This is how SoM
    /// traversal, cookie-surface detection, and cursor rendering are
    /// injected.
    async fn evaluate(&self, page: PageId, script: &str) -> Result<Value, AdapterError>;

    /// Evaluate inside a specific iframe, identified by its CDP frame id.
    async fn evaluate_in_frame(
        &self,
        page: PageId,
        frame_id: &str,
        script: &str,
    ) -> Result<Value, AdapterError>;

    /// List the CDP frame ids of every non-main frame on the page.
    async fn list_subframes(&self, page: PageId) -> Result<Vec<String>, AdapterError>;

    /// Move the real mouse to `point` (one step of a cursor motion path).
    async fn mouse_move(&self, page: PageId, point: DriverPoint) -> Result<(), AdapterError>;

    async fn mouse_down(
        &self,
        page: PageId,
        point: DriverPoint,
        button: MouseButton,
    ) -> Result<(), AdapterError>;

    async fn mouse_up(
        &self,
        page: PageId,
        point: DriverPoint,
        button: MouseButton,
    ) -> Result<(), AdapterError>;

    /// Dispatch a wheel event with the given deltaY at the current cursor
    /// position.
    async fn wheel_scroll(&self, page: PageId, delta_y: f64) -> Result<(), AdapterError>;

    /// Type one character via synthetic key events.
    async fn type_char(&self, page: PageId, ch: char) -> Result<(), AdapterError>;

    /// Get the bounding rectangle of the element carrying the given SoM
    /// mark attribute value, scrolling it into view first.
    async fn bounding_rect_for_mark(
        &self,
        page: PageId,
        mark_id: u32,
    ) -> Result<Option<DriverRect>, AdapterError>;

    /// Current viewport size.
    async fn viewport_size(&self, page: PageId) -> Result<ViewportSize, AdapterError>;

    /// Bring `page` to front and make it the active target.
    async fn activate_page(&self, page: PageId) -> Result<(), AdapterError>;

    /// List every currently open page, most-recently-opened last.
    async fn list_pages(&self) -> Result<Vec<PageId>, AdapterError>;

    /// Close the browser and all its pages.
    async fn shutdown(&self) -> Result<(), AdapterError>;
}

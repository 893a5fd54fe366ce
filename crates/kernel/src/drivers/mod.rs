//! Adapters wiring the narrow `*PageDriver` traits each action/perception
//! crate defines against a single [`cdp_adapter::BrowserDriver`] (spec
//! section 9, "cross-boundary script execution treats these as opaque
//! evaluation requests").
//!
//! Every crate downstream of perception and execution depends only on its
//! own driver trait, not on `cdp-adapter` directly; [`PageDrivers`] is the
//! one place that bridges them all to a real (or mock) browser.

mod dto;
pub mod scripts;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use action_primitives::{AnchorDescriptor, Point, RippleSpec};
use cdp_adapter::{BrowserDriver, DriverPoint, MouseButton, PageId};
use cookie_gate::{AcceptCandidate, CookieGateError, CookiePageDriver, SurfaceNode};
use perceiver_hub::{HubError, PagePerceptionDriver};
use perceiver_visual::overlay::place_all_labels;
use perceiver_visual::RawCandidate;
use wayfarer_core_types::SoMCandidate;
use tool_click::{ClickError, ClickPageDriver, MarkGeometry};
use tool_type_text::{FillableField, TypeError, TypePageDriver, TypeTarget};
use wayfarer_event_bus::{AgentEvent, AgentEventBus, EventBus};

use crate::drivers::scripts as js;
use cookie_gate::conditions::{
    ACCEPT_PHRASES, COOKIE_SURFACE_SELECTORS, COOKIE_TEXT_KEYWORDS, STRICT_ACCEPT_SELECTORS,
};

/// Bridges every narrow page-driver trait used by the agent loop to one
/// `BrowserDriver`-backed page. `active_page` is shared behind a mutex so
/// a tab-follow can redirect every
/// trait implementation at once without reconstructing this struct.
#[derive(Clone)]
pub struct PageDrivers {
    driver: Arc<dyn BrowserDriver>,
    active_page: Arc<Mutex<PageId>>,
    bus: Option<Arc<AgentEventBus>>,
    run_id: String,
    cursor_steps: Arc<AtomicU64>,
}

impl PageDrivers {
    pub fn new(driver: Arc<dyn BrowserDriver>, initial_page: PageId) -> Self {
        Self {
            driver,
            active_page: Arc::new(Mutex::new(initial_page)),
            bus: None,
            run_id: String::new(),
            cursor_steps: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Attach the Run's event bus so every second cursor-motion step (spec
    /// section 4.5) is published as an `AgentEvent::Cursor`.
    pub fn with_event_bus(mut self, bus: Arc<AgentEventBus>, run_id: impl Into<String>) -> Self {
        self.bus = Some(bus);
        self.run_id = run_id.into();
        self
    }

    pub fn active_page(&self) -> PageId {
        *self.active_page.lock()
    }

    pub fn set_active_page(&self, page: PageId) {
        *self.active_page.lock() = page;
    }

    pub fn browser_driver(&self) -> &Arc<dyn BrowserDriver> {
        &self.driver
    }

    /// Publish a cursor event on every second motion step, so the operator
    /// stream doesn't flood on long paths.
    async fn maybe_publish_cursor(&self, point: Point) {
        let Some(bus) = &self.bus else { return };
        let step = self.cursor_steps.fetch_add(1, Ordering::Relaxed) + 1;
        if step % 2 != 0 {
            return;
        }
        let viewport = self
            .driver
            .viewport_size(self.active_page())
            .await
            .unwrap_or(cdp_adapter::ViewportSize { width: 0, height: 0 });
        let _ = bus
            .publish(AgentEvent::Cursor {
                run_id: self.run_id.clone(),
                x: point.x,
                y: point.y,
                viewport_width: viewport.width,
                viewport_height: viewport.height,
            })
            .await;
    }

    /// `{url, title}` of the active page, for `agent_core::PageContext`.
    pub async fn page_info(&self) -> Result<(String, String), cdp_adapter::AdapterError> {
        let value = self
            .driver
            .evaluate(self.active_page(), &js::page_info_script())
            .await?;
        let raw: dto::RawPageInfo = serde_json::from_value(value)
            .unwrap_or_else(|_| dto::RawPageInfo { url: String::new(), title: String::new() });
        Ok((raw.url, raw.title))
    }
}

fn as_driver_point(point: Point) -> DriverPoint {
    DriverPoint {
        x: point.x,
        y: point.y,
    }
}

#[async_trait]
impl ClickPageDriver for PageDrivers {
    async fn locate_mark(&self, mark_id: u32) -> Result<Option<MarkGeometry>, ClickError> {
        let page = self.active_page();
        let value = self
            .driver
            .evaluate(page, &js::mark_element_script(mark_id))
            .await
            .map_err(|err| ClickError::Driver(err.to_string()))?;
        if value.is_null() {
            return Ok(None);
        }
        let raw: dto::RawElement = serde_json::from_value(value)
            .map_err(|err| ClickError::Driver(format!("malformed element descriptor: {err}")))?;
        let rect = self
            .driver
            .bounding_rect_for_mark(page, mark_id)
            .await
            .map_err(|err| ClickError::Driver(err.to_string()))?
            .map(|r| AnchorDescriptor {
                x: r.x,
                y: r.y,
                width: r.width,
                height: r.height,
            });
        Ok(Some(MarkGeometry {
            element: raw.into(),
            rect,
        }))
    }

    async fn move_cursor(&self, point: Point) -> Result<(), ClickError> {
        let page = self.active_page();
        self.driver
            .mouse_move(page, as_driver_point(point))
            .await
            .map_err(|err| ClickError::Driver(err.to_string()))?;
        self.driver
            .evaluate(page, &js::move_ghost_cursor_script(point))
            .await
            .map_err(|err| ClickError::Driver(err.to_string()))?;
        self.maybe_publish_cursor(point).await;
        Ok(())
    }

    async fn mouse_down(&self, point: Point) -> Result<(), ClickError> {
        self.driver
            .mouse_down(self.active_page(), as_driver_point(point), MouseButton::Left)
            .await
            .map_err(|err| ClickError::Driver(err.to_string()))
    }

    async fn mouse_up(&self, point: Point) -> Result<(), ClickError> {
        self.driver
            .mouse_up(self.active_page(), as_driver_point(point), MouseButton::Left)
            .await
            .map_err(|err| ClickError::Driver(err.to_string()))
    }

    async fn render_ripple(&self, point: Point, ripple: RippleSpec) -> Result<(), ClickError> {
        self.driver
            .evaluate(
                self.active_page(),
                &js::render_ripple_script(point, ripple.radius_px, ripple.filled),
            )
            .await
            .map_err(|err| ClickError::Driver(err.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl TypePageDriver for PageDrivers {
    async fn locate_mark(&self, mark_id: u32) -> Result<Option<TypeTarget>, TypeError> {
        let page = self.active_page();
        let value = self
            .driver
            .evaluate(page, &js::type_target_element_script(mark_id))
            .await
            .map_err(|err| TypeError::Driver(err.to_string()))?;
        if value.is_null() {
            return Ok(None);
        }
        let raw: dto::RawTypeTarget = serde_json::from_value(value)
            .map_err(|err| TypeError::Driver(format!("malformed type target: {err}")))?;
        let rect = self
            .driver
            .bounding_rect_for_mark(page, mark_id)
            .await
            .map_err(|err| TypeError::Driver(err.to_string()))?
            .map(|r| AnchorDescriptor {
                x: r.x,
                y: r.y,
                width: r.width,
                height: r.height,
            });
        Ok(Some(TypeTarget {
            element: raw.element.into(),
            rect,
            fillable: raw.fillable,
        }))
    }

    async fn visible_fillable_fields(&self) -> Result<Vec<FillableField>, TypeError> {
        let value = self
            .driver
            .evaluate(self.active_page(), &js::fillable_fields_script())
            .await
            .map_err(|err| TypeError::Driver(err.to_string()))?;
        let raw: Vec<dto::RawFillableField> = serde_json::from_value(value)
            .map_err(|err| TypeError::Driver(format!("malformed fillable fields: {err}")))?;
        Ok(raw
            .into_iter()
            .map(|f| FillableField {
                element: f.element.into(),
                rect: f.rect.into(),
            })
            .collect())
    }

    async fn move_cursor(&self, point: Point) -> Result<(), TypeError> {
        let page = self.active_page();
        self.driver
            .mouse_move(page, as_driver_point(point))
            .await
            .map_err(|err| TypeError::Driver(err.to_string()))?;
        self.driver
            .evaluate(page, &js::move_ghost_cursor_script(point))
            .await
            .map_err(|err| TypeError::Driver(err.to_string()))?;
        self.maybe_publish_cursor(point).await;
        Ok(())
    }

    async fn mouse_down(&self, point: Point) -> Result<(), TypeError> {
        self.driver
            .mouse_down(self.active_page(), as_driver_point(point), MouseButton::Left)
            .await
            .map_err(|err| TypeError::Driver(err.to_string()))
    }

    async fn mouse_up(&self, point: Point) -> Result<(), TypeError> {
        self.driver
            .mouse_up(self.active_page(), as_driver_point(point), MouseButton::Left)
            .await
            .map_err(|err| TypeError::Driver(err.to_string()))
    }

    async fn render_ripple(&self, point: Point, ripple: RippleSpec) -> Result<(), TypeError> {
        self.driver
            .evaluate(
                self.active_page(),
                &js::render_ripple_script(point, ripple.radius_px, ripple.filled),
            )
            .await
            .map_err(|err| TypeError::Driver(err.to_string()))?;
        Ok(())
    }

    async fn clear_field(&self) -> Result<(), TypeError> {
        self.driver
            .evaluate(self.active_page(), &js::clear_field_script())
            .await
            .map_err(|err| TypeError::Driver(err.to_string()))?;
        Ok(())
    }

    async fn type_char(&self, ch: char) -> Result<(), TypeError> {
        self.driver
            .type_char(self.active_page(), ch)
            .await
            .map_err(|err| TypeError::Driver(err.to_string()))
    }
}

#[async_trait]
impl PagePerceptionDriver for PageDrivers {
    async fn traverse(&self) -> Result<Vec<RawCandidate>, HubError> {
        let value = self
            .driver
            .evaluate(self.active_page(), &js::som_traversal_script())
            .await
            .map_err(|err| HubError::Traversal(err.to_string()))?;
        let raw: Vec<dto::RawSomCandidate> = serde_json::from_value(value)
            .map_err(|err| HubError::Traversal(format!("malformed traversal result: {err}")))?;
        Ok(raw.into_iter().map(Into::into).collect())
    }

    async fn set_overlay_visible(&self, visible: bool) -> Result<(), HubError> {
        self.driver
            .evaluate(self.active_page(), &js::overlay_visibility_script(visible))
            .await
            .map_err(|err| HubError::Traversal(err.to_string()))?;
        Ok(())
    }

    async fn apply_marks(&self, elements: &[SoMCandidate]) -> Result<(), HubError> {
        if elements.is_empty() {
            return Ok(());
        }
        let viewport = self
            .driver
            .viewport_size(self.active_page())
            .await
            .map_err(|err| HubError::Traversal(err.to_string()))?;

        let targets: Vec<(u32, wayfarer_core_types::BoundingRect)> =
            elements.iter().map(|e| (e.id, e.rect)).collect();
        let labels = place_all_labels(&targets, viewport.width as f64, viewport.height as f64);

        let placements: Vec<js::MarkPlacement> = elements
            .iter()
            .zip(labels.iter())
            .map(|(element, (_, label))| js::MarkPlacement {
                mark_id: element.id,
                dom_path: element.dom_path.clone(),
                label: *label,
            })
            .collect();

        self.driver
            .evaluate(self.active_page(), &js::apply_marks_script(&placements))
            .await
            .map_err(|err| HubError::Traversal(err.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl CookiePageDriver for PageDrivers {
    async fn scan_surface(&self) -> Result<Vec<SurfaceNode>, CookieGateError> {
        let value = self
            .driver
            .evaluate(
                self.active_page(),
                &js::cookie_scan_script(COOKIE_SURFACE_SELECTORS, COOKIE_TEXT_KEYWORDS),
            )
            .await
            .map_err(|err| CookieGateError::DetectionFailed(err.to_string()))?;
        let raw: Vec<dto::RawSurfaceNode> = serde_json::from_value(value)
            .map_err(|err| CookieGateError::DetectionFailed(format!("{err}")))?;
        Ok(raw.into_iter().map(Into::into).collect())
    }

    async fn try_strict_selectors(&self) -> Result<bool, CookieGateError> {
        let value = self
            .driver
            .evaluate(
                self.active_page(),
                &js::strict_selectors_script(STRICT_ACCEPT_SELECTORS),
            )
            .await
            .map_err(|err| CookieGateError::DismissalFailed(err.to_string()))?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn try_container_text_pattern(&self) -> Result<bool, CookieGateError> {
        let value = self
            .driver
            .evaluate(
                self.active_page(),
                &js::container_text_pattern_script(COOKIE_SURFACE_SELECTORS, ACCEPT_PHRASES),
            )
            .await
            .map_err(|err| CookieGateError::DismissalFailed(err.to_string()))?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn list_frames(&self) -> Result<Vec<String>, CookieGateError> {
        self.driver
            .list_subframes(self.active_page())
            .await
            .map_err(|err| CookieGateError::DetectionFailed(err.to_string()))
    }

    async fn try_strict_selectors_in_frame(&self, frame_id: &str) -> Result<bool, CookieGateError> {
        let value = self
            .driver
            .evaluate_in_frame(
                self.active_page(),
                frame_id,
                &js::strict_selectors_script(STRICT_ACCEPT_SELECTORS),
            )
            .await
            .map_err(|err| CookieGateError::DismissalFailed(err.to_string()))?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn vision_candidates(&self) -> Result<Vec<AcceptCandidate>, CookieGateError> {
        let value = self
            .driver
            .evaluate(
                self.active_page(),
                &js::vision_candidates_script(COOKIE_SURFACE_SELECTORS, ACCEPT_PHRASES),
            )
            .await
            .map_err(|err| CookieGateError::DetectionFailed(err.to_string()))?;
        let raw: Vec<dto::RawAcceptCandidate> = serde_json::from_value(value)
            .map_err(|err| CookieGateError::DetectionFailed(format!("{err}")))?;
        Ok(raw.into_iter().map(Into::into).collect())
    }

    async fn viewport_height(&self) -> Result<f64, CookieGateError> {
        let size = self
            .driver
            .viewport_size(self.active_page())
            .await
            .map_err(|err| CookieGateError::DetectionFailed(err.to_string()))?;
        Ok(size.height as f64)
    }

    async fn click_at(&self, x: f64, y: f64) -> Result<(), CookieGateError> {
        let page = self.active_page();
        let point = DriverPoint { x, y };
        self.driver
            .mouse_move(page, point)
            .await
            .map_err(|err| CookieGateError::DismissalFailed(err.to_string()))?;
        self.driver
            .mouse_down(page, point, MouseButton::Left)
            .await
            .map_err(|err| CookieGateError::DismissalFailed(err.to_string()))?;
        self.driver
            .mouse_up(page, point, MouseButton::Left)
            .await
            .map_err(|err| CookieGateError::DismissalFailed(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdp_adapter::{MockDriver, ViewportSize};

    #[tokio::test]
    async fn tab_switch_redirects_every_trait_at_once() {
        let driver: Arc<dyn BrowserDriver> = Arc::new(MockDriver::new(ViewportSize {
            width: 1280,
            height: 800,
        }));
        let page_a = driver.new_page().await.unwrap();
        let page_b = driver.new_page().await.unwrap();
        let drivers = PageDrivers::new(driver, page_a);
        assert_eq!(drivers.active_page(), page_a);
        drivers.set_active_page(page_b);
        assert_eq!(drivers.active_page(), page_b);
    }

    #[tokio::test]
    async fn cursor_events_publish_on_every_second_motion_step() {
        let mock = Arc::new(MockDriver::new(ViewportSize {
            width: 1280,
            height: 800,
        }));
        let page = mock.first_page();
        let bus = AgentEventBus::new(16);
        let mut rx = bus.subscribe();
        let drivers = PageDrivers::new(mock, page).with_event_bus(bus, "run-1");

        ClickPageDriver::move_cursor(&drivers, Point::new(10.0, 10.0)).await.unwrap();
        ClickPageDriver::move_cursor(&drivers, Point::new(20.0, 20.0)).await.unwrap();
        ClickPageDriver::move_cursor(&drivers, Point::new(30.0, 30.0)).await.unwrap();

        let first = rx.try_recv().unwrap();
        match first {
            AgentEvent::Cursor { run_id, x, y, viewport_width, viewport_height } => {
                assert_eq!(run_id, "run-1");
                assert_eq!((x, y), (20.0, 20.0));
                assert_eq!((viewport_width, viewport_height), (1280, 800));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(rx.try_recv().is_err(), "no cursor event on the third (odd) step");
    }

    #[tokio::test]
    async fn vision_click_at_moves_and_clicks_the_real_mouse() {
        let mock = Arc::new(MockDriver::new(ViewportSize {
            width: 1280,
            height: 800,
        }));
        let page = mock.first_page();
        let drivers = PageDrivers::new(mock.clone(), page);
        CookiePageDriver::click_at(&drivers, 12.0, 34.0).await.unwrap();
        let calls = mock.calls();
        assert!(calls
            .iter()
            .any(|c| matches!(c, cdp_adapter::mock::RecordedCall::MouseDown { .. })));
        assert!(calls
            .iter()
            .any(|c| matches!(c, cdp_adapter::mock::RecordedCall::MouseUp { .. })));
    }
}

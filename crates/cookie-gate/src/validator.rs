//! Escalating dismissal orchestration: strict selectors
//! -> container+text-pattern -> iframe pass -> vision-coordinate fallback,
//! each attempt verified by re-running detection after the page had a
//! chance to react.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::errors::CookieGateError;
use crate::evidence::{surface_present, SurfaceNode};
use crate::scoring::pick_best;
use crate::types::{AcceptCandidate, DismissEvidence, DismissLayer};

/// Wait this long after an attempt before re-checking whether the surface
/// is gone.
pub const VERIFY_DELAY: Duration = Duration::from_millis(850);

/// What the in-page cookie-surface scan and dismissal scripts report back
/// (a cross-boundary script execution). Implemented by
/// `cdp-adapter` against a real page and by test doubles everywhere else.
#[async_trait]
pub trait CookiePageDriver: Send + Sync {
    /// Scan the main document for a cookie surface.
    async fn scan_surface(&self) -> Result<Vec<SurfaceNode>, CookieGateError>;

    /// Layer 1: try the known-good vendor selector list against the main
    /// document. Returns `true` if an element was found and clicked.
    async fn try_strict_selectors(&self) -> Result<bool, CookieGateError>;

    /// Layer 2: within any visible cookie-context container, click the
    /// first accept-phrase match.
    async fn try_container_text_pattern(&self) -> Result<bool, CookieGateError>;

    /// CDP frame ids of every non-main frame on the page.
    async fn list_frames(&self) -> Result<Vec<String>, CookieGateError>;

    /// Layer 3: try the strict selector list inside the given frame.
    async fn try_strict_selectors_in_frame(&self, frame_id: &str) -> Result<bool, CookieGateError>;

    /// Layer 4: gather on-screen accept-phrase candidates for vision
    /// scoring.
    async fn vision_candidates(&self) -> Result<Vec<AcceptCandidate>, CookieGateError>;

    /// Current viewport height, used by the vision scorer's vertical bonus.
    async fn viewport_height(&self) -> Result<f64, CookieGateError>;

    /// Click at an absolute page coordinate via simulated mouse motion.
    async fn click_at(&self, x: f64, y: f64) -> Result<(), CookieGateError>;
}

async fn verified_gone(driver: &dyn CookiePageDriver) -> bool {
    sleep(VERIFY_DELAY).await;
    match driver.scan_surface().await {
        Ok(nodes) => !surface_present(&nodes),
        Err(_) => false,
    }
}

/// Run the full escalation. Returns `None` immediately if no cookie
/// surface is detected, or once a layer's attempt is verified to have
/// dismissed it. Never returns an error: failures of any layer are
/// absorbed and escalation continues.
pub async fn dismiss(driver: &dyn CookiePageDriver) -> Option<DismissEvidence> {
    let nodes = driver.scan_surface().await.ok()?;
    if !surface_present(&nodes) {
        return None;
    }

    if matches!(driver.try_strict_selectors().await, Ok(true)) && verified_gone(driver).await {
        crate::metrics::record_dismissal(DismissLayer::StrictSelector.metric_label());
        return Some(DismissEvidence {
            layer: DismissLayer::StrictSelector,
            note: DismissLayer::StrictSelector.note(None),
            coordinates: None,
        });
    }

    if matches!(driver.try_container_text_pattern().await, Ok(true)) && verified_gone(driver).await
    {
        crate::metrics::record_dismissal(DismissLayer::ContainerTextPattern.metric_label());
        return Some(DismissEvidence {
            layer: DismissLayer::ContainerTextPattern,
            note: DismissLayer::ContainerTextPattern.note(None),
            coordinates: None,
        });
    }

    if let Ok(frames) = driver.list_frames().await {
        for frame_id in frames {
            if matches!(
                driver.try_strict_selectors_in_frame(&frame_id).await,
                Ok(true)
            ) && verified_gone(driver).await
            {
                crate::metrics::record_dismissal(DismissLayer::Iframe.metric_label());
                return Some(DismissEvidence {
                    layer: DismissLayer::Iframe,
                    note: DismissLayer::Iframe.note(None),
                    coordinates: None,
                });
            }
        }
    }

    let candidates = driver.vision_candidates().await.ok()?;
    let viewport_height = driver.viewport_height().await.ok()?;
    let (candidate, phrase) = pick_best(&candidates, viewport_height)?;
    let (cx, cy) = candidate.center();
    if driver.click_at(cx, cy).await.is_ok() && verified_gone(driver).await {
        crate::metrics::record_dismissal(DismissLayer::VisionFallback.metric_label());
        return Some(DismissEvidence {
            layer: DismissLayer::VisionFallback,
            note: DismissLayer::VisionFallback.note(Some(phrase)),
            coordinates: Some((cx, cy)),
        });
    }

    None
}

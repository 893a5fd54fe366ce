#![allow(dead_code)]
//! Orchestrates one Set-of-Marks perception pass against the active page.

pub mod errors;
pub mod stability;

use std::time::Duration;

use async_trait::async_trait;
pub use errors::{HubError, Result};
use perceiver_visual::{discover, RawCandidate};
use tracing::warn;
use wayfarer_core_types::{SoMCandidate, SomResult};

/// Hard ceiling on one perception pass.
pub const PERCEPTION_CEILING: Duration = Duration::from_secs(5);

/// What the in-page traversal (a cross-boundary script execution) reports
/// back. Implemented by `cdp-adapter` against a real page and by test
/// doubles everywhere else.
#[async_trait]
pub trait PagePerceptionDriver: Send + Sync {
    async fn traverse(&self) -> std::result::Result<Vec<RawCandidate>, HubError>;
    async fn set_overlay_visible(&self, visible: bool) -> std::result::Result<(), HubError>;
    /// Write the mark attribute back onto every surviving element and draw
    /// its outline/label, keyed by the `dom_path` each carried from
    /// traversal. Runs once discovery has already picked the final set.
    async fn apply_marks(&self, elements: &[SoMCandidate]) -> std::result::Result<(), HubError>;
}

/// Run discovery with the 5s hard ceiling, then paint the surviving marks
/// back onto the page. Returns `None` on timeout or traversal failure,
/// matching "perception returns null and the loop proceeds with the raw
/// screenshot".
pub async fn perceive(driver: &dyn PagePerceptionDriver) -> Option<SomResult> {
    match tokio::time::timeout(PERCEPTION_CEILING, driver.traverse()).await {
        Ok(Ok(raw)) => {
            let result = discover(raw);
            if let Err(err) = driver.apply_marks(&result.elements).await {
                warn!(error = %err, "failed to paint marks onto the page");
            }
            Some(result)
        }
        Ok(Err(err)) => {
            warn!(error = %err, "SoM traversal failed");
            None
        }
        Err(_) => {
            warn!("SoM traversal exceeded the {:?} ceiling", PERCEPTION_CEILING);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_core_types::BoundingRect;

    struct ImmediateDriver(Vec<RawCandidate>);

    #[async_trait]
    impl PagePerceptionDriver for ImmediateDriver {
        async fn traverse(&self) -> std::result::Result<Vec<RawCandidate>, HubError> {
            Ok(self.0.clone())
        }
        async fn set_overlay_visible(&self, _visible: bool) -> std::result::Result<(), HubError> {
            Ok(())
        }
        async fn apply_marks(&self, _elements: &[SoMCandidate]) -> std::result::Result<(), HubError> {
            Ok(())
        }
    }

    struct HangingDriver;

    #[async_trait]
    impl PagePerceptionDriver for HangingDriver {
        async fn traverse(&self) -> std::result::Result<Vec<RawCandidate>, HubError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![])
        }
        async fn set_overlay_visible(&self, _visible: bool) -> std::result::Result<(), HubError> {
            Ok(())
        }
        async fn apply_marks(&self, _elements: &[SoMCandidate]) -> std::result::Result<(), HubError> {
            Ok(())
        }
    }

    fn sample_candidate() -> RawCandidate {
        RawCandidate {
            tag: "a".into(),
            role: None,
            text: Some("Shop".into()),
            aria_label: None,
            title: None,
            href: Some("/shop".into()),
            rect: BoundingRect { x: 0.0, y: 0.0, width: 40.0, height: 20.0 },
            dom_path: "0".into(),
            is_native_interactive_tag: true,
            is_aria_interactive_role: false,
            has_onclick_or_tabindex: false,
            cursor_pointer_with_semantic_hint: false,
            hidden: false,
            disabled: false,
            aria_disabled: false,
            aria_hidden: false,
            is_hidden_input: false,
            display_none: false,
            visibility_hidden: false,
            pointer_events_none: false,
            intersects_viewport: true,
            ancestor_scores: vec![],
        }
    }

    #[tokio::test]
    async fn perceive_returns_discovery_result_on_success() {
        let driver = ImmediateDriver(vec![sample_candidate()]);
        let result = perceive(&driver).await.expect("should succeed");
        assert_eq!(result.count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn perceive_returns_none_past_ceiling() {
        let driver = HangingDriver;
        let handle = tokio::spawn(async move { perceive(&driver).await });
        tokio::time::advance(PERCEPTION_CEILING + Duration::from_millis(1)).await;
        let result = handle.await.unwrap();
        assert!(result.is_none());
    }
}

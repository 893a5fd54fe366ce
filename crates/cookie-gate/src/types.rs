//! Shared types for cookie-surface detection and dismissal.

use serde::{Deserialize, Serialize};

/// Which escalating layer performed a dismissal.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum DismissLayer {
    StrictSelector,
    ContainerTextPattern,
    Iframe,
    VisionFallback,
}

impl DismissLayer {
    pub fn note(&self, phrase: Option<&str>) -> String {
        match self {
            DismissLayer::StrictSelector => "cookie banner strict selector".to_string(),
            DismissLayer::ContainerTextPattern => "cookie banner container text pattern".to_string(),
            DismissLayer::Iframe => "cookie banner iframe pass".to_string(),
            DismissLayer::VisionFallback => format!(
                "cookie banner vision fallback ({})",
                phrase.unwrap_or("accept")
            ),
        }
    }

    /// Stable metrics label, distinct from [`Self::note`] which carries a
    /// human-readable phrase.
    pub fn metric_label(&self) -> &'static str {
        match self {
            DismissLayer::StrictSelector => "strict_selector",
            DismissLayer::ContainerTextPattern => "container_text_pattern",
            DismissLayer::Iframe => "iframe",
            DismissLayer::VisionFallback => "vision_fallback",
        }
    }
}

/// Outcome of one dismissal attempt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DismissEvidence {
    pub layer: DismissLayer,
    pub note: String,
    pub coordinates: Option<(f64, f64)>,
}

/// A node on screen, as reported by the in-page candidate scan, used both
/// by the container+text-pattern layer and the vision-coordinate fallback.
#[derive(Clone, Debug, PartialEq)]
pub struct AcceptCandidate {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Distance in ancestor hops to the nearest cookie-context container,
    /// `None` if not inside one.
    pub cookie_ancestor_depth: Option<u32>,
}

impl AcceptCandidate {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }
}

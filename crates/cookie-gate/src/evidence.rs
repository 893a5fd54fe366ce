//! Cookie-surface detection.
//!
//! The traversal itself is a cross-boundary script execution; this module models what it reports back and decides, from that
//! report, whether a cookie surface is present.

use serde::{Deserialize, Serialize};

use crate::conditions::text_matches_cookie_keywords;

/// One visible element as reported by the in-page cookie-surface scan.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SurfaceNode {
    pub matched_selector: bool,
    pub block_text: Option<String>,
}

/// Whether a cookie surface is currently visible on the page (spec
/// section 4.4 "Detection"): a visible element matched one of the fixed
/// selectors, or a visible block-level element carries >=20 chars of
/// keyword-matching text.
pub fn surface_present(nodes: &[SurfaceNode]) -> bool {
    nodes.iter().any(|node| {
        node.matched_selector
            || node
                .block_text
                .as_deref()
                .map(text_matches_cookie_keywords)
                .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_nodes_means_no_surface() {
        assert!(!surface_present(&[]));
    }

    #[test]
    fn selector_match_alone_is_sufficient() {
        let nodes = vec![SurfaceNode {
            matched_selector: true,
            block_text: None,
        }];
        assert!(surface_present(&nodes));
    }

    #[test]
    fn text_match_alone_is_sufficient() {
        let nodes = vec![SurfaceNode {
            matched_selector: false,
            block_text: Some("We use cookies to improve your experience.".into()),
        }];
        assert!(surface_present(&nodes));
    }

    #[test]
    fn short_text_is_not_sufficient() {
        let nodes = vec![SurfaceNode {
            matched_selector: false,
            block_text: Some("cookie".into()),
        }];
        assert!(!surface_present(&nodes));
    }
}

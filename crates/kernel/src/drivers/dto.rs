//! Deserialization targets for the JSON shapes
//! [`super::scripts::DESCRIBE_ELEMENT_HELPER`] and friends hand back from
//! `BrowserDriver::evaluate`, converted into the workspace's own model
//! types (several of which, like [`ElementDescriptor`], don't derive
//! `Deserialize` themselves).

use serde::Deserialize;

use action_locator::{AncestorDescriptor, ElementDescriptor};
use action_primitives::AnchorDescriptor;
use cookie_gate::{AcceptCandidate, SurfaceNode};
use perceiver_visual::RawCandidate;
use wayfarer_core_types::BoundingRect;

#[derive(Deserialize)]
pub struct RawElement {
    pub tag: String,
    pub id: Option<String>,
    pub test_id: Option<String>,
    pub name: Option<String>,
    pub placeholder: Option<String>,
    pub href: Option<String>,
    pub aria_label: Option<String>,
    pub nth_of_type: usize,
    pub ancestors: Vec<RawAncestor>,
}

#[derive(Deserialize)]
pub struct RawAncestor {
    pub tag: String,
    pub nth_of_type: usize,
}

impl From<RawElement> for ElementDescriptor {
    fn from(raw: RawElement) -> Self {
        ElementDescriptor {
            tag: raw.tag,
            id: raw.id,
            test_id: raw.test_id,
            name: raw.name,
            placeholder: raw.placeholder,
            href: raw.href,
            aria_label: raw.aria_label,
            nth_of_type: raw.nth_of_type,
            ancestors: raw
                .ancestors
                .into_iter()
                .map(|a| AncestorDescriptor {
                    tag: a.tag,
                    nth_of_type: a.nth_of_type,
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
pub struct RawTypeTarget {
    pub element: RawElement,
    pub fillable: bool,
}

#[derive(Deserialize)]
pub struct RawFillableField {
    pub element: RawElement,
    pub rect: RawRect,
}

#[derive(Deserialize)]
pub struct RawRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<RawRect> for AnchorDescriptor {
    fn from(raw: RawRect) -> Self {
        AnchorDescriptor {
            x: raw.x,
            y: raw.y,
            width: raw.width,
            height: raw.height,
        }
    }
}

impl From<RawRect> for BoundingRect {
    fn from(raw: RawRect) -> Self {
        BoundingRect {
            x: raw.x,
            y: raw.y,
            width: raw.width,
            height: raw.height,
        }
    }
}

#[derive(Deserialize)]
pub struct RawSurfaceNode {
    pub matched_selector: bool,
    pub block_text: Option<String>,
}

impl From<RawSurfaceNode> for SurfaceNode {
    fn from(raw: RawSurfaceNode) -> Self {
        SurfaceNode {
            matched_selector: raw.matched_selector,
            block_text: raw.block_text,
        }
    }
}

#[derive(Deserialize)]
pub struct RawAcceptCandidate {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub cookie_ancestor_depth: Option<u32>,
}

impl From<RawAcceptCandidate> for AcceptCandidate {
    fn from(raw: RawAcceptCandidate) -> Self {
        AcceptCandidate {
            text: raw.text,
            x: raw.x,
            y: raw.y,
            width: raw.width,
            height: raw.height,
            cookie_ancestor_depth: raw.cookie_ancestor_depth,
        }
    }
}

/// Mirrors every field of [`RawCandidate`] (which has no `Deserialize`
/// impl of its own) as reported by the SoM traversal script.
#[derive(Deserialize)]
pub struct RawSomCandidate {
    pub tag: String,
    pub role: Option<String>,
    pub text: Option<String>,
    pub aria_label: Option<String>,
    pub title: Option<String>,
    pub href: Option<String>,
    pub rect: RawRect,
    pub dom_path: String,
    pub is_native_interactive_tag: bool,
    pub is_aria_interactive_role: bool,
    pub has_onclick_or_tabindex: bool,
    pub cursor_pointer_with_semantic_hint: bool,
    pub hidden: bool,
    pub disabled: bool,
    pub aria_disabled: bool,
    pub aria_hidden: bool,
    pub is_hidden_input: bool,
    pub display_none: bool,
    pub visibility_hidden: bool,
    pub pointer_events_none: bool,
    pub intersects_viewport: bool,
    pub ancestor_scores: Vec<u8>,
}

/// The shape `scripts::page_info_script` reports back.
#[derive(Deserialize)]
pub struct RawPageInfo {
    pub url: String,
    pub title: String,
}

impl From<RawSomCandidate> for RawCandidate {
    fn from(raw: RawSomCandidate) -> Self {
        RawCandidate {
            tag: raw.tag,
            role: raw.role,
            text: raw.text,
            aria_label: raw.aria_label,
            title: raw.title,
            href: raw.href,
            rect: raw.rect.into(),
            dom_path: raw.dom_path,
            is_native_interactive_tag: raw.is_native_interactive_tag,
            is_aria_interactive_role: raw.is_aria_interactive_role,
            has_onclick_or_tabindex: raw.has_onclick_or_tabindex,
            cursor_pointer_with_semantic_hint: raw.cursor_pointer_with_semantic_hint,
            hidden: raw.hidden,
            disabled: raw.disabled,
            aria_disabled: raw.aria_disabled,
            aria_hidden: raw.aria_hidden,
            is_hidden_input: raw.is_hidden_input,
            display_none: raw.display_none,
            visibility_hidden: raw.visibility_hidden,
            pointer_events_none: raw.pointer_events_none,
            intersects_viewport: raw.intersects_viewport,
            ancestor_scores: raw.ancestor_scores,
        }
    }
}

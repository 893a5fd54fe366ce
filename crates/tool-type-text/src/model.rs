//! Outcome of a successful type action, and what the in-page mark lookup
//! reports about a candidate target.

use action_locator::ElementDescriptor;
use action_primitives::{AnchorDescriptor, ClickPlan, Point};

/// Everything the caller needs to build a trace step for a completed type
/// action.
#[derive(Clone, Debug)]
pub struct TypeOutcome {
    pub selector: String,
    pub point: Point,
    pub focus_click: ClickPlan,
    pub value: String,
    /// `true` if the decided target was not itself fillable and the
    /// nearest visible fillable field was used instead.
    pub used_fallback: bool,
}

/// What the in-page mark lookup reports for a candidate type target: its
/// attributes, bounding rectangle (if any), and whether it is itself
/// "fillable".
#[derive(Clone, Debug)]
pub struct TypeTarget {
    pub element: ElementDescriptor,
    pub rect: Option<AnchorDescriptor>,
    pub fillable: bool,
}

/// One visible fillable input/textarea, a candidate for the nearest-field
/// fallback search.
#[derive(Clone, Debug)]
pub struct FillableField {
    pub element: ElementDescriptor,
    pub rect: AnchorDescriptor,
}

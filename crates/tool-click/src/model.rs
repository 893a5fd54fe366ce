//! Outcome of a successful click.

use action_primitives::{ClickPlan, Point};

/// Everything the caller needs to build a trace step and replay the click.
#[derive(Clone, Debug)]
pub struct ClickOutcome {
    pub selector: String,
    pub point: Point,
    pub plan: ClickPlan,
}

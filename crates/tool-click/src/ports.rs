//! Driver boundary for the click executor. A real page and deterministic test doubles both
//! satisfy this.

use async_trait::async_trait;

use action_locator::ElementDescriptor;
use action_primitives::{AnchorDescriptor, Point, RippleSpec};

use crate::errors::ClickError;

/// What the in-page mark lookup reports back for one mark id: its
/// attributes (for selector derivation) and its bounding rectangle, if any.
#[derive(Clone, Debug)]
pub struct MarkGeometry {
    pub element: ElementDescriptor,
    pub rect: Option<AnchorDescriptor>,
}

#[async_trait]
pub trait ClickPageDriver: Send + Sync {
    /// Scroll the mark into view and report its geometry. `None` if no
    /// element on the page currently carries this mark id.
    async fn locate_mark(&self, mark_id: u32) -> Result<Option<MarkGeometry>, ClickError>;

    /// One step of a cursor motion: moves the real mouse and the in-page
    /// ghost-cursor element.
    async fn move_cursor(&self, point: Point) -> Result<(), ClickError>;

    async fn mouse_down(&self, point: Point) -> Result<(), ClickError>;

    async fn mouse_up(&self, point: Point) -> Result<(), ClickError>;

    /// Render a ripple animation at `point`.
    async fn render_ripple(&self, point: Point, ripple: RippleSpec) -> Result<(), ClickError>;
}

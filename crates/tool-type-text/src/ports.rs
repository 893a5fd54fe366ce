//! Driver boundary for the type executor. A real page and deterministic test doubles both
//! satisfy this.

use async_trait::async_trait;

use action_primitives::{Point, RippleSpec};

use crate::errors::TypeError;
use crate::model::{FillableField, TypeTarget};

#[async_trait]
pub trait TypePageDriver: Send + Sync {
    /// Scroll the mark into view and report its geometry and fillability.
    /// `None` if no element on the page currently carries this mark id.
    async fn locate_mark(&self, mark_id: u32) -> Result<Option<TypeTarget>, TypeError>;

    /// Every currently visible fillable input/textarea on the page (spec
    /// section 4.5 "type" fallback search).
    async fn visible_fillable_fields(&self) -> Result<Vec<FillableField>, TypeError>;

    /// One step of a cursor motion: moves the real mouse and the in-page
    /// ghost-cursor element.
    async fn move_cursor(&self, point: Point) -> Result<(), TypeError>;

    async fn mouse_down(&self, point: Point) -> Result<(), TypeError>;

    async fn mouse_up(&self, point: Point) -> Result<(), TypeError>;

    /// Render a ripple animation at `point`.
    async fn render_ripple(&self, point: Point, ripple: RippleSpec) -> Result<(), TypeError>;

    /// Clear the currently focused field's value.
    async fn clear_field(&self) -> Result<(), TypeError>;

    /// Type one character into the focused field via synthetic key events.
    async fn type_char(&self, ch: char) -> Result<(), TypeError>;
}

//! Click execution: resolve the mark, plan a
//! human-like motion and click, replay it against the driver, and derive
//! a stable selector for the trace step.

use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;

use action_locator::derive_selector;
use action_primitives::{plan_click, Point};

use crate::errors::ClickError;
use crate::model::ClickOutcome;
use crate::ports::ClickPageDriver;

/// Click `mark_id`, starting the cursor motion from `cursor_start` (the
/// page's last known cursor position, owned by the caller across turns).
pub async fn click(
    driver: &dyn ClickPageDriver,
    mark_id: u32,
    cursor_start: Point,
    rng: &mut impl Rng,
) -> Result<ClickOutcome, ClickError> {
    let geometry = driver
        .locate_mark(mark_id)
        .await?
        .ok_or(ClickError::MissingElement(mark_id))?;
    let rect = geometry
        .rect
        .ok_or(ClickError::MissingBoundingRect(mark_id))?;

    let plan = plan_click(cursor_start, &rect, rng);
    for step in &plan.motion.steps {
        driver.move_cursor(step.point).await?;
    }
    let click_point = plan.motion.final_point().unwrap_or(cursor_start);

    driver.render_ripple(click_point, plan.down_ripple).await?;
    driver.mouse_down(click_point).await?;
    sleep(Duration::from_millis(plan.down_up_pause_ms)).await;
    driver.mouse_up(click_point).await?;
    driver.render_ripple(click_point, plan.up_ripple).await?;

    let selector = derive_selector(&geometry.element);
    Ok(ClickOutcome {
        selector,
        point: click_point,
        plan,
    })
}

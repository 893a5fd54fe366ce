//! Type action execution: focus-click the decided
//! target, falling back to the nearest visible fillable field if it isn't
//! one itself, clear it, and type the value with human-like per-character
//! delay.

use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;

use action_locator::derive_selector;
use action_primitives::{nearest_anchor, plan_click, plan_typing, AnchorDescriptor, ClickPlan, Point};

use crate::errors::TypeError;
use crate::model::TypeOutcome;
use crate::ports::TypePageDriver;

async fn focus_click(
    driver: &dyn TypePageDriver,
    rect: &AnchorDescriptor,
    cursor_start: Point,
    rng: &mut impl Rng,
) -> Result<ClickPlan, TypeError> {
    let plan = plan_click(cursor_start, rect, rng);
    for step in &plan.motion.steps {
        driver.move_cursor(step.point).await?;
    }
    let click_point = plan.motion.final_point().unwrap_or(cursor_start);
    driver.render_ripple(click_point, plan.down_ripple).await?;
    driver.mouse_down(click_point).await?;
    sleep(Duration::from_millis(plan.down_up_pause_ms)).await;
    driver.mouse_up(click_point).await?;
    driver.render_ripple(click_point, plan.up_ripple).await?;
    Ok(plan)
}

/// Type `value` into `mark_id`, starting the cursor motion from
/// `cursor_start` (the page's last known cursor position, owned by the
/// caller across turns).
pub async fn type_text(
    driver: &dyn TypePageDriver,
    mark_id: u32,
    value: &str,
    cursor_start: Point,
    rng: &mut impl Rng,
) -> Result<TypeOutcome, TypeError> {
    let target = driver
        .locate_mark(mark_id)
        .await?
        .ok_or(TypeError::MissingElement(mark_id))?;
    let rect = target
        .rect
        .ok_or(TypeError::MissingBoundingRect(mark_id))?;

    let mut plan = focus_click(driver, &rect, cursor_start, rng).await?;
    let mut click_point = plan.motion.final_point().unwrap_or(cursor_start);
    let mut element = target.element;
    let mut used_fallback = false;

    if !target.fillable {
        let fields = driver.visible_fillable_fields().await?;
        let rects: Vec<AnchorDescriptor> = fields.iter().map(|f| f.rect).collect();
        let idx = nearest_anchor(click_point, &rects).ok_or(TypeError::NoFillableFallback)?;
        let field = fields[idx].clone();
        plan = focus_click(driver, &field.rect, click_point, rng).await?;
        click_point = plan.motion.final_point().unwrap_or(click_point);
        element = field.element;
        used_fallback = true;
    }

    driver.clear_field().await?;
    let typing = plan_typing(value, rng);
    for (ch, delay_ms) in value.chars().zip(typing.delays_ms.iter()) {
        driver.type_char(ch).await?;
        sleep(Duration::from_millis(*delay_ms)).await;
    }

    let selector = derive_selector(&element);
    Ok(TypeOutcome {
        selector,
        point: click_point,
        focus_click: plan,
        value: value.to_string(),
        used_fallback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_locator::ElementDescriptor;
    use action_primitives::RippleSpec;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::model::{FillableField, TypeTarget};

    #[derive(Default)]
    struct Scripted {
        target: Option<TypeTarget>,
        fields: Vec<FillableField>,
        typed: Mutex<String>,
        cleared: Mutex<u32>,
        moves: Mutex<u32>,
        ripples: Mutex<Vec<RippleSpec>>,
    }

    #[async_trait]
    impl TypePageDriver for Scripted {
        async fn locate_mark(&self, _mark_id: u32) -> Result<Option<TypeTarget>, TypeError> {
            Ok(self.target.clone())
        }

        async fn visible_fillable_fields(&self) -> Result<Vec<FillableField>, TypeError> {
            Ok(self.fields.clone())
        }

        async fn move_cursor(&self, _point: Point) -> Result<(), TypeError> {
            *self.moves.lock() += 1;
            Ok(())
        }

        async fn mouse_down(&self, _point: Point) -> Result<(), TypeError> {
            Ok(())
        }

        async fn mouse_up(&self, _point: Point) -> Result<(), TypeError> {
            Ok(())
        }

        async fn render_ripple(&self, _point: Point, ripple: RippleSpec) -> Result<(), TypeError> {
            self.ripples.lock().push(ripple);
            Ok(())
        }

        async fn clear_field(&self) -> Result<(), TypeError> {
            *self.cleared.lock() += 1;
            self.typed.lock().clear();
            Ok(())
        }

        async fn type_char(&self, ch: char) -> Result<(), TypeError> {
            self.typed.lock().push(ch);
            Ok(())
        }
    }

    fn input_element(id: &str) -> ElementDescriptor {
        ElementDescriptor {
            tag: "input".into(),
            id: Some(id.into()),
            nth_of_type: 1,
            ..Default::default()
        }
    }

    fn span_element() -> ElementDescriptor {
        ElementDescriptor {
            tag: "span".into(),
            nth_of_type: 1,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn missing_element_is_reported() {
        let driver = Scripted::default();
        let mut rng = StdRng::seed_from_u64(1);
        let err = type_text(&driver, 4, "bmw", Point::new(0.0, 0.0), &mut rng)
            .await
            .unwrap_err();
        assert!(matches!(err, TypeError::MissingElement(4)));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_bounding_rect_is_reported() {
        let driver = Scripted {
            target: Some(TypeTarget {
                element: input_element("search"),
                rect: None,
                fillable: true,
            }),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(2);
        let err = type_text(&driver, 4, "bmw", Point::new(0.0, 0.0), &mut rng)
            .await
            .unwrap_err();
        assert!(matches!(err, TypeError::MissingBoundingRect(4)));
    }

    #[tokio::test(start_paused = true)]
    async fn fillable_target_is_typed_into_directly() {
        let driver = Scripted {
            target: Some(TypeTarget {
                element: input_element("search"),
                rect: Some(AnchorDescriptor { x: 0.0, y: 0.0, width: 200.0, height: 32.0 }),
                fillable: true,
            }),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let handle = tokio::spawn(async move {
            let outcome = type_text(&driver, 4, "bmw", Point::new(0.0, 0.0), &mut rng)
                .await
                .unwrap();
            (outcome, driver)
        });
        tokio::time::advance(Duration::from_secs(2)).await;
        let (outcome, driver) = handle.await.unwrap();

        assert_eq!(outcome.selector, "#search");
        assert!(!outcome.used_fallback);
        assert_eq!(outcome.value, "bmw");
        assert_eq!(*driver.typed.lock(), "bmw");
        assert_eq!(*driver.cleared.lock(), 1);
        assert_eq!(driver.ripples.lock().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn non_fillable_target_falls_back_to_nearest_field() {
        let driver = Scripted {
            target: Some(TypeTarget {
                element: span_element(),
                rect: Some(AnchorDescriptor { x: 0.0, y: 0.0, width: 20.0, height: 20.0 }),
                fillable: false,
            }),
            fields: vec![
                FillableField {
                    element: input_element("far"),
                    rect: AnchorDescriptor { x: 900.0, y: 900.0, width: 100.0, height: 30.0 },
                },
                FillableField {
                    element: input_element("near"),
                    rect: AnchorDescriptor { x: 10.0, y: 10.0, width: 100.0, height: 30.0 },
                },
            ],
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(4);
        let handle = tokio::spawn(async move {
            let outcome = type_text(&driver, 7, "bmw", Point::new(0.0, 0.0), &mut rng)
                .await
                .unwrap();
            (outcome, driver)
        });
        tokio::time::advance(Duration::from_secs(2)).await;
        let (outcome, driver) = handle.await.unwrap();

        assert!(outcome.used_fallback);
        assert_eq!(outcome.selector, "#near");
        assert_eq!(*driver.typed.lock(), "bmw");
        // One focus-click on the span plus one on the fallback field.
        assert_eq!(driver.ripples.lock().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn non_fillable_target_with_no_fallback_fields_errors() {
        let driver = Scripted {
            target: Some(TypeTarget {
                element: span_element(),
                rect: Some(AnchorDescriptor { x: 0.0, y: 0.0, width: 20.0, height: 20.0 }),
                fillable: false,
            }),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let handle =
            tokio::spawn(async move { type_text(&driver, 7, "bmw", Point::new(0.0, 0.0), &mut rng).await });
        tokio::time::advance(Duration::from_secs(2)).await;
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, TypeError::NoFillableFallback));
    }
}

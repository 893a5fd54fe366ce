//! Motion, click, typing and scroll primitive generators.

use rand::Rng;

use crate::types::{
    AnchorDescriptor, ClickPhase, ClickPlan, MotionPlan, MotionStep, Point, RippleSpec,
    ScrollPlan, TypingPlan,
};

/// Bend offset clamp, in px, for the Bezier control point perpendicular
/// displacement.
const BEND_MIN_PX: f64 = 16.0;
const BEND_MAX_PX: f64 = 130.0;

/// Step count is distance/14, clamped to this range.
const STEP_COUNT_MIN: usize = 12;
const STEP_COUNT_MAX: usize = 64;

/// Duration is 170ms + 0.95ms/px, clamped to this range.
const DURATION_BASE_MS: f64 = 170.0;
const DURATION_PER_PX_MS: f64 = 0.95;
const DURATION_MIN_MS: u64 = 220;
const DURATION_MAX_MS: u64 = 960;

/// Overshoot only considered past this distance, with this probability.
const OVERSHOOT_MIN_DISTANCE_PX: f64 = 140.0;
const OVERSHOOT_PROBABILITY: f64 = 0.32;
const OVERSHOOT_MIN_PX: f64 = 8.0;
const OVERSHOOT_MAX_PX: f64 = 26.0;

fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

fn cubic_bezier(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    let x = mt.powi(3) * p0.x
        + 3.0 * mt.powi(2) * t * p1.x
        + 3.0 * mt * t.powi(2) * p2.x
        + t.powi(3) * p3.x;
    let y = mt.powi(3) * p0.y
        + 3.0 * mt.powi(2) * t * p1.y
        + 3.0 * mt * t.powi(2) * p2.y
        + t.powi(3) * p3.y;
    Point::new(x, y)
}

fn segment_params(distance: f64) -> (usize, u64) {
    let steps = ((distance / 14.0).round() as usize).clamp(STEP_COUNT_MIN, STEP_COUNT_MAX);
    let duration = (DURATION_BASE_MS + DURATION_PER_PX_MS * distance) as u64;
    let duration = duration.clamp(DURATION_MIN_MS, DURATION_MAX_MS);
    (steps, duration)
}

/// Build one eased cubic-Bezier segment between `start` and `end`, with a
/// perpendicular bend proportional to distance and a random sign.
fn bezier_segment(start: Point, end: Point, rng: &mut impl Rng, t_offset_ms: u64) -> Vec<MotionStep> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let distance = (dx * dx + dy * dy).sqrt();
    let (steps, duration_ms) = segment_params(distance);

    let bend = if distance > 0.0 {
        (distance * 0.22).clamp(BEND_MIN_PX, BEND_MAX_PX)
    } else {
        BEND_MIN_PX
    };
    let sign: f64 = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    // Perpendicular unit vector to the start->end axis.
    let (nx, ny) = if distance > 0.0 {
        (-dy / distance, dx / distance)
    } else {
        (0.0, 0.0)
    };

    let c1 = Point::new(
        start.x + dx * 0.33 + nx * bend * sign,
        start.y + dy * 0.33 + ny * bend * sign,
    );
    let c2 = Point::new(
        start.x + dx * 0.66 + nx * bend * sign * 0.6,
        start.y + dy * 0.66 + ny * bend * sign * 0.6,
    );

    (0..=steps)
        .map(|i| {
            let raw_t = i as f64 / steps as f64;
            let eased_t = ease_in_out_cubic(raw_t);
            let point = cubic_bezier(start, c1, c2, end, eased_t);
            let elapsed_ms = t_offset_ms + ((duration_ms as f64) * raw_t) as u64;
            MotionStep { point, elapsed_ms }
        })
        .collect()
}

/// Generate a human-like cursor path from `start` to `end`, with a chance
/// of overshoot-and-correct past [`OVERSHOOT_MIN_DISTANCE_PX`] (spec
/// section 4.5).
pub fn plan_motion(start: Point, end: Point, rng: &mut impl Rng) -> MotionPlan {
    let distance = start.distance_to(end);
    let mut steps = bezier_segment(start, end, rng, 0);

    let mut overshot = false;
    if distance > OVERSHOOT_MIN_DISTANCE_PX && rng.gen_bool(OVERSHOOT_PROBABILITY) {
        overshot = true;
        let axis_len = distance.max(1.0);
        let overshoot_dist = rng.gen_range(OVERSHOOT_MIN_PX..=OVERSHOOT_MAX_PX);
        let ux = (end.x - start.x) / axis_len;
        let uy = (end.y - start.y) / axis_len;
        let overshoot_point = Point::new(end.x + ux * overshoot_dist, end.y + uy * overshoot_dist);

        let t_offset = steps.last().map(|s| s.elapsed_ms).unwrap_or(0);
        let mut overshoot_steps = bezier_segment(end, overshoot_point, rng, t_offset);
        // Drop the duplicate first sample (already at `end`).
        if !overshoot_steps.is_empty() {
            overshoot_steps.remove(0);
        }
        let t_offset2 = overshoot_steps
            .last()
            .map(|s| s.elapsed_ms)
            .unwrap_or(t_offset);
        let mut correction_steps = bezier_segment(overshoot_point, end, rng, t_offset2);
        if !correction_steps.is_empty() {
            correction_steps.remove(0);
        }

        steps.append(&mut overshoot_steps);
        steps.append(&mut correction_steps);
    }

    MotionPlan { steps, overshot }
}

/// Pick a random point inside `rect`, inset by 20% of its minor dimension
/// and clamped to 2-10px.
pub fn random_point_in_rect(rect: &AnchorDescriptor, rng: &mut impl Rng) -> Point {
    let inset = (rect.minor_dimension() * 0.20).clamp(2.0, 10.0);
    let x_lo = rect.x + inset;
    let x_hi = (rect.x + rect.width - inset).max(x_lo);
    let y_lo = rect.y + inset;
    let y_hi = (rect.y + rect.height - inset).max(y_lo);
    Point::new(rng.gen_range(x_lo..=x_hi), rng.gen_range(y_lo..=y_hi))
}

/// Build the full click plan: motion to a random point in the target
/// rect, then a down/up pair with a random 35-95ms pause, each wrapped by
/// a ripple.
pub fn plan_click(start: Point, target: &AnchorDescriptor, rng: &mut impl Rng) -> ClickPlan {
    let click_point = random_point_in_rect(target, rng);
    let motion = plan_motion(start, click_point, rng);
    ClickPlan {
        motion,
        down_up_pause_ms: rng.gen_range(35..=95),
        down_ripple: RippleSpec::for_phase(ClickPhase::Down),
        up_ripple: RippleSpec::for_phase(ClickPhase::Up),
    }
}

/// Per-character delays for typing `value`, each 35-85ms.
pub fn plan_typing(value: &str, rng: &mut impl Rng) -> TypingPlan {
    TypingPlan {
        delays_ms: value.chars().map(|_| rng.gen_range(35..=85)).collect(),
    }
}

/// A scroll nudge: a small human jiggle plus the wheel deltaY, 320-680px.
pub fn plan_scroll(rng: &mut impl Rng) -> ScrollPlan {
    ScrollPlan {
        jiggle_dx: rng.gen_range(-6.0..=6.0),
        jiggle_dy: rng.gen_range(-4.0..=4.0),
        delta_y: rng.gen_range(320.0..=680.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn motion_plan_starts_and_ends_at_requested_points() {
        let mut rng = StdRng::seed_from_u64(1);
        let start = Point::new(0.0, 0.0);
        let end = Point::new(300.0, 200.0);
        let plan = plan_motion(start, end, &mut rng);
        assert_eq!(plan.steps.first().unwrap().point.x, 0.0);
        let last = plan.final_point().unwrap();
        assert!((last.x - end.x).abs() < 1e-6);
        assert!((last.y - end.y).abs() < 1e-6);
    }

    #[test]
    fn step_count_is_clamped() {
        let mut rng = StdRng::seed_from_u64(2);
        let plan = plan_motion(Point::new(0.0, 0.0), Point::new(2000.0, 0.0), &mut rng);
        // Even over a huge distance, the *segment* step count is clamped;
        // overshoot may add a couple more samples but stays in a sane range.
        assert!(plan.steps.len() <= STEP_COUNT_MAX + 2 * (STEP_COUNT_MAX));
        assert!(plan.steps.len() >= STEP_COUNT_MIN);
    }

    #[test]
    fn short_motions_never_overshoot_plan_repeatedly() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let plan = plan_motion(Point::new(0.0, 0.0), Point::new(50.0, 10.0), &mut rng);
            assert!(!plan.overshot, "distance below threshold must never overshoot");
        }
    }

    #[test]
    fn random_point_stays_within_inset_bounds() {
        let mut rng = StdRng::seed_from_u64(4);
        let rect = AnchorDescriptor { x: 0.0, y: 0.0, width: 100.0, height: 40.0 };
        for _ in 0..20 {
            let p = random_point_in_rect(&rect, &mut rng);
            assert!(p.x >= rect.x + 2.0 && p.x <= rect.x + rect.width - 2.0);
            assert!(p.y >= rect.y + 2.0 && p.y <= rect.y + rect.height - 2.0);
        }
    }

    #[test]
    fn typing_plan_has_one_delay_per_char() {
        let mut rng = StdRng::seed_from_u64(5);
        let plan = plan_typing("bmw", &mut rng);
        assert_eq!(plan.delays_ms.len(), 3);
        assert!(plan.delays_ms.iter().all(|&d| (35..=85).contains(&d)));
    }

    #[test]
    fn scroll_delta_within_spec_range() {
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..20 {
            let plan = plan_scroll(&mut rng);
            assert!((320.0..=680.0).contains(&plan.delta_y));
        }
    }

    #[test]
    fn click_plan_pause_within_spec_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let rect = AnchorDescriptor { x: 0.0, y: 0.0, width: 80.0, height: 30.0 };
        let plan = plan_click(Point::new(500.0, 500.0), &rect, &mut rng);
        assert!((35..=95).contains(&plan.down_up_pause_ms));
    }
}

//! Geometry and timing primitives shared by cursor motion, clicks, typing
//! and scrolling.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// One sampled point along a cursor motion, with its offset from the start
/// of the motion in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionStep {
    pub point: Point,
    pub elapsed_ms: u64,
}

/// A full human-like cursor motion: a primary Bezier segment, plus an
/// optional overshoot-and-correct tail.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MotionPlan {
    pub steps: Vec<MotionStep>,
    pub overshot: bool,
}

impl MotionPlan {
    pub fn total_duration_ms(&self) -> u64 {
        self.steps.last().map(|s| s.elapsed_ms).unwrap_or(0)
    }

    pub fn final_point(&self) -> Option<Point> {
        self.steps.last().map(|s| s.point)
    }
}

/// Which half of a click's down/up pair a ripple animation belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ClickPhase {
    Down,
    Up,
}

/// Visual parameters for one ripple animation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RippleSpec {
    pub phase: ClickPhase,
    pub radius_px: f64,
    pub filled: bool,
}

impl RippleSpec {
    pub fn for_phase(phase: ClickPhase) -> Self {
        match phase {
            ClickPhase::Down => Self {
                phase,
                radius_px: 10.0,
                filled: true,
            },
            ClickPhase::Up => Self {
                phase,
                radius_px: 22.0,
                filled: false,
            },
        }
    }
}

/// A full click: a motion to the target, a down/up pair separated by a
/// short human pause, each wrapped by a ripple.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClickPlan {
    pub motion: MotionPlan,
    pub down_up_pause_ms: u64,
    pub down_ripple: RippleSpec,
    pub up_ripple: RippleSpec,
}

/// Per-character typing delays, in ms, one entry per char of the typed value.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TypingPlan {
    pub delays_ms: Vec<u64>,
}

/// A wheel-scroll nudge: a small cursor jiggle followed by the actual
/// wheel event.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ScrollPlan {
    pub jiggle_dx: f64,
    pub jiggle_dy: f64,
    pub delta_y: f64,
}

/// An anchor a pointer-based resolution can land on: a rectangle plus its
/// centre, used both for random-point-in-rect click targeting and for
/// nearest-anchor fallback resolution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnchorDescriptor {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl AnchorDescriptor {
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn minor_dimension(&self) -> f64 {
        self.width.min(self.height)
    }
}

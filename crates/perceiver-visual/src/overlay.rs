//! Collision-aware label placement.
//!
//! The overlay container itself is drawn in the page; this module computes
//! *where* each mark's integer label should sit. The placement heuristic
//! is empirically tuned and potentially fragile on small viewports.

use wayfarer_core_types::BoundingRect;

/// A candidate label position relative to the element's bounding rect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelSlot {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    OutsideLeft,
    OutsideRight,
    Interior,
}

/// Typical label box dimensions, used for overflow/overlap scoring.
const LABEL_WIDTH: f64 = 20.0;
const LABEL_HEIGHT: f64 = 16.0;

/// Per-position preference constants. Order matches [`LabelSlot`]'s declaration order.
pub const SLOT_PREFERENCE: [f64; 7] = [0.0, 2.0, 4.0, 6.0, 8.0, 8.0, 20.0];

const SLOTS: [LabelSlot; 7] = [
    LabelSlot::TopLeft,
    LabelSlot::TopRight,
    LabelSlot::BottomLeft,
    LabelSlot::BottomRight,
    LabelSlot::OutsideLeft,
    LabelSlot::OutsideRight,
    LabelSlot::Interior,
];

const OVERFLOW_PENALTY: f64 = 220.0;
const TARGET_OVERLAP_PENALTY: f64 = 1.25;
const LABEL_OVERLAP_PENALTY: f64 = 2.8;
const OWN_RECT_OVERLAP_PENALTY: f64 = 4.5;

fn slot_rect(slot: LabelSlot, target: &BoundingRect) -> BoundingRect {
    let (x, y) = match slot {
        LabelSlot::TopLeft => (target.x - LABEL_WIDTH / 2.0, target.y - LABEL_HEIGHT / 2.0),
        LabelSlot::TopRight => (
            target.x + target.width - LABEL_WIDTH / 2.0,
            target.y - LABEL_HEIGHT / 2.0,
        ),
        LabelSlot::BottomLeft => (
            target.x - LABEL_WIDTH / 2.0,
            target.y + target.height - LABEL_HEIGHT / 2.0,
        ),
        LabelSlot::BottomRight => (
            target.x + target.width - LABEL_WIDTH / 2.0,
            target.y + target.height - LABEL_HEIGHT / 2.0,
        ),
        LabelSlot::OutsideLeft => (
            target.x - LABEL_WIDTH - 2.0,
            target.y + target.height / 2.0 - LABEL_HEIGHT / 2.0,
        ),
        LabelSlot::OutsideRight => (
            target.x + target.width + 2.0,
            target.y + target.height / 2.0 - LABEL_HEIGHT / 2.0,
        ),
        LabelSlot::Interior => (
            target.x + target.width / 2.0 - LABEL_WIDTH / 2.0,
            target.y + target.height / 2.0 - LABEL_HEIGHT / 2.0,
        ),
    };
    BoundingRect { x, y, width: LABEL_WIDTH, height: LABEL_HEIGHT }
}

fn viewport_overflow(rect: &BoundingRect, viewport_w: f64, viewport_h: f64) -> f64 {
    let left = (-rect.x).max(0.0);
    let top = (-rect.y).max(0.0);
    let right = (rect.x + rect.width - viewport_w).max(0.0);
    let bottom = (rect.y + rect.height - viewport_h).max(0.0);
    left + top + right + bottom
}

fn clamp_into_viewport(rect: BoundingRect, viewport_w: f64, viewport_h: f64) -> BoundingRect {
    let x = rect.x.clamp(0.0, (viewport_w - rect.width).max(0.0));
    let y = rect.y.clamp(0.0, (viewport_h - rect.height).max(0.0));
    BoundingRect { x, y, width: rect.width, height: rect.height }
}

/// Choose and clamp the best label position for `target`, given the
/// rectangles of every other accepted target and every label already
/// placed this pass.
pub fn place_label(
    target: &BoundingRect,
    other_targets: &[BoundingRect],
    placed_labels: &[BoundingRect],
    viewport_w: f64,
    viewport_h: f64,
) -> BoundingRect {
    let mut best: Option<(f64, BoundingRect)> = None;

    for (i, slot) in SLOTS.iter().enumerate() {
        let candidate = slot_rect(*slot, target);

        let overflow = viewport_overflow(&candidate, viewport_w, viewport_h) * OVERFLOW_PENALTY;

        let target_overlap: f64 = other_targets
            .iter()
            .map(|r| candidate.overlap_area(r))
            .sum::<f64>()
            * TARGET_OVERLAP_PENALTY;

        let label_overlap: f64 = placed_labels
            .iter()
            .map(|r| candidate.overlap_area(r))
            .sum::<f64>()
            * LABEL_OVERLAP_PENALTY;

        let own_overlap = candidate.overlap_area(target) * OWN_RECT_OVERLAP_PENALTY;

        let score = overflow + target_overlap + label_overlap + own_overlap + SLOT_PREFERENCE[i];

        if best.as_ref().map(|(s, _)| score < *s).unwrap_or(true) {
            best = Some((score, candidate));
        }
    }

    let chosen = best.expect("SLOTS is non-empty").1;
    clamp_into_viewport(chosen, viewport_w, viewport_h)
}

/// Place every mark's label in one pass, in the order given (discovery
/// id order), so each placement sees the labels already placed by its
/// predecessors. Returns each mark id paired with its chosen label rect.
pub fn place_all_labels(
    targets: &[(u32, BoundingRect)],
    viewport_w: f64,
    viewport_h: f64,
) -> Vec<(u32, BoundingRect)> {
    let all_rects: Vec<BoundingRect> = targets.iter().map(|(_, rect)| *rect).collect();
    let mut placed_labels: Vec<BoundingRect> = Vec::with_capacity(targets.len());
    let mut out = Vec::with_capacity(targets.len());

    for (i, (id, rect)) in targets.iter().enumerate() {
        let other_targets: Vec<BoundingRect> = all_rects
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, r)| *r)
            .collect();
        let label_rect = place_label(rect, &other_targets, &placed_labels, viewport_w, viewport_h);
        placed_labels.push(label_rect);
        out.push((*id, label_rect));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_is_clamped_inside_viewport() {
        let target = BoundingRect { x: 0.0, y: 0.0, width: 30.0, height: 30.0 };
        let placed = place_label(&target, &[], &[], 400.0, 300.0);
        assert!(placed.x >= 0.0 && placed.y >= 0.0);
        assert!(placed.x + placed.width <= 400.0);
        assert!(placed.y + placed.height <= 300.0);
    }

    #[test]
    fn label_avoids_overlapping_previous_labels_when_possible() {
        let target = BoundingRect { x: 100.0, y: 100.0, width: 40.0, height: 40.0 };
        // A label already sitting exactly where the top-left slot would go.
        let occupied = slot_rect(LabelSlot::TopLeft, &target);
        let placed = place_label(&target, &[], &[occupied], 800.0, 600.0);
        // The winning slot should not be the heavily-penalised occupied one
        // unless every other option scores worse (it won't, on a big canvas).
        assert!(placed.overlap_area(&occupied) < occupied.area());
    }

    #[test]
    fn place_all_labels_assigns_every_id_and_avoids_stacking_identical_targets() {
        let targets = vec![
            (0, BoundingRect { x: 10.0, y: 10.0, width: 40.0, height: 40.0 }),
            (1, BoundingRect { x: 10.0, y: 10.0, width: 40.0, height: 40.0 }),
        ];
        let placed = place_all_labels(&targets, 800.0, 600.0);
        let ids: Vec<u32> = placed.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![0, 1]);
        let (_, first) = placed[0];
        let (_, second) = placed[1];
        assert_ne!(first, second);
    }

    #[test]
    fn corner_slots_are_centered_near_the_corner() {
        let target = BoundingRect { x: 50.0, y: 50.0, width: 100.0, height: 60.0 };
        let tl = slot_rect(LabelSlot::TopLeft, &target);
        assert!((tl.x - (target.x - LABEL_WIDTH / 2.0)).abs() < 1e-9);
        assert!((tl.y - (target.y - LABEL_HEIGHT / 2.0)).abs() < 1e-9);
    }
}

//! Pure-geometry nearest-anchor resolution, used by the typing fallback
//! when a decided target is not itself fillable.

use crate::types::{AnchorDescriptor, Point};

/// Return the index of the anchor in `candidates` whose centre is nearest
/// `point`, or `None` if `candidates` is empty.
pub fn nearest_anchor(point: Point, candidates: &[AnchorDescriptor]) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .map(|(i, anchor)| (i, point.distance_to(anchor.center())))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .map(|(i, _)| i)
}

#![allow(dead_code)]
//! Set-of-Marks candidate discovery.
//!
//! The DOM/shadow-DOM traversal itself happens inside the page (a
//! cross-boundary script execution) and is modelled here
//! as a [`RawCandidate`] the traversal reports back for every element it
//! visited. Everything downstream of the traversal — scoring, filtering,
//! ancestor and overlap dedup, the mark cap, and overlay label placement —
//! is pure host-side logic and is what this crate actually implements and
//! tests.

pub mod metrics;
pub mod overlay;

use wayfarer_core_types::{BoundingRect, SoMCandidate, SomResult};

/// Maximum accepted marks per observation.
pub const MAX_MARKS: usize = 220;

/// Overlap-dedup threshold: reject a candidate whose rect overlaps an
/// already-accepted rect by more than this fraction of the smaller area.
pub const OVERLAP_DEDUP_THRESHOLD: f64 = 0.92;

/// Ancestor-dedup search depth.
pub const ANCESTOR_DEDUP_DEPTH: usize = 8;

/// Minimum side length (px) for a non-native candidate (step 5).
pub const MIN_NON_NATIVE_SIDE: f64 = 18.0;
/// Minimum area (px^2) for a non-native candidate (step 5).
pub const MIN_NON_NATIVE_AREA: f64 = 320.0;

/// One element as reported by the in-page traversal, before scoring.
#[derive(Clone, Debug)]
pub struct RawCandidate {
    pub tag: String,
    pub role: Option<String>,
    pub text: Option<String>,
    pub aria_label: Option<String>,
    pub title: Option<String>,
    pub href: Option<String>,
    pub rect: BoundingRect,

    /// Stable index-chain path from `document.body`, reported by the
    /// traversal alongside everything else; carried through untouched so
    /// a surviving candidate's final mark id can be written back onto
    /// the DOM node the traversal actually saw.
    pub dom_path: String,

    pub is_native_interactive_tag: bool,
    pub is_aria_interactive_role: bool,
    pub has_onclick_or_tabindex: bool,
    pub cursor_pointer_with_semantic_hint: bool,

    pub hidden: bool,
    pub disabled: bool,
    pub aria_disabled: bool,
    pub aria_hidden: bool,
    pub is_hidden_input: bool,

    pub display_none: bool,
    pub visibility_hidden: bool,
    pub pointer_events_none: bool,
    pub intersects_viewport: bool,

    /// Scores of ancestors, nearest-first, truncated to
    /// [`ANCESTOR_DEDUP_DEPTH`] entries.
    pub ancestor_scores: Vec<u8>,
}

impl RawCandidate {
    fn is_native_form_control(&self) -> bool {
        self.is_native_interactive_tag
    }

    fn has_positive_dimensions(&self) -> bool {
        self.rect.width > 0.0 && self.rect.height > 0.0
    }
}

/// Interactive score clamped to {0,1,2,3,4}.
pub fn interactive_score(raw: &RawCandidate) -> u8 {
    if raw.hidden || raw.disabled || raw.aria_disabled || raw.aria_hidden || raw.is_hidden_input {
        return 0;
    }
    if raw.is_native_interactive_tag {
        return 4;
    }
    if raw.is_aria_interactive_role {
        return 3;
    }
    if raw.has_onclick_or_tabindex {
        return 2;
    }
    if raw.cursor_pointer_with_semantic_hint {
        return 1;
    }
    0
}

/// Visibility filter, step 4.
pub fn is_visible(raw: &RawCandidate) -> bool {
    raw.has_positive_dimensions()
        && !raw.display_none
        && !raw.visibility_hidden
        && !raw.pointer_events_none
        && raw.intersects_viewport
}

/// Size filter, step 5. Native form controls bypass it.
pub fn passes_size_filter(raw: &RawCandidate) -> bool {
    if raw.is_native_form_control() {
        return true;
    }
    raw.rect.width >= MIN_NON_NATIVE_SIDE
        && raw.rect.height >= MIN_NON_NATIVE_SIDE
        && raw.rect.area() >= MIN_NON_NATIVE_AREA
}

/// Ancestor dedup, step 6: a candidate scoring <=2 is
/// dropped if any ancestor within [`ANCESTOR_DEDUP_DEPTH`] scores >=2.
pub fn is_ancestor_duplicate(score: u8, raw: &RawCandidate) -> bool {
    if score > 2 {
        return false;
    }
    raw.ancestor_scores
        .iter()
        .take(ANCESTOR_DEDUP_DEPTH)
        .any(|&s| s >= 2)
}

#[derive(Clone, Debug)]
struct ScoredCandidate {
    raw: RawCandidate,
    score: u8,
}

/// Run the full discovery pipeline (steps 3-9) over the raw traversal
/// output and return a dense, capped, deduplicated [`SomResult`].
pub fn discover(raw_candidates: Vec<RawCandidate>) -> SomResult {
    // Steps 3-6: score, filter visibility/size, drop ancestor duplicates.
    let mut scored: Vec<ScoredCandidate> = raw_candidates
        .into_iter()
        .filter_map(|raw| {
            let score = interactive_score(&raw);
            if score == 0 {
                return None;
            }
            if !is_visible(&raw) || !passes_size_filter(&raw) {
                return None;
            }
            if is_ancestor_duplicate(score, &raw) {
                return None;
            }
            Some(ScoredCandidate { raw, score })
        })
        .collect();

    // Step 7: rank by score desc, then area desc.
    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(b.raw.rect.area().partial_cmp(&a.raw.rect.area()).unwrap())
    });

    // Step 8: greedy overlap dedup.
    let mut accepted: Vec<ScoredCandidate> = Vec::new();
    'candidates: for candidate in scored {
        for already in &accepted {
            if candidate
                .raw
                .rect
                .overlap_fraction_of_smaller(&already.raw.rect)
                > OVERLAP_DEDUP_THRESHOLD
            {
                continue 'candidates;
            }
        }
        accepted.push(candidate);
        // Step 9: cap.
        if accepted.len() >= MAX_MARKS {
            break;
        }
    }

    // Step 9 (cont'd): assign dense ids in acceptance order, trim text to 80 chars.
    let elements: Vec<SoMCandidate> = accepted
        .into_iter()
        .enumerate()
        .map(|(id, c)| SoMCandidate {
            id: id as u32,
            tag: c.raw.tag,
            role: c.raw.role,
            text: c.raw.text.map(|t| trim_to(&t, 80)),
            aria_label: c.raw.aria_label.map(|t| trim_to(&t, 80)),
            title: c.raw.title.map(|t| trim_to(&t, 80)),
            href: c.raw.href,
            rect: c.raw.rect,
            score: c.score,
            dom_path: c.raw.dom_path,
        })
        .collect();

    metrics::record_marks_found(elements.len());
    SomResult {
        count: elements.len(),
        elements,
    }
}

fn trim_to(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_raw(x: f64, y: f64, w: f64, h: f64) -> RawCandidate {
        RawCandidate {
            tag: "button".into(),
            role: None,
            text: Some("Shop now".into()),
            aria_label: None,
            title: None,
            href: None,
            rect: BoundingRect { x, y, width: w, height: h },
            dom_path: "0".into(),
            is_native_interactive_tag: true,
            is_aria_interactive_role: false,
            has_onclick_or_tabindex: false,
            cursor_pointer_with_semantic_hint: false,
            hidden: false,
            disabled: false,
            aria_disabled: false,
            aria_hidden: false,
            is_hidden_input: false,
            display_none: false,
            visibility_hidden: false,
            pointer_events_none: false,
            intersects_viewport: true,
            ancestor_scores: vec![],
        }
    }

    #[test]
    fn native_tag_scores_four() {
        let raw = base_raw(0.0, 0.0, 40.0, 40.0);
        assert_eq!(interactive_score(&raw), 4);
    }

    #[test]
    fn hidden_elements_score_zero_regardless_of_tag() {
        let mut raw = base_raw(0.0, 0.0, 40.0, 40.0);
        raw.aria_hidden = true;
        assert_eq!(interactive_score(&raw), 0);
    }

    #[test]
    fn cursor_pointer_without_semantic_hint_scores_zero() {
        let mut raw = base_raw(0.0, 0.0, 40.0, 40.0);
        raw.is_native_interactive_tag = false;
        raw.cursor_pointer_with_semantic_hint = false;
        assert_eq!(interactive_score(&raw), 0);
    }

    #[test]
    fn small_non_native_candidate_fails_size_filter() {
        let mut raw = base_raw(0.0, 0.0, 10.0, 10.0);
        raw.is_native_interactive_tag = false;
        raw.has_onclick_or_tabindex = true;
        assert!(!passes_size_filter(&raw));
    }

    #[test]
    fn native_form_control_bypasses_size_filter() {
        let raw = base_raw(0.0, 0.0, 5.0, 5.0);
        assert!(passes_size_filter(&raw));
    }

    #[test]
    fn weak_candidate_under_strong_ancestor_is_dropped() {
        let mut raw = base_raw(0.0, 0.0, 40.0, 40.0);
        raw.is_native_interactive_tag = false;
        raw.has_onclick_or_tabindex = true; // score 2
        raw.ancestor_scores = vec![0, 0, 4]; // strong ancestor within depth 8
        let score = interactive_score(&raw);
        assert_eq!(score, 2);
        assert!(is_ancestor_duplicate(score, &raw));
    }

    #[test]
    fn strong_ancestor_beyond_depth_does_not_dedup() {
        let mut raw = base_raw(0.0, 0.0, 40.0, 40.0);
        raw.is_native_interactive_tag = false;
        raw.has_onclick_or_tabindex = true;
        raw.ancestor_scores = vec![0; ANCESTOR_DEDUP_DEPTH]; // no strong ancestor within depth
        let score = interactive_score(&raw);
        assert!(!is_ancestor_duplicate(score, &raw));
    }

    #[test]
    fn discover_assigns_dense_ids_from_zero() {
        let raws = vec![
            base_raw(0.0, 0.0, 50.0, 50.0),
            base_raw(200.0, 0.0, 50.0, 50.0),
            base_raw(400.0, 0.0, 50.0, 50.0),
        ];
        let result = discover(raws);
        assert_eq!(result.count, 3);
        let ids: Vec<u32> = result.elements.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn discover_dedups_heavily_overlapping_rects() {
        let raws = vec![
            base_raw(0.0, 0.0, 100.0, 100.0),
            // 95% overlap with the first by area: smaller rect fully inside.
            base_raw(5.0, 5.0, 90.0, 90.0),
        ];
        let result = discover(raws);
        assert_eq!(result.count, 1);
    }

    #[test]
    fn discover_keeps_candidates_with_low_overlap() {
        let raws = vec![
            base_raw(0.0, 0.0, 50.0, 50.0),
            base_raw(40.0, 0.0, 50.0, 50.0), // partial overlap, below threshold
        ];
        let result = discover(raws);
        assert_eq!(result.count, 2);
    }

    #[test]
    fn discover_caps_at_max_marks() {
        let raws: Vec<RawCandidate> = (0..300)
            .map(|i| base_raw(i as f64 * 30.0, 0.0, 20.0, 20.0))
            .collect();
        let result = discover(raws);
        assert!(result.count <= MAX_MARKS);
        assert_eq!(result.count, MAX_MARKS);
    }

    #[test]
    fn discover_trims_text_to_eighty_chars() {
        let mut raw = base_raw(0.0, 0.0, 40.0, 40.0);
        raw.text = Some("x".repeat(200));
        let result = discover(vec![raw]);
        assert_eq!(result.elements[0].text.as_ref().unwrap().len(), 80);
    }

    #[test]
    fn invisible_candidates_are_excluded() {
        let mut raw = base_raw(0.0, 0.0, 40.0, 40.0);
        raw.intersects_viewport = false;
        let result = discover(vec![raw]);
        assert_eq!(result.count, 0);
    }
}

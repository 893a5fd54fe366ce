//! Vision-coordinate fallback scoring.

use crate::conditions::{text_matches_accept_phrase, ACCEPT_PHRASES};
use crate::types::AcceptCandidate;

/// Cookie-context ancestry is only considered up to this many hops.
pub const ANCESTRY_DEPTH_CAP: u32 = 6;

/// A node must sit in the lower 55% of the viewport to get the vertical
/// bonus.
pub const LOWER_VIEWPORT_FRACTION: f64 = 0.55;

const ANCESTRY_BONUS_PER_HOP: f64 = 12.0;
const VERTICAL_BONUS: f64 = 40.0;
const AREA_WEIGHT: f64 = 0.02;
const AREA_CAP: f64 = 30.0;

/// Strength of the matched phrase: earlier entries in [`ACCEPT_PHRASES`]
/// score higher.
fn phrase_strength(text: &str) -> Option<f64> {
    let lower = text.to_lowercase();
    ACCEPT_PHRASES
        .iter()
        .position(|p| lower.contains(p))
        .map(|idx| (ACCEPT_PHRASES.len() - idx) as f64 * 10.0)
}

/// Score one candidate; `None` if it doesn't match any accept phrase.
pub fn score_candidate(candidate: &AcceptCandidate, viewport_height: f64) -> Option<f64> {
    let base = phrase_strength(&candidate.text)?;

    let ancestry = match candidate.cookie_ancestor_depth {
        Some(depth) if depth <= ANCESTRY_DEPTH_CAP => {
            (ANCESTRY_DEPTH_CAP - depth) as f64 * ANCESTRY_BONUS_PER_HOP
        }
        _ => 0.0,
    };

    let vertical = if viewport_height > 0.0 {
        let (_, cy) = candidate.center();
        let lower_bound = viewport_height * (1.0 - LOWER_VIEWPORT_FRACTION);
        if cy >= lower_bound {
            VERTICAL_BONUS
        } else {
            0.0
        }
    } else {
        0.0
    };

    let area = (candidate.area() * AREA_WEIGHT).min(AREA_CAP);

    Some(base + ancestry + vertical + area)
}

/// Pick the single highest-scoring accept candidate across the whole
/// page, even if that means picking across distinct, possibly
/// unrelated banners.
pub fn pick_best(candidates: &[AcceptCandidate], viewport_height: f64) -> Option<(&AcceptCandidate, &'static str)> {
    candidates
        .iter()
        .filter_map(|c| {
            score_candidate(c, viewport_height).map(|score| (c, score))
        })
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .map(|(c, _)| (c, text_matches_accept_phrase(&c.text).unwrap_or("accept")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(text: &str, y: f64, depth: Option<u32>) -> AcceptCandidate {
        AcceptCandidate {
            text: text.to_string(),
            x: 100.0,
            y,
            width: 120.0,
            height: 36.0,
            cookie_ancestor_depth: depth,
        }
    }

    #[test]
    fn non_matching_text_scores_none() {
        assert_eq!(score_candidate(&candidate("Learn more", 500.0, None), 800.0), None);
    }

    #[test]
    fn closer_cookie_ancestor_scores_higher() {
        let shallow = score_candidate(&candidate("Accept all", 500.0, Some(1)), 800.0).unwrap();
        let deep = score_candidate(&candidate("Accept all", 500.0, Some(5)), 800.0).unwrap();
        assert!(shallow > deep);
    }

    #[test]
    fn lower_viewport_position_gets_bonus() {
        let lower = score_candidate(&candidate("Accept all", 700.0, None), 800.0).unwrap();
        let upper = score_candidate(&candidate("Accept all", 50.0, None), 800.0).unwrap();
        assert!(lower > upper);
    }

    #[test]
    fn pick_best_ignores_non_matching_candidates() {
        let candidates = vec![
            candidate("Learn more", 500.0, None),
            candidate("Alle akzeptieren", 700.0, Some(2)),
        ];
        let (best, phrase) = pick_best(&candidates, 800.0).unwrap();
        assert_eq!(best.text, "Alle akzeptieren");
        assert_eq!(phrase, "alle akzeptieren");
    }

    #[test]
    fn pick_best_picks_global_max_even_across_distinct_banners() {
        // Two distinct banners' accept buttons; pick the global max
        // regardless of which currently covers the viewport.
        let candidates = vec![
            candidate("Agree", 200.0, Some(1)),
            candidate("Accept all cookies", 700.0, Some(1)),
        ];
        let (best, _) = pick_best(&candidates, 800.0).unwrap();
        assert_eq!(best.text, "Accept all cookies");
    }
}

//! Monkey mode: bypasses the LLM entirely and picks
//! uniformly-weighted random actions over the observed marks.

use rand::Rng;
use wayfarer_core_types::{ActionKind, Decision, SomResult};

const P_WAIT: f64 = 0.16;
const P_SCROLL: f64 = 0.20;
const P_TYPE: f64 = 0.20;
// Remaining probability mass (0.44 when typing is available) falls through
// to click.

fn find_input(som: &SomResult) -> Option<u32> {
    som.elements
        .iter()
        .find(|m| {
            m.tag.eq_ignore_ascii_case("input")
                || m.role.as_deref() == Some("textbox")
                || m.role.as_deref() == Some("searchbox")
        })
        .map(|m| m.id)
}

/// Pick a Monkey-mode decision given the current SoM result: `{wait 0.16, scroll 0.20, type into a random input 0.20 if any
/// input exists else click a random mark 0.44}`. If no marks are visible,
/// always scroll.
pub fn monkey_decision(som: &SomResult, rng: &mut impl Rng) -> Decision {
    if som.elements.is_empty() {
        return Decision {
            thought: "Monkey mode: nothing visible, scrolling to look around.".into(),
            action: ActionKind::Scroll,
            target_id: None,
            value: None,
        };
    }

    let roll: f64 = rng.gen_range(0.0..1.0);
    let input_mark = find_input(som);

    if roll < P_WAIT {
        return Decision {
            thought: "Monkey mode: waiting a moment.".into(),
            action: ActionKind::Wait,
            target_id: None,
            value: None,
        };
    }
    if roll < P_WAIT + P_SCROLL {
        return Decision {
            thought: "Monkey mode: scrolling to explore.".into(),
            action: ActionKind::Scroll,
            target_id: None,
            value: None,
        };
    }
    if roll < P_WAIT + P_SCROLL + P_TYPE {
        if let Some(id) = input_mark {
            return Decision {
                thought: "Monkey mode: typing into a random input.".into(),
                action: ActionKind::Type,
                target_id: Some(id.to_string()),
                value: Some("test".into()),
            };
        }
    }

    let idx = rng.gen_range(0..som.elements.len());
    let target = som.elements[idx].id;
    Decision {
        thought: "Monkey mode: clicking a random mark.".into(),
        action: ActionKind::Click,
        target_id: Some(target.to_string()),
        value: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use wayfarer_core_types::{BoundingRect, SoMCandidate};

    fn mark(id: u32, tag: &str) -> SoMCandidate {
        SoMCandidate {
            id,
            tag: tag.into(),
            role: None,
            text: Some("x".into()),
            aria_label: None,
            title: None,
            href: None,
            rect: BoundingRect { x: 0.0, y: 0.0, width: 40.0, height: 20.0 },
            score: 4,
            dom_path: id.to_string(),
        }
    }

    #[test]
    fn no_marks_always_scrolls() {
        let som = SomResult { count: 0, elements: vec![] };
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let decision = monkey_decision(&som, &mut rng);
            assert_eq!(decision.action, ActionKind::Scroll);
        }
    }

    #[test]
    fn distribution_stays_within_known_action_set() {
        let som = SomResult {
            count: 2,
            elements: vec![mark(0, "button"), mark(1, "input")],
        };
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..200 {
            let decision = monkey_decision(&som, &mut rng);
            assert!(matches!(
                decision.action,
                ActionKind::Wait | ActionKind::Scroll | ActionKind::Type | ActionKind::Click
            ));
        }
    }

    #[test]
    fn type_targets_the_input_mark_when_present() {
        let som = SomResult {
            count: 2,
            elements: vec![mark(0, "button"), mark(1, "input")],
        };
        let mut rng = StdRng::seed_from_u64(3);
        let mut saw_type = false;
        for _ in 0..500 {
            let decision = monkey_decision(&som, &mut rng);
            if decision.action == ActionKind::Type {
                saw_type = true;
                assert_eq!(decision.target_id.as_deref(), Some("1"));
            }
        }
        assert!(saw_type, "expected at least one type decision across 500 rolls");
    }

    #[test]
    fn clicks_fall_back_when_no_input_exists() {
        let som = SomResult { count: 1, elements: vec![mark(0, "button")] };
        let mut rng = StdRng::seed_from_u64(4);
        let mut saw_click = false;
        for _ in 0..500 {
            let decision = monkey_decision(&som, &mut rng);
            if decision.action == ActionKind::Click {
                saw_click = true;
            }
            assert_ne!(decision.action, ActionKind::Type);
        }
        assert!(saw_click);
    }
}

//! Prompt assembly: persona base + mission + dynamic
//! page context + history, or the neutral Bare-mode instruction in place
//! of persona rules.

use wayfarer_core_types::{HistoryEntry, Persona, SoMCandidate, SomResult};

use crate::config::DecisionEngineConfig;
use crate::loop_guard::loop_guard_hint;

const BARE_MODE_INSTRUCTION: &str =
    "Be precise and evidence-driven. Only act on what is visibly present on the page.";

/// Everything the prompt needs about the page that the persona/mission
/// text doesn't already carry.
pub struct PageContext<'a> {
    pub url: &'a str,
    pub title: &'a str,
    pub som: Option<&'a SomResult>,
}

fn format_mark(mark: &SoMCandidate) -> String {
    let role = mark.role.as_deref().unwrap_or("");
    let label = mark
        .text
        .as_deref()
        .or(mark.aria_label.as_deref())
        .or(mark.title.as_deref())
        .unwrap_or("");
    format!("#{} <{} role={}> \"{}\"", mark.id, mark.tag, role, label)
}

fn mark_label_text(mark: &SoMCandidate) -> String {
    mark.text
        .clone()
        .or_else(|| mark.aria_label.clone())
        .or_else(|| mark.title.clone())
        .unwrap_or_default()
}

/// Extract lowercase keywords (length >= 3) from the mission text, used to
/// pick out menu-like labels relevant to the objective.
fn objective_keywords(mission: &str) -> Vec<String> {
    mission
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= 3)
        .map(|w| w.to_ascii_lowercase())
        .collect()
}

/// Up to `limit` visible menu-like labels whose text contains an objective
/// keyword or a navigation keyword.
fn menu_like_labels(
    som: &SomResult,
    mission: &str,
    navigation_keywords: &[String],
    limit: usize,
) -> Vec<String> {
    let objective = objective_keywords(mission);
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for mark in &som.elements {
        let label = mark_label_text(mark);
        if label.is_empty() {
            continue;
        }
        let lower = label.to_ascii_lowercase();
        let matches = objective.iter().any(|kw| lower.contains(kw.as_str()))
            || navigation_keywords.iter().any(|kw| lower.contains(kw.as_str()));
        if matches && seen.insert(label.clone()) {
            out.push(label);
            if out.len() >= limit {
                break;
            }
        }
    }
    out
}

/// Top `limit` highest-scoring marks, already ranked by [`discover`]'s
/// acceptance order (score desc, then area desc), so this is a prefix.
fn top_marks(som: &SomResult, limit: usize) -> Vec<String> {
    som.elements.iter().take(limit).map(format_mark).collect()
}

fn failed_target_hint(snapshot: &[(u32, u32)]) -> Option<String> {
    if snapshot.is_empty() {
        return None;
    }
    let parts: Vec<String> = snapshot
        .iter()
        .map(|(id, count)| format!("#{id} (failed {count}x)"))
        .collect();
    Some(format!(
        "These targets have failed recently, steer away from them unless nothing else fits: {}.",
        parts.join(", ")
    ))
}

fn summarise_history(history: &[HistoryEntry], start_step: usize) -> Vec<String> {
    history
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let d = &entry.decision;
            let target = d.target_id.as_deref().unwrap_or("-");
            let value = d.value.as_deref().unwrap_or("");
            format!(
                "step {}: {} \u{2192} {} #{} \"{}\"",
                start_step + i,
                d.thought,
                d.action.as_str(),
                target,
                value
            )
        })
        .collect()
}

/// Assemble the full prompt sent to the vision LLM.
/// `monkey_or_bare` selects the neutral instruction in place of the
/// persona's base prompt when `bare_mode` is set; Monkey mode never calls
/// this at all (it bypasses the LLM entirely).
pub fn assemble_prompt(
    persona: &Persona,
    mission: &str,
    page: &PageContext<'_>,
    history: &[HistoryEntry],
    failed_targets: &[(u32, u32)],
    bare_mode: bool,
    config: &DecisionEngineConfig,
) -> String {
    let mut sections = Vec::new();

    sections.push(if bare_mode {
        BARE_MODE_INSTRUCTION.to_string()
    } else {
        persona.base_prompt.clone()
    });
    sections.push(format!("Mission: {mission}"));

    sections.push(format!("Current page: {} ({})", page.title, page.url));

    if let Some(som) = page.som {
        sections.push(format!("Total interactable marks: {}", som.count));

        let labels = menu_like_labels(
            som,
            mission,
            &config.navigation_keywords,
            config.menu_labels,
        );
        if !labels.is_empty() {
            sections.push(format!("Relevant menu-like labels: {}", labels.join(", ")));
        }

        let marks = top_marks(som, config.top_marks);
        if !marks.is_empty() {
            sections.push(format!("Top marks:\n{}", marks.join("\n")));
        }
    } else {
        sections.push("No marked elements were detected this turn; a raw screenshot is attached instead.".to_string());
    }

    if let Some(hint) = failed_target_hint(failed_targets) {
        sections.push(hint);
    }

    if let Some(hint) = loop_guard_hint(history, config.loop_guard_window, config.loop_guard_threshold) {
        sections.push(hint);
    }

    let recent = summarise_history(&history[history.len().saturating_sub(config.history_window)..], history.len().saturating_sub(config.history_window));
    if !recent.is_empty() {
        sections.push(format!("Recent history:\n{}", recent.join("\n")));
    }

    sections.push(
        "Respond with a single JSON object: {\"thought\": string, \"action\": \"click\"|\"scroll\"|\"type\"|\"wait\"|\"done\", \"targetId\"?: string, \"value\"?: string}.".to_string(),
    );

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_core_types::{ActionKind, BoundingRect, ContextOptions, Decision, SoMCandidate};

    fn persona() -> Persona {
        Persona {
            name: "Skeptical Shopper".into(),
            base_prompt: "You are a skeptical online shopper.".into(),
            context: ContextOptions::default(),
            voice: None,
        }
    }

    fn mark(id: u32, tag: &str, text: &str, score: u8) -> SoMCandidate {
        SoMCandidate {
            id,
            tag: tag.into(),
            role: None,
            text: Some(text.into()),
            aria_label: None,
            title: None,
            href: None,
            rect: BoundingRect { x: 0.0, y: 0.0, width: 40.0, height: 20.0 },
            score,
            dom_path: id.to_string(),
        }
    }

    #[test]
    fn bare_mode_swaps_persona_rules() {
        let config = DecisionEngineConfig::default();
        let page = PageContext { url: "https://shop.test", title: "Shop", som: None };
        let prompt = assemble_prompt(&persona(), "buy shoes", &page, &[], &[], true, &config);
        assert!(prompt.contains(BARE_MODE_INSTRUCTION));
        assert!(!prompt.contains("skeptical online shopper"));
    }

    #[test]
    fn normal_mode_includes_persona_and_mission() {
        let config = DecisionEngineConfig::default();
        let page = PageContext { url: "https://shop.test", title: "Shop", som: None };
        let prompt = assemble_prompt(&persona(), "buy running shoes", &page, &[], &[], false, &config);
        assert!(prompt.contains("skeptical online shopper"));
        assert!(prompt.contains("buy running shoes"));
    }

    #[test]
    fn includes_failed_target_hint() {
        let config = DecisionEngineConfig::default();
        let page = PageContext { url: "https://shop.test", title: "Shop", som: None };
        let prompt = assemble_prompt(&persona(), "buy shoes", &page, &[], &[(3, 2)], false, &config);
        assert!(prompt.contains("#3 (failed 2x)"));
    }

    #[test]
    fn surfaces_menu_like_labels_matching_objective() {
        let config = DecisionEngineConfig::default();
        let som = SomResult {
            count: 2,
            elements: vec![mark(0, "a", "Running Shoes", 4), mark(1, "a", "Contact Us", 4)],
        };
        let page = PageContext { url: "https://shop.test", title: "Shop", som: Some(&som) };
        let prompt = assemble_prompt(&persona(), "buy running shoes", &page, &[], &[], false, &config);
        assert!(prompt.contains("Running Shoes"));
        assert!(!prompt.contains("Relevant menu-like labels: Contact Us"));
    }

    #[test]
    fn history_window_is_respected() {
        let config = DecisionEngineConfig::default();
        let mut history = Vec::new();
        for i in 0..15 {
            history.push(HistoryEntry {
                decision: Decision {
                    thought: format!("t{i}"),
                    action: ActionKind::Click,
                    target_id: Some(i.to_string()),
                    value: None,
                },
                timestamp: chrono::Utc::now(),
            });
        }
        let page = PageContext { url: "https://shop.test", title: "Shop", som: None };
        let prompt = assemble_prompt(&persona(), "buy shoes", &page, &history, &[], false, &config);
        assert!(prompt.contains("t14"));
        assert!(!prompt.contains("t0\""));
    }
}

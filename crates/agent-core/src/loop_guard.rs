//! Anti-loop hint: inspect the last eight history
//! entries, group by `(action, targetId)`, and warn the model off any
//! target it has already repeated.

use std::collections::HashMap;

use wayfarer_core_types::HistoryEntry;

/// Build the loop-guard paragraph, or `None` if nothing in the trailing
/// window repeats.
pub fn loop_guard_hint(history: &[HistoryEntry], window: usize, threshold: usize) -> Option<String> {
    let start = history.len().saturating_sub(window);
    let recent = &history[start..];

    let mut counts: HashMap<(&'static str, Option<&str>), usize> = HashMap::new();
    for entry in recent {
        let key = (entry.decision.action.as_str(), entry.decision.target_id.as_deref());
        *counts.entry(key).or_insert(0) += 1;
    }

    let repeated: Vec<String> = counts
        .into_iter()
        .filter(|(_, count)| *count >= threshold)
        .map(|((action, target), count)| match target {
            Some(target) => format!("{action} #{target} (x{count})"),
            None => format!("{action} (x{count})"),
        })
        .collect();

    if repeated.is_empty() {
        return None;
    }

    let mut hint = String::from(
        "You have repeated the following action/target pairs recently: ",
    );
    hint.push_str(&repeated.join(", "));
    hint.push_str(
        ". Choose a different mark this turn, and favour elements in an open overlay over \
         background page content.",
    );
    Some(hint)
}

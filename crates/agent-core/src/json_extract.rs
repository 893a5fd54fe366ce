//! JSON-tolerant decision parsing: the provider's raw
//! text may be wrapped in fenced code blocks or trailing prose. We only
//! need the first balanced `{...}` substring.

use serde::Deserialize;
use wayfarer_core_types::{ActionKind, Decision};

use crate::errors::AgentError;

/// The wire shape the vision LLM is asked to emit:
/// `{thought, action, targetId?, value?}`, tolerating `inputValue` as a
/// legacy alias for `value` and either a string or integer `targetId`.
#[derive(Debug, Deserialize)]
struct RawDecision {
    #[serde(default)]
    thought: Option<String>,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    #[serde(rename = "targetId")]
    target_id: Option<serde_json::Value>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    #[serde(rename = "inputValue")]
    input_value: Option<String>,
}

/// Default thought used when the upstream text has none, or an empty one.
pub const DEFAULT_UNCERTAIN_THOUGHT: &str = "Not sure what to do here, taking a closer look.";

/// Scan `text` for the first `{` and return the substring up to its
/// matching `}`, respecting string literals so braces inside quoted
/// values don't confuse the balance count.
fn first_balanced_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        let ch = b as char;
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

fn normalise_action(raw: Option<&str>) -> ActionKind {
    match raw.map(|s| s.to_ascii_lowercase()).as_deref() {
        Some("click") => ActionKind::Click,
        Some("scroll") => ActionKind::Scroll,
        Some("type") => ActionKind::Type,
        Some("wait") => ActionKind::Wait,
        // `stop` and `fail` are aliases for `done`.
        Some("done") | Some("stop") | Some("fail") => ActionKind::Done,
        // Unknown actions fall back to `wait`.
        _ => ActionKind::Wait,
    }
}

fn stringify_target(value: Option<serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse `text` into a [`Decision`], tolerating fenced code blocks and
/// trailing prose.
/// Returns [`AgentError::InvalidResponse`] only when no balanced object is
/// present at all; once an object is found, parsing never fails — missing
/// fields fall back to their normalised defaults.
pub fn parse_decision(text: &str) -> Result<Decision, AgentError> {
    let object_text = first_balanced_object(text)
        .ok_or_else(|| AgentError::InvalidResponse(text.chars().take(200).collect()))?;

    let raw: RawDecision = serde_json::from_str(object_text).unwrap_or(RawDecision {
        thought: None,
        action: None,
        target_id: None,
        value: None,
        input_value: None,
    });

    let thought = raw
        .thought
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_UNCERTAIN_THOUGHT.to_string());

    Ok(Decision {
        thought,
        action: normalise_action(raw.action.as_deref()),
        target_id: stringify_target(raw.target_id),
        value: raw.value.or(raw.input_value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_object() {
        let decision = parse_decision(r#"{"thought":"clicking shop","action":"click","targetId":"3"}"#).unwrap();
        assert_eq!(decision.action, ActionKind::Click);
        assert_eq!(decision.target_id.as_deref(), Some("3"));
    }

    #[test]
    fn tolerates_fenced_code_block_and_trailing_prose() {
        let text = "Sure, here is my answer:\n```json\n{\"thought\":\"ok\",\"action\":\"wait\"}\n```\nLet me know if you need more.";
        let decision = parse_decision(text).unwrap();
        assert_eq!(decision.action, ActionKind::Wait);
        assert_eq!(decision.thought, "ok");
    }

    #[test]
    fn stop_and_fail_map_to_done() {
        assert_eq!(
            parse_decision(r#"{"thought":"x","action":"stop"}"#).unwrap().action,
            ActionKind::Done
        );
        assert_eq!(
            parse_decision(r#"{"thought":"x","action":"fail"}"#).unwrap().action,
            ActionKind::Done
        );
    }

    #[test]
    fn unknown_action_falls_back_to_wait() {
        let decision = parse_decision(r#"{"thought":"x","action":"teleport"}"#).unwrap();
        assert_eq!(decision.action, ActionKind::Wait);
    }

    #[test]
    fn missing_thought_gets_default() {
        let decision = parse_decision(r#"{"action":"wait"}"#).unwrap();
        assert_eq!(decision.thought, DEFAULT_UNCERTAIN_THOUGHT);
    }

    #[test]
    fn empty_thought_gets_default() {
        let decision = parse_decision(r#"{"thought":"   ","action":"wait"}"#).unwrap();
        assert_eq!(decision.thought, DEFAULT_UNCERTAIN_THOUGHT);
    }

    #[test]
    fn integer_target_id_is_stringified() {
        let decision = parse_decision(r#"{"thought":"x","action":"click","targetId":7}"#).unwrap();
        assert_eq!(decision.target_id.as_deref(), Some("7"));
    }

    #[test]
    fn legacy_input_value_alias_is_accepted() {
        let decision =
            parse_decision(r#"{"thought":"x","action":"type","targetId":"1","inputValue":"bmw"}"#)
                .unwrap();
        assert_eq!(decision.value.as_deref(), Some("bmw"));
    }

    #[test]
    fn no_balanced_object_is_an_error() {
        assert!(parse_decision("no json here at all").is_err());
    }

    #[test]
    fn braces_inside_string_values_do_not_confuse_balance() {
        let decision =
            parse_decision(r#"{"thought":"a {weird} string","action":"wait"}"#).unwrap();
        assert_eq!(decision.thought, "a {weird} string");
    }
}

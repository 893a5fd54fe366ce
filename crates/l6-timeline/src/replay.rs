//! Replay script synthesis: one idempotent
//! operation per trace step, against a deterministic browser harness.
//! Each emitted call takes the same selector/coordinates/value the trace
//! step recorded, so replaying the script reproduces the run's action
//! sequence exactly.

use wayfarer_core_types::{TraceStep, TraceStepKind};

/// Escape a string literal for embedding in the generated JS harness call.
/// Required for every string field ("escaping of all
/// string literals is required").
pub fn escape_js_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            other => out.push(other),
        }
    }
    out
}

fn emit_one(step: &TraceStep) -> String {
    match step.kind {
        TraceStepKind::Goto => format!(
            "  await harness.goto(\"{}\");",
            escape_js_string(&step.url)
        ),
        TraceStepKind::Click => {
            if let Some(selector) = &step.selector {
                format!(
                    "  await harness.locatorClick(\"{}\");",
                    escape_js_string(selector)
                )
            } else if let Some((x, y)) = step.coordinates {
                format!("  await harness.mouseClick({x:.2}, {y:.2});")
            } else {
                "  // click step missing both selector and coordinates".to_string()
            }
        }
        TraceStepKind::Type => {
            let selector = step.selector.as_deref().unwrap_or("");
            let value = step.value.as_deref().unwrap_or("");
            format!(
                "  await harness.fillAndType(\"{}\", \"{}\");",
                escape_js_string(selector),
                escape_js_string(value)
            )
        }
        TraceStepKind::Scroll => {
            let delta = step.value.as_deref().unwrap_or("0");
            format!("  await harness.wheelScroll({delta});")
        }
        TraceStepKind::Wait => {
            let ms = step.wait_ms.unwrap_or(0);
            format!("  await harness.wait({ms});")
        }
        TraceStepKind::TabSwitch => "  await harness.tabSwitch(\"last-opened\");".to_string(),
    }
}

/// Render the full replay script for an ordered sequence of trace steps.
pub fn render_replay_script(run_id: &str, steps: &[TraceStep]) -> String {
    let mut script = String::new();
    script.push_str(&format!(
        "// generated replay script for run {}\n",
        escape_js_string(run_id)
    ));
    script.push_str("async function run(harness) {\n");
    for step in steps {
        if let Some(note) = &step.note {
            script.push_str(&format!("  // {}\n", note.replace('\n', " ")));
        }
        script.push_str(&emit_one(step));
        script.push('\n');
    }
    script.push_str("}\n\nmodule.exports = { run };\n");
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(kind: TraceStepKind) -> TraceStep {
        TraceStep {
            id: 1,
            timestamp: chrono::Utc::now(),
            url: "https://example.com".into(),
            kind,
            selector: None,
            coordinates: None,
            value: None,
            wait_ms: None,
            note: None,
        }
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        let escaped = escape_js_string("say \"hi\" \\ done");
        assert_eq!(escaped, "say \\\"hi\\\" \\\\ done");
    }

    #[test]
    fn escapes_newlines() {
        assert_eq!(escape_js_string("line1\nline2"), "line1\\nline2");
    }

    #[test]
    fn goto_step_renders_escaped_url() {
        let mut s = step(TraceStepKind::Goto);
        s.url = "https://example.com/\"quoted\"".into();
        let script = render_replay_script("run-1", &[s]);
        assert!(script.contains("harness.goto(\"https://example.com/\\\"quoted\\\"\")"));
    }

    #[test]
    fn click_prefers_selector_over_coordinates() {
        let mut s = step(TraceStepKind::Click);
        s.selector = Some("a.shop".into());
        s.coordinates = Some((10.0, 20.0));
        let script = render_replay_script("run-1", &[s]);
        assert!(script.contains("locatorClick(\"a.shop\")"));
        assert!(!script.contains("mouseClick"));
    }

    #[test]
    fn click_falls_back_to_coordinates() {
        let mut s = step(TraceStepKind::Click);
        s.coordinates = Some((10.5, 20.25));
        let script = render_replay_script("run-1", &[s]);
        assert!(script.contains("mouseClick(10.50, 20.25)"));
    }

    #[test]
    fn steps_render_in_order() {
        let steps = vec![step(TraceStepKind::Goto), step(TraceStepKind::Wait)];
        let script = render_replay_script("run-1", &steps);
        let goto_pos = script.find("harness.goto").unwrap();
        let wait_pos = script.find("harness.wait").unwrap();
        assert!(goto_pos < wait_pos);
    }
}

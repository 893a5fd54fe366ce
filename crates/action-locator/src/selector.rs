//! Stable CSS-like selector derivation for trace steps.

use crate::element::ElementDescriptor;

/// Maximum ancestor chain depth used by the tag/nth-of-type fallback.
pub const MAX_CHAIN_DEPTH: usize = 7;

fn css_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Derive the most stable selector available for `el`, trying each
/// strategy in descending order of stability.
pub fn derive_selector(el: &ElementDescriptor) -> String {
    if let Some(id) = &el.id {
        if !id.is_empty() {
            return format!("#{}", css_escape(id));
        }
    }
    if let Some(test_id) = &el.test_id {
        if !test_id.is_empty() {
            return format!("[data-testid=\"{}\"]", css_escape(test_id));
        }
    }
    if matches!(el.tag.as_str(), "input" | "textarea") {
        if let Some(name) = &el.name {
            if !name.is_empty() {
                return format!("{}[name=\"{}\"]", el.tag, css_escape(name));
            }
        }
        if let Some(placeholder) = &el.placeholder {
            if !placeholder.is_empty() {
                return format!("{}[placeholder=\"{}\"]", el.tag, css_escape(placeholder));
            }
        }
    }
    if el.tag == "a" {
        if let Some(href) = &el.href {
            if !href.is_empty() {
                return format!("a[href=\"{}\"]", css_escape(href));
            }
        }
    }
    if let Some(label) = &el.aria_label {
        if !label.is_empty() {
            return format!("[aria-label=\"{}\"]", css_escape(label));
        }
    }
    chain_selector(el)
}

/// Bounded tag + nth-of-type chain: `html > body > div:nth-of-type(2) >
/// button:nth-of-type(1)`, truncated to [`MAX_CHAIN_DEPTH`] ancestors.
fn chain_selector(el: &ElementDescriptor) -> String {
    let mut segments: Vec<String> = el
        .ancestors
        .iter()
        .rev()
        .take(MAX_CHAIN_DEPTH)
        .map(|a| format!("{}:nth-of-type({})", a.tag, a.nth_of_type.max(1)))
        .collect();
    segments.push(format!("{}:nth-of-type({})", el.tag, el.nth_of_type.max(1)));
    segments.join(" > ")
}

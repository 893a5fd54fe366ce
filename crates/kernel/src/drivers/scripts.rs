//! In-page script bodies: each function builds one self-contained JS IIFE that is
//! shipped whole to [`cdp_adapter::BrowserDriver::evaluate`]. Parameters
//! are inlined as JSON literals rather than passed out-of-band, matching
//! what `evaluate` actually accepts.

use action_locator::ElementDescriptor;
use action_primitives::Point;
use serde_json::json;
use wayfarer_core_types::BoundingRect;

fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// The full SoM traversal: stability wait,
/// then a breadth-first DOM/shadow-DOM walk reporting every node's raw
/// attributes. Scoring, filtering, dedup and the mark cap all happen
/// host-side in `perceiver-visual`; this script only reports what it saw.
pub fn som_traversal_script() -> String {
    r#"(() => {
  const QUIET_WINDOW_MS = 500;
  const HARD_CAP_MS = 3000;
  const start = performance.now();
  let lastMutation = start;
  const observer = new MutationObserver(() => { lastMutation = performance.now(); });
  observer.observe(document.documentElement, { childList: true, subtree: true, attributes: true });

  return new Promise((resolve) => {
    const poll = () => {
      const now = performance.now();
      if (now - lastMutation >= QUIET_WINDOW_MS || now - start >= HARD_CAP_MS) {
        observer.disconnect();
        resolve(collect());
        return;
      }
      requestAnimationFrame(poll);
    };
    requestAnimationFrame(poll);
  });

  function collect() {
    const out = [];
    const semanticHint = /\b(btn|button|cta|link|nav|menu|tab)\b/i;
    const nativeTags = new Set(["a", "button", "input", "select", "textarea", "summary"]);
    const interactiveRoles = new Set([
      "button", "link", "menuitem", "tab", "checkbox", "radio", "switch", "textbox", "searchbox",
    ]);

    function scoreOf(el, style) {
      const hidden = style.display === "none" || el.hasAttribute("hidden");
      const disabled = el.disabled === true;
      const ariaDisabled = el.getAttribute("aria-disabled") === "true";
      const ariaHidden = el.getAttribute("aria-hidden") === "true";
      const isHiddenInput = el.tagName === "INPUT" && el.type === "hidden";
      if (hidden || disabled || ariaDisabled || ariaHidden || isHiddenInput) return 0;
      if (nativeTags.has(el.tagName.toLowerCase())) return 4;
      if (interactiveRoles.has((el.getAttribute("role") || "").toLowerCase())) return 3;
      const tabindex = el.getAttribute("tabindex");
      if (el.onclick || (tabindex !== null && Number(tabindex) >= 0)) return 2;
      const hasText = (el.textContent || "").trim().length > 0;
      if (style.cursor === "pointer" && (semanticHint.test(el.className || "") || hasText)) return 1;
      return 0;
    }

    function walk(root, ancestorScores, pathPrefix) {
      const overlay = document.getElementById("__wayfarer_overlay__");
      const stack = [[root, ancestorScores, pathPrefix]];
      while (stack.length) {
        const [node, ancestors, prefix] = stack.pop();
        const children = node.children || [];
        for (let i = 0; i < children.length; i++) {
          const child = children[i];
          if (child === overlay) continue;
          const path = prefix.concat([String(i)]);
          const style = getComputedStyle(child);
          const score = scoreOf(child, style);
          const rect = child.getBoundingClientRect();
          out.push({
            tag: child.tagName.toLowerCase(),
            role: child.getAttribute("role"),
            text: (child.textContent || "").trim().slice(0, 200) || null,
            aria_label: child.getAttribute("aria-label"),
            title: child.getAttribute("title"),
            href: child.tagName === "A" ? child.getAttribute("href") : null,
            rect: { x: rect.x, y: rect.y, width: rect.width, height: rect.height },
            dom_path: path.join("."),
            is_native_interactive_tag: nativeTags.has(child.tagName.toLowerCase()),
            is_aria_interactive_role: interactiveRoles.has((child.getAttribute("role") || "").toLowerCase()),
            has_onclick_or_tabindex: !!child.onclick || Number(child.getAttribute("tabindex")) >= 0,
            cursor_pointer_with_semantic_hint: style.cursor === "pointer",
            hidden: style.display === "none" || child.hasAttribute("hidden"),
            disabled: child.disabled === true,
            aria_disabled: child.getAttribute("aria-disabled") === "true",
            aria_hidden: child.getAttribute("aria-hidden") === "true",
            is_hidden_input: child.tagName === "INPUT" && child.type === "hidden",
            display_none: style.display === "none",
            visibility_hidden: style.visibility === "hidden",
            pointer_events_none: style.pointerEvents === "none",
            intersects_viewport: rect.width > 0 && rect.height > 0 && rect.bottom > 0 && rect.right > 0
              && rect.top < innerHeight && rect.left < innerWidth,
            ancestor_scores: ancestors.slice(0, 8),
          });
          const nextAncestors = [score, ...ancestors];
          stack.push([child, nextAncestors, path]);
          if (child.shadowRoot) stack.push([child.shadowRoot, nextAncestors, path.concat(["s"])]);
        }
      }
    }

    walk(document.body, [], []);
    return out;
  }
})()"#
        .to_string()
}

/// One surviving candidate's final mark id, the stable path the
/// traversal saw it at, and the label rect `perceiver_visual::overlay`
/// chose for it, all the second-pass "apply marks" script needs to
/// relocate the node and draw its outline/label.
pub struct MarkPlacement {
    pub mark_id: u32,
    pub dom_path: String,
    pub label: BoundingRect,
}

/// Second pass after discovery: re-locate every surviving candidate by
/// the path the traversal reported it at, write the `data-wayfarer-mark`
/// attribute onto it, and draw the outline + number-label overlay from
/// the host-computed label rects. Run once per perception pass, right
/// before the marked screenshot is captured.
pub fn apply_marks_script(placements: &[MarkPlacement]) -> String {
    let marks = json!(placements
        .iter()
        .map(|p| json!({
            "id": p.mark_id,
            "path": p.dom_path,
            "label": { "x": p.label.x, "y": p.label.y, "width": p.label.width, "height": p.label.height },
        }))
        .collect::<Vec<_>>());

    format!(
        r#"(() => {{
  const marks = {marks};
  let overlay = document.getElementById("__wayfarer_overlay__");
  if (!overlay) {{
    overlay = document.createElement("div");
    overlay.id = "__wayfarer_overlay__";
    overlay.style.cssText = "position:fixed;inset:0;z-index:2147483646;pointer-events:none;";
    document.body.appendChild(overlay);
  }}
  overlay.innerHTML = "";

  for (const mark of marks) {{
    const el = resolvePath(mark.path);
    if (!el) continue;
    el.setAttribute("data-wayfarer-mark", String(mark.id));

    const rect = el.getBoundingClientRect();
    const outline = document.createElement("div");
    outline.style.cssText = `position:fixed;left:${{rect.x}}px;top:${{rect.y}}px;width:${{rect.width}}px;height:${{rect.height}}px;` +
      "outline:2px solid rgba(255,0,64,.85);outline-offset:1px;box-sizing:border-box;";
    overlay.appendChild(outline);

    const label = document.createElement("div");
    label.textContent = String(mark.id);
    label.style.cssText = `position:fixed;left:${{mark.label.x}}px;top:${{mark.label.y}}px;width:${{mark.label.width}}px;height:${{mark.label.height}}px;` +
      "background:rgba(255,0,64,.9);color:#fff;font:11px/16px monospace;text-align:center;border-radius:3px;";
    overlay.appendChild(label);
  }}

  return marks.length;

  function resolvePath(path) {{
    const steps = path.split(".");
    let node = document.body;
    for (const step of steps) {{
      if (!node) return null;
      if (step === "s") {{ node = node.shadowRoot; continue; }}
      const idx = Number(step);
      node = (node.children || [])[idx];
    }}
    return node || null;
  }}
}})()"#,
        marks = marks
    )
}

/// Toggle the fixed overlay container's visibility without re-running
/// discovery.
pub fn overlay_visibility_script(visible: bool) -> String {
    format!(
        r#"(() => {{
  const overlay = document.getElementById("__wayfarer_overlay__");
  if (overlay) overlay.style.display = {} ? "block" : "none";
  return true;
}})()"#,
        visible
    )
}

/// Locate the element carrying `mark_id`'s SoM attribute, scroll it into
/// view, and report its attributes for stable-selector derivation (spec
/// section 4.5 "click"). `null` if no element on the page currently
/// carries it. Geometry is read separately via
/// `BrowserDriver::bounding_rect_for_mark`, which scrolls into view too.
pub fn mark_element_script(mark_id: u32) -> String {
    format!(
        r#"(() => {{
  const el = document.querySelector(`[data-wayfarer-mark="{id}"]`);
  if (!el) return null;
  el.scrollIntoView({{ block: "center", inline: "center" }});
  return describeElement(el);
  {descriptor_helper}
}})()"#,
        id = mark_id,
        descriptor_helper = DESCRIBE_ELEMENT_HELPER
    )
}

/// As [`mark_element_script`], but additionally reports whether the
/// element is "fillable": a textarea,
/// non-button/hidden input, contenteditable, or textbox/searchbox role.
pub fn type_target_element_script(mark_id: u32) -> String {
    format!(
        r#"(() => {{
  const el = document.querySelector(`[data-wayfarer-mark="{id}"]`);
  if (!el) return null;
  el.scrollIntoView({{ block: "center", inline: "center" }});
  return {{ element: describeElement(el), fillable: isFillable(el) }};
  {descriptor_helper}
  {fillable_helper}
}})()"#,
        id = mark_id,
        descriptor_helper = DESCRIBE_ELEMENT_HELPER,
        fillable_helper = IS_FILLABLE_HELPER
    )
}

/// Every visible fillable input/textarea on the page, candidates for the
/// nearest-field fallback search.
pub fn fillable_fields_script() -> String {
    format!(
        r#"(() => {{
  const out = [];
  document.querySelectorAll("input, textarea, [contenteditable], [role=textbox], [role=searchbox]").forEach((el) => {{
    if (!isFillable(el)) return;
    const rect = el.getBoundingClientRect();
    if (rect.width <= 0 || rect.height <= 0) return;
    out.push({{ element: describeElement(el), rect: {{ x: rect.x, y: rect.y, width: rect.width, height: rect.height }} }});
  }});
  return out;
  {descriptor_helper}
  {fillable_helper}
}})()"#,
        descriptor_helper = DESCRIBE_ELEMENT_HELPER,
        fillable_helper = IS_FILLABLE_HELPER
    )
}

/// Clear the currently focused element's value.
pub fn clear_field_script() -> String {
    r#"(() => {
  const el = document.activeElement;
  if (!el) return false;
  if (el.isContentEditable) { el.textContent = ""; return true; }
  if ("value" in el) { el.value = ""; return true; }
  return false;
})()"#
        .to_string()
}

/// Move the in-page ghost-cursor element.
pub fn move_ghost_cursor_script(point: Point) -> String {
    format!(
        r#"(() => {{
  let cursor = document.getElementById("__wayfarer_cursor__");
  if (!cursor) {{
    cursor = document.createElement("div");
    cursor.id = "__wayfarer_cursor__";
    cursor.style.cssText = "position:fixed;z-index:2147483647;pointer-events:none;width:10px;height:10px;border-radius:50%;background:rgba(255,0,0,.6);transform:translate(-50%,-50%);";
    document.body.appendChild(cursor);
  }}
  cursor.style.left = {x}px;
  cursor.style.top = {y}px;
  return true;
}})()"#,
        x = point.x,
        y = point.y
    )
}

/// Render one ripple animation at `point`.
pub fn render_ripple_script(point: Point, radius_px: f64, filled: bool) -> String {
    format!(
        r#"(() => {{
  const ripple = document.createElement("div");
  const size = {radius} * 2;
  ripple.style.cssText = `position:fixed;left:{x}px;top:{y}px;width:${{size}}px;height:${{size}}px;` +
    `transform:translate(-50%,-50%);border-radius:50%;z-index:2147483647;pointer-events:none;` +
    `${{{filled} ? "background:rgba(66,133,244,.45);" : "border:2px solid rgba(66,133,244,.65);"}}` +
    `transition:opacity .4s ease-out;`;
  document.body.appendChild(ripple);
  requestAnimationFrame(() => {{ ripple.style.opacity = "0"; }});
  setTimeout(() => ripple.remove(), 500);
  return true;
}})()"#,
        radius = radius_px,
        x = point.x,
        y = point.y,
        filled = filled
    )
}

/// Cookie-surface detection: visible
/// element matching the fixed selector set, or a visible block-level
/// element carrying enough keyword-matching text.
pub fn cookie_scan_script(surface_selectors: &[&str], text_keywords: &[&str]) -> String {
    format!(
        r#"(() => {{
  const selectors = {selectors};
  const keywords = {keywords};
  const out = [];
  const matched = new Set();
  selectors.forEach((sel) => {{
    document.querySelectorAll(sel).forEach((el) => {{
      if (isVisible(el)) matched.add(el);
    }});
  }});
  matched.forEach((el) => out.push({{ matched_selector: true, block_text: null }}));
  document.querySelectorAll("div, section, aside, dialog").forEach((el) => {{
    if (matched.has(el) || !isVisible(el)) return;
    const text = (el.textContent || "").trim();
    if (text.length < 20) return;
    const lower = text.toLowerCase();
    if (keywords.some((k) => lower.includes(k))) {{
      out.push({{ matched_selector: false, block_text: text.slice(0, 400) }});
    }}
  }});
  return out;
  {visible_helper}
}})()"#,
        selectors = json!(surface_selectors),
        keywords = json!(text_keywords),
        visible_helper = IS_VISIBLE_HELPER
    )
}

/// Layer 1/3: click the first visible match of the known-good vendor
/// selector list.
pub fn strict_selectors_script(selectors: &[&str]) -> String {
    format!(
        r#"(() => {{
  const selectors = {selectors};
  for (const sel of selectors) {{
    const el = document.querySelector(sel);
    if (el && isVisible(el)) {{ el.click(); return true; }}
  }}
  return false;
  {visible_helper}
}})()"#,
        selectors = json!(selectors),
        visible_helper = IS_VISIBLE_HELPER
    )
}

/// Layer 2: within any visible cookie-context container, click the
/// first accept-phrase match.
pub fn container_text_pattern_script(
    container_selectors: &[&str],
    accept_phrases: &[&str],
) -> String {
    format!(
        r#"(() => {{
  const containers = {containers};
  const phrases = {phrases};
  for (const containerSel of containers) {{
    for (const container of document.querySelectorAll(containerSel)) {{
      if (!isVisible(container)) continue;
      const candidates = container.querySelectorAll("button, a, [role=button]");
      for (const el of candidates) {{
        const text = (el.textContent || "").trim().toLowerCase();
        if (phrases.some((p) => text.includes(p))) {{ el.click(); return true; }}
      }}
    }}
  }}
  return false;
  {visible_helper}
}})()"#,
        containers = json!(container_selectors),
        phrases = json!(accept_phrases),
        visible_helper = IS_VISIBLE_HELPER
    )
}

/// Layer 4: on-screen accept-phrase candidates for vision scoring (spec
/// section 4.4 layer 4): phrase, position, and ancestor depth to the
/// nearest cookie-context container.
pub fn vision_candidates_script(cookie_selectors: &[&str], accept_phrases: &[&str]) -> String {
    format!(
        r#"(() => {{
  const cookieSelectors = {cookie_selectors};
  const phrases = {phrases};
  const out = [];
  document.querySelectorAll("button, a, [role=button]").forEach((el) => {{
    if (!isVisible(el)) return;
    const text = (el.textContent || "").trim().toLowerCase();
    const phrase = phrases.find((p) => text.includes(p));
    if (!phrase) return;
    const rect = el.getBoundingClientRect();
    let depth = null;
    let node = el;
    for (let i = 0; i < 6 && node; i++) {{
      if (cookieSelectors.some((sel) => node.matches && node.matches(sel))) {{ depth = i; break; }}
      node = node.parentElement;
    }}
    out.push({{
      text: phrase,
      x: rect.x,
      y: rect.y,
      width: rect.width,
      height: rect.height,
      cookie_ancestor_depth: depth,
    }});
  }});
  return out;
  {visible_helper}
}})()"#,
        cookie_selectors = json!(cookie_selectors),
        phrases = json!(accept_phrases),
        visible_helper = IS_VISIBLE_HELPER
    )
}

const IS_VISIBLE_HELPER: &str = r#"function isVisible(el) {
    const style = getComputedStyle(el);
    if (style.display === "none" || style.visibility === "hidden") return false;
    const rect = el.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
  }"#;

const IS_FILLABLE_HELPER: &str = r#"function isFillable(el) {
    if (el.isContentEditable) return true;
    const role = (el.getAttribute("role") || "").toLowerCase();
    if (role === "textbox" || role === "searchbox") return true;
    if (el.tagName === "TEXTAREA") return true;
    if (el.tagName === "INPUT") return el.type !== "button" && el.type !== "submit" && el.type !== "hidden" && el.type !== "checkbox" && el.type !== "radio";
    return false;
  }"#;

const DESCRIBE_ELEMENT_HELPER: &str = r#"function describeElement(el) {
    const ancestors = [];
    let node = el.parentElement;
    while (node && ancestors.length < 7) {
      ancestors.push({ tag: node.tagName.toLowerCase(), nth_of_type: nthOfType(node) });
      node = node.parentElement;
    }
    return {
      tag: el.tagName.toLowerCase(),
      id: el.id || null,
      test_id: el.getAttribute("data-testid"),
      name: el.getAttribute("name"),
      placeholder: el.getAttribute("placeholder"),
      href: el.tagName === "A" ? el.getAttribute("href") : null,
      aria_label: el.getAttribute("aria-label"),
      nth_of_type: nthOfType(el),
      ancestors,
    };
  }
  function nthOfType(el) {
    let i = 1;
    let sibling = el.previousElementSibling;
    while (sibling) {
      if (sibling.tagName === el.tagName) i++;
      sibling = sibling.previousElementSibling;
    }
    return i;
  }"#;

/// Deserialization target for `describeElement`'s JSON shape, mapped
/// into [`ElementDescriptor`] by [`super::dto::RawElement::into_descriptor`].
pub type ScriptSource = ();

pub fn js_escape(value: &str) -> String {
    js_string(value)
}

/// Read `{url, title}` off the active page, fed into
/// `agent_core::PageContext` each turn.
pub fn page_info_script() -> String {
    r#"(() => ({ url: location.href, title: document.title }))()"#.to_string()
}

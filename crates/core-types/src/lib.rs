#![allow(dead_code)]
//! Shared data model for the perception/decision/action loop.
//!
//! Every other crate in the workspace depends on this one and on nothing
//! else from the kernel, so the types here stay free of any browser or HTTP
//! concern.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

#[cfg(feature = "serde-full")]
use chrono::{DateTime, Utc};
#[cfg(feature = "serde-full")]
use serde::{Deserialize, Serialize};

/// Workspace-wide error taxonomy.
#[derive(Debug, Error, Clone)]
pub enum AgentError {
    #[error("transient upstream error: {0}")]
    TransientUpstream(String),

    #[error("perception failed: {0}")]
    Perception(String),

    #[error("action failed on mark {mark_id:?}: {message}")]
    Action {
        mark_id: Option<u32>,
        message: String,
    },

    #[error("cookie dismissal failed: {0}")]
    CookieDismissal(String),

    #[error("navigation warning: {0}")]
    Navigation(String),

    #[error("active tab lost: {0}")]
    TabLoss(String),

    #[error("fatal: {0}")]
    Fatal(String),

    #[error("{message}")]
    Message { message: String },
}

impl AgentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    /// The mark id this error should be charged against in the failed-target
    /// ledger, if any.
    pub fn charged_mark(&self) -> Option<u32> {
        match self {
            AgentError::Action { mark_id, .. } => *mark_id,
            _ => None,
        }
    }
}

#[cfg_attr(feature = "serde-full", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct RunId(pub String);

impl RunId {
    /// `YYYY-MM-DDTHH-MM-SS-<uuid-suffix>-<persona-slug>`.
    pub fn new(timestamp: impl fmt::Display, persona_slug: &str) -> Self {
        let suffix = &Uuid::new_v4().simple().to_string()[..8];
        Self(format!("{timestamp}-{suffix}-{persona_slug}"))
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lowercase, non-alphanumeric collapsed to hyphen, trimmed.
pub fn slugify_persona(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = false;
    for ch in name.chars().flat_map(|c| c.to_lowercase()) {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_was_hyphen = false;
        } else if !last_was_hyphen && !slug.is_empty() {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg_attr(feature = "serde-full", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RunStatus {
    Idle,
    Starting,
    Scanning,
    Thinking,
    Acting,
    Stopped,
}

impl RunStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RunStatus::Idle => "idle",
            RunStatus::Starting => "starting",
            RunStatus::Scanning => "scanning",
            RunStatus::Thinking => "thinking",
            RunStatus::Acting => "acting",
            RunStatus::Stopped => "stopped",
        }
    }
}

#[cfg_attr(feature = "serde-full", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default)]
pub struct VoiceConfig {
    pub voice_name: String,
    pub language_code: String,
    pub system_instruction: Option<String>,
}

#[cfg_attr(feature = "serde-full", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct ContextOptions {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub device_scale_factor: f64,
    pub locale: String,
    pub timezone: String,
    pub reduced_motion: bool,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            viewport_width: 1280,
            viewport_height: 800,
            device_scale_factor: 1.0,
            locale: "en-US".to_string(),
            timezone: "UTC".to_string(),
            reduced_motion: false,
        }
    }
}

#[cfg_attr(feature = "serde-full", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct Persona {
    pub name: String,
    pub base_prompt: String,
    pub context: ContextOptions,
    pub voice: Option<VoiceConfig>,
}

impl Persona {
    pub fn slug(&self) -> String {
        slugify_persona(&self.name)
    }
}

#[cfg_attr(feature = "serde-full", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct RunOptions {
    pub debug_marks: bool,
    pub voice_tts: bool,
    pub headless: bool,
    pub save_trace: bool,
    pub save_thoughts: bool,
    pub save_screenshots: bool,
    pub model_id: String,
    pub monkey_mode: bool,
    pub bare_mode: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            debug_marks: true,
            voice_tts: false,
            headless: true,
            save_trace: true,
            save_thoughts: true,
            save_screenshots: false,
            model_id: "default".to_string(),
            monkey_mode: false,
            bare_mode: false,
        }
    }
}

#[cfg_attr(feature = "serde-full", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct Run {
    pub id: RunId,
    pub target_url: String,
    pub persona: Persona,
    pub mission: String,
    pub options: RunOptions,
    pub status: RunStatus,
    #[cfg(feature = "serde-full")]
    pub started_at: DateTime<Utc>,
    #[cfg(not(feature = "serde-full"))]
    pub started_at_marker: (),
}

#[cfg_attr(feature = "serde-full", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingRect {
    pub fn area(&self) -> f64 {
        (self.width.max(0.0)) * (self.height.max(0.0))
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Overlap area between two rectangles, 0 if disjoint.
    pub fn overlap_area(&self, other: &BoundingRect) -> f64 {
        let x_overlap = (self.x + self.width).min(other.x + other.width) - self.x.max(other.x);
        let y_overlap = (self.y + self.height).min(other.y + other.height) - self.y.max(other.y);
        if x_overlap > 0.0 && y_overlap > 0.0 {
            x_overlap * y_overlap
        } else {
            0.0
        }
    }

    /// Fraction of the smaller rectangle's area covered by the overlap.
    pub fn overlap_fraction_of_smaller(&self, other: &BoundingRect) -> f64 {
        let smaller = self.area().min(other.area());
        if smaller <= 0.0 {
            return 0.0;
        }
        self.overlap_area(other) / smaller
    }
}

#[cfg_attr(feature = "serde-full", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct SoMCandidate {
    pub id: u32,
    pub tag: String,
    pub role: Option<String>,
    pub text: Option<String>,
    pub aria_label: Option<String>,
    pub title: Option<String>,
    pub href: Option<String>,
    pub rect: BoundingRect,
    pub score: u8,
    /// A DOM path stable enough to re-locate the exact element the
    /// traversal saw this mark on, e.g. an index chain through
    /// `children` from `document.body`. Used to write the mark id back
    /// onto the live node once discovery has picked the surviving set.
    pub dom_path: String,
}

#[cfg_attr(feature = "serde-full", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default)]
pub struct SomResult {
    pub count: usize,
    pub elements: Vec<SoMCandidate>,
}

#[cfg_attr(feature = "serde-full", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct PageObservation {
    pub url: String,
    pub title: String,
    pub som: Option<SomResult>,
    pub marked_screenshot: Vec<u8>,
    pub clean_screenshot: Option<Vec<u8>>,
    #[cfg(feature = "serde-full")]
    pub timestamp: DateTime<Utc>,
}

#[cfg_attr(feature = "serde-full", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ActionKind {
    Click,
    Scroll,
    Type,
    Wait,
    Done,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Click => "click",
            ActionKind::Scroll => "scroll",
            ActionKind::Type => "type",
            ActionKind::Wait => "wait",
            ActionKind::Done => "done",
        }
    }

    pub fn is_actionable(&self) -> bool {
        matches!(self, ActionKind::Click | ActionKind::Type | ActionKind::Scroll)
    }
}

#[cfg_attr(feature = "serde-full", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct Decision {
    pub thought: String,
    pub action: ActionKind,
    pub target_id: Option<String>,
    pub value: Option<String>,
}

impl Decision {
    pub fn wait(thought: impl Into<String>) -> Self {
        Self {
            thought: thought.into(),
            action: ActionKind::Wait,
            target_id: None,
            value: None,
        }
    }
}

#[cfg_attr(feature = "serde-full", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub decision: Decision,
    #[cfg(feature = "serde-full")]
    pub timestamp: DateTime<Utc>,
}

/// Maximum number of history entries kept for prompt context.
pub const HISTORY_RETAIN: usize = 10;

#[cfg_attr(feature = "serde-full", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TraceStepKind {
    Goto,
    Click,
    Type,
    Scroll,
    Wait,
    TabSwitch,
}

impl TraceStepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraceStepKind::Goto => "goto",
            TraceStepKind::Click => "click",
            TraceStepKind::Type => "type",
            TraceStepKind::Scroll => "scroll",
            TraceStepKind::Wait => "wait",
            TraceStepKind::TabSwitch => "tab-switch",
        }
    }
}

#[cfg_attr(feature = "serde-full", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct TraceStep {
    pub id: u64,
    #[cfg(feature = "serde-full")]
    pub timestamp: DateTime<Utc>,
    pub url: String,
    pub kind: TraceStepKind,
    pub selector: Option<String>,
    pub coordinates: Option<(f64, f64)>,
    pub value: Option<String>,
    pub wait_ms: Option<u64>,
    pub note: Option<String>,
}

#[cfg_attr(feature = "serde-full", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct ThoughtRecord {
    #[cfg(feature = "serde-full")]
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub url: String,
}

#[cfg_attr(feature = "serde-full", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct StepRecord {
    pub id: u64,
    #[cfg(feature = "serde-full")]
    pub timestamp: DateTime<Utc>,
    pub action: ActionKind,
    pub target_id: Option<String>,
    pub value: Option<String>,
    pub thought: String,
    pub url: String,
}

#[cfg_attr(feature = "serde-full", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct ErrorRecord {
    #[cfg(feature = "serde-full")]
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub url: String,
}

#[cfg_attr(feature = "serde-full", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct ScreenshotRecord {
    #[cfg(feature = "serde-full")]
    pub timestamp: DateTime<Utc>,
    pub path: String,
    pub url: String,
}

#[cfg_attr(feature = "serde-full", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct SpeechRequest {
    pub id: String,
    pub thought_text: String,
    pub audio_base64: String,
    pub mime: String,
}

impl SpeechRequest {
    pub fn new(thought_text: impl Into<String>, audio_base64: String, mime: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            thought_text: thought_text.into(),
            audio_base64,
            mime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_and_trims() {
        assert_eq!(slugify_persona("  Skeptical Shopper!! "), "skeptical-shopper");
        assert_eq!(slugify_persona("---"), "");
    }

    #[test]
    fn rect_overlap_fraction() {
        let a = BoundingRect { x: 0.0, y: 0.0, width: 10.0, height: 10.0 };
        let b = BoundingRect { x: 5.0, y: 5.0, width: 10.0, height: 10.0 };
        // overlap is a 5x5 square = 25, smaller area is 100, fraction = 0.25
        assert!((a.overlap_fraction_of_smaller(&b) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn disjoint_rects_have_zero_overlap() {
        let a = BoundingRect { x: 0.0, y: 0.0, width: 10.0, height: 10.0 };
        let b = BoundingRect { x: 100.0, y: 100.0, width: 10.0, height: 10.0 };
        assert_eq!(a.overlap_area(&b), 0.0);
    }

    #[test]
    fn action_kind_actionable() {
        assert!(ActionKind::Click.is_actionable());
        assert!(ActionKind::Type.is_actionable());
        assert!(ActionKind::Scroll.is_actionable());
        assert!(!ActionKind::Wait.is_actionable());
        assert!(!ActionKind::Done.is_actionable());
    }
}

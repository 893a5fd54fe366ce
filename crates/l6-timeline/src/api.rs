//! The Trace & Report Builder: receives event
//! notifications during a Run and owns its own storage; on stop, emits
//! whichever artifact families their toggle allows.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use wayfarer_core_types::{ErrorRecord, ScreenshotRecord, StepRecord, ThoughtRecord, TraceStep};

use crate::errors::TlResult;
use crate::model::{ArtifactBundle, ArtifactRef, RunMetadata, SaveToggles};
use crate::replay::render_replay_script;
use crate::report::{write_report_pdf, write_steps_csv, ReportDocument};
use crate::trace::TraceDocument;

#[derive(Default)]
pub struct Timeline {
    thoughts: Mutex<Vec<ThoughtRecord>>,
    steps: Mutex<Vec<StepRecord>>,
    errors: Mutex<Vec<ErrorRecord>>,
    screenshots: Mutex<Vec<ScreenshotRecord>>,
    trace_steps: Mutex<Vec<TraceStep>>,
    next_trace_id: AtomicU64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_thought(&self, record: ThoughtRecord) {
        self.thoughts.lock().push(record);
        crate::metrics::record_thought();
    }

    pub fn record_step(&self, record: StepRecord) {
        self.steps.lock().push(record);
        crate::metrics::record_step();
    }

    pub fn record_error(&self, record: ErrorRecord) {
        self.errors.lock().push(record);
    }

    pub fn record_screenshot(&self, record: ScreenshotRecord) {
        self.screenshots.lock().push(record);
    }

    /// Append a trace step, assigning the next sequential id. Append-only
    /// within a Run.
    pub fn record_trace_step(&self, mut step: TraceStep) -> u64 {
        let id = self.next_trace_id.fetch_add(1, Ordering::SeqCst);
        step.id = id;
        self.trace_steps.lock().push(step);
        id
    }

    pub fn thought_count(&self) -> usize {
        self.thoughts.lock().len()
    }

    pub fn step_count(&self) -> usize {
        self.steps.lock().len()
    }

    /// Emit every artifact family the toggles and recorded data allow,
    /// under `artifact_dir` (already `artifacts/<runId>/`).
    pub fn finish(
        &self,
        artifact_dir: &Path,
        meta: &RunMetadata,
        toggles: SaveToggles,
    ) -> TlResult<ArtifactBundle> {
        let mut bundle = ArtifactBundle::default();
        let trace_steps = self.trace_steps.lock().clone();
        let thoughts = self.thoughts.lock().clone();
        let steps = self.steps.lock().clone();
        let errors = self.errors.lock().clone();
        let screenshots = self.screenshots.lock().clone();

        if toggles.save_trace && !trace_steps.is_empty() {
            let trace_dir = artifact_dir.join("trace");
            fs::create_dir_all(&trace_dir)?;

            let doc = TraceDocument::build(meta, trace_steps.clone());
            let trace_name = format!("trace-{}.json", meta.run_id);
            let trace_path = trace_dir.join(&trace_name);
            fs::write(&trace_path, serde_json::to_vec_pretty(&doc)?)?;
            bundle.trace_json = Some(ArtifactRef::new(relative(&meta.run_id, artifact_dir, &trace_path)));

            let script = render_replay_script(&meta.run_id, &trace_steps);
            let replay_name = format!("trace-{}.replay.js", meta.run_id);
            let replay_path = trace_dir.join(&replay_name);
            fs::write(&replay_path, script)?;
            bundle.replay_script = Some(ArtifactRef::new(relative(&meta.run_id, artifact_dir, &replay_path)));
        }

        if toggles.save_thoughts {
            let thoughts_dir = artifact_dir.join("thoughts");
            fs::create_dir_all(&thoughts_dir)?;

            let json_path = thoughts_dir.join("thoughts.json");
            fs::write(&json_path, serde_json::to_vec_pretty(&thoughts)?)?;
            bundle.thoughts_json = Some(ArtifactRef::new(relative(&meta.run_id, artifact_dir, &json_path)));

            let txt_path = thoughts_dir.join("thoughts.txt");
            let mut text = String::new();
            for thought in &thoughts {
                text.push_str(&format!("[{}] {}\n", thought.timestamp.to_rfc3339(), thought.message));
            }
            fs::write(&txt_path, text)?;
            bundle.thoughts_txt = Some(ArtifactRef::new(relative(&meta.run_id, artifact_dir, &txt_path)));
        }

        if !steps.is_empty() {
            let report_dir = artifact_dir.join("report");
            fs::create_dir_all(&report_dir)?;

            let doc = ReportDocument::build(meta, thoughts, steps, errors, screenshots);

            let json_path = report_dir.join("report.json");
            fs::write(&json_path, serde_json::to_vec_pretty(&doc)?)?;
            bundle.report_json = Some(ArtifactRef::new(relative(&meta.run_id, artifact_dir, &json_path)));

            let csv_path = report_dir.join("steps.csv");
            write_steps_csv(&csv_path, &doc.steps)?;
            bundle.steps_csv = Some(ArtifactRef::new(relative(&meta.run_id, artifact_dir, &csv_path)));

            let pdf_path = report_dir.join("report.pdf");
            write_report_pdf(&pdf_path, &doc, artifact_dir)?;
            bundle.report_pdf = Some(ArtifactRef::new(relative(&meta.run_id, artifact_dir, &pdf_path)));
        }

        Ok(bundle)
    }
}

/// `artifact_dir` is already `<artifact_root>/<run_id>/`; re-prefix the
/// run id so the returned path is relative to `artifact_root` itself,
/// matching the `/downloads/<relative>` namespace served off that root.
fn relative(run_id: &str, base: &Path, full: &Path) -> PathBuf {
    let stripped = full.strip_prefix(base).unwrap_or(full);
    Path::new(run_id).join(stripped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_core_types::{ActionKind, TraceStepKind};

    fn meta() -> RunMetadata {
        RunMetadata {
            run_id: "2026-07-28T00-00-00-abcd1234-shopper".into(),
            start_url: "https://shop.test".into(),
            final_url: "https://shop.test/cart".into(),
            objective: "buy running shoes".into(),
            persona: "skeptical-shopper".into(),
            model_name: "vision-1".into(),
        }
    }

    #[test]
    fn finish_with_no_steps_skips_trace_and_report() {
        let timeline = Timeline::new();
        let dir = tempfile::tempdir().unwrap();
        let toggles = SaveToggles {
            save_trace: true,
            save_thoughts: true,
            save_screenshots: true,
        };
        let bundle = timeline.finish(dir.path(), &meta(), toggles).unwrap();
        assert!(bundle.trace_json.is_none());
        assert!(bundle.report_json.is_none());
        // thoughts artifacts still emitted since the toggle alone gates them
        assert!(bundle.thoughts_json.is_some());
    }

    #[test]
    fn finish_with_recorded_data_emits_every_family() {
        let timeline = Timeline::new();
        timeline.record_thought(ThoughtRecord {
            timestamp: chrono::Utc::now(),
            message: "looking around".into(),
            url: "https://shop.test".into(),
        });
        timeline.record_trace_step(TraceStep {
            id: 0,
            timestamp: chrono::Utc::now(),
            url: "https://shop.test".into(),
            kind: TraceStepKind::Goto,
            selector: None,
            coordinates: None,
            value: None,
            wait_ms: None,
            note: None,
        });
        timeline.record_step(StepRecord {
            id: 0,
            timestamp: chrono::Utc::now(),
            action: ActionKind::Click,
            target_id: Some("0".into()),
            value: None,
            thought: "clicking shop".into(),
            url: "https://shop.test".into(),
        });

        let dir = tempfile::tempdir().unwrap();
        let toggles = SaveToggles {
            save_trace: true,
            save_thoughts: true,
            save_screenshots: true,
        };
        let bundle = timeline.finish(dir.path(), &meta(), toggles).unwrap();
        assert!(bundle.trace_json.is_some());
        assert!(bundle.replay_script.is_some());
        assert!(bundle.thoughts_json.is_some());
        assert!(bundle.thoughts_txt.is_some());
        assert!(bundle.report_json.is_some());
        assert!(bundle.steps_csv.is_some());
        assert!(bundle.report_pdf.is_some());
    }
}

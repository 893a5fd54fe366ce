//! Report artifact assembly: `report.json`,
//! `steps.csv` and `report.pdf`, emitted whenever at least one step was
//! recorded, regardless of the save-toggles.

use std::collections::BTreeMap;
use std::io::BufWriter;
use std::path::Path;

use chrono::{DateTime, Utc};
use printpdf::{BuiltinFont, Image, ImageTransform, Mm, PdfDocument};
use serde::{Deserialize, Serialize};

use wayfarer_core_types::{ActionKind, ErrorRecord, ScreenshotRecord, StepRecord, ThoughtRecord};

use crate::errors::{TlError, TlResult};
use crate::model::RunMetadata;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionCount {
    pub action: String,
    pub count: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportMetrics {
    pub step_count: usize,
    pub thought_count: usize,
    pub error_count: usize,
    pub screenshot_count: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportDocument {
    #[serde(rename = "runId")]
    pub run_id: String,
    #[serde(rename = "startUrl")]
    pub start_url: String,
    #[serde(rename = "finalUrl")]
    pub final_url: String,
    pub objective: String,
    pub persona: String,
    #[serde(rename = "modelName")]
    pub model_name: String,
    #[serde(rename = "generatedAt")]
    pub generated_at: DateTime<Utc>,
    pub metrics: ReportMetrics,
    #[serde(rename = "actionBreakdown")]
    pub action_breakdown: Vec<ActionCount>,
    pub thoughts: Vec<ThoughtRecord>,
    pub steps: Vec<StepRecord>,
    pub errors: Vec<ErrorRecord>,
    pub screenshots: Vec<ScreenshotRecord>,
}

fn action_label(action: ActionKind) -> &'static str {
    action.as_str()
}

pub fn action_breakdown(steps: &[StepRecord]) -> Vec<ActionCount> {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for step in steps {
        *counts.entry(action_label(step.action)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(action, count)| ActionCount {
            action: action.to_string(),
            count,
        })
        .collect()
}

impl ReportDocument {
    pub fn build(
        meta: &RunMetadata,
        thoughts: Vec<ThoughtRecord>,
        steps: Vec<StepRecord>,
        errors: Vec<ErrorRecord>,
        screenshots: Vec<ScreenshotRecord>,
    ) -> Self {
        let metrics = ReportMetrics {
            step_count: steps.len(),
            thought_count: thoughts.len(),
            error_count: errors.len(),
            screenshot_count: screenshots.len(),
        };
        let action_breakdown = action_breakdown(&steps);
        Self {
            run_id: meta.run_id.clone(),
            start_url: meta.start_url.clone(),
            final_url: meta.final_url.clone(),
            objective: meta.objective.clone(),
            persona: meta.persona.clone(),
            model_name: meta.model_name.clone(),
            generated_at: Utc::now(),
            metrics,
            action_breakdown,
            thoughts,
            steps,
            errors,
            screenshots,
        }
    }
}

/// Write `report/steps.csv`: header `id,timestamp,action,targetId,value,
/// thought,url`, RFC4180 quoting courtesy of the `csv` crate's writer.
pub fn write_steps_csv(path: &Path, steps: &[StepRecord]) -> TlResult<()> {
    let mut writer = csv::WriterBuilder::new().from_path(path)?;
    writer.write_record(["id", "timestamp", "action", "targetId", "value", "thought", "url"])?;
    for step in steps {
        writer.write_record([
            step.id.to_string(),
            step.timestamp.to_rfc3339(),
            action_label(step.action).to_string(),
            step.target_id.clone().unwrap_or_default(),
            step.value.clone().unwrap_or_default(),
            step.thought.clone(),
            step.url.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Render `report/report.pdf`: metadata, metrics, action breakdown,
/// last 20 thoughts, and an embedded preview of the first 12 screenshots,
/// each scaled to fit the page width. `artifact_dir` resolves each
/// screenshot's run-relative path back to a file on disk; a screenshot
/// that fails to decode is skipped and noted by file name only.
pub fn write_report_pdf(path: &Path, doc: &ReportDocument, artifact_dir: &Path) -> TlResult<()> {
    let (pdf, page1, layer1) =
        PdfDocument::new(format!("Wayfarer run {}", doc.run_id), Mm(210.0), Mm(297.0), "content");
    let heading_font = pdf
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| TlError::Pdf(e.to_string()))?;
    let body_font = pdf
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| TlError::Pdf(e.to_string()))?;
    let layer = pdf.get_page(page1).get_layer(layer1);

    let mut y = 280.0_f64;
    let line = |layer: &printpdf::PdfLayerReference, text: &str, y: f64, size: f64, font: &printpdf::IndirectFontRef| {
        layer.use_text(text, size, Mm(15.0), Mm(y), font);
    };

    line(&layer, "Wayfarer run report", y, 18.0, &heading_font);
    y -= 10.0;
    line(&layer, &format!("Run: {}", doc.run_id), y, 10.0, &body_font);
    y -= 6.0;
    line(&layer, &format!("Persona: {}", doc.persona), y, 10.0, &body_font);
    y -= 6.0;
    line(&layer, &format!("Objective: {}", doc.objective), y, 10.0, &body_font);
    y -= 6.0;
    line(&layer, &format!("Model: {}", doc.model_name), y, 10.0, &body_font);
    y -= 6.0;
    line(
        &layer,
        &format!("{} -> {}", doc.start_url, doc.final_url),
        y,
        10.0,
        &body_font,
    );

    y -= 12.0;
    line(&layer, "Metrics", y, 13.0, &heading_font);
    y -= 7.0;
    line(
        &layer,
        &format!(
            "steps={} thoughts={} errors={} screenshots={}",
            doc.metrics.step_count, doc.metrics.thought_count, doc.metrics.error_count, doc.metrics.screenshot_count
        ),
        y,
        10.0,
        &body_font,
    );

    y -= 12.0;
    line(&layer, "Action breakdown", y, 13.0, &heading_font);
    for entry in &doc.action_breakdown {
        y -= 6.0;
        if y < 15.0 {
            break;
        }
        line(&layer, &format!("{}: {}", entry.action, entry.count), y, 10.0, &body_font);
    }

    y -= 12.0;
    line(&layer, "Last 20 thoughts", y, 13.0, &heading_font);
    for thought in doc.thoughts.iter().rev().take(20).collect::<Vec<_>>().into_iter().rev() {
        y -= 6.0;
        if y < 15.0 {
            break;
        }
        let truncated: String = thought.message.chars().take(110).collect();
        line(&layer, &format!("[{}] {}", thought.timestamp.to_rfc3339(), truncated), y, 9.0, &body_font);
    }

    y -= 12.0;
    line(&layer, "Screenshots (first 12)", y, 13.0, &heading_font);
    const PREVIEW_HEIGHT_MM: f64 = 45.0;
    for shot in doc.screenshots.iter().take(12) {
        if y < 20.0 + PREVIEW_HEIGHT_MM {
            break;
        }
        y -= 6.0;
        line(&layer, &format!("{} — {}", shot.timestamp.to_rfc3339(), shot.path), y, 9.0, &body_font);
        y -= PREVIEW_HEIGHT_MM;

        match embed_screenshot(&layer, artifact_dir, &shot.path, y) {
            Ok(()) => {}
            Err(err) => {
                y += PREVIEW_HEIGHT_MM - 6.0;
                line(
                    &layer,
                    &format!("  (preview unavailable: {err})"),
                    y,
                    9.0,
                    &body_font,
                );
                y -= PREVIEW_HEIGHT_MM - 6.0;
            }
        }
        y -= 4.0;
    }

    pdf.save(&mut BufWriter::new(std::fs::File::create(path)?))
        .map_err(|e| TlError::Pdf(e.to_string()))?;
    Ok(())
}

/// Decode `relative_path` (relative to `artifact_dir`) and place it on
/// `layer` at `y`, scaled to a fixed preview width.
fn embed_screenshot(
    layer: &printpdf::PdfLayerReference,
    artifact_dir: &Path,
    relative_path: &str,
    y: f64,
) -> Result<(), String> {
    const PREVIEW_WIDTH_MM: f64 = 80.0;

    let full_path = artifact_dir.join(relative_path);
    let bytes = std::fs::read(&full_path).map_err(|e| format!("{e}"))?;
    let dynamic_image = image::load_from_memory(&bytes).map_err(|e| format!("{e}"))?;
    let (px_width, _) = {
        use image::GenericImageView;
        dynamic_image.dimensions()
    };
    let image = Image::from_dynamic_image(&dynamic_image);

    // printpdf scales relative to 1px = 1/300in at the image's native DPI;
    // back-solve the scale factor that lands the image at the fixed
    // preview width regardless of the screenshot's native resolution.
    let dpi = 300.0;
    let native_width_mm = px_width as f64 * 25.4 / dpi;
    let scale = if native_width_mm > 0.0 {
        PREVIEW_WIDTH_MM / native_width_mm
    } else {
        1.0
    };

    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(15.0)),
            translate_y: Some(Mm(y)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
    Ok(())
}

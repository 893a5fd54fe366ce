//! Artifact layout and save toggles.

use std::path::PathBuf;

/// Which artifact families to emit on Run stop.
#[derive(Clone, Copy, Debug)]
pub struct SaveToggles {
    pub save_trace: bool,
    pub save_thoughts: bool,
    pub save_screenshots: bool,
}

impl From<&wayfarer_core_types::RunOptions> for SaveToggles {
    fn from(opts: &wayfarer_core_types::RunOptions) -> Self {
        Self {
            save_trace: opts.save_trace,
            save_thoughts: opts.save_thoughts,
            save_screenshots: opts.save_screenshots,
        }
    }
}

/// Header fields for the emitted trace JSON.
#[derive(Clone, Debug)]
pub struct RunMetadata {
    pub run_id: String,
    pub start_url: String,
    pub final_url: String,
    pub objective: String,
    pub persona: String,
    pub model_name: String,
}

/// Filesystem paths an artifact was written to, relative to the artifact
/// root (so the first component is always the run id), paired with the
/// `/downloads/<relative>` URL an operator UI would fetch it from.
#[derive(Clone, Debug)]
pub struct ArtifactRef {
    pub relative_path: PathBuf,
    pub download_url: String,
}

impl ArtifactRef {
    pub fn new(relative_path: impl Into<PathBuf>) -> Self {
        let relative_path = relative_path.into();
        let download_url = format!("/downloads/{}", relative_path.to_string_lossy());
        Self {
            relative_path,
            download_url,
        }
    }
}

/// Everything produced by one call to [`crate::api::Timeline::finish`].
#[derive(Clone, Debug, Default)]
pub struct ArtifactBundle {
    pub trace_json: Option<ArtifactRef>,
    pub replay_script: Option<ArtifactRef>,
    pub thoughts_json: Option<ArtifactRef>,
    pub thoughts_txt: Option<ArtifactRef>,
    pub report_json: Option<ArtifactRef>,
    pub steps_csv: Option<ArtifactRef>,
    pub report_pdf: Option<ArtifactRef>,
}

//! Trace artifact assembly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wayfarer_core_types::TraceStep;

use crate::model::RunMetadata;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraceDocument {
    pub version: u32,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
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
    pub steps: Vec<TraceStep>,
}

/// Current trace schema version. Bump when the shape of [`TraceDocument`]
/// or [`TraceStep`] changes in a way that breaks an existing replay
/// script.
pub const TRACE_VERSION: u32 = 1;

impl TraceDocument {
    pub fn build(meta: &RunMetadata, steps: Vec<TraceStep>) -> Self {
        Self {
            version: TRACE_VERSION,
            created_at: Utc::now(),
            run_id: meta.run_id.clone(),
            start_url: meta.start_url.clone(),
            final_url: meta.final_url.clone(),
            objective: meta.objective.clone(),
            persona: meta.persona.clone(),
            model_name: meta.model_name.clone(),
            steps,
        }
    }
}

//! `GET /models` support: a fallback catalogue is returned whenever the
//! upstream model listing isn't reachable. The real upstream listing
//! call is an external-provider concern and is not implemented here.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
}

/// Source label carried alongside the `/models` response body
/// (`{models: [...], source}`).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ModelCatalogueSource {
    Fallback,
}

impl ModelCatalogueSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelCatalogueSource::Fallback => "fallback",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelCatalogue {
    pub models: Vec<ModelInfo>,
    pub source: String,
}

/// Known-good vision model ids the upstream catalogue would otherwise
/// list, used whenever it can't be reached.
pub const FALLBACK_MODELS: &[(&str, &str)] = &[
    ("vision-1", "Vision 1"),
    ("vision-1-mini", "Vision 1 Mini"),
    ("vision-1-pro", "Vision 1 Pro"),
];

/// There is no upstream model catalogue wired up, so this always
/// answers with the fallback list, matching the documented
/// degraded-mode contract.
pub fn model_catalogue() -> ModelCatalogue {
    ModelCatalogue {
        models: FALLBACK_MODELS
            .iter()
            .map(|(id, name)| ModelInfo {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect(),
        source: ModelCatalogueSource::Fallback.as_str().to_string(),
    }
}

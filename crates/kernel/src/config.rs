//! Run Controller configuration: a plain `serde`-derived struct loaded
//! from an optional YAML file and overlaid with environment variables.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::KernelError;
use crate::models::ModelInfo;

/// Environment variable carrying the upstream LLM/TTS API key, kept out
/// of persisted artifacts.
pub const API_KEY_ENV: &str = "WAYFARER_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory artifacts are written under; each Run gets
    /// `<artifact_root>/<runId>/`.
    pub artifact_root: PathBuf,

    pub default_headless: bool,

    #[serde(default = "default_models")]
    pub model_catalogue: Vec<ModelInfo>,

    #[serde(default = "default_http_addr")]
    pub http_addr: String,
}

fn default_models() -> Vec<ModelInfo> {
    crate::models::FALLBACK_MODELS
        .iter()
        .map(|(id, name)| ModelInfo {
            id: id.to_string(),
            name: name.to_string(),
        })
        .collect()
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            artifact_root: PathBuf::from("./artifacts"),
            default_headless: true,
            model_catalogue: default_models(),
            http_addr: default_http_addr(),
        }
    }
}

impl Config {
    /// Load from `path` if given, falling back to defaults; then apply
    /// the `WAYFARER_ARTIFACT_ROOT`/`WAYFARER_HTTP_ADDR` environment
    /// overrides a deployment might set without touching the YAML file.
    pub fn load(path: Option<&Path>) -> Result<Self, KernelError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|err| KernelError::Config(format!("{}: {err}", path.display())))?;
                serde_yaml::from_str(&text)
                    .map_err(|err| KernelError::Config(format!("{}: {err}", path.display())))?
            }
            None => Config::default(),
        };

        if let Ok(root) = env::var("WAYFARER_ARTIFACT_ROOT") {
            config.artifact_root = PathBuf::from(root);
        }
        if let Ok(addr) = env::var("WAYFARER_HTTP_ADDR") {
            config.http_addr = addr;
        }

        Ok(config)
    }

    pub fn api_key() -> Option<String> {
        env::var(API_KEY_ENV).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_fallback_models() {
        let config = Config::default();
        assert!(!config.model_catalogue.is_empty());
        assert_eq!(config.artifact_root, PathBuf::from("./artifacts"));
    }

    #[test]
    fn env_override_wins_over_default() {
        env::set_var("WAYFARER_ARTIFACT_ROOT", "/tmp/wayfarer-test-artifacts");
        let config = Config::load(None).unwrap();
        assert_eq!(config.artifact_root, PathBuf::from("/tmp/wayfarer-test-artifacts"));
        env::remove_var("WAYFARER_ARTIFACT_ROOT");
    }
}

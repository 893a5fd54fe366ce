#![allow(dead_code)]
//! Wires every workspace crate into a single `RunController`, owning the per-run artifact directory layout and exposing the
//! library surface the binary's HTTP server is built on.

pub mod artifacts;
pub mod config;
pub mod controller;
pub mod drivers;
pub mod errors;
pub mod llm;
pub mod models;
pub mod tts;

pub use config::Config;
pub use controller::{HealthSnapshot, RunController, RunHandle, StartRequest};
pub use errors::KernelError;
pub use llm::DynLlmProvider;
pub use models::{model_catalogue, ModelCatalogue, ModelCatalogueSource, ModelInfo};
pub use tts::{NullTtsSynthesizer, SynthesizedAudio, TtsError, TtsSynthesizer};

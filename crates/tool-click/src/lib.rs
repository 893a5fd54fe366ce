#![allow(dead_code)]
//! Click action executor: human-like cursor motion,
//! ripple dispatch, and stable-selector derivation for trace steps.

pub mod errors;
pub mod model;
pub mod ports;
pub mod runner;

pub use errors::ClickError;
pub use model::ClickOutcome;
pub use ports::{ClickPageDriver, MarkGeometry};
pub use runner::click;

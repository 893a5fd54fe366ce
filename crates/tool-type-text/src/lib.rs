#![allow(dead_code)]
//! Type action executor: focus-click, fillable-target
//! fallback, and per-character typed input.

pub mod errors;
pub mod model;
pub mod ports;
pub mod runner;

pub use errors::TypeError;
pub use model::{FillableField, TypeOutcome, TypeTarget};
pub use ports::TypePageDriver;
pub use runner::type_text;

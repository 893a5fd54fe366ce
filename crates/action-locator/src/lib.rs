#![allow(dead_code)]
//! Stable selector derivation for trace steps.
//!
//! This crate is pure string/tree logic: given the attributes of an
//! element that was just acted on, it derives the selector the replay
//! script should record, without touching the page itself.

pub mod element;
pub mod selector;

pub use element::{AncestorDescriptor, ElementDescriptor};
pub use selector::{derive_selector, MAX_CHAIN_DEPTH};

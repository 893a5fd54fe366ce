#![allow(dead_code)]
//! The Run Controller's cooperative loop driver.
//!
//! This crate owns turn sequencing and cancellation; it knows nothing
//! about browsers, LLMs, or artifacts. The kernel crate implements
//! [`LoopBody`] against the real perception/decision/action subsystems and
//! hands it to [`run`].

pub mod cancel;
pub mod driver;
pub mod error;
pub mod metrics;
pub mod model;

pub use cancel::{CancelToken, Stopped};
pub use driver::{run, LoopBody};
pub use error::SchedulerError;
pub use model::{
    StopReason, SuspensionPoint, TurnOutcome, ERROR_BACKOFF, HYDRATION_WAIT, NAVIGATION_CEILING,
    SETTLE_WAIT,
};

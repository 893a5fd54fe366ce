//! Library surface backing the `wayfarer` binary: the CLI argument parser
//! and dispatch, and the HTTP/SSE control surface built on top of
//! [`wayfarer_kernel::RunController`].

pub mod cli;
pub mod metrics;
pub mod server;

pub use wayfarer_kernel::{Config, DynLlmProvider, KernelError, RunController, RunHandle, StartRequest};

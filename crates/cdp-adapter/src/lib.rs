#![allow(dead_code)]
//! Chromium DevTools Protocol adapter: the [`BrowserDriver`] boundary
//! between the agent loop and a real page.

pub mod config;
pub mod driver;
pub mod error;
pub mod ids;
pub mod metrics;
pub mod mock;

#[cfg(feature = "chromiumoxide")]
pub mod chromium;

pub use config::CdpConfig;
pub use driver::{BrowserDriver, DriverPoint, DriverRect, MouseButton, ViewportSize};
pub use error::AdapterError;
pub use ids::{BrowserId, PageId, SessionId};
pub use mock::MockDriver;

#[cfg(feature = "chromiumoxide")]
pub use chromium::ChromiumDriver;

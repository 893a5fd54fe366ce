//! Cookie Dismisser: layered escalation for dismissing
//! consent/cookie banners.
//!
//! - Strict CSS-selector list tried first.
//! - Container + accept-text-pattern scan over the main frame.
//! - The same scan repeated inside every non-main iframe.
//! - Vision-coordinate fallback: score on-screen accept-phrase candidates
//!   and click the best one's centre.
//!
//! Each attempt is verified by a short re-scan before the layer is
//! considered to have succeeded.

pub mod conditions;
pub mod errors;
pub mod evidence;
pub mod metrics;
pub mod types;
pub mod validator;

pub use conditions::*;
pub use errors::*;
pub use evidence::*;
pub use types::*;
pub use validator::*;

//! Human-like cursor motion, click ripple timing, typing cadence and
//! scroll deltas.
//!
//! Everything here is pure geometry/timing: no DOM or CDP dependency. The
//! action executors in `tool-click` and `tool-type-text` consume these
//! plans and replay them against a `BrowserDriver`.

pub mod errors;
mod locator;
mod primitives;
pub mod types;
mod waiting;

pub use errors::*;
pub use locator::*;
pub use primitives::*;
pub use types::*;
pub use waiting::*;

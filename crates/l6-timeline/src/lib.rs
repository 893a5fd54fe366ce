pub mod api;
pub mod errors;
pub mod metrics;
pub mod model;
pub mod replay;
pub mod report;
pub mod trace;

pub use api::Timeline;
pub use errors::{TlError, TlResult};
pub use model::{ArtifactBundle, ArtifactRef, RunMetadata, SaveToggles};
pub use replay::render_replay_script;
pub use report::{write_report_pdf, write_steps_csv, ReportDocument};
pub use trace::{TraceDocument, TRACE_VERSION};

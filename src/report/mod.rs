//! Report schema and session-owned collection state.

pub mod schema;
pub mod session;

pub use schema::{Report, ReportMeta, ReportProducer, REPORT_VERSION};
pub use session::{DebugExport, SessionController, SessionState};

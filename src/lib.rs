//! Hostprint - Privacy-bounded host capability probing.
//!
//! This library interrogates the host runtime's exposed capabilities with
//! independent probes and merges the results into one structured,
//! versioned report, with strong privacy guarantees.
//!
//! # Privacy Guarantees
//!
//! - **No raw artifacts**: pixel buffers, geometry traces and rendered
//!   text are replaced by fixed-length content digests before they can
//!   reach a report
//! - **Absence is first-class**: a capability the host does not expose is
//!   reported as `unsupported`, never silently omitted and never an error
//! - **No persistence**: collected signal data lives only for the session;
//!   only anonymous counters are written to disk
//! - **Transparency**: probe activity is counted and auditable
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Hostprint                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌───────────┐   ┌────────────┐               │
//! │  │  Probes  │──▶│  Timeout  │──▶│  Session   │──▶ Report     │
//! │  │  (×N)    │   │  Guard    │   │ Controller │    snapshot   │
//! │  └──────────┘   └───────────┘   └────────────┘               │
//! │       │                               │                      │
//! │       ▼                               ▼                      │
//! │  ┌──────────┐                  ┌────────────┐                │
//! │  │ Redactor │                  │ Collection │                │
//! │  │ (digest) │                  │   Ledger   │                │
//! │  └──────────┘                  └────────────┘                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use hostprint::config::Config;
//! use hostprint::report::SessionController;
//!
//! # async fn run() {
//! let mut controller = SessionController::new(Config::default());
//! controller.collect_eager().await;
//!
//! // Total and safe at any time, even before any probe has resolved.
//! let report = controller.assemble();
//! println!("{}", serde_json::to_string_pretty(&report).unwrap());
//! # }
//! ```

pub mod config;
pub mod guard;
pub mod ledger;
pub mod probe;
pub mod redact;
pub mod report;
pub mod rtc;
pub mod signal;

#[cfg(feature = "transport")]
pub mod transport;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError, EagerConfig};
pub use guard::{guard, DEFAULT_GATHER_CAP, DEFAULT_PROBE_DEADLINE};
pub use ledger::{CollectionLedger, LedgerStats, SharedLedger};
pub use redact::{redact, redact_artifact, redact_serializable, Digest, RedactError};
pub use report::{DebugExport, Report, SessionController, REPORT_VERSION};
pub use rtc::{CandidateRecord, CandidateSet, ExposureVerdict, TransportSummary};
pub use signal::SignalResult;

// Transport re-exports (when enabled)
#[cfg(feature = "transport")]
pub use transport::{
    BlockingTransportClient, CompareOutcome, SubmitReceipt, TransportClient, TransportConfig,
    TransportError,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Collection disclosure that can be displayed to users.
pub const COLLECTION_DISCLOSURE: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║              HOSTPRINT - COLLECTION DISCLOSURE                   ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  This tool reports what a collector can learn about this host.   ║
║                                                                  ║
║  ✓ WHAT THE REPORT CONTAINS:                                     ║
║    • Capability metadata (locale, display, storage, network,     ║
║      graphics, media, sensors, battery, authenticators)          ║
║    • Transport candidate addresses, bucketed public/private      ║
║    • Fixed-length digests of rendering artifacts                 ║
║                                                                  ║
║  ✗ WHAT NEVER LEAVES THE COLLECTION BOUNDARY:                    ║
║    • Raw pixel buffers and geometry traces (digest only)         ║
║    • Rendered text output (digest only)                          ║
║    • Any file contents or personal data                          ║
║                                                                  ║
║  Nothing is submitted anywhere unless you run `hostprint         ║
║  submit` with an endpoint you choose.                            ║
║                                                                  ║
║  You can view collection statistics anytime with:                ║
║    hostprint status                                              ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;

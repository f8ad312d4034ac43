//! Transport-candidate gathering and classification.
//!
//! Candidate description lines are parsed into typed records, their
//! addresses bucketed into public/private/discarded sets, and the whole
//! gathering pass summarized for the report. Parsing is grammar-based with
//! a deliberate best-effort tier: the `typ` token is extracted even from
//! lines whose positional fields do not parse, because type information is
//! diagnostically useful on its own.

pub mod candidate;
pub mod classify;
pub mod gather;

pub use candidate::{AddressFamily, AddressScope, CandidateKind, CandidateRecord};
pub use classify::{CandidateSet, ExposureVerdict, TransportSummary};
pub use gather::{gather_candidates, CandidateSource, NativeCandidateSource, ScriptedSource};

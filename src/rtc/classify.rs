//! Accumulation of candidate records into deduplicated address buckets.

use crate::rtc::candidate::{extract_kind, AddressScope, CandidateKind, CandidateRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Mutable accumulator for one gathering pass.
#[derive(Debug, Default, Clone)]
pub struct CandidateSet {
    records: Vec<CandidateRecord>,
    public: BTreeSet<String>,
    private: BTreeSet<String>,
    kinds: BTreeSet<&'static str>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one candidate line and fold it into the set.
    ///
    /// The raw line always enters history. Discarded addresses (and lines
    /// with no literal address) never reach the public/private buckets.
    pub fn push(&mut self, line: &str) {
        let record = CandidateRecord::from_line(line);

        if let Some(ref addr) = record.address {
            match record.scope {
                AddressScope::Public => {
                    self.public.insert(addr.clone());
                }
                AddressScope::Private => {
                    self.private.insert(addr.clone());
                }
                AddressScope::Discarded => {}
            }
        }

        // The kind bucket counts lines that carried a typ token, including
        // unrecognized kind words; lines without one contribute nothing.
        if let Some(kind) = extract_kind(line) {
            self.kinds.insert(kind.as_str());
        }

        self.records.push(record);
    }

    pub fn records(&self) -> &[CandidateRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Freeze the accumulator into the report-facing summary.
    pub fn summarize(&self) -> TransportSummary {
        TransportSummary {
            candidates: self.records.iter().map(|r| r.raw_line.clone()).collect(),
            public: self.public.iter().cloned().collect(),
            private: self.private.iter().cloned().collect(),
            kinds: self.kinds.iter().map(|k| k.to_string()).collect(),
            verdict: ExposureVerdict::from_records(&self.records),
        }
    }
}

/// What the gathered candidates reveal about the host's network exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureVerdict {
    /// A host candidate surfaced a local interface address.
    LocalNetworkVisible,
    /// A reflexive candidate surfaced the public address.
    PublicViaReflexive,
    /// Only relayed candidates were observed.
    RelayOnly,
    /// Gathering produced no classifiable candidates.
    NoneObserved,
}

impl ExposureVerdict {
    /// First observed kind wins, in arrival order.
    pub fn from_records(records: &[CandidateRecord]) -> Self {
        for record in records {
            match record.kind {
                CandidateKind::Host => return ExposureVerdict::LocalNetworkVisible,
                CandidateKind::Srflx => return ExposureVerdict::PublicViaReflexive,
                CandidateKind::Relay => return ExposureVerdict::RelayOnly,
                CandidateKind::Prflx | CandidateKind::Unknown => {}
            }
        }
        ExposureVerdict::NoneObserved
    }
}

impl std::fmt::Display for ExposureVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            ExposureVerdict::LocalNetworkVisible => "local network visible (host candidate)",
            ExposureVerdict::PublicViaReflexive => "public address visible (reflexive candidate)",
            ExposureVerdict::RelayOnly => "relayed only (address hidden)",
            ExposureVerdict::NoneObserved => "no candidates observed",
        };
        f.write_str(msg)
    }
}

/// Report-facing summary of one gathering pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportSummary {
    /// Raw candidate-line history, in arrival order.
    pub candidates: Vec<String>,
    /// Deduplicated public addresses.
    pub public: Vec<String>,
    /// Deduplicated private addresses.
    pub private: Vec<String>,
    /// Deduplicated candidate kinds observed.
    pub kinds: Vec<String>,
    pub verdict: ExposureVerdict,
}

//! Anonymous collection ledger.
//!
//! Tracks and exposes counters about probe activity without storing any
//! collected signal data. The ledger is the only collection state that
//! survives the session, and it holds counts only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for the current session.
#[derive(Debug)]
pub struct CollectionLedger {
    /// Probes invoked
    probes_run: AtomicU64,
    /// Probes that produced a collected value
    probes_collected: AtomicU64,
    /// Probes that reported an absent capability
    probes_unsupported: AtomicU64,
    /// Probes that failed or timed out
    probes_failed: AtomicU64,
    /// Raw artifacts replaced by digests
    redactions: AtomicU64,
    /// Report snapshots assembled
    reports_assembled: AtomicU64,
    /// Reports submitted to the remote collaborator
    submissions: AtomicU64,
    /// Session start time
    session_start: DateTime<Utc>,
    /// Path for persisting counters
    persist_path: Option<PathBuf>,
}

impl CollectionLedger {
    pub fn new() -> Self {
        Self {
            probes_run: AtomicU64::new(0),
            probes_collected: AtomicU64::new(0),
            probes_unsupported: AtomicU64::new(0),
            probes_failed: AtomicU64::new(0),
            redactions: AtomicU64::new(0),
            reports_assembled: AtomicU64::new(0),
            submissions: AtomicU64::new(0),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create a ledger with counter persistence.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut ledger = Self::new();
        ledger.persist_path = Some(path);

        if let Err(e) = ledger.load() {
            eprintln!("Note: Could not load previous ledger counters: {e}");
        }

        ledger
    }

    /// Record a probe outcome.
    pub fn record_probe<T>(&self, result: &crate::signal::SignalResult<T>) {
        self.probes_run.fetch_add(1, Ordering::Relaxed);
        match result {
            crate::signal::SignalResult::Collected { .. } => {
                self.probes_collected.fetch_add(1, Ordering::Relaxed);
            }
            crate::signal::SignalResult::Unsupported { .. } => {
                self.probes_unsupported.fetch_add(1, Ordering::Relaxed);
            }
            crate::signal::SignalResult::Error { .. } => {
                self.probes_failed.fetch_add(1, Ordering::Relaxed);
            }
            crate::signal::SignalResult::NotCollected => {}
        }
    }

    /// Record raw artifacts replaced by digests.
    pub fn record_redactions(&self, count: u64) {
        self.redactions.fetch_add(count, Ordering::Relaxed);
    }

    /// Record an assembled report snapshot.
    pub fn record_report_assembled(&self) {
        self.reports_assembled.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a submission to the remote collaborator.
    pub fn record_submission(&self) {
        self.submissions.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current counters.
    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            probes_run: self.probes_run.load(Ordering::Relaxed),
            probes_collected: self.probes_collected.load(Ordering::Relaxed),
            probes_unsupported: self.probes_unsupported.load(Ordering::Relaxed),
            probes_failed: self.probes_failed.load(Ordering::Relaxed),
            redactions: self.redactions.load(Ordering::Relaxed),
            reports_assembled: self.reports_assembled.load(Ordering::Relaxed),
            submissions: self.submissions.load(Ordering::Relaxed),
            session_start: self.session_start,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Session Statistics:\n\
             - Probes run: {}\n\
             - Collected: {}\n\
             - Unsupported: {}\n\
             - Failed/timed out: {}\n\
             - Artifacts redacted: {}\n\
             - Reports assembled: {}\n\
             - Reports submitted: {}\n\
             \n\
             Privacy Guarantee:\n\
             - Raw pixel/geometry artifacts never leave this process\n\
             - Only fixed-length content digests reach the report",
            stats.probes_run,
            stats.probes_collected,
            stats.probes_unsupported,
            stats.probes_failed,
            stats.redactions,
            stats.reports_assembled,
            stats.submissions
        )
    }

    /// Save counters to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.stats();
            let persisted = PersistedLedger {
                probes_run: stats.probes_run,
                probes_collected: stats.probes_collected,
                probes_unsupported: stats.probes_unsupported,
                probes_failed: stats.probes_failed,
                redactions: stats.redactions,
                reports_assembled: stats.reports_assembled,
                submissions: stats.submissions,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;
            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load counters from disk.
    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedLedger =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.probes_run.store(persisted.probes_run, Ordering::Relaxed);
                self.probes_collected
                    .store(persisted.probes_collected, Ordering::Relaxed);
                self.probes_unsupported
                    .store(persisted.probes_unsupported, Ordering::Relaxed);
                self.probes_failed
                    .store(persisted.probes_failed, Ordering::Relaxed);
                self.redactions.store(persisted.redactions, Ordering::Relaxed);
                self.reports_assembled
                    .store(persisted.reports_assembled, Ordering::Relaxed);
                self.submissions.store(persisted.submissions, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.probes_run.store(0, Ordering::Relaxed);
        self.probes_collected.store(0, Ordering::Relaxed);
        self.probes_unsupported.store(0, Ordering::Relaxed);
        self.probes_failed.store(0, Ordering::Relaxed);
        self.redactions.store(0, Ordering::Relaxed);
        self.reports_assembled.store(0, Ordering::Relaxed);
        self.submissions.store(0, Ordering::Relaxed);
    }
}

impl Default for CollectionLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of ledger counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerStats {
    pub probes_run: u64,
    pub probes_collected: u64,
    pub probes_unsupported: u64,
    pub probes_failed: u64,
    pub redactions: u64,
    pub reports_assembled: u64,
    pub submissions: u64,
    pub session_start: DateTime<Utc>,
}

/// Counter format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedLedger {
    probes_run: u64,
    probes_collected: u64,
    probes_unsupported: u64,
    probes_failed: u64,
    redactions: u64,
    reports_assembled: u64,
    submissions: u64,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared ledger.
pub type SharedLedger = Arc<CollectionLedger>;

/// Create a new shared ledger.
pub fn create_shared_ledger() -> SharedLedger {
    Arc::new(CollectionLedger::new())
}

/// Create a new shared ledger with persistence.
pub fn create_shared_ledger_with_persistence(path: PathBuf) -> SharedLedger {
    Arc::new(CollectionLedger::with_persistence(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::SignalResult;

    #[test]
    fn test_ledger_counts_outcomes() {
        let ledger = CollectionLedger::new();

        ledger.record_probe(&SignalResult::collected(1_u32));
        ledger.record_probe(&SignalResult::<u32>::unsupported());
        ledger.record_probe(&SignalResult::<u32>::error("x"));

        let stats = ledger.stats();
        assert_eq!(stats.probes_run, 3);
        assert_eq!(stats.probes_collected, 1);
        assert_eq!(stats.probes_unsupported, 1);
        assert_eq!(stats.probes_failed, 1);
    }

    #[test]
    fn test_ledger_reset() {
        let ledger = CollectionLedger::new();

        ledger.record_redactions(4);
        ledger.record_report_assembled();
        ledger.reset();

        let stats = ledger.stats();
        assert_eq!(stats.redactions, 0);
        assert_eq!(stats.reports_assembled, 0);
    }

    #[test]
    fn test_summary_format() {
        let ledger = CollectionLedger::new();
        let summary = ledger.summary();

        assert!(summary.contains("Probes run"));
        assert!(summary.contains("Artifacts redacted"));
        assert!(summary.contains("Privacy Guarantee"));
    }
}

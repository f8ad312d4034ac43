//! Candidate gathering with a wall-clock cap.
//!
//! A `CandidateSource` streams candidate lines over a bounded channel from
//! a dedicated thread; completion is signalled by dropping the sender.
//! The gather loop drains the channel until completion or until the cap
//! expires, whichever comes first. The cap exists because some hosts never
//! reach completion when no usable network path exists; on expiry the loop
//! abandons waiting rather than interrupting the source.

use crate::guard::DEFAULT_GATHER_CAP;
use crate::rtc::classify::{CandidateSet, TransportSummary};
use crate::signal::SignalResult;
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use sha2::{Digest as _, Sha256};
use std::net::UdpSocket;
use std::time::{Duration, Instant};

/// A producer of candidate description lines.
///
/// `gather` runs on its own thread. Every discovered candidate is sent to
/// `sink`; returning (and thereby dropping `sink`) marks gathering
/// complete. Sends may fail once the gather loop has given up waiting;
/// sources should ignore send errors.
pub trait CandidateSource: Send + 'static {
    fn gather(self: Box<Self>, sink: Sender<String>);
}

/// Native source: synthesizes host candidates from the default-route
/// addresses of this machine.
///
/// Address discovery uses connected UDP sockets against documentation
/// addresses; no packets are sent. Without an external reflexive round
/// trip only host candidates can be produced natively.
pub struct NativeCandidateSource;

impl NativeCandidateSource {
    fn discover(&self) -> Vec<(String, u16)> {
        let mut found = Vec::new();

        if let Ok(socket) = UdpSocket::bind(("0.0.0.0", 0)) {
            if socket.connect(("203.0.113.1", 9)).is_ok() {
                if let Ok(local) = socket.local_addr() {
                    if !local.ip().is_unspecified() {
                        found.push((local.ip().to_string(), local.port()));
                    }
                }
            }
        }

        if let Ok(socket) = UdpSocket::bind(("::", 0)) {
            if socket.connect(("2001:db8::1", 9)).is_ok() {
                if let Ok(local) = socket.local_addr() {
                    if !local.ip().is_unspecified() {
                        found.push((local.ip().to_string(), local.port()));
                    }
                }
            }
        }

        found
    }
}

/// Host-candidate priority: type preference 126, full local preference.
fn host_priority(component: u32) -> u64 {
    (126_u64 << 24) + (65535_u64 << 8) + (256 - component as u64)
}

/// Foundation token derived from the address, stable per interface.
fn foundation_for(address: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(address.as_bytes());
    hex::encode(hasher.finalize())[..8].to_string()
}

impl CandidateSource for NativeCandidateSource {
    fn gather(self: Box<Self>, sink: Sender<String>) {
        for (address, port) in self.discover() {
            let line = format!(
                "candidate:{} 1 udp {} {} {} typ host",
                foundation_for(&address),
                host_priority(1),
                address,
                port
            );
            if sink.send(line).is_err() {
                return;
            }
        }
        // Sender drops here: gathering complete.
    }
}

/// Scripted source for tests: replays fixed lines, optionally holding the
/// channel open past the cap to simulate a host that never completes.
pub struct ScriptedSource {
    pub lines: Vec<String>,
    pub complete: bool,
    pub hold_open: Duration,
}

impl ScriptedSource {
    pub fn completing(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            complete: true,
            hold_open: Duration::ZERO,
        }
    }

    pub fn never_completing(lines: &[&str], hold_open: Duration) -> Self {
        Self {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            complete: false,
            hold_open,
        }
    }
}

impl CandidateSource for ScriptedSource {
    fn gather(self: Box<Self>, sink: Sender<String>) {
        for line in self.lines {
            if sink.send(line).is_err() {
                return;
            }
        }
        if !self.complete {
            std::thread::sleep(self.hold_open);
        }
    }
}

/// Drain `source` into a classified candidate set, bounded by `cap`.
pub fn gather_candidates(source: Box<dyn CandidateSource>, cap: Duration) -> CandidateSet {
    let (tx, rx) = bounded::<String>(64);
    std::thread::spawn(move || source.gather(tx));

    let deadline = Instant::now() + cap;
    let mut set = CandidateSet::new();

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        match rx.recv_timeout(remaining) {
            Ok(line) => set.push(&line),
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => break,
        }
    }

    set
}

/// Transport-candidate probe over the native source.
pub async fn probe() -> SignalResult<TransportSummary> {
    probe_with(Box::new(NativeCandidateSource), DEFAULT_GATHER_CAP).await
}

/// Transport-candidate probe with an explicit source and cap.
pub async fn probe_with(
    source: Box<dyn CandidateSource>,
    cap: Duration,
) -> SignalResult<TransportSummary> {
    match tokio::task::spawn_blocking(move || gather_candidates(source, cap)).await {
        Ok(set) => SignalResult::collected(set.summarize()),
        Err(e) => SignalResult::error(format!("gathering task failed: {e}")),
    }
}

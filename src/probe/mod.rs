//! Capability probes.
//!
//! Each probe queries exactly one host capability domain and resolves to a
//! `SignalResult` for that domain. Probes are independent: the failure or
//! absence of one never blocks or invalidates another, and nothing
//! propagates past a probe boundary as an uncaught failure.
//!
//! Eager probes run once at session start (`env`, `display`, `storage`,
//! `network`, `perms`); the rest are on-demand because they are costlier
//! or more privacy-sensitive (`graphics`, `media`, `authenticator`,
//! `battery`, `sensors`, `canvas`, `composite`, and the
//! transport-candidate probe in `crate::rtc`).

pub mod authenticator;
pub mod battery;
pub mod canvas;
pub mod composite;
pub mod display;
pub mod env;
pub mod graphics;
pub mod media;
pub mod network;
pub mod perms;
pub mod sensors;
pub mod storage;

use std::path::Path;

/// Read a sysfs-style one-line attribute, trimming whitespace.
pub(crate) fn read_trimmed(path: &Path) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

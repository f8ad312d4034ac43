//! Agent, locale and timezone probe (eager).

use crate::signal::SignalResult;
use serde::{Deserialize, Serialize};
use sysinfo::System;

/// Host environment metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvInfo {
    /// Agent string, e.g. `hostprint/0.1.0 (linux x86_64)`
    pub agent: String,
    pub os: String,
    pub arch: String,
    /// Distribution pretty name, where the host declares one
    pub os_release: Option<String>,
    /// Hostname-derived label
    pub host_label: Option<String>,
    /// Preferred languages in priority order
    pub languages: Vec<String>,
    /// IANA timezone name, when resolvable
    pub timezone: Option<String>,
    /// Local offset from UTC, in minutes (e.g. +120 in summer for Europe/Amsterdam)
    pub timezone_offset_minutes: i32,
    /// Formatted offset string, e.g. `+02:00`
    pub utc_offset: String,
    pub cpu_count: Option<usize>,
    pub memory_bytes: Option<u64>,
}

/// Format a minute offset as `±HH:MM`.
pub fn format_offset(minutes: i32) -> String {
    let sign = if minutes >= 0 { '+' } else { '-' };
    let abs = minutes.unsigned_abs();
    format!("{}{:02}:{:02}", sign, abs / 60, abs % 60)
}

/// Languages from the locale environment, deduplicated in priority order.
fn detect_languages() -> Vec<String> {
    let mut seen = Vec::new();
    let mut push = |raw: &str| {
        // "en_US.UTF-8" -> "en_US"; empty and "C"/"POSIX" entries are noise.
        let lang = raw.split('.').next().unwrap_or(raw).trim();
        if lang.is_empty() || lang == "C" || lang == "POSIX" {
            return;
        }
        if !seen.iter().any(|s| s == lang) {
            seen.push(lang.to_string());
        }
    };

    if let Ok(list) = std::env::var("LANGUAGE") {
        for entry in list.split(':') {
            push(entry);
        }
    }
    for var in ["LC_ALL", "LC_MESSAGES", "LANG"] {
        if let Ok(value) = std::env::var(var) {
            push(&value);
        }
    }

    seen
}

/// IANA timezone name: the `TZ` variable when set, otherwise the
/// `/etc/localtime` link target. Validated against the tz database.
fn detect_timezone() -> Option<String> {
    let raw = std::env::var("TZ").ok().or_else(|| {
        let target = std::fs::read_link("/etc/localtime").ok()?;
        let target = target.to_string_lossy();
        target
            .split("/zoneinfo/")
            .nth(1)
            .map(|suffix| suffix.to_string())
    })?;

    // TZ values may carry a leading colon (":Europe/Amsterdam").
    raw.trim_start_matches(':')
        .parse::<chrono_tz::Tz>()
        .ok()
        .map(|tz| tz.name().to_string())
}

#[cfg(target_os = "linux")]
fn detect_os_release() -> Option<String> {
    let content = std::fs::read_to_string("/etc/os-release").ok()?;
    content.lines().find_map(|line| {
        line.strip_prefix("PRETTY_NAME=")
            .map(|v| v.trim_matches('"').to_string())
    })
}

#[cfg(not(target_os = "linux"))]
fn detect_os_release() -> Option<String> {
    None
}

/// Collect environment metadata.
///
/// This capability always exists; missing pieces surface as `None` fields,
/// never as a failed probe.
pub async fn probe() -> SignalResult<EnvInfo> {
    let os = std::env::consts::OS.to_string();
    let arch = std::env::consts::ARCH.to_string();
    let agent = format!("hostprint/{} ({} {})", env!("CARGO_PKG_VERSION"), os, arch);

    let host_label = hostname::get()
        .ok()
        .map(|h| h.to_string_lossy().to_string())
        .filter(|h| !h.is_empty());

    let offset_minutes = chrono::Local::now().offset().local_minus_utc() / 60;

    let mut system = System::new();
    system.refresh_memory();
    let memory_bytes = match system.total_memory() {
        0 => None,
        bytes => Some(bytes),
    };

    SignalResult::collected(EnvInfo {
        agent,
        os,
        arch,
        os_release: detect_os_release(),
        host_label,
        languages: detect_languages(),
        timezone: detect_timezone(),
        timezone_offset_minutes: offset_minutes,
        utc_offset: format_offset(offset_minutes),
        cpu_count: std::thread::available_parallelism().ok().map(|n| n.get()),
        memory_bytes,
    })
}

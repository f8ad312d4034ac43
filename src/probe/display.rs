//! Display geometry and capability-flag probes (eager).

use crate::probe::read_trimmed;
use crate::signal::SignalResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which display server the session is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayServer {
    Wayland,
    X11,
    Headless,
}

/// Display geometry and connected outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayInfo {
    pub server: DisplayServer,
    /// Preferred mode of the first connected output, e.g. `1920x1080`
    pub geometry: Option<String>,
    /// Connected connector names
    pub outputs: Vec<String>,
}

/// Capability flags of the attached terminal/display path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayCapabilities {
    pub term: Option<String>,
    pub truecolor: bool,
    pub utf8_locale: bool,
    pub color_depth_bits: u8,
}

fn detect_server() -> DisplayServer {
    if std::env::var("WAYLAND_DISPLAY").map_or(false, |v| !v.is_empty()) {
        DisplayServer::Wayland
    } else if std::env::var("DISPLAY").map_or(false, |v| !v.is_empty()) {
        DisplayServer::X11
    } else {
        DisplayServer::Headless
    }
}

/// Scan DRM connectors under `base` for connected outputs and their
/// preferred mode.
fn scan_outputs(base: &Path) -> (Vec<String>, Option<String>) {
    let mut outputs = Vec::new();
    let mut geometry = None;

    let Ok(entries) = std::fs::read_dir(base) else {
        return (outputs, geometry);
    };

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        // Connectors are card<N>-<connector>; bare card<N> is the adapter.
        .filter(|name| name.starts_with("card") && name.contains('-'))
        .collect();
    names.sort();

    for name in names {
        let dir = base.join(&name);
        if read_trimmed(&dir.join("status")).as_deref() != Some("connected") {
            continue;
        }
        if geometry.is_none() {
            if let Some(modes) = read_trimmed(&dir.join("modes")) {
                geometry = modes.lines().next().map(|m| m.trim().to_string());
            }
        }
        outputs.push(name);
    }

    (outputs, geometry)
}

/// Collect display server, outputs and geometry.
pub async fn probe_info() -> SignalResult<DisplayInfo> {
    let server = detect_server();
    let (outputs, geometry) = scan_outputs(Path::new("/sys/class/drm"));

    SignalResult::collected(DisplayInfo {
        server,
        geometry,
        outputs,
    })
}

/// Collect terminal/display capability flags.
pub async fn probe_caps() -> SignalResult<DisplayCapabilities> {
    let term = std::env::var("TERM").ok().filter(|t| !t.is_empty());
    let truecolor = std::env::var("COLORTERM")
        .map(|v| {
            let v = v.to_ascii_lowercase();
            v.contains("truecolor") || v.contains("24bit")
        })
        .unwrap_or(false);
    let utf8_locale = ["LC_ALL", "LC_CTYPE", "LANG"].iter().any(|var| {
        std::env::var(var)
            .map(|v| v.to_ascii_uppercase().contains("UTF-8") || v.to_ascii_uppercase().contains("UTF8"))
            .unwrap_or(false)
    });

    SignalResult::collected(DisplayCapabilities {
        term,
        truecolor,
        utf8_locale,
        color_depth_bits: if truecolor { 24 } else { 8 },
    })
}

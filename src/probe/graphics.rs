//! Accelerated-graphics probe (on-demand).

use crate::probe::read_trimmed;
use crate::signal::SignalResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One graphics adapter known to the kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphicsCard {
    pub name: String,
    /// PCI vendor id, e.g. `0x8086`
    pub vendor_id: Option<String>,
    /// PCI device id
    pub device_id: Option<String>,
    pub driver: Option<String>,
}

/// Accelerated-graphics capability summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphicsAdapter {
    /// Whether a render node is exposed for acceleration
    pub accelerated: bool,
    pub cards: Vec<GraphicsCard>,
    pub render_nodes: Vec<String>,
}

fn driver_from_uevent(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    content
        .lines()
        .find_map(|line| line.strip_prefix("DRIVER=").map(|v| v.to_string()))
}

fn is_adapter_name(name: &str) -> bool {
    // card<N> without a connector suffix.
    name.strip_prefix("card")
        .map(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

/// Survey adapters under the DRM class directory and render nodes under
/// the device directory.
pub fn survey(drm_class: &Path, dri_dev: &Path) -> SignalResult<GraphicsAdapter> {
    let Ok(entries) = std::fs::read_dir(drm_class) else {
        return SignalResult::unsupported_with("graphics class unavailable");
    };

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| is_adapter_name(name))
        .collect();
    names.sort();

    let mut cards = Vec::new();
    for name in names {
        let device = drm_class.join(&name).join("device");
        cards.push(GraphicsCard {
            vendor_id: read_trimmed(&device.join("vendor")),
            device_id: read_trimmed(&device.join("device")),
            driver: driver_from_uevent(&device.join("uevent")),
            name,
        });
    }

    let mut render_nodes: Vec<String> = std::fs::read_dir(dri_dev)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .filter(|name| name.starts_with("renderD"))
                .collect()
        })
        .unwrap_or_default();
    render_nodes.sort();

    SignalResult::collected(GraphicsAdapter {
        accelerated: !render_nodes.is_empty(),
        cards,
        render_nodes,
    })
}

/// Collect the accelerated-graphics capability summary.
pub async fn probe() -> SignalResult<GraphicsAdapter> {
    survey(Path::new("/sys/class/drm"), Path::new("/dev/dri"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("hostprint-gfx-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_survey_reads_adapter_attributes() {
        let drm = temp_dir("drm");
        let device = drm.join("card0").join("device");
        std::fs::create_dir_all(&device).unwrap();
        std::fs::write(device.join("vendor"), "0x8086\n").unwrap();
        std::fs::write(device.join("device"), "0x46a6\n").unwrap();
        std::fs::write(device.join("uevent"), "DRIVER=i915\nPCI_CLASS=30000\n").unwrap();
        // Connector dirs are not adapters.
        std::fs::create_dir_all(drm.join("card0-eDP-1")).unwrap();

        let dri = temp_dir("dri");
        std::fs::write(dri.join("renderD128"), b"").unwrap();
        std::fs::write(dri.join("card0"), b"").unwrap();

        let adapter = survey(&drm, &dri);
        let adapter = adapter.value().expect("collected");

        assert!(adapter.accelerated);
        assert_eq!(adapter.render_nodes, vec!["renderD128"]);
        assert_eq!(adapter.cards.len(), 1);
        assert_eq!(adapter.cards[0].name, "card0");
        assert_eq!(adapter.cards[0].vendor_id.as_deref(), Some("0x8086"));
        assert_eq!(adapter.cards[0].driver.as_deref(), Some("i915"));

        let _ = std::fs::remove_dir_all(&drm);
        let _ = std::fs::remove_dir_all(&dri);
    }

    #[test]
    fn test_survey_missing_class_is_unsupported() {
        let result = survey(
            Path::new("/nonexistent/hostprint/drm"),
            Path::new("/nonexistent/hostprint/dri"),
        );
        assert!(result.is_unsupported());
    }
}

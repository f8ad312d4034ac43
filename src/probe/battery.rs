//! Battery status probe (on-demand).

use crate::probe::read_trimmed;
use crate::signal::SignalResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Battery state as declared by the power-supply class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryStatus {
    pub supply_name: String,
    /// Charge level 0-100, when reported
    pub percent: Option<f64>,
    /// True while charging; `None` when the state is unknown
    pub charging: Option<bool>,
    pub technology: Option<String>,
}

/// Read battery state from the given power-supply class directory.
pub fn read_from(base: &Path) -> SignalResult<BatteryStatus> {
    let Ok(entries) = std::fs::read_dir(base) else {
        return SignalResult::unsupported_with("power-supply class unavailable");
    };

    let mut supplies: Vec<std::path::PathBuf> =
        entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    supplies.sort();

    for dir in supplies {
        if read_trimmed(&dir.join("type")).as_deref() != Some("Battery") {
            continue;
        }

        let supply_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "battery".to_string());
        let percent = read_trimmed(&dir.join("capacity")).and_then(|v| v.parse::<f64>().ok());
        let charging = read_trimmed(&dir.join("status")).and_then(|s| match s.as_str() {
            "Charging" => Some(true),
            "Discharging" | "Not charging" | "Full" => Some(false),
            _ => None,
        });
        let technology = read_trimmed(&dir.join("technology"));

        return SignalResult::collected(BatteryStatus {
            supply_name,
            percent,
            charging,
            technology,
        });
    }

    SignalResult::unsupported_with("no battery present")
}

/// Collect battery status.
pub async fn probe() -> SignalResult<BatteryStatus> {
    read_from(Path::new("/sys/class/power_supply"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_supply_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("hostprint-bat-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_battery_read() {
        let base = temp_supply_dir("read");

        // AC adapter entries must be skipped.
        let ac = base.join("AC");
        std::fs::create_dir_all(&ac).unwrap();
        std::fs::write(ac.join("type"), "Mains\n").unwrap();

        let bat = base.join("BAT0");
        std::fs::create_dir_all(&bat).unwrap();
        std::fs::write(bat.join("type"), "Battery\n").unwrap();
        std::fs::write(bat.join("capacity"), "87\n").unwrap();
        std::fs::write(bat.join("status"), "Charging\n").unwrap();
        std::fs::write(bat.join("technology"), "Li-ion\n").unwrap();

        let status = read_from(&base);
        let status = status.value().expect("collected");
        assert_eq!(status.supply_name, "BAT0");
        assert_eq!(status.percent, Some(87.0));
        assert_eq!(status.charging, Some(true));
        assert_eq!(status.technology.as_deref(), Some("Li-ion"));

        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn test_no_battery_is_unsupported() {
        let base = temp_supply_dir("none");
        let ac = base.join("AC");
        std::fs::create_dir_all(&ac).unwrap();
        std::fs::write(ac.join("type"), "Mains\n").unwrap();

        let result = read_from(&base);
        assert_eq!(
            result,
            SignalResult::unsupported_with("no battery present")
        );

        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn test_missing_class_is_unsupported() {
        let result = read_from(Path::new("/nonexistent/hostprint/power"));
        assert!(result.is_unsupported());
    }
}

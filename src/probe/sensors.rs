//! Ambient sensor survey probe (on-demand).

use crate::probe::read_trimmed;
use crate::signal::SignalResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Recognized ambient sensor kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
    Magnetometer,
    Light,
    Proximity,
    Other,
}

impl SensorKind {
    fn from_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.contains("accel") {
            SensorKind::Accelerometer
        } else if lower.contains("gyro") {
            SensorKind::Gyroscope
        } else if lower.contains("magn") {
            SensorKind::Magnetometer
        } else if lower.contains("als") || lower.contains("light") {
            SensorKind::Light
        } else if lower.contains("prox") {
            SensorKind::Proximity
        } else {
            SensorKind::Other
        }
    }
}

/// One sensor device on the industrial-IO bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDevice {
    pub name: String,
    pub kind: SensorKind,
}

/// Survey of the ambient sensor bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSurvey {
    pub devices: Vec<SensorDevice>,
}

/// Survey against the given IIO device directory.
pub fn survey(base: &Path) -> SignalResult<SensorSurvey> {
    let Ok(entries) = std::fs::read_dir(base) else {
        return SignalResult::unsupported_with("no ambient sensor bus on host");
    };

    let mut dirs: Vec<std::path::PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().starts_with("iio:device"))
                .unwrap_or(false)
        })
        .collect();
    dirs.sort();

    let devices = dirs
        .into_iter()
        .filter_map(|dir| read_trimmed(&dir.join("name")))
        .map(|name| SensorDevice {
            kind: SensorKind::from_name(&name),
            name,
        })
        .collect();

    SignalResult::collected(SensorSurvey { devices })
}

/// Collect the ambient sensor survey.
pub async fn probe() -> SignalResult<SensorSurvey> {
    survey(Path::new("/sys/bus/iio/devices"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_iio_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("hostprint-iio-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_survey_classifies_devices() {
        let base = temp_iio_dir("classify");

        let accel = base.join("iio:device0");
        std::fs::create_dir_all(&accel).unwrap();
        std::fs::write(accel.join("name"), "bmc150_accel\n").unwrap();

        let light = base.join("iio:device1");
        std::fs::create_dir_all(&light).unwrap();
        std::fs::write(light.join("name"), "als\n").unwrap();

        let survey = survey(&base);
        let survey = survey.value().expect("collected");
        assert_eq!(survey.devices.len(), 2);
        assert_eq!(survey.devices[0].kind, SensorKind::Accelerometer);
        assert_eq!(survey.devices[1].kind, SensorKind::Light);

        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn test_missing_bus_is_unsupported() {
        let result = survey(Path::new("/nonexistent/hostprint/iio"));
        assert!(result.is_unsupported());
    }

    #[test]
    fn test_empty_bus_is_collected_and_empty() {
        let base = temp_iio_dir("empty");
        let result = survey(&base);
        let survey = result.value().expect("collected");
        assert!(survey.devices.is_empty());

        let _ = std::fs::remove_dir_all(&base);
    }
}

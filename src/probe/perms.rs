//! Device-access survey probe (eager).
//!
//! Reports whether the session can reach the privacy-relevant device
//! classes a site-style collector would ask permission for. Access is
//! checked, never exercised: nothing is read from the devices.

use crate::signal::SignalResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Accessibility of one device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessState {
    /// Node present and readable by this session
    Granted,
    /// Node present but access is refused
    Denied,
    /// No such device class on this host
    Absent,
}

/// Access survey over the common privacy-relevant device classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionSurvey {
    pub camera: AccessState,
    pub microphone: AccessState,
    pub input_devices: AccessState,
}

fn check_node(path: &Path) -> AccessState {
    match std::fs::metadata(path) {
        Err(_) => AccessState::Absent,
        Ok(meta) => {
            let accessible = if meta.is_dir() {
                std::fs::read_dir(path).is_ok()
            } else {
                std::fs::OpenOptions::new().read(true).open(path).is_ok()
            };
            if accessible {
                AccessState::Granted
            } else {
                AccessState::Denied
            }
        }
    }
}

/// First camera node, if any.
fn camera_node(dev: &Path) -> AccessState {
    for index in 0..4 {
        let node = dev.join(format!("video{index}"));
        let state = check_node(&node);
        if state != AccessState::Absent {
            return state;
        }
    }
    AccessState::Absent
}

/// Survey against the given `/dev` root.
pub fn survey(dev: &Path) -> SignalResult<PermissionSurvey> {
    SignalResult::collected(PermissionSurvey {
        camera: camera_node(dev),
        microphone: check_node(&dev.join("snd")),
        input_devices: check_node(&dev.join("input")),
    })
}

/// Collect the device-access survey.
pub async fn probe() -> SignalResult<PermissionSurvey> {
    survey(Path::new("/dev"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dev_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("hostprint-dev-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_absent_classes() {
        let dev = temp_dev_dir("absent");
        let survey = survey(&dev);
        let survey = survey.value().expect("collected");

        assert_eq!(survey.camera, AccessState::Absent);
        assert_eq!(survey.microphone, AccessState::Absent);
        assert_eq!(survey.input_devices, AccessState::Absent);

        let _ = std::fs::remove_dir_all(&dev);
    }

    #[test]
    fn test_present_classes_are_granted() {
        let dev = temp_dev_dir("present");
        std::fs::write(dev.join("video0"), b"").unwrap();
        std::fs::create_dir_all(dev.join("snd")).unwrap();
        std::fs::create_dir_all(dev.join("input")).unwrap();

        let survey = survey(&dev);
        let survey = survey.value().expect("collected");

        assert_eq!(survey.camera, AccessState::Granted);
        assert_eq!(survey.microphone, AccessState::Granted);
        assert_eq!(survey.input_devices, AccessState::Granted);

        let _ = std::fs::remove_dir_all(&dev);
    }
}

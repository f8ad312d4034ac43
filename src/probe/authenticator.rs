//! Platform authenticator availability probe (on-demand).

use crate::probe::read_trimmed;
use crate::signal::SignalResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Authenticator availability summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatorInfo {
    /// Whether a platform authenticator (TPM) is present
    pub platform_available: bool,
    pub tpm_version: Option<String>,
    /// Transports over which external authenticators were observed
    pub external_transports: Vec<String>,
}

fn scan_tpm(tpm_class: &Path) -> (bool, Option<String>) {
    let Ok(entries) = std::fs::read_dir(tpm_class) else {
        return (false, None);
    };

    let mut names: Vec<std::path::PathBuf> =
        entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    names.sort();

    match names.first() {
        Some(dir) => (true, read_trimmed(&dir.join("tpm_version_major"))),
        None => (false, None),
    }
}

fn scan_fido_hid(hidraw_class: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(hidraw_class) else {
        return Vec::new();
    };

    let mut transports = Vec::new();
    for entry in entries.filter_map(|e| e.ok()) {
        let uevent = entry.path().join("device").join("uevent");
        if let Ok(content) = std::fs::read_to_string(&uevent) {
            let name = content
                .lines()
                .find_map(|line| line.strip_prefix("HID_NAME="))
                .unwrap_or_default()
                .to_ascii_uppercase();
            if name.contains("FIDO") || name.contains("U2F") {
                transports.push("usb".to_string());
                break;
            }
        }
    }
    transports
}

/// Survey against the given class directories.
pub fn survey(tpm_class: &Path, hidraw_class: &Path) -> SignalResult<AuthenticatorInfo> {
    if !tpm_class.exists() && !hidraw_class.exists() {
        return SignalResult::unsupported_with("no authenticator device classes on host");
    }

    let (platform_available, tpm_version) = scan_tpm(tpm_class);
    let external_transports = scan_fido_hid(hidraw_class);

    SignalResult::collected(AuthenticatorInfo {
        platform_available,
        tpm_version,
        external_transports,
    })
}

/// Collect authenticator availability.
pub async fn probe() -> SignalResult<AuthenticatorInfo> {
    survey(Path::new("/sys/class/tpm"), Path::new("/sys/class/hidraw"))
}

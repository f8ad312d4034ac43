//! Declared network type probe (eager).

use crate::probe::read_trimmed;
use crate::signal::SignalResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Interface classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    Ethernet,
    Wifi,
    Tunnel,
    Loopback,
    Other,
}

/// One surveyed interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetInterface {
    pub name: String,
    pub kind: NetworkKind,
    pub up: bool,
}

/// What the host declares about its network attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkInfo {
    /// Kind of the first active non-loopback interface
    pub declared_type: Option<NetworkKind>,
    pub interfaces: Vec<NetInterface>,
}

fn classify_interface(dir: &Path, name: &str) -> NetworkKind {
    if name == "lo" {
        return NetworkKind::Loopback;
    }
    if dir.join("wireless").is_dir() {
        return NetworkKind::Wifi;
    }
    if name.starts_with("tun") || name.starts_with("tap") || name.starts_with("wg") {
        return NetworkKind::Tunnel;
    }
    // ARPHRD_ETHER
    if read_trimmed(&dir.join("type")).as_deref() == Some("1") {
        return NetworkKind::Ethernet;
    }
    NetworkKind::Other
}

/// Survey interfaces under the given interface class directory.
pub fn survey(base: &Path) -> SignalResult<NetworkInfo> {
    let Ok(entries) = std::fs::read_dir(base) else {
        return SignalResult::unsupported_with("network interface class unavailable");
    };

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();

    let mut interfaces = Vec::new();
    for name in names {
        let dir = base.join(&name);
        let kind = classify_interface(&dir, &name);
        let up = read_trimmed(&dir.join("operstate")).as_deref() == Some("up");
        interfaces.push(NetInterface { name, kind, up });
    }

    let declared_type = interfaces
        .iter()
        .find(|iface| iface.up && iface.kind != NetworkKind::Loopback)
        .map(|iface| iface.kind);

    SignalResult::collected(NetworkInfo {
        declared_type,
        interfaces,
    })
}

/// Collect the network attachment survey.
pub async fn probe() -> SignalResult<NetworkInfo> {
    survey(Path::new("/sys/class/net"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_net_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("hostprint-net-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_survey_classifies_interfaces() {
        let base = temp_net_dir("classify");

        let eth = base.join("eth0");
        std::fs::create_dir_all(&eth).unwrap();
        std::fs::write(eth.join("type"), "1\n").unwrap();
        std::fs::write(eth.join("operstate"), "up\n").unwrap();

        let wifi = base.join("wlan0");
        std::fs::create_dir_all(wifi.join("wireless")).unwrap();
        std::fs::write(wifi.join("operstate"), "down\n").unwrap();

        let lo = base.join("lo");
        std::fs::create_dir_all(&lo).unwrap();
        std::fs::write(lo.join("type"), "772\n").unwrap();
        std::fs::write(lo.join("operstate"), "unknown\n").unwrap();

        let info = survey(&base);
        let info = info.value().expect("collected");

        assert_eq!(info.declared_type, Some(NetworkKind::Ethernet));
        assert_eq!(info.interfaces.len(), 3);

        let by_name = |name: &str| {
            info.interfaces
                .iter()
                .find(|i| i.name == name)
                .unwrap()
                .kind
        };
        assert_eq!(by_name("eth0"), NetworkKind::Ethernet);
        assert_eq!(by_name("wlan0"), NetworkKind::Wifi);
        assert_eq!(by_name("lo"), NetworkKind::Loopback);

        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn test_survey_missing_class_is_unsupported() {
        let result = survey(Path::new("/nonexistent/hostprint/net"));
        assert!(result.is_unsupported());
    }
}

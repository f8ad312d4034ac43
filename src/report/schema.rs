//! Versioned report snapshot.
//!
//! A report is a fixed set of named sections, each holding a
//! `SignalResult`. Every section is present in every snapshot; only the
//! four result shapes vary.

use crate::probe::authenticator::AuthenticatorInfo;
use crate::probe::battery::BatteryStatus;
use crate::probe::canvas::CanvasArtifact;
use crate::probe::composite::CompositeFingerprint;
use crate::probe::display::{DisplayCapabilities, DisplayInfo};
use crate::probe::env::EnvInfo;
use crate::probe::graphics::GraphicsAdapter;
use crate::probe::media::MediaSupport;
use crate::probe::network::NetworkInfo;
use crate::probe::perms::PermissionSurvey;
use crate::probe::sensors::SensorSurvey;
use crate::probe::storage::StorageEstimate;
use crate::rtc::TransportSummary;
use crate::signal::SignalResult;
use serde::{Deserialize, Serialize};

/// The current report format version.
pub const REPORT_VERSION: &str = "1.0";

/// The name of this producer.
pub const PRODUCER_NAME: &str = "hostprint";

/// Producer metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
}

impl Default for ReportProducer {
    fn default() -> Self {
        Self {
            name: PRODUCER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Snapshot metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Report format version
    pub version: String,
    /// Snapshot time (RFC3339)
    pub generated_at: String,
    pub session_id: String,
    pub producer: ReportProducer,
}

/// One full report snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub meta: ReportMeta,

    // Eager sections
    pub env: SignalResult<EnvInfo>,
    pub display: SignalResult<DisplayInfo>,
    pub display_caps: SignalResult<DisplayCapabilities>,
    pub storage: SignalResult<StorageEstimate>,
    pub network: SignalResult<NetworkInfo>,
    pub perms: SignalResult<PermissionSurvey>,

    // On-demand sections
    pub graphics: SignalResult<GraphicsAdapter>,
    pub media: SignalResult<MediaSupport>,
    pub authenticator: SignalResult<AuthenticatorInfo>,
    pub battery: SignalResult<BatteryStatus>,
    pub sensors: SignalResult<SensorSurvey>,
    pub canvas: SignalResult<CanvasArtifact>,
    pub transport: SignalResult<TransportSummary>,
    pub composite: SignalResult<CompositeFingerprint>,
}

impl Report {
    /// Section names with their status labels, for CLI rendering.
    pub fn section_status(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("env", self.env.status_label()),
            ("display", self.display.status_label()),
            ("display_caps", self.display_caps.status_label()),
            ("storage", self.storage.status_label()),
            ("network", self.network.status_label()),
            ("perms", self.perms.status_label()),
            ("graphics", self.graphics.status_label()),
            ("media", self.media.status_label()),
            ("authenticator", self.authenticator.status_label()),
            ("battery", self.battery.status_label()),
            ("sensors", self.sensors.status_label()),
            ("canvas", self.canvas.status_label()),
            ("transport", self.transport.status_label()),
            ("composite", self.composite.status_label()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_is_never_sparse() {
        let controller =
            crate::report::session::SessionController::new(crate::config::Config::default());
        let report = controller.assemble();

        let json = serde_json::to_value(&report).unwrap();
        let object = json.as_object().unwrap();

        for (name, _) in report.section_status() {
            let section = object
                .get(name)
                .unwrap_or_else(|| panic!("section {name} missing from snapshot"));
            assert!(
                section.get("status").is_some(),
                "section {name} has no status tag"
            );
        }
        assert_eq!(object["meta"]["version"], REPORT_VERSION);
    }
}

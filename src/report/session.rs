//! Session-owned collection state and report assembly.
//!
//! The controller owns the only mutable collection state. Probes are pure
//! input-to-result functions; they return values and the controller merges
//! them, so there is no concurrent-write hazard on the report structure
//! and a late probe result can never mutate already-merged state.

use crate::config::Config;
use crate::guard::guard;
use crate::ledger::{create_shared_ledger, SharedLedger};
use crate::probe::{
    authenticator, battery, canvas, composite, display, env, graphics, media, network, perms,
    sensors, storage,
};
use crate::report::schema::{Report, ReportMeta, ReportProducer, REPORT_VERSION};
use crate::rtc;
use crate::signal::SignalResult;
use chrono::Utc;
use serde::Serialize;
use std::future::Future;
use uuid::Uuid;

/// Mutable collection state, one slot per report section.
#[derive(Debug, Default)]
pub struct SessionState {
    pub env: Option<SignalResult<env::EnvInfo>>,
    pub display: Option<SignalResult<display::DisplayInfo>>,
    pub display_caps: Option<SignalResult<display::DisplayCapabilities>>,
    pub storage: Option<SignalResult<storage::StorageEstimate>>,
    pub network: Option<SignalResult<network::NetworkInfo>>,
    pub perms: Option<SignalResult<perms::PermissionSurvey>>,
    pub graphics: Option<SignalResult<graphics::GraphicsAdapter>>,
    pub media: Option<SignalResult<media::MediaSupport>>,
    pub authenticator: Option<SignalResult<authenticator::AuthenticatorInfo>>,
    pub battery: Option<SignalResult<battery::BatteryStatus>>,
    pub sensors: Option<SignalResult<sensors::SensorSurvey>>,
    pub canvas: Option<SignalResult<canvas::CanvasArtifact>>,
    pub transport: Option<SignalResult<rtc::TransportSummary>>,
    pub composite: Option<SignalResult<composite::CompositeFingerprint>>,
}

/// Debug-only export of pre-redaction raw artifacts. Produced by an
/// explicitly-named path that the report build never calls.
#[derive(Debug, Clone, Serialize)]
pub struct DebugExport {
    pub generated_at: String,
    pub canvas: Option<canvas::RawRasterArtifact>,
    pub composite: composite::CompositeRaw,
}

/// Owns the in-flight collection state for one session.
pub struct SessionController {
    session_id: String,
    config: Config,
    ledger: SharedLedger,
    state: SessionState,
}

impl SessionController {
    pub fn new(config: Config) -> Self {
        Self::with_ledger(config, create_shared_ledger())
    }

    pub fn with_ledger(config: Config, ledger: SharedLedger) -> Self {
        Self {
            session_id: format!("HPR-{}", Uuid::new_v4()),
            config,
            ledger,
            state: SessionState::default(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn ledger(&self) -> &SharedLedger {
        &self.ledger
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Mutable access to the collection state, for merging results
    /// produced by externally-run probes. Ownership stays with the
    /// controller; probes themselves never receive this reference.
    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    /// Guard a probe with the configured deadline and record its outcome.
    async fn guarded<T, F>(&self, probe: F) -> SignalResult<T>
    where
        F: Future<Output = SignalResult<T>>,
    {
        let result = guard(probe, self.config.probe_deadline).await;
        self.ledger.record_probe(&result);
        result
    }

    /// Run the configured eager probes. Invoked once at session start.
    pub async fn collect_eager(&mut self) {
        if self.config.eager.env {
            let result = self.guarded(env::probe()).await;
            self.state.env = Some(result);
        }
        if self.config.eager.display {
            let result = self.guarded(display::probe_info()).await;
            self.state.display = Some(result);
            let result = self.guarded(display::probe_caps()).await;
            self.state.display_caps = Some(result);
        }
        if self.config.eager.storage {
            let data_path = self.config.data_path.clone();
            let result = self.guarded(storage::probe_at(&data_path)).await;
            self.state.storage = Some(result);
        }
        if self.config.eager.network {
            let result = self.guarded(network::probe()).await;
            self.state.network = Some(result);
        }
        if self.config.eager.perms {
            let result = self.guarded(perms::probe()).await;
            self.state.perms = Some(result);
        }
        tracing::debug!(session = %self.session_id, "eager collection finished");
    }

    pub async fn collect_graphics(&mut self) {
        let result = self.guarded(graphics::probe()).await;
        self.state.graphics = Some(result);
    }

    pub async fn collect_media(&mut self) {
        let result = self.guarded(media::probe()).await;
        self.state.media = Some(result);
    }

    pub async fn collect_authenticator(&mut self) {
        let result = self.guarded(authenticator::probe()).await;
        self.state.authenticator = Some(result);
    }

    pub async fn collect_battery(&mut self) {
        let result = self.guarded(battery::probe()).await;
        self.state.battery = Some(result);
    }

    pub async fn collect_sensors(&mut self) {
        let result = self.guarded(sensors::probe()).await;
        self.state.sensors = Some(result);
    }

    pub async fn collect_canvas(&mut self) {
        let result = self.guarded(canvas::probe()).await;
        if result.is_collected() {
            // One pixel artifact replaced by a digest.
            self.ledger.record_redactions(1);
        }
        self.state.canvas = Some(result);
    }

    /// Gather transport candidates. The gather loop enforces its own
    /// wall-clock cap, so no outer guard is stacked on top.
    pub async fn collect_transport(&mut self) {
        let result = rtc::gather::probe_with(
            Box::new(rtc::NativeCandidateSource),
            self.config.gather_cap,
        )
        .await;
        self.ledger.record_probe(&result);
        self.state.transport = Some(result);
    }

    /// Gather transport candidates from an explicit source (tests,
    /// external gatherers).
    pub async fn collect_transport_from(&mut self, source: Box<dyn rtc::CandidateSource>) {
        let result = rtc::gather::probe_with(source, self.config.gather_cap).await;
        self.ledger.record_probe(&result);
        self.state.transport = Some(result);
    }

    pub async fn collect_composite(&mut self) {
        let result = self.guarded(composite::probe()).await;
        if result.is_collected() {
            // Geometry trace and text render replaced by digests.
            self.ledger.record_redactions(2);
        }
        self.state.composite = Some(result);
    }

    /// Run every on-demand probe.
    pub async fn collect_all_on_demand(&mut self) {
        self.collect_graphics().await;
        self.collect_media().await;
        self.collect_authenticator().await;
        self.collect_battery().await;
        self.collect_sensors().await;
        self.collect_canvas().await;
        self.collect_transport().await;
        self.collect_composite().await;
    }

    /// Run one on-demand probe by domain name. Returns false for an
    /// unknown domain.
    pub async fn collect_domain(&mut self, domain: &str) -> bool {
        match domain {
            "graphics" => self.collect_graphics().await,
            "media" => self.collect_media().await,
            "authenticator" => self.collect_authenticator().await,
            "battery" => self.collect_battery().await,
            "sensors" => self.collect_sensors().await,
            "canvas" => self.collect_canvas().await,
            "transport" => self.collect_transport().await,
            "composite" => self.collect_composite().await,
            _ => return false,
        }
        true
    }

    /// Snapshot the current state into a full report.
    ///
    /// Total: every known section is present, with a canonical placeholder
    /// substituted for anything not yet merged. Safe to call before any
    /// probe has completed.
    pub fn assemble(&self) -> Report {
        // Sections whose absence means "capability unknown" rather than
        // "not yet run" get the unsupported-flavored placeholder.
        fn pending<T: Clone>(slot: &Option<SignalResult<T>>) -> SignalResult<T> {
            slot.clone().unwrap_or(SignalResult::NotCollected)
        }
        fn unknown<T: Clone>(slot: &Option<SignalResult<T>>) -> SignalResult<T> {
            slot.clone()
                .unwrap_or_else(|| SignalResult::unsupported_with("capability unknown"))
        }

        let report = Report {
            meta: ReportMeta {
                version: REPORT_VERSION.to_string(),
                generated_at: Utc::now().to_rfc3339(),
                session_id: self.session_id.clone(),
                producer: ReportProducer::default(),
            },
            env: pending(&self.state.env),
            display: pending(&self.state.display),
            display_caps: pending(&self.state.display_caps),
            storage: pending(&self.state.storage),
            network: unknown(&self.state.network),
            perms: pending(&self.state.perms),
            graphics: unknown(&self.state.graphics),
            media: unknown(&self.state.media),
            authenticator: unknown(&self.state.authenticator),
            battery: unknown(&self.state.battery),
            sensors: pending(&self.state.sensors),
            canvas: pending(&self.state.canvas),
            transport: pending(&self.state.transport),
            composite: pending(&self.state.composite),
        };

        self.ledger.record_report_assembled();
        report
    }

    /// Debug-only extraction of pre-redaction raw artifacts for local
    /// inspection. Separate from `assemble`; the report path never calls
    /// this and the returned objects are never merged into session state.
    pub fn debug_export(&self) -> DebugExport {
        DebugExport {
            generated_at: Utc::now().to_rfc3339(),
            canvas: canvas::raw_artifact_for_debug().ok(),
            composite: composite::collect_raw_for_debug(),
        }
    }
}

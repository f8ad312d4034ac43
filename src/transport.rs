//! Transport client for report submission and comparison.
//!
//! The remote collaborator is consumed over a simple request/response
//! contract: submit a report payload, fetch it back by id, or compare two
//! stored reports. Requests carry an explicit timeout and no session
//! credentials; non-success responses surface the remote status and
//! message verbatim.

use crate::report::Report;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Transport configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Remote collaborator base URL
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl TransportConfig {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url, timeout }
    }

    /// Report submission endpoint.
    pub fn collect_url(&self) -> String {
        format!("{}/api/fp/collect", self.base_url)
    }

    /// Stored-report endpoint.
    pub fn report_url(&self, id: &str) -> String {
        format!("{}/api/fp/{}", self.base_url, urlencode(id))
    }

    /// Comparison endpoint.
    pub fn compare_url(&self, a: &str, b: &str) -> String {
        format!(
            "{}/api/fp/compare?a={}&b={}",
            self.base_url,
            urlencode(a),
            urlencode(b)
        )
    }

    /// Service health endpoint.
    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }

    /// Service ping endpoint.
    pub fn ping_url(&self) -> String {
        format!("{}/ping", self.base_url)
    }

    /// Service version endpoint.
    pub fn version_url(&self) -> String {
        format!("{}/api/version", self.base_url)
    }
}

/// Minimal percent-encoding for path/query identifiers.
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Transport client error types.
#[derive(Debug)]
pub enum TransportError {
    /// Configuration error
    Config(String),
    /// Network/HTTP error
    Network(String),
    /// Remote returned a non-success response; status and message verbatim
    Server { status: u16, message: String },
    /// JSON serialization error
    Serialization(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Config(msg) => write!(f, "Transport config error: {msg}"),
            TransportError::Network(msg) => write!(f, "Transport network error: {msg}"),
            TransportError::Server { status, message } => {
                write!(f, "Transport server error ({status}): {message}")
            }
            TransportError::Serialization(msg) => {
                write!(f, "Transport serialization error: {msg}")
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// Submission payload envelope.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitPayload<'a> {
    pub payload: &'a Report,
}

/// Receipt from the submission endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    pub ok: bool,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One per-field difference reported by the comparison endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDiff {
    pub path: String,
    #[serde(default)]
    pub a: serde_json::Value,
    #[serde(default)]
    pub b: serde_json::Value,
}

/// Outcome of comparing two stored reports.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareOutcome {
    pub ok: bool,
    #[serde(default)]
    pub same_digest: Option<bool>,
    /// Similarity in 0..1
    #[serde(default)]
    pub similarity: Option<f64>,
    #[serde(default)]
    pub field_diffs: Option<Vec<FieldDiff>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Transport client for the remote collaborator.
#[cfg(feature = "transport")]
pub struct TransportClient {
    config: TransportConfig,
    client: reqwest::Client,
}

#[cfg(feature = "transport")]
impl TransportClient {
    /// Create a new transport client.
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        // Backend is credential-free; cookies and auth headers are never sent.
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Config(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Check service availability.
    pub async fn health(&self) -> Result<bool, TransportError> {
        let response = self
            .client
            .get(self.config.health_url())
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(response.status().is_success())
    }

    /// Round-trip check against the ping endpoint.
    pub async fn ping(&self) -> Result<bool, TransportError> {
        let response = self
            .client
            .get(self.config.ping_url())
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(response.status().is_success())
    }

    /// Remote service version.
    pub async fn version(&self) -> Result<serde_json::Value, TransportError> {
        let response = self
            .client
            .get(self.config.version_url())
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Self::decode(response).await
    }

    async fn decode<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, TransportError> {
        let status = response.status();
        if !status.is_success() {
            // Surface the remote status and message verbatim; no partial
            // body is decoded into the caller's type.
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransportError::Server {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::Serialization(e.to_string()))
    }

    /// Submit a report snapshot.
    pub async fn submit(&self, report: &Report) -> Result<SubmitReceipt, TransportError> {
        let response = self
            .client
            .post(self.config.collect_url())
            .header("Content-Type", "application/json")
            .json(&SubmitPayload { payload: report })
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Self::decode(response).await
    }

    /// Fetch a stored report by id.
    pub async fn fetch(&self, id: &str) -> Result<serde_json::Value, TransportError> {
        let response = self
            .client
            .get(self.config.report_url(id))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Self::decode(response).await
    }

    /// Compare two stored reports.
    pub async fn compare(&self, a: &str, b: &str) -> Result<CompareOutcome, TransportError> {
        let response = self
            .client
            .get(self.config.compare_url(a, b))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Self::decode(response).await
    }
}

/// Blocking transport client for use in synchronous contexts.
#[cfg(feature = "transport")]
pub struct BlockingTransportClient {
    inner: TransportClient,
    runtime: tokio::runtime::Runtime,
}

#[cfg(feature = "transport")]
impl BlockingTransportClient {
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TransportError::Config(format!("Failed to create runtime: {e}")))?;

        Ok(Self {
            inner: TransportClient::new(config)?,
            runtime,
        })
    }

    pub fn health(&self) -> Result<bool, TransportError> {
        self.runtime.block_on(self.inner.health())
    }

    pub fn ping(&self) -> Result<bool, TransportError> {
        self.runtime.block_on(self.inner.ping())
    }

    pub fn version(&self) -> Result<serde_json::Value, TransportError> {
        self.runtime.block_on(self.inner.version())
    }

    pub fn submit(&self, report: &Report) -> Result<SubmitReceipt, TransportError> {
        self.runtime.block_on(self.inner.submit(report))
    }

    pub fn fetch(&self, id: &str) -> Result<serde_json::Value, TransportError> {
        self.runtime.block_on(self.inner.fetch(id))
    }

    pub fn compare(&self, a: &str, b: &str) -> Result<CompareOutcome, TransportError> {
        self.runtime.block_on(self.inner.compare(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_config_urls() {
        let config = TransportConfig::new("https://api.example.test/", Duration::from_secs(15));
        assert_eq!(
            config.collect_url(),
            "https://api.example.test/api/fp/collect"
        );
        assert_eq!(
            config.report_url("abc-123"),
            "https://api.example.test/api/fp/abc-123"
        );
        assert_eq!(
            config.compare_url("a b", "c/d"),
            "https://api.example.test/api/fp/compare?a=a%20b&b=c%2Fd"
        );
        assert_eq!(config.health_url(), "https://api.example.test/health");
        assert_eq!(config.ping_url(), "https://api.example.test/ping");
        assert_eq!(config.version_url(), "https://api.example.test/api/version");
    }

    #[test]
    fn test_error_display() {
        let err = TransportError::Server {
            status: 503,
            message: "maintenance".to_string(),
        };
        let rendered = format!("{err}");
        assert!(rendered.contains("503"));
        assert!(rendered.contains("maintenance"));
    }

    #[test]
    fn test_receipt_parsing() {
        let receipt: SubmitReceipt = serde_json::from_str(
            r#"{"ok":true,"id":"r-1","digest":"ab12","ts":1700000000}"#,
        )
        .unwrap();
        assert!(receipt.ok);
        assert_eq!(receipt.id.as_deref(), Some("r-1"));
        assert_eq!(receipt.digest.as_deref(), Some("ab12"));
        assert!(receipt.error.is_none());
    }

    #[test]
    fn test_compare_outcome_parsing() {
        let outcome: CompareOutcome = serde_json::from_str(
            r#"{"ok":true,"sameDigest":false,"similarity":0.84,
                "fieldDiffs":[{"path":"env.agent","a":"x","b":"y"}]}"#,
        )
        .unwrap();
        assert_eq!(outcome.same_digest, Some(false));
        assert_eq!(outcome.similarity, Some(0.84));
        let diffs = outcome.field_diffs.unwrap();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].path, "env.agent");
    }
}

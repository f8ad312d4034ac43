//! One-way redaction of high-entropy raw artifacts.
//!
//! Raw pixel buffers, geometry traces and rendered text never leave the
//! collection boundary. They are replaced by fixed-length content digests
//! before they can reach the aggregated report. Redaction is a pure
//! function: identical input always yields an identical digest, so
//! repeated collection on an unchanged host is detectably stable.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

/// Length of a digest in hex characters (SHA-256).
pub const DIGEST_HEX_LEN: usize = 64;

/// A fixed-length lowercase hex content digest.
///
/// Always the SHA-256 of either the canonical JSON form of a structured
/// value or the decoded binary payload of an embedded-image artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    fn from_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Digest(hex::encode(hasher.finalize()))
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Redaction errors.
#[derive(Debug)]
pub enum RedactError {
    /// The embedded-image payload was not valid base64.
    Payload(String),
    /// The structured value could not be serialized to canonical JSON.
    Serialization(String),
}

impl std::fmt::Display for RedactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RedactError::Payload(msg) => write!(f, "artifact payload error: {msg}"),
            RedactError::Serialization(msg) => write!(f, "serialization error: {msg}"),
        }
    }
}

impl std::error::Error for RedactError {}

/// True if the string is a self-describing embedded-image payload
/// (`data:<mime>;base64,<payload>`).
pub fn is_embedded_artifact(s: &str) -> bool {
    s.starts_with("data:") && s.contains(";base64,")
}

/// Hash the decoded binary payload of an embedded-image artifact.
pub fn redact_artifact(data_url: &str) -> Result<Digest, RedactError> {
    let payload = match data_url.find(";base64,") {
        Some(idx) => &data_url[idx + ";base64,".len()..],
        None => data_url,
    };
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| RedactError::Payload(e.to_string()))?;
    Ok(Digest::from_bytes(&bytes))
}

/// Redact a JSON value.
///
/// Embedded-image strings are hashed over their decoded bytes; every other
/// value is hashed over its canonical JSON form (serde_json maps are
/// key-sorted, so the form is stable regardless of insertion order).
pub fn redact(value: &serde_json::Value) -> Result<Digest, RedactError> {
    if let serde_json::Value::String(s) = value {
        if is_embedded_artifact(s) {
            return redact_artifact(s);
        }
    }
    let canonical =
        serde_json::to_string(value).map_err(|e| RedactError::Serialization(e.to_string()))?;
    Ok(Digest::from_bytes(canonical.as_bytes()))
}

/// Redact any serializable value through its canonical JSON form.
pub fn redact_serializable<T: Serialize>(value: &T) -> Result<Digest, RedactError> {
    let json =
        serde_json::to_value(value).map_err(|e| RedactError::Serialization(e.to_string()))?;
    redact(&json)
}

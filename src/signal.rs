//! Probe outcome type shared by every capability domain.
//!
//! Every section of a report is always exactly one of four shapes:
//! collected, unsupported, not yet collected, or failed. Consumers never
//! observe an absent field, and an absent capability is not an error.

use serde::{Deserialize, Serialize};

/// Tagged outcome of a single probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignalResult<T> {
    /// Capability present; the probe produced a value.
    Collected { value: T },
    /// Capability absent on this host. Expected, not a failure.
    Unsupported {
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    /// Probe never invoked (on-demand signals before user action).
    NotCollected,
    /// Probe invoked but raised a failure.
    Error { message: String },
}

impl<T> SignalResult<T> {
    /// Wrap a probe value.
    pub fn collected(value: T) -> Self {
        SignalResult::Collected { value }
    }

    /// Capability absent, no further detail.
    pub fn unsupported() -> Self {
        SignalResult::Unsupported { detail: None }
    }

    /// Capability absent with an explanation (e.g. which node was missing).
    pub fn unsupported_with(detail: impl Into<String>) -> Self {
        SignalResult::Unsupported {
            detail: Some(detail.into()),
        }
    }

    /// Probe failure with a message.
    pub fn error(message: impl Into<String>) -> Self {
        SignalResult::Error {
            message: message.into(),
        }
    }

    /// Convert a fallible probe body into a result, mapping errors to
    /// the `Error` shape so nothing propagates past the probe boundary.
    pub fn from_result<E: std::fmt::Display>(res: Result<T, E>) -> Self {
        match res {
            Ok(value) => SignalResult::Collected { value },
            Err(e) => SignalResult::Error {
                message: e.to_string(),
            },
        }
    }

    pub fn is_collected(&self) -> bool {
        matches!(self, SignalResult::Collected { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, SignalResult::Unsupported { .. })
    }

    /// Borrow the collected value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            SignalResult::Collected { value } => Some(value),
            _ => None,
        }
    }

    /// Map the collected value, preserving the other three shapes.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> SignalResult<U> {
        match self {
            SignalResult::Collected { value } => SignalResult::Collected { value: f(value) },
            SignalResult::Unsupported { detail } => SignalResult::Unsupported { detail },
            SignalResult::NotCollected => SignalResult::NotCollected,
            SignalResult::Error { message } => SignalResult::Error { message },
        }
    }

    /// Short status label used by CLI rendering. Failed or unsupported
    /// sections render an explicit marker, never a blank field.
    pub fn status_label(&self) -> &'static str {
        match self {
            SignalResult::Collected { .. } => "collected",
            SignalResult::Unsupported { .. } => "unavailable (unsupported)",
            SignalResult::NotCollected => "not collected",
            SignalResult::Error { .. } => "unavailable (error)",
        }
    }
}

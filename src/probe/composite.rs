//! Composite fingerprint probe (on-demand).
//!
//! Aggregates the cheap collectors plus the raster scene into one
//! component map and derives a single fingerprint digest, the way a
//! third-party fingerprinting library reports a visitor id over its
//! components. Geometry and text sub-fields carry digests in the
//! report-facing result; their raw values are available only through the
//! separate debug path and the two results never share an object.

use crate::probe::{canvas, display, env};
use crate::redact::{redact, redact_serializable, Digest};
use crate::signal::SignalResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label text rendered into the composite's text component.
const TEXT_SAMPLE: &str = "Composite Surface Probe";

/// Report-facing composite fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeFingerprint {
    /// Digest over the full component map
    pub fingerprint: Digest,
    pub component_count: usize,
    pub components: BTreeMap<String, serde_json::Value>,
    /// Digest standing in for the raw geometry trace
    pub geometry_digest: Digest,
    /// Digest standing in for the raw text render
    pub text_digest: Digest,
}

/// Debug-only composite result with pre-redaction raw values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeRaw {
    pub geometry_trace: Vec<(f64, f64)>,
    pub text_render: String,
}

async fn build_components() -> Result<BTreeMap<String, serde_json::Value>, String> {
    let mut components = BTreeMap::new();

    if let Some(info) = env::probe().await.value() {
        components.insert("agent".to_string(), serde_json::json!(info.agent));
        components.insert("os".to_string(), serde_json::json!(info.os));
        components.insert("arch".to_string(), serde_json::json!(info.arch));
        components.insert("languages".to_string(), serde_json::json!(info.languages));
        components.insert("timezone".to_string(), serde_json::json!(info.timezone));
        components.insert("utc_offset".to_string(), serde_json::json!(info.utc_offset));
        components.insert("cpu_count".to_string(), serde_json::json!(info.cpu_count));
        components.insert(
            "memory_bytes".to_string(),
            serde_json::json!(info.memory_bytes),
        );
    }

    if let Some(caps) = display::probe_caps().await.value() {
        components.insert("term".to_string(), serde_json::json!(caps.term));
        components.insert("truecolor".to_string(), serde_json::json!(caps.truecolor));
        components.insert(
            "color_depth_bits".to_string(),
            serde_json::json!(caps.color_depth_bits),
        );
    }

    if let Some(info) = display::probe_info().await.value() {
        components.insert("display_server".to_string(), serde_json::json!(info.server));
        components.insert(
            "display_geometry".to_string(),
            serde_json::json!(info.geometry),
        );
    }

    Ok(components)
}

/// Collect the composite fingerprint. Raw geometry/text values are
/// redacted in place and dropped before this function returns.
pub async fn probe() -> SignalResult<CompositeFingerprint> {
    let run = async {
        let mut components = build_components().await?;

        let geometry_digest = redact_serializable(&canvas::scene_geometry_trace())
            .map_err(|e| e.to_string())?;
        let text_digest = redact_serializable(&canvas::stipple_pattern(TEXT_SAMPLE))
            .map_err(|e| e.to_string())?;

        // The digests join the component map so they contribute to the
        // overall fingerprint; the raw values never do.
        components.insert(
            "geometry".to_string(),
            serde_json::json!(geometry_digest.as_hex()),
        );
        components.insert(
            "text_render".to_string(),
            serde_json::json!(text_digest.as_hex()),
        );

        let fingerprint = redact(&serde_json::json!(components)).map_err(|e| e.to_string())?;

        Ok::<_, String>(CompositeFingerprint {
            fingerprint,
            component_count: components.len(),
            components,
            geometry_digest,
            text_digest,
        })
    };

    SignalResult::from_result(run.await)
}

/// Debug-only: the raw geometry trace and text render. Never reachable
/// from the report-build path.
pub fn collect_raw_for_debug() -> CompositeRaw {
    CompositeRaw {
        geometry_trace: canvas::scene_geometry_trace(),
        text_render: canvas::stipple_pattern(TEXT_SAMPLE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_composite_contains_no_raw_artifacts() {
        let result = probe().await;
        let composite = result.value().expect("collected");

        // Geometry and text components are digests, not traces.
        let geometry = composite.components.get("geometry").unwrap();
        assert_eq!(
            geometry.as_str().unwrap(),
            composite.geometry_digest.as_hex()
        );
        let text = composite.components.get("text_render").unwrap();
        assert_eq!(text.as_str().unwrap(), composite.text_digest.as_hex());

        assert_eq!(composite.component_count, composite.components.len());
    }

    #[tokio::test]
    async fn test_fingerprint_covers_components() {
        let result = probe().await;
        let composite = result.value().expect("collected");
        let recomputed = redact(&serde_json::json!(composite.components)).unwrap();
        assert_eq!(recomputed, composite.fingerprint);
    }

    #[test]
    fn test_debug_raw_matches_redacted_digests() {
        let raw = collect_raw_for_debug();
        let geometry_digest = redact_serializable(&raw.geometry_trace).unwrap();
        let text_digest = redact_serializable(&raw.text_render).unwrap();

        // The digests in the report path are derived from exactly these
        // raw values.
        let expected_geometry =
            redact_serializable(&canvas::scene_geometry_trace()).unwrap();
        let expected_text =
            redact_serializable(&canvas::stipple_pattern(TEXT_SAMPLE)).unwrap();
        assert_eq!(geometry_digest, expected_geometry);
        assert_eq!(text_digest, expected_text);
    }
}

//! Media codec support probe (on-demand).
//!
//! Interrogates the host's media stack for decoder availability. A host
//! without a media stack reports `unsupported`, which is the expected
//! capability-absent outcome, not a failure.

use crate::signal::SignalResult;
use serde::{Deserialize, Serialize};
use std::process::Command;

/// Codecs queried against the host stack.
pub const CODEC_CANDIDATES: &[&str] = &["h264", "hevc", "vp8", "vp9", "av1", "aac", "opus", "flac"];

/// Support flags for one codec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodecSupport {
    pub codec: String,
    pub supported: bool,
    pub hardware_accelerated: bool,
}

/// Decoder support matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSupport {
    /// Which media stack answered the query
    pub stack: String,
    pub decoders: Vec<CodecSupport>,
}

/// Parse `ffmpeg -decoders` output into the support matrix.
///
/// Decoder listing lines look like ` V....D h264  H.264 / AVC ...`; the
/// second column is the decoder name. Hardware variants are suffixed
/// (`h264_vaapi`, `hevc_cuvid`, ...).
pub fn parse_decoder_listing(output: &str) -> Vec<CodecSupport> {
    let decoder_names: Vec<&str> = output
        .lines()
        .skip_while(|line| !line.trim_start().starts_with("-----"))
        .skip(1)
        .filter_map(|line| line.split_whitespace().nth(1))
        .collect();

    CODEC_CANDIDATES
        .iter()
        .map(|&codec| {
            let hw_prefix = format!("{codec}_");
            CodecSupport {
                codec: codec.to_string(),
                supported: decoder_names.iter().any(|n| *n == codec),
                hardware_accelerated: decoder_names.iter().any(|n| n.starts_with(&hw_prefix)),
            }
        })
        .collect()
}

fn query_stack() -> SignalResult<MediaSupport> {
    let output = match Command::new("ffmpeg")
        .args(["-hide_banner", "-decoders"])
        .output()
    {
        Ok(output) => output,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return SignalResult::unsupported_with("no media stack (ffmpeg) on host");
        }
        Err(e) => return SignalResult::error(format!("media stack query failed: {e}")),
    };

    if !output.status.success() {
        return SignalResult::error(format!(
            "media stack query exited with {}",
            output.status
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    SignalResult::collected(MediaSupport {
        stack: "ffmpeg".to_string(),
        decoders: parse_decoder_listing(&stdout),
    })
}

/// Collect the decoder support matrix.
pub async fn probe() -> SignalResult<MediaSupport> {
    match tokio::task::spawn_blocking(query_stack).await {
        Ok(result) => result,
        Err(e) => SignalResult::error(format!("media probe task failed: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Decoders:
 V..... = Video
 A..... = Audio
 ------
 V....D h264                 H.264 / AVC / MPEG-4 AVC
 V..... h264_v4l2m2m         V4L2 mem2mem H.264 decoder wrapper
 V....D vp9                  Google VP9
 A....D aac                  AAC (Advanced Audio Coding)
 A....D opus                 Opus
";

    #[test]
    fn test_parse_decoder_listing() {
        let decoders = parse_decoder_listing(SAMPLE);
        let by_name = |name: &str| decoders.iter().find(|d| d.codec == name).unwrap();

        assert!(by_name("h264").supported);
        assert!(by_name("h264").hardware_accelerated);
        assert!(by_name("vp9").supported);
        assert!(!by_name("vp9").hardware_accelerated);
        assert!(by_name("aac").supported);
        assert!(by_name("opus").supported);
        assert!(!by_name("av1").supported);
        assert!(!by_name("hevc").supported);
    }

    #[test]
    fn test_every_candidate_present_in_matrix() {
        let decoders = parse_decoder_listing("");
        assert_eq!(decoders.len(), CODEC_CANDIDATES.len());
        assert!(decoders.iter().all(|d| !d.supported));
    }
}

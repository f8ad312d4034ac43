//! Raster artifact probe (on-demand).
//!
//! Renders a fixed test scene into a pixel buffer, encodes it as an
//! embedded PNG artifact and replaces it with a content digest. The raw
//! pixel payload is dropped before the result leaves this module; only
//! the explicitly-named debug path returns it, and the two paths never
//! share a result object.

use crate::redact::{redact_artifact, Digest};
use crate::signal::SignalResult;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

/// Fixed scene dimensions.
pub const SURFACE_WIDTH: u32 = 280;
pub const SURFACE_HEIGHT: u32 = 80;

/// Report-facing result: dimensions and the pixel digest only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasArtifact {
    pub width: u32,
    pub height: u32,
    pub digest: Digest,
}

/// Debug-only result carrying the pre-redaction artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRasterArtifact {
    pub width: u32,
    pub height: u32,
    pub data_url: String,
}

/// Raster errors.
#[derive(Debug)]
pub enum RasterError {
    Encode(String),
}

impl std::fmt::Display for RasterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RasterError::Encode(msg) => write!(f, "artifact encode error: {msg}"),
        }
    }
}

impl std::error::Error for RasterError {}

/// An owned RGBA pixel buffer with simple drawing primitives.
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    fn set(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        self.pixels[idx..idx + 4].copy_from_slice(&rgba);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, rgba: [u8; 4]) {
        for dy in 0..h as i32 {
            for dx in 0..w as i32 {
                self.set(x + dx, y + dy, rgba);
            }
        }
    }

    /// Stroke a circle outline: every pixel within 0.75px of the radius.
    pub fn stroke_circle(&mut self, cx: i32, cy: i32, r: i32, rgba: [u8; 4]) {
        for y in (cy - r - 1)..=(cy + r + 1) {
            for x in (cx - r - 1)..=(cx + r + 1) {
                let dx = (x - cx) as f64;
                let dy = (y - cy) as f64;
                let dist = (dx * dx + dy * dy).sqrt();
                if (dist - r as f64).abs() < 0.75 {
                    self.set(x, y, rgba);
                }
            }
        }
    }

    /// Stipple text as 5x7 dot glyphs derived from each character's code
    /// point. Deterministic by construction; no font stack involved.
    pub fn stipple_text(&mut self, text: &str, x: i32, y: i32, rgba: [u8; 4]) {
        for (i, ch) in text.chars().enumerate() {
            let bits = glyph_bits(ch);
            let origin_x = x + (i as i32) * 6;
            for cell in 0..35 {
                if bits >> cell & 1 == 1 {
                    self.set(origin_x + (cell % 5) as i32, y + (cell / 5) as i32, rgba);
                }
            }
        }
    }

    /// Encode as a self-describing embedded PNG payload.
    pub fn to_png_data_url(&self) -> Result<String, RasterError> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| RasterError::Encode("pixel buffer size mismatch".to_string()))?;

        let mut encoded = std::io::Cursor::new(Vec::new());
        img.write_to(&mut encoded, image::ImageFormat::Png)
            .map_err(|e| RasterError::Encode(e.to_string()))?;

        Ok(format!(
            "data:image/png;base64,{}",
            STANDARD.encode(encoded.into_inner())
        ))
    }
}

/// Deterministic 35-bit dot pattern for a character.
fn glyph_bits(ch: char) -> u64 {
    // Two rounds of integer mixing spread the code point over 35 cells.
    let mut v = (ch as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
    v ^= v >> 29;
    v = v.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    v ^= v >> 32;
    v & 0x7_ffff_ffff
}

/// Render the fixed probe scene: dark background, label text, filled
/// rectangle and circle outline.
pub fn render_probe_surface() -> RasterSurface {
    let mut surface = RasterSurface::new(SURFACE_WIDTH, SURFACE_HEIGHT);
    surface.fill_rect(0, 0, SURFACE_WIDTH, SURFACE_HEIGHT, [0x22, 0x22, 0x22, 0xff]);
    surface.stipple_text("Hostprint Raster Probe", 8, 8, [0x00, 0xff, 0xff, 0xff]);
    surface.fill_rect(140, 40, 60, 20, [0xff, 0x00, 0xff, 0xff]);
    surface.stroke_circle(230, 50, 18, [0x00, 0xff, 0x00, 0xff]);
    surface
}

/// Geometry trace of the probe scene: rectangle corners followed by
/// sampled circle points. Raw input to the composite probe's redaction.
pub fn scene_geometry_trace() -> Vec<(f64, f64)> {
    let mut trace = vec![
        (140.0, 40.0),
        (200.0, 40.0),
        (200.0, 60.0),
        (140.0, 60.0),
    ];
    for step in 0..32 {
        let angle = (step as f64) * std::f64::consts::TAU / 32.0;
        trace.push((230.0 + 18.0 * angle.cos(), 50.0 + 18.0 * angle.sin()));
    }
    trace
}

/// Serialized stipple pattern for a text, as '#'/'.' rows. Raw input to
/// the composite probe's redaction.
pub fn stipple_pattern(text: &str) -> String {
    let mut rows = vec![String::new(); 7];
    for ch in text.chars() {
        let bits = glyph_bits(ch);
        for (row, line) in rows.iter_mut().enumerate() {
            for col in 0..5 {
                let cell = row * 5 + col;
                line.push(if bits >> cell & 1 == 1 { '#' } else { '.' });
            }
            line.push(' ');
        }
    }
    rows.join("\n")
}

/// Collect the raster artifact digest. The pixel payload never leaves
/// this function.
pub async fn probe() -> SignalResult<CanvasArtifact> {
    let run = || -> Result<CanvasArtifact, Box<dyn std::error::Error>> {
        let surface = render_probe_surface();
        let data_url = surface.to_png_data_url()?;
        let digest = redact_artifact(&data_url)?;
        Ok(CanvasArtifact {
            width: SURFACE_WIDTH,
            height: SURFACE_HEIGHT,
            digest,
        })
    };
    SignalResult::from_result(run().map_err(|e| e.to_string()))
}

/// Debug-only: the pre-redaction artifact for local inspection. Never
/// called from the report-build path.
pub fn raw_artifact_for_debug() -> Result<RawRasterArtifact, RasterError> {
    let surface = render_probe_surface();
    Ok(RawRasterArtifact {
        width: SURFACE_WIDTH,
        height: SURFACE_HEIGHT,
        data_url: surface.to_png_data_url()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redact::DIGEST_HEX_LEN;

    #[test]
    fn test_scene_is_deterministic() {
        let a = render_probe_surface().to_png_data_url().unwrap();
        let b = render_probe_surface().to_png_data_url().unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_probe_digest_is_stable() {
        let first = probe().await;
        let second = probe().await;

        let first = first.value().expect("collected");
        let second = second.value().expect("collected");
        assert_eq!(first.digest, second.digest);
        assert_eq!(first.digest.as_hex().len(), DIGEST_HEX_LEN);
        assert_eq!(first.width, SURFACE_WIDTH);
        assert_eq!(first.height, SURFACE_HEIGHT);
    }

    #[test]
    fn test_debug_path_matches_probe_digest() {
        let raw = raw_artifact_for_debug().unwrap();
        let digest = redact_artifact(&raw.data_url).unwrap();

        let surface = render_probe_surface();
        let expected = redact_artifact(&surface.to_png_data_url().unwrap()).unwrap();
        assert_eq!(digest, expected);
    }

    #[test]
    fn test_stipple_pattern_shape() {
        let pattern = stipple_pattern("ab");
        let lines: Vec<&str> = pattern.lines().collect();
        assert_eq!(lines.len(), 7);
        // Two glyph columns of width 5 plus separators.
        assert!(lines.iter().all(|l| l.len() == 12));
        assert_eq!(stipple_pattern("ab"), pattern);
    }

    #[test]
    fn test_geometry_trace_is_fixed() {
        let trace = scene_geometry_trace();
        assert_eq!(trace.len(), 36);
        assert_eq!(trace[0], (140.0, 40.0));
        assert_eq!(scene_geometry_trace(), trace);
    }
}

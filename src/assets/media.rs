use std::path::{Path, PathBuf};

use crate::assets::raster::RasterImage;
use crate::foundation::error::{RgbdError, RgbdResult};

/// Video stream facts needed to sample stills out of a file.
#[derive(Clone, Debug)]
pub struct VideoSourceInfo {
    /// Probed file.
    pub source_path: PathBuf,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Container duration in seconds.
    pub duration_sec: f64,
}

impl VideoSourceInfo {
    /// Sample times used for still extraction: every whole second in `[0, duration)`.
    pub fn whole_second_samples(&self) -> Vec<f64> {
        let n = self.duration_sec.max(0.0).floor() as u64;
        (0..n).map(|s| s as f64).collect()
    }
}

/// Probe dimensions and duration of a video file with `ffprobe`.
#[cfg(feature = "media-ffmpeg")]
pub fn probe_video(source_path: &Path) -> RgbdResult<VideoSourceInfo> {
    #[derive(serde::Deserialize, Default)]
    #[serde(default)]
    struct Probe {
        streams: Vec<Dimensions>,
        format: Duration,
    }
    #[derive(serde::Deserialize, Default)]
    #[serde(default)]
    struct Dimensions {
        width: u32,
        height: u32,
    }
    #[derive(serde::Deserialize, Default)]
    #[serde(default)]
    struct Duration {
        duration: Option<String>,
    }

    // First video stream only; audio and data streams are never listed.
    let out = std::process::Command::new("ffprobe")
        .args(["-v", "error", "-select_streams", "v:0", "-of", "json"])
        .args(["-show_entries", "stream=width,height:format=duration"])
        .arg(source_path)
        .output()
        .map_err(|e| RgbdError::io("failed to run ffprobe", e))?;
    if !out.status.success() {
        return Err(RgbdError::decode(format!(
            "ffprobe rejected '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let probe: Probe = serde_json::from_slice(&out.stdout)
        .map_err(|e| RgbdError::serde(format!("unreadable ffprobe output: {e}")))?;
    let Some(dims) = probe.streams.first() else {
        return Err(RgbdError::decode(format!(
            "'{}' has no video stream",
            source_path.display()
        )));
    };
    if dims.width == 0 || dims.height == 0 {
        return Err(RgbdError::decode(format!(
            "'{}' reports a {}x{} video stream",
            source_path.display(),
            dims.width,
            dims.height
        )));
    }
    let duration_sec = probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width: dims.width,
        height: dims.height,
        duration_sec,
    })
}

/// Probe dimensions and duration of a video file with `ffprobe`.
#[cfg(not(feature = "media-ffmpeg"))]
pub fn probe_video(_source_path: &Path) -> RgbdResult<VideoSourceInfo> {
    Err(RgbdError::configuration(
        "video assets require the 'media-ffmpeg' feature",
    ))
}

/// Decode the single frame shown at `time_sec`.
#[cfg(feature = "media-ffmpeg")]
pub fn decode_still_at(source: &VideoSourceInfo, time_sec: f64) -> RgbdResult<RasterImage> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-ss", &format!("{time_sec:.9}")])
        .arg("-i")
        .arg(&source.source_path)
        .args([
            "-frames:v",
            "1",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .output()
        .map_err(|e| RgbdError::io("failed to run ffmpeg for video decode", e))?;

    if !out.status.success() {
        return Err(RgbdError::decode(format!(
            "ffmpeg still decode failed for '{}' at {time_sec}s: {}",
            source.source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let expected_len = source.width as usize * source.height as usize * 4;
    if expected_len == 0 || out.stdout.len() < expected_len {
        return Err(RgbdError::decode(format!(
            "decoded still has invalid size: got {} bytes, expected {expected_len}",
            out.stdout.len()
        )));
    }
    let mut rgba = out.stdout;
    rgba.truncate(expected_len);
    RasterImage::from_rgba8(source.width, source.height, rgba)
}

/// Decode the single frame shown at `time_sec`.
#[cfg(not(feature = "media-ffmpeg"))]
pub fn decode_still_at(_source: &VideoSourceInfo, _time_sec: f64) -> RgbdResult<RasterImage> {
    Err(RgbdError::configuration(
        "video assets require the 'media-ffmpeg' feature",
    ))
}

/// Sample one still per whole second of `path`.
pub fn extract_stills(path: &Path) -> RgbdResult<Vec<RasterImage>> {
    let info = probe_video(path)?;
    let samples = info.whole_second_samples();
    tracing::debug!(path = %path.display(), stills = samples.len(), "extracting video stills");
    samples
        .into_iter()
        .map(|t| decode_still_at(&info, t))
        .collect()
}

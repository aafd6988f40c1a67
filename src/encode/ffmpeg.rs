use std::io::Read;
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::pool::{PixelBuffer, PixelFormat};
use crate::encode::writer::{OutputSettings, VideoCodec, VideoWriter};
use crate::foundation::core::{Fps, PresentationTime};
use crate::foundation::error::{RgbdError, RgbdResult};
use crate::foundation::math::mul_div255_u16;

/// [`VideoWriter`] that spawns the system `ffmpeg` and streams raw frames to its stdin.
///
/// Produces H.264 (yuv420p) MP4 with `+faststart`.
pub struct FfmpegWriter {
    bg_rgba: [u8; 4],

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    settings: Option<OutputSettings>,
    last_pts: Option<PresentationTime>,
}

impl FfmpegWriter {
    /// Writer that flattens alpha over `bg_rgba` (straight RGBA8).
    pub fn new(bg_rgba: [u8; 4]) -> Self {
        Self {
            bg_rgba,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            settings: None,
            last_pts: None,
        }
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new([0, 0, 0, 255])
    }
}

impl VideoWriter for FfmpegWriter {
    fn check_settings(&self, settings: &OutputSettings) -> RgbdResult<()> {
        if settings.codec != VideoCodec::H264 {
            return Err(RgbdError::configuration(format!(
                "ffmpeg writer does not support codec {:?}",
                settings.codec
            )));
        }
        if settings.pixel_format != PixelFormat::Rgba8Premul {
            return Err(RgbdError::configuration(
                "ffmpeg writer expects premultiplied RGBA8 frames",
            ));
        }
        if settings.fps.num == 0 || settings.fps.den == 0 {
            return Err(RgbdError::configuration("fps must be non-zero"));
        }
        if settings.width == 0 || settings.height == 0 {
            return Err(RgbdError::configuration(
                "ffmpeg writer width/height must be non-zero",
            ));
        }
        if !settings.width.is_multiple_of(2) || !settings.height.is_multiple_of(2) {
            return Err(RgbdError::configuration(format!(
                "ffmpeg writer width/height must be even (required for yuv420p mp4 output), got {}x{}",
                settings.width, settings.height
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(RgbdError::configuration(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }
        Ok(())
    }

    fn begin(&mut self, settings: &OutputSettings) -> RgbdResult<()> {
        ensure_parent_dir(&settings.out_path)?;

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        // Input: raw RGBA8, already flattened over the background in `append`.
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", settings.width, settings.height),
        ]);
        push_input_fps(&mut cmd, settings.fps);
        cmd.args(["-i", "pipe:0"]);
        cmd.args([
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
        cmd.arg(&settings.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            RgbdError::configuration(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RgbdError::allocation("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| RgbdError::allocation("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; settings.width as usize * settings.height as usize * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.settings = Some(settings.clone());
        self.last_pts = None;
        tracing::debug!(path = %settings.out_path.display(), "ffmpeg writer started");
        Ok(())
    }

    fn append(&mut self, frame: PixelBuffer, pts: PresentationTime) -> RgbdResult<()> {
        let settings = self
            .settings
            .as_ref()
            .ok_or_else(|| RgbdError::validation("ffmpeg writer not started"))?;
        if let Some(last) = self.last_pts
            && pts <= last
        {
            return Err(RgbdError::validation(
                "ffmpeg writer received a non-increasing timestamp",
            ));
        }
        self.last_pts = Some(pts);

        if frame.width() != settings.width || frame.height() != settings.height {
            return Err(RgbdError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                settings.width,
                settings.height
            )));
        }

        flatten_premul_rows_over_bg(&mut self.scratch, &frame, self.bg_rgba)?;
        // The pool slot is free again as soon as the pixels are copied out.
        drop(frame);

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(RgbdError::validation("ffmpeg writer is already finalized"));
        };

        use std::io::Write as _;
        stdin
            .write_all(&self.scratch)
            .map_err(|e| RgbdError::io("failed to write frame to ffmpeg stdin", e))?;
        Ok(())
    }

    fn finish(&mut self) -> RgbdResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| RgbdError::validation("ffmpeg writer not started"))?;

        let status = child
            .wait()
            .map_err(|e| RgbdError::io("failed to wait for ffmpeg to finish", e))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| RgbdError::configuration("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| RgbdError::io("ffmpeg stderr read failed", e))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(RgbdError::io(
                "ffmpeg failed to write the container",
                std::io::Error::other(format!("exit status {status}: {}", stderr.trim())),
            ));
        }

        self.settings = None;
        Ok(())
    }
}

impl Drop for FfmpegWriter {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input frame rate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Flatten a strided premultiplied RGBA8 frame over `bg_rgba` into tightly packed opaque RGBA8.
fn flatten_premul_rows_over_bg(
    dst: &mut [u8],
    frame: &PixelBuffer,
    bg_rgba: [u8; 4],
) -> RgbdResult<()> {
    let tight = frame.desc().tight_row_bytes();
    if dst.len() != tight * frame.height() as usize {
        return Err(RgbdError::validation(
            "flatten_premul_rows_over_bg expects a destination of width*height*4 bytes",
        ));
    }

    let bg_r = bg_rgba[0] as u16;
    let bg_g = bg_rgba[1] as u16;
    let bg_b = bg_rgba[2] as u16;

    for (y, dst_row) in dst.chunks_exact_mut(tight).enumerate() {
        let src_row = &frame.row(y)[..tight];
        for (d, s) in dst_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
            let a = s[3] as u16;
            if a == 255 {
                d.copy_from_slice(s);
                continue;
            }

            let inv = 255u16 - a;
            d[0] = (s[0] as u16 + mul_div255_u16(bg_r, inv)).min(255) as u8;
            d[1] = (s[1] as u16 + mul_div255_u16(bg_g, inv)).min(255) as u8;
            d[2] = (s[2] as u16 + mul_div255_u16(bg_b, inv)).min(255) as u8;
            d[3] = 255;
        }
    }

    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> RgbdResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            RgbdError::io(
                format!("failed to create output directory '{}'", parent.display()),
                e,
            )
        })?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::encode::pool::{PixelBuffer, PixelBufferPool, PixelFormat, PoolOpts};
use crate::foundation::core::{Fps, PresentationTime};
use crate::foundation::error::{RgbdError, RgbdResult};

/// Output codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum VideoCodec {
    /// H.264 / AVC.
    H264,
}

/// The one canonical output configuration handed to a [`VideoWriter`].
#[derive(Clone, Debug)]
pub struct OutputSettings {
    /// Output codec.
    pub codec: VideoCodec,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frame rate.
    pub fps: Fps,
    /// Layout of the frames the writer receives.
    pub pixel_format: PixelFormat,
    /// Container file to produce.
    pub out_path: PathBuf,
}

/// Encoder-session contract: configuration check, buffer pool, ordered appends, finalize.
///
/// Ordering contract: `append` is called with strictly increasing timestamps, after `begin`
/// and before `finish`. Ownership of each buffer passes to the writer; dropping it returns the
/// storage to its pool.
pub trait VideoWriter: Send + 'static {
    /// Reject settings this writer cannot honor with [`RgbdError::Configuration`].
    fn check_settings(&self, settings: &OutputSettings) -> RgbdResult<()>;

    /// Create the pool frames are drawn into. Called once, when the session starts.
    fn create_pool(&self, settings: &OutputSettings, opts: PoolOpts) -> RgbdResult<PixelBufferPool> {
        PixelBufferPool::new(settings.width, settings.height, settings.pixel_format, opts)
    }

    /// Open the output. Called once before any frame is appended.
    fn begin(&mut self, settings: &OutputSettings) -> RgbdResult<()>;

    /// Consume one frame.
    fn append(&mut self, frame: PixelBuffer, pts: PresentationTime) -> RgbdResult<()>;

    /// Flush and close the output.
    fn finish(&mut self) -> RgbdResult<()>;
}

/// A frame captured by [`InMemoryWriter`].
#[derive(Clone, Debug)]
pub struct RecordedFrame {
    /// Timestamp the frame was appended with.
    pub pts: PresentationTime,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8, tightly packed.
    pub data: Vec<u8>,
}

#[derive(Debug, Default)]
struct RecordingState {
    settings: Option<OutputSettings>,
    frames: Vec<RecordedFrame>,
    finished: bool,
}

/// Shared view of what an [`InMemoryWriter`] received; stays readable after the writer moved
/// into an encode job.
#[derive(Clone, Debug, Default)]
pub struct Recording {
    state: Arc<Mutex<RecordingState>>,
}

impl Recording {
    fn with<R>(&self, f: impl FnOnce(&RecordingState) -> R) -> R {
        match self.state.lock() {
            Ok(st) => f(&st),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    /// Settings passed to `begin`, if it was called.
    pub fn settings(&self) -> Option<OutputSettings> {
        self.with(|st| st.settings.clone())
    }

    /// Frames in append order.
    pub fn frames(&self) -> Vec<RecordedFrame> {
        self.with(|st| st.frames.clone())
    }

    /// Number of frames appended.
    pub fn frame_count(&self) -> usize {
        self.with(|st| st.frames.len())
    }

    /// Whether `finish` was called.
    pub fn is_finished(&self) -> bool {
        self.with(|st| st.finished)
    }

    /// Whether `begin` was called.
    pub fn is_started(&self) -> bool {
        self.with(|st| st.settings.is_some())
    }
}

/// In-memory writer for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemoryWriter {
    recording: Recording,
    last_pts: Option<PresentationTime>,
}

impl InMemoryWriter {
    /// Create a new in-memory writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle onto the captured frames.
    pub fn recording(&self) -> Recording {
        self.recording.clone()
    }

    fn state(&self) -> RgbdResult<std::sync::MutexGuard<'_, RecordingState>> {
        self.recording
            .state
            .lock()
            .map_err(|_| RgbdError::allocation("in-memory recording lock poisoned"))
    }
}

impl VideoWriter for InMemoryWriter {
    fn check_settings(&self, settings: &OutputSettings) -> RgbdResult<()> {
        if settings.width == 0 || settings.height == 0 {
            return Err(RgbdError::configuration(
                "output width/height must be non-zero",
            ));
        }
        Ok(())
    }

    fn begin(&mut self, settings: &OutputSettings) -> RgbdResult<()> {
        let mut st = self.state()?;
        st.settings = Some(settings.clone());
        st.frames.clear();
        st.finished = false;
        drop(st);
        self.last_pts = None;
        Ok(())
    }

    fn append(&mut self, frame: PixelBuffer, pts: PresentationTime) -> RgbdResult<()> {
        if let Some(last) = self.last_pts
            && pts <= last
        {
            return Err(RgbdError::validation(
                "in-memory writer received a non-increasing timestamp",
            ));
        }
        self.last_pts = Some(pts);

        let recorded = RecordedFrame {
            pts,
            width: frame.width(),
            height: frame.height(),
            data: frame.to_tight_vec(),
        };
        self.state()?.frames.push(recorded);
        Ok(())
    }

    fn finish(&mut self) -> RgbdResult<()> {
        self.state()?.finished = true;
        Ok(())
    }
}

use crate::encode::pool::{PixelBuffer, PixelBufferPool, PoolOpts};
use crate::encode::writer::{OutputSettings, VideoWriter};
use crate::foundation::core::{FrameIndex, PresentationTime};
use crate::foundation::error::{RgbdError, RgbdResult};

/// Lifecycle of an [`EncoderSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Settings accepted, output not opened yet.
    Configured,
    /// Output open, accepting frames.
    Writing,
    /// Finalized successfully.
    Finished,
    /// Finalize failed; the output is invalid.
    Failed,
}

/// One encode's writer, pool and bookkeeping. Not reusable after [`EncoderSession::finish`].
pub struct EncoderSession<W: VideoWriter> {
    writer: W,
    settings: OutputSettings,
    pool: Option<PixelBufferPool>,
    state: SessionState,
    frames_appended: u64,
    last_pts: Option<PresentationTime>,
}

impl<W: VideoWriter> EncoderSession<W> {
    /// Configure a session; fails with [`RgbdError::Configuration`] when `writer` rejects
    /// `settings`.
    pub fn new(writer: W, settings: OutputSettings) -> RgbdResult<Self> {
        writer.check_settings(&settings)?;
        Ok(Self {
            writer,
            settings,
            pool: None,
            state: SessionState::Configured,
            frames_appended: 0,
            last_pts: None,
        })
    }

    /// Output settings.
    pub fn settings(&self) -> &OutputSettings {
        &self.settings
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Frames successfully appended so far.
    pub fn frames_appended(&self) -> u64 {
        self.frames_appended
    }

    /// Create the session pool and open the output.
    ///
    /// Returns a handle to the pool for the producer; the pool stays owned by the session.
    pub fn start(&mut self, opts: PoolOpts) -> RgbdResult<PixelBufferPool> {
        if self.state != SessionState::Configured {
            return Err(RgbdError::configuration(format!(
                "encoder session cannot start from state {:?}",
                self.state
            )));
        }
        let pool = self.writer.create_pool(&self.settings, opts)?;
        let desc = pool.desc();
        if desc.width != self.settings.width
            || desc.height != self.settings.height
            || desc.format != self.settings.pixel_format
        {
            return Err(RgbdError::allocation(
                "writer created a pool that does not match the output settings",
            ));
        }
        self.writer.begin(&self.settings)?;
        self.pool = Some(pool.clone());
        self.state = SessionState::Writing;
        Ok(pool)
    }

    /// Hand `frame` to the writer as frame `idx`. Every failure is reported as
    /// [`RgbdError::Append`] for `idx`.
    pub fn append(
        &mut self,
        idx: FrameIndex,
        frame: PixelBuffer,
        pts: PresentationTime,
    ) -> RgbdResult<()> {
        self.append_inner(frame, pts)
            .map_err(|e| e.into_append(idx.0))
    }

    fn append_inner(&mut self, frame: PixelBuffer, pts: PresentationTime) -> RgbdResult<()> {
        if self.state != SessionState::Writing {
            return Err(RgbdError::validation(format!(
                "encoder session is not accepting frames (state {:?})",
                self.state
            )));
        }
        if let Some(last) = self.last_pts
            && pts <= last
        {
            return Err(RgbdError::validation(format!(
                "timestamp {:.6}s does not follow {:.6}s",
                pts.as_secs_f64(),
                last.as_secs_f64()
            )));
        }
        if frame.width() != self.settings.width || frame.height() != self.settings.height {
            return Err(RgbdError::validation(format!(
                "frame is {}x{}, session expects {}x{}",
                frame.width(),
                frame.height(),
                self.settings.width,
                self.settings.height
            )));
        }

        self.writer.append(frame, pts)?;
        self.last_pts = Some(pts);
        self.frames_appended += 1;
        Ok(())
    }

    /// Mark input finished and finalize the output.
    pub fn finish(&mut self) -> RgbdResult<()> {
        if self.state != SessionState::Writing {
            return Err(RgbdError::validation(format!(
                "encoder session cannot finish from state {:?}",
                self.state
            )));
        }
        self.pool = None;
        match self.writer.finish() {
            Ok(()) => {
                self.state = SessionState::Finished;
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/session.rs"]
mod tests;

use crate::compose::draw::ResizeFilter;
use crate::encode::pool::PoolOpts;
use crate::foundation::core::Fps;
use crate::foundation::error::{RgbdError, RgbdResult};

/// Options for [`crate::FrameSequenceEncoder`].
///
/// Missing fields take their defaults when parsed from JSON.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncoderOpts {
    /// Output frame rate; frame `i` is presented at `i / fps`.
    pub fps: Fps,
    /// Frames that may wait between the producer and the encoder worker.
    pub queue_depth: usize,
    /// Pixel buffers in the session pool; must exceed `queue_depth`.
    pub pool_capacity: usize,
    /// Row alignment of pooled buffers in bytes (power of two).
    pub row_alignment: usize,
    /// Resampling filter for aspect-fit scaling.
    pub filter: ResizeFilter,
    /// Straight RGBA8 colour that letterbox bars and transparency flatten onto.
    pub background_rgba: [u8; 4],
}

impl Default for EncoderOpts {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            queue_depth: 3,
            pool_capacity: 5,
            row_alignment: 64,
            filter: ResizeFilter::default(),
            background_rgba: [0, 0, 0, 255],
        }
    }
}

impl EncoderOpts {
    /// Check option consistency.
    pub fn validate(&self) -> RgbdResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        if self.queue_depth == 0 {
            return Err(RgbdError::validation("queue_depth must be >= 1"));
        }
        // One buffer may be held by the encoder while `queue_depth` more are queued or drawn.
        if self.pool_capacity <= self.queue_depth {
            return Err(RgbdError::validation(format!(
                "pool_capacity ({}) must exceed queue_depth ({})",
                self.pool_capacity, self.queue_depth
            )));
        }
        if self.row_alignment > 1 && !self.row_alignment.is_power_of_two() {
            return Err(RgbdError::validation(format!(
                "row_alignment ({}) must be a power of two",
                self.row_alignment
            )));
        }
        Ok(())
    }

    /// Parse and validate options from JSON.
    pub fn from_json_str(s: &str) -> RgbdResult<Self> {
        let opts: Self = serde_json::from_str(s)
            .map_err(|e| RgbdError::serde(format!("invalid encoder options: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    pub(crate) fn pool_opts(&self) -> PoolOpts {
        PoolOpts {
            capacity: self.pool_capacity,
            row_alignment: self.row_alignment,
        }
    }
}

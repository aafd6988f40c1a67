use std::cmp::Ordering;

use crate::foundation::error::{RgbdError, RgbdResult};

pub use kurbo::{Point, Rect, Size};

/// Absolute 0-based frame index in output timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> RgbdResult<Self> {
        if den == 0 {
            return Err(RgbdError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(RgbdError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Canvas size as floating-point geometry.
    pub fn size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

/// Rational presentation timestamp: `value / timescale` seconds.
///
/// Equality and ordering compare the rational value, so `1/30` and `2/60` are equal.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct PresentationTime {
    /// Tick count.
    pub value: i64,
    /// Ticks per second, always > 0.
    pub timescale: u32,
}

impl PresentationTime {
    /// Time zero.
    pub const ZERO: Self = Self {
        value: 0,
        timescale: 1,
    };

    /// Create a timestamp of `value / timescale` seconds.
    pub fn new(value: i64, timescale: u32) -> RgbdResult<Self> {
        if timescale == 0 {
            return Err(RgbdError::validation("PresentationTime timescale must be > 0"));
        }
        Ok(Self { value, timescale })
    }

    /// Timestamp of frame `idx` at `fps`: exactly `idx / fps` seconds.
    pub fn for_frame(idx: FrameIndex, fps: Fps) -> Self {
        let value = i64::try_from(idx.0)
            .unwrap_or(i64::MAX)
            .saturating_mul(i64::from(fps.den));
        Self {
            value,
            timescale: fps.num.max(1),
        }
    }

    /// Convert to seconds.
    pub fn as_secs_f64(self) -> f64 {
        (self.value as f64) / f64::from(self.timescale)
    }
}

impl PartialEq for PresentationTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PresentationTime {}

impl PartialOrd for PresentationTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PresentationTime {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = i128::from(self.value) * i128::from(other.timescale);
        let rhs = i128::from(other.value) * i128::from(self.timescale);
        lhs.cmp(&rhs)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

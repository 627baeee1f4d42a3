use crate::foundation::error::{RecalcError, RecalcResult};

pub use kurbo::{Point, Vec2};

/// Absolute 0-based frame index in timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Rational frames-per-second value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator.
    pub num: u32,
    /// Denominator (must be > 0).
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> RecalcResult<Self> {
        if den == 0 {
            return Err(RecalcError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(RecalcError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Return FPS as floating-point value.
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

    /// Convert seconds to frame count using floor rounding.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Canvas width.
    pub width: u32,
    /// Canvas height.
    pub height: u32,
}

impl Canvas {
    /// Validate that both dimensions are non-zero.
    pub fn validate(self) -> RecalcResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RecalcError::validation("canvas width/height must be non-zero"));
        }
        Ok(())
    }

    /// Canvas size as a vector, `(width, height)`.
    pub fn size(self) -> Vec2 {
        Vec2::new(f64::from(self.width), f64::from(self.height))
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

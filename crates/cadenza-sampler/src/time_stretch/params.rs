//! Time-stretch and pitch-scale parameters.

use cadenza_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Time-stretch and pitch-scale parameters
///
/// ## Range Limits
///
/// Both ratios must lie in [`MIN_RATIO`](Self::MIN_RATIO) to
/// [`MAX_RATIO`](Self::MAX_RATIO), i.e. 1/256 to 256.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeStretchParams {
    /// Output duration over input duration (2.0 = twice as long).
    pub time_ratio: f64,

    /// Frequency multiplier (2.0 = one octave up).
    pub pitch_scale: f64,
}

impl TimeStretchParams {
    pub const MIN_RATIO: f64 = 1.0 / 256.0;
    pub const MAX_RATIO: f64 = 256.0;

    /// Neutral parameters (no effect).
    pub const fn new() -> Self {
        Self {
            time_ratio: 1.0,
            pitch_scale: 1.0,
        }
    }

    pub fn with_time_ratio(mut self, ratio: f64) -> Self {
        self.time_ratio = ratio;
        self
    }

    pub fn with_pitch_scale(mut self, scale: f64) -> Self {
        self.pitch_scale = scale;
        self
    }

    /// Whether `ratio` is an accepted time ratio or pitch scale.
    #[inline]
    pub fn is_valid_ratio(ratio: f64) -> bool {
        (Self::MIN_RATIO..=Self::MAX_RATIO).contains(&ratio)
    }

    /// Fail with [`Error::InvalidState`] when either ratio is out of range.
    pub fn validate(&self) -> Result<()> {
        if !Self::is_valid_ratio(self.time_ratio) {
            return Err(Error::invalid_state(format!(
                "time ratio {} outside [1/256, 256]",
                self.time_ratio
            )));
        }
        if !Self::is_valid_ratio(self.pitch_scale) {
            return Err(Error::invalid_state(format!(
                "pitch scale {} outside [1/256, 256]",
                self.pitch_scale
            )));
        }
        Ok(())
    }

    /// Check if any time-stretching/pitch-scaling is active
    pub fn is_active(&self) -> bool {
        (self.time_ratio - 1.0).abs() > 1e-9 || (self.pitch_scale - 1.0).abs() > 1e-9
    }
}

impl Default for TimeStretchParams {
    fn default() -> Self {
        Self::new()
    }
}

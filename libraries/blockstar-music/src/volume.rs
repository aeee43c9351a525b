//! Volume setting and player gain
//!
//! Volume is a 0-100% setting scaled linearly against the device's maximum
//! music stream gain.

use crate::error::{MusicError, Result};

/// Default volume setting (percent)
pub const DEFAULT_VOLUME_PERCENT: u8 = 100;

/// Volume setting with its derived player gain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    /// Volume setting (0-100)
    percent: u8,

    /// Maximum gain reported by the host audio service
    max_gain: f32,

    /// Cached gain applied to native players
    gain: f32,
}

impl Volume {
    /// Create a volume setting against the device maximum
    pub fn new(max_gain: f32, percent: u8) -> Result<Self> {
        let max_gain = sanitize_max_gain(max_gain);
        Ok(Self {
            percent,
            max_gain,
            gain: player_gain(max_gain, percent)?,
        })
    }

    /// Change the volume setting
    ///
    /// Leaves the current setting untouched when `percent` is out of range.
    pub fn set_percent(&mut self, percent: u8) -> Result<()> {
        self.gain = player_gain(self.max_gain, percent)?;
        self.percent = percent;
        Ok(())
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Gain to apply to native players, in `[0, max_gain]`
    pub fn gain(&self) -> f32 {
        self.gain
    }
}

/// Validate a volume percent
pub fn check_percent(percent: u8) -> Result<()> {
    if percent > 100 {
        return Err(MusicError::invalid_argument(format!(
            "volume must be between 0 and 100 percent, got {}",
            percent
        )));
    }
    Ok(())
}

/// Scale the device maximum gain by a volume percent
///
/// Formula: gain = max_gain * percent / 100
/// - 0%   → 0.0
/// - 50%  → max_gain / 2
/// - 100% → max_gain
pub fn player_gain(max_gain: f32, percent: u8) -> Result<f32> {
    check_percent(percent)?;
    let max_gain = sanitize_max_gain(max_gain);
    Ok((max_gain * f32::from(percent) / 100.0).clamp(0.0, max_gain))
}

// Hosts occasionally report garbage for an unavailable stream.
fn sanitize_max_gain(max_gain: f32) -> f32 {
    if max_gain.is_finite() && max_gain > 0.0 {
        max_gain
    } else {
        0.0
    }
}

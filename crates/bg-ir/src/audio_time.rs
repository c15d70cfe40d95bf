//! Audio-clock time.

use core::ops::{Add, Sub};

/// A position on the audio device clock, in seconds since the device opened.
///
/// The audio clock advances with rendered frames, so a time maps to a frame
/// index at a given sample rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct AudioTime(pub f64);

impl AudioTime {
    /// The clock origin.
    pub const ZERO: AudioTime = AudioTime(0.0);

    /// Create a time from seconds.
    pub const fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    /// Time of the given frame index.
    pub fn from_frames(frames: u64, sample_rate: u32) -> Self {
        Self(frames as f64 / sample_rate as f64)
    }

    /// Seconds since the clock origin.
    pub const fn as_secs(self) -> f64 {
        self.0
    }

    /// First frame index at or after this time. Negative times map to 0.
    pub fn to_frames(self, sample_rate: u32) -> u64 {
        let frames = libm::ceil(self.0 * sample_rate as f64);
        if frames <= 0.0 {
            0
        } else {
            frames as u64
        }
    }

    /// Seconds from `earlier` to `self`, or zero if `earlier` is later.
    pub fn saturating_since(self, earlier: AudioTime) -> f64 {
        let d = self.0 - earlier.0;
        if d > 0.0 {
            d
        } else {
            0.0
        }
    }
}

impl Add<f64> for AudioTime {
    type Output = AudioTime;

    fn add(self, secs: f64) -> AudioTime {
        AudioTime(self.0 + secs)
    }
}

impl Sub for AudioTime {
    type Output = f64;

    fn sub(self, rhs: AudioTime) -> f64 {
        self.0 - rhs.0
    }
}

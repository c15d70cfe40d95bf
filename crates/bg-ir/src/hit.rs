//! Scheduled instrument triggers.

use crate::audio_time::AudioTime;
use crate::instrument::Instrument;

/// One instrument trigger at an absolute audio-clock time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// When the sound starts on the audio clock.
    pub time: AudioTime,
    /// What to play.
    pub instrument: Instrument,
}

impl Hit {
    /// Create a new hit.
    pub fn new(time: AudioTime, instrument: Instrument) -> Self {
        Self { time, instrument }
    }
}

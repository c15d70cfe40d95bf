//! Audio device seam and error types.

use bg_ir::{AudioTime, Hit};
use thiserror::Error;

use crate::noise::NoiseBuffer;

/// Error type for audio operations.
#[derive(Debug, Error)]
pub enum AudioError {
    /// No audio device available
    #[error("no audio device available")]
    NoDevice,
    /// Failed to initialize audio device
    #[error("device init error: {0}")]
    DeviceInit(String),
    /// Failed to create audio stream
    #[error("stream create error: {0}")]
    StreamCreate(String),
    /// Playback error
    #[error("playback error: {0}")]
    Playback(String),
    /// The device could not accept another hit
    #[error("hit queue full")]
    QueueFull,
}

/// An opened audio output that owns the audio clock.
pub trait AudioDevice {
    /// Output sample rate.
    fn sample_rate(&self) -> u32;

    /// Current audio-clock time.
    fn current_time(&self) -> AudioTime;

    /// Start (or restart) the clock. Devices may open suspended.
    fn resume(&mut self) -> Result<(), AudioError>;

    /// Install the shared noise buffer for noise voices.
    fn load_noise(&mut self, noise: NoiseBuffer);

    /// Fire-and-forget trigger of one hit at its audio-clock time.
    fn trigger(&mut self, hit: Hit) -> Result<(), AudioError>;
}

/// Opens audio devices on demand.
pub trait AudioHost {
    type Device: AudioDevice;

    /// Open the output device.
    fn open(&mut self) -> Result<Self::Device, AudioError>;
}

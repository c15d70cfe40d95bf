//! Offline backend: renders on demand instead of in real time.
//!
//! The audio clock only moves when the owner renders frames, which makes
//! sessions deterministic for export and testing.

use bg_engine::{AudioDevice, AudioError, AudioHost, Frame, Mixer, NoiseBuffer};
use bg_ir::{AudioTime, Hit};

/// Opens [`OfflineDevice`]s at a fixed sample rate.
#[derive(Clone, Copy, Debug)]
pub struct OfflineHost {
    sample_rate: u32,
    available: bool,
}

impl OfflineHost {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            available: true,
        }
    }

    /// A host with no audio output: every `open` fails.
    pub fn unavailable() -> Self {
        Self {
            sample_rate: 0,
            available: false,
        }
    }
}

impl AudioHost for OfflineHost {
    type Device = OfflineDevice;

    fn open(&mut self) -> Result<OfflineDevice, AudioError> {
        if !self.available {
            return Err(AudioError::NoDevice);
        }
        Ok(OfflineDevice::new(self.sample_rate))
    }
}

/// A device whose clock is the number of frames rendered so far.
pub struct OfflineDevice {
    mixer: Mixer,
    hits: Vec<Hit>,
    resumed: bool,
}

impl OfflineDevice {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            mixer: Mixer::new(sample_rate),
            hits: Vec::new(),
            resumed: false,
        }
    }

    /// Every hit accepted so far, in trigger order.
    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    /// Has `resume` been called?
    pub fn is_resumed(&self) -> bool {
        self.resumed
    }

    /// Render and append frames until the clock reaches `frame`.
    pub fn render_until(&mut self, frame: u64, out: &mut Vec<Frame>) {
        while self.mixer.frames_rendered() < frame {
            out.push(self.mixer.render_frame());
        }
    }

    /// Frames rendered so far.
    pub fn frames_rendered(&self) -> u64 {
        self.mixer.frames_rendered()
    }

    /// Nothing sounding and nothing pending?
    pub fn is_idle(&self) -> bool {
        self.mixer.is_idle()
    }
}

impl AudioDevice for OfflineDevice {
    fn sample_rate(&self) -> u32 {
        self.mixer.sample_rate()
    }

    fn current_time(&self) -> AudioTime {
        self.mixer.now()
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        self.resumed = true;
        Ok(())
    }

    fn load_noise(&mut self, noise: NoiseBuffer) {
        self.mixer.set_noise(noise);
    }

    fn trigger(&mut self, hit: Hit) -> Result<(), AudioError> {
        if !self.mixer.schedule(hit) {
            return Err(AudioError::QueueFull);
        }
        self.hits.push(hit);
        Ok(())
    }
}

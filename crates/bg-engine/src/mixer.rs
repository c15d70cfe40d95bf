//! Frame renderer: the audio side of the engine.

use bg_ir::{AudioTime, Hit, Instrument, Source};

use crate::frame::Frame;
use crate::hit_queue::HitQueue;
use crate::noise::NoiseBuffer;
use crate::voice::{highpass_cutoff, Voice};
use crate::voice_pool::VoicePool;

/// Renders scheduled hits into frames.
///
/// The count of rendered frames is the audio clock: a hit scheduled at
/// time T starts on the first frame at or after T. Rendering never
/// allocates, so this can run inside a device callback.
pub struct Mixer {
    /// Output sample rate
    sample_rate: u32,
    /// Shared noise for noise voices
    noise: Option<NoiseBuffer>,
    /// Hits waiting for their start frame
    pending: HitQueue,
    /// Sounding voices
    voices: VoicePool,
    /// Frames rendered so far
    frame: u64,
    /// Hits dropped because the pending queue or the voice pool was full
    dropped: u64,
}

impl Mixer {
    /// Create a mixer at the given sample rate.
    pub fn new(sample_rate: u32) -> Self {
        warn_lowered_cutoffs(sample_rate);
        Self {
            sample_rate,
            noise: None,
            pending: HitQueue::new(),
            voices: VoicePool::new(),
            frame: 0,
            dropped: 0,
        }
    }

    /// Install the noise buffer used by noise voices.
    pub fn set_noise(&mut self, noise: NoiseBuffer) {
        self.noise = Some(noise);
    }

    /// Queue a hit. Hits already in the past start on the next frame.
    ///
    /// Returns false if the hit was dropped.
    pub fn schedule(&mut self, hit: Hit) -> bool {
        let start = hit.time.to_frames(self.sample_rate);
        let queued = self.pending.push(start, hit);
        if !queued {
            self.dropped += 1;
        }
        queued
    }

    /// Generate one frame of audio.
    pub fn render_frame(&mut self) -> Frame {
        // 1. Start hits that are due
        while let Some((start, hit)) = self.pending.pop_due(self.frame) {
            let voice = Voice::new(hit.instrument, start, self.sample_rate);
            if self.voices.allocate(voice).is_none() {
                self.dropped += 1;
            }
        }

        // 2. Sum voices
        let noise = self.noise.as_ref().map_or(&[][..], |n| n.samples());
        let sample = self.voices.render(noise, self.sample_rate as f32);

        // 3. Advance the clock
        self.frame += 1;

        Frame::from_f32(sample)
    }

    /// Fill `out` with rendered frames.
    pub fn render_into(&mut self, out: &mut [Frame]) {
        for frame in out.iter_mut() {
            *frame = self.render_frame();
        }
    }

    /// Current position of the audio clock.
    pub fn now(&self) -> AudioTime {
        AudioTime::from_frames(self.frame, self.sample_rate)
    }

    /// Frames rendered so far.
    pub fn frames_rendered(&self) -> u64 {
        self.frame
    }

    /// Output sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of sounding voices.
    pub fn active_voices(&self) -> usize {
        self.voices.active_count()
    }

    /// Number of hits not yet started.
    pub fn pending_hits(&self) -> usize {
        self.pending.len()
    }

    /// Hits dropped because the pending queue or the voice pool was full.
    pub fn dropped_hits(&self) -> u64 {
        self.dropped
    }

    /// Nothing sounding and nothing pending?
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.voices.active_count() == 0
    }
}

/// Noise voices cannot filter above Nyquist; say so once, up front,
/// since the render path never logs.
fn warn_lowered_cutoffs(sample_rate: u32) {
    for instrument in [Instrument::Snare, Instrument::HiHat] {
        if let Source::Noise { highpass_hz } = instrument.patch().source {
            let cutoff = highpass_cutoff(highpass_hz, sample_rate);
            if cutoff < highpass_hz {
                log::warn!(
                    "{} highpass lowered from {} Hz to {:.0} Hz at {} Hz sample rate",
                    instrument.name(),
                    highpass_hz,
                    cutoff,
                    sample_rate
                );
            }
        }
    }
}

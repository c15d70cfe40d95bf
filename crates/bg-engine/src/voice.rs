//! Voice: one short-lived synthesis graph for a single hit.

use bg_ir::{Instrument, Patch, Source, Waveform};
use biquad::{Biquad, Coefficients, DirectForm2Transposed, Hertz, Q_BUTTERWORTH_F32};
use core::f32::consts::TAU;

/// A single voice rendering one instrument trigger.
///
/// Voices are never reused: each hit builds a fresh one, and it stops
/// itself once its patch duration has elapsed.
pub struct Voice {
    /// Synthesis recipe.
    patch: Patch,
    /// Frame index at which the voice started.
    start_frame: u64,
    /// Frames rendered so far.
    elapsed: u32,
    /// Length in frames.
    duration_frames: u32,
    /// Oscillator phase in cycles (0..1).
    phase: f32,
    /// Highpass for noise sources.
    filter: Option<DirectForm2Transposed<f32>>,
    /// Is the voice still producing audio?
    playing: bool,
}

impl Voice {
    /// Create a voice for `instrument` starting at `start_frame`.
    pub fn new(instrument: Instrument, start_frame: u64, sample_rate: u32) -> Self {
        let patch = instrument.patch();
        let duration_frames = (patch.duration * sample_rate as f32).round() as u32;
        let filter = match patch.source {
            Source::Noise { highpass_hz } => highpass(highpass_hz, sample_rate),
            Source::Oscillator { .. } => None,
        };
        Self {
            patch,
            start_frame,
            elapsed: 0,
            duration_frames,
            phase: 0.0,
            filter,
            playing: true,
        }
    }

    /// Render one sample, reading noise from `noise` for noise sources.
    pub fn render(&mut self, noise: &[f32], sample_rate: f32) -> f32 {
        if !self.playing {
            return 0.0;
        }
        if self.elapsed >= self.duration_frames {
            self.playing = false;
            return 0.0;
        }

        let t = self.elapsed as f32 / sample_rate;
        let raw = match &self.patch.source {
            Source::Oscillator { waveform, frequency } => {
                let value = oscillate(*waveform, self.phase);
                self.phase = (self.phase + frequency.value_at(t) / sample_rate).fract();
                value
            }
            Source::Noise { .. } => {
                // The buffer plays once; past its end the source is silent
                let value = noise.get(self.elapsed as usize).copied().unwrap_or(0.0);
                // Unfiltered noise is never played
                match self.filter.as_mut() {
                    Some(filter) => filter.run(value),
                    None => 0.0,
                }
            }
        };

        self.elapsed += 1;
        raw * self.patch.gain.value_at(t)
    }

    /// Frame index at which the voice started.
    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }

    /// Is the voice still producing audio?
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Length in frames.
    pub fn duration_frames(&self) -> u32 {
        self.duration_frames
    }
}

/// Highest usable highpass cutoff as a fraction of the sample rate.
const MAX_CUTOFF_RATIO: f32 = 0.45;

/// The cutoff actually used for a `cutoff` Hz highpass at `sample_rate`:
/// kept just below Nyquist so the filter can always be built.
pub(crate) fn highpass_cutoff(cutoff: f32, sample_rate: u32) -> f32 {
    cutoff.min(sample_rate as f32 * MAX_CUTOFF_RATIO)
}

fn highpass(cutoff: f32, sample_rate: u32) -> Option<DirectForm2Transposed<f32>> {
    let fs = Hertz::<f32>::from_hz(sample_rate as f32).ok()?;
    let f0 = Hertz::<f32>::from_hz(highpass_cutoff(cutoff, sample_rate)).ok()?;
    Coefficients::<f32>::from_params(biquad::Type::HighPass, fs, f0, Q_BUTTERWORTH_F32)
        .ok()
        .map(DirectForm2Transposed::<f32>::new)
}

/// One sample of `waveform` at `phase` cycles. All shapes start at the
/// zero crossing except the square, which starts high.
fn oscillate(waveform: Waveform, phase: f32) -> f32 {
    match waveform {
        Waveform::Sine => (phase * TAU).sin(),
        Waveform::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Triangle => {
            if phase < 0.25 {
                4.0 * phase
            } else if phase < 0.75 {
                2.0 - 4.0 * phase
            } else {
                4.0 * phase - 4.0
            }
        }
    }
}

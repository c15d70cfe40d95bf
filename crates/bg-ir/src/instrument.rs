//! Instruments and their synthesis recipes.

use crate::envelope::Envelope;

/// Bass pitch during the first loop of a round (C3).
pub const BASS_LOOP_ONE_HZ: f32 = 130.81;
/// Bass pitch during the second loop of a round (G3, a fifth up).
pub const BASS_LOOP_TWO_HZ: f32 = 196.00;

const STICK_HZ: f32 = 800.0;
const STICK_ACCENT_HZ: f32 = 1200.0;

/// A sound the engine can trigger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Instrument {
    /// Pitch-swept sine kick.
    Kick,
    /// Noise through a 1 kHz highpass.
    Snare,
    /// Noise through a 5 kHz highpass.
    HiHat,
    /// Sustained triangle note.
    Bass { frequency: f32 },
    /// Short square click; `accent` raises the pitch.
    Stick { accent: bool },
}

/// Oscillator waveform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
}

/// Signal source of a voice.
#[derive(Clone, Debug, PartialEq)]
pub enum Source {
    /// Periodic oscillator with a (possibly swept) frequency in Hz.
    Oscillator { waveform: Waveform, frequency: Envelope },
    /// The shared noise buffer through a highpass filter.
    Noise { highpass_hz: f32 },
}

/// Full synthesis recipe for one trigger.
#[derive(Clone, Debug, PartialEq)]
pub struct Patch {
    pub source: Source,
    /// Output gain over time.
    pub gain: Envelope,
    /// Seconds until the voice stops itself.
    pub duration: f32,
}

impl Instrument {
    /// The synthesis recipe for this instrument.
    pub fn patch(self) -> Patch {
        match self {
            Instrument::Kick => Patch {
                source: Source::Oscillator {
                    waveform: Waveform::Sine,
                    frequency: Envelope::constant(150.0).exponential_to(0.01, 0.5),
                },
                gain: Envelope::constant(1.0).exponential_to(0.001, 0.5),
                duration: 0.5,
            },
            Instrument::Snare => Patch {
                source: Source::Noise { highpass_hz: 1000.0 },
                gain: Envelope::constant(0.8).exponential_to(0.01, 0.2),
                duration: 0.2,
            },
            Instrument::HiHat => Patch {
                source: Source::Noise { highpass_hz: 5000.0 },
                gain: Envelope::constant(0.3).exponential_to(0.01, 0.05),
                duration: 0.05,
            },
            Instrument::Bass { frequency } => Patch {
                source: Source::Oscillator {
                    waveform: Waveform::Triangle,
                    frequency: Envelope::constant(frequency),
                },
                gain: Envelope::constant(0.4)
                    .linear_to(0.3, 0.1)
                    .exponential_to(0.001, 0.3),
                duration: 0.3,
            },
            Instrument::Stick { accent } => Patch {
                source: Source::Oscillator {
                    waveform: Waveform::Square,
                    frequency: Envelope::constant(if accent { STICK_ACCENT_HZ } else { STICK_HZ }),
                },
                gain: Envelope::constant(0.1).exponential_to(0.001, 0.05),
                duration: 0.05,
            },
        }
    }

    /// Bass note for the given loop of a round.
    pub fn bass_for_loop(current_loop: u32) -> Self {
        let frequency = if current_loop == 1 { BASS_LOOP_ONE_HZ } else { BASS_LOOP_TWO_HZ };
        Instrument::Bass { frequency }
    }

    /// Short display name.
    pub fn name(self) -> &'static str {
        match self {
            Instrument::Kick => "kick",
            Instrument::Snare => "snare",
            Instrument::HiHat => "hihat",
            Instrument::Bass { .. } => "bass",
            Instrument::Stick { accent: false } => "stick",
            Instrument::Stick { accent: true } => "stick-accent",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_match_gain_envelopes() {
        let all = [
            Instrument::Kick,
            Instrument::Snare,
            Instrument::HiHat,
            Instrument::bass_for_loop(1),
            Instrument::Stick { accent: false },
        ];
        for inst in all {
            let patch = inst.patch();
            let last = patch.gain.segments.last().unwrap();
            assert_eq!(last.end, patch.duration, "{}", inst.name());
        }
    }

    #[test]
    fn kick_sweeps_down() {
        let Source::Oscillator { frequency, .. } = Instrument::Kick.patch().source else {
            panic!("kick is an oscillator");
        };
        assert_eq!(frequency.value_at(0.0), 150.0);
        assert!(frequency.value_at(0.25) < 2.0);
    }

    #[test]
    fn stick_accent_is_higher() {
        let freq = |accent| match (Instrument::Stick { accent }).patch().source {
            Source::Oscillator { frequency, .. } => frequency.start,
            Source::Noise { .. } => unreachable!(),
        };
        assert_eq!(freq(false), 800.0);
        assert_eq!(freq(true), 1200.0);
    }

    #[test]
    fn bass_pitch_follows_loop() {
        assert_eq!(Instrument::bass_for_loop(1), Instrument::Bass { frequency: 130.81 });
        assert_eq!(Instrument::bass_for_loop(2), Instrument::Bass { frequency: 196.0 });
    }

    #[test]
    fn noise_cutoffs() {
        assert_eq!(Instrument::Snare.patch().source, Source::Noise { highpass_hz: 1000.0 });
        assert_eq!(Instrument::HiHat.patch().source, Source::Noise { highpass_hz: 5000.0 });
    }
}

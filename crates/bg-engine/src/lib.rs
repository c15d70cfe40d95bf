//! Look-ahead beat scheduler and synthesis engine for beatgrid.
//!
//! The [`BeatEngine`] walks the audio clock forward one beat at a time,
//! triggering synthesized hits ahead of when they are audible and deferring
//! the matching state snapshot to a wall-clock timer so the UI sees it as
//! the sound plays. The [`Mixer`] renders those hits into frames on the
//! audio side.

mod device;
mod frame;
mod hit_queue;
mod mixer;
mod noise;
mod progression;
pub mod scheduler;
mod timer;
mod voice;
mod voice_pool;

pub use device::{AudioDevice, AudioError, AudioHost};
pub use frame::Frame;
pub use hit_queue::{HitQueue, HIT_QUEUE_CAPACITY};
pub use mixer::Mixer;
pub use noise::{NoiseBuffer, NOISE_SECONDS};
pub use progression::{Advance, Progression, FINISH_TICKS, FILL_BEATS, INTERMISSION_BEATS};
pub use scheduler::{
    BeatCallback, BeatEngine, Callbacks, RoundCallback, StopCallback, LEAD_IN_SECS,
    LOOKAHEAD_SECS, POLL_INTERVAL,
};
pub use timer::{Timer, TimerQueue};
pub use voice::Voice;
pub use voice_pool::{VoiceId, VoicePool, MAX_VOICES};

//! Core data types for the beatgrid scheduler.
//!
//! This crate defines the values that flow between the scheduler, the
//! synthesis engine and the front end: state snapshots, engine
//! configuration, instrument hits and their synthesis recipes.
//!
//! Designed to be `no_std` compatible.

#![cfg_attr(not(feature = "std"), no_std)]

mod audio_time;
mod config;
mod envelope;
mod hit;
mod instrument;
mod state;

pub use audio_time::AudioTime;
pub use config::{EngineConfig, LOOPS_PER_ROUND};
pub use envelope::{Curve, Envelope, Segment, MAX_SEGMENTS};
pub use hit::Hit;
pub use instrument::{
    Instrument, Patch, Source, Waveform, BASS_LOOP_ONE_HZ, BASS_LOOP_TWO_HZ,
};
pub use state::{Phase, SchedulerState};

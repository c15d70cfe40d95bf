//! Headless controller for beatgrid.
//!
//! Provides a unified API for live sessions, offline rendering with WAV
//! export, and grid content that front ends can share.

mod controller;
mod deck;
mod render;
mod wav;

pub use controller::{Controller, ControllerError};
pub use deck::Deck;
pub use render::{render_session, Session, TAIL_SECONDS};

// Re-export common types so callers don't need bg-ir/bg-engine directly.
pub use bg_audio::{CpalHost, OfflineHost};
pub use bg_engine::{AudioError, AudioHost, Callbacks, Frame};
pub use bg_ir::{EngineConfig, Hit, Instrument, Phase, SchedulerState};

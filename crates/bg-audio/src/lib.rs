//! Audio output backends for beatgrid.
//!
//! Both backends implement the engine's [`AudioHost`](bg_engine::AudioHost)
//! seam. [`CpalHost`] plays through the default output device;
//! [`OfflineHost`] renders on demand for export and tests.

mod cpal_backend;
mod offline;

pub use cpal_backend::{CpalHost, CpalOutput, COMMAND_CAPACITY};
pub use offline::{OfflineDevice, OfflineHost};

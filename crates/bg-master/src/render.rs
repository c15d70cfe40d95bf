//! Offline session rendering.

use bg_audio::{OfflineDevice, OfflineHost};
use bg_engine::{AudioDevice, BeatEngine, Callbacks, Frame};
use bg_ir::{AudioTime, EngineConfig, Hit};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::controller::ControllerError;
use crate::wav::save_wav;

/// Longest decay rendered after the session stops.
pub const TAIL_SECONDS: f64 = 1.0;

/// A rendered session.
#[derive(Clone, Debug, Default)]
pub struct Session {
    pub sample_rate: u32,
    pub frames: Vec<Frame>,
    /// Every hit the engine triggered, in trigger order
    pub hits: Vec<Hit>,
}

impl Session {
    /// Length of the rendered audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        AudioTime::from_frames(self.frames.len() as u64, self.sample_rate).as_secs()
    }

    /// Write the rendered audio to a 16-bit stereo WAV file.
    pub fn save(&self, path: &Path) -> Result<(), ControllerError> {
        save_wav(path, &self.frames, self.sample_rate)?;
        Ok(())
    }
}

/// Run a full session against the offline backend.
///
/// Wall-clock deadlines are mapped onto the rendered audio time, so the
/// session plays out as fast as it renders. Rendering stops when the engine
/// stops on its own or after `max_seconds`, then renders up to
/// [`TAIL_SECONDS`] of decay.
pub fn render_session(
    config: EngineConfig,
    sample_rate: u32,
    max_seconds: f64,
    callbacks: Callbacks,
) -> Result<Session, ControllerError> {
    let mut engine = BeatEngine::with_config(OfflineHost::new(sample_rate), config);
    engine.set_callbacks(callbacks);

    let epoch = Instant::now();
    engine.start(epoch)?;

    let max_frames = AudioTime::from_secs(max_seconds).to_frames(sample_rate);
    let mut frames = Vec::new();

    while engine.is_playing() {
        let Some(deadline) = engine.next_deadline() else {
            break;
        };
        let Some(device) = engine.device_mut() else {
            break;
        };
        let rendered = device.frames_rendered();
        if rendered >= max_frames {
            break;
        }

        let due = AudioTime::from_secs(deadline.saturating_duration_since(epoch).as_secs_f64());
        let target = due.to_frames(sample_rate).clamp(rendered + 1, max_frames);
        device.render_until(target, &mut frames);

        let now = epoch + Duration::from_secs_f64(device.current_time().as_secs());
        engine.run_due(now);
    }

    if engine.is_playing() {
        log::info!("render limit of {}s reached", max_seconds);
        engine.stop();
    }

    let Some(device) = engine.device_mut() else {
        return Ok(Session {
            sample_rate,
            frames,
            hits: Vec::new(),
        });
    };
    render_tail(device, &mut frames);

    Ok(Session {
        sample_rate,
        frames,
        hits: device.hits().to_vec(),
    })
}

/// Let sounding voices decay, up to [`TAIL_SECONDS`].
fn render_tail(device: &mut OfflineDevice, frames: &mut Vec<Frame>) {
    let limit = device.frames_rendered()
        + AudioTime::from_secs(TAIL_SECONDS).to_frames(device.sample_rate());
    while !device.is_idle() && device.frames_rendered() < limit {
        let next = device.frames_rendered() + 1;
        device.render_until(next, frames);
    }
}

//! Look-ahead beat scheduler.
//!
//! The engine keeps a "next note time" on the audio clock. Every
//! [`POLL_INTERVAL`] it schedules each beat that falls inside the
//! [`LOOKAHEAD_SECS`] window: the beat's hits go to the device at their
//! exact audio time, the state machine advances, and the beat's snapshot is
//! parked on a wall-clock timer that fires when the beat becomes audible.
//! Audio therefore runs ahead of the imprecise poll while the UI sees each
//! state close to when it is heard.
//!
//! The engine is driven cooperatively by its owner, which calls
//! [`BeatEngine::run_due`] whenever [`BeatEngine::next_deadline`] passes.

use bg_ir::{AudioTime, EngineConfig, Hit, Phase, SchedulerState};
use std::time::{Duration, Instant};

use crate::device::{AudioDevice, AudioError, AudioHost};
use crate::noise::NoiseBuffer;
use crate::progression::{Advance, Progression};
use crate::timer::{Timer, TimerQueue};

/// How far ahead of the audio clock beats are scheduled.
pub const LOOKAHEAD_SECS: f64 = 0.1;
/// Delay between `start` and the first beat, so it is always schedulable.
pub const LEAD_IN_SECS: f64 = 0.1;
/// Period of the look-ahead poll.
pub const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Receives every beat snapshot, near the beat's audible time.
pub type BeatCallback = Box<dyn FnMut(SchedulerState) + Send>;
/// Receives the new round number when an intermission ends.
pub type RoundCallback = Box<dyn FnMut(u32) + Send>;
/// Called once per transition from running to stopped.
pub type StopCallback = Box<dyn FnMut() + Send>;

/// The three outbound notification slots.
#[derive(Default)]
pub struct Callbacks {
    pub on_beat: Option<BeatCallback>,
    pub on_round_advance: Option<RoundCallback>,
    pub on_stop: Option<StopCallback>,
}

impl Callbacks {
    /// No subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the beat subscriber.
    pub fn with_beat(mut self, f: impl FnMut(SchedulerState) + Send + 'static) -> Self {
        self.on_beat = Some(Box::new(f));
        self
    }

    /// Set the round-advance subscriber.
    pub fn with_round_advance(mut self, f: impl FnMut(u32) + Send + 'static) -> Self {
        self.on_round_advance = Some(Box::new(f));
        self
    }

    /// Set the stop subscriber.
    pub fn with_stop(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_stop = Some(Box::new(f));
        self
    }
}

/// Audio-driven game scheduler.
pub struct BeatEngine<H: AudioHost> {
    /// Opens the device on first start
    host: H,
    /// Output device, kept for the engine's lifetime once opened
    device: Option<H::Device>,
    /// Noise shared by noise voices, generated once
    noise: Option<NoiseBuffer>,
    /// Live configuration
    config: EngineConfig,
    /// Game-state counters
    progression: Progression,
    /// Outbound subscribers
    callbacks: Callbacks,
    /// Poll timer and pending beat deliveries
    timers: TimerQueue,
    /// Is a session running?
    playing: bool,
    /// Audio time of the next beat to schedule
    next_note_time: AudioTime,
    /// Deadline of the most recently armed delivery
    last_delivery: Option<Instant>,
}

impl<H: AudioHost> BeatEngine<H> {
    /// Create an engine with the default configuration.
    pub fn new(host: H) -> Self {
        Self::with_config(host, EngineConfig::default())
    }

    /// Create an engine with the given configuration.
    pub fn with_config(host: H, config: EngineConfig) -> Self {
        Self {
            host,
            device: None,
            noise: None,
            config,
            progression: Progression::new(),
            callbacks: Callbacks::new(),
            timers: TimerQueue::new(),
            playing: false,
            next_note_time: AudioTime::ZERO,
            last_delivery: None,
        }
    }

    // --- Configuration ---

    /// Set the tempo in beats per minute. Applies from the next beat.
    pub fn set_bpm(&mut self, bpm: f64) {
        self.config.bpm = bpm;
    }

    /// Set the number of beats per loop. Applies from the next beat.
    pub fn set_items_in_grid(&mut self, items: u32) {
        self.config.items_in_grid = items;
    }

    /// Set the number of rounds in a session.
    pub fn set_total_rounds(&mut self, rounds: u32) {
        self.config.total_rounds = rounds;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // --- Subscribers ---

    /// Replace all three subscribers.
    pub fn set_callbacks(&mut self, callbacks: Callbacks) {
        self.callbacks = callbacks;
    }

    /// Replace the beat subscriber.
    pub fn on_beat(&mut self, f: impl FnMut(SchedulerState) + Send + 'static) {
        self.callbacks.on_beat = Some(Box::new(f));
    }

    /// Replace the round-advance subscriber.
    pub fn on_round_advance(&mut self, f: impl FnMut(u32) + Send + 'static) {
        self.callbacks.on_round_advance = Some(Box::new(f));
    }

    /// Replace the stop subscriber.
    pub fn on_stop(&mut self, f: impl FnMut() + Send + 'static) {
        self.callbacks.on_stop = Some(Box::new(f));
    }

    // --- Transport ---

    /// Start a session. No-op if one is already running.
    ///
    /// Opens the device on first use and resumes it. If audio output is
    /// unavailable the error is returned and the engine stays stopped.
    pub fn start(&mut self, now: Instant) -> Result<(), AudioError> {
        if self.playing {
            return Ok(());
        }

        let device = self.ensure_device()?;
        if let Err(e) = device.resume() {
            log::warn!("audio device failed to resume: {}", e);
            return Err(e);
        }
        let audio_now = device.current_time();

        self.playing = true;
        self.progression.reset();
        self.next_note_time = audio_now + LEAD_IN_SECS;
        self.last_delivery = None;
        log::info!(
            "session started: {} bpm, {} items, {} rounds",
            self.config.bpm,
            self.config.items_in_grid,
            self.config.total_rounds
        );

        self.poll(now);
        Ok(())
    }

    /// Stop the session. No-op if not running.
    ///
    /// Cancels the poll and every pending delivery. Counters keep their
    /// last values. Voices already triggered decay on their own.
    pub fn stop(&mut self) {
        if !self.playing {
            return;
        }
        self.playing = false;
        self.timers.clear();
        log::info!("session stopped at {:?}", self.progression.snapshot());

        if let Some(on_stop) = self.callbacks.on_stop.as_mut() {
            on_stop();
        }
    }

    /// Fire every timer whose deadline is at or before `now`.
    pub fn run_due(&mut self, now: Instant) {
        while let Some(timer) = self.timers.pop_due(now) {
            match timer {
                Timer::Poll => self.poll(now),
                Timer::Deliver(state) => {
                    if !self.playing {
                        continue;
                    }
                    if let Some(on_beat) = self.callbacks.on_beat.as_mut() {
                        on_beat(state);
                    }
                }
            }
        }
    }

    /// When the owner should next call [`run_due`](Self::run_due).
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    // --- Inspection ---

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Counters as they stand now (ahead of what the UI has been shown).
    pub fn state(&self) -> SchedulerState {
        self.progression.snapshot()
    }

    pub fn phase(&self) -> Phase {
        self.progression.phase(&self.config)
    }

    /// Audio time of the next beat to be scheduled.
    pub fn next_note_time(&self) -> AudioTime {
        self.next_note_time
    }

    /// Beat deliveries armed but not yet fired.
    pub fn pending_deliveries(&self) -> usize {
        self.timers.pending_deliveries()
    }

    pub fn device(&self) -> Option<&H::Device> {
        self.device.as_ref()
    }

    pub fn device_mut(&mut self) -> Option<&mut H::Device> {
        self.device.as_mut()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    // --- Internals ---

    fn ensure_device(&mut self) -> Result<&mut H::Device, AudioError> {
        let device = match self.device.take() {
            Some(device) => device,
            None => {
                let mut device = self.host.open().map_err(|e| {
                    log::warn!("audio output unavailable: {}", e);
                    e
                })?;
                let noise = self
                    .noise
                    .get_or_insert_with(|| NoiseBuffer::generate(device.sample_rate()));
                device.load_noise(noise.clone());
                log::debug!("audio device opened at {} Hz", device.sample_rate());
                device
            }
        };
        Ok(self.device.insert(device))
    }

    /// Schedule every beat inside the look-ahead window, then re-arm.
    fn poll(&mut self, now: Instant) {
        if !self.playing {
            return;
        }
        let Some(audio_now) = self.device.as_ref().map(|d| d.current_time()) else {
            return;
        };

        let horizon = audio_now + LOOKAHEAD_SECS;
        while self.next_note_time < horizon {
            self.schedule_beat(self.next_note_time, audio_now, now);
            self.advance();
            if !self.playing {
                break;
            }
        }

        if self.playing {
            self.timers.push(now + POLL_INTERVAL, Timer::Poll);
        }
    }

    /// Trigger the current beat's hits at `time` and arm its delivery.
    fn schedule_beat(&mut self, time: AudioTime, audio_now: AudioTime, now: Instant) {
        let state = self.progression.snapshot();
        let delay = Duration::from_secs_f64(time.saturating_since(audio_now));
        let mut deadline = now + delay;
        if let Some(last) = self.last_delivery {
            deadline = deadline.max(last);
        }
        self.last_delivery = Some(deadline);
        self.timers.push(deadline, Timer::Deliver(state));

        let instruments = self.progression.instruments(&self.config);
        if let Some(device) = self.device.as_mut() {
            for instrument in instruments {
                if let Err(e) = device.trigger(Hit::new(time, instrument)) {
                    log::warn!("dropped {} at {:.3}s: {}", instrument.name(), time.as_secs(), e);
                }
            }
        }
    }

    /// Move the clock and the counters to the next beat.
    fn advance(&mut self) {
        self.next_note_time = self.next_note_time + self.config.seconds_per_beat();

        let before = self.progression.phase(&self.config);
        match self.progression.advance(&self.config) {
            Advance::Continue => {}
            Advance::RoundAdvanced(round) => {
                log::debug!("round {} begins", round);
                if let Some(on_round) = self.callbacks.on_round_advance.as_mut() {
                    on_round(round);
                }
            }
            Advance::Finish => {
                log::debug!("wind-down complete");
                self.stop();
                return;
            }
        }

        let after = self.progression.phase(&self.config);
        if after != before {
            log::debug!("{:?} -> {:?} at {:?}", before, after, self.progression.snapshot());
        }
    }
}

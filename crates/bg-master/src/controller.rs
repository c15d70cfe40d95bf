//! Live session controller.
//!
//! The [`BeatEngine`] is single-threaded, so the controller gives it a
//! dedicated scheduler thread and talks to it over a channel. The thread
//! sleeps until the next command or the engine's next timer deadline,
//! whichever comes first. Callbacks run on that thread.

use bg_engine::{AudioError, AudioHost, BeatEngine, Callbacks};
use bg_ir::EngineConfig;
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;
use thiserror::Error;

/// Error type for controller operations.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Audio(#[from] AudioError),
    /// The scheduler thread has exited
    #[error("scheduler thread is gone")]
    Disconnected,
    #[error("failed to spawn scheduler thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("wav export failed: {0}")]
    Wav(#[from] hound::Error),
}

enum Command {
    Start(Sender<Result<(), AudioError>>),
    Stop,
    SetBpm(f64),
    SetItems(u32),
    SetRounds(u32),
    SetCallbacks(Callbacks),
    Shutdown,
}

/// Owns a beat engine running on its own scheduler thread.
pub struct Controller {
    commands: Sender<Command>,
    playing: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Controller {
    /// Spawn the scheduler thread with the default configuration.
    pub fn spawn<H>(host: H) -> Result<Self, ControllerError>
    where
        H: AudioHost + Send + 'static,
    {
        Self::with_config(host, EngineConfig::default())
    }

    /// Spawn the scheduler thread with `config`.
    pub fn with_config<H>(host: H, config: EngineConfig) -> Result<Self, ControllerError>
    where
        H: AudioHost + Send + 'static,
    {
        let (commands, rx) = unbounded();
        let playing = Arc::new(AtomicBool::new(false));
        let flag = playing.clone();

        // The device is opened on this thread and never leaves it
        let thread = std::thread::Builder::new()
            .name("beatgrid-scheduler".into())
            .spawn(move || {
                let engine = BeatEngine::with_config(host, config);
                scheduler_thread(engine, rx, flag);
            })?;

        Ok(Self {
            commands,
            playing,
            thread: Some(thread),
        })
    }

    // --- Transport ---

    /// Start a session and wait for the engine's answer.
    pub fn start(&self) -> Result<(), ControllerError> {
        let (reply, answer) = bounded(1);
        self.send(Command::Start(reply))?;
        answer.recv().map_err(|_| ControllerError::Disconnected)??;
        Ok(())
    }

    pub fn stop(&self) -> Result<(), ControllerError> {
        self.send(Command::Stop)
    }

    /// Is a session running? Updated by the scheduler thread after each
    /// command and timer batch.
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    // --- Configuration ---

    pub fn set_bpm(&self, bpm: f64) -> Result<(), ControllerError> {
        self.send(Command::SetBpm(bpm))
    }

    pub fn set_items_in_grid(&self, items: u32) -> Result<(), ControllerError> {
        self.send(Command::SetItems(items))
    }

    pub fn set_total_rounds(&self, rounds: u32) -> Result<(), ControllerError> {
        self.send(Command::SetRounds(rounds))
    }

    /// Replace all three subscribers. They run on the scheduler thread.
    pub fn set_callbacks(&self, callbacks: Callbacks) -> Result<(), ControllerError> {
        self.send(Command::SetCallbacks(callbacks))
    }

    fn send(&self, command: Command) -> Result<(), ControllerError> {
        self.commands
            .send(command)
            .map_err(|_| ControllerError::Disconnected)
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

fn scheduler_thread<H: AudioHost>(
    mut engine: BeatEngine<H>,
    commands: Receiver<Command>,
    playing: Arc<AtomicBool>,
) {
    log::debug!("scheduler thread running");

    loop {
        let received = match engine.next_deadline() {
            Some(deadline) => match commands.recv_deadline(deadline) {
                Ok(command) => Some(command),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match commands.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            },
        };

        if let Some(command) = received {
            match command {
                Command::Start(reply) => {
                    let result = engine.start(Instant::now());
                    playing.store(engine.is_playing(), Ordering::Release);
                    let _ = reply.send(result);
                }
                Command::Stop => engine.stop(),
                Command::SetBpm(bpm) => engine.set_bpm(bpm),
                Command::SetItems(items) => engine.set_items_in_grid(items),
                Command::SetRounds(rounds) => engine.set_total_rounds(rounds),
                Command::SetCallbacks(callbacks) => engine.set_callbacks(callbacks),
                Command::Shutdown => break,
            }
        }

        engine.run_due(Instant::now());
        playing.store(engine.is_playing(), Ordering::Release);
    }

    engine.stop();
    playing.store(false, Ordering::Release);
    log::debug!("scheduler thread exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use bg_audio::OfflineHost;
    use bg_engine::{AudioDevice, NoiseBuffer};
    use bg_ir::{AudioTime, Hit, SchedulerState};
    use std::sync::Mutex;
    use std::time::Duration;

    /// A device whose clock follows the wall clock from `resume`, so the
    /// scheduler thread sees audio time pass on its own.
    struct WallClockDevice {
        resumed_at: Option<Instant>,
        hits: Arc<Mutex<Vec<Hit>>>,
    }

    impl AudioDevice for WallClockDevice {
        fn sample_rate(&self) -> u32 {
            8000
        }

        fn current_time(&self) -> AudioTime {
            self.resumed_at
                .map_or(AudioTime::ZERO, |t| AudioTime::from_secs(t.elapsed().as_secs_f64()))
        }

        fn resume(&mut self) -> Result<(), AudioError> {
            self.resumed_at.get_or_insert_with(Instant::now);
            Ok(())
        }

        fn load_noise(&mut self, _noise: NoiseBuffer) {}

        fn trigger(&mut self, hit: Hit) -> Result<(), AudioError> {
            self.hits.lock().unwrap().push(hit);
            Ok(())
        }
    }

    #[derive(Default)]
    struct WallClockHost {
        hits: Arc<Mutex<Vec<Hit>>>,
    }

    impl AudioHost for WallClockHost {
        type Device = WallClockDevice;

        fn open(&mut self) -> Result<WallClockDevice, AudioError> {
            Ok(WallClockDevice {
                resumed_at: None,
                hits: self.hits.clone(),
            })
        }
    }

    /// Start time of each beat, from the triggered hits.
    fn beat_times(hits: &[Hit]) -> Vec<f64> {
        let mut times: Vec<f64> = Vec::new();
        for hit in hits {
            if times.last() != Some(&hit.time.as_secs()) {
                times.push(hit.time.as_secs());
            }
        }
        times
    }

    fn wait_until_stopped(controller: &Controller, limit: Duration) {
        let deadline = Instant::now() + limit;
        while controller.is_playing() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn start_without_audio_reports_error() {
        let controller = Controller::spawn(OfflineHost::unavailable()).unwrap();
        let result = controller.start();
        assert!(matches!(
            result,
            Err(ControllerError::Audio(AudioError::NoDevice))
        ));
        assert!(!controller.is_playing());
    }

    #[test]
    fn start_and_stop() {
        let stops = Arc::new(Mutex::new(0));
        let counter = stops.clone();

        let controller = Controller::spawn(OfflineHost::new(8000)).unwrap();
        controller
            .set_callbacks(Callbacks::new().with_stop(move || *counter.lock().unwrap() += 1))
            .unwrap();
        controller.start().unwrap();
        assert!(controller.is_playing());
        controller.start().unwrap();

        controller.stop().unwrap();
        controller.stop().unwrap();
        let deadline = Instant::now() + Duration::from_secs(2);
        while controller.is_playing() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(!controller.is_playing());
        drop(controller);
        assert_eq!(*stops.lock().unwrap(), 1);
    }

    #[test]
    fn drop_stops_running_session() {
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = stopped.clone();

        let controller = Controller::spawn(OfflineHost::new(8000)).unwrap();
        controller
            .set_callbacks(Callbacks::new().with_stop(move || flag.store(true, Ordering::SeqCst)))
            .unwrap();
        controller.start().unwrap();
        drop(controller);
        assert!(stopped.load(Ordering::SeqCst));
    }

    #[test]
    fn tempo_change_over_the_channel_respaces_beats() {
        let host = WallClockHost::default();
        let hits = host.hits.clone();
        let controller = Controller::with_config(host, EngineConfig::new(600.0, 8, 5)).unwrap();

        controller.start().unwrap();
        std::thread::sleep(Duration::from_millis(450));
        controller.set_bpm(1200.0).unwrap();
        std::thread::sleep(Duration::from_millis(500));
        controller.stop().unwrap();
        drop(controller);

        let times = beat_times(&hits.lock().unwrap());
        let gaps: Vec<f64> = times.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(gaps.len() > 6, "only {} beats", times.len());
        assert!((gaps[0] - 0.1).abs() < 1e-9);
        assert!((gaps[gaps.len() - 1] - 0.05).abs() < 1e-9);

        // Every gap is one of the two tempos, and the tempo only speeds up
        let switch = gaps.iter().position(|g| (g - 0.05).abs() < 1e-9).unwrap();
        assert!(gaps[..switch].iter().all(|g| (g - 0.1).abs() < 1e-9));
        assert!(gaps[switch..].iter().all(|g| (g - 0.05).abs() < 1e-9));
    }

    #[test]
    fn shrinking_grid_and_rounds_live_ends_the_session() {
        let beats = Arc::new(Mutex::new(Vec::<SchedulerState>::new()));
        let stops = Arc::new(Mutex::new(0));
        let (sink, counter) = (beats.clone(), stops.clone());

        let controller = Controller::spawn(WallClockHost::default()).unwrap();
        controller
            .set_callbacks(
                Callbacks::new()
                    .with_beat(move |s| sink.lock().unwrap().push(s))
                    .with_stop(move || *counter.lock().unwrap() += 1),
            )
            .unwrap();
        controller.start().unwrap();
        controller.set_bpm(1200.0).unwrap();
        controller.set_items_in_grid(1).unwrap();
        controller.set_total_rounds(1).unwrap();

        wait_until_stopped(&controller, Duration::from_secs(5));
        assert!(!controller.is_playing());
        drop(controller);

        assert_eq!(*stops.lock().unwrap(), 1);
        let beats = beats.lock().unwrap();
        // One beat per loop, so every standard beat sits in slot 0
        assert!(beats
            .iter()
            .filter(|s| !s.is_intermission && !s.is_loop_transition && s.current_round == 1)
            .all(|s| s.beat_index == 0));
        assert_eq!(beats.last().map(|s| s.current_round), Some(2));
    }
}

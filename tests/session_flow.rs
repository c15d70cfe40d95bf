//! Full sessions driven through the offline backend.
//!
//! The wall clock is simulated as `epoch + rendered audio time`, so a
//! session plays out deterministically in a few milliseconds of real time.

use bg_audio::{OfflineDevice, OfflineHost};
use bg_engine::{AudioDevice, AudioError, BeatEngine, Callbacks, Frame, FINISH_TICKS};
use bg_ir::{
    EngineConfig, Hit, Instrument, Phase, SchedulerState, BASS_LOOP_ONE_HZ, BASS_LOOP_TWO_HZ,
};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const SR: u32 = 8000;
/// Frames rendered between timer checks (1 ms)
const STEP: u64 = 8;

#[derive(Clone, Default)]
struct Recorder {
    beats: Arc<Mutex<Vec<SchedulerState>>>,
    rounds: Arc<Mutex<Vec<u32>>>,
    stops: Arc<Mutex<u32>>,
}

impl Recorder {
    fn callbacks(&self) -> Callbacks {
        let beats = self.beats.clone();
        let rounds = self.rounds.clone();
        let stops = self.stops.clone();
        Callbacks::new()
            .with_beat(move |s| beats.lock().unwrap().push(s))
            .with_round_advance(move |r| rounds.lock().unwrap().push(r))
            .with_stop(move || *stops.lock().unwrap() += 1)
    }

    fn beats(&self) -> Vec<SchedulerState> {
        self.beats.lock().unwrap().clone()
    }

    fn rounds(&self) -> Vec<u32> {
        self.rounds.lock().unwrap().clone()
    }

    fn stops(&self) -> u32 {
        *self.stops.lock().unwrap()
    }
}

struct Session {
    engine: BeatEngine<OfflineHost>,
    recorder: Recorder,
    epoch: Instant,
    frames: Vec<Frame>,
}

impl Session {
    fn new(config: EngineConfig) -> Self {
        let mut engine = BeatEngine::with_config(OfflineHost::new(SR), config);
        let recorder = Recorder::default();
        engine.set_callbacks(recorder.callbacks());
        Self {
            engine,
            recorder,
            epoch: Instant::now(),
            frames: Vec::new(),
        }
    }

    fn started(config: EngineConfig) -> Self {
        let mut session = Self::new(config);
        session.start();
        session
    }

    fn now(&self) -> Instant {
        let audio = self.engine.device().map_or(0.0, |d| d.current_time().as_secs());
        self.epoch + Duration::from_secs_f64(audio)
    }

    fn start(&mut self) {
        let now = self.now();
        self.engine.start(now).unwrap();
    }

    fn device(&self) -> &OfflineDevice {
        self.engine.device().unwrap()
    }

    /// Render up to `secs` of audio time, firing timers every millisecond.
    fn run_until(&mut self, secs: f64) {
        let target = (secs * SR as f64).round() as u64;
        loop {
            let device = self.engine.device_mut().unwrap();
            let rendered = device.frames_rendered();
            if rendered >= target {
                break;
            }
            device.render_until((rendered + STEP).min(target), &mut self.frames);
            let now = self.now();
            self.engine.run_due(now);
        }
    }

    /// Render until the engine stops, with a safety limit.
    fn run_to_end(&mut self) {
        let mut secs = 0.0;
        while self.engine.is_playing() && secs < 600.0 {
            secs += 1.0;
            self.run_until(secs);
        }
        assert!(!self.engine.is_playing(), "session never finished");
    }

    fn hits(&self) -> &[Hit] {
        self.device().hits()
    }

    /// Hits grouped by start time, one group per scheduled beat.
    fn beat_groups(&self) -> Vec<(f64, Vec<Instrument>)> {
        let mut groups: Vec<(f64, Vec<Instrument>)> = Vec::new();
        for hit in self.hits() {
            let t = hit.time.as_secs();
            match groups.last_mut() {
                Some((time, instruments)) if *time == t => instruments.push(hit.instrument),
                _ => groups.push((t, vec![hit.instrument])),
            }
        }
        groups
    }
}

#[test]
fn beats_are_spaced_by_tempo() {
    let mut session = Session::started(EngineConfig::new(137.0, 8, 5));
    session.run_until(10.0);

    let groups = session.beat_groups();
    assert!(groups.len() > 20);
    assert!((groups[0].0 - 0.1).abs() < 1e-9);
    for pair in groups.windows(2) {
        assert!((pair[1].0 - pair[0].0 - 60.0 / 137.0).abs() < 1e-9);
    }
}

#[test]
fn first_beat_sounds_after_lead_in() {
    let mut session = Session::started(EngineConfig::default());
    session.run_until(0.5);

    let first_beat = (0.1 * SR as f64) as usize;
    assert!(session.frames[..first_beat].iter().all(|f| f.is_silent()));
    assert!(session.frames[first_beat..first_beat + 100]
        .iter()
        .any(|f| !f.is_silent()));
    assert_eq!(session.recorder.beats().first(), Some(&SchedulerState::initial()));
}

#[test]
fn grid_of_four_wraps_into_transition() {
    let mut session = Session::started(EngineConfig::new(240.0, 4, 2));
    session.run_until(3.0);

    let beats = session.recorder.beats();
    for (i, beat) in beats[..4].iter().enumerate() {
        assert_eq!(beat.phase(2), Phase::Standard);
        assert_eq!(beat.beat_index, i as i32);
    }
    assert_eq!(beats[4].phase(2), Phase::LoopTransition);
    assert_eq!(beats[4].beat_index, 0);
}

#[test]
fn loop_two_then_intermission() {
    let mut session = Session::started(EngineConfig::new(300.0, 3, 2));
    session.run_until(4.0);

    let beats = session.recorder.beats();
    let phases: Vec<Phase> = beats.iter().map(|s| s.phase(2)).collect();
    assert_eq!(&phases[3..7], &[Phase::LoopTransition; 4]);
    assert_eq!(beats[7], SchedulerState { current_loop: 2, ..SchedulerState::initial() });
    assert_eq!(phases[10], Phase::Intermission);
}

#[test]
fn loop_two_of_last_round_finishes() {
    let mut session = Session::started(EngineConfig::new(300.0, 3, 1));
    session.run_until(3.0);

    let beats = session.recorder.beats();
    assert_eq!(beats[10].phase(1), Phase::Finished);
    assert_eq!(beats[10].current_round, 2);
    assert_eq!(beats[10].beat_index, 0);
}

#[test]
fn intermission_lasts_four_beats_then_round_advances() {
    let mut session = Session::started(EngineConfig::new(300.0, 2, 3));
    session.run_until(4.0);

    let beats = session.recorder.beats();
    let phases: Vec<Phase> = beats.iter().map(|s| s.phase(3)).collect();
    assert_eq!(&phases[8..12], &[Phase::Intermission; 4]);
    assert_eq!(beats[12], SchedulerState { current_round: 2, ..SchedulerState::initial() });
    assert_eq!(session.recorder.rounds(), vec![2]);
}

#[test]
fn finished_session_stops_itself_once() {
    let mut session = Session::started(EngineConfig::new(300.0, 2, 2));
    session.run_to_end();
    session.run_until(session.device().current_time().as_secs() + 2.0);

    assert_eq!(session.recorder.stops(), 1);
    assert_eq!(session.recorder.rounds(), vec![2]);
    assert_eq!(session.engine.state().beat_index, FINISH_TICKS + 1);

    // Ten hi-hat ticks after the last standard beat
    let groups = session.beat_groups();
    let tail: Vec<&Vec<Instrument>> = groups.iter().rev().take(10).map(|(_, g)| g).collect();
    assert!(tail.iter().all(|g| g.as_slice() == [Instrument::HiHat]));
    assert_ne!(groups[groups.len() - 11].1.as_slice(), [Instrument::HiHat]);
}

#[test]
fn second_start_changes_nothing() {
    let mut session = Session::started(EngineConfig::new(120.0, 8, 5));
    session.run_until(1.5);

    let state = session.engine.state();
    let hits = session.hits().len();
    let next = session.engine.next_note_time();
    session.start();
    session.run_until(1.501);

    assert_eq!(session.engine.state(), state);
    assert_eq!(session.hits().len(), hits);
    assert_eq!(session.engine.next_note_time(), next);
}

#[test]
fn shrinking_grid_at_beat_five_wraps_next_tick() {
    let mut session = Session::started(EngineConfig::new(120.0, 8, 5));
    while session.engine.state().beat_index < 5 {
        let t = session.device().current_time().as_secs() + 0.001;
        session.run_until(t);
    }
    session.engine.set_items_in_grid(4);
    session.run_until(6.0);

    let beats = session.recorder.beats();
    let five = beats.iter().position(|s| s.beat_index == 5).unwrap();
    assert!(beats[five + 1].is_loop_transition);
    assert_eq!(beats[five + 1].beat_index, 0);
}

#[test]
fn bass_follows_the_loop() {
    let mut session = Session::started(EngineConfig::new(300.0, 4, 2));
    session.run_to_end();

    let beats = session.recorder.beats();
    let groups = session.beat_groups();
    let mut checked = 0;
    for (state, (_, instruments)) in beats.iter().zip(&groups) {
        let bass: Vec<f32> = instruments
            .iter()
            .filter_map(|i| match i {
                Instrument::Bass { frequency } => Some(*frequency),
                _ => None,
            })
            .collect();
        if state.phase(2) == Phase::Standard {
            let expected = match state.current_loop {
                1 => BASS_LOOP_ONE_HZ,
                _ => BASS_LOOP_TWO_HZ,
            };
            assert_eq!(bass, vec![expected]);
            checked += 1;
        } else {
            assert!(bass.is_empty());
        }
    }
    // Two rounds of two loops of four beats
    assert_eq!(checked, 16);
}

#[test]
fn stop_suppresses_pending_deliveries() {
    let mut session = Session::started(EngineConfig::new(600.0, 8, 5));
    session.run_until(0.73);
    assert!(session.engine.pending_deliveries() > 0);
    let delivered = session.recorder.beats().len();

    session.engine.stop();
    session.engine.stop();
    session.run_until(2.0);

    assert_eq!(session.recorder.beats().len(), delivered);
    assert_eq!(session.recorder.stops(), 1);
    assert!(session.engine.next_deadline().is_none());
}

#[test]
fn deliveries_follow_production_order() {
    let mut session = Session::started(EngineConfig::new(200.0, 3, 3));
    session.run_to_end();

    // Replaying the counters must reproduce the delivered sequence
    let beats = session.recorder.beats();
    let mut progression = bg_engine::Progression::new();
    let config = *session.engine.config();
    for beat in &beats {
        assert_eq!(*beat, progression.snapshot());
        progression.advance(&config);
    }
}

#[test]
fn restart_after_stop_begins_at_round_one() {
    let mut session = Session::started(EngineConfig::new(300.0, 2, 3));
    session.run_until(3.0);
    session.engine.stop();
    session.recorder.beats.lock().unwrap().clear();

    session.start();
    session.run_until(4.0);
    assert_eq!(session.recorder.beats()[0], SchedulerState::initial());
    assert_eq!(session.recorder.stops(), 1);
}

#[test]
fn missing_audio_output_is_not_fatal() {
    let mut engine = BeatEngine::new(OfflineHost::unavailable());
    let recorder = Recorder::default();
    engine.set_callbacks(recorder.callbacks());

    let result = engine.start(Instant::now());
    assert!(matches!(result, Err(AudioError::NoDevice)));
    assert!(!engine.is_playing());
    assert!(engine.device().is_none());

    engine.stop();
    assert_eq!(recorder.stops(), 0);
    assert!(recorder.beats().is_empty());
}

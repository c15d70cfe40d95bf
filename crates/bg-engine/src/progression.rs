//! Beat, loop and round progression.
//!
//! `Progression` holds the game-state counters the scheduler advances once
//! per beat. It decides which instruments sound at the current beat and how
//! the counters move afterwards. Configuration is passed in on every call
//! so live changes apply from the next beat.

use arrayvec::ArrayVec;
use bg_ir::{EngineConfig, Instrument, Phase, SchedulerState, LOOPS_PER_ROUND};

/// Beats in the pause between rounds.
pub const INTERMISSION_BEATS: u32 = 4;
/// Beats in the fill between the two loops of a round.
pub const FILL_BEATS: u32 = 4;
/// Finished-phase counter value past which the session stops.
pub const FINISH_TICKS: i32 = 8;

/// Side effect requested by one advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// Nothing beyond the counter update.
    Continue,
    /// Intermission ended and this round began.
    RoundAdvanced(u32),
    /// The wind-down after the last round is over; stop the engine.
    Finish,
}

/// Game-state counters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progression {
    /// Beat within the loop; doubles as the wind-down counter once finished.
    beat_index: i32,
    current_round: u32,
    current_loop: u32,
    is_intermission: bool,
    intermission_count: u32,
    is_loop_transition: bool,
    transition_count: u32,
}

impl Progression {
    /// Counters at the first beat of a session.
    pub fn new() -> Self {
        Self {
            beat_index: 0,
            current_round: 1,
            current_loop: 1,
            is_intermission: false,
            intermission_count: 0,
            is_loop_transition: false,
            transition_count: 0,
        }
    }

    /// Return to the first beat of a session.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Snapshot of the current beat.
    pub fn snapshot(&self) -> SchedulerState {
        SchedulerState {
            current_round: self.current_round,
            current_loop: self.current_loop,
            beat_index: self.beat_index,
            is_intermission: self.is_intermission,
            is_loop_transition: self.is_loop_transition,
        }
    }

    /// Current phase under `config`.
    pub fn phase(&self, config: &EngineConfig) -> Phase {
        self.snapshot().phase(config.total_rounds)
    }

    /// Step within the loop-transition fill (0..4).
    pub fn transition_step(&self) -> u32 {
        self.transition_count
    }

    /// Instruments sounding at the current beat.
    pub fn instruments(&self, config: &EngineConfig) -> ArrayVec<Instrument, 4> {
        let mut out = ArrayVec::new();
        match self.phase(config) {
            Phase::Intermission => out.push(Instrument::Stick { accent: false }),
            Phase::LoopTransition => out.push(match self.transition_count {
                3 => Instrument::Stick { accent: true },
                n if n % 2 == 0 => Instrument::HiHat,
                _ => Instrument::Snare,
            }),
            Phase::Finished => out.push(Instrument::HiHat),
            Phase::Standard => {
                out.push(Instrument::Kick);
                out.push(Instrument::HiHat);
                out.push(Instrument::bass_for_loop(self.current_loop));
                if self.beat_index % 2 != 0 {
                    out.push(Instrument::Snare);
                }
            }
        }
        out
    }

    /// Move to the next beat.
    pub fn advance(&mut self, config: &EngineConfig) -> Advance {
        match self.phase(config) {
            Phase::Finished => {
                if self.beat_index > FINISH_TICKS {
                    return Advance::Finish;
                }
                self.beat_index += 1;
                Advance::Continue
            }
            Phase::Intermission => {
                self.intermission_count += 1;
                if self.intermission_count < INTERMISSION_BEATS {
                    return Advance::Continue;
                }
                self.is_intermission = false;
                self.intermission_count = 0;
                self.current_round += 1;
                self.current_loop = 1;
                self.beat_index = 0;
                Advance::RoundAdvanced(self.current_round)
            }
            Phase::LoopTransition => {
                self.transition_count += 1;
                if self.transition_count >= FILL_BEATS {
                    self.is_loop_transition = false;
                    self.transition_count = 0;
                    self.current_loop += 1;
                    self.beat_index = 0;
                }
                Advance::Continue
            }
            Phase::Standard => {
                self.beat_index += 1;
                if self.beat_index < config.items_in_grid as i32 {
                    return Advance::Continue;
                }
                self.beat_index = 0;
                if self.current_loop < LOOPS_PER_ROUND {
                    self.is_loop_transition = true;
                    self.transition_count = 0;
                } else if self.current_round < config.total_rounds {
                    self.is_intermission = true;
                    self.intermission_count = 0;
                } else {
                    // Past the last round marks completion
                    self.current_round += 1;
                }
                Advance::Continue
            }
        }
    }
}

impl Default for Progression {
    fn default() -> Self {
        Self::new()
    }
}

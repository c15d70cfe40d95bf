//! Scheduler state snapshots.

use serde::{Deserialize, Serialize};

/// Which part of a session the scheduler is in.
///
/// Exactly one phase holds at any instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// A beat of a loop pass through the grid.
    Standard,
    /// The four-step fill between loop 1 and loop 2 of a round.
    LoopTransition,
    /// The four-beat pause between rounds.
    Intermission,
    /// All rounds played; winding down before auto-stop.
    Finished,
}

/// Snapshot of the game state at one scheduled beat.
///
/// Produced once per beat and never mutated after it is emitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerState {
    /// Active round, starting at 1.
    pub current_round: u32,
    /// Pass through the grid within the round (1 or 2).
    pub current_loop: u32,
    /// Position within the current loop; -1 before the first beat.
    pub beat_index: i32,
    /// True during the pause between rounds.
    pub is_intermission: bool,
    /// True during the fill between the two loops of a round.
    pub is_loop_transition: bool,
}

impl SchedulerState {
    /// The state shown before a session has produced its first beat.
    pub const fn idle() -> Self {
        Self {
            current_round: 1,
            current_loop: 1,
            beat_index: -1,
            is_intermission: false,
            is_loop_transition: false,
        }
    }

    /// The state at the very first beat of a session.
    pub const fn initial() -> Self {
        Self {
            beat_index: 0,
            ..Self::idle()
        }
    }

    /// The phase this snapshot represents, given the session's round count.
    pub fn phase(&self, total_rounds: u32) -> Phase {
        if self.current_round > total_rounds {
            Phase::Finished
        } else if self.is_intermission {
            Phase::Intermission
        } else if self.is_loop_transition {
            Phase::LoopTransition
        } else {
            Phase::Standard
        }
    }

    /// Grid slot highlighted at this beat, if any.
    ///
    /// Only standard beats highlight a slot.
    pub fn active_slot(&self) -> Option<usize> {
        if self.is_intermission || self.is_loop_transition || self.beat_index < 0 {
            None
        } else {
            Some(self.beat_index as usize)
        }
    }

    /// Return a copy with the beat index cleared to "not started".
    ///
    /// Front ends apply this when the engine reports a stop.
    pub fn cleared(self) -> Self {
        Self {
            beat_index: -1,
            ..self
        }
    }
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self::idle()
    }
}

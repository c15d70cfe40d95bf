//! Terminal front end: turns engine notifications into status lines.

use bg_master::{Callbacks, Deck, Phase, SchedulerState};
use crossbeam_channel::Sender;

use crate::config::Settings;

/// Engine notifications, forwarded from the scheduler thread.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    Beat(SchedulerState),
    RoundAdvanced(u32),
    Stopped,
}

/// Callbacks that forward every notification to `tx`.
pub fn callbacks(tx: Sender<Event>) -> Callbacks {
    let beat = tx.clone();
    let round = tx.clone();
    Callbacks::new()
        .with_beat(move |state| {
            let _ = beat.send(Event::Beat(state));
        })
        .with_round_advance(move |r| {
            let _ = round.send(Event::RoundAdvanced(r));
        })
        .with_stop(move || {
            let _ = tx.send(Event::Stopped);
        })
}

/// What the player sees: the grid and the latest beat.
pub struct App {
    deck: Deck,
    grid: Vec<String>,
    grid_size: usize,
    total_rounds: u32,
    json: bool,
    state: SchedulerState,
}

impl App {
    /// Set up a preview grid from `settings`.
    pub fn new(settings: &Settings, json: bool) -> Self {
        Self::with_deck(Deck::new(settings.words.iter().cloned()), settings, json)
    }

    pub fn with_deck(mut deck: Deck, settings: &Settings, json: bool) -> Self {
        let grid_size = settings.grid_size as usize;
        let grid = deck.grid(1, grid_size, false);
        Self {
            deck,
            grid,
            grid_size,
            total_rounds: settings.total_rounds,
            json,
            state: SchedulerState::idle(),
        }
    }

    /// A session is starting: show round one's grid.
    pub fn begin(&mut self) {
        self.grid = self.deck.grid(1, self.grid_size, true);
        self.state = SchedulerState::idle();
    }

    pub fn grid(&self) -> &[String] {
        &self.grid
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Apply one notification, returning the line to print, if any.
    pub fn handle(&mut self, event: Event) -> Option<String> {
        match event {
            Event::Beat(state) => {
                self.state = state;
                if self.json {
                    return match serde_json::to_string(&state) {
                        Ok(line) => Some(line),
                        Err(e) => {
                            log::warn!("failed to encode beat: {}", e);
                            None
                        }
                    };
                }
                Some(self.status_line())
            }
            Event::RoundAdvanced(round) => {
                self.grid = self.deck.grid(round, self.grid_size, true);
                log::debug!("new grid for round {}: {:?}", round, self.grid);
                None
            }
            Event::Stopped => {
                self.state = self.state.cleared();
                if self.json {
                    None
                } else {
                    Some("stopped".to_string())
                }
            }
        }
    }

    /// Round header, loop number and grid with the active cell bracketed.
    pub fn status_line(&self) -> String {
        let header = match self.state.phase(self.total_rounds) {
            Phase::Intermission => "GET READY...".to_string(),
            Phase::Finished => "FINISHED".to_string(),
            _ => format!("ROUND {}/{}", self.state.current_round, self.total_rounds),
        };
        format!(
            "{:<12} loop {}  {}",
            header,
            self.state.current_loop,
            self.grid_line()
        )
    }

    fn grid_line(&self) -> String {
        let active = match self.state.phase(self.total_rounds) {
            Phase::Standard => self.state.active_slot(),
            _ => None,
        };
        self.grid
            .iter()
            .enumerate()
            .map(|(i, word)| {
                if Some(i) == active {
                    format!("[{}]", word)
                } else {
                    format!(" {} ", word)
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

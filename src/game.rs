use std::time::Duration;

use instant::Instant;

use crate::clock::ClockShowing;
use crate::event::{ClockCommand, ClockEvent};
use crate::player::{Player, PlayerId};
use crate::roster::{Roster, RosterError, StepDirection};


#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClockError {
    NoSuchPlayer,
    PlayerPassed,
    AlreadyActive,
    NotActivePlayer,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClockStatus {
    Running,
    Paused,
    // Stopped by a turn advance that found nobody left to take the turn. Resuming, resetting
    // the round or starting a new one leaves this state.
    AllPassed,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TurnOutcome {
    Advanced { from: usize, to: usize },
    AllPassed,
}

impl From<TurnOutcome> for ClockEvent {
    fn from(outcome: TurnOutcome) -> Self {
        match outcome {
            TurnOutcome::Advanced { from, to } => ClockEvent::TurnChanged { from, to },
            TurnOutcome::AllPassed => ClockEvent::AllPassed,
        }
    }
}


// Turn timer for a table of players. Time is accrued in segments: a segment starts when the
// clock is resumed or the turn passes to a new player, and every `tick` closes the current
// segment and opens a new one. There is never more than one open segment.
#[derive(Clone, Debug)]
pub struct TurnClock {
    roster: Roster,
    active_idx: usize,
    // Start of the open segment. `Some` iff the clock is running.
    segment_start: Option<Instant>,
    // Set when a turn advance stopped the clock because everybody else has passed.
    stopped_all_passed: bool,
}

impl TurnClock {
    // A new game starts paused at the first player with all clocks at zero.
    pub fn new(mut roster: Roster) -> Self {
        assert!(!roster.is_empty());
        roster.reset_times();
        roster.reset_passed();
        TurnClock {
            roster,
            active_idx: 0,
            segment_start: None,
            stopped_all_passed: false,
        }
    }

    pub fn roster(&self) -> &Roster { &self.roster }
    pub fn into_roster(self) -> Roster { self.roster }
    pub fn active_index(&self) -> usize { self.active_idx }
    pub fn active_player(&self) -> &Player { &self.roster.players()[self.active_idx] }
    pub fn is_running(&self) -> bool { self.segment_start.is_some() }

    pub fn status(&self) -> ClockStatus {
        if self.is_running() {
            ClockStatus::Running
        } else if self.stopped_all_passed {
            ClockStatus::AllPassed
        } else {
            ClockStatus::Paused
        }
    }

    // Accumulated time including the open segment.
    pub fn time_of(&self, idx: usize, now: Instant) -> Duration {
        let mut time = self.roster.players()[idx].time;
        if idx == self.active_idx {
            if let Some(start) = self.segment_start {
                time += now.saturating_duration_since(start);
            }
        }
        time
    }

    pub fn total_time(&self, now: Instant) -> Duration {
        (0..self.roster.len()).map(|idx| self.time_of(idx, now)).sum()
    }

    pub fn showing_for(&self, idx: usize, now: Instant) -> ClockShowing {
        ClockShowing::new(
            self.time_of(idx, now),
            idx == self.active_idx,
            self.is_running(),
            self.roster.players()[idx].passed,
        )
    }

    // Moves the open segment into the active player's time. No-op when paused.
    pub fn tick(&mut self, now: Instant) {
        if let Some(start) = self.segment_start {
            let delta = now.saturating_duration_since(start);
            self.roster.player_at_mut(self.active_idx).time += delta;
            self.segment_start = Some(now);
        }
    }

    pub fn toggle_pause(&mut self, now: Instant) -> bool {
        self.stopped_all_passed = false;
        if self.is_running() {
            self.tick(now);
            self.segment_start = None;
            log::debug!("Paused on {}", self.active_player().name);
        } else {
            self.segment_start = Some(now);
            log::debug!("Resumed on {}", self.active_player().name);
        }
        self.is_running()
    }

    pub fn advance_turn(&mut self, now: Instant) -> TurnOutcome {
        self.tick(now);
        let from = self.active_idx;
        match self.successor() {
            Some(to) => {
                // If running, the segment opened by `tick` now belongs to the new player.
                self.active_idx = to;
                TurnOutcome::Advanced { from, to }
            }
            None => {
                self.segment_start = None;
                self.stopped_all_passed = true;
                log::info!("All players have passed, stopping the clock");
                TurnOutcome::AllPassed
            }
        }
    }

    pub fn switch_to(&mut self, id: &PlayerId, now: Instant) -> Result<TurnOutcome, ClockError> {
        let idx = self.roster.index_of(id).ok_or(ClockError::NoSuchPlayer)?;
        if idx == self.active_idx {
            return Err(ClockError::AlreadyActive);
        }
        if self.roster.players()[idx].passed {
            return Err(ClockError::PlayerPassed);
        }
        self.tick(now);
        let from = self.active_idx;
        self.active_idx = idx;
        Ok(TurnOutcome::Advanced { from, to: idx })
    }

    pub fn mark_passed(&mut self, id: &PlayerId, now: Instant) -> Result<TurnOutcome, ClockError> {
        let idx = self.roster.index_of(id).ok_or(ClockError::NoSuchPlayer)?;
        if idx != self.active_idx {
            return Err(ClockError::NotActivePlayer);
        }
        if self.roster.players()[idx].passed {
            return Err(ClockError::PlayerPassed);
        }
        self.roster.player_at_mut(idx).passed = true;
        log::debug!("{} passed", self.active_player().name);
        Ok(self.advance_turn(now))
    }

    pub fn reset_round(&mut self) {
        self.roster.reset_passed();
        self.stopped_all_passed = false;
    }

    // Clears pass flags and starts the clock from the first player. Use `move_player` beforehand
    // to change the seating order for the new round.
    pub fn start_next_round(&mut self, now: Instant) {
        self.tick(now);
        self.reset_round();
        self.active_idx = 0;
        self.segment_start = Some(now);
    }

    pub fn new_game(&mut self) {
        self.roster.reset_times();
        self.roster.reset_passed();
        self.active_idx = 0;
        self.segment_start = None;
        self.stopped_all_passed = false;
    }

    // Reorders players without changing whose turn it is.
    pub fn move_player(
        &mut self, id: &PlayerId, direction: StepDirection,
    ) -> Result<(), RosterError> {
        self.with_active_preserved(|roster| roster.move_step(id, direction))
    }

    pub fn move_player_to_edge(&mut self, id: &PlayerId, to_front: bool) -> Result<(), RosterError> {
        self.with_active_preserved(|roster| roster.move_to_edge(id, to_front))
    }

    pub fn apply(&mut self, command: ClockCommand, now: Instant) -> Result<ClockEvent, ClockError> {
        Ok(match command {
            ClockCommand::Advance => self.advance_turn(now).into(),
            ClockCommand::SwitchTo(id) => self.switch_to(&id, now)?.into(),
            ClockCommand::Pass(id) => self.mark_passed(&id, now)?.into(),
            ClockCommand::TogglePause => {
                if self.toggle_pause(now) {
                    ClockEvent::Resumed
                } else {
                    ClockEvent::Paused
                }
            }
            ClockCommand::NextRound => {
                self.start_next_round(now);
                ClockEvent::RoundStarted
            }
            ClockCommand::NewGame => {
                self.new_game();
                ClockEvent::GameReset
            }
        })
    }

    // Next player to take the turn, skipping those who passed. A lone player follows themselves;
    // otherwise the active player is never their own successor.
    fn successor(&self) -> Option<usize> {
        let players = self.roster.players();
        let n = players.len();
        if n == 1 {
            return (!players[0].passed).then_some(0);
        }
        (1..n).map(|k| (self.active_idx + k) % n).find(|&idx| !players[idx].passed)
    }

    fn with_active_preserved(
        &mut self, f: impl FnOnce(&mut Roster) -> Result<(), RosterError>,
    ) -> Result<(), RosterError> {
        let active_id = self.active_player().id.clone();
        f(&mut self.roster)?;
        // Reordering never removes players.
        self.active_idx = self.roster.index_of(&active_id).unwrap_or(0);
        Ok(())
    }
}

use crate::player::PlayerId;


// Something a user asked the clock to do.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ClockCommand {
    // Finish the active player's turn and move on to the next non-passed player.
    Advance,
    // Hand the turn to a specific player out of order.
    SwitchTo(PlayerId),
    // The player (must be the active one) is out until the next round.
    Pass(PlayerId),
    TogglePause,
    // Clear pass flags and restart from the first player.
    NextRound,
    // Zero all clocks and return to the first player, paused.
    NewGame,
}

// What actually happened as a result of a command. Consumed by presentation and audio layers.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClockEvent {
    TurnChanged { from: usize, to: usize },
    // Nobody is left to take a turn; the clock has stopped.
    AllPassed,
    Paused,
    Resumed,
    RoundStarted,
    GameReset,
}

// Keyboard shortcuts shared by all front-ends:
//   - digits 1-9 finish the turn, but only if the digit is the active player's slot;
//   - "s" toggles pause.
// Returns `None` for keys that mean nothing to the clock.
pub fn command_for_key(key: char, active_idx: usize) -> Option<ClockCommand> {
    match key {
        '1'..='9' => {
            let slot = key.to_digit(10)? as usize - 1;
            (slot == active_idx).then_some(ClockCommand::Advance)
        }
        's' | 'S' => Some(ClockCommand::TogglePause),
        _ => None,
    }
}

#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod audio;
pub mod clock;
pub mod event;
pub mod game;
pub mod persistence;
pub mod player;
pub mod roster;
pub mod test_util;
pub mod util;

pub use clock::{ClockShowing, TimeBreakdown, TimerMode};
pub use event::{ClockCommand, ClockEvent, command_for_key};
pub use game::{ClockError, ClockStatus, TurnClock, TurnOutcome};
pub use player::{Player, PlayerColor, PlayerId};
pub use roster::{Roster, RosterError, StepDirection};

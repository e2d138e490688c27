// Test utilities shared by unit tests and the "tests" folder.

use std::time::Duration;

use instant::Instant;

use crate::player::{Player, PlayerColor, PlayerId};
use crate::roster::{PALETTE, Roster};


pub fn sample_roster(names: &[&str]) -> Roster {
    let players = names
        .iter()
        .enumerate()
        .map(|(order, name)| {
            Player::new(
                PlayerId::from_string(format!("player-{}", name.to_lowercase())),
                name,
                PlayerColor::parse(PALETTE[order]).unwrap(),
                order,
            )
        })
        .collect();
    Roster::from_players(players).unwrap()
}

// Game time that only moves when told to. Avoids sleeping in tests.
#[derive(Clone, Copy, Debug)]
pub struct ManualTime {
    origin: Instant,
    elapsed: Duration,
}

impl ManualTime {
    pub fn new() -> Self { ManualTime { origin: Instant::now(), elapsed: Duration::ZERO } }
    pub fn now(&self) -> Instant { self.origin + self.elapsed }
    pub fn advance(&mut self, d: Duration) -> Instant {
        self.elapsed += d;
        self.now()
    }
    pub fn advance_millis(&mut self, ms: u64) -> Instant { self.advance(Duration::from_millis(ms)) }
}

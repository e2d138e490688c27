// Rust-upgrade (https://github.com/rust-lang/rust/issues/46379):
//   remove `#[allow(dead_code)]` before public functions.

use std::time::Duration;

use itertools::Itertools;
use turn_clock::roster::Roster;
use turn_clock::test_util::ManualTime;
use turn_clock::TurnClock;


pub struct TestGame {
    pub clock: TurnClock,
    pub time: ManualTime,
}

impl TestGame {
    #[allow(dead_code)]
    pub fn new(roster: Roster) -> Self {
        TestGame { clock: TurnClock::new(roster), time: ManualTime::new() }
    }

    // Starts accrual for the first player.
    #[allow(dead_code)]
    pub fn new_running(roster: Roster) -> Self {
        let mut game = TestGame::new(roster);
        game.clock.toggle_pause(game.time.now());
        game
    }

    // Lets `ms` milliseconds pass, ticking every `tick_ms` like a front-end timer would.
    #[allow(dead_code)]
    pub fn wait(&mut self, ms: u64, tick_ms: u64) {
        let mut left = ms;
        while left > 0 {
            let step = left.min(tick_ms);
            let now = self.time.advance_millis(step);
            self.clock.tick(now);
            left -= step;
        }
    }

    #[allow(dead_code)]
    pub fn times_ms(&self) -> Vec<u128> {
        let now = self.time.now();
        (0..self.clock.roster().len()).map(|idx| self.clock.time_of(idx, now).as_millis()).collect()
    }
}

#[allow(dead_code)]
pub fn assert_roster_invariants(roster: &Roster) {
    for (idx, p) in roster.iter().enumerate() {
        assert_eq!(p.order, idx, "{roster:?}");
        assert!(p.time >= Duration::ZERO);
    }
    assert!(roster.iter().map(|p| &p.id).all_unique(), "{roster:?}");
    assert!(roster.iter().map(|p| &p.color).all_unique(), "{roster:?}");
}

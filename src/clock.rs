use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};


const MILLIS_PER_SEC: u128 = 1000;
const MILLIS_PER_DECI: u128 = MILLIS_PER_SEC / 10;

// The only mode: count up from zero the time each player spends on their turns.
// Kept as an enum because the value is part of the persisted settings.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TimerMode {
    #[default]
    CountUp,
}

impl TryFrom<u8> for TimerMode {
    type Error = String;
    fn try_from(v: u8) -> Result<Self, String> {
        match v {
            1 => Ok(TimerMode::CountUp),
            _ => Err(format!("unknown timer mode: {v}")),
        }
    }
}

impl From<TimerMode> for u8 {
    fn from(mode: TimerMode) -> Self {
        match mode {
            TimerMode::CountUp => 1,
        }
    }
}


#[derive(Clone, Debug)]
pub struct ClockShowing {
    pub is_active: bool,
    pub is_running: bool,
    pub passed: bool,
    pub show_separator: bool,
    pub time_breakdown: TimeBreakdown,
}

// Improvement potential: Switch to "H:MM:SS" after an hour instead of showing 60+ minutes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TimeBreakdown {
    pub minutes: u64,
    pub seconds: u64,
    pub deciseconds: u64,
}

impl From<Duration> for TimeBreakdown {
    fn from(time: Duration) -> Self {
        // Always truncate: the clock counts up, so a player should never see a value they haven't
        // actually reached yet.
        let millis = time.as_millis();
        let ds = millis / MILLIS_PER_DECI;
        let s = millis / MILLIS_PER_SEC;
        TimeBreakdown {
            minutes: (s / 60) as u64,
            seconds: (s % 60) as u64,
            deciseconds: (ds % 10) as u64,
        }
    }
}

impl fmt::Display for TimeBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}.{}", self.minutes, self.seconds, self.deciseconds)
    }
}

impl ClockShowing {
    pub fn new(time: Duration, is_active: bool, is_running: bool, passed: bool) -> Self {
        let time_breakdown = TimeBreakdown::from(time);
        // Blink the separator for the running clock, like a physical one.
        let show_separator = !(is_active && is_running) || time.subsec_millis() < 500;
        ClockShowing {
            is_active,
            is_running,
            passed,
            show_separator,
            time_breakdown,
        }
    }

    pub fn ui_string(&self) -> String {
        let TimeBreakdown { minutes, seconds, deciseconds } = self.time_breakdown;
        let separator = if self.show_separator { ":" } else { " " };
        format!("{minutes:02}{separator}{seconds:02}.{deciseconds}")
    }
}

pub fn duration_to_mss(d: Duration) -> String {
    let s = d.as_secs();
    format!("{}:{:02}", s / 60, s % 60)
}

use std::fmt;
use std::time::Duration;

use lazy_static::lazy_static;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::util::truncate_chars;


pub const MAX_NAME_LEN: usize = 8;

#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn generate() -> Self { PlayerId(format!("player-{}", uuid::Uuid::new_v4())) }
    pub fn from_string(s: impl Into<String>) -> Self { PlayerId(s.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}


// Color in "#RRGGBB" form. Stored upper-case so that "#ff6b6b" and "#FF6B6B" are the same color
// for the purposes of uniqueness.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerColor(String);

impl PlayerColor {
    pub fn parse(s: &str) -> Result<Self, ()> {
        lazy_static! {
            static ref HEX_COLOR_RE: Regex = Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap();
        }
        if HEX_COLOR_RE.is_match(s) {
            Ok(PlayerColor(s.to_ascii_uppercase()))
        } else {
            Err(())
        }
    }

    pub fn as_str(&self) -> &str { &self.0 }

    pub fn rgb(&self) -> (u8, u8, u8) {
        // Validated in `parse`, so every channel is two hex digits.
        let channel = |i: usize| u8::from_str_radix(&self.0[i..i + 2], 16).unwrap_or(0);
        (channel(1), channel(3), channel(5))
    }
}

impl TryFrom<String> for PlayerColor {
    type Error = String;
    fn try_from(s: String) -> Result<Self, String> {
        PlayerColor::parse(&s).map_err(|()| format!("invalid color: {s:?}"))
    }
}

impl From<PlayerColor> for String {
    fn from(color: PlayerColor) -> Self { color.0 }
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}


#[derive(Clone, PartialEq, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: PlayerColor,
    // Total time spent as the active player since the game started.
    pub time: Duration,
    // Position in the roster. Kept equal to the index by `Roster`.
    pub order: usize,
    // Skipped by turn advance until the next round.
    pub passed: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: &str, color: PlayerColor, order: usize) -> Self {
        Player {
            id,
            name: sanitize_name(name),
            color,
            time: Duration::ZERO,
            order,
            passed: false,
        }
    }

    pub fn time_secs(&self) -> f64 { self.time.as_secs_f64() }
}

// Names are kept as typed, spaces included. Only the length is limited.
pub fn sanitize_name(name: &str) -> String { truncate_chars(name, MAX_NAME_LEN).to_owned() }


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_parsing() {
        assert_eq!(PlayerColor::parse("#ff6b6b").unwrap().as_str(), "#FF6B6B");
        assert_eq!(PlayerColor::parse("#45B7D1").unwrap().rgb(), (0x45, 0xB7, 0xD1));
        assert!(PlayerColor::parse("FF6B6B").is_err());
        assert!(PlayerColor::parse("#FF6B6").is_err());
        assert!(PlayerColor::parse("#GG6B6B").is_err());
    }

    #[test]
    fn color_serde() {
        let color: PlayerColor = serde_json::from_str(r##""#9b59b6""##).unwrap();
        assert_eq!(serde_json::to_string(&color).unwrap(), r##""#9B59B6""##);
        assert!(serde_json::from_str::<PlayerColor>(r#""purple""#).is_err());
    }

    #[test]
    fn names_are_truncated() {
        assert_eq!(sanitize_name("Alexander the Great"), "Alexande");
        assert_eq!(sanitize_name("  Bob  "), "  Bob  ");
        assert_eq!(sanitize_name("   Bob Smith"), "   Bob S");
        assert_eq!(sanitize_name("Мирослава!"), "Мирослав");
    }
}

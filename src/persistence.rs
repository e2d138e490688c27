use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::clock::TimerMode;
use crate::player::{Player, PlayerColor, PlayerId};
use crate::roster::Roster;


pub const SETTINGS_KEY: &str = "chessClockSettings";

// Key-value storage for settings. Keys are short ASCII identifiers.
pub trait SettingsStore {
    fn read(&self, key: &str) -> io::Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&mut self, key: &str) -> io::Result<()>;
}

// Stores each key as "<key>.json" in a directory. The directory is created on first write.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self { FileStore { dir: dir.into() } }
    pub fn dir(&self) -> &PathBuf { &self.dir }
    fn path(&self, key: &str) -> PathBuf { self.dir.join(format!("{key}.json")) }
}

impl SettingsStore for FileStore {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)
    }
    fn remove(&mut self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path(key)) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[derive(Clone, Default, Debug)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

impl SettingsStore for MemoryStore {
    fn read(&self, key: &str) -> io::Result<Option<String>> { Ok(self.entries.get(key).cloned()) }
    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
    fn remove(&mut self, key: &str) -> io::Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}


#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedSettings {
    player_count: usize,
    players: Vec<SavedPlayer>,
    // Written for format compatibility. There is only one mode, so whatever is stored is ignored.
    #[serde(skip_deserializing)]
    timer_mode: TimerMode,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct SavedPlayer {
    id: PlayerId,
    name: String,
    color: PlayerColor,
    order: usize,
    // Always written as zero: elapsed time is not part of the setup. Kept for format compatibility.
    #[serde(default)]
    time: f64,
}

fn to_saved(roster: &Roster) -> SavedSettings {
    SavedSettings {
        player_count: roster.len(),
        players: roster
            .iter()
            .map(|p| SavedPlayer {
                id: p.id.clone(),
                name: p.name.clone(),
                color: p.color.clone(),
                order: p.order,
                time: 0.0,
            })
            .collect(),
        timer_mode: TimerMode::CountUp,
    }
}

fn from_saved(settings: SavedSettings) -> Result<Roster, String> {
    if settings.players.len() != settings.player_count {
        return Err(format!(
            "player count mismatch: {} declared, {} stored",
            settings.player_count,
            settings.players.len()
        ));
    }
    let players = settings
        .players
        .into_iter()
        .map(|p| {
            if p.time != 0.0 {
                log::debug!("Discarding saved time {}s for {}", p.time, p.id);
            }
            Player::new(p.id, &p.name, p.color, p.order)
        })
        .collect();
    Roster::from_players(players).map_err(|err| format!("invalid roster: {err:?}"))
}

pub fn save(store: &mut impl SettingsStore, roster: &Roster) -> io::Result<()> {
    let json = serde_json::to_string(&to_saved(roster))?;
    store.write(SETTINGS_KEY, &json)
}

// Returns `None` if there are no saved settings or they cannot be used. Broken settings are never
// an error: the caller falls back to defaults.
pub fn load(store: &impl SettingsStore) -> Option<Roster> {
    let json = match store.read(SETTINGS_KEY) {
        Ok(Some(json)) => json,
        Ok(None) => return None,
        Err(err) => {
            log::warn!("Error reading settings: {err}");
            return None;
        }
    };
    let settings = match serde_json::from_str::<SavedSettings>(&json) {
        Ok(settings) => settings,
        Err(err) => {
            log::warn!("Error parsing settings: {err}");
            return None;
        }
    };
    match from_saved(settings) {
        Ok(roster) => Some(roster),
        Err(err) => {
            log::warn!("Ignoring saved settings: {err}");
            None
        }
    }
}

pub fn load_or_default(store: &impl SettingsStore, default_count: usize) -> Roster {
    load(store).unwrap_or_else(|| {
        Roster::with_defaults(default_count)
            .unwrap_or_else(|_| Roster::with_defaults(crate::roster::DEFAULT_PLAYER_COUNT).unwrap())
    })
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn stored_format() {
        let mut store = MemoryStore::new();
        let roster = Roster::with_defaults(2).unwrap();
        save(&mut store, &roster).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&store.read(SETTINGS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(json["playerCount"], 2);
        assert_eq!(json["timerMode"], 1);
        assert_eq!(json["players"][1]["name"], "Player 2");
        assert_eq!(json["players"][1]["color"], "#45B7D1");
        assert_eq!(json["players"][1]["order"], 1);
        assert_eq!(json["players"][1]["time"], 0.0);
        assert_eq!(json["players"][0]["id"], roster.get(0).unwrap().id.as_str());
    }

    #[test]
    fn loads_settings_written_by_hand() {
        let mut store = MemoryStore::new();
        store
            .write(
                SETTINGS_KEY,
                r##"{
                    "playerCount": 2,
                    "players": [
                        {"id": "player-b", "name": "Bob", "color": "#45b7d1", "order": 1, "time": 12.5},
                        {"id": "player-a", "name": "Alice", "color": "#FF6B6B", "order": 0, "time": 0}
                    ],
                    "timerMode": 1
                }"##,
            )
            .unwrap();
        let roster = load(&store).unwrap();
        let names: Vec<_> = roster.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
        assert!(roster.iter().all(|p| p.time == Duration::ZERO));
        assert_eq!(roster.get(1).unwrap().color.as_str(), "#45B7D1");
    }

    #[test]
    fn broken_settings_are_ignored() {
        let cases = [
            "not json",
            r#"{"playerCount": 3, "players": [], "timerMode": 1}"#,
            r##"{"playerCount": 1, "players": [{"id": "x", "name": "X", "color": "red", "order": 0}], "timerMode": 1}"##,
            r##"{"playerCount": 2, "players": [
                {"id": "x", "name": "X", "color": "#FF0000", "order": 0},
                {"id": "y", "name": "Y", "color": "#FF0000", "order": 1}
            ], "timerMode": 1}"##,
        ];
        for json in cases {
            let mut store = MemoryStore::new();
            store.write(SETTINGS_KEY, json).unwrap();
            assert!(load(&store).is_none(), "{json}");
        }
        assert!(load(&MemoryStore::new()).is_none());
    }

    #[test]
    fn stored_timer_mode_is_ignored() {
        let player = r##"{"id": "x", "name": " X ", "color": "#FF0000", "order": 0}"##;
        for mode in [r#", "timerMode": 7"#, r#", "timerMode": "up""#, ""] {
            let json = format!(r#"{{"playerCount": 1, "players": [{player}]{mode}}}"#);
            let mut store = MemoryStore::new();
            store.write(SETTINGS_KEY, &json).unwrap();
            let roster = load(&store).unwrap_or_else(|| panic!("{json}"));
            assert_eq!(roster.get(0).unwrap().name, " X ");
        }
    }

    #[test]
    fn load_or_default_falls_back() {
        let roster = load_or_default(&MemoryStore::new(), 5);
        assert_eq!(roster.len(), 5);
        let roster = load_or_default(&MemoryStore::new(), 42);
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn file_store() {
        let dir = std::env::temp_dir().join(format!("turn_clock_test_{}", uuid::Uuid::new_v4()));
        let mut store = FileStore::new(&dir);
        assert_eq!(store.read("k").unwrap(), None);
        store.write("k", "v").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.read("k").unwrap(), None);
        fs::remove_dir_all(&dir).unwrap();
    }
}

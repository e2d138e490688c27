use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use turn_clock::roster::DEFAULT_PLAYER_COUNT;


// Tick period of the interactive clock. Time is accrued from wall-clock deltas, so this only
// affects how often the screen is refreshed.
const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    // Where player setup and the log file are kept.
    pub settings_dir: PathBuf,
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,
    // Used when there is no saved setup.
    pub default_player_count: usize,
    // Ring the terminal bell when a new turn starts.
    pub bell: bool,
    // Directory with "<player name>_bgm.mp3" themes.
    pub theme_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let home = std::env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from);
        AppConfig {
            settings_dir: home.join(".turn_clock"),
            tick_interval: DEFAULT_TICK_INTERVAL,
            default_player_count: DEFAULT_PLAYER_COUNT,
            bell: true,
            theme_dir: None,
        }
    }
}

pub fn read_config_file(path: &Path) -> anyhow::Result<AppConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'.", path.display()))?;
    let config: AppConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file '{}'.", path.display()))?;
    if config.tick_interval.is_zero() {
        anyhow::bail!("tick_interval must be positive");
    }
    Ok(config)
}

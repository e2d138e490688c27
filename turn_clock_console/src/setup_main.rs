use anyhow::{Context, anyhow, bail};
use turn_clock::persistence::{self, FileStore, SETTINGS_KEY, SettingsStore};
use turn_clock::roster::{MAX_PLAYERS, MIN_PLAYERS, is_valid_player_count};
use turn_clock::{PlayerColor, PlayerId, Roster, StepDirection};

use crate::app_config::AppConfig;
use crate::tui;


pub enum MoveTarget {
    Top,
    Bottom,
    Step(StepDirection),
}

// Positions are 1-based, as shown by `setup show`.
pub enum SetupCommand {
    Show,
    Count(usize),
    Rename { position: usize, name: String },
    Color { position: usize, color: String },
    Move { position: usize, target: MoveTarget },
    Reset,
}

fn player_id_at(roster: &Roster, position: usize) -> anyhow::Result<PlayerId> {
    position
        .checked_sub(1)
        .and_then(|idx| roster.get(idx))
        .map(|p| p.id.clone())
        .ok_or_else(|| anyhow!("No player at position {position}; there are {}", roster.len()))
}

fn edit(roster: &mut Roster, command: SetupCommand) -> anyhow::Result<()> {
    match command {
        SetupCommand::Show | SetupCommand::Reset => {}
        SetupCommand::Count(count) => {
            if !is_valid_player_count(count) {
                bail!(
                    "Player count must be between {MIN_PLAYERS} and {MAX_PLAYERS}; keeping {} players",
                    roster.len()
                );
            }
            if count != roster.len() {
                roster.resize(count).map_err(|err| anyhow!("{err:?}"))?;
            }
        }
        SetupCommand::Rename { position, name } => {
            let id = player_id_at(roster, position)?;
            roster.set_name(&id, &name).map_err(|err| anyhow!("{err:?}"))?;
        }
        SetupCommand::Color { position, color } => {
            let id = player_id_at(roster, position)?;
            let color = PlayerColor::parse(&color)
                .map_err(|()| anyhow!("Invalid color '{color}', expected #RRGGBB"))?;
            roster.set_color(&id, color).map_err(|err| anyhow!("{err:?}"))?;
        }
        SetupCommand::Move { position, target } => {
            let id = player_id_at(roster, position)?;
            match target {
                MoveTarget::Top => roster.move_to_edge(&id, true),
                MoveTarget::Bottom => roster.move_to_edge(&id, false),
                MoveTarget::Step(direction) => roster.move_step(&id, direction),
            }
            .map_err(|err| anyhow!("{err:?}"))?;
        }
    }
    Ok(())
}

pub fn run(config: AppConfig, command: SetupCommand) -> anyhow::Result<()> {
    let mut store = FileStore::new(&config.settings_dir);
    if let SetupCommand::Reset = command {
        store.remove(SETTINGS_KEY).context("Failed to remove saved settings")?;
        log::info!("Saved settings removed");
    }
    let mut roster = persistence::load_or_default(&store, config.default_player_count);
    let is_edit = !matches!(command, SetupCommand::Show | SetupCommand::Reset);
    edit(&mut roster, command)?;
    if is_edit {
        persistence::save(&mut store, &roster).with_context(|| {
            format!("Failed to save settings to '{}'", store.dir().display())
        })?;
    }
    println!("{}", tui::render_roster(&roster));
    Ok(())
}

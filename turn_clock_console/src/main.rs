// Legend for various fix-this comments:
//   * "TODO" - bug or missing crucial feature.
//   * "Improvement potential" - missing nice-to-have feature or an opportunity
//       to make code better or faster.

#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

mod app_config;
mod cue_sink;
mod play_main;
mod setup_main;
mod tui;

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use app_config::{AppConfig, read_config_file};
use clap::{ArgMatches, Command, arg};
use setup_main::{MoveTarget, SetupCommand};
use turn_clock::StepDirection;
use turn_clock::persistence::{self, FileStore};

const LOG_FILE_NAME: &str = "turn_clock.log";

fn init_logging(target: env_logger::Target) {
    env_logger::Builder::new()
        .target(target)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

fn position_arg() -> clap::Arg {
    arg!(<position> "Player position, starting from 1").value_parser(clap::value_parser!(usize))
}

fn setup_command(matches: &ArgMatches) -> SetupCommand {
    match matches.subcommand() {
        Some(("count", sub)) => SetupCommand::Count(*sub.get_one::<usize>("count").unwrap()),
        Some(("rename", sub)) => SetupCommand::Rename {
            position: *sub.get_one::<usize>("position").unwrap(),
            name: sub.get_one::<String>("name").unwrap().clone(),
        },
        Some(("color", sub)) => SetupCommand::Color {
            position: *sub.get_one::<usize>("position").unwrap(),
            color: sub.get_one::<String>("color").unwrap().clone(),
        },
        Some(("move", sub)) => SetupCommand::Move {
            position: *sub.get_one::<usize>("position").unwrap(),
            target: match sub.get_one::<String>("target").unwrap().as_str() {
                "top" => MoveTarget::Top,
                "bottom" => MoveTarget::Bottom,
                "up" => MoveTarget::Step(StepDirection::Up),
                "down" => MoveTarget::Step(StepDirection::Down),
                _ => unreachable!(),
            },
        },
        Some(("reset", _)) => SetupCommand::Reset,
        Some(("show", _)) | None => SetupCommand::Show,
        Some(_) => unreachable!(),
    }
}

fn main() -> anyhow::Result<()> {
    let matches = Command::new("Turn clock")
        .author(clap::crate_authors!())
        .version(clap::crate_version!())
        .about("Chess clock for any number of players")
        .subcommand_required(true)
        .arg(
            arg!(-c --"config" <config_file> "Path to the configuration file: yaml-serialized AppConfig.")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .subcommand(Command::new("play").about("Run the clock"))
        .subcommand(
            Command::new("setup")
                .about("View or edit the saved players")
                .subcommand(Command::new("show").about("List players"))
                .subcommand(
                    Command::new("count").about("Replace players with N default players").arg(
                        arg!(<count> "Number of players").value_parser(clap::value_parser!(usize)),
                    ),
                )
                .subcommand(
                    Command::new("rename")
                        .about("Rename a player; names longer than 8 characters are truncated")
                        .arg(position_arg())
                        .arg(arg!(<name> "New name")),
                )
                .subcommand(
                    Command::new("color")
                        .about("Change player color; a color already in use is swapped")
                        .arg(position_arg())
                        .arg(arg!(<color> "Color as #RRGGBB")),
                )
                .subcommand(
                    Command::new("move").about("Change play order").arg(position_arg()).arg(
                        arg!(<target> "Where to move the player")
                            .value_parser(["top", "bottom", "up", "down"]),
                    ),
                )
                .subcommand(Command::new("reset").about("Forget saved players")),
        )
        .get_matches();

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => read_config_file(path)?,
        None => AppConfig::default(),
    };

    match matches.subcommand() {
        Some(("play", _)) => {
            // The screen belongs to the clock, so logs go to a file.
            fs::create_dir_all(&config.settings_dir).with_context(|| {
                format!("Failed to create '{}'", config.settings_dir.display())
            })?;
            let log_path = config.settings_dir.join(LOG_FILE_NAME);
            let log_file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .with_context(|| format!("Failed to open log file '{}'", log_path.display()))?;
            init_logging(env_logger::Target::Pipe(Box::new(log_file)));
            let store = FileStore::new(&config.settings_dir);
            let roster = persistence::load_or_default(&store, config.default_player_count);
            play_main::run(config, roster)?;
            Ok(())
        }
        Some(("setup", sub_matches)) => {
            init_logging(env_logger::Target::Stdout);
            setup_main::run(config, setup_command(sub_matches))
        }
        _ => unreachable!(),
    }
}

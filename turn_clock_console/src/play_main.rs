use std::fmt;
use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::style::{self, Stylize};
use crossterm::{cursor, event as term_event, execute, terminal};
use instant::Instant;
use itertools::Itertools;
use scopeguard::defer;
use turn_clock::audio::CueQueue;
use turn_clock::event::{ClockCommand, command_for_key};
use turn_clock::util::wrapping_index;
use turn_clock::{ClockError, Roster, StepDirection, TurnClock};

use crate::app_config::AppConfig;
use crate::cue_sink::TerminalCueSink;
use crate::tui;


enum IncomingEvent {
    Terminal(term_event::Event),
    Tick,
}

enum Mode {
    Clock,
    // Reordering players before the next round. `selected` is a roster index.
    OrderAdjustment { selected: usize },
    ConfirmNewGame,
}

enum KeyOutcome {
    Continue,
    Quit,
}

fn writeln_raw(stdout: &mut impl io::Write, v: impl fmt::Display) -> io::Result<()> {
    let s = v.to_string();
    // Note. Not using `lines()` because it removes trailing new line.
    for line in s.split('\n') {
        execute!(
            stdout,
            style::Print(line),
            terminal::Clear(terminal::ClearType::UntilNewLine),
            cursor::MoveToNextLine(1),
            cursor::Hide
        )?;
    }
    Ok(())
}

fn describe_error(err: ClockError) -> &'static str {
    match err {
        ClockError::NoSuchPlayer => "No such player",
        ClockError::PlayerPassed => "This player has passed until the next round",
        ClockError::AlreadyActive => "It is already this player's turn",
        ClockError::NotActivePlayer => "Only the active player can pass",
    }
}

fn render(
    stdout: &mut impl io::Write, clock: &TurnClock, mode: &Mode, sink: &TerminalCueSink,
    message: &Option<String>,
) -> io::Result<()> {
    let now = Instant::now();
    // Each frame is drawn over the previous one. Leftovers are cleared line by line and below.
    execute!(stdout, cursor::MoveTo(0, 0))?;
    match mode {
        Mode::Clock => {
            writeln_raw(stdout, tui::render_game(clock, now))?;
            if let Some(playing) = sink.now_playing(now) {
                writeln_raw(stdout, playing.with(style::Color::Cyan))?;
            }
            writeln_raw(stdout, tui::render_help())?;
        }
        Mode::OrderAdjustment { selected } => {
            writeln_raw(stdout, tui::render_order_adjustment(clock.roster(), *selected))?;
        }
        Mode::ConfirmNewGame => {
            writeln_raw(stdout, tui::render_game(clock, now))?;
            writeln_raw(
                stdout,
                "Start a new game? All clocks will be reset. (y/n)".with(style::Color::Yellow),
            )?;
        }
    }
    if let Some(msg) = message {
        writeln_raw(stdout, msg.clone().with(style::Color::Red))?;
    }
    execute!(stdout, terminal::Clear(terminal::ClearType::FromCursorDown))?;
    Ok(())
}

struct Session {
    clock: TurnClock,
    cues: CueQueue,
    mode: Mode,
    message: Option<String>,
}

impl Session {
    fn execute(&mut self, command: ClockCommand) {
        let now = Instant::now();
        match self.clock.apply(command, now) {
            Ok(event) => {
                log::info!("{:?}", event);
                self.cues.on_event(event, &self.clock, now);
                self.message = None;
            }
            Err(err) => {
                self.message = Some(describe_error(err).to_owned());
            }
        }
    }

    fn on_key(&mut self, key: term_event::KeyEvent) -> KeyOutcome {
        use term_event::KeyCode;
        if key.kind != term_event::KeyEventKind::Press {
            return KeyOutcome::Continue;
        }
        match self.mode {
            Mode::Clock => match key.code {
                KeyCode::Char('q') => return KeyOutcome::Quit,
                KeyCode::Char('n') | KeyCode::Char(' ') => self.execute(ClockCommand::Advance),
                KeyCode::Char('p') => {
                    let id = self.clock.active_player().id.clone();
                    self.execute(ClockCommand::Pass(id));
                }
                KeyCode::Char('r') => {
                    // Pass flags are cleared as soon as the order list opens.
                    self.clock.reset_round();
                    self.mode = Mode::OrderAdjustment { selected: 0 };
                }
                KeyCode::Char('N') => self.mode = Mode::ConfirmNewGame,
                KeyCode::Char(ch) => {
                    if let Some(command) = command_for_key(ch, self.clock.active_index()) {
                        self.execute(command);
                    }
                }
                KeyCode::F(n) => match self.clock.roster().get(usize::from(n).wrapping_sub(1)) {
                    Some(player) => {
                        let id = player.id.clone();
                        self.execute(ClockCommand::SwitchTo(id));
                    }
                    None => self.message = Some(format!("No player in slot {n}")),
                },
                _ => {}
            },
            Mode::OrderAdjustment { selected } => {
                let n = self.clock.roster().len();
                let selected_id = self.clock.roster().players()[selected].id.clone();
                match key.code {
                    KeyCode::Up => {
                        self.mode = Mode::OrderAdjustment {
                            selected: wrapping_index(selected as isize - 1, n),
                        };
                    }
                    KeyCode::Down => {
                        self.mode = Mode::OrderAdjustment {
                            selected: wrapping_index(selected as isize + 1, n),
                        };
                    }
                    KeyCode::Char('u') | KeyCode::Char('d') => {
                        let direction = if key.code == KeyCode::Char('u') {
                            StepDirection::Up
                        } else {
                            StepDirection::Down
                        };
                        if let Err(err) = self.clock.move_player(&selected_id, direction) {
                            self.message = Some(format!("Cannot move player: {err:?}"));
                        }
                        let selected = self.clock.roster().index_of(&selected_id).unwrap_or(0);
                        self.mode = Mode::OrderAdjustment { selected };
                    }
                    KeyCode::Enter => {
                        self.mode = Mode::Clock;
                        self.execute(ClockCommand::NextRound);
                    }
                    KeyCode::Esc => self.mode = Mode::Clock,
                    _ => {}
                }
            }
            Mode::ConfirmNewGame => {
                if key.code == KeyCode::Char('y') {
                    self.execute(ClockCommand::NewGame);
                }
                self.mode = Mode::Clock;
            }
        }
        KeyOutcome::Continue
    }
}

pub fn run(config: AppConfig, roster: Roster) -> io::Result<()> {
    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;
    defer! {
        execute!(io::stdout(), cursor::Show, terminal::LeaveAlternateScreen).unwrap();
        terminal::disable_raw_mode().unwrap();
    };

    let (tx, rx) = mpsc::channel();
    let tx_local = tx.clone();
    let tx_tick = tx;
    thread::spawn(move || {
        while let Ok(ev) = term_event::read() {
            if tx_local.send(IncomingEvent::Terminal(ev)).is_err() {
                break;
            }
        }
    });
    // The only tick source. Ticking an already-flushed segment adds nothing, so a late tick
    // cannot double-count time.
    let tick_interval: Duration = config.tick_interval;
    thread::spawn(move || {
        loop {
            thread::sleep(tick_interval);
            if tx_tick.send(IncomingEvent::Tick).is_err() {
                break;
            }
        }
    });

    let mut sink = TerminalCueSink::new(config.bell, config.theme_dir.clone());
    let mut session = Session {
        clock: TurnClock::new(roster),
        cues: CueQueue::new(),
        mode: Mode::Clock,
        message: Some("Press s to start the clock".to_owned()),
    };
    log::info!(
        "Starting a game for {}",
        session.clock.roster().iter().map(|p| p.name.as_str()).join(", ")
    );
    render(&mut stdout, &session.clock, &session.mode, &sink, &session.message)?;
    for event in rx {
        match event {
            IncomingEvent::Terminal(term_event::Event::Key(key)) => {
                if let KeyOutcome::Quit = session.on_key(key) {
                    let total = session.clock.total_time(Instant::now());
                    let total = Duration::from_secs(total.as_secs());
                    log::info!("Quitting after {} of play", humantime::format_duration(total));
                    return Ok(());
                }
            }
            IncomingEvent::Terminal(_) => {}
            IncomingEvent::Tick => {
                session.clock.tick(Instant::now());
            }
        }
        session.cues.update(Instant::now(), &mut sink);
        render(&mut stdout, &session.clock, &session.mode, &sink, &session.message)?;
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use turn_clock::test_util::sample_roster;

    use super::*;

    #[test]
    fn frame_is_drawn_without_clearing_the_screen() {
        let clock = TurnClock::new(sample_roster(&["Alice", "Bob"]));
        let sink = TerminalCueSink::new(false, None);
        let mut out = Vec::new();
        render(&mut out, &clock, &Mode::Clock, &sink, &Some("Hi".to_owned())).unwrap();
        let frame = String::from_utf8(out).unwrap();
        assert!(frame.starts_with("\x1b[1;1H"), "{frame:?}");
        assert!(!frame.contains("\x1b[2J"), "{frame:?}");
        assert!(frame.contains("\x1b[K"), "{frame:?}");
        assert!(frame.ends_with("\x1b[J"), "{frame:?}");
        assert!(frame.contains("Alice"));
    }
}

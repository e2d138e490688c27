// Audio cues that accompany turn changes: a short "your turn" signal and a looping theme per
// player. Purely cosmetic: nothing here can affect the clock, and every playback failure is
// logged and skipped.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

use instant::Instant;

use crate::event::ClockEvent;
use crate::game::TurnClock;


// Fade applied when a cue starts, and when a one-shot cue ends.
pub const FADE_DURATION: Duration = Duration::from_millis(100);
// Fade applied when a theme is stopped because the turn ended or the clock was paused.
pub const THEME_FADE_OUT_DURATION: Duration = Duration::from_millis(500);

pub const TURN_START_VOLUME: f32 = 1.0;
pub const THEME_VOLUME: f32 = 0.5;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum SoundCue {
    TurnStart,
    // Background music of the given player. Loops until stopped.
    Theme(String),
}

impl SoundCue {
    pub fn volume(&self) -> f32 {
        match self {
            SoundCue::TurnStart => TURN_START_VOLUME,
            SoundCue::Theme(_) => THEME_VOLUME,
        }
    }

    pub fn is_looping(&self) -> bool { matches!(self, SoundCue::Theme(_)) }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CueError {
    Missing,
    Unavailable,
}

pub trait CueSink {
    // Starts `cue` at `volume`, skipping the first `start_at` of it.
    fn play(&mut self, cue: &SoundCue, volume: f32, start_at: Duration) -> Result<(), CueError>;
    fn set_volume(&mut self, cue: &SoundCue, volume: f32);
    fn stop(&mut self, cue: &SoundCue);
    // Whether a one-shot cue has played to the end. Never asked about looping cues.
    fn is_finished(&self, cue: &SoundCue) -> bool;
}

pub fn theme_file_name(player_name: &str) -> String { format!("{player_name}_bgm.mp3") }

pub fn theme_path(theme_dir: &Path, player_name: &str) -> PathBuf {
    theme_dir.join(theme_file_name(player_name))
}

// Linear fade from `start` to `target` over `duration`.
pub fn fade_volume(start: f32, target: f32, elapsed: Duration, duration: Duration) -> f32 {
    let progress = if duration.is_zero() {
        1.0
    } else {
        (elapsed.as_secs_f32() / duration.as_secs_f32()).min(1.0)
    };
    start + (target - start) * progress
}


#[derive(Clone, Copy, Debug)]
enum Stage {
    FadingIn { started: Instant },
    // One-shot cue at full volume, waiting for the sink to report the end.
    Playing,
    FadingOut { started: Instant },
}

// The cue that holds the queue.
#[derive(Clone, Debug)]
struct CurrentCue {
    cue: SoundCue,
    stage: Stage,
}

// A stopped theme fading out. Runs in parallel with the queue.
#[derive(Clone, Debug)]
struct ThemeFadeOut {
    cue: SoundCue,
    from: f32,
    started: Instant,
}

#[derive(Clone, Debug)]
struct ThemePlayback {
    cue: SoundCue,
    started: Instant,
    start_at: Duration,
}

// Plays cues one at a time. Every cue fades in; a one-shot cue then plays to the end and fades
// out before the next cue starts, while a theme lets the queue move on as soon as it has faded in.
// Stopping a theme remembers how far it got, and the next theme resumes from there.
#[derive(Clone, Debug, Default)]
pub struct CueQueue {
    pending: VecDeque<SoundCue>,
    current: Option<CurrentCue>,
    fade_outs: Vec<ThemeFadeOut>,
    theme: Option<ThemePlayback>,
    resume_at: Duration,
}

impl CueQueue {
    pub fn new() -> Self { Self::default() }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.current.is_none() && self.fade_outs.is_empty()
    }
    pub fn current_theme(&self) -> Option<&SoundCue> { self.theme.as_ref().map(|t| &t.cue) }
    pub fn resume_position(&self) -> Duration { self.resume_at }

    pub fn on_event(&mut self, event: ClockEvent, clock: &TurnClock, now: Instant) {
        match event {
            ClockEvent::TurnChanged { .. } | ClockEvent::Resumed | ClockEvent::RoundStarted => {
                self.stop_theme(now);
                if clock.is_running() {
                    self.pending.push_back(SoundCue::TurnStart);
                    self.pending.push_back(SoundCue::Theme(clock.active_player().name.clone()));
                }
            }
            ClockEvent::Paused | ClockEvent::AllPassed => {
                self.stop_theme(now);
            }
            ClockEvent::GameReset => {
                self.stop_theme(now);
                self.resume_at = Duration::ZERO;
            }
        }
    }

    pub fn update(&mut self, now: Instant, sink: &mut impl CueSink) {
        self.fade_outs.retain(|fade| {
            let elapsed = now.saturating_duration_since(fade.started);
            sink.set_volume(
                &fade.cue,
                fade_volume(fade.from, 0.0, elapsed, THEME_FADE_OUT_DURATION),
            );
            let done = elapsed >= THEME_FADE_OUT_DURATION;
            if done {
                sink.stop(&fade.cue);
            }
            !done
        });

        loop {
            if self.current.is_none() {
                match self.pending.pop_front() {
                    Some(cue) => {
                        self.start_cue(cue, now, sink);
                        continue;
                    }
                    None => return,
                }
            }
            let Some(current) = self.current.as_mut() else {
                return;
            };
            let volume = current.cue.volume();
            let stage = current.stage;
            match stage {
                Stage::FadingIn { started } => {
                    let elapsed = now.saturating_duration_since(started);
                    sink.set_volume(&current.cue, fade_volume(0.0, volume, elapsed, FADE_DURATION));
                    if elapsed < FADE_DURATION {
                        return;
                    }
                    if current.cue.is_looping() {
                        self.current = None;
                    } else {
                        current.stage = Stage::Playing;
                    }
                }
                Stage::Playing => {
                    if !sink.is_finished(&current.cue) {
                        return;
                    }
                    current.stage = Stage::FadingOut { started: now };
                }
                Stage::FadingOut { started } => {
                    let elapsed = now.saturating_duration_since(started);
                    sink.set_volume(&current.cue, fade_volume(volume, 0.0, elapsed, FADE_DURATION));
                    if elapsed < FADE_DURATION {
                        return;
                    }
                    sink.stop(&current.cue);
                    self.current = None;
                }
            }
        }
    }

    fn start_cue(&mut self, cue: SoundCue, now: Instant, sink: &mut impl CueSink) {
        let start_at = if cue.is_looping() { self.resume_at } else { Duration::ZERO };
        // A theme that is being brought back must not be stopped by its old fade-out.
        self.fade_outs.retain(|fade| fade.cue != cue);
        match sink.play(&cue, 0.0, start_at) {
            Ok(()) => {
                if cue.is_looping() {
                    self.theme = Some(ThemePlayback { cue: cue.clone(), started: now, start_at });
                }
                self.current = Some(CurrentCue { cue, stage: Stage::FadingIn { started: now } });
            }
            Err(err) => {
                log::warn!("Cannot play {cue:?}: {err:?}");
            }
        }
    }

    fn stop_theme(&mut self, now: Instant) {
        self.pending.retain(|cue| !cue.is_looping());
        let Some(theme) = self.theme.take() else {
            return;
        };
        self.resume_at = theme.start_at + now.saturating_duration_since(theme.started);
        let mut from = THEME_VOLUME;
        if let Some(current) = self.current.take_if(|current| current.cue == theme.cue) {
            if let Stage::FadingIn { started } = current.stage {
                let elapsed = now.saturating_duration_since(started);
                from = fade_volume(0.0, THEME_VOLUME, elapsed, FADE_DURATION);
            }
        }
        self.fade_outs.push(ThemeFadeOut { cue: theme.cue, from, started: now });
    }
}


#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::event::ClockCommand;
    use crate::roster::Roster;

    #[derive(Default)]
    struct RecordingSink {
        log: Vec<String>,
        volumes: HashMap<SoundCue, f32>,
        missing: Vec<String>,
        turn_start_finished: bool,
    }

    impl CueSink for RecordingSink {
        fn play(&mut self, cue: &SoundCue, volume: f32, start_at: Duration) -> Result<(), CueError> {
            if let SoundCue::Theme(name) = cue {
                if self.missing.contains(name) {
                    return Err(CueError::Missing);
                }
            }
            self.log.push(format!("play {cue:?} at {start_at:?}"));
            self.volumes.insert(cue.clone(), volume);
            Ok(())
        }
        fn set_volume(&mut self, cue: &SoundCue, volume: f32) {
            self.volumes.insert(cue.clone(), volume);
        }
        fn stop(&mut self, cue: &SoundCue) { self.log.push(format!("stop {cue:?}")); }
        fn is_finished(&self, cue: &SoundCue) -> bool {
            assert_eq!(*cue, SoundCue::TurnStart);
            self.turn_start_finished
        }
    }

    fn ms(m: u64) -> Duration { Duration::from_millis(m) }

    fn close(a: f32, b: f32) -> bool { (a - b).abs() < 1e-5 }

    fn leifeng() -> SoundCue { SoundCue::Theme("Leifeng".to_owned()) }

    // Calls `update` every 50 ms from `from_ms` to `to_ms` inclusive.
    fn pump(queue: &mut CueQueue, sink: &mut RecordingSink, t0: Instant, from_ms: u64, to_ms: u64) {
        for t in (from_ms..=to_ms).step_by(50) {
            queue.update(t0 + ms(t), sink);
        }
    }

    fn toggle(queue: &mut CueQueue, clock: &mut TurnClock, now: Instant) {
        let event = clock.apply(ClockCommand::TogglePause, now).unwrap();
        queue.on_event(event, clock, now);
    }

    #[test]
    fn fade() {
        assert!(close(fade_volume(0.0, 1.0, ms(0), ms(100)), 0.0));
        assert!(close(fade_volume(0.0, 1.0, ms(50), ms(100)), 0.5));
        assert!(close(fade_volume(1.0, 0.0, ms(250), ms(100)), 0.0));
        assert!(close(fade_volume(0.2, 0.8, ms(1), Duration::ZERO), 0.8));
    }

    #[test]
    fn theme_waits_for_turn_signal_to_end() {
        let t0 = Instant::now();
        let mut clock = TurnClock::new(Roster::with_defaults(3).unwrap());
        let mut queue = CueQueue::new();
        let mut sink = RecordingSink::default();

        toggle(&mut queue, &mut clock, t0);
        pump(&mut queue, &mut sink, t0, 0, 300);
        assert_eq!(sink.log, vec!["play TurnStart at 0ns"]);
        assert!(close(sink.volumes[&SoundCue::TurnStart], TURN_START_VOLUME));

        sink.turn_start_finished = true;
        pump(&mut queue, &mut sink, t0, 350, 600);
        assert_eq!(sink.log, vec![
            "play TurnStart at 0ns",
            "stop TurnStart",
            "play Theme(\"Leifeng\") at 0ns",
        ]);
        assert!(close(sink.volumes[&SoundCue::TurnStart], 0.0));
        assert!(close(sink.volumes[&leifeng()], THEME_VOLUME));
        assert_eq!(queue.current_theme(), Some(&leifeng()));
        assert!(queue.is_idle());
    }

    #[test]
    fn turn_change_swaps_themes() {
        let t0 = Instant::now();
        let mut clock = TurnClock::new(Roster::with_defaults(3).unwrap());
        let mut queue = CueQueue::new();
        let mut sink = RecordingSink { turn_start_finished: true, ..Default::default() };

        toggle(&mut queue, &mut clock, t0);
        pump(&mut queue, &mut sink, t0, 0, 500);
        let event = clock.apply(ClockCommand::Advance, t0 + ms(1_000)).unwrap();
        queue.on_event(event, &clock, t0 + ms(1_000));
        pump(&mut queue, &mut sink, t0, 1_000, 2_000);
        assert!(queue.is_idle());
        assert_eq!(sink.log[3..], [
            "play TurnStart at 0ns",
            "stop TurnStart",
            "play Theme(\"Dulang\") at 800ms",
            "stop Theme(\"Leifeng\")",
        ]);
    }

    #[test]
    fn theme_fades_out_slowly_and_resumes() {
        let t0 = Instant::now();
        let mut clock = TurnClock::new(Roster::with_defaults(3).unwrap());
        let mut queue = CueQueue::new();
        let mut sink = RecordingSink { turn_start_finished: true, ..Default::default() };

        // Signal at 0, its fade-out ends at 200, theme starts at 200.
        toggle(&mut queue, &mut clock, t0);
        pump(&mut queue, &mut sink, t0, 0, 400);
        assert_eq!(sink.log.last().unwrap(), "play Theme(\"Leifeng\") at 0ns");

        toggle(&mut queue, &mut clock, t0 + ms(2_200));
        assert_eq!(queue.resume_position(), ms(2_000));
        pump(&mut queue, &mut sink, t0, 2_200, 2_300);
        assert!(close(sink.volumes[&leifeng()], 0.4));
        assert_eq!(sink.log.last().unwrap(), "play Theme(\"Leifeng\") at 0ns");
        pump(&mut queue, &mut sink, t0, 2_350, 2_700);
        assert_eq!(sink.log.last().unwrap(), "stop Theme(\"Leifeng\")");
        assert!(queue.is_idle());

        toggle(&mut queue, &mut clock, t0 + ms(3_000));
        pump(&mut queue, &mut sink, t0, 3_000, 3_400);
        assert_eq!(sink.log.last().unwrap(), "play Theme(\"Leifeng\") at 2s");
    }

    #[test]
    fn new_game_rewinds_themes() {
        let t0 = Instant::now();
        let mut clock = TurnClock::new(Roster::with_defaults(3).unwrap());
        let mut queue = CueQueue::new();
        let mut sink = RecordingSink { turn_start_finished: true, ..Default::default() };

        toggle(&mut queue, &mut clock, t0);
        pump(&mut queue, &mut sink, t0, 0, 400);
        let event = clock.apply(ClockCommand::NewGame, t0 + ms(1_200)).unwrap();
        queue.on_event(event, &clock, t0 + ms(1_200));
        assert_eq!(queue.resume_position(), Duration::ZERO);
        pump(&mut queue, &mut sink, t0, 1_200, 1_800);
        assert_eq!(sink.log.last().unwrap(), "stop Theme(\"Leifeng\")");
    }

    #[test]
    fn missing_theme_is_skipped() {
        let t0 = Instant::now();
        let mut clock = TurnClock::new(Roster::with_defaults(3).unwrap());
        let mut queue = CueQueue::new();
        let mut sink = RecordingSink {
            missing: vec!["Leifeng".to_owned()],
            turn_start_finished: true,
            ..Default::default()
        };
        toggle(&mut queue, &mut clock, t0);
        pump(&mut queue, &mut sink, t0, 0, 300);
        assert!(queue.is_idle());
        assert_eq!(queue.current_theme(), None);
        assert_eq!(sink.log, vec!["play TurnStart at 0ns", "stop TurnStart"]);
    }

    #[test]
    fn theme_file() {
        assert_eq!(theme_file_name("Kaixin"), "Kaixin_bgm.mp3");
        assert_eq!(theme_path(Path::new("music"), "Kaixin"), Path::new("music/Kaixin_bgm.mp3"));
    }
}

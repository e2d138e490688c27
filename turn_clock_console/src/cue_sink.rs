use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use instant::Instant;
use turn_clock::audio::{CueError, CueSink, SoundCue, theme_file_name, theme_path};
use turn_clock::clock::duration_to_mss;


struct NowPlaying {
    file: String,
    volume: f32,
    started: Instant,
    start_at: Duration,
}

// Terminals cannot play music, so themes are only shown as a "now playing" line. The turn signal
// is the terminal bell, which is over as soon as it rings.
pub struct TerminalCueSink {
    bell: bool,
    theme_dir: Option<PathBuf>,
    now_playing: Option<NowPlaying>,
}

impl TerminalCueSink {
    pub fn new(bell: bool, theme_dir: Option<PathBuf>) -> Self {
        TerminalCueSink { bell, theme_dir, now_playing: None }
    }

    pub fn now_playing(&self, now: Instant) -> Option<String> {
        self.now_playing.as_ref().map(|p| {
            let position = p.start_at + now.saturating_duration_since(p.started);
            format!("♪ {} {} {:>3.0}%", p.file, duration_to_mss(position), p.volume * 100.0)
        })
    }
}

impl CueSink for TerminalCueSink {
    fn play(&mut self, cue: &SoundCue, volume: f32, start_at: Duration) -> Result<(), CueError> {
        match cue {
            SoundCue::TurnStart => {
                if self.bell {
                    let mut stdout = io::stdout();
                    stdout
                        .write_all(b"\x07")
                        .and_then(|()| stdout.flush())
                        .map_err(|_| CueError::Unavailable)?;
                }
                Ok(())
            }
            SoundCue::Theme(name) => {
                let dir = self.theme_dir.as_ref().ok_or(CueError::Unavailable)?;
                if !theme_path(dir, name).is_file() {
                    return Err(CueError::Missing);
                }
                self.now_playing = Some(NowPlaying {
                    file: theme_file_name(name),
                    volume,
                    started: Instant::now(),
                    start_at,
                });
                Ok(())
            }
        }
    }

    fn set_volume(&mut self, cue: &SoundCue, volume: f32) {
        if let (SoundCue::Theme(name), Some(playing)) = (cue, self.now_playing.as_mut()) {
            if playing.file == theme_file_name(name) {
                playing.volume = volume;
            }
        }
    }

    fn stop(&mut self, cue: &SoundCue) {
        if let SoundCue::Theme(name) = cue {
            if self.now_playing.as_ref().is_some_and(|p| p.file == theme_file_name(name)) {
                self.now_playing = None;
            }
        }
    }

    fn is_finished(&self, _cue: &SoundCue) -> bool { true }
}

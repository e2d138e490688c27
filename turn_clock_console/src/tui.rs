use console::Style;
use instant::Instant;
use itertools::Itertools;
use turn_clock::clock::duration_to_mss;
use turn_clock::{ClockShowing, ClockStatus, Player, PlayerColor, Roster, TurnClock};


// Nearest color in the 6x6x6 cube of the 256-color palette.
pub fn rgb_to_ansi256((r, g, b): (u8, u8, u8)) -> u8 {
    let level = |c: u8| ((c as u16 * 5 + 127) / 255) as u8;
    16 + 36 * level(r) + 6 * level(g) + level(b)
}

fn color_swatch(color: &PlayerColor) -> String {
    Style::new().on_color256(rgb_to_ansi256(color.rgb())).apply_to("  ").to_string()
}

fn render_clock(showing: &ClockShowing) -> String {
    let clock_str = showing.ui_string();
    if showing.passed {
        Style::new().dim().apply_to(clock_str).to_string()
    } else if showing.is_active {
        Style::new().reverse().apply_to(clock_str).to_string()
    } else {
        clock_str
    }
}

fn render_status(status: ClockStatus) -> String {
    match status {
        ClockStatus::Running => Style::new().green().apply_to("Running").to_string(),
        ClockStatus::Paused => Style::new().yellow().apply_to("Paused").to_string(),
        ClockStatus::AllPassed => {
            Style::new().magenta().apply_to("Everybody passed: press r for next round").to_string()
        }
    }
}

fn render_player_line(slot: usize, player: &Player, showing: &ClockShowing) -> String {
    let marker = if showing.is_active { '▶' } else { ' ' };
    let passed = if player.passed { "passed" } else { "" };
    format!(
        "{} {:>2} {} {:<8}  {}  {}",
        marker,
        slot + 1,
        color_swatch(&player.color),
        player.name,
        render_clock(showing),
        passed
    )
}

pub fn render_game(clock: &TurnClock, now: Instant) -> String {
    let header = format!(
        "{}    total {}\n",
        render_status(clock.status()),
        duration_to_mss(clock.total_time(now))
    );
    let lines = clock
        .roster()
        .iter()
        .enumerate()
        .map(|(idx, player)| render_player_line(idx, player, &clock.showing_for(idx, now)))
        .join("\n");
    format!("{header}\n{lines}\n")
}

pub fn render_order_adjustment(roster: &Roster, selected: usize) -> String {
    let lines = roster
        .iter()
        .enumerate()
        .map(|(idx, player)| {
            let line = format!("{:>2} {} {}", idx + 1, color_swatch(&player.color), player.name);
            if idx == selected {
                Style::new().reverse().apply_to(line).to_string()
            } else {
                line
            }
        })
        .join("\n");
    format!(
        "Next round order\n\n{lines}\n\n{}\n",
        Style::new().dim().apply_to("↑/↓ select   u/d move   Enter start   Esc cancel")
    )
}

pub fn render_roster(roster: &Roster) -> String {
    roster
        .iter()
        .map(|p| format!("{:>2} {} {:<8} {}", p.order + 1, color_swatch(&p.color), p.name, p.color))
        .join("\n")
}

pub fn render_help() -> String {
    Style::new()
        .dim()
        .apply_to(concat!(
            "1-9/n/space next   p pass   s pause   F1-F10 switch\n",
            "r next round   N new game   q quit"
        ))
        .to_string()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ansi256() {
        assert_eq!(rgb_to_ansi256((0, 0, 0)), 16);
        assert_eq!(rgb_to_ansi256((255, 255, 255)), 231);
        assert_eq!(rgb_to_ansi256((255, 0, 0)), 196);
        assert_eq!(rgb_to_ansi256((0x45, 0xB7, 0xD1)), 16 + 36 + 6 * 4 + 4);
    }
}

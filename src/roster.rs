use std::collections::HashSet;
use std::time::Duration;

use itertools::Itertools;
use strum::EnumIter;

use crate::player::{Player, PlayerColor, PlayerId, sanitize_name};


pub const MIN_PLAYERS: usize = 1;
pub const MAX_PLAYERS: usize = 10;
pub const DEFAULT_PLAYER_COUNT: usize = 3;

pub const PALETTE: [&str; MAX_PLAYERS] = [
    "#FF6B6B", "#45B7D1", "#4ECDC4", "#FED766", "#9B59B6", "#F3A683", "#FFC300", "#DAF7A6",
    "#C70039", "#900C3F",
];

// The regular group. Used instead of generic names when the roster has exactly this many players.
const NAMED_DEFAULTS: [(&str, &str); DEFAULT_PLAYER_COUNT] =
    [("Leifeng", "#FF6B6B"), ("Dulang", "#FED766"), ("Kaixin", "#45B7D1")];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RosterError {
    PlayerCountOutOfRange,
    NoSuchPlayer,
    NotAPermutation,
    DuplicateId,
    DuplicateColor,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumIter)]
pub enum StepDirection {
    Up,
    Down,
}

pub fn is_valid_player_count(count: usize) -> bool { (MIN_PLAYERS..=MAX_PLAYERS).contains(&count) }

fn palette_color(idx: usize) -> PlayerColor {
    PlayerColor::parse(PALETTE[idx % PALETTE.len()]).unwrap()
}

fn default_players(count: usize) -> Vec<Player> {
    if count == NAMED_DEFAULTS.len() {
        NAMED_DEFAULTS
            .iter()
            .enumerate()
            .map(|(order, &(name, color))| {
                Player::new(PlayerId::generate(), name, PlayerColor::parse(color).unwrap(), order)
            })
            .collect()
    } else {
        (0..count)
            .map(|order| {
                let name = format!("Player {}", order + 1);
                Player::new(PlayerId::generate(), &name, palette_color(order), order)
            })
            .collect()
    }
}


// Ordered list of players. Invariants, maintained by every mutating method:
//   - `players[i].order == i`;
//   - ids are unique;
//   - colors are unique.
#[derive(Clone, PartialEq, Debug)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    pub fn with_defaults(count: usize) -> Result<Self, RosterError> {
        if !is_valid_player_count(count) {
            return Err(RosterError::PlayerCountOutOfRange);
        }
        Ok(Roster { players: default_players(count) })
    }

    // Builds a roster from records in arbitrary order. Players are sorted by `order` and then
    // renumbered, so gaps in `order` are tolerated.
    pub fn from_players(mut players: Vec<Player>) -> Result<Self, RosterError> {
        if !is_valid_player_count(players.len()) {
            return Err(RosterError::PlayerCountOutOfRange);
        }
        if !players.iter().map(|p| &p.id).all_unique() {
            return Err(RosterError::DuplicateId);
        }
        if !players.iter().map(|p| &p.color).all_unique() {
            return Err(RosterError::DuplicateColor);
        }
        players.sort_by_key(|p| p.order);
        let mut roster = Roster { players };
        roster.renumber();
        Ok(roster)
    }

    pub fn len(&self) -> usize { self.players.len() }
    pub fn is_empty(&self) -> bool { self.players.is_empty() }
    pub fn players(&self) -> &[Player] { &self.players }
    pub fn iter(&self) -> impl Iterator<Item = &Player> { self.players.iter() }
    pub fn get(&self, idx: usize) -> Option<&Player> { self.players.get(idx) }
    pub fn ids(&self) -> Vec<PlayerId> { self.players.iter().map(|p| p.id.clone()).collect() }

    pub fn index_of(&self, id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| &p.id == id)
    }
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub(crate) fn player_at_mut(&mut self, idx: usize) -> &mut Player { &mut self.players[idx] }

    // Replaces the roster with `count` fresh default players. On error the roster is unchanged.
    pub fn resize(&mut self, count: usize) -> Result<(), RosterError> {
        *self = Roster::with_defaults(count)?;
        Ok(())
    }

    pub fn reorder(&mut self, new_sequence: &[PlayerId]) -> Result<(), RosterError> {
        let current: HashSet<&PlayerId> = self.players.iter().map(|p| &p.id).collect();
        let requested: HashSet<&PlayerId> = new_sequence.iter().collect();
        if new_sequence.len() != self.players.len() || requested != current {
            return Err(RosterError::NotAPermutation);
        }
        let mut old_players = std::mem::take(&mut self.players);
        for id in new_sequence {
            // Membership checked above, so the player is always found.
            let idx = old_players.iter().position(|p| &p.id == id).unwrap();
            self.players.push(old_players.swap_remove(idx));
        }
        self.renumber();
        Ok(())
    }

    pub fn move_to_edge(&mut self, id: &PlayerId, to_front: bool) -> Result<(), RosterError> {
        let idx = self.index_of(id).ok_or(RosterError::NoSuchPlayer)?;
        let player = self.players.remove(idx);
        if to_front {
            self.players.insert(0, player);
        } else {
            self.players.push(player);
        }
        self.renumber();
        Ok(())
    }

    // Swaps the player with a neighbor. Moving past either end is a no-op.
    pub fn move_step(&mut self, id: &PlayerId, direction: StepDirection) -> Result<(), RosterError> {
        let idx = self.index_of(id).ok_or(RosterError::NoSuchPlayer)?;
        let new_idx = match direction {
            StepDirection::Up => idx.checked_sub(1),
            StepDirection::Down => Some(idx + 1).filter(|&i| i < self.players.len()),
        };
        if let Some(new_idx) = new_idx {
            self.players.swap(idx, new_idx);
            self.renumber();
        }
        Ok(())
    }

    // If the color is taken, the other player gets this player's old color.
    pub fn set_color(&mut self, id: &PlayerId, color: PlayerColor) -> Result<(), RosterError> {
        let idx = self.index_of(id).ok_or(RosterError::NoSuchPlayer)?;
        let old_color = std::mem::replace(&mut self.players[idx].color, color.clone());
        if let Some(other) =
            self.players.iter_mut().enumerate().find(|(i, p)| *i != idx && p.color == color)
        {
            log::debug!("Color {} taken by {}, swapping", color, other.1.name);
            other.1.color = old_color;
        }
        Ok(())
    }

    pub fn set_name(&mut self, id: &PlayerId, name: &str) -> Result<(), RosterError> {
        let idx = self.index_of(id).ok_or(RosterError::NoSuchPlayer)?;
        self.players[idx].name = sanitize_name(name);
        Ok(())
    }

    pub fn reset_times(&mut self) {
        for p in self.players.iter_mut() {
            p.time = Duration::ZERO;
        }
    }

    pub fn reset_passed(&mut self) {
        for p in self.players.iter_mut() {
            p.passed = false;
        }
    }

    pub fn all_passed(&self) -> bool { self.players.iter().all(|p| p.passed) }

    fn renumber(&mut self) {
        for (idx, p) in self.players.iter_mut().enumerate() {
            p.order = idx;
        }
    }
}

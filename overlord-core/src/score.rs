//! Medal tables

use std::sync::Arc;

use crate::unit::Unit;

pub const DEFAULT_MEDALS_TO_WIN: u32 = 4;

/// Eliminated enemy units per player index (0 = Bottom, 1 = Top)
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreTracker {
    medals: [Vec<Arc<Unit>>; 2],
    medals_to_win: u32,
}

impl Default for ScoreTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MEDALS_TO_WIN)
    }
}

impl ScoreTracker {
    pub fn new(medals_to_win: u32) -> Self {
        Self {
            medals: [Vec::new(), Vec::new()],
            medals_to_win,
        }
    }

    pub fn medals_to_win(&self) -> u32 {
        self.medals_to_win
    }

    /// Credit `player` with an eliminated unit; returns the new medal count
    pub fn award(&mut self, player: usize, unit: Arc<Unit>) -> usize {
        let table = &mut self.medals[player];
        table.push(unit);
        table.len()
    }

    pub fn medals(&self, player: usize) -> &[Arc<Unit>] {
        &self.medals[player]
    }

    pub fn medal_count(&self, player: usize) -> usize {
        self.medals[player].len()
    }

    pub fn has_won(&self, player: usize) -> bool {
        self.medal_count(player) >= self.medals_to_win as usize
    }

    pub fn winner(&self) -> Option<usize> {
        (0..2).find(|&p| self.has_won(p))
    }

    /// Exchange the two tables when the players change board edges
    pub fn swap_tables(&mut self) {
        self.medals.swap(0, 1);
    }
}

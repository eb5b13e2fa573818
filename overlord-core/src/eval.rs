//! Position evaluation

use serde::{Deserialize, Serialize};

use crate::game::{GameResult, GameState};
use crate::unit::{Side, UnitKind};

/// Heuristic weights for position evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Heuristics {
    /// Value of one figure of each unit kind
    pub figure_values: [f32; 3],
    /// Value of a medal
    pub medal_weight: f32,
    /// Reward for closing on the enemy, per hex of average distance
    pub advance_weight: f32,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            figure_values: [
                1.0, // Infantry
                1.4, // Armor
                1.2, // Artillery
            ],
            medal_weight: 6.0,
            advance_weight: 0.05,
        }
    }
}

impl Heuristics {
    pub fn figure_value(&self, kind: UnitKind) -> f32 {
        self.figure_values[kind as usize]
    }
}

/// Win value (effectively infinite)
pub const WIN_VALUE: f32 = 100000.0;

/// Evaluate the position for `side`
pub fn evaluate(state: &GameState, side: Side, heuristics: &Heuristics) -> f32 {
    if let GameResult::Won(winner) = state.result() {
        return if winner == side { WIN_VALUE } else { -WIN_VALUE };
    }

    let units = state.all_units();
    let mut score = 0.0f32;

    // Material
    for unit in &units {
        let value = heuristics.figure_value(unit.unit.kind) * unit.state.strength as f32;
        if unit.unit.side == side {
            score += value;
        } else {
            score -= value;
        }
    }

    // Medals
    let mine = state.score().medal_count(state.medal_index(side)) as f32;
    let theirs = state.score().medal_count(state.medal_index(side.opponent())) as f32;
    score += heuristics.medal_weight * (mine - theirs);

    // Advance: average distance from each friendly unit to its nearest enemy
    if heuristics.advance_weight.abs() > 0.001 {
        let distances: Vec<u32> = units
            .iter()
            .filter(|u| u.unit.side == side)
            .filter_map(|u| {
                units
                    .iter()
                    .filter(|e| e.unit.side != side)
                    .map(|e| u.coord.distance_to(e.coord))
                    .min()
            })
            .collect();
        if !distances.is_empty() {
            let average = distances.iter().sum::<u32>() as f32 / distances.len() as f32;
            score -= heuristics.advance_weight * average;
        }
    }

    score
}

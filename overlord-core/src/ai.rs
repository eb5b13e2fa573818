//! One-ply greedy AI
//!
//! Every legal move is tried on a fork of the game and the resulting position
//! is evaluated for the acting side. Battles are sampled with seeded dice to
//! estimate their expected outcome.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::combat::{DiceRoller, FixedDice, RandomDice};
use crate::error::Result;
use crate::eval::{evaluate, Heuristics};
use crate::game::{GameResult, GameState};
use crate::moves::Move;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Noise scale for evaluation variety
const NOISE_SCALE: f32 = 0.1;

/// Dice rolls sampled per candidate battle
const DEFAULT_BATTLE_SAMPLES: u32 = 8;

/// Bonus per unit a played card lets us order
const CARD_ORDER_BONUS: f32 = 0.3;

// ============================================================================
// GREEDY AI
// ============================================================================

pub struct GreedyAi {
    pub heuristics: Heuristics,
    pub battle_samples: u32,
    rng: ChaCha8Rng,
}

impl GreedyAi {
    pub fn new(heuristics: Heuristics) -> Self {
        Self::with_seed(heuristics, 42)
    }

    pub fn with_seed(heuristics: Heuristics, seed: u64) -> Self {
        Self {
            heuristics,
            battle_samples: DEFAULT_BATTLE_SAMPLES,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Get best move for the player to act
    pub fn best_move(&mut self, state: &GameState) -> Option<Move> {
        let mut best: Option<(Move, f32)> = None;
        for mv in state.legal_moves() {
            let Some(value) = self.expected_value(state, &mv) else {
                continue;
            };
            let score = value + move_score(&mv) + self.rng.gen_range(0.0..NOISE_SCALE);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((mv, score));
            }
        }
        best.map(|(mv, _)| mv)
    }

    /// Average evaluation after `mv`, or `None` if the move fails
    fn expected_value(&mut self, state: &GameState, mv: &Move) -> Option<f32> {
        let side = state.active_player().side;

        if matches!(mv, Move::Battle { .. }) {
            let samples = self.battle_samples.max(1);
            let mut total = 0.0;
            for _ in 0..samples {
                let mut dice = RandomDice::new(self.rng.gen());
                let mut sim = state.fork();
                sim.execute_move(mv, &mut dice).ok()?;
                total += evaluate(&sim, side, &self.heuristics);
            }
            return Some(total / samples as f32);
        }

        let mut sim = state.fork();
        sim.execute_move(mv, &mut FixedDice::default()).ok()?;
        let mut value = evaluate(&sim, side, &self.heuristics);
        if matches!(mv, Move::PlayCard { .. }) {
            let orderable = sim
                .legal_moves()
                .iter()
                .filter(|m| matches!(m, Move::OrderUnit { .. }))
                .count();
            value += CARD_ORDER_BONUS * orderable as f32;
        }
        Some(value)
    }

    /// Play a game against itself until it ends or `max_turns` turns pass
    pub fn play_game(
        &mut self,
        initial: GameState,
        dice: &mut dyn DiceRoller,
        max_turns: u32,
    ) -> Result<(GameState, Vec<Move>)> {
        let mut state = initial;
        let mut history = Vec::new();

        while state.result() == GameResult::Ongoing && state.turn < max_turns {
            let Some(mv) = self.best_move(&state) else {
                tracing::warn!(turn = state.turn, "no legal move; stopping");
                break;
            };
            state.execute_move(&mv, dice)?;
            state.clear_history();
            history.push(mv);
        }

        Ok((state, history))
    }
}

// ============================================================================
// MOVE ORDERING
// ============================================================================

/// Preference between moves that leave the evaluation unchanged
fn move_score(mv: &Move) -> f32 {
    match mv {
        Move::OrderUnit { .. } => 1.0,
        Move::UnorderUnit { .. } => -1.0,
        Move::Battle { .. } => 0.5,
        Move::PlayCard { .. }
        | Move::ConfirmOrders
        | Move::MoveUnit { .. }
        | Move::EndMovements
        | Move::EndBattles
        | Move::Retreat { .. }
        | Move::HoldGround { .. } => 0.0,
    }
}

//! Player moves and their effect on the game

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::combat::{self, DiceFace, DiceRoller};
use crate::error::{GameError, Result};
use crate::game::GameState;
use crate::geometry::HexCoord;
use crate::phase::{self, Phase};
use crate::unit::UnitId;

/// A legal move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    PlayCard { card: CardId },
    OrderUnit { unit: UnitId },
    UnorderUnit { unit: UnitId },
    ConfirmOrders,
    MoveUnit { unit: UnitId, from: HexCoord, to: HexCoord },
    EndMovements,
    Battle { attacker: UnitId, target: UnitId },
    EndBattles,
    Retreat { unit: UnitId, to: HexCoord },
    HoldGround { unit: UnitId },
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::PlayCard { card } => write!(f, "play card {}", card),
            Move::OrderUnit { unit } => write!(f, "order {}", unit),
            Move::UnorderUnit { unit } => write!(f, "unorder {}", unit),
            Move::ConfirmOrders => f.write_str("confirm orders"),
            Move::MoveUnit { unit, from, to } => write!(f, "move {} {} -> {}", unit, from, to),
            Move::EndMovements => f.write_str("end movements"),
            Move::Battle { attacker, target } => write!(f, "{} battles {}", attacker, target),
            Move::EndBattles => f.write_str("end battles"),
            Move::Retreat { unit, to } => write!(f, "retreat {} to {}", unit, to),
            Move::HoldGround { unit } => write!(f, "{} holds ground", unit),
        }
    }
}

/// Outcome of the most recent battle
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    pub attacker: UnitId,
    pub target: UnitId,
    pub dice: Vec<DiceFace>,
    pub hits: u32,
    pub flags: u32,
    pub eliminated: bool,
}

impl Move {
    /// Apply an already-validated move
    pub(crate) fn apply(&self, game: &mut GameState, dice: &mut dyn DiceRoller) -> Result<()> {
        match *self {
            Move::PlayCard { card } => play_card(game, card),
            Move::OrderUnit { unit } => {
                game.require_active_card()?;
                game.board_mut().order_unit(unit)
            }
            Move::UnorderUnit { unit } => game.board_mut().unorder_unit(unit),
            Move::ConfirmOrders | Move::EndMovements | Move::EndBattles => {
                game.pop_phase().map(|_| ())
            }
            Move::MoveUnit { unit, from, to } => move_unit(game, unit, from, to),
            Move::Battle { attacker, target } => battle(game, attacker, target, dice),
            Move::Retreat { unit, to } => retreat(game, unit, to),
            Move::HoldGround { unit } => hold_ground(game, unit),
        }
    }
}

fn play_card(game: &mut GameState, card: CardId) -> Result<()> {
    game.set_current_card(card)?;
    let rule = game.deck().card(card)?.rule.clone();
    game.replace_phase(Phase::Battle)?;
    game.push_phase(Phase::Movement);
    game.push_phase(Phase::OrderUnits { rule });
    Ok(())
}

fn move_unit(game: &mut GameState, unit: UnitId, from: HexCoord, to: HexCoord) -> Result<()> {
    let kind = game.board().unit(unit)?.kind;
    let steps = phase::reachable_hexes(game.board(), game.terrain(), from, kind.unit_type().move_range)
        .into_iter()
        .find(|&(hex, _)| hex == to)
        .map(|(_, steps)| steps)
        .ok_or_else(|| GameError::IllegalMove(format!("{} cannot reach {}", unit, to)))?;

    let board = game.board_mut();
    board.move_unit(from, to)?;
    board.mark_moved(unit)?;
    if !kind.can_battle_after_moving(steps) || game.terrain().terrain_at(to).blocks_movement() {
        game.board_mut().mark_skips_battle(unit)?;
    }
    Ok(())
}

fn battle(game: &mut GameState, attacker: UnitId, target: UnitId, dice: &mut dyn DiceRoller) -> Result<()> {
    let attacking = game.board().situated(attacker, game.terrain())?;
    let defending = game.board().situated(target, game.terrain())?;
    let count = combat::calculate_dice_count(
        &attacking.unit,
        attacking.terrain,
        attacking.coord.distance_to(defending.coord),
        defending.terrain,
        game.terrain().fortification_at(defending.coord),
    )?;

    let roll = dice.roll_many(count);
    let hits = combat::resolve_hits(&roll, &defending.unit);
    let flags = combat::count_flags(&roll);
    game.board_mut().increment_battles(attacker)?;

    let remaining = i64::from(defending.state.strength) - i64::from(hits);
    game.board_mut().set_strength(target, remaining)?;
    let eliminated = remaining <= 0;
    if eliminated {
        game.eliminate(defending.coord)?;
    } else if flags > 0 {
        game.push_phase(Phase::Retreat { unit: target, flags });
    }

    tracing::debug!(
        attacker = %attacker,
        target = %target,
        dice = count,
        hits,
        flags,
        eliminated,
        "battle resolved"
    );
    game.set_last_battle(BattleReport {
        attacker,
        target,
        dice: roll,
        hits,
        flags,
        eliminated,
    });
    Ok(())
}

fn retreat(game: &mut GameState, unit: UnitId, to: HexCoord) -> Result<()> {
    let Some(&Phase::Retreat { flags, .. }) = game.current_phase() else {
        return Err(GameError::NoPhase);
    };
    let from = game.board().coord_of(unit)?;
    game.board_mut().move_unit(from, to)?;

    if flags > 1 {
        game.replace_phase(Phase::Retreat { unit, flags: flags - 1 })?;
    } else {
        game.pop_phase()?;
    }
    Ok(())
}

/// No retreat hex: every remaining flag costs one figure
fn hold_ground(game: &mut GameState, unit: UnitId) -> Result<()> {
    let Some(&Phase::Retreat { flags, .. }) = game.current_phase() else {
        return Err(GameError::NoPhase);
    };
    let remaining = i64::from(game.board().strength(unit)?) - i64::from(flags);
    game.board_mut().set_strength(unit, remaining)?;
    if remaining <= 0 {
        let hex = game.board().coord_of(unit)?;
        game.eliminate(hex)?;
    }
    game.pop_phase()?;
    Ok(())
}

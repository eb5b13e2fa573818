//! Turn phases and legal move generation
//!
//! A turn is a stack of phases. Playing a card stacks order, movement and
//! battle phases; a battle that rolls flags pushes a retreat phase played by
//! the defender.

use std::collections::BTreeSet;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::cards::OrderRule;
use crate::combat;
use crate::deck::CardLocation;
use crate::game::GameState;
use crate::geometry::{BoardGeometry, HexCoord};
use crate::moves::Move;
use crate::terrain::TerrainMap;
use crate::unit::{SituatedUnit, UnitId};

/// Phase category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    Command,
    Order,
    Movement,
    Combat,
    Retreat,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    PlayCard,
    OrderUnits { rule: OrderRule },
    Movement,
    Battle,
    Retreat { unit: UnitId, flags: u32 },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::PlayCard => "Play Card",
            Phase::OrderUnits { .. } => "Order Units",
            Phase::Movement => "Movement",
            Phase::Battle => "Battle",
            Phase::Retreat { .. } => "Retreat",
        }
    }

    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::PlayCard => PhaseKind::Command,
            Phase::OrderUnits { .. } => PhaseKind::Order,
            Phase::Movement => PhaseKind::Movement,
            Phase::Battle => PhaseKind::Combat,
            Phase::Retreat { .. } => PhaseKind::Retreat,
        }
    }

    /// Played by the opponent of the nominal active player
    pub fn temporary_player_switch(&self) -> bool {
        matches!(self, Phase::Retreat { .. })
    }

    pub fn legal_moves(&self, game: &GameState) -> Vec<Move> {
        match self {
            Phase::PlayCard => play_card_moves(game),
            Phase::OrderUnits { rule } => order_moves(game, rule),
            Phase::Movement => movement_moves(game),
            Phase::Battle => battle_moves(game),
            Phase::Retreat { unit, .. } => retreat_moves(game, *unit),
        }
    }
}

// ============================================================================
// MOVE GENERATION
// ============================================================================

fn play_card_moves(game: &GameState) -> Vec<Move> {
    if game.current_card_id().is_some() {
        return vec![];
    }
    let hand = CardLocation::hand_of(game.active_player().position);
    game.cards_in_location(hand)
        .into_iter()
        .map(|card| Move::PlayCard { card: card.id })
        .collect()
}

/// A unit can be ordered while some orderable set holds it together with
/// everything already ordered
fn order_moves(game: &GameState, rule: &OrderRule) -> Vec<Move> {
    let player = game.active_player();
    let friendly = game.board().friendly_units(player.side, game.terrain());
    let sets = rule.orderable_sets(&friendly, player.position);

    let ordered: BTreeSet<SituatedUnit> = friendly
        .iter()
        .filter(|u| u.state.is_ordered)
        .cloned()
        .collect();
    let reachable: Vec<&BTreeSet<SituatedUnit>> =
        sets.iter().filter(|set| ordered.is_subset(set)).collect();

    let mut moves = Vec::new();
    for unit in &friendly {
        if unit.state.is_ordered {
            moves.push(Move::UnorderUnit { unit: unit.id() });
        } else if reachable.iter().any(|set| set.contains(unit)) {
            moves.push(Move::OrderUnit { unit: unit.id() });
        }
    }
    moves.push(Move::ConfirmOrders);
    moves
}

fn movement_moves(game: &GameState) -> Vec<Move> {
    let side = game.active_player().side;
    let mut moves = Vec::new();
    for unit in game.board().ordered_units(game.terrain()) {
        if unit.unit.side != side || unit.state.has_moved {
            continue;
        }
        let range = unit.unit.kind.unit_type().move_range;
        for (to, _) in reachable_hexes(game.board(), game.terrain(), unit.coord, range) {
            moves.push(Move::MoveUnit {
                unit: unit.id(),
                from: unit.coord,
                to,
            });
        }
    }
    moves.push(Move::EndMovements);
    moves
}

/// Hexes a unit at `from` can move to within `range` steps, with the step
/// count, in row-major order.
///
/// Every hex on the way must be on the board and empty. A unit may enter
/// move-blocking terrain but cannot continue through it.
pub fn reachable_hexes(
    board: &Board,
    terrain: &TerrainMap,
    from: HexCoord,
    range: u32,
) -> Vec<(HexCoord, u32)> {
    let geometry = BoardGeometry::get();
    let mut visited = FxHashSet::default();
    visited.insert(from);
    let mut frontier = vec![from];
    let mut reached = Vec::new();

    for step in 1..=range {
        let mut next = Vec::new();
        for hex in frontier {
            for neighbor in geometry.valid_neighbors(hex) {
                if board.is_occupied(neighbor) || !visited.insert(neighbor) {
                    continue;
                }
                reached.push((neighbor, step));
                if !terrain.terrain_at(neighbor).blocks_movement() {
                    next.push(neighbor);
                }
            }
        }
        frontier = next;
    }

    reached.sort();
    reached
}

fn battle_moves(game: &GameState) -> Vec<Move> {
    let side = game.active_player().side;
    let board = game.board();
    let terrain = game.terrain();
    let enemies: Vec<SituatedUnit> = board.friendly_units(side.opponent(), terrain);

    let mut moves = Vec::new();
    for attacker in board.ordered_units(terrain) {
        if attacker.unit.side != side || attacker.state.skips_battle || attacker.state.battles_this_turn > 0 {
            continue;
        }
        for target in &enemies {
            let distance = attacker.coord.distance_to(target.coord);
            if distance == 0 || distance > attacker.unit.kind.max_range() {
                continue;
            }
            let dice = combat::calculate_dice_count(
                &attacker.unit,
                attacker.terrain,
                distance,
                target.terrain,
                terrain.fortification_at(target.coord),
            )
            .unwrap_or(0);
            if dice == 0 {
                continue;
            }
            let visible = distance == 1
                || combat::line_of_sight(attacker.coord, target.coord, |hex| {
                    board.is_occupied(hex) || terrain.terrain_at(hex).blocks_sight()
                });
            if visible {
                moves.push(Move::Battle {
                    attacker: attacker.id(),
                    target: target.id(),
                });
            }
        }
    }
    moves.push(Move::EndBattles);
    moves
}

fn retreat_moves(game: &GameState, unit: UnitId) -> Vec<Move> {
    let board = game.board();
    let (Ok(from), Ok(retreating)) = (board.coord_of(unit), board.unit(unit)) else {
        return vec![];
    };
    let geometry = BoardGeometry::get();
    let moves: Vec<Move> = game
        .position_of(retreating.side)
        .retreat_directions()
        .into_iter()
        .map(|direction| from.neighbor(direction))
        .filter(|&to| geometry.contains(to) && !board.is_occupied(to))
        .map(|to| Move::Retreat { unit, to })
        .collect();

    if moves.is_empty() {
        vec![Move::HoldGround { unit }]
    } else {
        moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::Terrain;
    use crate::unit::{Side, Unit, UnitKind};

    fn infantry(id: u32) -> Unit {
        Unit::new(UnitId(id), UnitKind::Infantry, Side::Allies)
    }

    #[test]
    fn test_open_ground_reach() {
        let board = Board::new();
        let reached = reachable_hexes(&board, &TerrainMap::new(), HexCoord::new(5, 5), 2);
        assert_eq!(reached.len(), 18);
        assert_eq!(reached.iter().filter(|&&(_, s)| s == 1).count(), 6);
    }

    #[test]
    fn test_occupied_neighbor_blocks_paths_through_it() {
        let mut board = Board::new();
        let from = HexCoord::new(5, 5);
        board.place_unit(from.east(), infantry(1)).unwrap();
        let reached: Vec<HexCoord> = reachable_hexes(&board, &TerrainMap::new(), from, 2)
            .into_iter()
            .map(|(h, _)| h)
            .collect();
        assert!(!reached.contains(&from.east()));
        // Only reachable through the occupied hex
        assert!(!reached.contains(&from.east().east()));
        // Reachable around it
        assert!(reached.contains(&from.northeast().east()));
        assert_eq!(reached.len(), 16);
    }

    #[test]
    fn test_blocking_terrain_stops_movement() {
        let board = Board::new();
        let from = HexCoord::new(5, 5);
        let mut terrain = TerrainMap::new();
        terrain.set_terrain(from.west(), Terrain::Woods);
        let reached: Vec<HexCoord> = reachable_hexes(&board, &terrain, from, 2)
            .into_iter()
            .map(|(h, _)| h)
            .collect();
        assert!(reached.contains(&from.west()));
        assert!(!reached.contains(&from.west().west()));
        assert_eq!(reached.len(), 17);
    }

    #[test]
    fn test_board_edge() {
        let reached = reachable_hexes(&Board::new(), &TerrainMap::new(), HexCoord::new(0, 0), 1);
        assert_eq!(reached, vec![(HexCoord::new(1, 0), 1), (HexCoord::new(0, 1), 1)]);
    }

    #[test]
    fn test_phase_metadata() {
        assert!(Phase::Retreat { unit: UnitId(1), flags: 1 }.temporary_player_switch());
        assert!(!Phase::Battle.temporary_player_switch());
        assert_eq!(Phase::Movement.kind(), PhaseKind::Movement);
        assert_eq!(Phase::PlayCard.name(), "Play Card");
    }
}

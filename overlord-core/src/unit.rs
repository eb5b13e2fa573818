//! Unit types, identity and per-turn state

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::geometry::HexCoord;
use crate::terrain::Terrain;

/// Unique unit identifier within a game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Army a unit fights for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Allies,
    Axis,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Allies => Side::Axis,
            Side::Axis => Side::Allies,
        }
    }
}

/// Unit type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Infantry,
    Armor,
    Artillery,
}

/// Unit type definition
#[derive(Clone, Debug)]
pub struct UnitType {
    pub name: &'static str,
    /// Figures in a fresh unit
    pub strength: u32,
    /// Maximum hexes moved per turn
    pub move_range: u32,
    /// Longest move after which the unit may still battle
    pub move_and_battle: u32,
    /// Battle dice by distance; index 0 is distance 1
    pub dice: &'static [u32],
    /// Ignores terrain and fortification dice reductions
    pub ignores_cover: bool,
}

pub static UNIT_TYPES: [UnitType; 3] = [
    UnitType {
        name: "Infantry",
        strength: 4,
        move_range: 2,
        move_and_battle: 1,
        dice: &[3, 2, 1],
        ignores_cover: false,
    },
    UnitType {
        name: "Armor",
        strength: 3,
        move_range: 3,
        move_and_battle: 3,
        dice: &[3, 3, 3],
        ignores_cover: false,
    },
    UnitType {
        name: "Artillery",
        strength: 2,
        move_range: 1,
        move_and_battle: 0,
        dice: &[3, 3, 2, 2, 1, 1],
        ignores_cover: true,
    },
];

impl UnitKind {
    pub const ALL: [UnitKind; 3] = [UnitKind::Infantry, UnitKind::Armor, UnitKind::Artillery];

    pub fn unit_type(self) -> &'static UnitType {
        &UNIT_TYPES[self as usize]
    }

    /// Battle dice before terrain at the given distance (0 beyond range)
    pub fn base_dice(self, distance: u32) -> u32 {
        match distance {
            0 => 0,
            d => self.unit_type().dice.get(d as usize - 1).copied().unwrap_or(0),
        }
    }

    pub fn max_range(self) -> u32 {
        self.unit_type().dice.len() as u32
    }

    /// Can a unit that moved `distance` hexes this turn still battle?
    pub fn can_battle_after_moving(self, distance: u32) -> bool {
        distance <= self.unit_type().move_and_battle
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.unit_type().name)
    }
}

/// Immutable unit identity
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub side: Side,
    pub initial_strength: u32,
}

impl Unit {
    /// A unit at its type's standard strength
    pub fn new(id: UnitId, kind: UnitKind, side: Side) -> Self {
        Self::with_strength(id, kind, side, kind.unit_type().strength)
    }

    pub fn with_strength(id: UnitId, kind: UnitKind, side: Side, initial_strength: u32) -> Self {
        Self {
            id,
            kind,
            side,
            initial_strength,
        }
    }
}

/// Mutable per-unit state, independent of position
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitState {
    pub strength: u32,
    pub is_ordered: bool,
    pub has_moved: bool,
    pub skips_battle: bool,
    pub battles_this_turn: u32,
}

impl UnitState {
    pub fn new(strength: u32) -> Self {
        Self {
            strength,
            is_ordered: false,
            has_moved: false,
            skips_battle: false,
            battles_this_turn: 0,
        }
    }

    /// Reset the turn-scoped fields; strength is kept
    pub fn clear_turn_state(&mut self) {
        self.is_ordered = false;
        self.has_moved = false;
        self.skips_battle = false;
        self.battles_this_turn = 0;
    }

    /// Set strength, clamping negatives to zero
    pub fn set_strength(&mut self, strength: i64) {
        self.strength = strength.max(0) as u32;
    }
}

/// Read-only view of a unit where it stands.
///
/// Identity, ordering and hashing follow the unit id only.
#[derive(Clone, Debug)]
pub struct SituatedUnit {
    pub unit: Arc<Unit>,
    pub coord: HexCoord,
    pub terrain: Terrain,
    pub state: UnitState,
}

impl SituatedUnit {
    pub fn id(&self) -> UnitId {
        self.unit.id
    }
}

impl PartialEq for SituatedUnit {
    fn eq(&self, other: &Self) -> bool {
        self.unit.id == other.unit.id
    }
}

impl Eq for SituatedUnit {}

impl Hash for SituatedUnit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.unit.id.hash(state);
    }
}

impl Ord for SituatedUnit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.unit.id.cmp(&other.unit.id)
    }
}

impl PartialOrd for SituatedUnit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

//! Battle dice and hit resolution
//!
//! Dice rolling is injected through [`DiceRoller`]; the engine itself only
//! counts dice and reads already-rolled faces.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::geometry::HexCoord;
use crate::terrain::{Fortification, Terrain};
use crate::unit::{Unit, UnitKind};

/// Extra die removed when battling up onto a hill from lower ground
pub const HILL_PENALTY: u32 = 1;

/// Sample offset used to split lines running along hex edges
const LINE_NUDGE: f64 = 1e-6;

/// Number of battle dice an attack rolls.
///
/// Terrain and fortification cover on the defending hex do not stack: the
/// larger of the two reductions applies.
pub fn calculate_dice_count(
    attacker: &Unit,
    attacker_terrain: Terrain,
    distance: u32,
    defender_terrain: Terrain,
    defender_fortification: Option<Fortification>,
) -> Result<u32> {
    if distance < 1 {
        return Err(GameError::InvalidDistance(distance));
    }

    let base = attacker.kind.base_dice(distance);
    if attacker.kind.unit_type().ignores_cover {
        return Ok(base);
    }

    let mut terrain_reduction = defender_terrain.reduction_against(attacker.kind);
    if defender_terrain == Terrain::Hill && attacker_terrain != Terrain::Hill {
        terrain_reduction += HILL_PENALTY;
    }
    let fortification_reduction = defender_fortification.map_or(0, Fortification::reduction);

    Ok(base.saturating_sub(terrain_reduction.max(fortification_reduction)))
}

/// Battle die face
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiceFace {
    Infantry,
    Armor,
    Grenade,
    Star,
    Flag,
}

/// Faces of a battle die
pub const STANDARD_DIE: [DiceFace; 6] = [
    DiceFace::Infantry,
    DiceFace::Infantry,
    DiceFace::Armor,
    DiceFace::Grenade,
    DiceFace::Star,
    DiceFace::Flag,
];

impl fmt::Display for DiceFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            DiceFace::Infantry => "I",
            DiceFace::Armor => "A",
            DiceFace::Grenade => "G",
            DiceFace::Star => "*",
            DiceFace::Flag => "F",
        };
        f.write_str(symbol)
    }
}

/// Hits scored on `target` by a roll
pub fn resolve_hits(dice: &[DiceFace], target: &Unit) -> u32 {
    dice.iter().filter(|&&face| scores_hit(face, target.kind)).count() as u32
}

fn scores_hit(face: DiceFace, target: UnitKind) -> bool {
    match (target, face) {
        (_, DiceFace::Grenade) => true,
        (UnitKind::Infantry, DiceFace::Infantry) => true,
        (UnitKind::Armor, DiceFace::Armor) => true,
        _ => false,
    }
}

/// Retreat steps forced by a roll
pub fn count_flags(dice: &[DiceFace]) -> u32 {
    dice.iter().filter(|&&face| face == DiceFace::Flag).count() as u32
}

/// Is the line between two hexes clear?
///
/// `blocked` reports whether an intermediate hex obstructs sight. Adjacent
/// hexes always see each other. A line running along a hex edge is only
/// blocked when the hexes on both sides are.
pub fn line_of_sight(from: HexCoord, to: HexCoord, blocked: impl Fn(HexCoord) -> bool) -> bool {
    let clear = |nudge: f64| !from.line_to(to, nudge).into_iter().any(&blocked);
    clear(LINE_NUDGE) || clear(-LINE_NUDGE)
}

// ============================================================================
// DICE ROLLERS
// ============================================================================

/// Source of battle dice
pub trait DiceRoller {
    fn roll(&mut self) -> DiceFace;

    fn roll_many(&mut self, count: u32) -> Vec<DiceFace> {
        (0..count).map(|_| self.roll()).collect()
    }
}

/// Fair dice from a seeded ChaCha generator
#[derive(Clone, Debug)]
pub struct RandomDice {
    rng: ChaCha8Rng,
}

impl RandomDice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl DiceRoller for RandomDice {
    fn roll(&mut self) -> DiceFace {
        STANDARD_DIE[self.rng.gen_range(0..STANDARD_DIE.len())]
    }
}

/// Scripted dice that cycle through fixed faces; stars when empty
#[derive(Clone, Debug, Default)]
pub struct FixedDice {
    faces: Vec<DiceFace>,
    next: usize,
}

impl FixedDice {
    pub fn new(faces: Vec<DiceFace>) -> Self {
        Self { faces, next: 0 }
    }
}

impl DiceRoller for FixedDice {
    fn roll(&mut self) -> DiceFace {
        if self.faces.is_empty() {
            return DiceFace::Star;
        }
        let face = self.faces[self.next % self.faces.len()];
        self.next += 1;
        face
    }
}

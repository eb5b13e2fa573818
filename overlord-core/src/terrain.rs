//! Terrain and fortification definitions

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::geometry::HexCoord;
use crate::unit::UnitKind;

/// Town artwork variant; purely cosmetic
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TownVariant {
    Village,
    Church,
    Farm,
}

/// Terrain occupying a hex
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Clear,
    Hill,
    Woods,
    Hedgerows,
    Town(TownVariant),
}

/// Per-terrain rule data
#[derive(Clone, Copy, Debug)]
pub struct TerrainRules {
    pub name: &'static str,
    pub image: &'static str,
    /// Units may enter but never move through
    pub blocks_movement: bool,
    /// Obstructs line of sight when between attacker and target
    pub blocks_sight: bool,
    /// Battle dice removed when infantry attacks into this hex
    pub infantry_reduction: u32,
    /// Battle dice removed when armor attacks into this hex
    pub armor_reduction: u32,
}

const CLEAR: TerrainRules = TerrainRules {
    name: "Clear",
    image: "terrain/clear",
    blocks_movement: false,
    blocks_sight: false,
    infantry_reduction: 0,
    armor_reduction: 0,
};

// Hill cover depends on the attacker's own terrain, see `combat::HILL_PENALTY`
const HILL: TerrainRules = TerrainRules {
    name: "Hill",
    image: "terrain/hill",
    blocks_movement: false,
    blocks_sight: true,
    infantry_reduction: 0,
    armor_reduction: 0,
};

const WOODS: TerrainRules = TerrainRules {
    name: "Woods",
    image: "terrain/woods",
    blocks_movement: true,
    blocks_sight: true,
    infantry_reduction: 1,
    armor_reduction: 2,
};

const HEDGEROWS: TerrainRules = TerrainRules {
    name: "Hedgerows",
    image: "terrain/hedgerows",
    blocks_movement: true,
    blocks_sight: true,
    infantry_reduction: 1,
    armor_reduction: 1,
};

const fn town(image: &'static str) -> TerrainRules {
    TerrainRules {
        name: "Town",
        image,
        blocks_movement: true,
        blocks_sight: true,
        infantry_reduction: 1,
        armor_reduction: 2,
    }
}

const VILLAGE: TerrainRules = town("terrain/town-village");
const CHURCH: TerrainRules = town("terrain/town-church");
const FARM: TerrainRules = town("terrain/town-farm");

impl Terrain {
    pub const ALL: [Terrain; 7] = [
        Terrain::Clear,
        Terrain::Hill,
        Terrain::Woods,
        Terrain::Hedgerows,
        Terrain::Town(TownVariant::Village),
        Terrain::Town(TownVariant::Church),
        Terrain::Town(TownVariant::Farm),
    ];

    pub fn rules(self) -> &'static TerrainRules {
        match self {
            Terrain::Clear => &CLEAR,
            Terrain::Hill => &HILL,
            Terrain::Woods => &WOODS,
            Terrain::Hedgerows => &HEDGEROWS,
            Terrain::Town(TownVariant::Village) => &VILLAGE,
            Terrain::Town(TownVariant::Church) => &CHURCH,
            Terrain::Town(TownVariant::Farm) => &FARM,
        }
    }

    pub fn blocks_movement(self) -> bool {
        self.rules().blocks_movement
    }

    pub fn blocks_sight(self) -> bool {
        self.rules().blocks_sight
    }

    /// Dice an attacker of `kind` loses when battling into this terrain
    pub fn reduction_against(self, kind: UnitKind) -> u32 {
        match kind {
            UnitKind::Infantry => self.rules().infantry_reduction,
            UnitKind::Armor => self.rules().armor_reduction,
            UnitKind::Artillery => 0,
        }
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rules().name)
    }
}

/// Man-made cover on a hex
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fortification {
    Sandbags,
}

impl Fortification {
    pub const ALL: [Fortification; 1] = [Fortification::Sandbags];

    /// Dice removed from any attack against the protected hex
    pub fn reduction(self) -> u32 {
        match self {
            Fortification::Sandbags => 1,
        }
    }
}

/// Terrain and fortification assignment for the whole board.
///
/// Unlisted hexes are clear and unfortified. The map is shared by reference
/// between game clones once setup is finished.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TerrainMap {
    terrain: FxHashMap<HexCoord, Terrain>,
    fortifications: FxHashMap<HexCoord, Fortification>,
}

impl TerrainMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terrain_at(&self, hex: HexCoord) -> Terrain {
        self.terrain.get(&hex).copied().unwrap_or_default()
    }

    pub fn fortification_at(&self, hex: HexCoord) -> Option<Fortification> {
        self.fortifications.get(&hex).copied()
    }

    pub(crate) fn set_terrain(&mut self, hex: HexCoord, terrain: Terrain) {
        if terrain == Terrain::Clear {
            self.terrain.remove(&hex);
        } else {
            self.terrain.insert(hex, terrain);
        }
    }

    pub(crate) fn set_fortification(&mut self, hex: HexCoord, fortification: Option<Fortification>) {
        match fortification {
            Some(f) => {
                self.fortifications.insert(hex, f);
            }
            None => {
                self.fortifications.remove(&hex);
            }
        }
    }

    /// Non-clear hexes in row-major order
    pub fn features(&self) -> Vec<(HexCoord, Terrain)> {
        let mut features: Vec<_> = self.terrain.iter().map(|(&h, &t)| (h, t)).collect();
        features.sort_by_key(|&(hex, _)| hex);
        features
    }

    /// Fortified hexes in row-major order
    pub fn fortifications(&self) -> Vec<(HexCoord, Fortification)> {
        let mut fortified: Vec<_> = self.fortifications.iter().map(|(&h, &f)| (h, f)).collect();
        fortified.sort_by_key(|&(hex, _)| hex);
        fortified
    }
}

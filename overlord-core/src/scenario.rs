//! Scenario - board setup and game options loaded from JSON

use std::path::Path;

use anyhow::Context;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cards::{card_by_name, standard_deck, CardId, CommandCard};
use crate::game::{GameConfig, GameState};
use crate::geometry::HexCoord;
use crate::terrain::{Fortification, Terrain, TownVariant};
use crate::unit::{Side, Unit, UnitId, UnitKind};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPlacement {
    pub side: Side,
    pub kind: UnitKind,
    pub q: i32,
    pub r: i32,
    /// Starting strength when below the kind's standard
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainPlacement {
    pub q: i32,
    pub r: i32,
    pub terrain: Terrain,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FortificationPlacement {
    pub q: i32,
    pub r: i32,
    pub fortification: Fortification,
}

/// Starting position and rules of a game
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub config: GameConfig,
    pub units: Vec<UnitPlacement>,
    #[serde(default)]
    pub terrain: Vec<TerrainPlacement>,
    #[serde(default)]
    pub fortifications: Vec<FortificationPlacement>,
    /// Catalog card names; empty means the standard deck
    #[serde(default)]
    pub cards: Vec<String>,
}

impl Scenario {
    /// Build the command deck, numbering cards in list order
    pub fn build_cards(&self) -> anyhow::Result<Vec<CommandCard>> {
        if self.cards.is_empty() {
            return Ok(standard_deck());
        }
        self.cards
            .iter()
            .enumerate()
            .map(|(i, name)| {
                card_by_name(CardId(i as u32), name)
                    .ok_or_else(|| anyhow::anyhow!("Unknown card: {}", name))
            })
            .collect()
    }

    /// Set up a game: units numbered from 1, terrain frozen, deck shuffled
    /// with `rng` and opening hands dealt
    pub fn to_game_state<R: Rng + ?Sized>(&self, rng: &mut R) -> anyhow::Result<GameState> {
        let mut game = GameState::new(self.config.clone(), self.build_cards()?);

        for (i, placement) in self.units.iter().enumerate() {
            let id = UnitId(i as u32 + 1);
            let unit = match placement.strength {
                Some(strength) => Unit::with_strength(id, placement.kind, placement.side, strength),
                None => Unit::new(id, placement.kind, placement.side),
            };
            game.place_unit(HexCoord::new(placement.q, placement.r), unit)
                .with_context(|| format!("placing unit {} of scenario '{}'", id, self.name))?;
        }
        for t in &self.terrain {
            game.set_terrain(HexCoord::new(t.q, t.r), t.terrain)
                .with_context(|| format!("placing {} in scenario '{}'", t.terrain, self.name))?;
        }
        for f in &self.fortifications {
            game.set_fortification(HexCoord::new(f.q, f.r), Some(f.fortification))
                .with_context(|| format!("fortifying ({}, {}) in scenario '{}'", f.q, f.r, self.name))?;
        }

        game.finish_setup();
        game.shuffle_deck(rng);
        game.deal_opening_hands();
        tracing::info!(
            scenario = %self.name,
            units = self.units.len(),
            cards = game.deck().len(),
            "scenario loaded"
        );
        Ok(game)
    }

    /// Load from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        let scenario = serde_json::from_str(&content)
            .with_context(|| format!("parsing scenario {}", path.display()))?;
        Ok(scenario)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for Scenario {
    /// A small meeting engagement across the center
    fn default() -> Self {
        let unit = |side, kind, q, r| UnitPlacement {
            side,
            kind,
            q,
            r,
            strength: None,
        };
        let terrain = |q, r, terrain| TerrainPlacement { q, r, terrain };

        Self {
            name: "skirmish".to_string(),
            config: GameConfig::default(),
            units: vec![
                unit(Side::Allies, UnitKind::Infantry, -2, 7),
                unit(Side::Allies, UnitKind::Infantry, 0, 7),
                unit(Side::Allies, UnitKind::Armor, 1, 7),
                unit(Side::Allies, UnitKind::Infantry, 2, 7),
                unit(Side::Allies, UnitKind::Infantry, 4, 7),
                unit(Side::Allies, UnitKind::Infantry, 6, 7),
                unit(Side::Allies, UnitKind::Artillery, 1, 8),
                unit(Side::Axis, UnitKind::Infantry, 1, 1),
                unit(Side::Axis, UnitKind::Infantry, 3, 1),
                unit(Side::Axis, UnitKind::Armor, 4, 1),
                unit(Side::Axis, UnitKind::Infantry, 5, 1),
                unit(Side::Axis, UnitKind::Infantry, 7, 1),
                unit(Side::Axis, UnitKind::Infantry, 9, 1),
                unit(Side::Axis, UnitKind::Artillery, 5, 0),
            ],
            terrain: vec![
                terrain(8, 3, Terrain::Hedgerows),
                terrain(0, 4, Terrain::Hill),
                terrain(3, 4, Terrain::Woods),
                terrain(5, 4, Terrain::Town(TownVariant::Village)),
                terrain(-1, 5, Terrain::Woods),
            ],
            fortifications: vec![FortificationPlacement {
                q: 5,
                r: 1,
                fortification: Fortification::Sandbags,
            }],
            cards: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::CardLocation;
    use crate::error::GameError;
    use crate::geometry::PlayerPosition;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_default_scenario_builds() {
        let scenario = Scenario::default();
        let game = scenario.to_game_state(&mut ChaCha8Rng::seed_from_u64(1)).unwrap();
        assert_eq!(game.board().unit_count(), 14);
        assert_eq!(game.board().unit_count_for(Side::Allies), 7);
        assert!(game.is_setup_finished());
        assert_eq!(game.hand(PlayerPosition::Bottom).len(), 5);
        assert_eq!(game.hand(PlayerPosition::Top).len(), 5);
        assert_eq!(game.cards_in_location(CardLocation::Deck).len(), 30);
        assert_eq!(game.terrain().terrain_at(HexCoord::new(3, 4)), Terrain::Woods);
        assert_eq!(
            game.terrain().fortification_at(HexCoord::new(5, 1)),
            Some(Fortification::Sandbags)
        );
    }

    #[test]
    fn test_same_seed_same_game() {
        let scenario = Scenario::default();
        let a = scenario.to_game_state(&mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        let b = scenario.to_game_state(&mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_named_cards() {
        let scenario = Scenario {
            cards: vec!["Probe Left".into(), "Pincer Move".into()],
            ..Scenario::default()
        };
        let cards = scenario.build_cards().unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].id, CardId(1));
        assert_eq!(cards[1].name, "Pincer Move");

        let bad = Scenario {
            cards: vec!["Air Power".into()],
            ..Scenario::default()
        };
        assert!(bad.build_cards().is_err());
    }

    #[test]
    fn test_bad_placement_reports_cause() {
        let mut scenario = Scenario::default();
        scenario.units.push(UnitPlacement {
            side: Side::Axis,
            kind: UnitKind::Infantry,
            q: 1,
            r: 1,
            strength: None,
        });
        let err = scenario.to_game_state(&mut ChaCha8Rng::seed_from_u64(1)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<GameError>(),
            Some(&GameError::Occupied(HexCoord::new(1, 1)))
        );
    }

    #[test]
    fn test_save_and_load() {
        let scenario = Scenario::default();
        let path = std::env::temp_dir().join(format!("overlord-scenario-{}.json", std::process::id()));
        scenario.save(&path).unwrap();
        let loaded = Scenario::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, scenario);
    }

    #[test]
    fn test_minimal_json() {
        let json = r#"{
            "name": "duel",
            "units": [
                {"side": "Allies", "kind": "Armor", "q": 4, "r": 6},
                {"side": "Axis", "kind": "Infantry", "q": 4, "r": 3, "strength": 2}
            ]
        }"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();
        assert_eq!(scenario.config, GameConfig::default());
        let game = scenario.to_game_state(&mut ChaCha8Rng::seed_from_u64(0)).unwrap();
        assert_eq!(game.board().strength(UnitId(2)).unwrap(), 2);
    }
}

//! Unit placement and per-unit turn state

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{GameError, Result};
use crate::geometry::{BoardGeometry, HexCoord, PlayerPosition, Section};
use crate::terrain::TerrainMap;
use crate::unit::{Side, SituatedUnit, Unit, UnitId, UnitState};

/// Units on the board (clone to simulate).
///
/// Units are immutable and shared between clones; their states are copied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Board {
    /// Hex -> unit occupying it
    positions: FxHashMap<HexCoord, UnitId>,
    /// Unit -> hex it occupies
    coords: FxHashMap<UnitId, HexCoord>,
    units: FxHashMap<UnitId, Arc<Unit>>,
    states: FxHashMap<UnitId, UnitState>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // PLACEMENT
    // ========================================================================

    /// Put a fresh unit on an empty hex
    pub fn place_unit(&mut self, hex: HexCoord, unit: Unit) -> Result<()> {
        if !BoardGeometry::get().contains(hex) {
            return Err(GameError::OffBoard(hex));
        }
        if self.positions.contains_key(&hex) {
            return Err(GameError::Occupied(hex));
        }
        if self.units.contains_key(&unit.id) {
            return Err(GameError::DuplicateUnit(unit.id));
        }

        let id = unit.id;
        self.states.insert(id, UnitState::new(unit.initial_strength));
        self.units.insert(id, Arc::new(unit));
        self.positions.insert(hex, id);
        self.coords.insert(id, hex);
        Ok(())
    }

    /// Move a unit between hexes; never captures
    pub fn move_unit(&mut self, from: HexCoord, to: HexCoord) -> Result<()> {
        let id = *self.positions.get(&from).ok_or(GameError::NoUnitAt(from))?;
        if !BoardGeometry::get().contains(to) {
            return Err(GameError::OffBoard(to));
        }
        if self.positions.contains_key(&to) {
            return Err(GameError::Occupied(to));
        }

        self.positions.remove(&from);
        self.positions.insert(to, id);
        self.coords.insert(id, to);
        Ok(())
    }

    /// Take a unit and its state off the board; empty hexes are ignored
    pub fn remove_unit(&mut self, hex: HexCoord) -> Option<Arc<Unit>> {
        let id = self.positions.remove(&hex)?;
        self.coords.remove(&id);
        self.states.remove(&id);
        self.units.remove(&id)
    }

    // ========================================================================
    // LOOKUPS
    // ========================================================================

    pub fn unit_at(&self, hex: HexCoord) -> Option<&Arc<Unit>> {
        self.positions.get(&hex).and_then(|id| self.units.get(id))
    }

    pub fn is_occupied(&self, hex: HexCoord) -> bool {
        self.positions.contains_key(&hex)
    }

    pub fn unit(&self, id: UnitId) -> Result<&Arc<Unit>> {
        self.units.get(&id).ok_or(GameError::UnknownUnit(id))
    }

    pub fn contains_unit(&self, id: UnitId) -> bool {
        self.units.contains_key(&id)
    }

    pub fn coord_of(&self, id: UnitId) -> Result<HexCoord> {
        self.coords.get(&id).copied().ok_or(GameError::UnknownUnit(id))
    }

    pub fn state(&self, id: UnitId) -> Result<&UnitState> {
        if !self.units.contains_key(&id) {
            return Err(GameError::UnknownUnit(id));
        }
        self.states.get(&id).ok_or_else(|| missing_state(id))
    }

    fn state_mut(&mut self, id: UnitId) -> Result<&mut UnitState> {
        if !self.units.contains_key(&id) {
            return Err(GameError::UnknownUnit(id));
        }
        self.states.get_mut(&id).ok_or_else(|| missing_state(id))
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn unit_count_for(&self, side: Side) -> usize {
        self.units.values().filter(|u| u.side == side).count()
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Every unit with its position, in row-major order
    pub fn all_units(&self, terrain: &TerrainMap) -> Vec<SituatedUnit> {
        let mut hexes: Vec<HexCoord> = self.positions.keys().copied().collect();
        hexes.sort();
        hexes
            .into_iter()
            .filter_map(|hex| self.situate(hex, terrain))
            .collect()
    }

    pub fn ordered_units(&self, terrain: &TerrainMap) -> Vec<SituatedUnit> {
        self.all_units(terrain)
            .into_iter()
            .filter(|u| u.state.is_ordered)
            .collect()
    }

    pub fn friendly_units(&self, side: Side, terrain: &TerrainMap) -> Vec<SituatedUnit> {
        self.all_units(terrain)
            .into_iter()
            .filter(|u| u.unit.side == side)
            .collect()
    }

    /// Friendly units standing in `section` as seen from `position`
    pub fn friendly_units_in_section(
        &self,
        side: Side,
        section: Section,
        position: PlayerPosition,
        terrain: &TerrainMap,
    ) -> Vec<SituatedUnit> {
        let geometry = BoardGeometry::get();
        self.friendly_units(side, terrain)
            .into_iter()
            .filter(|u| geometry.is_hex_in_section(u.coord, section, position))
            .collect()
    }

    /// Sections the unit currently occupies (two on a straddling hex)
    pub fn sections_of_unit(&self, id: UnitId, position: PlayerPosition) -> Result<Vec<Section>> {
        let hex = self.coord_of(id)?;
        Ok(BoardGeometry::get().sections_of(hex, position))
    }

    pub fn situated(&self, id: UnitId, terrain: &TerrainMap) -> Result<SituatedUnit> {
        let hex = self.coord_of(id)?;
        self.situate(hex, terrain).ok_or_else(|| missing_state(id))
    }

    fn situate(&self, hex: HexCoord, terrain: &TerrainMap) -> Option<SituatedUnit> {
        let id = self.positions.get(&hex)?;
        Some(SituatedUnit {
            unit: Arc::clone(self.units.get(id)?),
            coord: hex,
            terrain: terrain.terrain_at(hex),
            state: self.states.get(id)?.clone(),
        })
    }

    // ========================================================================
    // UNIT STATE
    // ========================================================================

    pub fn order_unit(&mut self, id: UnitId) -> Result<()> {
        self.state_mut(id)?.is_ordered = true;
        Ok(())
    }

    pub fn unorder_unit(&mut self, id: UnitId) -> Result<()> {
        self.state_mut(id)?.is_ordered = false;
        Ok(())
    }

    /// Flip the ordered flag, returning the new value
    pub fn toggle_ordered(&mut self, id: UnitId) -> Result<bool> {
        let state = self.state_mut(id)?;
        state.is_ordered = !state.is_ordered;
        Ok(state.is_ordered)
    }

    pub fn mark_moved(&mut self, id: UnitId) -> Result<()> {
        self.state_mut(id)?.has_moved = true;
        Ok(())
    }

    pub fn unmark_moved(&mut self, id: UnitId) -> Result<()> {
        self.state_mut(id)?.has_moved = false;
        Ok(())
    }

    pub fn mark_skips_battle(&mut self, id: UnitId) -> Result<()> {
        self.state_mut(id)?.skips_battle = true;
        Ok(())
    }

    pub fn unmark_skips_battle(&mut self, id: UnitId) -> Result<()> {
        self.state_mut(id)?.skips_battle = false;
        Ok(())
    }

    pub fn increment_battles(&mut self, id: UnitId) -> Result<u32> {
        let state = self.state_mut(id)?;
        state.battles_this_turn += 1;
        Ok(state.battles_this_turn)
    }

    pub fn battles_this_turn(&self, id: UnitId) -> Result<u32> {
        Ok(self.state(id)?.battles_this_turn)
    }

    pub fn strength(&self, id: UnitId) -> Result<u32> {
        Ok(self.state(id)?.strength)
    }

    /// Set current strength, clamped to zero
    pub fn set_strength(&mut self, id: UnitId, strength: i64) -> Result<()> {
        self.state_mut(id)?.set_strength(strength);
        Ok(())
    }

    /// Order every friendly unit in a section; returns how many were marked
    pub fn order_all_friendly_units_in_section(
        &mut self,
        section: Section,
        side: Side,
        position: PlayerPosition,
    ) -> usize {
        let geometry = BoardGeometry::get();
        let mut count = 0;
        for (&hex, id) in &self.positions {
            if self.units.get(id).map_or(false, |u| u.side == side)
                && geometry.is_hex_in_section(hex, section, position)
            {
                if let Some(state) = self.states.get_mut(id) {
                    state.is_ordered = true;
                    count += 1;
                }
            }
        }
        count
    }

    /// Reset turn-scoped flags on every unit
    pub fn clear_all_unit_turn_state(&mut self) {
        for state in self.states.values_mut() {
            state.clear_turn_state();
        }
    }
}

fn missing_state(id: UnitId) -> GameError {
    tracing::error!(unit = %id, "unit registered without state");
    GameError::MissingUnitState(id)
}

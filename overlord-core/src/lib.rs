//! OVERLORD Core - Rules and state engine
//!
//! This crate provides the core game logic for OVERLORD:
//! - Board geometry (hex grid with axial coordinates and sections)
//! - Units, terrain and combat dice
//! - Command cards, deck and medal tracking
//! - Game state, phase stack and move generation with undo
//! - Scenario loading and a greedy AI

pub mod geometry;
pub mod terrain;
pub mod unit;
pub mod error;
pub mod board;
pub mod combat;
pub mod cards;
pub mod deck;
pub mod score;
pub mod phase;
pub mod moves;
pub mod game;
pub mod eval;
pub mod ai;
pub mod scenario;

// Re-exports for convenient access
pub use geometry::{BoardGeometry, Direction, HexCoord, PlayerPosition, Section, HEX_COUNT};
pub use terrain::{Fortification, Terrain, TerrainMap, TownVariant};
pub use unit::{Side, SituatedUnit, Unit, UnitId, UnitKind, UnitState};
pub use error::{ErrorCategory, GameError, Result};
pub use board::Board;
pub use combat::{calculate_dice_count, resolve_hits, DiceFace, DiceRoller, FixedDice, RandomDice};
pub use cards::{standard_deck, CardId, CommandCard, Limit, OrderRule, Slot};
pub use deck::{CardLocation, Deck};
pub use score::ScoreTracker;
pub use phase::{Phase, PhaseKind};
pub use moves::{BattleReport, Move};
pub use game::{GameConfig, GameResult, GameState, Player};
pub use eval::{evaluate, Heuristics, WIN_VALUE};
pub use ai::GreedyAi;
pub use scenario::Scenario;

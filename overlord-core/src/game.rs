//! Game state, turn flow and the move execution surface

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::cards::{CardId, CommandCard};
use crate::combat::DiceRoller;
use crate::deck::{CardLocation, Deck};
use crate::error::{GameError, Result};
use crate::geometry::{BoardGeometry, HexCoord, PlayerPosition};
use crate::moves::{BattleReport, Move};
use crate::phase::Phase;
use crate::score::{ScoreTracker, DEFAULT_MEDALS_TO_WIN};
use crate::terrain::{Fortification, Terrain, TerrainMap};
use crate::unit::{Side, SituatedUnit, Unit};

// ============================================================================
// CORE TYPES
// ============================================================================

/// A player's army and the board edge they sit at
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    pub side: Side,
    pub position: PlayerPosition,
}

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    Won(Side),
}

/// Game options
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub medals_to_win: u32,
    pub bottom_hand_size: usize,
    pub top_hand_size: usize,
    /// Side seated at the bottom edge; it plays first
    pub bottom_side: Side,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            medals_to_win: DEFAULT_MEDALS_TO_WIN,
            bottom_hand_size: 5,
            top_hand_size: 5,
            bottom_side: Side::Allies,
        }
    }
}

impl GameConfig {
    pub fn with_medals_to_win(mut self, medals: u32) -> Self {
        self.medals_to_win = medals;
        self
    }

    pub fn with_hand_sizes(mut self, bottom: usize, top: usize) -> Self {
        self.bottom_hand_size = bottom;
        self.top_hand_size = top;
        self
    }

    pub fn with_bottom_side(mut self, side: Side) -> Self {
        self.bottom_side = side;
        self
    }

    fn hand_size(&self, position: PlayerPosition) -> usize {
        match position {
            PlayerPosition::Bottom => self.bottom_hand_size,
            PlayerPosition::Top => self.top_hand_size,
        }
    }
}

/// Game state before a move, stored for undo
#[derive(Clone, Debug, PartialEq)]
struct Snapshot(Box<GameState>);

// ============================================================================
// GAME STATE
// ============================================================================

/// Game state.
///
/// Every executed move keeps a full snapshot for undo, and `clone` copies
/// that stack too. Long-running callers should call `clear_history` once
/// they no longer need to undo; simulations should use `fork`, which starts
/// with an empty history.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    board: Board,
    /// Shared between clones once setup is finished
    terrain: Arc<TerrainMap>,
    setup_finished: bool,
    deck: Deck,
    score: ScoreTracker,
    /// Index 0 starts at the bottom edge
    players: [Player; 2],
    active_index: usize,
    current_card: Option<CardId>,
    /// Top of the stack is the last element
    phases: Vec<Phase>,
    config: GameConfig,
    /// Completed turns
    pub turn: u32,
    result: GameResult,
    last_battle: Option<BattleReport>,
    history: Vec<Snapshot>,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Empty board with every card in the deck, ready for setup
    pub fn new(config: GameConfig, cards: Vec<CommandCard>) -> Self {
        let players = [
            Player {
                side: config.bottom_side,
                position: PlayerPosition::Bottom,
            },
            Player {
                side: config.bottom_side.opponent(),
                position: PlayerPosition::Top,
            },
        ];

        Self {
            board: Board::new(),
            terrain: Arc::new(TerrainMap::new()),
            setup_finished: false,
            deck: Deck::new(cards),
            score: ScoreTracker::new(config.medals_to_win),
            players,
            active_index: 0,
            current_card: None,
            phases: vec![Phase::PlayCard],
            config,
            turn: 0,
            result: GameResult::Ongoing,
            last_battle: None,
            history: Vec::new(),
        }
    }

    // ========================================================================
    // SETUP
    // ========================================================================

    pub fn place_unit(&mut self, hex: HexCoord, unit: Unit) -> Result<()> {
        self.board.place_unit(hex, unit)
    }

    pub fn set_terrain(&mut self, hex: HexCoord, terrain: Terrain) -> Result<()> {
        self.check_terrain_writable(hex)?;
        Arc::make_mut(&mut self.terrain).set_terrain(hex, terrain);
        Ok(())
    }

    pub fn set_fortification(&mut self, hex: HexCoord, fortification: Option<Fortification>) -> Result<()> {
        self.check_terrain_writable(hex)?;
        Arc::make_mut(&mut self.terrain).set_fortification(hex, fortification);
        Ok(())
    }

    fn check_terrain_writable(&self, hex: HexCoord) -> Result<()> {
        if self.setup_finished {
            return Err(GameError::TerrainFrozen(hex));
        }
        if !BoardGeometry::get().contains(hex) {
            return Err(GameError::OffBoard(hex));
        }
        Ok(())
    }

    /// Freeze the terrain map
    pub fn finish_setup(&mut self) {
        self.setup_finished = true;
    }

    pub fn is_setup_finished(&self) -> bool {
        self.setup_finished
    }

    pub fn shuffle_deck<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.deck.shuffle(rng);
    }

    /// Fill both hands to their configured size
    pub fn deal_opening_hands(&mut self) {
        for player in self.players {
            let hand = CardLocation::hand_of(player.position);
            while self.deck.count_in(hand) < self.config.hand_size(player.position) {
                if self.deck.draw(hand).is_none() {
                    break;
                }
            }
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn terrain(&self) -> &TerrainMap {
        &self.terrain
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn score(&self) -> &ScoreTracker {
        &self.score
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn last_battle(&self) -> Option<&BattleReport> {
        self.last_battle.as_ref()
    }

    pub(crate) fn set_last_battle(&mut self, report: BattleReport) {
        self.last_battle = Some(report);
    }

    /// Every unit with position, terrain and state, row-major
    pub fn all_units(&self) -> Vec<SituatedUnit> {
        self.board.all_units(&self.terrain)
    }

    pub fn cards_in_location(&self, location: CardLocation) -> Vec<&CommandCard> {
        self.deck.cards_in(location)
    }

    pub fn hand(&self, position: PlayerPosition) -> Vec<&CommandCard> {
        self.deck.cards_in(CardLocation::hand_of(position))
    }

    // ========================================================================
    // PLAYERS
    // ========================================================================

    /// The player to act, accounting for a phase played by the opponent
    pub fn active_player(&self) -> Player {
        match self.current_phase() {
            Some(phase) if phase.temporary_player_switch() => self.players[1 - self.active_index],
            _ => self.players[self.active_index],
        }
    }

    /// The player whose turn it is
    pub fn turn_player(&self) -> Player {
        self.players[self.active_index]
    }

    pub fn active_player_index(&self) -> usize {
        self.active_index
    }

    pub fn player_index_of(&self, side: Side) -> usize {
        if self.players[0].side == side {
            0
        } else {
            1
        }
    }

    pub fn position_of(&self, side: Side) -> PlayerPosition {
        self.players[self.player_index_of(side)].position
    }

    /// Index of `side`'s medal table, which follows its board edge
    pub fn medal_index(&self, side: Side) -> usize {
        self.position_of(side).index()
    }

    /// Swap which player sits at the bottom edge. Hands and medals follow
    /// their owners.
    pub fn reverse_board(&mut self) {
        for player in &mut self.players {
            player.position = player.position.other();
        }
        self.deck.swap_hands();
        self.score.swap_tables();
    }

    // ========================================================================
    // CARDS
    // ========================================================================

    pub fn set_current_card(&mut self, id: CardId) -> Result<()> {
        if let Some(existing) = self.current_card {
            return Err(GameError::CardAlreadyActive { existing });
        }
        self.deck.card(id)?;
        self.current_card = Some(id);
        Ok(())
    }

    pub fn current_card_id(&self) -> Option<CardId> {
        self.current_card
    }

    pub fn active_card(&self) -> Option<&CommandCard> {
        self.current_card.and_then(|id| self.deck.card(id).ok())
    }

    pub(crate) fn require_active_card(&self) -> Result<CardId> {
        self.current_card.ok_or(GameError::NoActiveCard)
    }

    // ========================================================================
    // PHASE STACK
    // ========================================================================

    pub fn current_phase(&self) -> Option<&Phase> {
        self.phases.last()
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn push_phase(&mut self, phase: Phase) {
        tracing::debug!(phase = phase.name(), "phase pushed");
        self.phases.push(phase);
    }

    /// Swap the top phase, returning the old one
    pub fn replace_phase(&mut self, phase: Phase) -> Result<Phase> {
        let top = self.phases.last_mut().ok_or(GameError::NoPhase)?;
        tracing::debug!(from = top.name(), to = phase.name(), "phase replaced");
        Ok(std::mem::replace(top, phase))
    }

    /// Pop the top phase; emptying the stack completes the turn
    pub fn pop_phase(&mut self) -> Result<Phase> {
        let phase = self.phases.pop().ok_or(GameError::NoPhase)?;
        tracing::debug!(phase = phase.name(), "phase popped");
        if self.phases.is_empty() {
            self.complete_turn()?;
        }
        Ok(phase)
    }

    fn complete_turn(&mut self) -> Result<()> {
        if let Some(card) = self.current_card.take() {
            self.deck.move_card(card, CardLocation::DiscardPile)?;
        }
        self.board.clear_all_unit_turn_state();

        let played = self.players[self.active_index];
        let drawn = self.deck.draw(CardLocation::hand_of(played.position));
        if drawn.is_none() {
            tracing::warn!("no card left to draw");
        }

        self.active_index = 1 - self.active_index;
        self.turn += 1;
        self.phases.push(Phase::PlayCard);
        tracing::info!(
            turn = self.turn,
            next = ?self.players[self.active_index].side,
            "turn complete"
        );
        Ok(())
    }

    // ========================================================================
    // COMBAT OUTCOMES
    // ========================================================================

    /// Remove the unit at `hex` and credit its opponent with a medal
    pub(crate) fn eliminate(&mut self, hex: HexCoord) -> Result<()> {
        let unit = self.board.remove_unit(hex).ok_or(GameError::NoUnitAt(hex))?;
        let victor = unit.side.opponent();
        let index = self.medal_index(victor);
        let medals = self.score.award(index, Arc::clone(&unit));
        tracing::info!(unit = %unit.id, kind = %unit.kind, ?victor, medals, "unit eliminated");

        if self.score.has_won(index) {
            self.result = GameResult::Won(victor);
            tracing::info!(?victor, medals, "game won");
        }
        Ok(())
    }

    // ========================================================================
    // MOVES
    // ========================================================================

    /// Legal moves of the top phase
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.result != GameResult::Ongoing {
            return vec![];
        }
        match self.current_phase() {
            Some(phase) => phase.legal_moves(self),
            None => vec![],
        }
    }

    /// Validate and apply a move. A failed move leaves the state unchanged.
    pub fn execute_move(&mut self, mv: &Move, dice: &mut dyn DiceRoller) -> Result<()> {
        if self.result != GameResult::Ongoing {
            return Err(GameError::GameOver);
        }
        if !self.legal_moves().contains(mv) {
            let phase = self.current_phase().map_or("none", Phase::name);
            tracing::warn!(%mv, phase, "illegal move rejected");
            return Err(GameError::IllegalMove(mv.to_string()));
        }

        let history = std::mem::take(&mut self.history);
        let before = Snapshot(Box::new(self.clone()));
        self.history = history;

        if let Err(err) = mv.apply(self, dice) {
            tracing::error!(%mv, %err, "move failed; state restored");
            self.restore(before);
            return Err(err);
        }
        tracing::debug!(%mv, "move executed");
        self.history.push(before);
        Ok(())
    }

    /// Restore the state from before the last executed move
    pub fn undo_move(&mut self) -> Result<()> {
        let before = self.history.pop().ok_or(GameError::NothingToUndo)?;
        self.restore(before);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Number of snapshots held for undo
    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn restore(&mut self, snapshot: Snapshot) {
        let history = std::mem::take(&mut self.history);
        *self = *snapshot.0;
        self.history = history;
    }

    /// Clone without undo history, for simulation
    pub fn fork(&self) -> Self {
        Self {
            board: self.board.clone(),
            terrain: Arc::clone(&self.terrain),
            deck: self.deck.clone(),
            score: self.score.clone(),
            phases: self.phases.clone(),
            config: self.config.clone(),
            last_battle: self.last_battle.clone(),
            history: Vec::new(),
            ..*self
        }
    }
}

//! Engine error type

use crate::cards::CardId;
use crate::geometry::HexCoord;
use crate::unit::UnitId;

/// Broad class of a [`GameError`], for callers that turn errors into messages
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad or blocked coordinate
    Spatial,
    /// Request not allowed in the current game state
    StateMachine,
    /// User-facing lookup failure
    NotFound,
    /// Engine bookkeeping is inconsistent
    Invariant,
}

/// Error types for engine operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("hex {0} is not on the board")]
    OffBoard(HexCoord),

    #[error("hex {0} is already occupied")]
    Occupied(HexCoord),

    #[error("no unit at hex {0}")]
    NoUnitAt(HexCoord),

    #[error("card {existing} is already active")]
    CardAlreadyActive { existing: CardId },

    #[error("no command card is active")]
    NoActiveCard,

    #[error("terrain at {0} cannot change after setup is finished")]
    TerrainFrozen(HexCoord),

    #[error("unit {0} is already on the board")]
    DuplicateUnit(UnitId),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("no phase is active")]
    NoPhase,

    #[error("the game is over")]
    GameOver,

    #[error("no move to undo")]
    NothingToUndo,

    #[error("battle distance must be at least 1, got {0}")]
    InvalidDistance(u32),

    #[error("card {0} not found")]
    CardNotFound(CardId),

    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),

    #[error("unit {0} has no state")]
    MissingUnitState(UnitId),
}

impl GameError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GameError::OffBoard(_) | GameError::Occupied(_) | GameError::NoUnitAt(_) => {
                ErrorCategory::Spatial
            }
            GameError::CardAlreadyActive { .. }
            | GameError::NoActiveCard
            | GameError::TerrainFrozen(_)
            | GameError::DuplicateUnit(_)
            | GameError::IllegalMove(_)
            | GameError::NoPhase
            | GameError::GameOver
            | GameError::NothingToUndo
            | GameError::InvalidDistance(_) => ErrorCategory::StateMachine,
            GameError::CardNotFound(_) => ErrorCategory::NotFound,
            GameError::UnknownUnit(_) | GameError::MissingUnitState(_) => ErrorCategory::Invariant,
        }
    }

    /// Engine bug rather than a bad request
    pub fn is_fatal(&self) -> bool {
        self.category() == ErrorCategory::Invariant
    }
}

pub type Result<T> = std::result::Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_detail() {
        let err = GameError::Occupied(HexCoord::new(4, 2));
        assert_eq!(err.to_string(), "hex (4, 2) is already occupied");

        let err = GameError::CardAlreadyActive { existing: CardId(7) };
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn test_categories() {
        assert_eq!(GameError::OffBoard(HexCoord::new(0, 9)).category(), ErrorCategory::Spatial);
        assert_eq!(GameError::CardNotFound(CardId(1)).category(), ErrorCategory::NotFound);
        assert!(GameError::MissingUnitState(UnitId(3)).is_fatal());
        assert!(!GameError::IllegalMove("x".into()).is_fatal());
    }
}

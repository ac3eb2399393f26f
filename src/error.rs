//! Error types for rejected operations
//!
//! Every variant is a local, recoverable rejection: the operation is
//! refused before any mutation, match state stays intact, and the session
//! surfaces the message to the UI collaborator. Invariant violations are
//! not represented here — those are defects, caught by debug assertions.

/// A rejected placement, skill use, or target selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("position is outside the board")]
    OutOfBounds,

    #[error("cell is already occupied")]
    Occupied,

    #[error("cell is broken and out of play")]
    CellBroken,

    #[error("cell is temporarily blocked")]
    CellBlocked,

    #[error("the match is already over")]
    MatchOver,

    #[error("it is not your turn")]
    NotYourTurn,

    #[error("you have already acted this turn")]
    AlreadyActed,

    #[error("skill is still cooling down")]
    SkillOnCooldown,

    #[error("skill is not part of this roster")]
    SkillNotOwned,

    #[error("invalid target: {0}")]
    InvalidTarget(&'static str),

    #[error("there is no broken area to restore")]
    NothingToRestore,

    #[error("no target selection is in progress")]
    NoTargetSelection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            GameError::SkillOnCooldown.to_string(),
            "skill is still cooling down"
        );
        assert_eq!(
            GameError::InvalidTarget("expected an opponent stone").to_string(),
            "invalid target: expected an opponent stone"
        );
    }
}

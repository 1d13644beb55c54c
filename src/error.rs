//! Engine-level errors, in the shape of the teacher's `PlayCardsError`:
//! one flat `thiserror` enum naming every way a command can be rejected.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Classification failed, or the play does not beat `last_play` -
    /// also covers a Pass issued while holding the lead (nothing to pass on).
    #[error("cards are not a legal play for the current trick")]
    IllegalPlay,

    #[error("it is not seat {expected}'s turn, it is seat {actual}'s")]
    OutOfTurn { expected: u8, actual: u8 },

    #[error("seat does not hold one or more of the named cards")]
    CardsNotOwned,

    #[error("command is not valid in the current match phase")]
    PhaseMismatch,

    #[error("tribute offer is not the maximum card allowed under the selection rules")]
    TributeSelectionViolation,

    #[error("debug request is malformed or not permitted in this phase")]
    InvalidDebugRequest,
}

pub type EngineResult<T> = Result<T, EngineError>;

//! Errors surfaced by the roll sequencer.
//!
//! Every error is raised before any state is touched: a failed trigger leaves
//! the phase, display and armed timer exactly as they were.
use dice_core::DiceError;
use thiserror::Error;

use crate::sequencer::{SequencePhase, Trigger};

pub type Result<T> = std::result::Result<T, SequenceError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("roll request rejected: {0}")]
    InvalidRequest(#[from] DiceError),

    #[error("{trigger} is not accepted while {phase}")]
    UnexpectedTrigger {
        phase: SequencePhase,
        trigger: Trigger,
    },

    #[error("die index {index} is out of range for {len} dice")]
    DieOutOfRange { index: usize, len: usize },

    #[error("no die selected for sacrifice")]
    NoDieSelected,
}

//! Error types for dice math.
//!
//! Two families of failures exist:
//! - **Request validation**: a [`RollRequest`](crate::RollRequest) names an
//!   unsupported face count, a negative quantity or too many dice. Raised before any draw.
//! - **Parsing**: stored roll text or dice notation is malformed. Stored roll
//!   text is untrusted input, so every structural problem surfaces here rather
//!   than as a panic.

use thiserror::Error;

/// Errors surfaced by dice generation and the roll text codec.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiceError {
    #[error("unsupported die face d{0} (expected one of d20, d12, d10, d8, d6, d4)")]
    UnknownFace(u32),

    #[error("invalid dice spec #{index}: {issue}")]
    InvalidRequest { index: usize, issue: RequestIssue },

    #[error("malformed roll text at byte {position}: {issue}")]
    Parse { position: usize, issue: ParseIssue },

    #[error("invalid dice notation term '{term}'")]
    Notation { term: String },
}

impl DiceError {
    pub(crate) fn invalid_request(index: usize, issue: RequestIssue) -> Self {
        Self::InvalidRequest { index, issue }
    }

    pub(crate) fn parse(position: usize, issue: ParseIssue) -> Self {
        Self::Parse { position, issue }
    }
}

/// Why a single dice spec was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RequestIssue {
    #[error("unsupported die face d{0}")]
    UnknownFace(u32),

    #[error("negative quantity {0}")]
    NegativeQuantity(i64),

    #[error("quantity {0} exceeds the per-spec limit")]
    QuantityOverflow(i64),
}

/// Why stored roll text could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParseIssue {
    #[error("category is missing the ':' separator")]
    MissingFaceSeparator,

    #[error("'{0}' is not a supported die face")]
    UnknownFace(String),

    #[error("category d{0} lists no rolls")]
    EmptyCategory(u32),

    #[error("'{0}' is not a roll value")]
    InvalidRoll(String),

    #[error("roll {roll} is outside 1..={faces}")]
    RollOutOfRange { roll: u32, faces: u32 },
}

pub type Result<T> = core::result::Result<T, DiceError>;

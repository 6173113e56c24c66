//! The die mold: the fixed set of supported face counts.

use crate::error::DiceError;

/// A supported die.
///
/// Declaration order matches [`DieFace::MOLD`], the canonical descending order
/// used by the roll text codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub enum DieFace {
    #[strum(serialize = "d20")]
    D20,
    #[strum(serialize = "d12")]
    D12,
    #[strum(serialize = "d10")]
    D10,
    #[strum(serialize = "d8")]
    D8,
    #[strum(serialize = "d6")]
    D6,
    #[strum(serialize = "d4")]
    D4,
}

impl DieFace {
    /// Canonical die mold, largest face first.
    pub const MOLD: [DieFace; 6] = [
        DieFace::D20,
        DieFace::D12,
        DieFace::D10,
        DieFace::D8,
        DieFace::D6,
        DieFace::D4,
    ];

    /// Number of sides on this die.
    pub const fn sides(self) -> u32 {
        match self {
            DieFace::D20 => 20,
            DieFace::D12 => 12,
            DieFace::D10 => 10,
            DieFace::D8 => 8,
            DieFace::D6 => 6,
            DieFace::D4 => 4,
        }
    }

    /// Position of this die in [`DieFace::MOLD`].
    pub const fn mold_index(self) -> usize {
        self as usize
    }

    pub const fn from_sides(sides: u32) -> Option<Self> {
        match sides {
            20 => Some(DieFace::D20),
            12 => Some(DieFace::D12),
            10 => Some(DieFace::D10),
            8 => Some(DieFace::D8),
            6 => Some(DieFace::D6),
            4 => Some(DieFace::D4),
            _ => None,
        }
    }
}

impl TryFrom<u32> for DieFace {
    type Error = DiceError;

    fn try_from(sides: u32) -> Result<Self, Self::Error> {
        Self::from_sides(sides).ok_or(DiceError::UnknownFace(sides))
    }
}

impl From<DieFace> for u32 {
    fn from(face: DieFace) -> Self {
        face.sides()
    }
}

//! What the presentation layer may show for the in-flight roll.

use serde::{Deserialize, Serialize};

/// Read-only view of the sequencer's transient display state.
///
/// Fields are filled in as the sequence advances and cleared together when
/// it returns to idle. Only the sequencer writes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollDisplay {
    /// Individual die faces, flat and in record order (from `BonusReveal`).
    pub dice: Option<Vec<u32>>,
    /// Two bonus digits (from `TotalReveal`).
    pub bonus: Option<String>,
    /// Three total digits; tracks the sacrifice selection.
    pub total: Option<String>,
    /// Numeric total behind [`RollDisplay::total`].
    pub displayed_total: Option<i64>,
    /// Per-die selection is enabled (`SacrificeSelect`).
    pub sacrifice_enabled: bool,
    /// Die currently chosen for sacrifice.
    pub selection: Option<usize>,
}

impl RollDisplay {
    pub fn is_clear(&self) -> bool {
        *self == RollDisplay::default()
    }
}

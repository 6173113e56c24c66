//! Sequencer phases and the triggers that move between them.

use serde::{Deserialize, Serialize};

/// Presentation phase of the single in-flight roll.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum SequencePhase {
    #[default]
    Idle,
    Rolling,
    BonusReveal,
    TotalReveal,
    AwaitingDecision,
    SacrificeSelect,
    Closing,
}

impl SequencePhase {
    /// Phases that leave on their own after a delay.
    pub const fn is_timed(self) -> bool {
        matches!(
            self,
            SequencePhase::Rolling
                | SequencePhase::BonusReveal
                | SequencePhase::TotalReveal
                | SequencePhase::Closing
        )
    }

    /// Phases waiting on the user.
    pub const fn is_interactive(self) -> bool {
        matches!(
            self,
            SequencePhase::AwaitingDecision | SequencePhase::SacrificeSelect
        )
    }
}

/// Inputs accepted by the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Trigger {
    SubmitRequest,
    AnimationComplete,
    Elapsed,
    ChooseDone,
    ChooseSacrifice,
    SelectDie,
    ConfirmSacrifice,
    CancelSacrifice,
}

//! Payloads published by the roll runtime.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::bus::{EventBus, PublishReport};

/// Topic carrying every finalized roll.
pub const ROLL_FINALIZED: &str = "rollFinalized";

/// Die discarded by a confirmed sacrifice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SacrificedDie {
    /// Position in the flat ordered list of dice.
    pub index: usize,
    pub value: u32,
}

/// Outcome of a completed sequence, as consumed by resource services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedRoll {
    /// Aggregate total, minus the sacrificed die when there is one.
    pub total: i64,
    /// Canonical roll text; absent when no die was rolled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    /// Purpose tag of the originating request.
    pub purpose: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sacrificed: Option<SacrificedDie>,
}

impl EventBus<FinalizedRoll> {
    /// Publishes `roll` on [`ROLL_FINALIZED`].
    pub fn publish_finalized(&self, roll: &FinalizedRoll) -> PublishReport {
        let report = self.publish(ROLL_FINALIZED, roll);
        if report.failed > 0 {
            debug!(
                target: "runtime::events",
                delivered = report.delivered,
                failed = report.failed,
                "Some rollFinalized handlers failed"
            );
        }
        report
    }
}

//! Roll results: per-face outcomes, the aggregate and the immutable record.

use crate::codec;
use crate::face::DieFace;
use crate::roll::aggregate_total;

/// Rolls drawn for one dice spec, plus their derived statistics.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiceOutcome {
    pub face: DieFace,
    pub rolls: Vec<u32>,
    pub sum: u64,
    pub best: u32,
    pub worst: u32,
    /// Mean truncated (not rounded) to one decimal.
    pub mean: f64,
}

impl DiceOutcome {
    /// Derives sum, best, worst and mean from an ordered list of rolls.
    ///
    /// Best and worst start from the first roll and move only on strict
    /// comparison, so an empty list yields zero for both.
    pub fn from_rolls(face: DieFace, rolls: Vec<u32>) -> Self {
        let first = rolls.first().copied().unwrap_or(0);
        let (mut best, mut worst) = (first, first);
        let mut sum = 0u64;

        for &roll in &rolls {
            sum += u64::from(roll);
            if roll > best {
                best = roll;
            }
            if roll < worst {
                worst = roll;
            }
        }

        let mean = truncated_mean(sum, rolls.len());
        Self {
            face,
            rolls,
            sum,
            best,
            worst,
            mean,
        }
    }

    /// An outcome for a zero-quantity spec.
    pub fn empty(face: DieFace) -> Self {
        Self::from_rolls(face, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.rolls.is_empty()
    }
}

/// `floor((sum / max(quantity, 1)) * 10) / 10`
fn truncated_mean(sum: u64, quantity: usize) -> f64 {
    let divisor = quantity.max(1) as f64;
    ((sum as f64 / divisor) * 10.0).floor() / 10.0
}

/// Totals across all outcomes of a record.
///
/// `best`/`worst` are only present when a single face category contributed
/// rolls. Comparing a d20 against a d6 has no defined meaning, so they are
/// dropped as soon as a second category appears.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aggregate {
    pub total: u64,
    pub best: Option<u32>,
    pub worst: Option<u32>,
}

/// Immutable result of executing a roll request.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollRecord {
    outcomes: Vec<DiceOutcome>,
    aggregate: Aggregate,
    formula: String,
}

impl RollRecord {
    /// Builds a record, computing the aggregate and canonical formula.
    pub fn new(outcomes: Vec<DiceOutcome>) -> Self {
        let aggregate = aggregate_total(&outcomes);
        let formula = codec::serialize(&outcomes);
        Self {
            outcomes,
            aggregate,
            formula,
        }
    }

    pub fn outcomes(&self) -> &[DiceOutcome] {
        &self.outcomes
    }

    pub fn aggregate(&self) -> Aggregate {
        self.aggregate
    }

    pub fn total(&self) -> u64 {
        self.aggregate.total
    }

    /// Canonical serialized text of this record (`"20:17;6:3,5"`).
    pub fn formula(&self) -> &str {
        &self.formula
    }

    /// True when no die was rolled at all.
    pub fn is_empty(&self) -> bool {
        self.outcomes.iter().all(DiceOutcome::is_empty)
    }

    /// Every individual die in record order (outcomes first, then rolls).
    pub fn dice(&self) -> impl Iterator<Item = u32> + '_ {
        self.outcomes
            .iter()
            .flat_map(|outcome| outcome.rolls.iter().copied())
    }

    pub fn dice_count(&self) -> usize {
        self.outcomes.iter().map(|outcome| outcome.rolls.len()).sum()
    }

    /// Value of the die at `index` in the flat ordering of [`RollRecord::dice`].
    pub fn die(&self, index: usize) -> Option<u32> {
        self.dice().nth(index)
    }

    /// The record reshaped into the full die mold: one outcome per face in
    /// mold order, same-face outcomes merged in record order.
    ///
    /// This is exactly what [`codec::deserialize`] rebuilds from
    /// [`RollRecord::formula`].
    pub fn canonical(&self) -> RollRecord {
        let outcomes = DieFace::MOLD
            .into_iter()
            .map(|face| {
                let rolls = self
                    .outcomes
                    .iter()
                    .filter(|outcome| outcome.face == face)
                    .flat_map(|outcome| outcome.rolls.iter().copied())
                    .collect();
                DiceOutcome::from_rolls(face, rolls)
            })
            .collect();
        RollRecord::new(outcomes)
    }
}

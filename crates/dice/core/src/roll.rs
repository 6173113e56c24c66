//! Drawing outcomes and aggregating them.

use crate::error::Result;
use crate::face::DieFace;
use crate::outcome::{Aggregate, DiceOutcome, RollRecord};
use crate::request::RollRequest;
use crate::rng::DieRoller;

/// Executes a roll request.
///
/// The whole request is validated before the first draw, so an invalid spec
/// anywhere in the list leaves the roller untouched. Outcomes keep request
/// order, one per spec.
pub fn generate_outcomes<R>(request: &RollRequest, roller: &mut R) -> Result<RollRecord>
where
    R: DieRoller + ?Sized,
{
    let specs = request.validate()?;

    let outcomes = specs
        .into_iter()
        .map(|(face, quantity)| {
            let rolls = (0..quantity).map(|_| roller.roll(face)).collect();
            DiceOutcome::from_rolls(face, rolls)
        })
        .collect();

    Ok(RollRecord::new(outcomes))
}

/// Sums every outcome that has rolls.
///
/// Outcomes sharing a face count as one category. With exactly one category
/// its best/worst carry over; with two or more they are omitted.
pub fn aggregate_total(outcomes: &[DiceOutcome]) -> Aggregate {
    let mut total = 0u64;
    let mut categories: Vec<(DieFace, u32, u32)> = Vec::new();

    for outcome in outcomes.iter().filter(|outcome| !outcome.is_empty()) {
        total += outcome.sum;
        match categories
            .iter_mut()
            .find(|(face, _, _)| *face == outcome.face)
        {
            Some((_, best, worst)) => {
                *best = (*best).max(outcome.best);
                *worst = (*worst).min(outcome.worst);
            }
            None => categories.push((outcome.face, outcome.best, outcome.worst)),
        }
    }

    match categories.as_slice() {
        [(_, best, worst)] => Aggregate {
            total,
            best: Some(*best),
            worst: Some(*worst),
        },
        _ => Aggregate {
            total,
            best: None,
            worst: None,
        },
    }
}

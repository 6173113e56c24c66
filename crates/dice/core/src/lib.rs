//! Pure dice math shared by the roll runtime and offline tools.
//!
//! `dice-core` turns a [`RollRequest`] into an immutable [`RollRecord`],
//! aggregates totals across face categories, and converts records to and from
//! their canonical text form (`"20:17;6:3,5"`). Nothing here performs I/O or
//! keeps hidden state; randomness is injected through [`DieRoller`].
pub mod codec;
pub mod display;
pub mod error;
pub mod face;
pub mod outcome;
pub mod request;
pub mod rng;
pub mod roll;

pub use codec::{deserialize, serialize};
pub use display::{BONUS_WIDTH, TOTAL_WIDTH, pad_digits};
pub use error::{DiceError, ParseIssue, RequestIssue, Result};
pub use face::DieFace;
pub use outcome::{Aggregate, DiceOutcome, RollRecord};
pub use request::{DiceSpec, MAX_DICE_PER_SPEC, Purpose, RollRequest};
pub use rng::{DieRoller, FixedRoller, PcgRoller, RandRoller};
pub use roll::{aggregate_total, generate_outcomes};

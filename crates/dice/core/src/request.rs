//! Roll requests as callers submit them.
//!
//! [`DiceSpec`] is deliberately raw: it carries whatever the caller sent
//! (a negative quantity, a d7) so that validation can reject it with a precise
//! [`DiceError::InvalidRequest`] instead of the bad value being unrepresentable
//! at the boundary and silently coerced.

use core::fmt;
use core::str::FromStr;

use crate::error::{DiceError, RequestIssue, Result};
use crate::face::DieFace;

/// Tag prefix marking purposes that open the sacrifice decision.
pub const INTERACTIVE_PREFIX: &str = "skill-";

/// Tag of a purely presentational roll.
pub const FREE_TAG: &str = "free";

/// Largest quantity a single dice spec may ask for.
///
/// Every die is drawn and kept in the record, so the quantity bounds memory.
pub const MAX_DICE_PER_SPEC: usize = 1000;

/// How many dice of which face to roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiceSpec {
    pub quantity: i64,
    pub faces: u32,
}

impl DiceSpec {
    pub const fn new(quantity: i64, faces: u32) -> Self {
        Self { quantity, faces }
    }

    /// Checks the spec against the die mold.
    ///
    /// `index` is the spec's position inside its request and is only used to
    /// give the error some context.
    pub fn validate(&self, index: usize) -> Result<(DieFace, usize)> {
        let face = DieFace::from_sides(self.faces).ok_or_else(|| {
            DiceError::invalid_request(index, RequestIssue::UnknownFace(self.faces))
        })?;
        if self.quantity < 0 {
            return Err(DiceError::invalid_request(
                index,
                RequestIssue::NegativeQuantity(self.quantity),
            ));
        }
        let quantity = usize::try_from(self.quantity)
            .ok()
            .filter(|quantity| *quantity <= MAX_DICE_PER_SPEC)
            .ok_or_else(|| {
                DiceError::invalid_request(index, RequestIssue::QuantityOverflow(self.quantity))
            })?;
        Ok((face, quantity))
    }
}

/// What a roll is for; selects which sequencer phases are reachable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
pub enum Purpose {
    /// `"free"`: shows dice and bonus, never the total, never interactive.
    Free,
    /// `"skill-<id>"`: the user may sacrifice a die before finalizing.
    Interactive(String),
    /// Any other one-off tag such as `"card-<id>"`.
    Named(String),
}

impl Purpose {
    pub fn from_tag(tag: &str) -> Self {
        if tag == FREE_TAG {
            Purpose::Free
        } else if tag.starts_with(INTERACTIVE_PREFIX) {
            Purpose::Interactive(tag.to_owned())
        } else {
            Purpose::Named(tag.to_owned())
        }
    }

    pub fn as_tag(&self) -> &str {
        match self {
            Purpose::Free => FREE_TAG,
            Purpose::Interactive(tag) | Purpose::Named(tag) => tag,
        }
    }

    pub const fn is_free(&self) -> bool {
        matches!(self, Purpose::Free)
    }

    pub const fn is_interactive(&self) -> bool {
        matches!(self, Purpose::Interactive(_))
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for Purpose {
    type Err = core::convert::Infallible;

    fn from_str(tag: &str) -> core::result::Result<Self, Self::Err> {
        Ok(Purpose::from_tag(tag))
    }
}

impl From<String> for Purpose {
    fn from(tag: String) -> Self {
        Purpose::from_tag(&tag)
    }
}

impl From<Purpose> for String {
    fn from(purpose: Purpose) -> Self {
        match purpose {
            Purpose::Free => FREE_TAG.to_owned(),
            Purpose::Interactive(tag) | Purpose::Named(tag) => tag,
        }
    }
}

/// An ordered list of dice to roll, tagged with its purpose.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollRequest {
    pub dice: Vec<DiceSpec>,
    pub purpose: Purpose,
    /// Signed offset rendered as the two bonus digits. Never added to the total.
    #[cfg_attr(feature = "serde", serde(default))]
    pub bonus: i32,
}

impl RollRequest {
    pub fn new(purpose: Purpose) -> Self {
        Self {
            dice: Vec::new(),
            purpose,
            bonus: 0,
        }
    }

    /// Appends `quantity` dice with `faces` sides (builder pattern).
    #[must_use]
    pub fn with_dice(mut self, quantity: i64, faces: u32) -> Self {
        self.dice.push(DiceSpec::new(quantity, faces));
        self
    }

    /// Sets the signed bonus offset (builder pattern).
    #[must_use]
    pub fn with_bonus(mut self, bonus: i32) -> Self {
        self.bonus = bonus;
        self
    }

    /// Validates every spec, returning the resolved face and quantity of each.
    ///
    /// The first failing spec wins; nothing is drawn or mutated.
    pub fn validate(&self) -> Result<Vec<(DieFace, usize)>> {
        self.dice
            .iter()
            .enumerate()
            .map(|(index, spec)| spec.validate(index))
            .collect()
    }

    /// Builds a request from dice notation such as `"2d8+3"` or `"1d20, 2d6 -1"`.
    ///
    /// Terms are separated by whitespace, commas or signs. Dice terms look like
    /// `<qty>d<faces>` (quantity defaults to 1); bare integers are summed into
    /// the bonus. Face counts are checked later by [`RollRequest::validate`].
    pub fn from_notation(notation: &str, purpose: Purpose) -> Result<Self> {
        let mut request = RollRequest::new(purpose);

        for term in notation_terms(notation) {
            let (negative, body) = match term.as_bytes().first() {
                Some(b'+') => (false, &term[1..]),
                Some(b'-') => (true, &term[1..]),
                _ => (false, term),
            };
            let invalid = || DiceError::Notation {
                term: term.to_owned(),
            };

            if let Some((quantity, faces)) = body.split_once(['d', 'D']) {
                if negative {
                    return Err(invalid());
                }
                let quantity = if quantity.is_empty() {
                    1
                } else {
                    quantity.parse::<i64>().map_err(|_| invalid())?
                };
                let faces = faces.parse::<u32>().map_err(|_| invalid())?;
                request.dice.push(DiceSpec::new(quantity, faces));
            } else {
                let value = body.parse::<i32>().map_err(|_| invalid())?;
                let value = if negative { -value } else { value };
                request.bonus = request.bonus.checked_add(value).ok_or_else(invalid)?;
            }
        }

        if request.dice.is_empty() {
            return Err(DiceError::Notation {
                term: notation.trim().to_owned(),
            });
        }
        Ok(request)
    }
}

/// Splits notation into terms, keeping a leading sign attached to its term.
fn notation_terms(notation: &str) -> Vec<&str> {
    let mut terms = Vec::new();
    for chunk in notation.split(|c: char| c.is_whitespace() || c == ',') {
        let mut start = 0;
        for (offset, c) in chunk.char_indices() {
            if (c == '+' || c == '-') && offset > start {
                terms.push(&chunk[start..offset]);
                start = offset;
            }
        }
        if start < chunk.len() {
            terms.push(&chunk[start..]);
        }
    }
    terms.retain(|term| *term != "+" && *term != "-");
    terms
}

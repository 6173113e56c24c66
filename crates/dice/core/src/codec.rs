//! Lossless text form of roll outcomes.
//!
//! ```text
//! <faces>:<roll>,<roll>,...;<faces>:<roll>,...
//! ```
//!
//! Categories appear in die mold order (d20 first, d4 last); categories with
//! no rolls are omitted. `"20:17;6:3,5"` is one d20 showing 17 and two d6
//! showing 3 and 5.

use crate::error::{DiceError, ParseIssue, Result};
use crate::face::DieFace;
use crate::outcome::{DiceOutcome, RollRecord};

pub const CATEGORY_SEPARATOR: char = ';';
pub const FACE_SEPARATOR: char = ':';
pub const ROLL_SEPARATOR: char = ',';

/// Renders outcomes in canonical form.
///
/// Outcomes sharing a face are merged into a single category, rolls kept in
/// record order.
pub fn serialize(outcomes: &[DiceOutcome]) -> String {
    let mut text = String::new();

    for face in DieFace::MOLD {
        let mut rolls = outcomes
            .iter()
            .filter(|outcome| outcome.face == face)
            .flat_map(|outcome| outcome.rolls.iter())
            .peekable();
        if rolls.peek().is_none() {
            continue;
        }

        if !text.is_empty() {
            text.push(CATEGORY_SEPARATOR);
        }
        text.push_str(&face.sides().to_string());
        text.push(FACE_SEPARATOR);
        for (position, roll) in rolls.enumerate() {
            if position > 0 {
                text.push(ROLL_SEPARATOR);
            }
            text.push_str(&roll.to_string());
        }
    }

    text
}

/// Parses roll text back into a record shaped like the full die mold.
///
/// The result always holds six outcomes in mold order; faces absent from the
/// text come back empty. Statistics are recomputed with the same rules used
/// when drawing. Whitespace around tokens is tolerated; a face listed twice
/// has its rolls appended.
pub fn deserialize(text: &str) -> Result<RollRecord> {
    let mut rolls_by_face: [Vec<u32>; 6] = Default::default();

    let body = text.trim_start();
    let mut position = text.len() - body.len();

    if !body.trim_end().is_empty() {
        for segment in body.trim_end().split(CATEGORY_SEPARATOR) {
            parse_category(segment, position, &mut rolls_by_face)?;
            position += segment.len() + CATEGORY_SEPARATOR.len_utf8();
        }
    }

    let outcomes = DieFace::MOLD
        .into_iter()
        .zip(rolls_by_face)
        .map(|(face, rolls)| DiceOutcome::from_rolls(face, rolls))
        .collect();

    Ok(RollRecord::new(outcomes))
}

fn parse_category(segment: &str, position: usize, slots: &mut [Vec<u32>; 6]) -> Result<()> {
    let (face_text, rolls_text) = segment
        .split_once(FACE_SEPARATOR)
        .ok_or_else(|| DiceError::parse(position, ParseIssue::MissingFaceSeparator))?;

    let face_text = face_text.trim();
    let face = face_text
        .parse::<u32>()
        .ok()
        .and_then(DieFace::from_sides)
        .ok_or_else(|| DiceError::parse(position, ParseIssue::UnknownFace(face_text.to_owned())))?;

    let rolls_position = position + face_text.len() + FACE_SEPARATOR.len_utf8();
    if rolls_text.trim().is_empty() {
        return Err(DiceError::parse(
            rolls_position,
            ParseIssue::EmptyCategory(face.sides()),
        ));
    }

    let slot = &mut slots[face.mold_index()];
    for token in rolls_text.split(ROLL_SEPARATOR) {
        let token = token.trim();
        let roll = token.parse::<u32>().map_err(|_| {
            DiceError::parse(rolls_position, ParseIssue::InvalidRoll(token.to_owned()))
        })?;
        if !(1..=face.sides()).contains(&roll) {
            return Err(DiceError::parse(
                rolls_position,
                ParseIssue::RollOutOfRange {
                    roll,
                    faces: face.sides(),
                },
            ));
        }
        slot.push(roll);
    }

    Ok(())
}

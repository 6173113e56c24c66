//! Fixed-width digit rendering for the reveal phases.

use core::fmt::Display;

/// Width of the bonus readout.
pub const BONUS_WIDTH: usize = 2;

/// Width of the total readout.
pub const TOTAL_WIDTH: usize = 3;

/// Last `width` characters of `"0" * width + value`.
///
/// Wider values keep only their least significant characters (`1234` at width
/// 3 reads `"234"`); negative values keep their sign while it fits (`-3` reads
/// `"-3"`). This is a display concern only.
pub fn pad_digits(value: impl Display, width: usize) -> String {
    let padded = format!("{}{}", "0".repeat(width), value);
    padded[padded.len() - width..].to_owned()
}

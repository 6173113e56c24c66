//! Die rollers: where the randomness comes from.
//!
//! Dice math never reaches for a global RNG. Callers hand a [`DieRoller`] to
//! [`generate_outcomes`](crate::generate_outcomes), which makes draws
//! swappable:
//!
//! - [`RandRoller`] draws uniformly through `rand` (the default for play)
//! - [`PcgRoller`] is a seeded PCG stream, so a session seed reproduces rolls
//! - [`FixedRoller`] replays a scripted list of values

use rand::Rng;
use rand::rngs::ThreadRng;

use crate::face::DieFace;

/// Source of individual die results.
pub trait DieRoller {
    /// Roll one die; the result must lie in `1..=face.sides()`.
    fn roll(&mut self, face: DieFace) -> u32;
}

impl<T: DieRoller + ?Sized> DieRoller for &mut T {
    fn roll(&mut self, face: DieFace) -> u32 {
        (**self).roll(face)
    }
}

impl<T: DieRoller + ?Sized> DieRoller for Box<T> {
    fn roll(&mut self, face: DieFace) -> u32 {
        (**self).roll(face)
    }
}

/// Uniform draws from any `rand` generator.
#[derive(Clone, Debug)]
pub struct RandRoller<R = ThreadRng> {
    rng: R,
}

impl RandRoller<ThreadRng> {
    /// Roller backed by the thread-local generator.
    pub fn thread() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl<R: Rng> RandRoller<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl Default for RandRoller<ThreadRng> {
    fn default() -> Self {
        Self::thread()
    }
}

impl<R: Rng> DieRoller for RandRoller<R> {
    fn roll(&mut self, face: DieFace) -> u32 {
        self.rng.gen_range(1..=face.sides())
    }
}

/// Seeded PCG-XSH-RR stream (64-bit state, 32-bit output).
///
/// Same seed, same rolls. Draws use rejection sampling so every face is
/// equally likely.
#[derive(Clone, Copy, Debug)]
pub struct PcgRoller {
    state: u64,
}

impl PcgRoller {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        let state = self.state;

        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl DieRoller for PcgRoller {
    fn roll(&mut self, face: DieFace) -> u32 {
        let sides = u64::from(face.sides());
        let span = 1u64 << 32;
        let limit = span - span % sides;
        loop {
            let value = u64::from(self.next_u32());
            if value < limit {
                return (value % sides) as u32 + 1;
            }
        }
    }
}

/// Replays a fixed list of values, cycling when exhausted.
///
/// Values are clamped into the rolled die's range, so a script written for a
/// d20 still produces legal d4 results.
#[derive(Clone, Debug, Default)]
pub struct FixedRoller {
    values: Vec<u32>,
    cursor: usize,
}

impl FixedRoller {
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self {
            values: values.into_iter().collect(),
            cursor: 0,
        }
    }

    /// Number of dice rolled so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl DieRoller for FixedRoller {
    fn roll(&mut self, face: DieFace) -> u32 {
        let value = if self.values.is_empty() {
            1
        } else {
            self.values[self.cursor % self.values.len()]
        };
        self.cursor += 1;
        value.clamp(1, face.sides())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn pcg_roller_is_deterministic() {
        let mut a = PcgRoller::new(42);
        let mut b = PcgRoller::new(42);
        let first: Vec<u32> = (0..32).map(|_| a.roll(DieFace::D20)).collect();
        let second: Vec<u32> = (0..32).map(|_| b.roll(DieFace::D20)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn pcg_roller_stays_in_range_and_covers_faces() {
        let mut roller = PcgRoller::new(1);
        let mut seen = [false; 4];
        for _ in 0..500 {
            let roll = roller.roll(DieFace::D4);
            assert!((1..=4).contains(&roll));
            seen[(roll - 1) as usize] = true;
        }
        assert!(seen.iter().all(|hit| *hit));
    }

    #[test]
    fn rand_roller_stays_in_range() {
        let mut roller = RandRoller::new(StdRng::seed_from_u64(9));
        for face in DieFace::MOLD {
            for _ in 0..100 {
                assert!((1..=face.sides()).contains(&roller.roll(face)));
            }
        }
    }

    #[test]
    fn fixed_roller_cycles_and_clamps() {
        let mut roller = FixedRoller::new([5, 20]);
        assert_eq!(roller.roll(DieFace::D8), 5);
        assert_eq!(roller.roll(DieFace::D8), 8);
        assert_eq!(roller.roll(DieFace::D20), 5);
        assert_eq!(roller.draws(), 3);
    }
}

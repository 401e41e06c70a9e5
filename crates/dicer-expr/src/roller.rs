//! Sources of die faces.
//!
//! Everything that rolls goes through [`Roller`], so callers can swap the
//! OS-seeded [`RandRoller`] for a seeded one or for a scripted
//! [`SequenceRoller`] when replaying a roll.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces uniformly distributed die faces.
pub trait Roller: Send + Sync {
    /// Roll one die with `faces` sides, returning a value in `1..=faces`.
    ///
    /// `faces` is always at least 1.
    fn roll(&mut self, faces: u32) -> u32;

    /// Roll `count` dice with `faces` sides each.
    fn roll_many(&mut self, count: u32, faces: u32) -> Vec<u32> {
        (0..count).map(|_| self.roll(faces)).collect()
    }
}

/// A roller backed by a standard RNG.
#[derive(Debug, Clone)]
pub struct RandRoller {
    rng: StdRng,
}

impl RandRoller {
    /// Create a roller seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a reproducible roller from a seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when a seed is given, OS-seeded otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::seeded)
    }
}

impl Default for RandRoller {
    fn default() -> Self {
        Self::new()
    }
}

impl Roller for RandRoller {
    fn roll(&mut self, faces: u32) -> u32 {
        self.rng.random_range(1..=faces.max(1))
    }
}

/// A roller that replays a fixed list of faces, cycling when exhausted.
///
/// Each value is clamped into `1..=faces` of the die being rolled, so a
/// sequence of `[8]` yields 8 on a d10 and 6 on a d6.
#[derive(Debug, Clone)]
pub struct SequenceRoller {
    values: Vec<u32>,
    cursor: usize,
}

impl SequenceRoller {
    /// Replay `values` in order. An empty list always rolls 1.
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// Always roll the same face.
    pub fn constant(value: u32) -> Self {
        Self::new(vec![value])
    }

    /// How many faces have been handed out so far.
    pub fn rolls(&self) -> usize {
        self.cursor
    }
}

impl Roller for SequenceRoller {
    fn roll(&mut self, faces: u32) -> u32 {
        let value = if self.values.is_empty() {
            1
        } else {
            self.values[self.cursor % self.values.len()]
        };
        self.cursor += 1;
        value.clamp(1, faces.max(1))
    }
}

use std::collections::VecDeque;

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom as _,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{TetrominoData, TetrominoKind};

/// Supplies the shape data for each newly spawned piece.
///
/// The randomization policy is not part of the engine; the game loop pulls
/// the next shape through this seam whenever it needs to spawn. The default
/// implementation is [`BagSpawner`]; tests substitute scripted sources.
pub trait PieceSource {
    /// Returns the shape the next spawned piece should take.
    fn next_piece(&mut self) -> TetrominoData;
}

/// Seed for deterministic piece generation.
///
/// Serialized as a 16-character hex string. The same seed yields the same
/// piece sequence, which makes sessions reproducible for debugging and
/// testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnSeed(u64);

impl SpawnSeed {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl Serialize for SpawnSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:016x}", self.0))
    }
}

impl<'de> Deserialize<'de> for SpawnSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        if hex.len() != 16 {
            return Err(serde::de::Error::custom(format!(
                "invalid seed: expected 16 hex characters, got {}",
                hex.len()
            )));
        }
        let value = u64::from_str_radix(&hex, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid seed: {hex} ({e})")))?;
        Ok(Self(value))
    }
}

impl Distribution<SpawnSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SpawnSeed {
        SpawnSeed(rng.random())
    }
}

/// 7-bag piece spawner.
///
/// Draws come from a bag holding one of each of the seven kinds, shuffled;
/// a new shuffled bag is opened when the previous one runs out. Every
/// window of seven consecutive draws therefore contains every kind exactly
/// once, which bounds droughts while staying random.
#[derive(Debug, Clone)]
pub struct BagSpawner {
    rng: Pcg32,
    bag: VecDeque<TetrominoKind>,
}

impl Default for BagSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl BagSpawner {
    /// Creates a spawner with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Creates a spawner with a fixed seed for a reproducible sequence.
    #[must_use]
    pub fn with_seed(seed: SpawnSeed) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed.value()),
            bag: VecDeque::with_capacity(TetrominoKind::LEN),
        }
    }

    fn pop_next(&mut self) -> TetrominoKind {
        if self.bag.is_empty() {
            let mut refill = TetrominoKind::ALL;
            refill.shuffle(&mut self.rng);
            self.bag.extend(refill);
        }
        self.bag.pop_front().expect("bag refilled above")
    }
}

impl PieceSource for BagSpawner {
    fn next_piece(&mut self) -> TetrominoData {
        self.pop_next().data()
    }
}

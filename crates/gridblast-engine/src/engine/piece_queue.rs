use std::{fmt, str::FromStr};

use arrayvec::ArrayVec;
use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::piece::{BlockColor, Piece, PieceId, PowerKind, ShapeId};

/// Number of pieces offered at a time.
pub const QUEUE_SIZE: usize = 3;

/// Probability that a generated piece carries a power.
///
/// The kind is then drawn uniformly among the four power kinds, so each
/// specific kind appears with probability 0.0375.
pub const POWER_PROBABILITY: f64 = 0.15;

/// Seed for deterministic piece generation.
///
/// A 128-bit seed initializing the generator's random number generator. The
/// same seed produces the same sequence of pieces and powers, enabling
/// reproducible games and deterministic tests.
///
/// Serializes as a 32-character hex string and parses from the same format.
///
/// # Example
///
/// ```
/// use gridblast_engine::{GameSession, GeneratorSeed};
/// use rand::Rng as _;
///
/// let seed: GeneratorSeed = rand::rng().random();
/// let a = GameSession::with_seed(seed);
/// let b = GameSession::with_seed(seed);
/// // Both sessions are offered the same pieces.
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorSeed([u8; 16]);

impl fmt::Display for GeneratorSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

/// Error produced when parsing a [`GeneratorSeed`] from a hex string.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid seed: expected 32 hex characters, got {input:?}")]
pub struct ParseSeedError {
    input: String,
}

impl FromStr for GeneratorSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(ParseSeedError { input: s.into() });
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| ParseSeedError { input: s.into() })?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for GeneratorSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GeneratorSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random seeds with `rng.random()`.
impl Distribution<GeneratorSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> GeneratorSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        GeneratorSeed(seed)
    }
}

/// Random source for pieces, colors, and powers.
///
/// Each draw selects a footprint uniformly over the 17-entry catalog and a
/// base color uniformly over the 8 base colors; independently, with
/// [`POWER_PROBABILITY`], the piece is tagged with a uniformly chosen power
/// and its display color is overridden to [`BlockColor::Power`].
///
/// The generator is pure with respect to game state: it touches nothing but
/// its own random stream and id counter.
#[derive(Debug, Clone)]
pub struct PieceGenerator {
    rng: Pcg32,
    next_id: u64,
}

impl Default for PieceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceGenerator {
    /// Creates a generator with a random seed drawn from the OS source.
    ///
    /// For deterministic generation, use [`Self::with_seed`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed.
    #[must_use]
    pub fn with_seed(seed: GeneratorSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
            next_id: 0,
        }
    }

    /// Draws one piece.
    ///
    /// Draw order is fixed (shape, base color, power roll, power kind) so a
    /// seed always reproduces the same sequence.
    pub fn pick_piece(&mut self) -> Piece {
        let shape: ShapeId = self.rng.random();
        let base_color: BlockColor = self.rng.random();
        let power: Option<PowerKind> = self
            .rng
            .random_bool(POWER_PROBABILITY)
            .then(|| self.rng.random());
        let color = if power.is_some() {
            BlockColor::Power
        } else {
            base_color
        };
        let id = PieceId(self.next_id);
        self.next_id += 1;
        Piece::new(id, shape, color, power)
    }
}

/// The ordered set of pieces currently offered to the player.
///
/// Holds exactly [`QUEUE_SIZE`] pieces, or transiently fewer as pieces are
/// consumed; it refills back to full only from empty, never partially.
#[derive(Debug, Clone, Default)]
pub struct PieceQueue {
    pieces: ArrayVec<Piece, QUEUE_SIZE>,
}

impl PieceQueue {
    /// Creates a full queue by drawing [`QUEUE_SIZE`] pieces.
    #[must_use]
    pub fn generate(generator: &mut PieceGenerator) -> Self {
        let mut queue = Self {
            pieces: ArrayVec::new(),
        };
        queue.refill(generator);
        queue
    }

    /// Refills the queue to [`QUEUE_SIZE`] pieces.
    ///
    /// No-op unless the queue is empty: partial refills are not allowed.
    pub fn refill(&mut self, generator: &mut PieceGenerator) {
        if !self.pieces.is_empty() {
            return;
        }
        for _ in 0..QUEUE_SIZE {
            self.pieces.push(generator.pick_piece());
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Looks up a queued piece by id.
    #[must_use]
    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|piece| piece.id() == id)
    }

    /// Removes and returns the piece with the given id.
    pub fn take(&mut self, id: PieceId) -> Option<Piece> {
        let index = self.pieces.iter().position(|piece| piece.id() == id)?;
        Some(self.pieces.remove(index))
    }

    /// Iterates over the offered pieces in order.
    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter()
    }

    /// Builds a queue from handcrafted pieces, for deterministic tests.
    #[cfg(test)]
    pub(crate) fn from_pieces(pieces: ArrayVec<Piece, QUEUE_SIZE>) -> Self {
        Self { pieces }
    }
}

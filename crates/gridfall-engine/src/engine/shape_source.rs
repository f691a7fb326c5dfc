use std::fmt;

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ShapeKind;

/// Supplier of the upcoming shape sequence.
///
/// The board pulls one shape per spawn. Implementations decide the
/// randomization policy; the engine ships [`UniformSource`], and tests inject
/// fixed sequences for deterministic scenarios.
pub trait ShapeSource: fmt::Debug {
    fn next_shape(&mut self) -> ShapeKind;
}

/// Seed for deterministic shape generation.
///
/// A 128-bit value feeding the PCG generator. The same seed reproduces the
/// same shape sequence, which enables replayable sessions and deterministic
/// tests. Serializes as a 32-character hex string.
///
/// # Example
///
/// ```
/// use gridfall_engine::{GeneratorSeed, ShapeSource as _, UniformSource};
/// use rand::Rng as _;
///
/// let seed: GeneratorSeed = rand::rng().random();
/// let mut a = UniformSource::new(seed);
/// let mut b = UniformSource::new(seed);
/// assert_eq!(a.next_shape(), b.next_shape());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorSeed(u128);

impl GeneratorSeed {
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(value)
    }
}

/// Allows drawing a fresh random seed with `rng.random()`.
impl Distribution<GeneratorSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> GeneratorSeed {
        GeneratorSeed(rng.random())
    }
}

impl Serialize for GeneratorSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:032x}", self.0))
    }
}

impl<'de> Deserialize<'de> for GeneratorSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            )));
        }
        let value = u128::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {hex_str} ({e})")))?;
        Ok(Self(value))
    }
}

/// Shape source drawing each shape independently and uniformly.
///
/// Every call is an independent uniform pick over the seven kinds; there is
/// no bag and no anti-repetition guarantee, so the same kind can appear twice
/// in a row. Sequences are fully determined by the seed.
#[derive(Debug, Clone)]
pub struct UniformSource {
    rng: Pcg32,
}

impl UniformSource {
    /// Creates a source producing the sequence determined by `seed`.
    #[must_use]
    pub fn new(seed: GeneratorSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0.to_be_bytes()),
        }
    }

    /// Creates a source with a seed drawn from the OS random source.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::rng().random())
    }
}

impl ShapeSource for UniformSource {
    fn next_shape(&mut self) -> ShapeKind {
        self.rng.random()
    }
}

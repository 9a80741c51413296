use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ShapeKind;

/// Supplies the kind of every piece the game spawns.
///
/// The game draws one kind per spawn and never looks ahead, so any sequence
/// generator can be plugged in. [`UniformSource`] is the one used in play;
/// [`SequenceSource`] replays a fixed list.
pub trait ShapeSource {
    fn next_shape(&mut self) -> ShapeKind;
}

/// Draws each kind uniformly and independently.
///
/// There is no bag and no repeat protection, so droughts and streaks of one
/// kind are possible.
///
/// # Example
///
/// ```
/// use postris_engine::{ShapeSeed, ShapeSource as _, UniformSource};
/// use rand::Rng as _;
///
/// let seed: ShapeSeed = rand::rng().random();
/// let mut a = UniformSource::with_seed(seed);
/// let mut b = UniformSource::with_seed(seed);
/// for _ in 0..20 {
///     assert_eq!(a.next_shape(), b.next_shape());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct UniformSource {
    rng: Pcg32,
}

impl Default for UniformSource {
    fn default() -> Self {
        Self::new()
    }
}

impl UniformSource {
    /// Creates a source with a random seed.
    ///
    /// For deterministic sequences, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: ShapeSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
        }
    }
}

impl ShapeSource for UniformSource {
    fn next_shape(&mut self) -> ShapeKind {
        self.rng.random()
    }
}

/// Replays a fixed list of kinds, starting over when it runs out.
///
/// ```
/// use postris_engine::{SequenceSource, ShapeKind, ShapeSource as _};
///
/// let mut source = SequenceSource::new([ShapeKind::I, ShapeKind::T]);
/// assert_eq!(source.next_shape(), ShapeKind::I);
/// assert_eq!(source.next_shape(), ShapeKind::T);
/// assert_eq!(source.next_shape(), ShapeKind::I);
/// ```
#[derive(Debug, Clone)]
pub struct SequenceSource {
    shapes: Vec<ShapeKind>,
    next: usize,
}

impl SequenceSource {
    /// # Panics
    ///
    /// Panics if `shapes` is empty.
    #[must_use]
    pub fn new(shapes: impl IntoIterator<Item = ShapeKind>) -> Self {
        let shapes: Vec<_> = shapes.into_iter().collect();
        assert!(!shapes.is_empty(), "shape sequence must not be empty");
        Self { shapes, next: 0 }
    }
}

impl ShapeSource for SequenceSource {
    fn next_shape(&mut self) -> ShapeKind {
        let shape = self.shapes[self.next];
        self.next = (self.next + 1) % self.shapes.len();
        shape
    }
}

/// Seed for deterministic shape generation.
///
/// A 128-bit seed for the generator behind [`UniformSource`]. Two games
/// created with the same seed (and fed the same actions) play out
/// identically. Serialized and parsed as 32 hex characters.
///
/// # Example
///
/// ```
/// use postris_engine::ShapeSeed;
///
/// let seed: ShapeSeed = "0123456789abcdeffedcba9876543210".parse().unwrap();
/// assert_eq!(seed.to_string(), "0123456789abcdeffedcba9876543210");
/// assert!("xyz".parse::<ShapeSeed>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeSeed([u8; 16]);

impl ShapeSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }
}

/// Error returned when a [`ShapeSeed`] cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed '{input}': {reason}")]
pub struct ParseShapeSeedError {
    input: String,
    reason: String,
}

impl fmt::Display for ShapeSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for ShapeSeed {
    type Err = ParseShapeSeedError;

    fn from_str(hex_str: &str) -> Result<Self, Self::Err> {
        let error = |reason: String| ParseShapeSeedError {
            input: hex_str.to_owned(),
            reason,
        };
        if hex_str.len() != 32 {
            return Err(error(format!(
                "expected 32 characters, got {}",
                hex_str.len()
            )));
        }
        if let Some(c) = hex_str.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(error(format!("invalid hex digit {c:?}")));
        }
        let num = u128::from_str_radix(hex_str, 16).map_err(|e| error(e.to_string()))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for ShapeSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ShapeSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `ShapeSeed` values using the standard random distribution.
impl Distribution<ShapeSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ShapeSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        ShapeSeed(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod shape_seed_serialization {
        use super::*;

        #[test]
        fn test_roundtrip_random_seed() {
            let seed: ShapeSeed = rand::rng().random();
            let serialized = serde_json::to_string(&seed).unwrap();
            let deserialized: ShapeSeed = serde_json::from_str(&serialized).unwrap();
            assert_eq!(seed, deserialized);
        }

        #[test]
        fn test_known_value_sequential_bytes() {
            // Big-endian: bytes appear in order as hex pairs
            let seed = ShapeSeed::from_bytes([
                0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
                0x32, 0x10,
            ]);
            let serialized = serde_json::to_string(&seed).unwrap();
            assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");
        }

        #[test]
        fn test_known_value_all_zeros() {
            let seed = ShapeSeed::from_bytes([0; 16]);
            assert_eq!(seed.to_string(), "0".repeat(32));
        }

        #[test]
        fn test_deserialize_uppercase_hex() {
            let json = "\"0123456789ABCDEFFEDCBA9876543210\"";
            let deserialized: ShapeSeed = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized.to_string(), "0123456789abcdeffedcba9876543210");
        }

        #[test]
        fn test_sign_is_not_a_hex_digit() {
            let err = "+0123456789abcdef0123456789abcde"
                .parse::<ShapeSeed>()
                .unwrap_err();
            assert_eq!(err.reason, "invalid hex digit '+'");
        }

        #[test]
        fn test_error_cases() {
            for json in [
                "\"ghijklmnopqrstuvwxyzghijklmnopqr\"",
                "\"0123456789abcdef0123456789abcde\"",
                "\"0123456789abcdef0123456789abcdef0\"",
                "\"\"",
            ] {
                let err = serde_json::from_str::<ShapeSeed>(json).unwrap_err();
                assert!(err.to_string().contains("invalid hex seed"), "{err}");
            }
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let seed = ShapeSeed::from_bytes([0x5a; 16]);
        let mut a = UniformSource::with_seed(seed);
        let mut b = UniformSource::with_seed(seed);
        let a: Vec<_> = (0..50).map(|_| a.next_shape()).collect();
        let b: Vec<_> = (0..50).map(|_| b.next_shape()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sequence_source_cycles() {
        let mut source = SequenceSource::new([ShapeKind::O, ShapeKind::S, ShapeKind::Z]);
        let drawn: Vec<_> = (0..7).map(|_| source.next_shape()).collect();
        assert_eq!(
            drawn,
            [
                ShapeKind::O,
                ShapeKind::S,
                ShapeKind::Z,
                ShapeKind::O,
                ShapeKind::S,
                ShapeKind::Z,
                ShapeKind::O,
            ]
        );
    }

    #[test]
    #[should_panic(expected = "must not be empty")]
    fn test_sequence_source_rejects_empty() {
        let _ = SequenceSource::new([]);
    }
}

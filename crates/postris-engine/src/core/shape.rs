use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::coord::Coord;

/// Block offsets of one rotation state, relative to the piece position.
pub type ShapeBlocks = [Coord; 4];

/// The seven tetromino kinds.
///
/// Each kind owns four precomputed rotation states of exactly four offsets.
/// The offsets live in one static table shared by every piece in the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum ShapeKind {
    /// O-piece.
    O = 0,
    /// I-piece.
    I = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// L-piece.
    L = 4,
    /// J-piece.
    J = 5,
    /// T-piece.
    T = 6,
}

impl Distribution<ShapeKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ShapeKind {
        ShapeKind::ALL[rng.random_range(0..ShapeKind::LEN)]
    }
}

impl ShapeKind {
    /// Number of shape kinds (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        ShapeKind::O,
        ShapeKind::I,
        ShapeKind::S,
        ShapeKind::Z,
        ShapeKind::L,
        ShapeKind::J,
        ShapeKind::T,
    ];

    /// Returns the block offsets of this kind in the given rotation state.
    ///
    /// `rotation` is taken modulo 4.
    ///
    /// # Examples
    ///
    /// ```
    /// use postris_engine::{Coord, ShapeKind};
    ///
    /// let blocks = ShapeKind::I.blocks(1);
    /// assert_eq!(blocks.len(), 4);
    /// assert!(blocks.contains(&Coord::new(0, 2)));
    /// ```
    #[must_use]
    pub fn blocks(self, rotation: u8) -> &'static ShapeBlocks {
        &SHAPE_TABLE[self as usize][(rotation % 4) as usize]
    }

    /// Returns the single character representation of this kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use postris_engine::ShapeKind;
    ///
    /// assert_eq!(ShapeKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            ShapeKind::O => 'O',
            ShapeKind::I => 'I',
            ShapeKind::S => 'S',
            ShapeKind::Z => 'Z',
            ShapeKind::L => 'L',
            ShapeKind::J => 'J',
            ShapeKind::T => 'T',
        }
    }

    /// Parses a kind from its single character representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use postris_engine::ShapeKind;
    ///
    /// assert_eq!(ShapeKind::from_char('S'), Some(ShapeKind::S));
    /// assert_eq!(ShapeKind::from_char('x'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'O' => Some(ShapeKind::O),
            'I' => Some(ShapeKind::I),
            'S' => Some(ShapeKind::S),
            'Z' => Some(ShapeKind::Z),
            'L' => Some(ShapeKind::L),
            'J' => Some(ShapeKind::J),
            'T' => Some(ShapeKind::T),
            _ => None,
        }
    }

    /// Bounding box `(min, max)` of the offsets in the given rotation.
    ///
    /// Renderers use it to center preview and hold panels.
    #[must_use]
    pub fn bounds(self, rotation: u8) -> (Coord, Coord) {
        let blocks = self.blocks(rotation);
        let mut min = blocks[0];
        let mut max = blocks[0];
        for block in &blocks[1..] {
            min = Coord::new(min.x.min(block.x), min.y.min(block.y));
            max = Coord::new(max.x.max(block.x), max.y.max(block.y));
        }
        (min, max)
    }
}

const fn c(x: i32, y: i32) -> Coord {
    Coord::new(x, y)
}

static SHAPE_TABLE: [[ShapeBlocks; 4]; ShapeKind::LEN] = {
    const O: ShapeBlocks = [c(0, -1), c(0, 0), c(1, -1), c(1, 0)];
    const I_H: ShapeBlocks = [c(-1, 0), c(0, 0), c(1, 0), c(2, 0)];
    const I_V: ShapeBlocks = [c(0, -1), c(0, 0), c(0, 1), c(0, 2)];
    const S_H: ShapeBlocks = [c(-1, -1), c(0, -1), c(0, 0), c(1, 0)];
    const S_V: ShapeBlocks = [c(-1, 0), c(-1, 1), c(0, -1), c(0, 0)];
    const Z_H: ShapeBlocks = [c(-1, 0), c(0, -1), c(0, 0), c(1, -1)];
    const Z_V: ShapeBlocks = [c(-1, -1), c(-1, 0), c(0, 0), c(0, 1)];
    [
        // O-piece
        [O, O, O, O],
        // I-piece
        [I_H, I_V, I_H, I_V],
        // S-piece
        [S_H, S_V, S_H, S_V],
        // Z-piece
        [Z_H, Z_V, Z_H, Z_V],
        // L-piece
        [
            [c(-1, -1), c(-1, 0), c(0, 0), c(1, 0)],
            [c(-1, 1), c(0, -1), c(0, 0), c(0, 1)],
            [c(-1, 0), c(0, 0), c(1, 0), c(1, 1)],
            [c(0, -1), c(0, 0), c(0, 1), c(1, -1)],
        ],
        // J-piece
        [
            [c(-1, 0), c(0, 0), c(1, -1), c(1, 0)],
            [c(-1, -1), c(0, -1), c(0, 0), c(0, 1)],
            [c(-1, 0), c(-1, 1), c(0, 0), c(1, 0)],
            [c(0, -1), c(0, 0), c(0, 1), c(1, 1)],
        ],
        // T-piece
        [
            [c(-1, 0), c(0, -1), c(0, 0), c(1, 0)],
            [c(-1, 0), c(0, -1), c(0, 0), c(0, 1)],
            [c(-1, 0), c(0, 0), c(0, 1), c(1, 0)],
            [c(0, -1), c(0, 0), c(0, 1), c(1, 0)],
        ],
    ]
};

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_every_rotation_has_four_distinct_blocks() {
        for kind in ShapeKind::ALL {
            for rotation in 0..4 {
                let blocks = kind.blocks(rotation);
                let distinct: HashSet<_> = blocks.iter().copied().collect();
                assert_eq!(distinct.len(), 4, "{kind:?} rotation {rotation}");
            }
        }
    }

    #[test]
    fn test_every_rotation_contains_pivot() {
        for kind in ShapeKind::ALL {
            for rotation in 0..4 {
                assert!(kind.blocks(rotation).contains(&Coord::ZERO));
            }
        }
    }

    #[test]
    fn test_rotation_index_wraps() {
        assert_eq!(ShapeKind::T.blocks(5), ShapeKind::T.blocks(1));
    }

    #[test]
    fn test_o_piece_is_rotation_invariant() {
        let spawn = ShapeKind::O.blocks(0);
        for rotation in 1..4 {
            assert_eq!(ShapeKind::O.blocks(rotation), spawn);
        }
    }

    #[test]
    fn test_bounds() {
        assert_eq!(
            ShapeKind::I.bounds(0),
            (Coord::new(-1, 0), Coord::new(2, 0))
        );
        assert_eq!(
            ShapeKind::O.bounds(0),
            (Coord::new(0, -1), Coord::new(1, 0))
        );
    }

    #[test]
    fn test_char_conversion_roundtrip() {
        for kind in ShapeKind::ALL {
            assert_eq!(ShapeKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(ShapeKind::from_char('.'), None);
    }

    #[test]
    fn test_uniform_sampling_covers_all_kinds() {
        let mut rng = Pcg32::seed_from_u64(7);
        let seen: HashSet<ShapeKind> = (0..500).map(|_| rng.random()).collect();
        assert_eq!(seen.len(), ShapeKind::LEN);
    }
}

use serde::{Deserialize, Serialize};

/// Integer 2D position or offset on the matrix.
///
/// `x` grows to the right and `y` grows upward, so gravity decreases `y`.
/// Coordinates are plain values: adding or subtracting produces a new one.
///
/// # Example
///
/// ```
/// use postris_engine::Coord;
///
/// let spawn = Coord::new(4, 19);
/// assert_eq!(spawn + Coord::new(1, -1), Coord::new(5, 18));
/// assert_eq!(spawn - Coord::from_y(3), Coord::new(4, 16));
/// ```
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::Sub,
    derive_more::Display,
)]
#[display("({x}, {y})")]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const ZERO: Self = Self::new(0, 0);

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn from_x(x: i32) -> Self {
        Self::new(x, 0)
    }

    #[must_use]
    pub const fn from_y(y: i32) -> Self {
        Self::new(0, y)
    }

    /// `const` counterpart of `+`.
    #[must_use]
    pub const fn offset(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

use serde::{Deserialize, Serialize};

use super::{
    coord::Coord,
    shape::{ShapeBlocks, ShapeKind},
};

/// Horizontal move direction. The discriminant is the x delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(i8)]
pub enum Direction {
    Left = -1,
    Right = 1,
}

impl Direction {
    #[must_use]
    pub const fn delta(self) -> i32 {
        self as i32
    }
}

/// Rotation direction. The discriminant is the rotation index delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(i8)]
pub enum Rotation {
    CounterClockwise = -1,
    Clockwise = 1,
}

impl Rotation {
    #[must_use]
    pub const fn delta(self) -> i32 {
        self as i32
    }
}

/// A tetromino at a position on the matrix, in one of four rotation states.
///
/// Pieces are immutable values: moving, rotating and falling return a new
/// `Piece`. None of these consult the matrix; whether the result is legal is
/// decided afterwards with [`Matrix::is_collision`](super::matrix::Matrix::is_collision).
///
/// # Example
///
/// ```
/// use postris_engine::{Coord, Direction, Piece, Rotation, ShapeKind};
///
/// let piece = Piece::new(ShapeKind::T, Coord::new(4, 19));
/// let moved = piece.moved(Direction::Left).rotated(Rotation::Clockwise);
/// assert_eq!(moved.position(), Coord::new(3, 19));
/// assert_eq!(moved.rotation(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: ShapeKind,
    position: Coord,
    rotation: u8,
}

impl Serialize for Piece {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "kind#rotation@x,y" (e.g., "T#1@4,19")
        let s = format!(
            "{}#{}@{},{}",
            self.kind.as_char(),
            self.rotation,
            self.position.x,
            self.position.y
        );
        serializer.serialize_str(&s)
    }
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as _;

        let s = String::deserialize(deserializer)?;

        let (kind_str, rest) = s
            .split_once('#')
            .ok_or_else(|| D::Error::custom(format!("missing '#' in piece '{s}'")))?;
        let (rotation_str, position_str) = rest
            .split_once('@')
            .ok_or_else(|| D::Error::custom(format!("missing '@' in piece '{s}'")))?;
        let (x_str, y_str) = position_str
            .split_once(',')
            .ok_or_else(|| D::Error::custom(format!("missing ',' in piece '{s}'")))?;

        let mut chars = kind_str.chars();
        let kind = match (chars.next(), chars.next()) {
            (Some(c), None) => ShapeKind::from_char(c),
            _ => None,
        }
        .ok_or_else(|| D::Error::custom(format!("invalid shape kind: '{kind_str}'")))?;

        let rotation = rotation_str
            .parse::<u8>()
            .map_err(|e| D::Error::custom(format!("invalid rotation: {rotation_str} ({e})")))?;
        if rotation > 3 {
            return Err(D::Error::custom(format!(
                "rotation must be 0-3, got {rotation}"
            )));
        }

        let x = x_str
            .parse::<i32>()
            .map_err(|e| D::Error::custom(format!("invalid x position: {x_str} ({e})")))?;
        let y = y_str
            .parse::<i32>()
            .map_err(|e| D::Error::custom(format!("invalid y position: {y_str} ({e})")))?;

        Ok(Piece {
            kind,
            position: Coord::new(x, y),
            rotation,
        })
    }
}

impl Piece {
    /// Creates a piece in its spawn rotation.
    #[must_use]
    pub const fn new(kind: ShapeKind, position: Coord) -> Self {
        Self {
            kind,
            position,
            rotation: 0,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[must_use]
    pub const fn position(&self) -> Coord {
        self.position
    }

    /// Rotation index in `0..=3`.
    #[must_use]
    pub const fn rotation(&self) -> u8 {
        self.rotation
    }

    #[must_use]
    pub fn offsets(&self) -> &'static ShapeBlocks {
        self.kind.blocks(self.rotation)
    }

    /// Absolute cells occupied by this piece.
    #[must_use]
    pub fn blocks(&self) -> [Coord; 4] {
        self.offsets().map(|offset| offset + self.position)
    }

    #[must_use]
    pub fn moved(&self, direction: Direction) -> Self {
        Self {
            position: self.position + Coord::from_x(direction.delta()),
            ..*self
        }
    }

    /// Moves the piece `distance` rows down.
    #[must_use]
    pub fn fallen(&self, distance: i32) -> Self {
        Self {
            position: self.position - Coord::from_y(distance),
            ..*self
        }
    }

    /// Rotates in place. There is no kick: the position never changes.
    #[must_use]
    pub fn rotated(&self, rotation: Rotation) -> Self {
        let rotation = (i32::from(self.rotation) + rotation.delta()).rem_euclid(4);
        Self {
            rotation: u8::try_from(rotation).unwrap_or_default(),
            ..*self
        }
    }
}

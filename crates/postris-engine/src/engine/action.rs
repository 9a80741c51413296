use serde::{Deserialize, Serialize};

use crate::core::{Direction, Piece, Rotation};

/// A player-visible action, or the gravity tick.
///
/// Drivers translate each input event into one `Action` and send
/// [`Action::Elapsed`] once per gravity interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Move(Direction),
    Rotate(Rotation),
    /// Soft drop: one row down, never locks.
    Fall,
    /// Hard drop: straight to the shadow position, then lock.
    Drop,
    Hold,
    /// Gravity tick: lock if landed, otherwise fall one row.
    Elapsed,
}

/// What an operation on the game state did.
///
/// `before` and `after` are set when the current piece was moved to a new
/// position. `locked` is set when a piece was written into the matrix, in
/// which case `lines` lists the rows it cleared (original indices, bottom
/// first).
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub locked: bool,
    pub lines: Vec<usize>,
    pub before: Option<Piece>,
    pub after: Option<Piece>,
}

impl ActionResult {
    /// Nothing happened.
    #[must_use]
    pub fn rejected() -> Self {
        Self::default()
    }

    /// The operation succeeded without touching the piece position or the matrix.
    #[must_use]
    pub fn accepted() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn transformed(before: Piece, after: Piece) -> Self {
        Self {
            success: true,
            before: Some(before),
            after: Some(after),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn locked(lines: Vec<usize>) -> Self {
        Self {
            success: true,
            locked: true,
            lines,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_transformed(&self) -> bool {
        self.before.is_some()
    }

    /// Combines the results of two operations performed back to back.
    ///
    /// The combined result succeeds if either half did. Lock information
    /// comes from the half that locked, and the transformation from the half
    /// that moved the piece (`second` if both did).
    ///
    /// ```
    /// use postris_engine::{ActionResult, Coord, Piece, ShapeKind};
    ///
    /// let before = Piece::new(ShapeKind::T, Coord::new(4, 19));
    /// let after = before.fallen(19);
    /// let merged = ActionResult::transformed(before, after).merge(ActionResult::locked(vec![0]));
    /// assert!(merged.success && merged.locked);
    /// assert_eq!(merged.lines, [0]);
    /// assert_eq!(merged.after, Some(after));
    /// ```
    #[must_use]
    pub fn merge(self, second: Self) -> Self {
        let Self {
            success,
            locked: second_locked,
            lines: second_lines,
            before: second_before,
            after: second_after,
        } = second;
        let (locked, lines) = if second_locked {
            (true, second_lines)
        } else {
            (self.locked, self.lines)
        };
        let (before, after) = if second_before.is_some() {
            (second_before, second_after)
        } else {
            (self.before, self.after)
        };
        Self {
            success: self.success || success,
            locked,
            lines,
            before,
            after,
        }
    }
}

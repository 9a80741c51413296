//! Pure scoring, leveling and gravity formulas.

use std::time::Duration;

/// Highest level reachable by clearing lines.
pub const MAX_LEVEL: usize = 15;

/// Lines needed to advance one level.
pub const LINES_PER_LEVEL: usize = 10;

/// Base points for clearing 0 to 4 lines at once.
///
/// Single, double, triple and tetris rewards, multiplied by the level.
const SCORE_TABLE: [usize; 5] = [0, 100, 300, 500, 800];

/// Points for clearing `lines` rows with one piece at `level`.
///
/// A single piece cannot clear more than four rows; larger counts are scored
/// as a tetris. Saturates instead of overflowing on huge levels.
///
/// # Example
///
/// ```
/// use postris_engine::formulas;
///
/// assert_eq!(formulas::score(3, 4), 2400);
/// assert_eq!(formulas::score(7, 0), 0);
/// ```
#[must_use]
pub fn score(level: usize, lines: usize) -> usize {
    SCORE_TABLE[lines.min(SCORE_TABLE.len() - 1)].saturating_mul(level)
}

/// Level after `total_lines` lines when the game started at `start_level`.
///
/// # Example
///
/// ```
/// use postris_engine::formulas;
///
/// assert_eq!(formulas::level(1, 9), 1);
/// assert_eq!(formulas::level(1, 10), 2);
/// assert_eq!(formulas::level(5, 123), 15);
/// ```
#[must_use]
pub fn level(start_level: usize, total_lines: usize) -> usize {
    usize::min(
        start_level.saturating_add(total_lines / LINES_PER_LEVEL),
        MAX_LEVEL,
    )
}

/// Time between two gravity ticks at `level`.
///
/// `1000ms * (0.8 - (level - 1) * 0.007) ^ (level - 1)`, a curve that starts
/// at one second on level 1 and accelerates with every level.
#[must_use]
pub fn gravity_interval(level: usize) -> Duration {
    let steps = i32::try_from(level.saturating_sub(1)).unwrap_or(i32::MAX);
    let base = 0.8 - f64::from(steps) * 0.007;
    let millis = 1000.0 * base.max(0.0).powi(steps);
    Duration::from_secs_f64(millis / 1000.0)
}

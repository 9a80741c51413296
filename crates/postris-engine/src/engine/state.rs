use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::{
    GameConfigError, GameOverError, InvalidStartLevelError,
    core::{Direction, Matrix, Piece, Rotation, ShapeKind},
};

use super::{
    action::{Action, ActionResult},
    config::GameConfig,
    formulas,
    shape_source::{ShapeSource, UniformSource},
};

/// A single game: the matrix, the piece under control and the running totals.
///
/// The state is either active or over. It is over as soon as the current
/// piece overlaps the stack, which can only happen right after a spawn. Every
/// mutating operation returns [`GameOverError`] once the game is over.
///
/// Operations that cannot be performed (moving into a wall, holding twice in a
/// row) are not errors: they return an [`ActionResult`] with `success` unset
/// and leave the state untouched.
///
/// # Example
///
/// ```
/// use postris_engine::{Direction, GameState, SequenceSource, ShapeKind};
///
/// let source = SequenceSource::new([ShapeKind::I, ShapeKind::O]);
/// let mut state = GameState::with_source(1, source).unwrap();
///
/// assert!(state.move_piece(Direction::Left).unwrap().success);
/// let result = state.drop().unwrap();
/// assert!(result.locked);
/// assert_eq!(state.count(), 1);
/// assert_eq!(state.current().kind(), ShapeKind::O);
/// ```
#[derive(Debug, Clone)]
pub struct GameState<S = UniformSource> {
    matrix: Matrix,
    current: Piece,
    preview: ShapeKind,
    held: Option<ShapeKind>,
    can_hold: bool,
    start_level: usize,
    level: usize,
    lines: usize,
    score: usize,
    time: Duration,
    count: usize,
    source: S,
}

impl GameState {
    /// Starts a game on a standard 10×20 matrix with random shapes.
    pub fn new(start_level: usize) -> Result<Self, InvalidStartLevelError> {
        Self::with_source(start_level, UniformSource::new())
    }

    /// Starts a game as described by `config`, seeding the shapes if it
    /// carries a seed.
    pub fn from_config(config: &GameConfig) -> Result<Self, GameConfigError> {
        Self::with_config(config, config.shape_source())
    }
}

impl<S> GameState<S>
where
    S: ShapeSource,
{
    pub fn with_source(start_level: usize, source: S) -> Result<Self, InvalidStartLevelError> {
        let matrix = Matrix::new(GameConfig::DEFAULT_WIDTH, GameConfig::DEFAULT_HEIGHT);
        Self::with_matrix(matrix, start_level, source)
    }

    pub fn with_config(config: &GameConfig, source: S) -> Result<Self, GameConfigError> {
        config
            .validate()
            .inspect_err(|error| warn!(%error, "rejected game config"))?;
        let matrix = Matrix::new(config.width, config.height);
        Ok(Self::with_matrix(matrix, config.start_level, source)?)
    }

    /// Starts a game on an existing matrix.
    ///
    /// The matrix may already contain blocks, which is mostly useful to set
    /// up positions in tests.
    pub fn with_matrix(
        matrix: Matrix,
        start_level: usize,
        mut source: S,
    ) -> Result<Self, InvalidStartLevelError> {
        if start_level == 0 {
            warn!(start_level, "rejected start level");
            return Err(InvalidStartLevelError { start_level });
        }
        let first = source.next_shape();
        let preview = source.next_shape();
        let current = Piece::new(first, matrix.origin());
        debug!(
            width = matrix.width(),
            height = matrix.height(),
            start_level,
            "game started"
        );
        Ok(Self {
            matrix,
            current,
            preview,
            held: None,
            can_hold: true,
            start_level,
            level: start_level,
            lines: 0,
            score: 0,
            time: Duration::ZERO,
            count: 0,
            source,
        })
    }

    /// Moves the current piece one column.
    pub fn move_piece(&mut self, direction: Direction) -> Result<ActionResult, GameOverError> {
        self.apply(self.current.moved(direction))
    }

    /// Rotates the current piece in place. There is no wall kick: if the
    /// rotated piece collides, the rotation is rejected.
    pub fn rotate(&mut self, rotation: Rotation) -> Result<ActionResult, GameOverError> {
        self.apply(self.current.rotated(rotation))
    }

    /// Soft drop: moves the current piece one row down. Never locks.
    pub fn fall(&mut self) -> Result<ActionResult, GameOverError> {
        self.apply(self.current.fallen(1))
    }

    /// Hard drop: moves the current piece to its shadow and locks it.
    pub fn drop(&mut self) -> Result<ActionResult, GameOverError> {
        let moved = self.apply(self.shadow())?;
        Ok(moved.merge(self.check()))
    }

    /// Gravity tick: locks the current piece if it has landed, then lets the
    /// (possibly new) current piece fall one row.
    ///
    /// If the lock spawns a piece into the stack, the fall is skipped and the
    /// lock is still reported. The next call then fails with
    /// [`GameOverError`].
    pub fn elapsed(&mut self) -> Result<ActionResult, GameOverError> {
        self.ensure_active()?;
        let locked = self.check();
        if self.is_game_over() {
            return Ok(locked);
        }
        let fallen = self.apply(self.current.fallen(1))?;
        Ok(locked.merge(fallen))
    }

    /// Swaps the current piece with the held one, or stores it and spawns the
    /// next piece if nothing is held yet.
    ///
    /// Only one hold is allowed between two locks. The swapped-in piece
    /// starts at the origin without a collision check.
    pub fn hold(&mut self) -> Result<ActionResult, GameOverError> {
        self.ensure_active()?;
        if !self.can_hold {
            return Ok(ActionResult::rejected());
        }
        let kind = self.current.kind();
        match self.held.replace(kind) {
            Some(held) => self.current = Piece::new(held, self.matrix.origin()),
            None => self.spawn(),
        }
        self.can_hold = false;
        trace!(held = ?kind, current = ?self.current.kind(), "hold");
        Ok(ActionResult::accepted())
    }

    pub fn perform(&mut self, action: Action) -> Result<ActionResult, GameOverError> {
        match action {
            Action::Move(direction) => self.move_piece(direction),
            Action::Rotate(rotation) => self.rotate(rotation),
            Action::Fall => self.fall(),
            Action::Drop => self.drop(),
            Action::Hold => self.hold(),
            Action::Elapsed => self.elapsed(),
        }
    }

    /// Consumes the state and returns the state after `action`.
    ///
    /// ```
    /// use postris_engine::{Action, GameState, Rotation, SequenceSource, ShapeKind};
    ///
    /// let state = GameState::with_source(1, SequenceSource::new([ShapeKind::T])).unwrap();
    /// let (state, result) = state.step(Action::Rotate(Rotation::Clockwise)).unwrap();
    /// assert!(result.success);
    /// assert_eq!(state.current().rotation(), 1);
    /// ```
    pub fn step(mut self, action: Action) -> Result<(Self, ActionResult), GameOverError> {
        let result = self.perform(action)?;
        Ok((self, result))
    }

    fn ensure_active(&self) -> Result<(), GameOverError> {
        if self.is_game_over() {
            warn!("action rejected: game is over");
            return Err(GameOverError);
        }
        Ok(())
    }

    fn apply(&mut self, transformed: Piece) -> Result<ActionResult, GameOverError> {
        self.ensure_active()?;
        if self.matrix.is_collision(&transformed) {
            return Ok(ActionResult::rejected());
        }
        let before = std::mem::replace(&mut self.current, transformed);
        Ok(ActionResult::transformed(before, transformed))
    }

    /// Locks the current piece if it has landed.
    pub(crate) fn check(&mut self) -> ActionResult {
        if !self.is_landed() {
            return ActionResult::rejected();
        }

        self.matrix.place(&self.current);
        let cleared = self.matrix.clear_lines();
        self.lines += cleared.len();
        self.score = self
            .score
            .saturating_add(formulas::score(self.level, cleared.len()));
        let level = formulas::level(self.start_level, self.lines);
        if level != self.level {
            info!(from = self.level, to = level, "level changed");
        }
        self.level = level;
        self.can_hold = true;
        self.count += 1;
        debug!(
            piece = ?self.current,
            lines = ?cleared,
            score = self.score,
            "piece locked"
        );

        self.spawn();
        if self.is_game_over() {
            info!(
                score = self.score,
                lines = self.lines,
                pieces = self.count,
                "game over"
            );
        }
        ActionResult::locked(cleared)
    }

    fn spawn(&mut self) {
        let kind = std::mem::replace(&mut self.preview, self.source.next_shape());
        self.current = Piece::new(kind, self.matrix.origin());
        trace!(?kind, preview = ?self.preview, "spawned");
    }
}

impl<S> GameState<S> {
    /// Adds play time measured by the driver.
    pub fn advance_time(&mut self, elapsed: Duration) {
        self.time += elapsed;
    }

    #[must_use]
    pub fn board(&self) -> &Matrix {
        &self.matrix
    }

    #[must_use]
    pub fn current(&self) -> Piece {
        self.current
    }

    #[must_use]
    pub fn preview(&self) -> ShapeKind {
        self.preview
    }

    #[must_use]
    pub fn held(&self) -> Option<ShapeKind> {
        self.held
    }

    #[must_use]
    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    #[must_use]
    pub fn start_level(&self) -> usize {
        self.start_level
    }

    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    #[must_use]
    pub fn lines(&self) -> usize {
        self.lines
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub fn time(&self) -> Duration {
        self.time
    }

    /// Number of pieces locked so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Rows the current piece can still fall. Negative once the game is over.
    #[must_use]
    pub fn fall_height(&self) -> i32 {
        self.current
            .blocks()
            .into_iter()
            .map(|block| self.matrix.fall_space(block))
            .fold(i32::MAX, i32::min)
    }

    #[must_use]
    pub fn is_landed(&self) -> bool {
        self.fall_height() <= 0
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.fall_height() < 0
    }

    /// Where the current piece would lock after a hard drop.
    #[must_use]
    pub fn shadow(&self) -> Piece {
        self.current.fallen(self.fall_height())
    }

    /// Time between two gravity ticks at the current level.
    #[must_use]
    pub fn gravity_interval(&self) -> Duration {
        formulas::gravity_interval(self.level)
    }
}

#[cfg(test)]
mod tests {
    use crate::{core::Coord, engine::SequenceSource};

    use super::*;

    fn sequence(kinds: &[ShapeKind]) -> SequenceSource {
        SequenceSource::new(kinds.iter().copied())
    }

    fn state_with(kinds: &[ShapeKind]) -> GameState<SequenceSource> {
        GameState::with_source(1, sequence(kinds)).unwrap()
    }

    /// Builds a 10×20 matrix from `(row, content)` pairs; other rows are empty.
    fn matrix_with_rows(rows: &[(usize, &str)]) -> Matrix {
        let art: Vec<String> = (0..20)
            .rev()
            .map(|y| {
                rows.iter()
                    .find(|(row, _)| *row == y)
                    .map_or_else(|| ".".repeat(10), |(_, content)| (*content).to_owned())
            })
            .collect();
        Matrix::from_ascii(&art.join("\n"))
    }

    fn assert_same_state(a: &GameState<SequenceSource>, b: &GameState<SequenceSource>) {
        assert_eq!(a.matrix, b.matrix);
        assert_eq!(a.current, b.current);
        assert_eq!(a.preview, b.preview);
        assert_eq!(a.held, b.held);
        assert_eq!(a.can_hold, b.can_hold);
        assert_eq!(a.level, b.level);
        assert_eq!(a.lines, b.lines);
        assert_eq!(a.score, b.score);
        assert_eq!(a.count, b.count);
        assert_eq!(
            a.source.clone().next_shape(),
            b.source.clone().next_shape()
        );
    }

    #[test]
    fn test_new_game_draws_current_before_preview() {
        let state = state_with(&[ShapeKind::T, ShapeKind::I, ShapeKind::O]);
        assert_eq!(state.current(), Piece::new(ShapeKind::T, Coord::new(4, 19)));
        assert_eq!(state.preview(), ShapeKind::I);
        assert_eq!(state.held(), None);
        assert!(state.can_hold());
        assert_eq!(state.level(), 1);
        assert_eq!((state.lines(), state.score(), state.count()), (0, 0, 0));
        assert_eq!(state.time(), Duration::ZERO);
        assert!(!state.is_game_over());
    }

    #[test]
    fn test_zero_start_level_is_rejected() {
        let error = GameState::with_source(0, sequence(&[ShapeKind::O])).unwrap_err();
        assert_eq!(error, InvalidStartLevelError { start_level: 0 });
        assert!(GameState::new(0).is_err());
    }

    #[test]
    fn test_o_piece_falls_until_locked() {
        let mut state = state_with(&[ShapeKind::O, ShapeKind::I]);
        let mut ticks = 0;
        let result = loop {
            let result = state.elapsed().unwrap();
            ticks += 1;
            if result.locked {
                break result;
            }
            assert!(ticks < 100, "piece never locked");
        };

        // 18 falls, then the lock
        assert_eq!(ticks, 19);
        assert!(result.lines.is_empty());
        for (x, y) in [(4, 0), (4, 1), (5, 0), (5, 1)] {
            assert_eq!(state.board().get(Coord::new(x, y)), Some(ShapeKind::O));
        }
        assert_eq!(state.board().occupied_cells().count(), 4);
        assert!(state.can_hold());
        assert_eq!(state.count(), 1);
        // The new piece already took its first fall
        assert_eq!(state.current().kind(), ShapeKind::I);
        assert_eq!(state.current().position(), Coord::new(4, 18));
    }

    #[test]
    fn test_check_clears_full_row_and_shifts_rows_above() {
        let matrix = matrix_with_rows(&[(5, "TTTTTTTTTT"), (6, "J.........")]);
        let mut state = GameState::with_matrix(matrix, 1, sequence(&[ShapeKind::O])).unwrap();
        state.current = Piece::new(ShapeKind::O, Coord::new(5, 7));
        assert!(state.is_landed());

        let result = state.check();
        assert!(result.success && result.locked);
        assert_eq!(result.lines, vec![5]);
        assert_eq!(state.lines(), 1);
        assert_eq!(state.score(), 100);
        assert_eq!(state.board().get(Coord::new(0, 5)), Some(ShapeKind::J));
        assert_eq!(state.board().get(Coord::new(0, 6)), None);
        assert_eq!(state.board().get(Coord::new(5, 5)), Some(ShapeKind::O));
        assert_eq!(state.board().get(Coord::new(6, 6)), Some(ShapeKind::O));
    }

    #[test]
    fn test_check_does_nothing_while_airborne() {
        let mut state = state_with(&[ShapeKind::S]);
        let before = state.clone();
        assert_eq!(state.check(), ActionResult::rejected());
        assert_same_state(&state, &before);
    }

    #[test]
    fn test_second_hold_is_rejected_and_changes_nothing() {
        let mut state = state_with(&[ShapeKind::T, ShapeKind::I, ShapeKind::O, ShapeKind::S]);

        let result = state.hold().unwrap();
        assert_eq!(result, ActionResult::accepted());
        assert_eq!(state.held(), Some(ShapeKind::T));
        assert_eq!(state.current().kind(), ShapeKind::I);
        assert_eq!(state.preview(), ShapeKind::O);
        assert!(!state.can_hold());

        let snapshot = state.clone();
        let result = state.hold().unwrap();
        assert!(!result.success);
        assert_same_state(&state, &snapshot);
    }

    #[test]
    fn test_hold_swaps_after_lock() {
        let mut state = state_with(&[ShapeKind::T, ShapeKind::I, ShapeKind::O, ShapeKind::S]);
        state.hold().unwrap();
        state.move_piece(Direction::Left).unwrap();
        state.drop().unwrap();
        assert!(state.can_hold());
        assert_eq!(state.current().kind(), ShapeKind::O);

        assert!(state.hold().unwrap().success);
        assert_eq!(state.held(), Some(ShapeKind::O));
        assert_eq!(
            state.current(),
            Piece::new(ShapeKind::T, state.board().origin())
        );
        // Swapping does not draw from the source
        assert_eq!(state.preview(), ShapeKind::S);
    }

    #[test]
    fn test_hold_into_the_stack_ends_the_game() {
        let column: Vec<(usize, &str)> = (0..=17).map(|y| (y, ".....L....")).collect();
        let kinds = [ShapeKind::O, ShapeKind::I, ShapeKind::I, ShapeKind::I, ShapeKind::I];
        let mut state =
            GameState::with_matrix(matrix_with_rows(&column), 1, sequence(&kinds)).unwrap();
        assert!(state.hold().unwrap().success);
        assert_eq!(state.current().kind(), ShapeKind::I);

        // The I piece rests on the column, right under the origin
        let result = state.drop().unwrap();
        assert!(result.locked);
        assert!(!state.is_game_over());
        assert!(state.can_hold());

        // The held O overlaps the I piece at the origin and is swapped in anyway
        let result = state.hold().unwrap();
        assert!(result.success);
        assert_eq!(
            state.current(),
            Piece::new(ShapeKind::O, state.board().origin())
        );
        assert!(state.is_game_over());
        assert_eq!(state.hold(), Err(GameOverError));
        assert_eq!(state.elapsed(), Err(GameOverError));
    }

    #[test]
    fn test_drop_moves_to_shadow_and_locks() {
        let mut state = state_with(&[ShapeKind::I, ShapeKind::T]);
        let spawned = state.current();
        assert_eq!(state.shadow().position(), Coord::new(4, 0));

        let result = state.drop().unwrap();
        assert!(result.success);
        assert!(result.locked);
        assert!(result.lines.is_empty());
        assert_eq!(result.before, Some(spawned));
        assert_eq!(result.after, Some(spawned.fallen(19)));
        assert_eq!(state.count(), 1);
        assert_eq!(state.current().kind(), ShapeKind::T);
        for x in 3..=6 {
            assert_eq!(state.board().get(Coord::new(x, 0)), Some(ShapeKind::I));
        }
    }

    #[test]
    fn test_fall_never_locks() {
        let mut state = state_with(&[ShapeKind::I, ShapeKind::T]);
        for _ in 0..19 {
            assert!(state.fall().unwrap().success);
        }
        assert!(state.is_landed());
        let snapshot = state.clone();
        assert_eq!(state.fall().unwrap(), ActionResult::rejected());
        assert_same_state(&state, &snapshot);
        assert_eq!(state.count(), 0);
    }

    #[test]
    fn test_walls_reject_moves_and_rotations() {
        let mut state = state_with(&[ShapeKind::I]);
        assert!(state.rotate(Rotation::Clockwise).unwrap().success);
        for _ in 0..4 {
            assert!(state.move_piece(Direction::Left).unwrap().success);
        }
        assert_eq!(state.current().position(), Coord::new(0, 19));
        assert!(!state.move_piece(Direction::Left).unwrap().success);

        // Horizontal I would stick out left of the wall, and there is no kick
        let snapshot = state.clone();
        let result = state.rotate(Rotation::Clockwise).unwrap();
        assert!(!result.success);
        assert_same_state(&state, &snapshot);
        assert_eq!(state.current().rotation(), 1);
    }

    #[test]
    fn test_occupied_origin_is_game_over_and_every_action_fails() {
        let matrix = matrix_with_rows(&[(19, "....O.....")]);
        let mut state = GameState::with_matrix(matrix, 1, sequence(&[ShapeKind::T])).unwrap();
        assert!(state.is_game_over());
        assert!(state.fall_height() < 0);

        assert_eq!(state.move_piece(Direction::Left), Err(GameOverError));
        assert_eq!(state.rotate(Rotation::Clockwise), Err(GameOverError));
        assert_eq!(state.fall(), Err(GameOverError));
        assert_eq!(state.drop(), Err(GameOverError));
        assert_eq!(state.hold(), Err(GameOverError));
        assert_eq!(state.elapsed(), Err(GameOverError));
        assert_eq!(state.perform(Action::Fall), Err(GameOverError));
        assert!(state.step(Action::Hold).is_err());
    }

    #[test]
    fn test_lock_that_tops_out_is_reported_before_game_over() {
        let column: Vec<(usize, &str)> = (0..=17).map(|y| (y, "....L.....")).collect();
        let mut state =
            GameState::with_matrix(matrix_with_rows(&column), 1, sequence(&[ShapeKind::O]))
                .unwrap();
        assert!(state.is_landed());
        assert!(!state.is_game_over());

        let result = state.elapsed().unwrap();
        assert!(result.success);
        assert!(result.locked);
        assert_eq!(result.after, None);
        assert!(state.is_game_over());
        assert_eq!(state.count(), 1);

        assert_eq!(state.elapsed(), Err(GameOverError));
    }

    #[test]
    fn test_perform_dispatches_actions() {
        let mut state = state_with(&[ShapeKind::L, ShapeKind::J]);
        let result = state.perform(Action::Move(Direction::Right)).unwrap();
        assert_eq!(result.after.map(|p| p.position()), Some(Coord::new(5, 19)));
        state.perform(Action::Rotate(Rotation::CounterClockwise)).unwrap();
        assert_eq!(state.current().rotation(), 3);
        state.perform(Action::Fall).unwrap();
        assert_eq!(state.current().position(), Coord::new(5, 18));
        assert!(state.perform(Action::Hold).unwrap().success);
        assert_eq!(state.held(), Some(ShapeKind::L));
        assert!(state.perform(Action::Drop).unwrap().locked);
    }

    #[test]
    fn test_advance_time_accumulates() {
        let mut state = state_with(&[ShapeKind::Z]);
        state.advance_time(Duration::from_millis(1500));
        state.advance_time(Duration::from_millis(250));
        assert_eq!(state.time(), Duration::from_millis(1750));
    }

    #[test]
    fn test_gravity_interval_follows_level() {
        let state = GameState::with_source(3, sequence(&[ShapeKind::Z])).unwrap();
        assert_eq!(state.gravity_interval(), formulas::gravity_interval(3));
    }
}

use std::fmt;

use super::{coord::Coord, piece::Piece, shape::ShapeKind};

/// A single matrix cell: empty, or the kind of the piece that was locked there.
///
/// The kind is only kept for rendering; gameplay only cares whether the cell
/// is occupied.
pub type Cell = Option<ShapeKind>;

/// The playing field: a fixed `width × height` grid of cells.
///
/// Row `0` is the bottom row. Rows at or above `height` are not stored and are
/// always free, which lets a freshly spawned piece stick out above the visible
/// field. Cells left of `x = 0`, right of `width - 1` or below `y = 0` are
/// never free.
///
/// # Example
///
/// ```
/// use postris_engine::{Coord, Matrix, Piece, ShapeKind};
///
/// let mut matrix = Matrix::new(10, 20);
/// let piece = Piece::new(ShapeKind::O, Coord::new(4, 1));
/// assert!(!matrix.is_collision(&piece));
///
/// matrix.place(&piece);
/// assert_eq!(matrix.get(Coord::new(4, 0)), Some(ShapeKind::O));
/// assert!(matrix.is_collision(&piece));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    width: usize,
    height: usize,
    rows: Vec<Vec<Cell>>,
}

impl Matrix {
    /// Creates an empty matrix.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero or does not fit in an `i32`.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "matrix must not be empty");
        assert!(
            i32::try_from(width).is_ok() && i32::try_from(height).is_ok(),
            "matrix dimensions must fit in i32"
        );
        Self {
            width,
            height,
            rows: vec![vec![None; width]; height],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Position where new pieces appear: `(round(width / 2 - 1), height - 1)`.
    #[must_use]
    pub fn origin(&self) -> Coord {
        // Integer form of the rounding; equal for every positive width
        Coord::new((self.width_i32() - 1) / 2, self.height_i32() - 1)
    }

    fn width_i32(&self) -> i32 {
        i32::try_from(self.width).unwrap_or(i32::MAX)
    }

    fn height_i32(&self) -> i32 {
        i32::try_from(self.height).unwrap_or(i32::MAX)
    }

    fn index(&self, coord: Coord) -> Option<(usize, usize)> {
        let x = usize::try_from(coord.x).ok().filter(|x| *x < self.width)?;
        let y = usize::try_from(coord.y).ok().filter(|y| *y < self.height)?;
        Some((x, y))
    }

    /// Returns the cell at `coord`, or `None` if it is empty or outside the grid.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Cell {
        let (x, y) = self.index(coord)?;
        self.rows[y][x]
    }

    /// Checks whether `coord` lies in the field.
    ///
    /// The upper bound is only enforced when `check_top` is set; collision
    /// tests pass `false` so the space above the field stays usable.
    #[must_use]
    pub fn is_contained(&self, coord: Coord, check_top: bool) -> bool {
        coord.x >= 0
            && coord.x < self.width_i32()
            && coord.y >= 0
            && (!check_top || coord.y < self.height_i32())
    }

    #[must_use]
    pub fn is_free(&self, coord: Coord) -> bool {
        if coord.y >= self.height_i32() {
            return true;
        }
        self.index(coord)
            .is_some_and(|(x, y)| self.rows[y][x].is_none())
    }

    /// Checks whether any block of the piece is outside the sides/bottom or
    /// overlaps an occupied cell. The top is never an obstruction.
    #[must_use]
    pub fn is_collision(&self, piece: &Piece) -> bool {
        piece
            .blocks()
            .into_iter()
            .any(|block| !self.is_contained(block, false) || !self.is_free(block))
    }

    /// Number of rows `block` can descend before hitting the floor or an
    /// occupied cell.
    ///
    /// Returns `-1` when the block's own cell is already occupied.
    #[must_use]
    pub fn fall_space(&self, block: Coord) -> i32 {
        for distance in 0..=block.y {
            let candidate = block - Coord::from_y(distance);
            if candidate.y >= self.height_i32() {
                continue;
            }
            if !self.is_free(candidate) {
                return distance - 1;
            }
        }
        block.y
    }

    /// Writes the piece's kind into each of its cells.
    ///
    /// Blocks above the field are dropped. The caller is responsible for
    /// checking collisions first.
    pub fn place(&mut self, piece: &Piece) {
        for block in piece.blocks() {
            if let Some((x, y)) = self.index(block) {
                self.rows[y][x] = Some(piece.kind());
            }
        }
    }

    /// Removes every full row and returns the indices they had before removal,
    /// bottom first.
    ///
    /// The rows above the removed ones move down and empty rows are added at
    /// the top, so the height never changes.
    pub fn clear_lines(&mut self) -> Vec<usize> {
        let full_rows: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().all(Option::is_some))
            .map(|(y, _)| y)
            .collect();
        if full_rows.is_empty() {
            return full_rows;
        }

        let width = self.width;
        self.rows.retain(|row| row.iter().any(Option::is_none));
        self.rows.resize_with(self.height, || vec![None; width]);
        full_rows
    }

    /// Iterates over rows from the bottom (`y = 0`) up.
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[Cell]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Iterates over every occupied cell with its position.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (Coord, ShapeKind)> + '_ {
        self.rows.iter().zip(0..).flat_map(|(row, y)| {
            row.iter()
                .zip(0..)
                .filter_map(move |(cell, x)| cell.map(|kind| (Coord::new(x, y), kind)))
        })
    }

    /// Creates a matrix from ASCII art for testing.
    ///
    /// Rows are given top first. `.` is an empty cell and a shape letter
    /// (`O`, `I`, `S`, `Z`, `L`, `J`, `T`) is an occupied one. All rows must
    /// have the same width; blank lines are ignored.
    ///
    /// ```
    /// use postris_engine::{Coord, Matrix, ShapeKind};
    ///
    /// let matrix = Matrix::from_ascii(
    ///     "
    ///     ....
    ///     T...
    ///     TTIO
    ///     ",
    /// );
    /// assert_eq!((matrix.width(), matrix.height()), (4, 3));
    /// assert_eq!(matrix.get(Coord::new(0, 1)), Some(ShapeKind::T));
    /// assert_eq!(matrix.get(Coord::new(3, 0)), Some(ShapeKind::O));
    /// ```
    ///
    /// # Panics
    ///
    /// Panics on unknown characters or rows of differing width.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let lines: Vec<&str> = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let width = lines.first().map_or(0, |line| line.chars().count());
        let mut matrix = Self::new(width, lines.len());

        for (y, line) in lines.iter().rev().enumerate() {
            let cells: Vec<Cell> = line
                .chars()
                .map(|ch| match ch {
                    '.' => None,
                    _ => Some(
                        ShapeKind::from_char(ch)
                            .unwrap_or_else(|| panic!("unknown cell '{ch}' at row {y}")),
                    ),
                })
                .collect();
            assert_eq!(
                cells.len(),
                width,
                "Each row must have exactly {width} cells, got {} at row {y}",
                cells.len()
            );
            matrix.rows[y] = cells;
        }
        matrix
    }
}

/// Renders the matrix in the [`Matrix::from_ascii`] format, top row first.
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows.iter().rev() {
            for cell in row {
                let ch = cell.map_or('.', ShapeKind::as_char);
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

use std::iter;

use postris_engine::{Matrix, Piece};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use super::{Tile, TileDisplay};

#[derive(Debug)]
pub struct BoardDisplay<'a> {
    matrix: &'a Matrix,
    ghost: Option<Piece>,
    current: Option<Piece>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(matrix: &'a Matrix) -> Self {
        Self {
            matrix,
            ghost: None,
            current: None,
            block: None,
        }
    }

    pub fn ghost(self, piece: Piece) -> Self {
        Self {
            ghost: Some(piece),
            ..self
        }
    }

    pub fn current(self, piece: Piece) -> Self {
        Self {
            current: Some(piece),
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        super::cells(self.matrix.width()) * TileDisplay::width()
            + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        super::cells(self.matrix.height()) * TileDisplay::height()
            + super::block_vertical_margin(self.block.as_ref())
    }

    /// Tiles to draw, bottom row first. Parts of pieces above the matrix are
    /// not shown.
    fn tiles(&self) -> Vec<Vec<Tile>> {
        let mut tiles: Vec<Vec<Tile>> = self
            .matrix
            .rows()
            .map(|row| row.iter().copied().map(Tile::from).collect())
            .collect();
        let mut paint = |piece: Piece, tile: Tile| {
            for block in piece.blocks() {
                let (Ok(x), Ok(y)) = (usize::try_from(block.x), usize::try_from(block.y)) else {
                    continue;
                };
                if let Some(cell) = tiles.get_mut(y).and_then(|row| row.get_mut(x)) {
                    *cell = tile;
                }
            }
        };
        if let Some(ghost) = self.ghost {
            paint(ghost, Tile::Ghost);
        }
        if let Some(piece) = self.current {
            paint(piece, Tile::Shape(piece.kind()));
        }
        tiles
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints =
            (0..self.matrix.width()).map(|_| Constraint::Length(TileDisplay::width()));
        let row_constraints =
            (0..self.matrix.height()).map(|_| Constraint::Length(TileDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let grid_rows = area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal));

        // The screen lists rows top first
        for (grid_row, row) in iter::zip(grid_rows, self.tiles().into_iter().rev()) {
            for (grid_cell, tile) in iter::zip(grid_row, row) {
                TileDisplay::from_tile(tile, true).render(grid_cell, buf);
            }
        }
    }
}

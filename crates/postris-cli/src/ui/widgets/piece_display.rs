use postris_engine::{Coord, ShapeKind};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use super::{Tile, TileDisplay};

/// A single shape in its spawn rotation, centered in its area.
///
/// Used for the hold and preview panels.
#[derive(Debug)]
pub struct PieceDisplay<'a> {
    kind: Option<ShapeKind>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> PieceDisplay<'a> {
    pub fn new() -> Self {
        Self {
            kind: None,
            block: None,
        }
    }

    pub fn kind(self, kind: ShapeKind) -> Self {
        Self {
            kind: Some(kind),
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
        4 * TileDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        2 * TileDisplay::height() + super::block_vertical_margin(self.block.as_ref())
    }
}

/// Tiles of the shape's bounding box, top row first.
fn shape_tiles(kind: ShapeKind) -> Vec<Vec<Tile>> {
    let (min, max) = kind.bounds(0);
    let blocks = kind.blocks(0);
    (min.y..=max.y)
        .rev()
        .map(|y| {
            (min.x..=max.x)
                .map(|x| {
                    if blocks.contains(&Coord::new(x, y)) {
                        Tile::Shape(kind)
                    } else {
                        Tile::Empty
                    }
                })
                .collect()
        })
        .collect()
}

impl Widget for PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let Some(kind) = self.kind else {
            TileDisplay::from_tile(Tile::Empty, false).render(area, buf);
            return;
        };

        let tiles = shape_tiles(kind);
        let rows = super::cells(tiles.len());
        let cols = super::cells(tiles.first().map_or(0, Vec::len));
        let piece_area = area.centered(
            Constraint::Length(cols * TileDisplay::width()),
            Constraint::Length(rows * TileDisplay::height()),
        );

        let col_constraints = (0..cols).map(|_| Constraint::Length(TileDisplay::width()));
        let row_constraints = (0..rows).map(|_| Constraint::Length(TileDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);
        let grid_rows = piece_area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal));

        for (grid_row, row) in grid_rows.zip(tiles) {
            for (grid_cell, tile) in grid_row.into_iter().zip(row) {
                TileDisplay::from_tile(tile, false).render(grid_cell, buf);
            }
        }
    }
}

use postris_engine::{Cell, ShapeKind};
use ratatui::{
    prelude::{Buffer, Rect},
    style::Style,
    widgets::{Paragraph, Widget},
};

use super::style;

/// What a single grid position shows on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Empty,
    /// Where the current piece would land.
    Ghost,
    Shape(ShapeKind),
}

impl From<Cell> for Tile {
    fn from(cell: Cell) -> Self {
        cell.map_or(Self::Empty, Self::Shape)
    }
}

#[derive(Debug)]
pub struct TileDisplay {
    style: Style,
    symbol: &'static str,
}

impl TileDisplay {
    pub const fn new(style: Style, symbol: &'static str) -> Self {
        Self { style, symbol }
    }

    pub fn width() -> u16 {
        2
    }

    pub fn height() -> u16 {
        1
    }

    pub fn from_tile(tile: Tile, show_dots: bool) -> Self {
        match tile {
            Tile::Empty if show_dots => Self::new(style::EMPTY_DOT, "."),
            Tile::Empty => Self::new(style::EMPTY, ""),
            Tile::Ghost => Self::new(style::GHOST, "[]"),
            Tile::Shape(kind) => Self::new(style::shape(kind), ""),
        }
    }
}

impl Widget for TileDisplay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &TileDisplay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // A Paragraph fills the whole area, not just the cells with the symbol
        Paragraph::new(self.symbol)
            .style(self.style)
            .centered()
            .render(area, buf);
    }
}

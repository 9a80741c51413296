use ratatui::{layout::Rect, widgets::Block as BlockWidget};

pub use self::{
    board_display::*, game_display::*, key_binding_display::*, piece_display::*,
    stats_display::*, tile_display::*,
};

mod board_display;
mod game_display;
mod key_binding_display;
mod piece_display;
mod stats_display;
mod tile_display;

mod color {
    use ratatui::style::Color;

    pub const CYAN: Color = Color::Rgb(0, 255, 255);
    pub const YELLOW: Color = Color::Rgb(255, 255, 0);
    pub const GREEN: Color = Color::Rgb(0, 255, 0);
    pub const RED: Color = Color::Rgb(255, 0, 0);
    pub const BLUE: Color = Color::Rgb(0, 0, 255);
    pub const ORANGE: Color = Color::Rgb(255, 127, 0);
    pub const MAGENTA: Color = Color::Rgb(255, 0, 255);
    pub const GRAY: Color = Color::Rgb(127, 127, 127);
    pub const BLACK: Color = Color::Rgb(0, 0, 0);
    pub const WHITE: Color = Color::Rgb(255, 255, 255);
}

pub mod style {
    use postris_engine::ShapeKind;
    use ratatui::style::{Color, Style};

    use super::color;

    const fn fg_bg(fg: Color, bg: Color) -> Style {
        Style::new().fg(fg).bg(bg)
    }

    const fn bg_only(color: Color) -> Style {
        Style::new().fg(color).bg(color)
    }

    pub const DEFAULT: Style = fg_bg(color::WHITE, color::BLACK);
    pub const EMPTY: Style = bg_only(color::BLACK);
    pub const EMPTY_DOT: Style = fg_bg(color::GRAY, color::BLACK);
    pub const GHOST: Style = fg_bg(color::GRAY, color::BLACK);

    pub const fn shape(kind: ShapeKind) -> Style {
        match kind {
            ShapeKind::I => bg_only(color::CYAN),
            ShapeKind::O => bg_only(color::YELLOW),
            ShapeKind::S => bg_only(color::GREEN),
            ShapeKind::Z => bg_only(color::RED),
            ShapeKind::J => bg_only(color::BLUE),
            ShapeKind::L => bg_only(color::ORANGE),
            ShapeKind::T => bg_only(color::MAGENTA),
        }
    }
}

fn block_vertical_margin(block: Option<&BlockWidget>) -> u16 {
    let dummy_rect = Rect::new(0, 0, 100, 100);
    let inner_rect = block.map_or(dummy_rect, |block| block.inner(dummy_rect));
    dummy_rect.height - inner_rect.height
}

fn block_horizontal_margin(block: Option<&BlockWidget>) -> u16 {
    let dummy_rect = Rect::new(0, 0, 100, 100);
    let inner_rect = block.map_or(dummy_rect, |block| block.inner(dummy_rect));
    dummy_rect.width - inner_rect.width
}

/// Converts a cell count to terminal units, saturating on absurd sizes.
fn cells(count: usize) -> u16 {
    u16::try_from(count).unwrap_or(u16::MAX)
}

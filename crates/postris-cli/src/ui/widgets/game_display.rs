use postris_engine::GameState;
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};

use super::{BoardDisplay, PieceDisplay, StatsDisplay, color, style};

/// Where the terminal game is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GameStatus {
    /// Waiting for the first key press.
    Ready,
    Playing,
    Paused,
    GameOver,
}

/// The whole game screen: hold and stats on the left, the matrix in the
/// middle, the preview on the right.
#[derive(Debug)]
pub struct GameDisplay<'a> {
    state: &'a GameState,
    status: GameStatus,
    horizontal_padding: u16,
    vertical_padding: u16,
}

impl<'a> GameDisplay<'a> {
    pub fn new(state: &'a GameState, status: GameStatus) -> Self {
        Self {
            state,
            status,
            horizontal_padding: 1,
            vertical_padding: 0,
        }
    }

    pub fn height(&self) -> u16 {
        BoardDisplay::new(self.state.board())
            .block(Block::bordered())
            .height()
    }

    fn border_color(&self) -> Color {
        match self.status {
            GameStatus::Ready => color::GRAY,
            GameStatus::Playing => color::WHITE,
            GameStatus::Paused => color::YELLOW,
            GameStatus::GameOver => color::RED,
        }
    }

    fn popup(&self) -> Option<(&'static str, Style)> {
        match self.status {
            GameStatus::Playing => None,
            GameStatus::Ready => Some((
                "PRESS ANY KEY",
                Style::new().fg(color::BLACK).bg(color::WHITE),
            )),
            GameStatus::Paused => Some(("PAUSED", Style::new().fg(color::BLACK).bg(color::YELLOW))),
            GameStatus::GameOver => {
                Some(("GAME OVER!!", Style::new().fg(color::WHITE).bg(color::RED)))
            }
        }
    }

    fn panel(&self, title: &'static str) -> Block<'static> {
        Block::bordered()
            .title(Line::from(title).centered())
            .padding(Padding::symmetric(
                self.horizontal_padding,
                self.vertical_padding,
            ))
            .border_style(self.border_color())
            .style(style::DEFAULT)
    }
}

impl Widget for GameDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &GameDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let game_board = {
            let widget = BoardDisplay::new(self.state.board()).block(
                Block::bordered()
                    .border_style(self.border_color())
                    .style(style::DEFAULT),
            );
            // No piece before the first key press, and none drawn over the stack at the end
            match self.status {
                GameStatus::Playing | GameStatus::Paused => widget
                    .ghost(self.state.shadow())
                    .current(self.state.current()),
                GameStatus::Ready | GameStatus::GameOver => widget,
            }
        };
        let hold_panel = {
            let panel = PieceDisplay::new().block(self.panel("HOLD"));
            match self.state.held() {
                Some(kind) => panel.kind(kind),
                None => panel,
            }
        };
        let next_panel = PieceDisplay::new()
            .kind(self.state.preview())
            .block(self.panel("NEXT"));
        let stats = StatsDisplay::new(self.state).block(self.panel("STATS"));

        let [left_column, center_column, right_column] = Layout::horizontal([
            Constraint::Length(u16::max(hold_panel.width(), stats.width())),
            Constraint::Length(game_board.width()),
            Constraint::Length(next_panel.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);

        let [hold_area, stats_area] = Layout::vertical([
            Constraint::Length(hold_panel.height()),
            Constraint::Length(stats.height()),
        ])
        .spacing(1)
        .areas(left_column);
        let hold_area = hold_area.layout::<1>(
            &Layout::horizontal([Constraint::Length(hold_panel.width())]).flex(Flex::End),
        )[0];
        let stats_area = stats_area.layout::<1>(
            &Layout::horizontal([Constraint::Length(stats.width())]).flex(Flex::End),
        )[0];

        let [board_area] =
            Layout::vertical([Constraint::Length(game_board.height())]).areas(center_column);
        let [next_area] =
            Layout::vertical([Constraint::Length(next_panel.height())]).areas(right_column);

        let game_board_width = game_board.width();
        hold_panel.render(hold_area, buf);
        stats.render(stats_area, buf);
        game_board.render(board_area, buf);
        next_panel.render(next_area, buf);

        if let Some((text, style)) = self.popup() {
            let block = Block::new().style(style);
            let text = Text::styled(text, style).centered();
            let area =
                board_area.centered(Constraint::Length(game_board_width), Constraint::Length(3));
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}

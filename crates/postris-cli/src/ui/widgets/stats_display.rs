use std::time::Duration;

use postris_engine::GameState;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::Line,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use super::style;

pub struct StatsDisplay<'a> {
    state: &'a GameState,
    block: Option<BlockWidget<'a>>,
}

impl<'a> StatsDisplay<'a> {
    pub fn new(state: &'a GameState) -> Self {
        Self { state, block: None }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        20 + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        super::cells(line_count()) + super::block_vertical_margin(self.block.as_ref())
    }
}

/// `m:ss.cc`
pub fn format_time(time: Duration) -> String {
    format!(
        "{}:{:0>2}.{:0>2}",
        time.as_secs() / 60,
        time.as_secs() % 60,
        time.subsec_millis() / 10
    )
}

/// One labelled number in the stats panel.
struct Stat {
    label: &'static str,
    value: fn(&GameState) -> String,
    /// Puts the value on its own line under the label, for values that grow
    /// wide.
    stacked: bool,
}

impl Stat {
    const fn inline(label: &'static str, value: fn(&GameState) -> String) -> Self {
        Self {
            label,
            value,
            stacked: false,
        }
    }

    const fn stacked(label: &'static str, value: fn(&GameState) -> String) -> Self {
        Self {
            label,
            value,
            stacked: true,
        }
    }

    const fn lines(&self) -> usize {
        if self.stacked { 2 } else { 1 }
    }
}

/// Stat groups, separated by a blank line.
const STATS: &[&[Stat]] = &[
    &[
        Stat::stacked("SCORE:", |state| state.score().to_string()),
        Stat::stacked("TIME:", |state| format_time(state.time())),
    ],
    &[
        Stat::inline("LEVEL:", |state| state.level().to_string()),
        Stat::inline("LINES:", |state| state.lines().to_string()),
        Stat::inline("PIECES:", |state| state.count().to_string()),
    ],
];

fn line_count() -> usize {
    let stats: usize = STATS.iter().flat_map(|group| group.iter()).map(Stat::lines).sum();
    stats + STATS.len().saturating_sub(1)
}

impl Widget for StatsDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let mut rows = area.rows();
        for (i, group) in STATS.iter().enumerate() {
            if i > 0 {
                rows.next();
            }
            for stat in *group {
                let Some(label_row) = rows.next() else {
                    return;
                };
                Line::styled(stat.label, style::DEFAULT)
                    .left_aligned()
                    .render(label_row, buf);
                let value_row = if stat.stacked {
                    match rows.next() {
                        Some(row) => row,
                        None => return,
                    }
                } else {
                    label_row
                };
                Line::styled((stat.value)(self.state), style::DEFAULT)
                    .right_aligned()
                    .render(value_row, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_rows(state: &GameState) -> Vec<String> {
        let display = StatsDisplay::new(state);
        let area = Rect::new(0, 0, display.width(), display.height());
        let mut buf = Buffer::empty(area);
        display.render(area, &mut buf);
        (0..area.height)
            .map(|y| (0..area.width).map(|x| buf[(x, y)].symbol()).collect())
            .collect()
    }

    #[test]
    fn test_stats_layout() {
        let state = GameState::new(3).unwrap();
        let rows = render_rows(&state);
        assert_eq!(
            rows,
            [
                format!("{:<20}", "SCORE:"),
                format!("{:>20}", "0"),
                format!("{:<20}", "TIME:"),
                format!("{:>20}", "0:00.00"),
                " ".repeat(20),
                format!("LEVEL:{:>14}", "3"),
                format!("LINES:{:>14}", "0"),
                format!("PIECES:{:>13}", "0"),
            ]
        );
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(Duration::ZERO), "0:00.00");
        assert_eq!(format_time(Duration::from_millis(61_237)), "1:01.23");
        assert_eq!(format_time(Duration::from_secs(3600)), "60:00.00");
    }
}

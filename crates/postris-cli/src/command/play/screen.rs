use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode};
use postris_engine::{Action, Direction, GameState, Rotation};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};
use tracing::{info, trace, warn};

use crate::ui::widgets::{GameDisplay, GameStatus, KeyBinding, KeyBindingDisplay};

/// Redraw rate while playing, for the clock in the stats panel.
const CLOCK_REDRAW_INTERVAL: Duration = Duration::from_millis(50);

const PLAYING_KEYS: &[KeyBinding] = &[
    (&["←", "→"], "Move"),
    (&["↓"], "Soft Drop"),
    (&["Space"], "Hard Drop"),
    (&["↑", "X"], "Rotate Right"),
    (&["Z", "Y"], "Rotate Left"),
    (&["C"], "Hold"),
    (&["P"], "Pause"),
    (&["Q"], "Quit"),
];
const READY_KEYS: &[KeyBinding] = &[(&["Any Key"], "Start"), (&["Q"], "Quit")];
const PAUSED_KEYS: &[KeyBinding] = &[(&["P"], "Resume"), (&["Q"], "Quit")];
const GAME_OVER_KEYS: &[KeyBinding] = &[(&["Q", "Esc"], "Quit")];

fn key_action(code: KeyCode) -> Option<Action> {
    let action = match code {
        KeyCode::Left => Action::Move(Direction::Left),
        KeyCode::Right => Action::Move(Direction::Right),
        KeyCode::Down => Action::Fall,
        KeyCode::Char(' ') => Action::Drop,
        KeyCode::Up | KeyCode::Char('x' | 'X') => Action::Rotate(Rotation::Clockwise),
        KeyCode::Char('z' | 'Z' | 'y' | 'Y') => Action::Rotate(Rotation::CounterClockwise),
        KeyCode::Char('c' | 'C') => Action::Hold,
        _ => return None,
    };
    Some(action)
}

#[derive(Debug)]
pub struct PlayScreen {
    state: GameState,
    status: GameStatus,
    /// When play time was last added to the state. Only set while playing.
    clock: Option<Instant>,
    is_exiting: bool,
}

impl PlayScreen {
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            status: GameStatus::Ready,
            clock: None,
            is_exiting: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_exiting(&self) -> bool {
        self.is_exiting
    }

    pub fn tick_interval(&self) -> Option<Duration> {
        self.status
            .is_playing()
            .then(|| self.state.gravity_interval())
    }

    pub fn redraw_interval(&self) -> Option<Duration> {
        self.status.is_playing().then_some(CLOCK_REDRAW_INTERVAL)
    }

    pub fn draw(&self, frame: &mut Frame<'_>) {
        let display = GameDisplay::new(&self.state, self.status);
        let bindings = match self.status {
            GameStatus::Ready => READY_KEYS,
            GameStatus::Playing => PLAYING_KEYS,
            GameStatus::Paused => PAUSED_KEYS,
            GameStatus::GameOver => GAME_OVER_KEYS,
        };

        let [main_area, help_area] = Layout::vertical([
            Constraint::Length(display.height()),
            Constraint::Length(1),
        ])
        .areas(frame.area());
        frame.render_widget(display, main_area);
        frame.render_widget(KeyBindingDisplay::new(bindings), help_area);
    }

    pub fn handle_event(&mut self, event: &Event) {
        let Some(key) = event.as_key_press_event() else {
            return;
        };
        match key.code {
            KeyCode::Char('q' | 'Q') | KeyCode::Esc => self.is_exiting = true,
            KeyCode::Char('p' | 'P') => self.toggle_pause(),
            code => {
                if self.status.is_ready() {
                    self.start();
                }
                if self.status.is_playing()
                    && let Some(action) = key_action(code)
                {
                    self.perform(action);
                }
            }
        }
    }

    /// Gravity tick.
    pub fn update(&mut self) {
        if self.status.is_playing() {
            self.perform(Action::Elapsed);
        }
    }

    fn start(&mut self) {
        info!(start_level = self.state.start_level(), "game started");
        self.status = GameStatus::Playing;
        self.clock = Some(Instant::now());
    }

    fn toggle_pause(&mut self) {
        match self.status {
            GameStatus::Playing => {
                self.update_clock();
                self.clock = None;
                self.status = GameStatus::Paused;
            }
            GameStatus::Paused => {
                self.clock = Some(Instant::now());
                self.status = GameStatus::Playing;
            }
            GameStatus::Ready | GameStatus::GameOver => {}
        }
    }

    fn update_clock(&mut self) {
        if let Some(last) = self.clock {
            let now = Instant::now();
            self.state.advance_time(now.duration_since(last));
            self.clock = Some(now);
        }
    }

    fn perform(&mut self, action: Action) {
        self.update_clock();
        match self.state.perform(action) {
            Ok(result) => trace!(?action, ?result, "performed"),
            Err(error) => warn!(?action, %error, "action failed"),
        }
        if self.state.is_game_over() {
            info!(
                score = self.state.score(),
                lines = self.state.lines(),
                pieces = self.state.count(),
                "game over"
            );
            self.status = GameStatus::GameOver;
            self.clock = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEvent, KeyModifiers};
    use postris_engine::{GameConfig, ShapeSeed};

    use super::*;

    fn screen() -> PlayScreen {
        let config = GameConfig {
            seed: Some(ShapeSeed::from_bytes([3; 16])),
            ..GameConfig::default()
        };
        PlayScreen::new(GameState::from_config(&config).unwrap())
    }

    fn press(screen: &mut PlayScreen, code: KeyCode) {
        screen.handle_event(&Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    #[test]
    fn test_key_map() {
        assert_eq!(
            key_action(KeyCode::Left),
            Some(Action::Move(Direction::Left))
        );
        assert_eq!(key_action(KeyCode::Char(' ')), Some(Action::Drop));
        assert_eq!(
            key_action(KeyCode::Up),
            Some(Action::Rotate(Rotation::Clockwise))
        );
        assert_eq!(
            key_action(KeyCode::Char('y')),
            Some(Action::Rotate(Rotation::CounterClockwise))
        );
        assert_eq!(key_action(KeyCode::Char('c')), Some(Action::Hold));
        assert_eq!(key_action(KeyCode::Char('p')), None);
    }

    #[test]
    fn test_first_key_starts_the_game_and_is_applied() {
        let mut screen = screen();
        assert!(screen.status.is_ready());
        assert_eq!(screen.tick_interval(), None);

        let spawned = screen.state.current();
        press(&mut screen, KeyCode::Left);
        assert!(screen.status.is_playing());
        assert_eq!(screen.state.current(), spawned.moved(Direction::Left));
        assert_eq!(screen.tick_interval(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_ticks_are_ignored_until_started() {
        let mut screen = screen();
        let spawned = screen.state.current();
        screen.update();
        assert_eq!(screen.state.current(), spawned);
    }

    #[test]
    fn test_pause_stops_gravity() {
        let mut screen = screen();
        press(&mut screen, KeyCode::Down);
        press(&mut screen, KeyCode::Char('p'));
        assert!(screen.status.is_paused());
        assert_eq!(screen.tick_interval(), None);

        let position = screen.state.current();
        screen.update();
        press(&mut screen, KeyCode::Left);
        assert_eq!(screen.state.current(), position);

        press(&mut screen, KeyCode::Char('p'));
        assert!(screen.status.is_playing());
    }

    #[test]
    fn test_game_over_stops_play() {
        let mut screen = screen();
        while !screen.status.is_game_over() {
            press(&mut screen, KeyCode::Char(' '));
        }
        assert!(screen.state.is_game_over());
        assert_eq!(screen.tick_interval(), None);

        // Further input never reaches the engine
        let count = screen.state.count();
        press(&mut screen, KeyCode::Char(' '));
        screen.update();
        assert_eq!(screen.state.count(), count);

        press(&mut screen, KeyCode::Char('q'));
        assert!(screen.is_exiting());
    }
}

use crossterm::event::Event;
use postris_engine::GameState;
use ratatui::Frame;

use crate::tui::{App, Runtime};

use super::screen::PlayScreen;

#[derive(Debug)]
pub struct PlayApp {
    screen: PlayScreen,
}

impl PlayApp {
    pub fn new(state: GameState) -> Self {
        Self {
            screen: PlayScreen::new(state),
        }
    }

    pub fn state(&self) -> &GameState {
        self.screen.state()
    }

    /// Gravity speed depends on the level and the clock only runs while
    /// playing, so both intervals follow every state change.
    fn sync_intervals(&self, runtime: &mut Runtime) {
        runtime.set_tick_interval(self.screen.tick_interval());
        runtime.set_redraw_interval(self.screen.redraw_interval());
    }
}

impl App for PlayApp {
    fn init(&mut self, runtime: &mut Runtime) {
        self.sync_intervals(runtime);
    }

    fn should_exit(&self) -> bool {
        self.screen.is_exiting()
    }

    fn handle_event(&mut self, runtime: &mut Runtime, event: &Event) {
        self.screen.handle_event(event);
        self.sync_intervals(runtime);
    }

    fn draw(&self, frame: &mut Frame) {
        self.screen.draw(frame);
    }

    fn update(&mut self, runtime: &mut Runtime) {
        self.screen.update();
        self.sync_intervals(runtime);
    }
}

use crossterm::event::Event;
use ratatui::Frame;

use super::Runtime;

/// Application driven by [`Runtime::run`].
pub trait App {
    /// Called once before the first event. Configure the tick interval here.
    fn init(&mut self, runtime: &mut Runtime);

    fn should_exit(&self) -> bool;

    /// Handles key presses, resizes and other terminal events.
    fn handle_event(&mut self, runtime: &mut Runtime, event: &Event);

    fn draw(&self, frame: &mut Frame);

    /// Called on every tick.
    fn update(&mut self, runtime: &mut Runtime);
}

use std::{io, time::Duration};

use super::{App, event::TuiEvent, event_loop::EventLoop};

/// Runs an [`App`] on the terminal until it asks to exit.
#[derive(Debug)]
pub struct Runtime {
    events: EventLoop,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            events: EventLoop::new(),
        }
    }

    /// Sets the time between two [`App::update`] calls. `None` stops updates.
    pub fn set_tick_interval(&mut self, interval: Option<Duration>) {
        self.events.set_tick_interval(interval);
    }

    /// Sets the time between two redraws when nothing else happens.
    pub fn set_redraw_interval(&mut self, interval: Option<Duration>) {
        self.events.set_redraw_interval(interval);
    }

    /// Takes over the terminal and runs the event loop.
    ///
    /// The terminal is restored when the loop ends, including on errors.
    pub fn run<A>(mut self, app: &mut A) -> io::Result<()>
    where
        A: App,
    {
        app.init(&mut self);

        ratatui::run(|terminal| {
            while !app.should_exit() {
                match self.events.next()? {
                    TuiEvent::Tick => app.update(&mut self),
                    TuiEvent::Redraw => {
                        terminal.draw(|frame| app.draw(frame))?;
                    }
                    TuiEvent::Crossterm(event) => app.handle_event(&mut self, &event),
                }
            }
            Ok(())
        })
    }
}

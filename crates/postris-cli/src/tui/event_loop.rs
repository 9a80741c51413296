use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::event;

use super::event::TuiEvent;

/// Produces ticks, redraws and terminal events in one sequence.
///
/// A redraw follows every tick and every terminal event. With a redraw
/// interval set, the screen is also redrawn periodically so clocks keep
/// moving between inputs.
#[derive(Debug)]
pub(super) struct EventLoop {
    tick_interval: Option<Duration>,
    redraw_interval: Option<Duration>,
    last_tick: Instant,
    last_redraw: Instant,
    dirty: bool,
}

impl EventLoop {
    pub(super) fn new() -> Self {
        let now = Instant::now();
        Self {
            tick_interval: None,
            redraw_interval: None,
            last_tick: now,
            last_redraw: now,
            dirty: true,
        }
    }

    /// Sets the tick interval. `None` stops ticking.
    ///
    /// Changing the interval restarts the wait for the next tick, so a game
    /// that just started gets a full interval before its first gravity step.
    pub(super) fn set_tick_interval(&mut self, interval: Option<Duration>) {
        if interval != self.tick_interval {
            self.tick_interval = interval;
            self.last_tick = Instant::now();
        }
    }

    pub(super) fn set_redraw_interval(&mut self, interval: Option<Duration>) {
        self.redraw_interval = interval;
    }

    /// Blocks until the next event.
    pub(super) fn next(&mut self) -> io::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            if let Some(interval) = self.tick_interval
                && now.duration_since(self.last_tick) >= interval
            {
                self.last_tick += interval;
                // Do not replay ticks missed while suspended
                if now.duration_since(self.last_tick) >= interval {
                    self.last_tick = now;
                }
                self.dirty = true;
                return Ok(TuiEvent::Tick);
            }

            let redraw_due = self
                .redraw_interval
                .is_some_and(|interval| now.duration_since(self.last_redraw) >= interval);
            if self.dirty || redraw_due {
                self.last_redraw = now;
                self.dirty = false;
                return Ok(TuiEvent::Redraw);
            }

            let timeout = self.timeout(now);
            if !event::poll(timeout)? {
                continue;
            }
            self.dirty = true;
            return Ok(event::read()?.into());
        }
    }

    fn timeout(&self, now: Instant) -> Duration {
        // Without any interval, wake up now and then anyway
        const IDLE: Duration = Duration::from_millis(250);

        let next_tick_at = self.tick_interval.map(|interval| self.last_tick + interval);
        let next_redraw_at = self
            .redraw_interval
            .map(|interval| self.last_redraw + interval);
        [next_tick_at, next_redraw_at]
            .into_iter()
            .flatten()
            .min()
            .map_or(IDLE, |at| at.saturating_duration_since(now))
    }
}

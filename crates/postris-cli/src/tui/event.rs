use crossterm::event::Event as CrosstermEvent;

#[derive(Debug, Clone, derive_more::From)]
pub(super) enum TuiEvent {
    /// The tick interval elapsed.
    Tick,
    /// The screen should be redrawn.
    Redraw,
    Crossterm(CrosstermEvent),
}

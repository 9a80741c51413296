pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("game is over: no further actions are accepted")]
pub struct GameOverError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("start level must be at least 1, got {start_level}")]
pub struct InvalidStartLevelError {
    pub start_level: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GameConfigError {
    #[display("{_0}")]
    InvalidStartLevel(InvalidStartLevelError),
    #[display("invalid matrix size {width}x{height}: must be at least {min_width}x{min_height}")]
    InvalidMatrixSize {
        width: usize,
        height: usize,
        min_width: usize,
        min_height: usize,
    },
}

impl From<InvalidStartLevelError> for GameConfigError {
    fn from(error: InvalidStartLevelError) -> Self {
        Self::InvalidStartLevel(error)
    }
}

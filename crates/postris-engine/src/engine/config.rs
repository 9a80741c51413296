use serde::{Deserialize, Serialize};

use crate::{GameConfigError, InvalidStartLevelError};

use super::shape_source::{ShapeSeed, UniformSource};

/// Parameters of a new game.
///
/// Missing fields fall back to [`GameConfig::default`] when deserializing.
///
/// ```
/// use postris_engine::GameConfig;
///
/// let config: GameConfig = serde_json::from_str(r#"{ "start_level": 4 }"#).unwrap();
/// assert_eq!((config.width, config.height, config.start_level), (10, 20, 4));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub start_level: usize,
    /// Seed of the shape sequence. A random one is drawn when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<ShapeSeed>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            start_level: 1,
            seed: None,
        }
    }
}

impl GameConfig {
    pub const DEFAULT_WIDTH: usize = 10;
    pub const DEFAULT_HEIGHT: usize = 20;

    /// Every shape fits horizontally and has room to spawn.
    pub const MIN_WIDTH: usize = 4;
    pub const MIN_HEIGHT: usize = 2;

    pub fn validate(&self) -> Result<(), GameConfigError> {
        if self.start_level == 0 {
            return Err(InvalidStartLevelError {
                start_level: self.start_level,
            }
            .into());
        }
        let too_large = i32::try_from(self.width).is_err() || i32::try_from(self.height).is_err();
        if self.width < Self::MIN_WIDTH || self.height < Self::MIN_HEIGHT || too_large {
            return Err(GameConfigError::InvalidMatrixSize {
                width: self.width,
                height: self.height,
                min_width: Self::MIN_WIDTH,
                min_height: Self::MIN_HEIGHT,
            });
        }
        Ok(())
    }

    /// The shape source this config describes: seeded if a seed is set,
    /// random otherwise.
    #[must_use]
    pub fn shape_source(&self) -> UniformSource {
        self.seed
            .map_or_else(UniformSource::new, UniformSource::with_seed)
    }
}

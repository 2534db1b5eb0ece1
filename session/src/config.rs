//! Session configuration loaded from TOML.

use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use whispers_core::{RoomLayout, DEFAULT_MAX_WAVES};
use whispers_world::PLAYER_START;

/// Seed used when the configuration does not name one.
pub const DEFAULT_SEED: u64 = 0x5eed;

/// Errors raised while loading or validating a [`SessionConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration from {path}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration was not valid TOML for this schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The layout does not declare any room.
    #[error("room layout contains no rooms")]
    EmptyLayout,

    /// The session would have no regular waves.
    #[error("at least one regular wave is required")]
    ZeroWaves,

    /// A room encloses no area.
    #[error("room `{0}` has zero area")]
    ZeroSizedRoom(String),

    /// The player would start outside every room.
    #[error("player start {x},{y} lies outside the room layout")]
    UnplayableStart {
        /// Horizontal start coordinate.
        x: f32,
        /// Vertical start coordinate.
        y: f32,
    },
}

/// Tunables for a single play session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Seed from which every component derives its random stream.
    pub seed: u64,
    /// Number of regular waves fought before the boss.
    pub max_waves: u32,
    /// Rooms forming the playable area.
    pub layout: RoomLayout,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            max_waves: DEFAULT_MAX_WAVES,
            layout: RoomLayout::castle(),
        }
    }
}

impl SessionConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("loaded configuration from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Checks the invariants the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_waves == 0 {
            return Err(ConfigError::ZeroWaves);
        }
        if self.layout.rooms().is_empty() {
            return Err(ConfigError::EmptyLayout);
        }
        if let Some(room) = self.layout.rooms().iter().find(|room| room.rect.is_empty()) {
            return Err(ConfigError::ZeroSizedRoom(room.name.clone()));
        }
        if !self.layout.is_position_playable(PLAYER_START) {
            return Err(ConfigError::UnplayableStart {
                x: PLAYER_START.x,
                y: PLAYER_START.y,
            });
        }
        Ok(())
    }
}

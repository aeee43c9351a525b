//! Music configuration
//!
//! Loaded from an optional TOML file, then overridden by `BLOCKSTAR_*`
//! environment variables (e.g. `BLOCKSTAR_VOLUME_PERCENT=60`).

use crate::error::{MusicError, Result};
use crate::types::{default_bundle, TrackCategory, TrackRegistration};
use crate::volume::{check_percent, DEFAULT_VOLUME_PERCENT};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "BLOCKSTAR";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MusicConfig {
    /// Volume used when the manager is initialized (0-100)
    #[serde(default = "default_volume_percent")]
    pub volume_percent: u8,

    /// Bundled tracks registered in the catalog
    #[serde(default = "default_bundle")]
    pub tracks: Vec<TrackRegistration>,
}

fn default_volume_percent() -> u8 {
    DEFAULT_VOLUME_PERCENT
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            volume_percent: default_volume_percent(),
            tracks: default_bundle(),
        }
    }
}

impl MusicConfig {
    /// Load configuration from file and environment
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            if path.exists() {
                settings = settings.add_source(config::File::from(path));
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(source: &str) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        check_percent(self.volume_percent).map_err(|_| {
            MusicError::Config(format!(
                "volume_percent must be between 0 and 100, got {}",
                self.volume_percent
            ))
        })?;

        let mut seen = HashSet::new();
        for track in &self.tracks {
            if !seen.insert(track.handle) {
                return Err(MusicError::Config(format!(
                    "track {} is registered more than once",
                    track.handle
                )));
            }
        }

        // The front screen starts menu music as soon as it is created
        if !self
            .tracks
            .iter()
            .any(|track| track.category == TrackCategory::Menu)
        {
            return Err(MusicError::Config(
                "tracks must include a menu track".to_string(),
            ));
        }
        Ok(())
    }
}

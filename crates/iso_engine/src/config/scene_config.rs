//! Scene configuration

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};

/// Tunables for the scene graph and the scene buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Edge length of a sector, in tiles
    pub sector_dimension: i32,

    /// Width of one tile on screen, in pixels
    pub tile_width: f32,

    /// Height of one tile on screen, in pixels
    pub tile_height: f32,

    /// Tolerance for the behind test and projected-box overlap test
    pub depth_epsilon: f32,

    /// Dependency-construction workers; `None` uses the available parallelism
    pub worker_threads: Option<usize>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            sector_dimension: 60,
            tile_width: 64.0,
            tile_height: 32.0,
            depth_epsilon: 1.0e-4,
            worker_threads: None,
        }
    }
}

impl Config for SceneConfig {}

impl SceneConfig {
    /// Reject values the scene cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sector_dimension <= 0 {
            return Err(ConfigError::Invalid {
                field: "sector_dimension",
                reason: format!("must be positive, got {}", self.sector_dimension),
            });
        }
        if !(self.tile_width > 0.0 && self.tile_height > 0.0) {
            return Err(ConfigError::Invalid {
                field: "tile_width/tile_height",
                reason: format!("must be positive, got {}x{}", self.tile_width, self.tile_height),
            });
        }
        if !(self.depth_epsilon >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "depth_epsilon",
                reason: format!("must not be negative, got {}", self.depth_epsilon),
            });
        }
        if self.worker_threads == Some(0) {
            return Err(ConfigError::Invalid {
                field: "worker_threads",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Number of dependency-construction workers to spawn
    pub fn resolved_worker_threads(&self) -> usize {
        self.worker_threads.unwrap_or_else(|| {
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SceneConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_sector_dimension() {
        let config = SceneConfig { sector_dimension: 0, ..SceneConfig::default() };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "sector_dimension", .. })
        ));
    }

    #[test]
    fn test_toml_partial_uses_defaults() {
        let config: SceneConfig = toml::from_str("sector_dimension = 16\nworker_threads = 2\n")
            .expect("valid toml");

        assert_eq!(config.sector_dimension, 16);
        assert_eq!(config.worker_threads, Some(2));
        assert_eq!(config.tile_width, 64.0);
        assert_eq!(config.resolved_worker_threads(), 2);
    }

    #[test]
    fn test_ron_round_trip_through_file() {
        let path = std::env::temp_dir()
            .join(format!("iso_engine_scene_{}.ron", std::process::id()));
        let path = path.to_string_lossy().to_string();
        let config = SceneConfig { depth_epsilon: 0.01, ..SceneConfig::default() };

        config.save_to_file(&path).expect("save");
        let loaded = SceneConfig::load_from_file(&path).expect("load");
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            SceneConfig::load_from_file("scene.json"),
            Err(ConfigError::Io(_) | ConfigError::UnsupportedFormat(_))
        ));
    }
}

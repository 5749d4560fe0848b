//! # World Configuration
//!
//! Immutable settings handed to [`World::new`](crate::World::new). Everything has a
//! default, so an empty JSON object is a valid config.
//!
//! ```
//! use voxel_world::WorldConfig;
//!
//! let config = WorldConfig::from_json_str(r#"{ "view_distance": { "horizontal": 2 } }"#).unwrap();
//! assert_eq!(config.view_distance.horizontal, 2);
//! assert_eq!(config.view_distance.vertical, 5);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How many chunks around the origin stay loaded, per axis.
///
/// `horizontal` bounds the X and Z offsets, `vertical` bounds the Y offset. Containment is
/// checked per axis, so the loaded region is a box and not a sphere.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewDistance {
    /// Maximum chunk offset along X and Z.
    pub horizontal: i32,
    /// Maximum chunk offset along Y.
    pub vertical: i32,
}

impl ViewDistance {
    /// Creates a view distance.
    pub fn new(horizontal: i32, vertical: i32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Returns `true` if a chunk offset `(dx, dy, dz)` lies inside the window on every axis.
    pub fn contains_offset(&self, dx: i32, dy: i32, dz: i32) -> bool {
        dx.abs() <= self.horizontal && dy.abs() <= self.vertical && dz.abs() <= self.horizontal
    }

    /// Number of chunks in a fully streamed window.
    pub fn chunk_capacity(&self) -> usize {
        let side = (2 * self.horizontal + 1) as usize;
        let height = (2 * self.vertical + 1) as usize;
        side * side * height
    }
}

impl Default for ViewDistance {
    fn default() -> Self {
        Self::new(10, 5)
    }
}

/// Parameters of the two-frequency layered noise terrain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// World blocks per unit of the 2D height noise.
    pub height_frequency: f64,
    /// World blocks per unit of the 3D density noise.
    pub density_frequency: f64,
    /// World height reached by a height sample of 1.0.
    pub max_height: i32,
    /// Exponent applied to the normalized height sample.
    pub height_exponent: f64,
    /// Octaves accumulated for the height noise.
    pub height_octaves: usize,
    /// Octaves accumulated for the density noise.
    pub density_octaves: usize,
    /// A cell is solid when its normalized density sample is below this value.
    pub density_threshold: f64,
    /// Thickness of the grass + dirt surface layer, in blocks.
    pub dirt_depth: i32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            height_frequency: 256.0,
            density_frequency: 32.0,
            max_height: 200,
            height_exponent: 2.0,
            height_octaves: 5,
            density_octaves: 2,
            density_threshold: 0.7,
            dirt_depth: 3,
        }
    }
}

/// Top-level configuration of a [`World`](crate::World).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Size of the streaming window.
    pub view_distance: ViewDistance,
    /// Seed shared by every noise function.
    pub seed: u32,
    /// Terrain shape.
    pub terrain: TerrainConfig,
}

impl WorldConfig {
    /// Parses and validates a config from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Rejects values the streaming and terrain code cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.view_distance.horizontal < 0 {
            return Err(invalid(
                "view_distance.horizontal",
                format!("must not be negative, got {}", self.view_distance.horizontal),
            ));
        }
        if self.view_distance.vertical < 0 {
            return Err(invalid(
                "view_distance.vertical",
                format!("must not be negative, got {}", self.view_distance.vertical),
            ));
        }

        let terrain = &self.terrain;
        if !is_positive(terrain.height_frequency) {
            return Err(invalid(
                "terrain.height_frequency",
                format!("must be positive, got {}", terrain.height_frequency),
            ));
        }
        if !is_positive(terrain.density_frequency) {
            return Err(invalid(
                "terrain.density_frequency",
                format!("must be positive, got {}", terrain.density_frequency),
            ));
        }
        if !is_positive(terrain.height_exponent) {
            return Err(invalid(
                "terrain.height_exponent",
                format!("must be positive, got {}", terrain.height_exponent),
            ));
        }
        if terrain.height_octaves == 0 {
            return Err(invalid("terrain.height_octaves", "must be at least 1".into()));
        }
        if terrain.density_octaves == 0 {
            return Err(invalid("terrain.density_octaves", "must be at least 1".into()));
        }
        if terrain.dirt_depth < 1 {
            return Err(invalid(
                "terrain.dirt_depth",
                format!("must be at least 1, got {}", terrain.dirt_depth),
            ));
        }

        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidValue { field, reason }
}

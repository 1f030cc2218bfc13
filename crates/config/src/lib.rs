//! Shared configuration for brushwork
//!
//! This crate provides the single source of truth for the tunables of the
//! stroke-geometry engine: input smoothing, geometry buffer pooling and the
//! defaults a painting session starts with.

use serde::{Deserialize, Serialize};

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Distance (meters) over which pressure smoothing decays to 10%
pub const DEFAULT_PRESSURE_WINDOW: f32 = 0.02;

/// Vertex capacity of a freshly allocated geometry buffer
pub const DEFAULT_VERTEX_CAPACITY: usize = 256;

/// Index capacity of a freshly allocated geometry buffer
pub const DEFAULT_INDEX_CAPACITY: usize = 512;

/// Number of idle geometry buffers kept after a trim
pub const DEFAULT_MAX_CACHED: usize = 10;

/// Brush selected when a session starts
pub const DEFAULT_BRUSH_ID: &str = "flat";

/// Stroke size (meters) used when a session starts
pub const DEFAULT_STROKE_SIZE: f32 = 0.02;

/// Input smoothing settings applied while a stroke is drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Pressure smoothing window in meters (0 disables pressure smoothing)
    pub pressure_window: f32,
    /// Run the (.25, .5, .25) position kernel before generating geometry
    pub smooth_positions: bool,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            pressure_window: DEFAULT_PRESSURE_WINDOW,
            smooth_positions: true,
        }
    }
}

/// Geometry buffer pool sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Initial vertex capacity for newly allocated buffers
    pub initial_vertex_capacity: usize,
    /// Initial index capacity for newly allocated buffers
    pub initial_index_capacity: usize,
    /// Idle buffers retained by a trim
    pub max_cached: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_vertex_capacity: DEFAULT_VERTEX_CAPACITY,
            initial_index_capacity: DEFAULT_INDEX_CAPACITY,
            max_cached: DEFAULT_MAX_CACHED,
        }
    }
}

/// Starting state of a painting session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Brush id selected on startup
    pub default_brush: String,
    /// Stroke color (RGBA, 0.0-1.0)
    pub default_color: [f32; 4],
    /// Stroke size in meters (clamped to the brush size range)
    pub default_size: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_brush: DEFAULT_BRUSH_ID.to_string(),
            default_color: [1.0, 1.0, 1.0, 1.0],
            default_size: DEFAULT_STROKE_SIZE,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
#[serde(default)]
pub struct EngineConfig {
    pub smoothing: SmoothingConfig,
    pub pool: PoolConfig,
    pub session: SessionConfig,
}

impl EngineConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json).map(Self::validated)
    }

    /// Serialize the configuration as pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Clamp every value into its legal range
    pub fn validated(mut self) -> Self {
        if !self.smoothing.pressure_window.is_finite() || self.smoothing.pressure_window < 0.0 {
            self.smoothing.pressure_window = 0.0;
        }
        self.pool.initial_vertex_capacity = self.pool.initial_vertex_capacity.max(1);
        self.pool.initial_index_capacity = self.pool.initial_index_capacity.max(1);
        for channel in &mut self.session.default_color {
            *channel = channel.clamp(0.0, 1.0);
        }
        if !self.session.default_size.is_finite() || self.session.default_size <= 0.0 {
            self.session.default_size = DEFAULT_STROKE_SIZE;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.smoothing.pressure_window, DEFAULT_PRESSURE_WINDOW);
        assert!(config.smoothing.smooth_positions);
        assert_eq!(config.pool.initial_vertex_capacity, 256);
        assert_eq!(config.pool.initial_index_capacity, 512);
        assert_eq!(config.session.default_brush, "flat");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "pool": { "max_cached": 3 } }"#).unwrap();
        assert_eq!(config.pool.max_cached, 3);
        assert_eq!(config.pool.initial_vertex_capacity, DEFAULT_VERTEX_CAPACITY);
        assert_eq!(config.smoothing, SmoothingConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = EngineConfig::default();
        config.session.default_color = [0.2, 0.4, 0.6, 1.0];
        let json = config.to_json_string().unwrap();
        let parsed = EngineConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validated_clamps() {
        let mut config = EngineConfig::default();
        config.smoothing.pressure_window = -1.0;
        config.pool.initial_index_capacity = 0;
        config.session.default_color = [2.0, -1.0, 0.5, 1.0];
        config.session.default_size = 0.0;

        let config = config.validated();
        assert_eq!(config.smoothing.pressure_window, 0.0);
        assert_eq!(config.pool.initial_index_capacity, 1);
        assert_eq!(config.session.default_color, [1.0, 0.0, 0.5, 1.0]);
        assert_eq!(config.session.default_size, DEFAULT_STROKE_SIZE);
    }
}

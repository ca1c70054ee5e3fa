use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Tunables for the arcade games, loaded from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcadeConfig {
    pub breakout: BreakoutConfig,
    pub snake: SnakeConfig,
    pub pinball: PinballConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakoutConfig {
    /// Tick interval (ms).
    pub tick_ms: u64,
    pub lives: u32,
    pub brick_rows: usize,
    pub brick_cols: usize,
    /// Initial ball speed per axis (px/tick).
    pub ball_speed: f32,
    /// Speed multiplier applied each time the wall is cleared.
    pub refill_speedup: f32,
    pub points_per_brick: u32,
}

impl Default for BreakoutConfig {
    fn default() -> Self {
        Self {
            tick_ms: 20,
            lives: 3,
            brick_rows: 5,
            brick_cols: 8,
            ball_speed: 3.0,
            refill_speedup: 1.1,
            points_per_brick: 10,
        }
    }
}

impl BreakoutConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeConfig {
    /// Normal tick interval (ms).
    pub tick_ms: u64,
    /// Tick interval after the `fast` cheat (ms).
    pub fast_tick_ms: u64,
    /// Smallest cell size (px); larger screens use width / 20.
    pub min_cell: f32,
    pub points_per_food: u32,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            tick_ms: 150,
            fast_tick_ms: 50,
            min_cell: 15.0,
            points_per_food: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinballConfig {
    /// Tick interval (ms).
    pub tick_ms: u64,
    /// Downward acceleration (px/tick²).
    pub gravity: f32,
    /// Fraction of speed kept after a wall bounce.
    pub wall_damping: f32,
    /// Speed a bumper gives the ball (px/tick).
    pub bumper_kick: f32,
    /// How far below the floor the ball may fall before the game ends (px).
    pub drain_margin: f32,
}

impl Default for PinballConfig {
    fn default() -> Self {
        Self {
            tick_ms: 16,
            gravity: 0.15,
            wall_damping: 0.8,
            bumper_kick: 5.0,
            drain_margin: 50.0,
        }
    }
}

impl ArcadeConfig {
    /// Load from `MINICADE_ARCADE_CONFIG` or `config/arcade.toml`, falling back to defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("MINICADE_ARCADE_CONFIG")
            && let Some(config) = Self::read(Path::new(&path))
        {
            return config;
        }
        let default_path = Path::new("config/arcade.toml");
        if default_path.exists()
            && let Some(config) = Self::read(default_path)
        {
            return config;
        }
        Self::default()
    }

    fn read(path: &Path) -> Option<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read arcade config, using defaults");
                return None;
            },
        };
        match toml::from_str::<Self>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Invalid arcade config, using defaults");
                None
            },
        }
    }
}

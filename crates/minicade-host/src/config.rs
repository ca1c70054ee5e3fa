use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use minicade_core::catalog;
use minicade_core::surface::DEFAULT_VIEWPORT;

pub const DEFAULT_CONFIG_PATH: &str = "minicade.toml";

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "cannot read config: {e}"),
            Self::Parse(e) => write!(f, "invalid config: {e}"),
            Self::Invalid(m) => write!(f, "{m}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Parse(e)
    }
}

/// Drawing surface size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT.0,
            height: DEFAULT_VIEWPORT.1,
        }
    }
}

impl FromStr for Viewport {
    type Err = ConfigError;

    /// Parses `"<width>x<height>"`, e.g. `"375x500"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::Invalid(format!("viewport {s:?} is not <width>x<height>"));
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let width = w.trim().parse::<f32>().map_err(|_| invalid())?;
        let height = h.trim().parse::<f32>().map_err(|_| invalid())?;
        Ok(Self { width, height })
    }
}

/// Host configuration, loaded from `minicade.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Catalog id of the game the headless binary runs.
    pub game_id: String,
    /// JSON file holding favorites, high scores, saves and settings.
    pub store_path: PathBuf,
    /// How often the runner advances the session clock (ms).
    pub frame_interval_ms: u64,
    pub viewport: Viewport,
    /// How long the headless binary plays before closing the session (s).
    pub run_secs: u64,
    pub broadcast_capacity: usize,
    /// Cheat actions applied right after the session starts.
    pub cheats: Vec<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            game_id: "arcade_001".to_string(),
            store_path: PathBuf::from("minicade-data.json"),
            frame_interval_ms: 16,
            viewport: Viewport::default(),
            run_secs: 3,
            broadcast_capacity: 64,
            cheats: Vec::new(),
        }
    }
}

impl HostConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Load `MINICADE_CONFIG` (or `minicade.toml`) if present, then apply env var overrides.
    pub fn load() -> Self {
        let path = std::env::var("MINICADE_CONFIG")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        let mut config = match Self::from_file(&path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "Loaded configuration");
                config
            },
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No config file found, using defaults");
                Self::default()
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to load config: {e}, using defaults");
                Self::default()
            },
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply `MINICADE_*` overrides looked up through `var`. Unparseable values are skipped.
    pub fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(id) = var("MINICADE_GAME")
            && !id.is_empty()
        {
            self.game_id = id;
        }
        if let Some(path) = var("MINICADE_STORE_PATH")
            && !path.is_empty()
        {
            self.store_path = PathBuf::from(path);
        }
        if let Some(val) = var("MINICADE_FRAME_MS") {
            match val.parse::<u64>() {
                Ok(ms) => self.frame_interval_ms = ms,
                Err(_) => tracing::warn!(value = %val, "MINICADE_FRAME_MS is not a number, ignored"),
            }
        }
        if let Some(val) = var("MINICADE_VIEWPORT") {
            match val.parse::<Viewport>() {
                Ok(viewport) => self.viewport = viewport,
                Err(e) => tracing::warn!("MINICADE_VIEWPORT ignored: {e}"),
            }
        }
    }

    /// Reject settings the host cannot run with; warn about suspicious ones.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid("frame_interval_ms must be > 0".to_string()));
        }
        let Viewport { width, height } = self.viewport;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::Invalid(format!("viewport {width}x{height} must be positive")));
        }
        if self.broadcast_capacity == 0 {
            return Err(ConfigError::Invalid("broadcast_capacity must be > 0".to_string()));
        }
        if catalog::find(&self.game_id).is_none() {
            tracing::warn!(game_id = %self.game_id, "game_id is not in the catalog");
        }
        if self.run_secs == 0 {
            tracing::warn!("run_secs is 0; the session closes immediately");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_values() {
        let cfg = HostConfig::default();
        assert_eq!(cfg.game_id, "arcade_001");
        assert_eq!(cfg.frame_interval(), Duration::from_millis(16));
        assert_eq!(cfg.viewport, Viewport { width: 375.0, height: 500.0 });
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parse_minimal_toml() {
        let cfg = HostConfig::from_toml_str(
            r#"
game_id = "casual_005"
frame_interval_ms = 20

[viewport]
width = 320
"#,
        )
        .unwrap();
        assert_eq!(cfg.game_id, "casual_005");
        assert_eq!(cfg.frame_interval_ms, 20);
        assert_eq!(cfg.viewport.width, 320.0);
        assert_eq!(cfg.viewport.height, 500.0);
        assert_eq!(cfg.broadcast_capacity, 64);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = HostConfig::from_toml_str("frame_interval_ms = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_apply() {
        let mut cfg = HostConfig::default();
        cfg.apply_env_overrides(env(&[
            ("MINICADE_STORE_PATH", "/tmp/scores.json"),
            ("MINICADE_FRAME_MS", "33"),
            ("MINICADE_VIEWPORT", "414x736"),
        ]));
        assert_eq!(cfg.store_path, PathBuf::from("/tmp/scores.json"));
        assert_eq!(cfg.frame_interval_ms, 33);
        assert_eq!(cfg.viewport, Viewport { width: 414.0, height: 736.0 });
    }

    #[test]
    fn bad_env_values_are_skipped() {
        let mut cfg = HostConfig::default();
        cfg.apply_env_overrides(env(&[("MINICADE_FRAME_MS", "soon"), ("MINICADE_VIEWPORT", "wide")]));
        assert_eq!(cfg, HostConfig::default());
    }

    #[test]
    fn validate_rejects_zero_frame_interval() {
        let cfg = HostConfig {
            frame_interval_ms: 0,
            ..HostConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn validate_rejects_empty_viewport() {
        let cfg = HostConfig {
            viewport: Viewport { width: 0.0, height: 500.0 },
            ..HostConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn viewport_parses_either_case() {
        assert_eq!("320X480".parse::<Viewport>().unwrap(), Viewport { width: 320.0, height: 480.0 });
        assert!("320".parse::<Viewport>().is_err());
    }
}

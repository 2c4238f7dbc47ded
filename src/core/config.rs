use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write config file at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("config file at {path} is malformed: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// User-visible strings shown in status messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub play: String,
    pub pause: String,
    pub stop: String,
    pub rewind: String,
    pub fast_forward: String,
    pub skip_next: String,
    pub skip_previous: String,
    pub capture_active: String,
    pub not_seekable: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            play: "Play".to_string(),
            pause: "Pause".to_string(),
            stop: "Stop".to_string(),
            rewind: "Play quickly backwards".to_string(),
            fast_forward: "Play quickly forwards".to_string(),
            skip_next: "Skip to the next point".to_string(),
            skip_previous: "Skip to the previous point".to_string(),
            capture_active: "Transport disabled while capturing".to_string(),
            not_seekable: "Source is not seekable".to_string(),
        }
    }
}

/// Theme icon names for each zoom preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomIcons {
    pub fit: String,
    pub original: String,
    pub zoom_in: String,
    pub zoom_out: String,
}

impl Default for ZoomIcons {
    fn default() -> Self {
        Self {
            fit: "zoom-fit-best".to_string(),
            original: "zoom-original".to_string(),
            zoom_in: "zoom-in".to_string(),
            zoom_out: "zoom-out".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Multiplier applied by repeated rewind/fast-forward presses.
    pub speed_step: f64,
    pub max_speed: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Factor `toggle_zoom(true)` jumps to before any explicit zoom is chosen.
    pub default_toggle_zoom: f64,
    /// Initial volume, 0.0 to 1.0.
    pub default_volume: f64,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
    /// Sources opened paused play until their first frame is shown, then pause.
    pub preview_on_open: bool,
    pub labels: Labels,
    pub icons: ZoomIcons,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed_step: 2.0,
            max_speed: 32.0,
            min_zoom: 0.1,
            max_zoom: 10.0,
            default_toggle_zoom: 1.0,
            default_volume: 1.0,
            event_capacity: 256,
            preview_on_open: false,
            labels: Labels::default(),
            icons: ZoomIcons::default(),
        }
    }
}

impl PlayerConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            match Self::read_from(&config_path) {
                Ok(config) => {
                    log::info!("Loaded existing config from {}", config_path.display());
                    Ok(config)
                }
                Err(e) => {
                    log::warn!("Config file exists but has issues ({}), creating new one with defaults", e);
                    let new_config = Self::default();
                    new_config.write_to(&config_path)?;
                    log::info!("Created new config file at {}", config_path.display());
                    Ok(new_config)
                }
            }
        } else {
            log::info!("No config file found, creating default config");
            let config = Self::default();
            config.write_to(&config_path)?;
            log::info!("Created new config file at {}", config_path.display());
            Ok(config)
        }
    }

    pub fn read_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config.sanitized())
    }

    pub fn write_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, content).map_err(write_err)
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("player-transport")
            .join("config.json")
    }

    /// Repairs values a hand-edited file could get wrong.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.speed_step > 1.0) {
            self.speed_step = defaults.speed_step;
        }
        if !(self.max_speed >= 1.0) {
            self.max_speed = defaults.max_speed;
        }
        if !(self.min_zoom > 0.0) {
            self.min_zoom = defaults.min_zoom;
        }
        if !(self.max_zoom >= self.min_zoom) {
            self.max_zoom = defaults.max_zoom.max(self.min_zoom);
        }
        if !(self.default_toggle_zoom > 0.0) {
            self.default_toggle_zoom = defaults.default_toggle_zoom;
        }
        self.default_volume = if self.default_volume.is_finite() {
            self.default_volume.clamp(0.0, 1.0)
        } else {
            defaults.default_volume
        };
        if self.event_capacity == 0 {
            self.event_capacity = defaults.event_capacity;
        }
        self
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::image::{validate_image_url, ImageError, ImageSource};
use crate::layout::{GridGeometry, LayoutError};

pub const DEFAULT_PIECE_SECS: u32 = 5;
pub const DEFAULT_GLOBAL_SECS: u32 = 300;

pub const QUERY_KEYS: [&str; 5] = ["timed", "piece_secs", "global_secs", "image_change", "image"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TimingMode {
    #[default]
    Untimed,
    Timed { piece_secs: u32, global_secs: u32 },
}

impl TimingMode {
    pub fn timed_default() -> Self {
        TimingMode::Timed {
            piece_secs: DEFAULT_PIECE_SECS,
            global_secs: DEFAULT_GLOBAL_SECS,
        }
    }

    pub fn is_timed(&self) -> bool {
        matches!(self, TimingMode::Timed { .. })
    }
}

/// What a mid-round image change does to the score. Occupancy and timers are never touched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageChangePolicy {
    #[default]
    ResetScore,
    KeepScore,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub geometry: GridGeometry,
    pub timing: TimingMode,
    pub image_change: ImageChangePolicy,
    pub image: ImageSource,
}

impl GameConfig {
    pub fn timed() -> Self {
        Self {
            timing: TimingMode::timed_default(),
            ..Self::default()
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: GameConfig =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.geometry.validate()?;
        if let TimingMode::Timed {
            piece_secs,
            global_secs,
        } = self.timing
        {
            if piece_secs == 0 {
                return Err(ConfigError::ZeroDuration { key: "piece_secs" });
            }
            if global_secs == 0 {
                return Err(ConfigError::ZeroDuration { key: "global_secs" });
            }
        }
        Ok(())
    }

    /// Applies one `key=value` override, as found in a page query string.
    pub fn apply_param(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key.trim() {
            "timed" => {
                let enabled = parse_flag(value)?;
                self.timing = match (enabled, self.timing) {
                    (true, TimingMode::Untimed) => TimingMode::timed_default(),
                    (true, timed) => timed,
                    (false, _) => TimingMode::Untimed,
                };
            }
            "piece_secs" => {
                let secs = parse_secs("piece_secs", value)?;
                let global_secs = match self.timing {
                    TimingMode::Timed { global_secs, .. } => global_secs,
                    TimingMode::Untimed => DEFAULT_GLOBAL_SECS,
                };
                self.timing = TimingMode::Timed {
                    piece_secs: secs,
                    global_secs,
                };
            }
            "global_secs" => {
                let secs = parse_secs("global_secs", value)?;
                let piece_secs = match self.timing {
                    TimingMode::Timed { piece_secs, .. } => piece_secs,
                    TimingMode::Untimed => DEFAULT_PIECE_SECS,
                };
                self.timing = TimingMode::Timed {
                    piece_secs,
                    global_secs: secs,
                };
            }
            "image_change" => {
                self.image_change = match value.to_ascii_lowercase().as_str() {
                    "reset" | "reset_score" => ImageChangePolicy::ResetScore,
                    "keep" | "keep_score" => ImageChangePolicy::KeepScore,
                    _ => {
                        return Err(ConfigError::InvalidValue {
                            key: "image_change",
                            value: value.to_string(),
                        })
                    }
                };
            }
            "image" => {
                self.image = if value.eq_ignore_ascii_case("random") {
                    ImageSource::default()
                } else {
                    ImageSource::Picked {
                        url: validate_image_url(value)?,
                    }
                };
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: "timed",
            value: value.to_string(),
        }),
    }
}

fn parse_secs(key: &'static str, value: &str) -> Result<u32, ConfigError> {
    let secs = value.parse::<u32>().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })?;
    if secs == 0 {
        return Err(ConfigError::ZeroDuration { key });
    }
    Ok(secs)
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    UnknownKey(String),
    InvalidValue { key: &'static str, value: String },
    ZeroDuration { key: &'static str },
    Parse(String),
    Layout(LayoutError),
    Image(ImageError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownKey(key) => write!(f, "unknown config key '{key}'"),
            ConfigError::InvalidValue { key, value } => {
                write!(f, "invalid value '{value}' for '{key}'")
            }
            ConfigError::ZeroDuration { key } => write!(f, "'{key}' must be at least one second"),
            ConfigError::Parse(message) => write!(f, "config parse failed: {message}"),
            ConfigError::Layout(err) => write!(f, "invalid geometry: {err}"),
            ConfigError::Image(err) => write!(f, "invalid image: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Layout(err) => Some(err),
            ConfigError::Image(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LayoutError> for ConfigError {
    fn from(err: LayoutError) -> Self {
        ConfigError::Layout(err)
    }
}

impl From<ImageError> for ConfigError {
    fn from(err: ImageError) -> Self {
        ConfigError::Image(err)
    }
}

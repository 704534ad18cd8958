//! Match Configuration
//!
//! `MatchSetting` is fixed for the lifetime of a match. It loads from a JSON
//! file with every field optional (missing fields take the defaults below)
//! and is validated before any state is built from it.

use std::fs;
use std::path::Path;
use std::time::Duration;
use serde::{Serialize, Deserialize};

use crate::game::geometry::DEFAULT_SHEET_WIDTH;
use crate::game::state::{Team, END_MAX};

/// Settings for the shared [`ShotRandomizer`](crate::game::randomizer::ShotRandomizer).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomizerSetting {
    /// Fixed seed for reproducible matches; `None` draws from OS entropy
    pub seed: Option<u64>,
    /// Standard deviation of the release speed error (m/s)
    pub speed_stddev: f32,
    /// Standard deviation of the release angle error (rad)
    pub angle_stddev: f32,
}

impl Default for RandomizerSetting {
    fn default() -> Self {
        Self {
            seed: Some(0),
            speed_stddev: 0.0076,
            angle_stddev: 0.0018,
        }
    }
}

/// Tag plus free-form parameters for a pluggable component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentSetting {
    /// Registry tag
    pub kind: String,
    /// Constructor parameters, interpreted by the registered kind
    #[serde(default)]
    pub params: serde_json::Value,
}

impl ComponentSetting {
    /// Component with default parameters.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: serde_json::Value::Null,
        }
    }
}

/// Immutable rules and resources for one match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSetting {
    /// Number of regular ends
    pub max_end: u8,
    /// Sheet width (m)
    pub sheet_width: f32,
    /// Protect guards for the first five stones instead of four
    pub five_rock_rule: bool,
    /// Release speed cap applied before the player's own error (m/s)
    pub max_shot_speed: f32,
    /// Thinking time per team for the regular ends
    pub thinking_time: [Duration; 2],
    /// Thinking time per team granted at the start of each extra end
    pub extra_end_thinking_time: [Duration; 2],
    /// Team holding the hammer in the first end
    pub initial_hammer: Team,
    /// Shot randomizer configuration
    pub randomizer: RandomizerSetting,
    /// Simulator selection
    pub simulator: ComponentSetting,
}

impl Default for MatchSetting {
    fn default() -> Self {
        Self {
            max_end: 10,
            sheet_width: DEFAULT_SHEET_WIDTH,
            five_rock_rule: true,
            max_shot_speed: 4.0,
            thinking_time: [Duration::from_secs(219); 2],
            extra_end_thinking_time: [Duration::from_secs(30); 2],
            initial_hammer: Team::Team1,
            randomizer: RandomizerSetting::default(),
            simulator: ComponentSetting::new("friction"),
        }
    }
}

impl MatchSetting {
    /// Load and validate a setting from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse and validate a setting from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let setting: MatchSetting = serde_json::from_str(text)?;
        setting.validate()?;
        Ok(setting)
    }

    /// Reject settings the engine cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_end == 0 || self.max_end >= END_MAX {
            return Err(ConfigError::invalid("max_end", "must be between 1 and 254"));
        }
        if !(self.sheet_width > 0.0 && self.sheet_width.is_finite()) {
            return Err(ConfigError::invalid("sheet_width", "must be positive"));
        }
        if !(self.max_shot_speed > 0.0 && self.max_shot_speed.is_finite()) {
            return Err(ConfigError::invalid("max_shot_speed", "must be positive"));
        }
        check_stddev("randomizer.speed_stddev", self.randomizer.speed_stddev)?;
        check_stddev("randomizer.angle_stddev", self.randomizer.angle_stddev)?;
        Ok(())
    }
}

pub(crate) fn check_stddev(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "must be finite and non-negative"))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Setting file could not be read.
    #[error("Failed to read setting file: {0}")]
    Io(#[from] std::io::Error),

    /// Setting or component parameters are malformed.
    #[error("Failed to parse setting: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted field path
        field: &'static str,
        /// What was expected
        reason: &'static str,
    },

    /// No constructor is registered under the tag.
    #[error("Unknown {registry} kind: {kind}")]
    UnknownKind {
        /// Which registry was searched
        registry: &'static str,
        /// The tag that was requested
        kind: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
        ConfigError::InvalidValue { field, reason }
    }
}

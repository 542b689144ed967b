#![forbid(unsafe_code)]

//! Configuration for a [`MoveLog`](crate::MoveLog) and its save format.
//!
//! With the `config` feature enabled, a [`MoveLogConfig`] can be loaded from
//! TOML or JSON:
//!
//! ```toml
//! # movelog.toml
//! layers = 4
//! tokens_per_line = 10
//! line_ending = "lf"
//! ```
//!
//! ```rust,ignore
//! let config = MoveLogConfig::from_toml_file("movelog.toml")?;
//! let log = MoveLog::with_config(config);
//! ```
//!
//! Every field has a default, so a partial file is fine.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "config")]
use crate::error::ConfigError;

/// Default number of parallel layers.
pub const DEFAULT_LAYERS: u32 = 3;
/// Default number of tokens written per line.
pub const DEFAULT_TOKENS_PER_LINE: usize = 10;

/// Line terminator used when writing a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum LineEnding {
    /// `\r\n` on Windows, `\n` elsewhere.
    #[default]
    Native,
    /// Always `\n`.
    Lf,
    /// Always `\r\n`.
    CrLf,
}

impl LineEnding {
    /// The terminator as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Native => {
                if cfg!(windows) {
                    "\r\n"
                } else {
                    "\n"
                }
            }
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// Configuration for a move log.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct MoveLogConfig {
    /// Number of parallel layers of the puzzle. A move whose slice mask
    /// covers all of them counts as a rotation.
    pub layers: u32,
    /// Tokens per line in the save format.
    pub tokens_per_line: usize,
    /// Line terminator in the save format.
    pub line_ending: LineEnding,
}

impl Default for MoveLogConfig {
    fn default() -> Self {
        Self {
            layers: DEFAULT_LAYERS,
            tokens_per_line: DEFAULT_TOKENS_PER_LINE,
            line_ending: LineEnding::Native,
        }
    }
}

impl MoveLogConfig {
    /// Create a configuration for a puzzle with `layers` layers.
    #[must_use]
    pub fn new(layers: u32) -> Self {
        Self {
            layers,
            ..Self::default()
        }
    }

    /// Set the number of tokens per line.
    #[must_use]
    pub fn with_tokens_per_line(mut self, tokens_per_line: usize) -> Self {
        self.tokens_per_line = tokens_per_line;
        self
    }

    /// Set the line terminator.
    #[must_use]
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Self::parse_toml(s, None)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        Self::parse_toml(&read_config(path)?, Some(path))
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Self::parse_json(s, None)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        Self::parse_json(&read_config(path)?, Some(path))
    }

    #[cfg(feature = "config")]
    fn parse_toml(s: &str, path: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|source| ConfigError::Toml {
            path: path.map(Path::to_path_buf),
            source,
        })?;
        config.validated(path)
    }

    #[cfg(feature = "config")]
    fn parse_json(s: &str, path: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(|source| ConfigError::Json {
            path: path.map(Path::to_path_buf),
            source,
        })?;
        config.validated(path)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.layers == 0 || self.layers > i32::BITS {
            errors.push(format!(
                "layers must be in 1..={}, got {}",
                i32::BITS,
                self.layers
            ));
        }
        if self.tokens_per_line == 0 {
            errors.push("tokens_per_line must be at least 1".to_string());
        }
        errors
    }

    #[cfg(feature = "config")]
    fn validated(self, path: Option<&Path>) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation {
                path: path.map(Path::to_path_buf),
                errors,
            })
        }
    }
}

#[cfg(feature = "config")]
fn read_config(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

//! Preprocessor configuration.
//!
//! [`ImgConfig`] deserializes from TOML on its own or as a table inside a
//! host's configuration:
//!
//! ```toml
//! policy = "per-image"
//! classes = true
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

/// How annotation values propagate between image declarations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationPolicy {
    /// The last `?size=` / `?class=` seen applies to every later image in the
    /// document that does not set its own.
    #[default]
    CarryForward,
    /// Every image starts without annotations.
    PerImage,
}

impl AnnotationPolicy {
    /// Name as written in configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CarryForward => "carry-forward",
            Self::PerImage => "per-image",
        }
    }
}

impl fmt::Display for AnnotationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnnotationPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "carry-forward" => Ok(Self::CarryForward),
            "per-image" => Ok(Self::PerImage),
            other => Err(ConfigError::Validation(format!(
                "unknown policy {other:?}, expected \"carry-forward\" or \"per-image\""
            ))),
        }
    }
}

/// Image preprocessor configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImgConfig {
    /// Annotation propagation between declarations.
    pub policy: AnnotationPolicy,
    /// Whether `?class=` is recognised.
    ///
    /// Disabled gives the older sizing-only behaviour.
    pub classes: bool,
}

impl Default for ImgConfig {
    fn default() -> Self {
        Self {
            policy: AnnotationPolicy::CarryForward,
            classes: true,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl ImgConfig {
    /// Sizing-only configuration without `?class=` support.
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            classes: false,
            ..Self::default()
        }
    }

    /// Set the annotation policy.
    #[must_use]
    pub fn with_policy(mut self, policy: AnnotationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enable or disable `?class=` support.
    #[must_use]
    pub fn with_classes(mut self, enabled: bool) -> Self {
        self.classes = enabled;
        self
    }

    /// Parse configuration from a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

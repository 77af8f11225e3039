#![forbid(unsafe_code)]

//! Workspace configuration as data.
//!
//! [`WorkspaceConfig`] can be loaded from TOML or JSON. Every field has a
//! default, so partial files are fine.
//!
//! ```toml
//! # vista.toml
//! name = "editor"
//! id_prefix = "pane"
//! minimum_viewport_width = 320.0
//! minimum_viewport_height = 200.0
//!
//! [default_viewport]
//! x = 0.0
//! y = 0.0
//! width = 1.0
//! height = 1.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vista_core::FractionalRect;

use crate::viewport::MinimumSize;

/// Tunables for a [`Workspace`](crate::Workspace).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Display name written into persisted documents.
    pub name: String,
    /// Prefix for ids from the default sequential generator.
    pub id_prefix: String,
    /// Minimum absolute width a split may produce in new contexts.
    pub minimum_viewport_width: f64,
    /// Minimum absolute height a split may produce in new contexts.
    pub minimum_viewport_height: f64,
    /// Rectangle of the viewport synthesized for a context with no snapshots.
    pub default_viewport: FractionalRect,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            name: "workspace".into(),
            id_prefix: "viewport".into(),
            minimum_viewport_width: 0.0,
            minimum_viewport_height: 0.0,
            default_viewport: FractionalRect::FULL,
        }
    }
}

/// Errors from loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl WorkspaceConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Self::checked(toml::from_str(s)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Self::checked(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    fn checked(config: Self) -> Result<Self, ConfigError> {
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Validate all parameters. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("name must not be empty".into());
        }
        if self.id_prefix.is_empty() {
            errors.push("id_prefix must not be empty".into());
        }
        for (field, value) in [
            ("minimum_viewport_width", self.minimum_viewport_width),
            ("minimum_viewport_height", self.minimum_viewport_height),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!("{field} must be finite and >= 0, got {value}"));
            }
        }
        if let Err(e) = self.default_viewport.validate() {
            errors.push(format!("default_viewport: {e}"));
        }

        errors
    }

    #[must_use]
    pub fn minimum_viewport(&self) -> MinimumSize {
        MinimumSize::new(self.minimum_viewport_width, self.minimum_viewport_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(WorkspaceConfig::default().validate().is_empty());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config = WorkspaceConfig::from_toml_str("name = \"editor\"\n").unwrap();
        assert_eq!(config.name, "editor");
        assert_eq!(config.id_prefix, "viewport");
        assert_eq!(config.default_viewport, FractionalRect::FULL);
    }

    #[test]
    fn full_toml() {
        let toml = r#"
            name = "editor"
            id_prefix = "pane"
            minimum_viewport_width = 320.0
            minimum_viewport_height = 200.0

            [default_viewport]
            x = 0.1
            y = 0.1
            width = 0.8
            height = 0.8
        "#;
        let config = WorkspaceConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.minimum_viewport(), MinimumSize::new(320.0, 200.0));
        assert_eq!(
            config.default_viewport,
            FractionalRect::new(0.1, 0.1, 0.8, 0.8)
        );
    }

    #[test]
    fn json_config() {
        let config =
            WorkspaceConfig::from_json_str(r#"{"name":"json","minimum_viewport_width":10}"#)
                .unwrap();
        assert_eq!(config.name, "json");
        assert_eq!(config.minimum_viewport_width, 10.0);
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = WorkspaceConfig::from_toml_str(
            "name = \"\"\nminimum_viewport_height = -5.0\n",
        )
        .unwrap_err();
        let ConfigError::Invalid(errors) = err else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("name"));
        assert!(errors[1].contains("minimum_viewport_height"));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = WorkspaceConfig::from_toml_str("name = ").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn file_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vista.toml");
        std::fs::write(&path, "id_prefix = \"pane\"\n").unwrap();
        let config = WorkspaceConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.id_prefix, "pane");

        let missing = WorkspaceConfig::from_toml_file(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}

//! The `Config` struct and its YAML persistence.

use crate::defaults;
use crate::error::ConfigError;
use crate::types::LogLevel;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Multiplexer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Shell used when a terminal is created without an explicit command
    #[serde(default = "defaults::shell")]
    pub default_shell: String,

    /// Initial terminal width in columns (used before bounds are known)
    #[serde(default = "defaults::cols")]
    pub cols: u16,

    /// Initial terminal height in rows (used before bounds are known)
    #[serde(default = "defaults::rows")]
    pub rows: u16,

    /// Cell width in pixels, used to convert panel bounds into a grid size
    #[serde(default = "defaults::cell_width")]
    pub cell_width: f32,

    /// Cell height in pixels, used to convert panel bounds into a grid size
    #[serde(default = "defaults::cell_height")]
    pub cell_height: f32,

    /// Width of the divider between split panels in pixels
    #[serde(default = "defaults::divider_width")]
    pub divider_width: f32,

    /// Render coalescing window in milliseconds (0 renders every request)
    #[serde(default = "defaults::render_debounce_ms")]
    pub render_debounce_ms: u64,

    /// Restore the last saved session on startup
    #[serde(default = "defaults::bool_true")]
    pub restore_session: bool,

    /// Override for the session file location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_file: Option<PathBuf>,

    /// Override for the working directory used when nothing better is known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_directory: Option<PathBuf>,

    /// Debug log verbosity
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_shell: defaults::shell(),
            cols: defaults::cols(),
            rows: defaults::rows(),
            cell_width: defaults::cell_width(),
            cell_height: defaults::cell_height(),
            divider_width: defaults::divider_width(),
            render_debounce_ms: defaults::render_debounce_ms(),
            restore_session: defaults::bool_true(),
            session_file: None,
            home_directory: None,
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, or defaults if absent
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        log::info!("Config path: {:?}", config_path);
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file
    ///
    /// A missing or empty file yields `Config::default()`.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(ConfigError::from)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml_ng::from_str(&contents)
            .map_err(ConfigError::from)
            .with_context(|| format!("Failed to parse config from {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let yaml = serde_yaml_ng::to_string(self).map_err(ConfigError::from)?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml).map_err(ConfigError::from)?;
        fs::rename(&temp_path, path).map_err(ConfigError::from)?;
        Ok(())
    }

    /// Check field values that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(ConfigError::Validation(format!(
                "cols/rows must be non-zero (got {}x{})",
                self.cols, self.rows
            )));
        }
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.cell_width) || !positive(self.cell_height) {
            return Err(ConfigError::Validation(format!(
                "cell size must be positive (got {}x{})",
                self.cell_width, self.cell_height
            )));
        }
        if !self.divider_width.is_finite() || self.divider_width < 0.0 {
            return Err(ConfigError::Validation(format!(
                "divider_width must be non-negative (got {})",
                self.divider_width
            )));
        }
        if self.default_shell.trim().is_empty() {
            return Err(ConfigError::Validation(
                "default_shell must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory holding the config and session files
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("termdeck")
    }

    /// Path of the config file (`<config_dir>/config.yaml`)
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Path of the session file, honoring `session_file`
    pub fn session_path(&self) -> PathBuf {
        self.session_file
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("last_session.yaml"))
    }

    /// Working directory used when no better source is known
    pub fn fallback_cwd(&self) -> PathBuf {
        self.home_directory
            .clone()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("/"))
    }

    /// Render coalescing window as a `Duration`
    pub fn render_debounce(&self) -> Duration {
        Duration::from_millis(self.render_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let temp = tempdir().unwrap();
        let config = Config::load_from(&temp.path().join("missing.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "cols: 120\nrender_debounce_ms: 0\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.cols, 120);
        assert_eq!(config.rows, 24);
        assert_eq!(config.render_debounce(), Duration::ZERO);
        assert!(config.restore_session);
    }

    #[test]
    fn test_save_and_reload() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("config.yaml");
        let config = Config {
            home_directory: Some(PathBuf::from("/srv/work")),
            log_level: LogLevel::Debug,
            ..Config::default()
        };

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.fallback_cwd(), PathBuf::from("/srv/work"));
    }

    #[test]
    fn test_zero_rows_rejected() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "rows: 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_divider_width_must_be_finite_and_non_negative() {
        for width in [-1.0, f32::NAN, f32::INFINITY] {
            let config = Config {
                divider_width: width,
                ..Config::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::Validation(_))),
                "divider_width {width} should be rejected"
            );
        }
        let config = Config {
            divider_width: 0.0,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "cols: [not, a, number]\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_session_path_override() {
        let config = Config {
            session_file: Some(PathBuf::from("/tmp/custom.yaml")),
            ..Config::default()
        };
        assert_eq!(config.session_path(), PathBuf::from("/tmp/custom.yaml"));
    }
}

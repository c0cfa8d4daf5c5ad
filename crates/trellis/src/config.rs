//! Runtime configuration for a [`System`](crate::System).
//!
//! Configuration can be built in code or read from TOML. In files, durations
//! are whole milliseconds and every key is optional:
//!
//! ```toml
//! poll_interval_ms = 50
//! animation_interval_ms = 16
//! tab_focus = true
//! exit_on_ctrl_c = true
//!
//! [screen]
//! alternate_screen = true
//! hide_cursor = true
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from reading or validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),

    /// The file is not valid TOML or has the wrong shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Dispatch loop and terminal settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemConfig {
    /// Longest time the loop waits for events or input per cycle.
    pub poll_interval: Duration,
    /// Base tick of the animation engine.
    pub animation_interval: Duration,
    /// Whether unhandled Tab and Shift+Tab move focus.
    pub tab_focus: bool,
    /// Whether the terminal switches to the alternate screen.
    pub alternate_screen: bool,
    /// Whether the cursor is hidden while running.
    pub hide_cursor: bool,
    /// Whether Ctrl+C ends the loop with code 0.
    pub exit_on_ctrl_c: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            animation_interval: Duration::from_millis(16),
            tab_focus: true,
            alternate_screen: true,
            hide_cursor: true,
            exit_on_ctrl_c: true,
        }
    }
}

impl SystemConfig {
    /// Set the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the animation base tick.
    pub fn with_animation_interval(mut self, interval: Duration) -> Self {
        self.animation_interval = interval;
        self
    }

    /// Enable or disable Tab focus cycling.
    pub fn with_tab_focus(mut self, enabled: bool) -> Self {
        self.tab_focus = enabled;
        self
    }

    /// Enable or disable the alternate screen.
    pub fn with_alternate_screen(mut self, enabled: bool) -> Self {
        self.alternate_screen = enabled;
        self
    }

    /// Enable or disable hiding the cursor.
    pub fn with_hide_cursor(mut self, enabled: bool) -> Self {
        self.hide_cursor = enabled;
        self
    }

    /// Enable or disable Ctrl+C handling.
    pub fn with_exit_on_ctrl_c(mut self, enabled: bool) -> Self {
        self.exit_on_ctrl_c = enabled;
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(source)?;
        let config = Self::from(file);
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(target: "trellis_core", path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Render as TOML, in the same shape [`from_toml_str`](Self::from_toml_str) reads.
    pub fn to_toml_string(&self) -> String {
        // Every field is a plain integer or bool, so serialization cannot fail.
        toml::to_string(&ConfigFile::from(self)).unwrap_or_default()
    }

    /// Reject values the loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid("poll_interval must be greater than zero".into()));
        }
        if self.animation_interval.is_zero() {
            return Err(ConfigError::Invalid("animation_interval must be greater than zero".into()));
        }
        Ok(())
    }
}

/// On-disk shape of [`SystemConfig`].
#[derive(Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    poll_interval_ms: u64,
    animation_interval_ms: u64,
    tab_focus: bool,
    exit_on_ctrl_c: bool,
    screen: ScreenSection,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ScreenSection {
    alternate_screen: bool,
    hide_cursor: bool,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::from(&SystemConfig::default())
    }
}

impl Default for ScreenSection {
    fn default() -> Self {
        let defaults = SystemConfig::default();
        Self {
            alternate_screen: defaults.alternate_screen,
            hide_cursor: defaults.hide_cursor,
        }
    }
}

impl From<&SystemConfig> for ConfigFile {
    fn from(config: &SystemConfig) -> Self {
        Self {
            poll_interval_ms: u64::try_from(config.poll_interval.as_millis()).unwrap_or(u64::MAX),
            animation_interval_ms: u64::try_from(config.animation_interval.as_millis()).unwrap_or(u64::MAX),
            tab_focus: config.tab_focus,
            exit_on_ctrl_c: config.exit_on_ctrl_c,
            screen: ScreenSection {
                alternate_screen: config.alternate_screen,
                hide_cursor: config.hide_cursor,
            },
        }
    }
}

impl From<ConfigFile> for SystemConfig {
    fn from(file: ConfigFile) -> Self {
        Self {
            poll_interval: Duration::from_millis(file.poll_interval_ms),
            animation_interval: Duration::from_millis(file.animation_interval_ms),
            tab_focus: file.tab_focus,
            alternate_screen: file.screen.alternate_screen,
            hide_cursor: file.screen.hide_cursor,
            exit_on_ctrl_c: file.exit_on_ctrl_c,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = SystemConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(50));
        assert_eq!(config.animation_interval, Duration::from_millis(16));
        assert!(config.tab_focus && config.exit_on_ctrl_c);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(SystemConfig::from_toml_str("").unwrap(), SystemConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = SystemConfig::from_toml_str(
            r#"
            poll_interval_ms = 20
            tab_focus = false

            [screen]
            alternate_screen = false
            "#,
        )
        .unwrap();
        assert_eq!(config.poll_interval, Duration::from_millis(20));
        assert!(!config.tab_focus);
        assert!(!config.alternate_screen);
        assert!(config.hide_cursor);
    }

    #[test]
    fn test_zero_interval_is_invalid() {
        let err = SystemConfig::from_toml_str("animation_interval_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unknown_key_is_a_parse_error() {
        let err = SystemConfig::from_toml_str("poll_interval = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = SystemConfig::default()
            .with_poll_interval(Duration::from_millis(5))
            .with_exit_on_ctrl_c(false);
        let parsed = SystemConfig::from_toml_str(&config.to_toml_string()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "animation_interval_ms = 33").unwrap();

        let config = SystemConfig::load(file.path()).unwrap();
        assert_eq!(config.animation_interval, Duration::from_millis(33));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SystemConfig::load("/nonexistent/trellis.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read(_)));
    }
}

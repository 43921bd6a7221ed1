//! Configuration management (rendertest.toml)
//!
//! Settings are stored in TOML format in the platform-specific config
//! directory, or in a file named on the command line.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file name inside [`config_dir`]
pub const CONFIG_FILE: &str = "rendertest.toml";

/// Errors reading an explicitly requested config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Window and presentation settings
    #[serde(default)]
    pub video: VideoConfig,
    /// Asset lookup settings
    #[serde(default)]
    pub assets: AssetConfig,
}

/// Video configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Window width in logical pixels (default: 640)
    #[serde(default = "default_width")]
    pub width: u32,
    /// Window height in logical pixels (default: 480)
    #[serde(default = "default_height")]
    pub height: u32,
    /// Whether to enable vertical sync (default: true)
    #[serde(default = "default_true")]
    pub vsync: bool,
}

/// Asset configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AssetConfig {
    /// Extra directories searched for test assets, in order
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,
}

fn default_width() -> u32 {
    640
}
fn default_height() -> u32 {
    480
}
fn default_true() -> bool {
    true
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            vsync: default_true(),
        }
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\rendertest\config`
/// On macOS: `~/Library/Application Support/org.rendertest.rendertest`
/// On Linux: `~/.config/rendertest`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("org", "rendertest", "rendertest")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration from the config directory.
///
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    let Some(path) = config_dir().map(|dir| dir.join(CONFIG_FILE)) else {
        return Config::default();
    };
    if !path.is_file() {
        return Config::default();
    }
    load_from(&path).unwrap_or_else(|e| {
        tracing::warn!("{}, using defaults", e);
        Config::default()
    })
}

/// Loads the configuration from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or sets a
/// zero window size.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if config.video.width == 0 || config.video.height == 0 {
        return Err(ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: format!(
                "window size must be non-zero, got {}x{}",
                config.video.width, config.video.height
            ),
        });
    }

    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.video.width, 640);
        assert_eq!(config.video.height, 480);
        assert!(config.video.vsync);
        assert!(config.assets.search_paths.is_empty());
    }

    #[test]
    fn test_config_deserialize_empty() {
        // Empty TOML should produce defaults
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_deserialize_partial_video() {
        let toml_str = r#"
[video]
vsync = false
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(!config.video.vsync);
        assert_eq!(config.video.width, 640); // default
    }

    #[test]
    fn test_config_deserialize_assets() {
        let toml_str = r#"
[assets]
search_paths = ["/opt/rendertest", "media"]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.assets.search_paths,
            vec![PathBuf::from("/opt/rendertest"), PathBuf::from("media")]
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[video]\nwidth = 800\nheight = 600\n").unwrap();

        let config = load_from(&path).unwrap();
        assert_eq!(config.video.width, 800);
        assert_eq!(config.video.height, 600);
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_from(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_from_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[video\nwidth = ").unwrap();
        assert!(matches!(load_from(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_from_zero_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[video]\nwidth = 0\n").unwrap();
        assert!(matches!(load_from(&path), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_config_serialize_roundtrip() {
        let config = Config {
            video: VideoConfig {
                width: 1280,
                height: 720,
                vsync: false,
            },
            assets: AssetConfig {
                search_paths: vec![PathBuf::from("media")],
            },
        };
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }
}

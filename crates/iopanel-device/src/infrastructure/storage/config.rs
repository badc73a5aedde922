//! TOML-based configuration for the device application.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\IoPanel\config.toml`
//! - Linux:    `~/.config/iopanel/config.toml`
//! - macOS:    `~/Library/Application Support/IoPanel/config.toml`
//!
//! Example:
//!
//! ```toml
//! [device]
//! log_level = "debug"
//! run_in_background = false
//!
//! [network]
//! server_address = "10.0.0.24"
//! default_port = 1976
//! heartbeat_interval_secs = 30
//!
//! [canvas]
//! width = 1080
//! height = 1920
//! ```
//!
//! Every field has a `#[serde(default = "...")]`, so a missing file, a
//! missing section or a missing key all fall back to the built-in value.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub canvas: CanvasConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceConfig {
    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Initial value of the run-in-background preference.  The persisted
    /// preference in `state.toml` wins once it exists.
    #[serde(default)]
    pub run_in_background: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    /// IP literal or hostname of the server.
    #[serde(default = "default_server_address")]
    pub server_address: String,
    /// Port used when `server_address` is an IP literal.
    #[serde(default = "default_port")]
    pub default_port: u16,
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,
    /// HTTP path that returns the server's UDP port for hostname targets.
    #[serde(default = "default_port_lookup_path")]
    pub port_lookup_path: String,
    #[serde(default = "default_lookup_timeout_secs")]
    pub lookup_timeout_secs: u64,
}

/// Size of the render surface before the presentation layer reports one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanvasConfig {
    #[serde(default = "default_canvas_side")]
    pub width: f32,
    #[serde(default = "default_canvas_side")]
    pub height: f32,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_server_address() -> String {
    "10.0.0.24".to_string()
}
fn default_port() -> u16 {
    1976
}
fn default_heartbeat_interval_secs() -> u64 {
    30
}
fn default_port_lookup_path() -> String {
    "/services/routes/phone-iot/port".to_string()
}
fn default_lookup_timeout_secs() -> u64 {
    5
}
fn default_canvas_side() -> f32 {
    50.0
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            run_in_background: false,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            server_address: default_server_address(),
            default_port: default_port(),
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
            port_lookup_path: default_port_lookup_path(),
            lookup_timeout_secs: default_lookup_timeout_secs(),
        }
    }
}

impl NetworkConfig {
    /// Heartbeat period, never shorter than one second.
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs.max(1))
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_canvas_side(),
            height: default_canvas_side(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for config and state files.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the base directory
/// cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot
/// be determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the platform config file.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning the defaults if the file does
/// not exist yet.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Persists `config` to the platform config file.
///
/// # Errors
///
/// See [`save_config_to`].
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &config_file_path()?)
}

/// Writes `config` to `path`, creating the directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("IoPanel"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("iopanel"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("IoPanel")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("iopanel_test_{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_app_config_default_network_values() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.network.server_address, "10.0.0.24");
        assert_eq!(cfg.network.default_port, 1976);
        assert_eq!(cfg.network.heartbeat_interval(), Duration::from_secs(30));
        assert_eq!(cfg.network.port_lookup_path, "/services/routes/phone-iot/port");
    }

    #[test]
    fn test_device_config_defaults() {
        let cfg = DeviceConfig::default();
        assert_eq!(cfg.log_level, "info");
        assert!(!cfg.run_in_background);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        // Arrange
        let toml_str = r#"
[network]
server_address = "panel.example.org"
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.network.server_address, "panel.example.org");
        assert_eq!(cfg.network.default_port, 1976);
        assert_eq!(cfg.canvas, CanvasConfig::default());
    }

    #[test]
    fn test_zero_heartbeat_interval_is_raised_to_one_second() {
        let cfg = NetworkConfig {
            heartbeat_interval_secs: 0,
            ..NetworkConfig::default()
        };
        assert_eq!(cfg.heartbeat_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_invalid_toml_returns_parse_error() {
        let result: Result<AppConfig, toml::de::Error> = toml::from_str("[[[ not valid toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_from_missing_file_returns_defaults() {
        let path = temp_dir().join("config.toml");
        let cfg = load_config_from(&path).expect("missing file is not an error");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        // Arrange
        let dir = temp_dir();
        let path = dir.join("config.toml");
        let mut cfg = AppConfig::default();
        cfg.device.log_level = "debug".to_string();
        cfg.network.heartbeat_interval_secs = 10;
        cfg.canvas.width = 1080.0;

        // Act
        save_config_to(&cfg, &path).expect("save");
        let loaded = load_config_from(&path).expect("load");

        // Assert
        assert_eq!(loaded, cfg);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(path.ends_with("config.toml"), "got {path:?}");
        }
    }
}

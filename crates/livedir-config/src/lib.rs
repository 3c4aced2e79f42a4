//! Configuration management for livedir.
//!
//! Parses `livedir.toml` configuration files with serde and provides
//! auto-discovery of config files starting at the served directory and
//! walking up through its parents.
//!
//! CLI settings are applied during load via [`CliSettings`]. Every field is
//! optional, so running without any config file yields the defaults:
//! `127.0.0.1:3000`, live reload on, and the built-in watch ignore list.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "livedir.toml";

/// Port used when neither the config file nor the CLI provide a usable one.
pub const DEFAULT_PORT: u16 = 3000;

/// Path components whose changes never trigger a reload.
///
/// Always applied; `live_reload.ignore` only extends this list. Entries match
/// whole path components, so `.gitignore` still triggers a reload.
pub const DEFAULT_IGNORE: &[&str] = &[".git", "node_modules"];

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the served root directory.
    pub root_dir: Option<PathBuf>,
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override live reload enabled flag.
    pub live_reload_enabled: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Live reload configuration.
    pub live_reload: LiveReloadConfig,

    /// Directory served over HTTP and watched for changes (set after loading).
    #[serde(skip)]
    pub root_dir: PathBuf,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_root(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: DEFAULT_PORT,
        }
    }
}

/// Live reload configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LiveReloadConfig {
    /// Whether live reload is enabled.
    pub enabled: bool,
    /// Extra path components to ignore, on top of [`DEFAULT_IGNORE`].
    pub ignore: Vec<String>,
}

impl Default for LiveReloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ignore: Vec::new(),
        }
    }
}

impl LiveReloadConfig {
    /// Full ignore list: the built-in entries followed by configured extras.
    #[must_use]
    pub fn ignore_list(&self) -> Vec<String> {
        DEFAULT_IGNORE
            .iter()
            .map(|s| (*s).to_owned())
            .chain(
                self.ignore
                    .iter()
                    .filter(|extra| !DEFAULT_IGNORE.contains(&extra.as_str()))
                    .cloned(),
            )
            .collect()
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

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise, searches
    /// for `livedir.toml` in the served root directory and its parents. The
    /// root directory is taken from `cli_settings`, falling back to the
    /// current working directory.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let root_dir = match cli_settings.and_then(|s| s.root_dir.clone()) {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };

        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) =
            Self::discover_config(&root_dir.canonicalize().unwrap_or_else(|_| root_dir.clone()))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };
        config.root_dir = root_dir;

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root_dir) = &settings.root_dir {
            self.root_dir.clone_from(root_dir);
        }
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(live_reload_enabled) = settings.live_reload_enabled {
            self.live_reload.enabled = live_reload_enabled;
        }
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config serving the given directory.
    fn default_with_root(root_dir: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            live_reload: LiveReloadConfig::default(),
            root_dir: root_dir.to_path_buf(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        for entry in &self.live_reload.ignore {
            require_non_empty(entry, "live_reload.ignore entry")?;
        }

        Ok(())
    }
}

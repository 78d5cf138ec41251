//! Configuration loader using figment.
//!
//! # Feature Flags
//!
//! - `toml-config`: enables TOML configuration files (`wallace.toml`, `config.toml`)
//! - `yaml-config`: enables YAML configuration files (`wallace.yaml`, `wallace.yml`, etc.)
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Programmatic overrides passed to [`ConfigLoader::merge`]
//! 3. Profile-specific config file (`wallace.{profile}.toml`), read only
//!    alongside a main file in the same directory
//! 4. Main config file (`wallace.toml`)
//! 5. Environment variables (`WALLACE_*`)
//!
//! # Environment Variable Mapping
//!
//! Environment variables use the `WALLACE_` prefix with `__` as separator:
//!
//! - `WALLACE_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `WALLACE_BOT__TOKEN=xoxb-...` → `bot.token = "xoxb-..."`
//! - `WALLACE_DISPATCH__QUEUE_CAPACITY=64` → `dispatch.queue_capacity = 64`
//!
//! # Example
//!
//! ```rust,ignore
//! use wallace_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .file("./config/wallace.toml")
//!     .with_env()
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::WallaceConfig;
use super::validation::validate_config;

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    /// Development profile (default).
    #[default]
    Development,
    /// Production profile.
    Production,
    /// Custom profile name.
    Custom(String),
}

impl Profile {
    /// Returns the profile name as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Parses a profile name, accepting the usual abbreviations.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Reads `WALLACE_PROFILE`, defaulting to Development.
    pub fn from_env() -> Self {
        std::env::var("WALLACE_PROFILE")
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration loader with figment-based multi-source support.
pub struct ConfigLoader {
    figment: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a new configuration loader with defaults.
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::parse(profile.as_ref());
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Adds current directory to search paths.
    pub fn with_current_dir(self) -> Self {
        if let Ok(cwd) = std::env::current_dir() {
            self.search_path(cwd)
        } else {
            self
        }
    }

    /// Adds user config directory to search paths.
    pub fn with_user_config_dir(self) -> Self {
        if let Some(config_dir) = dirs::config_dir() {
            self.search_path(config_dir.join("wallace"))
        } else {
            self
        }
    }

    /// Sets a specific configuration file to load.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables loading environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: WallaceConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Loads, validates and returns the configuration.
    pub fn load(self) -> ConfigResult<WallaceConfig> {
        let profile = self.profile.clone();
        let config: WallaceConfig = self.into_figment()?.extract()?;
        validate_config(&config)?;

        debug!(
            profile = %profile,
            bot = %config.bot.name,
            logging_level = %config.logging.level,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    fn into_figment(self) -> ConfigResult<Figment> {
        let files = match &self.config_file {
            Some(path) if path.exists() => vec![path.clone()],
            Some(path) => return Err(ConfigError::FileNotFound(path.clone())),
            None => self.discover_files(),
        };
        if files.is_empty() {
            warn!("No configuration file found, using defaults");
        }

        let mut figment =
            Figment::from(Serialized::defaults(WallaceConfig::default())).merge(self.figment);
        for path in &files {
            info!(path = %path.display(), "Loading configuration file");
            figment = merge_config_file(figment, path)?;
        }

        if self.load_env {
            trace!("Loading environment variables with WALLACE_ prefix");
            figment = figment.merge(Env::prefixed("WALLACE_").ignore(&["PROFILE"]).split("__"));
        }

        Ok(figment)
    }

    /// Finds `wallace.{profile}.<ext>` and `wallace.<ext>` (or `config.*`)
    /// in the first search path that has a base file, lowest priority first.
    fn discover_files(&self) -> Vec<PathBuf> {
        let search_paths = if self.search_paths.is_empty() {
            default_search_paths()
        } else {
            self.search_paths.clone()
        };

        for dir in &search_paths {
            for stem in CONFIG_STEMS {
                for ext in CONFIG_EXTENSIONS {
                    let base = dir.join(format!("{stem}.{ext}"));
                    if !base.exists() {
                        continue;
                    }
                    let profiled = dir.join(format!("{stem}.{}.{ext}", self.profile));
                    return if profiled.exists() {
                        vec![profiled, base]
                    } else {
                        vec![base]
                    };
                }
            }
        }
        Vec::new()
    }
}

const CONFIG_STEMS: &[&str] = &["wallace", "config"];

/// Extensions enabled by the `*-config` features.
const CONFIG_EXTENSIONS: &[&str] = &[
    #[cfg(feature = "toml-config")]
    "toml",
    #[cfg(feature = "yaml-config")]
    "yaml",
    #[cfg(feature = "yaml-config")]
    "yml",
];

fn default_search_paths() -> Vec<PathBuf> {
    std::env::current_dir()
        .ok()
        .into_iter()
        .chain(dirs::config_dir().map(|dir| dir.join("wallace")))
        .collect()
}

fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        #[cfg(feature = "toml-config")]
        "toml" => Ok(figment.merge(Toml::file(path))),
        #[cfg(feature = "yaml-config")]
        "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
        _ => Err(ConfigError::ParseError(format!(
            "Unsupported or disabled configuration file format: .{ext}"
        ))),
    }
}

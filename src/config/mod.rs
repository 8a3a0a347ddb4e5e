//! Logging advice configuration.
//!
//! Loaded from YAML files and `METHODLOG__*` environment variables.

use serde::Deserialize;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "methodlog.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "METHODLOG_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "METHODLOG";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "METHODLOG_LOG";

/// Main configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which calls are advised.
    pub advice: AdviceConfig,
    /// Bounds on rendered arguments and return values.
    pub render: RenderConfig,
}

/// Advice configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdviceConfig {
    /// When false, advised calls run without emitting entries.
    pub enabled: bool,
    /// Path prefix for the namespace rule, e.g. `billing` or `shop::orders`.
    pub namespace: String,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            namespace: String::new(),
        }
    }
}

/// Rendering limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Nesting levels rendered before values collapse to `...`.
    ///
    /// Must be at least 1: unlike `max_len` there is no unlimited setting,
    /// since the depth limit is what ends self-referencing values. Loaded
    /// configuration rejects 0; a hand-built `RenderConfig` with 0 renders
    /// every value as `...`.
    pub max_depth: usize,
    /// Maximum rendered length per value in bytes (0 = unlimited).
    pub max_len: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            max_len: 4096,
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `methodlog.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the types cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "render.max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

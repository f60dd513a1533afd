use crate::cli::{Cli, VerbosityLevel};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

const CONFIG_NAMES: [&str; 4] = [
    "bulk-transform.toml",
    "bulk-transform.json",
    ".bulk-transform.toml",
    ".bulk-transform.json",
];

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub reporting: ReportingConfig,
    pub network: NetworkConfig,
}

/// Where and how much diagnostics are reported
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ReportingConfig {
    pub verbosity: VerbosityLevel,
    /// Diagnostics are appended here and non-fatal errors do not stop processing
    pub log_file: Option<PathBuf>,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// HTTP request timeout in seconds
    pub timeout_seconds: u64,
    /// Number of retry attempts for failed downloads
    pub retry_attempts: u32,
    /// Initial retry delay in milliseconds
    pub retry_delay_ms: u64,
    /// Upper bound for the doubling retry delay
    pub max_retry_delay_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            retry_attempts: 3,
            retry_delay_ms: 1000,
            max_retry_delay_ms: 30000,
        }
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: file -> environment -> CLI
    pub fn load_config(cli: &Cli) -> Result<Config> {
        let mut config = match &cli.config {
            Some(config_path) => Self::load_from_file(config_path)?,
            None => Self::find_config_file()?.unwrap_or_default(),
        };

        config = Self::apply_environment_overrides(config)?;
        config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;
        tracing::debug!(?config, "configuration loaded");

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find configuration file in standard locations
    pub fn find_config_file() -> Result<Option<Config>> {
        let app_config_dir = dirs::config_dir().map(|dir| dir.join("bulk-transform"));
        Self::find_config_file_in(&[PathBuf::new()], app_config_dir.as_deref())
    }

    /// Search `search_dirs` in order, then the optional application directory
    fn find_config_file_in(search_dirs: &[PathBuf], app_dir: Option<&Path>) -> Result<Option<Config>> {
        let candidates = search_dirs
            .iter()
            .map(PathBuf::as_path)
            .chain(app_dir)
            .flat_map(|dir| CONFIG_NAMES.iter().map(move |name| dir.join(name)));

        for path in candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "using configuration file");
                return Ok(Some(Self::load_from_file(&path)?));
            }
        }
        Ok(None)
    }

    /// Apply environment variable overrides using the system environment
    pub fn apply_environment_overrides(config: Config) -> Result<Config> {
        Self::apply_environment_overrides_with(&SystemEnvProvider, config)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        // Network settings
        if let Some(timeout) = env.get("BULK_TRANSFORM_TIMEOUT") {
            config.network.timeout_seconds = timeout.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid BULK_TRANSFORM_TIMEOUT value: {}", timeout))
            })?;
        }

        if let Some(retry_attempts) = env.get("BULK_TRANSFORM_RETRY_ATTEMPTS") {
            config.network.retry_attempts = retry_attempts.parse().map_err(|_| {
                ConfigError::Environment(format!(
                    "Invalid BULK_TRANSFORM_RETRY_ATTEMPTS value: {}",
                    retry_attempts
                ))
            })?;
        }

        // Reporting settings
        if let Some(log_file) = env.get("BULK_TRANSFORM_LOG_FILE") {
            config.reporting.log_file = Some(PathBuf::from(log_file));
        }

        let verbose = parse_flag(env, "BULK_TRANSFORM_VERBOSE")?;
        let quiet = parse_flag(env, "BULK_TRANSFORM_QUIET")?;
        match (verbose, quiet) {
            (Some(true), Some(true)) => {
                return Err(ConfigError::Validation(
                    "Cannot enable both verbose and quiet modes".to_string(),
                ));
            }
            (Some(true), _) => config.reporting.verbosity = VerbosityLevel::Verbose,
            (_, Some(true)) => config.reporting.verbosity = VerbosityLevel::Quiet,
            _ => {}
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if let Some(verbosity) = cli.verbosity() {
            config.reporting.verbosity = verbosity;
        }
        if let Some(log_file) = &cli.log_file {
            config.reporting.log_file = Some(log_file.clone());
        }
        config
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        if config.network.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        if config.network.retry_attempts > 10 {
            return Err(ConfigError::Validation(
                "Retry attempts cannot exceed 10".to_string(),
            ));
        }

        if config.network.max_retry_delay_ms < config.network.retry_delay_ms {
            return Err(ConfigError::Validation(
                "Maximum retry delay cannot be smaller than the retry delay".to_string(),
            ));
        }

        if let Some(log_file) = &config.reporting.log_file {
            if log_file.as_os_str().is_empty() {
                return Err(ConfigError::Validation(
                    "Log file path cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn parse_flag(env: &impl EnvProvider, key: &str) -> Result<Option<bool>> {
    env.get(key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::Environment(format!("Invalid {} value: {}", key, value)))
        })
        .transpose()
}

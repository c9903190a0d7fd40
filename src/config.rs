use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Application configuration loaded from fsm-harness.toml or environment variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub runner: RunnerConfig,
    pub logging: LoggingConfig,
}

/// Scheduler defaults; individual runs may override via CLI flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub max_threads: u32,
    pub allowed_spawn_failure_ratio: f64,
    pub run_timeout_seconds: u64,
    /// Run-wide iteration override applied when no --iterations flag is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_iterations: Option<u64>,
    /// Fixed RNG seed; runs draw a fresh one when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_threads: 32,
            allowed_spawn_failure_ratio: 0.0,
            run_timeout_seconds: 600,
            default_iterations: None,
            seed: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "error".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from fsm-harness.toml and environment variables
    /// Environment variables take precedence over file configuration
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, optionally from an explicit file path
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = RunnerConfig::default();
        let mut builder = Config::builder()
            // Start with default values
            .set_default("runner.max_threads", defaults.max_threads as i64)?
            .set_default(
                "runner.allowed_spawn_failure_ratio",
                defaults.allowed_spawn_failure_ratio,
            )?
            .set_default("runner.run_timeout_seconds", defaults.run_timeout_seconds)?
            .set_default("logging.filter", LoggingConfig::default().filter)?;

        builder = match path {
            // An explicit path must exist
            Some(path) => builder.add_source(File::from(path)),
            // Otherwise pick up fsm-harness.toml from the working directory if present
            None => builder.add_source(File::with_name("fsm-harness").required(false)),
        };

        let config = builder
            // Override with environment variables (FSM_* namespace)
            .add_source(config::Environment::with_prefix("FSM"))
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;

        // Check for specific environment variables with custom names
        if let Ok(max_threads) = env::var("FSM_MAX_THREADS") {
            app_config.runner.max_threads = max_threads.parse().map_err(|_| {
                ConfigError::Message(format!("FSM_MAX_THREADS is not a number: {}", max_threads))
            })?;
        }

        if let Ok(seed) = env::var("FSM_SEED") {
            app_config.runner.seed = Some(seed.parse().map_err(|_| {
                ConfigError::Message(format!("FSM_SEED is not a number: {}", seed))
            })?);
        }

        if let Ok(timeout) = env::var("FSM_RUN_TIMEOUT_SECONDS") {
            app_config.runner.run_timeout_seconds = timeout.parse().map_err(|_| {
                ConfigError::Message(format!(
                    "FSM_RUN_TIMEOUT_SECONDS is not a number: {}",
                    timeout
                ))
            })?;
        }

        if let Ok(filter) = env::var("FSM_LOG_FILTER") {
            app_config.logging.filter = filter;
        }

        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.runner.max_threads == 0 {
            return Err(ConfigError::Message(
                "runner.max_threads must be at least 1".to_string(),
            ));
        }
        let ratio = self.runner.allowed_spawn_failure_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(ConfigError::Message(format!(
                "runner.allowed_spawn_failure_ratio must be within [0, 1], got {}",
                ratio
            )));
        }
        if self.runner.run_timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "runner.run_timeout_seconds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Get default config values for CLI argument defaults
    pub fn get_defaults() -> Self {
        // Try to load config for defaults, but fall back if not found
        match Self::load() {
            Ok(config) => config,
            Err(_) => Self {
                runner: RunnerConfig::default(),
                logging: LoggingConfig::default(),
            },
        }
    }
}

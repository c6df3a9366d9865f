// api-fuzzing/src/config.rs
//! Fuzzer configuration
//!
//! Settings are layered: built-in defaults, then an optional JSON config
//! file, then `API_FUZZING_*` environment variables, then command-line flags.
//! Credentials are only ever taken from the file or the environment.

use crate::constants::{self, env_vars};
use crate::harness::Scenario;
use crate::utils;
use reqwest::Url;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while assembling the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Invalid timeout {value:?}: {source}")]
    InvalidTimeout {
        value: String,
        #[source]
        source: humantime::DurationError,
    },

    #[error("{0} must be at least 1")]
    Zero(&'static str),

    #[error("Timeout must be longer than zero")]
    ZeroTimeout,

    #[error("No scenarios selected")]
    NoScenarios,
}

/// Session and anti-forgery tokens of the account used for fuzzing
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    auth_token: String,
    csrf_token: String,
}

impl Credentials {
    pub fn new(auth_token: impl Into<String>, csrf_token: impl Into<String>) -> Self {
        Self {
            auth_token: auth_token.into(),
            csrf_token: csrf_token.into(),
        }
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    /// Whether both tokens were supplied
    pub fn is_complete(&self) -> bool {
        !self.auth_token.is_empty() && !self.csrf_token.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn mask(secret: &str) -> &'static str {
            if secret.is_empty() {
                "<unset>"
            } else {
                "<redacted>"
            }
        }

        f.debug_struct("Credentials")
            .field("auth_token", &mask(&self.auth_token))
            .field("csrf_token", &mask(&self.csrf_token))
            .finish()
    }
}

/// One layer of optional settings
///
/// This is also the schema of the JSON config file.
#[derive(Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub base_url: Option<String>,
    pub auth_token: Option<String>,
    pub csrf_token: Option<String>,
    /// Per-request timeout, e.g. `"5s"` or `"750ms"`
    pub timeout: Option<String>,
    pub rounds: Option<usize>,
    pub seed: Option<u64>,
    pub workers: Option<usize>,
    pub scenarios: Option<Vec<Scenario>>,
}

impl ConfigLayer {
    /// Read a layer from a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::info!("Reading config from {}", path.display());

        let raw = std::fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_slice(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a layer from the `API_FUZZING_*` environment variables
    pub fn from_env() -> Self {
        Self {
            base_url: utils::env_string(env_vars::BASE_URL),
            auth_token: utils::env_string(env_vars::AUTH_TOKEN),
            csrf_token: utils::env_string(env_vars::CSRF_TOKEN),
            timeout: utils::env_string(env_vars::TIMEOUT),
            rounds: utils::env_parse(env_vars::ROUNDS),
            seed: utils::env_parse(env_vars::SEED),
            workers: utils::env_parse(env_vars::WORKERS),
            scenarios: None,
        }
    }

    /// Stack `upper` on top of this layer; values set in `upper` win
    pub fn overlay(self, upper: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            base_url: upper.base_url.or(self.base_url),
            auth_token: upper.auth_token.or(self.auth_token),
            csrf_token: upper.csrf_token.or(self.csrf_token),
            timeout: upper.timeout.or(self.timeout),
            rounds: upper.rounds.or(self.rounds),
            seed: upper.seed.or(self.seed),
            workers: upper.workers.or(self.workers),
            scenarios: upper.scenarios.or(self.scenarios),
        }
    }
}

/// Fully resolved fuzzer configuration
#[derive(Debug, Clone)]
pub struct FuzzConfig {
    /// Base URL of the target service, without a trailing slash
    pub base_url: String,
    pub credentials: Credentials,
    /// Per-request timeout
    pub timeout: Duration,
    /// Number of passes through the enabled scenarios
    pub rounds: usize,
    /// Seed of the random source; a fresh one is drawn when unset
    pub seed: Option<u64>,
    /// Number of worker threads sharing the rounds
    pub workers: usize,
    /// Enabled scenarios, in execution order
    pub scenarios: Vec<Scenario>,
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_BASE_URL.to_string(),
            credentials: Credentials::default(),
            timeout: Duration::from_secs(constants::DEFAULT_TIMEOUT_SECS),
            rounds: constants::DEFAULT_ROUNDS,
            seed: None,
            workers: constants::DEFAULT_WORKERS,
            scenarios: Scenario::ALL.to_vec(),
        }
    }
}

impl FuzzConfig {
    /// Load every layer: config file (if any), environment, then `cli`
    pub fn load(config_file: Option<&Path>, cli: ConfigLayer) -> Result<Self, ConfigError> {
        let file = match config_file {
            Some(path) => ConfigLayer::from_file(path)?,
            None => ConfigLayer::default(),
        };

        Self::from_layer(file.overlay(ConfigLayer::from_env()).overlay(cli))
    }

    /// Resolve a layer against the defaults and validate the result
    pub fn from_layer(layer: ConfigLayer) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let base_url = match layer.base_url {
            Some(url) => validate_base_url(&url)?,
            None => defaults.base_url,
        };

        let timeout = match layer.timeout {
            Some(value) => utils::parse_duration(&value)
                .map_err(|source| ConfigError::InvalidTimeout { value, source })?,
            None => defaults.timeout,
        };
        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        let rounds = layer.rounds.unwrap_or(defaults.rounds);
        if rounds == 0 {
            return Err(ConfigError::Zero("rounds"));
        }

        let workers = layer.workers.unwrap_or(defaults.workers);
        if workers == 0 {
            return Err(ConfigError::Zero("workers"));
        }

        let scenarios = match layer.scenarios {
            // Keep the canonical order and drop duplicates
            Some(selected) => Scenario::ALL
                .iter()
                .copied()
                .filter(|scenario| selected.contains(scenario))
                .collect(),
            None => defaults.scenarios,
        };
        if scenarios.is_empty() {
            return Err(ConfigError::NoScenarios);
        }

        let credentials = Credentials::new(
            layer.auth_token.unwrap_or_default(),
            layer.csrf_token.unwrap_or_default(),
        );

        Ok(Self {
            base_url,
            credentials,
            timeout,
            rounds,
            seed: layer.seed,
            workers,
            scenarios,
        })
    }
}

fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme {:?}", other))),
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

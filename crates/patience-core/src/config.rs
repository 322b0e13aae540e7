//! Retry configuration loaded from TOML
//!
//! ```toml
//! max_attempts = 5
//! retry_statuses = [429, 503]
//! max_retry_after_secs = 120
//! http_dates = true
//!
//! [fallback]
//! kind = "exponential"
//! min_ms = 500
//! max_ms = 30000
//! jitter = true
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::retry::{
    FallbackWait, RetryIfStatus, Retrying, StopAfterAttempt, WaitExponential, WaitFixed,
    WaitRandom, WaitRetryAfter,
};

/// Orchestrator type produced by [`RetryConfig::build`]
pub type ConfiguredRetrying =
    Retrying<RetryIfStatus, WaitRetryAfter<FallbackWait>, StopAfterAttempt>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Fallback wait used when a response carries no usable `Retry-After`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackConfig {
    Fixed {
        #[serde(default = "default_fixed_secs")]
        secs: u64,
    },
    Exponential {
        min_ms: u64,
        max_ms: u64,
        #[serde(default = "default_multiplier")]
        multiplier: f64,
        #[serde(default)]
        jitter: bool,
    },
    Random {
        min_ms: u64,
        max_ms: u64,
    },
}

fn default_fixed_secs() -> u64 {
    1
}

fn default_multiplier() -> f64 {
    2.0
}

impl Default for FallbackConfig {
    fn default() -> Self {
        FallbackConfig::Fixed {
            secs: default_fixed_secs(),
        }
    }
}

impl FallbackConfig {
    pub fn to_wait(&self) -> FallbackWait {
        match *self {
            FallbackConfig::Fixed { secs } => FallbackWait::Fixed(WaitFixed::from_secs(secs)),
            FallbackConfig::Exponential {
                min_ms,
                max_ms,
                multiplier,
                jitter,
            } => FallbackWait::Exponential(
                WaitExponential::new(Duration::from_millis(min_ms), Duration::from_millis(max_ms))
                    .with_multiplier(multiplier)
                    .with_jitter(jitter),
            ),
            FallbackConfig::Random { min_ms, max_ms } => FallbackWait::Random(WaitRandom::new(
                Duration::from_millis(min_ms),
                Duration::from_millis(max_ms),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Statuses worth retrying
    pub retry_statuses: Vec<u16>,
    /// Upper bound on a server-supplied `Retry-After`
    pub max_retry_after_secs: Option<u64>,
    /// Accept the HTTP-date form of `Retry-After`
    pub http_dates: bool,
    pub fallback: FallbackConfig,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_statuses: vec![429],
            max_retry_after_secs: None,
            http_dates: false,
            fallback: FallbackConfig::default(),
        }
    }
}

impl RetryConfig {
    /// `<config dir>/patience/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("patience").join("config.toml"))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RetryConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                info!("Loading retry config from {:?}", path);
                Self::from_toml_str(&content)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No config at {:?}, using defaults", path);
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.retry_statuses.is_empty() {
            return Err(ConfigError::Invalid(
                "retry_statuses must not be empty".to_string(),
            ));
        }
        if let FallbackConfig::Exponential { min_ms: 0, .. } = self.fallback {
            // A zero base never grows, so every retry would be immediate
            return Err(ConfigError::Invalid(
                "exponential fallback min_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the retry orchestrator described by this config
    pub fn build(&self) -> ConfiguredRetrying {
        let mut wait =
            WaitRetryAfter::new(self.fallback.to_wait()).with_http_dates(self.http_dates);
        if let Some(secs) = self.max_retry_after_secs {
            wait = wait.with_max_wait(Duration::from_secs(secs));
        }

        Retrying::new(
            RetryIfStatus::new(self.retry_statuses.iter().copied()),
            wait,
            StopAfterAttempt(self.max_attempts),
        )
    }
}

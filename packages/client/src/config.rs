//! Backend connection configuration.
//!
//! Defaults are embedded from `config/default.toml` at compile time and can
//! be overridden through environment variables:
//!
//! | variable | meaning |
//! |---|---|
//! | `BACKEND_URL` | backend base URL |
//! | `PARKING_SPOTTER_ENV` | `development` or `production` |
//! | `PARKING_SPOTTER_TIMEOUT_MS` | per-request timeout |
//! | `PARKING_SPOTTER_RETRY_ATTEMPTS` | reserved, see [`RetryPolicy`] |
//! | `PARKING_SPOTTER_RETRY_DELAY_MS` | reserved, see [`RetryPolicy`] |
//!
//! In production, plain `http://` base URLs are upgraded to `https://`.

use std::time::Duration;

use serde::Deserialize;

/// Environment variable holding the backend base URL.
pub const BACKEND_URL_VAR: &str = "BACKEND_URL";
/// Environment variable selecting the deployment environment.
pub const ENVIRONMENT_VAR: &str = "PARKING_SPOTTER_ENV";
/// Environment variable overriding the request timeout in milliseconds.
pub const TIMEOUT_MS_VAR: &str = "PARKING_SPOTTER_TIMEOUT_MS";
/// Environment variable overriding the reserved retry attempt count.
pub const RETRY_ATTEMPTS_VAR: &str = "PARKING_SPOTTER_RETRY_ATTEMPTS";
/// Environment variable overriding the reserved retry delay in milliseconds.
pub const RETRY_DELAY_MS_VAR: &str = "PARKING_SPOTTER_RETRY_DELAY_MS";

const DEFAULT_TOML: &str = include_str!("../config/default.toml");

/// Errors from building a [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The embedded defaults could not be parsed.
    #[error("Invalid default configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// An override has an unusable value.
    #[error("Invalid value {value:?} for {name}: {message}")]
    InvalidValue {
        /// Name of the setting or environment variable.
        name: String,
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        message: String,
    },
}

/// Deployment environment, which picks the fallback URL and whether
/// HTTPS is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Local development against an emulator-reachable backend.
    Development,
    /// Release builds against the hosted backend.
    Production,
}

impl Environment {
    /// Environment implied by the build profile.
    #[must_use]
    pub const fn from_build() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Production
        }
    }

    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(ConfigError::InvalidValue {
                name: ENVIRONMENT_VAR.to_string(),
                value: value.to_string(),
                message: "expected 'development' or 'production'".to_string(),
            }),
        }
    }
}

/// Retry settings carried by the configuration.
///
/// Reserved: no request is retried. Failures are terminal until the user
/// starts a new search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of attempts.
    pub attempts: u32,
    /// Delay between attempts.
    pub delay: Duration,
}

/// Resolved backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Environment the settings were resolved for.
    pub environment: Environment,
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Path of the nearest-cameras endpoint.
    pub nearest_path: String,
    /// Path of the address search endpoint.
    pub search_path: String,
    /// Per-request timeout applied by the HTTP client.
    pub request_timeout: Duration,
    /// Reserved retry settings.
    pub retry: RetryPolicy,
}

#[derive(Debug, Deserialize)]
struct DefaultsFile {
    backend: BackendDefaults,
}

#[derive(Debug, Deserialize)]
struct BackendDefaults {
    development_url: String,
    production_url: String,
    nearest_path: String,
    search_path: String,
    timeout_ms: u64,
    retry_attempts: u32,
    retry_delay_ms: u64,
}

impl ClientConfig {
    /// Resolves the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an environment override is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves the configuration using `lookup` to read overrides.
    ///
    /// Empty override values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the embedded defaults fail to parse or an
    /// override is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let environment = match read(ENVIRONMENT_VAR) {
            Some(value) => Environment::parse(&value)?,
            None => Environment::from_build(),
        };

        let mut config = Self::defaults(environment)?;

        if let Some(url) = read(BACKEND_URL_VAR) {
            config = config.with_base_url(&url)?;
        }
        if let Some(value) = read(TIMEOUT_MS_VAR) {
            config.request_timeout = Duration::from_millis(parse_millis(TIMEOUT_MS_VAR, &value)?);
        }
        if let Some(value) = read(RETRY_ATTEMPTS_VAR) {
            config.retry.attempts = value
                .trim()
                .parse::<u32>()
                .map_err(|e| ConfigError::InvalidValue {
                    name: RETRY_ATTEMPTS_VAR.to_string(),
                    value: value.clone(),
                    message: format!("{e}"),
                })?;
        }
        if let Some(value) = read(RETRY_DELAY_MS_VAR) {
            config.retry.delay = Duration::from_millis(parse_millis(RETRY_DELAY_MS_VAR, &value)?);
        }

        validate_timeout(config.request_timeout)?;

        log::debug!(
            "Backend config: {:?} {} (timeout {:?}, retry {}x{:?} reserved)",
            config.environment,
            config.base_url,
            config.request_timeout,
            config.retry.attempts,
            config.retry.delay,
        );

        Ok(config)
    }

    /// Returns the embedded defaults for `environment`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the embedded defaults are malformed.
    pub fn defaults(environment: Environment) -> Result<Self, ConfigError> {
        let DefaultsFile { backend } = toml::de::from_str(DEFAULT_TOML)?;

        let fallback_url = match environment {
            Environment::Development => backend.development_url,
            Environment::Production => backend.production_url,
        };

        let config = Self {
            environment,
            base_url: String::new(),
            nearest_path: backend.nearest_path,
            search_path: backend.search_path,
            request_timeout: Duration::from_millis(backend.timeout_ms),
            retry: RetryPolicy {
                attempts: backend.retry_attempts,
                delay: Duration::from_millis(backend.retry_delay_ms),
            },
        };

        config.with_base_url(&fallback_url)
    }

    /// Replaces the base URL, applying HTTPS enforcement for production and
    /// stripping trailing slashes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `url` is not an HTTP(S) URL.
    pub fn with_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                name: BACKEND_URL_VAR.to_string(),
                value: url.to_string(),
                message: "expected an http:// or https:// URL".to_string(),
            });
        }

        let url = match self.environment {
            Environment::Production => enforce_https(url),
            Environment::Development => url.to_string(),
        };

        self.base_url = url.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Full URL of the nearest-cameras endpoint.
    #[must_use]
    pub fn nearest_url(&self) -> String {
        format!("{}{}", self.base_url, self.nearest_path)
    }

    /// Full URL of the address search endpoint.
    #[must_use]
    pub fn search_url(&self) -> String {
        format!("{}{}", self.base_url, self.search_path)
    }
}

/// Upgrades a plain `http://` URL to `https://`.
#[must_use]
pub fn enforce_https(url: &str) -> String {
    url.strip_prefix("http://")
        .map_or_else(|| url.to_string(), |rest| format!("https://{rest}"))
}

fn parse_millis(name: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|e| ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
        message: format!("{e}"),
    })
}

fn validate_timeout(timeout: Duration) -> Result<(), ConfigError> {
    if timeout.is_zero() {
        return Err(ConfigError::InvalidValue {
            name: TIMEOUT_MS_VAR.to_string(),
            value: "0".to_string(),
            message: "timeout must be greater than zero".to_string(),
        });
    }
    Ok(())
}

//! Hosted backend configuration.
//!
//! Two values are required: the backend base URL and its anonymous API key.
//! Both come from the process environment, after an optional `.env` file in
//! the working directory has been loaded. Missing values are fatal; no client
//! is built without them.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};
use url::Url;
use zeroize::Zeroizing;

/// Environment variable holding the backend base URL.
pub const BACKEND_URL_VAR: &str = "TASKBOARD_BACKEND_URL";
/// Environment variable holding the backend anonymous API key.
pub const BACKEND_ANON_KEY_VAR: &str = "TASKBOARD_BACKEND_ANON_KEY";
/// Optional environment variable overriding the request timeout in seconds.
pub const BACKEND_TIMEOUT_VAR: &str = "TASKBOARD_BACKEND_TIMEOUT_SECS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while resolving backend configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("missing required configuration value {0}")]
    Missing(&'static str),

    /// The backend URL could not be parsed.
    #[error("invalid backend URL '{value}': {source}")]
    InvalidUrl {
        /// Raw configured value.
        value: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },

    /// The backend URL does not use HTTP or HTTPS.
    #[error("backend URL must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    /// The timeout override is not a positive whole number of seconds.
    #[error("invalid backend timeout '{0}', expected a positive number of seconds")]
    InvalidTimeout(String),
}

/// Connection settings for the hosted backend.
#[derive(Clone)]
pub struct BackendConfig {
    url: Url,
    anon_key: Zeroizing<String>,
    timeout: Duration,
}

impl BackendConfig {
    /// Builds a configuration from explicit values.
    ///
    /// The URL path is normalized to end with `/` so service paths join
    /// beneath it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when either value is blank or the URL is not a
    /// valid HTTP(S) URL.
    pub fn new(url: &str, anon_key: &str) -> Result<Self, ConfigError> {
        let raw_url = required(BACKEND_URL_VAR, Some(url))?;
        let key = required(BACKEND_ANON_KEY_VAR, Some(anon_key))?;
        Ok(Self {
            url: parse_base_url(&raw_url)?,
            anon_key: Zeroizing::new(key),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Loads `.env` when present, then reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a value
    /// is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through `lookup`, which maps variable names to
    /// values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a value
    /// is malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = required(BACKEND_URL_VAR, lookup(BACKEND_URL_VAR).as_deref())?;
        let key = required(BACKEND_ANON_KEY_VAR, lookup(BACKEND_ANON_KEY_VAR).as_deref())?;
        let timeout = match lookup(BACKEND_TIMEOUT_VAR) {
            Some(raw) => parse_timeout(&raw)?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            url: parse_base_url(&raw_url)?,
            anon_key: Zeroizing::new(key),
            timeout,
        })
    }

    /// Overrides the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the backend base URL, always ending with `/`.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the anonymous API key.
    #[must_use]
    pub fn anon_key(&self) -> &str {
        self.anon_key.as_str()
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn load_dotenv() {
    match dotenv::dotenv() {
        Ok(path) => debug!(path = %path.display(), "loaded environment file"),
        Err(err) if err.not_found() => {}
        Err(err) => warn!(error = %err, "ignoring unreadable environment file"),
    }
}

fn required(name: &'static str, value: Option<&str>) -> Result<String, ConfigError> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_owned)
        .ok_or(ConfigError::Missing(name))
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
        value: raw.to_owned(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme(url.scheme().to_owned()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|seconds| *seconds > 0)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::InvalidTimeout(raw.to_owned()))
}

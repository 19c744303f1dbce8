//! Client configuration
//!
//! A [`Config`] is assembled once, normalized (defaults filled in) and
//! validated, and is never mutated after it reaches a client.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::endpoint::Endpoint;
use crate::error::{ConfigError, Result};
use crate::logger::{DebugLogger, TracingLogger};

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default per-request time limit
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default lower bound for the delay between attempts
pub const DEFAULT_MIN_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Default upper bound for the delay between attempts
pub const DEFAULT_MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Default steady request rate
pub const DEFAULT_REQUESTS_PER_SECOND: f64 = 2.0;

/// Default token bucket capacity
pub const DEFAULT_BURST: u32 = 1;

/// Kind of access an operation needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

/// Describes the application using the client, rendered into the User-Agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub name: String,
    pub version: String,
    /// URL or email address where the application's operator can be reached
    pub contact: String,
}

impl Application {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            contact: contact.into(),
        }
    }

    /// User-Agent string for this application, e.g. `app/1.0.0 (+https://example.com)`
    ///
    /// Returns an empty string when any field is missing.
    pub fn user_agent(&self) -> String {
        if self.validate().is_err() {
            return String::new();
        }

        format!("{}/{} (+{})", self.name, self.version, self.contact)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::ApplicationNameRequired);
        }

        if self.version.trim().is_empty() {
            return Err(ConfigError::ApplicationVersionRequired);
        }

        if self.contact.trim().is_empty() {
            return Err(ConfigError::ApplicationContactRequired);
        }

        Ok(())
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new(
            "bunny-storage",
            env!("CARGO_PKG_VERSION"),
            "https://crates.io/crates/bunny-storage",
        )
    }
}

/// Configuration for a storage client
#[derive(Clone)]
pub struct Config {
    /// Application descriptor used to derive the User-Agent
    pub application: Option<Application>,

    /// Name of the storage zone to connect to
    pub storage_zone: String,

    /// Read-write key. The storage zone password doubles as this key.
    pub key: String,

    /// Optional read-only key, preferred for read operations when set
    pub read_only_key: Option<String>,

    /// Primary region of the storage zone
    pub endpoint: Option<Endpoint>,

    /// Overrides the base URL derived from `endpoint` (proxies, mock servers)
    pub endpoint_url: Option<Url>,

    /// Explicit User-Agent, derived from `application` when unset
    pub user_agent: Option<String>,

    /// Retries after the first attempt for transient failures
    pub max_retries: u32,

    /// Time limit for a single request
    pub timeout: Duration,

    pub min_retry_delay: Duration,
    pub max_retry_delay: Duration,

    /// Steady request rate of the client's token bucket
    pub requests_per_second: f64,

    /// Token bucket capacity
    pub burst: u32,

    /// Dump requests and responses to `logger`
    pub debug: bool,

    pub logger: Option<Arc<dyn DebugLogger>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            application: None,
            storage_zone: String::new(),
            key: String::new(),
            read_only_key: None,
            endpoint: None,
            endpoint_url: None,
            user_agent: None,
            max_retries: 0,
            timeout: Duration::ZERO,
            min_retry_delay: Duration::ZERO,
            max_retry_delay: Duration::ZERO,
            requests_per_second: 0.0,
            burst: 0,
            debug: false,
            logger: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("application", &self.application)
            .field("storage_zone", &self.storage_zone)
            .field("key", &redacted(&self.key))
            .field(
                "read_only_key",
                &self.read_only_key.as_deref().map(redacted),
            )
            .field("endpoint", &self.endpoint)
            .field("endpoint_url", &self.endpoint_url)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("timeout", &self.timeout)
            .field("min_retry_delay", &self.min_retry_delay)
            .field("max_retry_delay", &self.max_retry_delay)
            .field("requests_per_second", &self.requests_per_second)
            .field("burst", &self.burst)
            .field("debug", &self.debug)
            .field("logger", &self.logger)
            .finish()
    }
}

fn redacted(value: &str) -> &'static str {
    if value.is_empty() { "" } else { "[REDACTED]" }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Key to send for `op`.
    ///
    /// Reads prefer the read-only key when one is set; writes always use the
    /// read-write key. Empty only when no key is configured at all.
    pub fn access_key(&self, op: Operation) -> &str {
        if op == Operation::Read
            && let Some(key) = self.read_only_key.as_deref()
            && !key.is_empty()
        {
            return key;
        }

        &self.key
    }

    /// Fill in defaults for every unset field. Applying it twice changes nothing.
    pub fn normalized(mut self) -> Self {
        let application = self.application.take().unwrap_or_default();

        if self.user_agent.as_deref().is_none_or(str::is_empty) {
            let derived = application.user_agent();
            self.user_agent = if derived.is_empty() {
                Some(Application::default().user_agent())
            } else {
                Some(derived)
            };
        }

        self.application = Some(application);

        if self.max_retries < 1 {
            self.max_retries = DEFAULT_MAX_RETRIES;
        }

        if self.timeout.is_zero() {
            self.timeout = DEFAULT_TIMEOUT;
        }

        if self.min_retry_delay.is_zero() {
            self.min_retry_delay = DEFAULT_MIN_RETRY_DELAY;
        }

        if self.max_retry_delay.is_zero() {
            self.max_retry_delay = DEFAULT_MAX_RETRY_DELAY;
        }

        if self.max_retry_delay < self.min_retry_delay {
            self.max_retry_delay = self.min_retry_delay;
        }

        if !(self.requests_per_second > 0.0 && self.requests_per_second.is_finite()) {
            self.requests_per_second = DEFAULT_REQUESTS_PER_SECOND;
        }

        if self.burst < 1 {
            self.burst = DEFAULT_BURST;
        }

        if self.debug && self.logger.is_none() {
            self.logger = Some(Arc::new(TracingLogger));
        }

        self
    }

    /// Check the fields a client cannot work without
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.storage_zone.trim().is_empty() {
            return Err(ConfigError::StorageZoneRequired);
        }

        if self.key.is_empty() {
            return Err(ConfigError::KeyRequired);
        }

        let Some(endpoint) = self.endpoint else {
            return Err(ConfigError::EndpointRequired);
        };

        if !Endpoint::is_valid_id(endpoint.id()) {
            return Err(ConfigError::InvalidEndpoint(endpoint.id()));
        }

        if let Some(application) = &self.application {
            application.validate()?;
        }

        Ok(())
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> Option<Url> {
        match (&self.endpoint_url, self.endpoint) {
            (Some(url), _) => Some(url.clone()),
            (None, Some(endpoint)) => Some(endpoint.url()),
            (None, None) => None,
        }
    }
}

/// Builder for [`Config`]
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn application(mut self, application: Application) -> Self {
        self.config.application = Some(application);
        self
    }

    pub fn storage_zone(mut self, zone: impl Into<String>) -> Self {
        self.config.storage_zone = zone.into();
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.config.key = key.into();
        self
    }

    pub fn read_only_key(mut self, key: impl Into<String>) -> Self {
        self.config.read_only_key = Some(key.into());
        self
    }

    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.config.endpoint = Some(endpoint);
        self
    }

    pub fn endpoint_url(mut self, url: Url) -> Self {
        self.config.endpoint_url = Some(url);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn retry_delay(mut self, min: Duration, max: Duration) -> Self {
        self.config.min_retry_delay = min;
        self.config.max_retry_delay = max;
        self
    }

    pub fn rate_limit(mut self, requests_per_second: f64, burst: u32) -> Self {
        self.config.requests_per_second = requests_per_second;
        self.config.burst = burst;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    pub fn logger(mut self, logger: Arc<dyn DebugLogger>) -> Self {
        self.config.logger = Some(logger);
        self
    }

    /// Normalize and validate the configuration
    pub fn build(self) -> Result<Config> {
        let config = self.config.normalized();
        config.validate()?;
        Ok(config)
    }
}

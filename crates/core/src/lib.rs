//! bunny-core: Core library for the bunny.net Edge Storage client
//!
//! This crate provides the pieces every storage client needs, including:
//! - Endpoint registry and configuration with credential selection
//! - Error taxonomy and retry policy
//! - Token bucket rate limiting
//! - Debug logger capability
//! - StorageApi trait and the storage data types
//!
//! It does not depend on an HTTP client, so frontends can be tested
//! against a mock `StorageApi`.

pub mod checksum;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod logger;
pub mod ratelimit;
pub mod retry;
pub mod traits;
pub mod types;

pub use checksum::{compute_sha256, sha256_hex};
pub use config::{Application, Config, ConfigBuilder, Operation};
pub use endpoint::Endpoint;
pub use error::{ConfigError, Error, Result};
pub use logger::{DebugLogger, NoopLogger, TracingLogger};
pub use ratelimit::RateLimiter;
pub use retry::{
    RetryBuilder, RetryConfig, is_retryable_error, is_retryable_status, retry_with_backoff,
};
pub use traits::StorageApi;
pub use types::{Object, Response};

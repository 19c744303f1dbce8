//! bunny-storage: HTTP client for bunny.net Edge Storage
//!
//! Implements the `StorageApi` trait from bunny-core on top of reqwest,
//! with rate limiting, retries and redacted debug dumps.

pub mod client;
pub mod dump;
pub mod request;
pub mod transport;

pub use client::Client;
pub use dump::{REDACTED, Redaction, Redactor};
pub use request::{ACCESS_KEY, CHECKSUM, RequestFactory, RequestSpec, sanitize_filename};
pub use transport::Transport;

pub use bunny_core::{
    Application, Config, ConfigBuilder, ConfigError, DebugLogger, Endpoint, Error, NoopLogger,
    Object, Operation, Response, Result, StorageApi, TracingLogger, compute_sha256, sha256_hex,
};

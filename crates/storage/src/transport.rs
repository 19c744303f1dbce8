//! Rate-limited, retrying HTTP transport
//!
//! Every attempt waits for a rate limiter token, sends the request, and
//! reads the whole body before the connection goes back to the pool.
//! Transient statuses are turned into retryable errors so the retry
//! policy can try again.

use std::sync::Arc;

use bunny_core::{
    Config, DebugLogger, Error, RateLimiter, Response, Result, RetryBuilder, RetryConfig,
    is_retryable_error, is_retryable_status, retry_with_backoff,
};
use tokio_util::sync::CancellationToken;

use crate::dump::Redactor;
use crate::request::RequestSpec;

/// Sends [`RequestSpec`]s; cheap to share, internally synchronized
#[derive(Debug)]
pub struct Transport {
    http: reqwest::Client,
    limiter: RateLimiter,
    retry: RetryConfig,
    /// Present only in debug mode
    logger: Option<Arc<dyn DebugLogger>>,
    redactor: Redactor,
}

impl Transport {
    /// Build a transport from a normalized configuration
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout);
        if let Some(agent) = config.user_agent.as_deref() {
            builder = builder.user_agent(agent);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Request(format!("failed to build HTTP client: {e}")))?;

        let retry = RetryBuilder::new()
            .max_retries(config.max_retries)
            .initial_backoff_ms(millis(config.min_retry_delay))
            .max_backoff_ms(millis(config.max_retry_delay))
            .build();

        let logger = if config.debug {
            config.logger.clone()
        } else {
            None
        };

        Ok(Self {
            http,
            limiter: RateLimiter::new(config.requests_per_second, config.burst),
            retry,
            logger,
            redactor: Redactor::default(),
        })
    }

    /// Replace the redaction table used for debug dumps
    pub fn with_redactor(mut self, redactor: Redactor) -> Self {
        self.redactor = redactor;
        self
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Send `request`, retrying transient failures, until it succeeds,
    /// fails for good, or `cancel` fires.
    pub async fn send(&self, request: &RequestSpec, cancel: &CancellationToken) -> Result<Response> {
        retry_with_backoff(
            &self.retry,
            cancel,
            || self.attempt(request, cancel),
            is_retryable_error,
        )
        .await
    }

    async fn attempt(&self, request: &RequestSpec, cancel: &CancellationToken) -> Result<Response> {
        self.limiter.acquire(cancel).await?;

        if let Some(logger) = &self.logger {
            logger.log(&self.redactor.dump_request(request));
        }

        let mut builder = self
            .http
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        let outbound = builder
            .build()
            .map_err(|e| Error::Request(e.to_string()))?;

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = self.http.execute(outbound) => result.map_err(classify)?,
        };

        let status = response.status();
        let headers = response.headers().clone();

        // Reading to the end lets the connection be reused; dropping the
        // response closes it either way.
        let body = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = response.bytes() => match result {
                Ok(body) => body,
                Err(e) if is_retryable_status(status.as_u16()) => {
                    tracing::warn!(status = status.as_u16(), error = %e, "Failed to drain error response");
                    return Err(Error::ServerBusy(status.as_u16()));
                }
                Err(e) => return Err(Error::Drain(e.to_string())),
            },
        };

        if let Some(logger) = &self.logger {
            logger.log(&self.redactor.dump_response(status, &headers, &body));
        }

        tracing::debug!(
            method = %request.method,
            path = request.url.path(),
            status = status.as_u16(),
            bytes = body.len(),
            "Request completed"
        );

        if is_retryable_status(status.as_u16()) {
            return Err(Error::ServerBusy(status.as_u16()));
        }

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

/// Map a reqwest failure onto the retryable/final split
fn classify(err: reqwest::Error) -> Error {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        Error::Network(err.to_string())
    } else {
        Error::Request(err.to_string())
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use bunny_core::{Endpoint, NoopLogger};

    fn config() -> Config {
        Config::builder()
            .storage_zone("zone")
            .key("key")
            .endpoint(Endpoint::Falkenstein)
            .max_retries(5)
            .retry_delay(Duration::from_millis(250), Duration::from_secs(4))
            .build()
            .unwrap()
    }

    #[test]
    fn test_retry_policy_from_config() {
        let transport = Transport::new(&config()).unwrap();
        let retry = transport.retry_config();

        assert_eq!(retry.max_attempts, 6);
        assert_eq!(retry.initial_backoff_ms, 250);
        assert_eq!(retry.max_backoff_ms, 4000);
    }

    #[test]
    fn test_huge_retry_delay_saturates() {
        let config = Config {
            max_retry_delay: Duration::MAX,
            ..config()
        };
        let transport = Transport::new(&config).unwrap();

        assert_eq!(transport.retry_config().initial_backoff_ms, 250);
        assert_eq!(transport.retry_config().max_backoff_ms, u64::MAX);
    }

    #[test]
    fn test_logger_only_in_debug_mode() {
        let quiet = Config {
            logger: Some(Arc::new(NoopLogger)),
            ..config()
        };
        assert!(Transport::new(&quiet).unwrap().logger.is_none());

        let debug = Config {
            debug: true,
            ..config()
        }
        .normalized();
        assert!(Transport::new(&debug).unwrap().logger.is_some());
    }
}

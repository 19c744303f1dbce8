//! Edge Storage client
//!
//! Wraps the request factory and the transport and implements the
//! StorageApi trait from bunny-core.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bunny_core::{Config, ConfigError, Error, Object, Response, Result, StorageApi, sha256_hex};
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::dump::Redactor;
use crate::request::{RequestFactory, RequestSpec, sanitize_filename};
use crate::transport::Transport;

/// Client for one storage zone
///
/// Clone is cheap; clones share the connection pool and the rate limiter.
#[derive(Debug, Clone)]
pub struct Client {
    config: Arc<Config>,
    requests: RequestFactory,
    transport: Arc<Transport>,
    cancel: CancellationToken,
}

impl Client {
    /// Create a client, filling in configuration defaults and validating
    /// the result before anything is sent.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_redactor(config, Redactor::default())
    }

    /// Like [`Client::new`], with a custom redaction table for debug dumps
    pub fn with_redactor(config: Config, redactor: Redactor) -> Result<Self> {
        let config = config.normalized();
        config.validate()?;

        let base_url = config
            .base_url()
            .ok_or(Error::Config(ConfigError::EndpointRequired))?;
        let transport = Transport::new(&config)?.with_redactor(redactor);
        let config = Arc::new(config);

        tracing::debug!(
            storage_zone = %config.storage_zone,
            base_url = %base_url,
            max_retries = config.max_retries,
            "Created storage client"
        );

        Ok(Self {
            requests: RequestFactory::new(config.clone(), base_url),
            config,
            transport: Arc::new(transport),
            cancel: CancellationToken::new(),
        })
    }

    /// The normalized configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A clone whose operations stop with [`Error::Cancelled`] once `token` fires
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            cancel: token,
            ..self.clone()
        }
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    async fn execute(&self, request: RequestSpec) -> Result<Response> {
        self.transport.send(&request, &self.cancel).await
    }

    /// List the objects in directory `path`.
    ///
    /// A non-2xx answer yields an empty list alongside the response so the
    /// caller can inspect the status.
    pub async fn list(&self, path: &str) -> Result<(Vec<Object>, Response)> {
        let response = self.execute(self.requests.list(path)?).await?;

        if !response.is_success() {
            tracing::debug!(status = response.status.as_u16(), path, "Listing not successful");
            return Ok((Vec::new(), response));
        }

        let objects: Vec<Object> = serde_json::from_slice(&response.body)?;
        Ok((objects, response))
    }

    /// Download `filename` from `path`. A 404 is returned as a response,
    /// not as an error.
    pub async fn download(&self, path: &str, filename: &str) -> Result<(Bytes, Response)> {
        let response = self.execute(self.requests.download(path, filename)?).await?;
        Ok((response.body.clone(), response))
    }

    /// Upload `body` as `path/filename`. Expect 201 on success.
    pub async fn upload(
        &self,
        path: &str,
        filename: &str,
        checksum: &str,
        body: Bytes,
    ) -> Result<Response> {
        self.execute(self.requests.upload(path, filename, checksum, body)?)
            .await
    }

    /// Upload a local file under its base name, with its SHA-256 checksum
    pub async fn upload_file(&self, path: &str, file: impl AsRef<Path>) -> Result<Response> {
        let file = file.as_ref();
        let filename = file
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::InvalidPath(format!("no file name in {}", file.display())))?;
        let filename = sanitize_filename(filename)?.to_string();

        let data = Bytes::from(tokio::fs::read(file).await?);
        let checksum = sha256_hex(&data);

        self.upload(path, &filename, &checksum, data).await
    }

    /// Delete `path/filename`. Any 2xx status means the object is gone.
    pub async fn delete(&self, path: &str, filename: &str) -> Result<Response> {
        self.execute(self.requests.delete(path, filename)?).await
    }
}

#[async_trait]
impl StorageApi for Client {
    async fn list(&self, path: &str) -> Result<(Vec<Object>, Response)> {
        Client::list(self, path).await
    }

    async fn download(&self, path: &str, filename: &str) -> Result<(Bytes, Response)> {
        Client::download(self, path, filename).await
    }

    async fn upload(
        &self,
        path: &str,
        filename: &str,
        checksum: &str,
        body: Bytes,
    ) -> Result<Response> {
        Client::upload(self, path, filename, checksum, body).await
    }

    async fn delete(&self, path: &str, filename: &str) -> Result<Response> {
        Client::delete(self, path, filename).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bunny_core::{Application, Endpoint};

    fn config() -> Config {
        Config {
            storage_zone: "my-storage-zone".to_string(),
            key: "my-key".to_string(),
            read_only_key: Some("my-read-only-key".to_string()),
            endpoint: Some(Endpoint::Falkenstein),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_client() {
        let client = Client::new(config()).unwrap();
        assert_eq!(client.config().max_retries, 3);
        assert!(client.config().user_agent.is_some());

        let client = Client::new(Config {
            application: Some(Application::default()),
            debug: true,
            ..config()
        })
        .unwrap();
        assert!(client.config().logger.is_some());
    }

    #[test]
    fn test_new_client_rejects_invalid_config() {
        let cases = [
            (
                Config {
                    storage_zone: String::new(),
                    ..config()
                },
                ConfigError::StorageZoneRequired,
            ),
            (
                Config {
                    key: String::new(),
                    ..config()
                },
                ConfigError::KeyRequired,
            ),
            (
                Config {
                    endpoint: None,
                    ..config()
                },
                ConfigError::EndpointRequired,
            ),
            (
                Config {
                    application: Some(Application::new("app", "", "ops@example.com")),
                    ..config()
                },
                ConfigError::ApplicationVersionRequired,
            ),
        ];

        for (config, expected) in cases {
            match Client::new(config) {
                Err(Error::Config(err)) => assert_eq!(err, expected),
                other => panic!("expected {expected:?}, got {other:?}"),
            }
        }

        assert!(Client::new(Config::default()).is_err());
    }

    #[test]
    fn test_with_cancellation_shares_transport() {
        let client = Client::new(config()).unwrap();
        let token = CancellationToken::new();
        let bound = client.with_cancellation(token.clone());

        assert!(Arc::ptr_eq(&client.transport, &bound.transport));
        token.cancel();
        assert!(bound.cancellation_token().is_cancelled());
        assert!(!client.cancellation_token().is_cancelled());
    }

    #[tokio::test]
    async fn test_traversal_filename_rejected_before_sending() {
        let client = Client::new(config()).unwrap();
        let err = client.download("/testdata", "..").await.unwrap_err();
        assert!(matches!(err, Error::InvalidPath(_)));
    }
}

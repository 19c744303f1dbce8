//! Storage operations, independent of the HTTP client behind them
//!
//! Application-level statuses such as 404 are not errors here: callers
//! inspect [`Response::status`] themselves.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::types::{Object, Response};

#[async_trait]
pub trait StorageApi: Send + Sync {
    /// List the objects in the directory at `path`
    async fn list(&self, path: &str) -> Result<(Vec<Object>, Response)>;

    /// Fetch `filename` from `path`; the body is returned verbatim
    async fn download(&self, path: &str, filename: &str) -> Result<(Bytes, Response)>;

    /// Store `body` as `path/filename`. `checksum` is a hex SHA-256 of
    /// `body`; pass an empty string to send none.
    async fn upload(
        &self,
        path: &str,
        filename: &str,
        checksum: &str,
        body: Bytes,
    ) -> Result<Response>;

    /// Remove `path/filename`
    async fn delete(&self, path: &str, filename: &str) -> Result<Response>;
}

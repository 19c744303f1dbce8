//! Outbound request assembly
//!
//! Builds method, URL, headers and body for each storage operation and
//! stamps every request with the access key and User-Agent.

use std::sync::Arc;

use bunny_core::{Config, Error, Operation, Result};
use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE, HeaderName, HeaderValue, USER_AGENT};
use http::{HeaderMap, Method};
use url::Url;

/// Header carrying the storage zone key
pub const ACCESS_KEY: HeaderName = HeaderName::from_static("accesskey");

/// Header carrying the uppercase hex SHA-256 of an upload
pub const CHECKSUM: HeaderName = HeaderName::from_static("checksum");

/// A request ready to be sent, possibly more than once
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// Reduce a caller-supplied filename to its last path component.
///
/// `"../../etc/passwd"` becomes `"passwd"`. Names that reduce to nothing,
/// `.` or `..` are rejected.
pub fn sanitize_filename(name: &str) -> Result<&str> {
    let base = name
        .rsplit(['/', '\\'])
        .find(|part| !part.is_empty())
        .unwrap_or_default();

    match base {
        "" | "." | ".." => Err(Error::InvalidPath(format!("invalid filename: {name:?}"))),
        base => Ok(base),
    }
}

/// Directory components of `path`, leading slash stripped and `.` dropped.
///
/// A `..` component is rejected rather than resolved, so a directory path
/// can never climb out of the storage zone.
fn path_segments(path: &str) -> Result<Vec<&str>> {
    let mut segments = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                return Err(Error::InvalidPath(format!(
                    "directory must not contain '..': {path:?}"
                )));
            }
            segment => segments.push(segment),
        }
    }
    Ok(segments)
}

fn join(base: &Url, zone: &str, path: &str, filename: Option<&str>) -> Result<Url> {
    let directories = path_segments(path)?;
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| Error::InvalidPath(format!("base URL cannot hold a path: {base}")))?;
        segments.pop_if_empty().push(zone).extend(directories);
        match filename {
            Some(name) => segments.push(name),
            // Listing needs the trailing slash
            None => segments.push(""),
        };
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// URL of the directory `path` inside `zone`, with a trailing slash
pub fn directory_url(base: &Url, zone: &str, path: &str) -> Result<Url> {
    join(base, zone, path, None)
}

/// URL of `filename` inside directory `path` of `zone`
pub fn object_url(base: &Url, zone: &str, path: &str, filename: &str) -> Result<Url> {
    join(base, zone, path, Some(sanitize_filename(filename)?))
}

/// Builds [`RequestSpec`]s for one storage zone
#[derive(Debug, Clone)]
pub struct RequestFactory {
    config: Arc<Config>,
    base_url: Url,
}

impl RequestFactory {
    pub fn new(config: Arc<Config>, base_url: Url) -> Self {
        Self { config, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Assemble a request. The access key for `op` is always set; the
    /// User-Agent only when `headers` does not already carry one.
    pub fn build(
        &self,
        method: Method,
        url: Url,
        op: Operation,
        mut headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<RequestSpec> {
        let key = HeaderValue::from_str(self.config.access_key(op))
            .map_err(|_| Error::Request("access key is not a valid header value".to_string()))?;
        headers.insert(ACCESS_KEY, key);

        if !headers.contains_key(USER_AGENT)
            && let Some(agent) = self.config.user_agent.as_deref()
            && let Ok(value) = HeaderValue::from_str(agent)
        {
            headers.insert(USER_AGENT, value);
        }

        Ok(RequestSpec {
            method,
            url,
            headers,
            body,
        })
    }

    pub fn list(&self, path: &str) -> Result<RequestSpec> {
        let url = directory_url(&self.base_url, &self.config.storage_zone, path)?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        self.build(Method::GET, url, Operation::Read, headers, None)
    }

    pub fn download(&self, path: &str, filename: &str) -> Result<RequestSpec> {
        let url = object_url(&self.base_url, &self.config.storage_zone, path, filename)?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        self.build(Method::GET, url, Operation::Read, headers, None)
    }

    pub fn upload(
        &self,
        path: &str,
        filename: &str,
        checksum: &str,
        body: Bytes,
    ) -> Result<RequestSpec> {
        let url = object_url(&self.base_url, &self.config.storage_zone, path, filename)?;
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        );

        let checksum = checksum.trim();
        if !checksum.is_empty() {
            let value = HeaderValue::from_str(&checksum.to_uppercase())
                .map_err(|_| Error::Request(format!("invalid checksum: {checksum:?}")))?;
            headers.insert(CHECKSUM, value);
        }

        self.build(Method::PUT, url, Operation::Write, headers, Some(body))
    }

    pub fn delete(&self, path: &str, filename: &str) -> Result<RequestSpec> {
        let url = object_url(&self.base_url, &self.config.storage_zone, path, filename)?;
        self.build(Method::DELETE, url, Operation::Write, HeaderMap::new(), None)
    }
}

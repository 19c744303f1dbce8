//! Redacted request/response dumps for debug logging

use std::fmt::Write as _;

use http::header::{AUTHORIZATION, HeaderName};
use http::{HeaderMap, StatusCode};

use crate::request::{ACCESS_KEY, RequestSpec};

/// Replaces the value of masked headers
pub const REDACTED: &str = "[REDACTED]";

/// Bodies longer than this are cut off in dumps
pub const MAX_DUMP_BODY: usize = 4096;

/// What to do with a header in a dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redaction {
    /// Keep the header name, replace the value with [`REDACTED`]
    Mask,
    /// Leave the header out entirely
    Omit,
}

/// Header name to redaction rule table, shared by request and response dumps
#[derive(Debug, Clone)]
pub struct Redactor {
    rules: Vec<(HeaderName, Redaction)>,
}

impl Default for Redactor {
    fn default() -> Self {
        Self::empty()
            .rule(ACCESS_KEY, Redaction::Mask)
            .rule(AUTHORIZATION, Redaction::Mask)
    }
}

impl Redactor {
    /// A table without any rules
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add or replace the rule for `name`
    pub fn rule(mut self, name: HeaderName, redaction: Redaction) -> Self {
        self.rules.retain(|(existing, _)| *existing != name);
        self.rules.push((name, redaction));
        self
    }

    pub fn redaction_for(&self, name: &HeaderName) -> Option<Redaction> {
        self.rules
            .iter()
            .find(|(rule, _)| rule == name)
            .map(|(_, redaction)| *redaction)
    }

    pub fn dump_request(&self, request: &RequestSpec) -> String {
        let mut out = String::new();
        let mut target = request.url.path().to_string();
        if let Some(query) = request.url.query() {
            target.push('?');
            target.push_str(query);
        }

        let _ = writeln!(out, "{} {} HTTP/1.1", request.method, target);
        if let Some(host) = request.url.host_str() {
            match request.url.port() {
                Some(port) => {
                    let _ = writeln!(out, "host: {host}:{port}");
                }
                None => {
                    let _ = writeln!(out, "host: {host}");
                }
            }
        }
        self.write_headers(&mut out, &request.headers);
        if let Some(body) = &request.body {
            let _ = writeln!(out, "content-length: {}", body.len());
            out.push('\n');
            write_body(&mut out, body);
        }
        out
    }

    pub fn dump_response(&self, status: StatusCode, headers: &HeaderMap, body: &[u8]) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "HTTP/1.1 {status}");
        self.write_headers(&mut out, headers);
        out.push('\n');
        write_body(&mut out, body);
        out
    }

    fn write_headers(&self, out: &mut String, headers: &HeaderMap) {
        for (name, value) in headers {
            match self.redaction_for(name) {
                Some(Redaction::Omit) => {}
                Some(Redaction::Mask) => {
                    let _ = writeln!(out, "{name}: {REDACTED}");
                }
                None => {
                    let _ = writeln!(out, "{name}: {}", String::from_utf8_lossy(value.as_bytes()));
                }
            }
        }
    }
}

fn write_body(out: &mut String, body: &[u8]) {
    if body.len() <= MAX_DUMP_BODY {
        out.push_str(&String::from_utf8_lossy(body));
    } else {
        out.push_str(&String::from_utf8_lossy(&body[..MAX_DUMP_BODY]));
        let _ = write!(out, "\n... ({} more bytes)", body.len() - MAX_DUMP_BODY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::header::{CONTENT_TYPE, HeaderValue, USER_AGENT};
    use http::Method;
    use url::Url;

    fn request(body: Option<Bytes>) -> RequestSpec {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_KEY, HeaderValue::from_static("super-secret-key"));
        headers.insert(USER_AGENT, HeaderValue::from_static("agent/1.0"));
        RequestSpec {
            method: Method::PUT,
            url: Url::parse("https://storage.bunnycdn.com/zone/dir/file.txt").unwrap(),
            headers,
            body,
        }
    }

    #[test]
    fn test_request_dump_masks_access_key() {
        let dump = Redactor::default().dump_request(&request(Some(Bytes::from_static(b"payload"))));

        assert!(!dump.contains("super-secret-key"));
        assert!(dump.contains("accesskey: [REDACTED]"));
        assert!(dump.contains("user-agent: agent/1.0"));
        assert!(dump.starts_with("PUT /zone/dir/file.txt HTTP/1.1\n"));
        assert!(dump.contains("host: storage.bunnycdn.com\n"));
        assert!(dump.contains("content-length: 7"));
        assert!(dump.ends_with("payload"));
    }

    #[test]
    fn test_response_dump_masks_access_key() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_KEY, HeaderValue::from_static("echoed-secret"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let dump = Redactor::default().dump_response(StatusCode::OK, &headers, b"[]");

        assert!(!dump.contains("echoed-secret"));
        assert!(dump.contains("accesskey: [REDACTED]"));
        assert!(dump.starts_with("HTTP/1.1 200 OK\n"));
        assert!(dump.ends_with("\n\n[]"));
    }

    #[test]
    fn test_omit_rule() {
        let redactor = Redactor::default().rule(USER_AGENT, Redaction::Omit);
        let dump = redactor.dump_request(&request(None));

        assert!(!dump.contains("user-agent"));
        assert!(dump.contains("accesskey: [REDACTED]"));
    }

    #[test]
    fn test_rule_replaces_existing() {
        let redactor = Redactor::default().rule(ACCESS_KEY, Redaction::Omit);
        assert_eq!(redactor.redaction_for(&ACCESS_KEY), Some(Redaction::Omit));
        assert_eq!(
            redactor.redaction_for(&AUTHORIZATION),
            Some(Redaction::Mask)
        );
        assert_eq!(redactor.redaction_for(&USER_AGENT), None);
    }

    #[test]
    fn test_header_name_matching_ignores_case() {
        let name = HeaderName::from_bytes(b"AccessKey").unwrap();
        assert_eq!(Redactor::default().redaction_for(&name), Some(Redaction::Mask));
    }

    #[test]
    fn test_long_body_is_truncated() {
        let body = vec![b'a'; MAX_DUMP_BODY + 10];
        let dump = Redactor::default().dump_response(StatusCode::OK, &HeaderMap::new(), &body);
        assert!(dump.ends_with("... (10 more bytes)"));
    }

    #[test]
    fn test_empty_table_keeps_everything() {
        let dump = Redactor::empty().dump_request(&request(None));
        assert!(dump.contains("accesskey: super-secret-key"));
    }
}

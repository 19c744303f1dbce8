//! Storage endpoints
//!
//! Every storage zone lives in one primary region, and each region is
//! served from its own base URL.

use std::fmt;

use url::Url;

use crate::error::ConfigError;

/// Primary storage region of a storage zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Endpoint {
    Falkenstein = 1,
    NewYork,
    LosAngeles,
    Singapore,
    Sydney,
    London,
    Stockholm,
    SaoPaulo,
    Johannesburg,
    /// Local mock server, only meant for tests
    Localhost,
}

impl Endpoint {
    /// All known endpoints, in id order
    pub const ALL: [Endpoint; 10] = [
        Endpoint::Falkenstein,
        Endpoint::NewYork,
        Endpoint::LosAngeles,
        Endpoint::Singapore,
        Endpoint::Sydney,
        Endpoint::London,
        Endpoint::Stockholm,
        Endpoint::SaoPaulo,
        Endpoint::Johannesburg,
        Endpoint::Localhost,
    ];

    /// The endpoint used when nothing better is known
    pub const PRIMARY: Endpoint = Endpoint::Falkenstein;

    /// Base URL of the endpoint, without a trailing slash
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Falkenstein => "https://storage.bunnycdn.com",
            Endpoint::NewYork => "https://ny.storage.bunnycdn.com",
            Endpoint::LosAngeles => "https://la.storage.bunnycdn.com",
            Endpoint::Singapore => "https://sg.storage.bunnycdn.com",
            Endpoint::Sydney => "https://syd.storage.bunnycdn.com",
            Endpoint::London => "https://uk.storage.bunnycdn.com",
            Endpoint::Stockholm => "https://se.storage.bunnycdn.com",
            Endpoint::SaoPaulo => "https://br.storage.bunnycdn.com",
            Endpoint::Johannesburg => "https://jh.storage.bunnycdn.com",
            Endpoint::Localhost => "http://localhost:62769",
        }
    }

    /// Numeric identifier of the endpoint
    pub fn id(&self) -> u8 {
        *self as u8
    }

    /// Base URL as a parsed `Url`
    pub fn url(&self) -> Url {
        // The table above only holds absolute URLs.
        Url::parse(self.as_str()).unwrap_or_else(|_| unreachable!("static endpoint URL"))
    }

    /// Returns true if `id` names a known endpoint. Zero is never valid.
    pub fn is_valid_id(id: u8) -> bool {
        Self::try_from(id).is_ok()
    }

    /// Infer the endpoint whose host matches `input`.
    ///
    /// Unparseable input and unknown hosts fall back to [`Endpoint::PRIMARY`].
    pub fn parse(input: &str) -> Endpoint {
        let Ok(url) = Url::parse(input.trim()) else {
            tracing::debug!(input, "unparseable endpoint URL, using primary region");
            return Self::PRIMARY;
        };

        let Some(host) = url.host_str() else {
            return Self::PRIMARY;
        };

        Self::ALL
            .into_iter()
            .find(|endpoint| endpoint.url().host_str() == Some(host))
            .unwrap_or(Self::PRIMARY)
    }
}

impl TryFrom<u8> for Endpoint {
    type Error = ConfigError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|endpoint| endpoint.id() == id)
            .ok_or(ConfigError::InvalidEndpoint(id))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

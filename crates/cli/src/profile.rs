//! Optional settings file
//!
//! Values from flags and environment variables win; the profile only fills
//! in what is still missing. Lives at
//! `<config dir>/bunnystoragectl/config.toml` unless `--config` points
//! elsewhere.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const APP_NAME: &str = "bunnystoragectl";

const FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Settings read from the profile file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Profile {
    pub storage_zone: Option<String>,
    pub key: Option<String>,
    pub read_only_key: Option<String>,
    /// Endpoint URL, e.g. `https://ny.storage.bunnycdn.com`
    pub endpoint: Option<String>,
    /// Request timeout in seconds
    pub timeout: Option<u64>,
}

impl Profile {
    /// Where the profile is looked up by default
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(FILE_NAME))
    }

    /// Load the profile at `path`. A missing file is an empty profile.
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No profile found");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ProfileError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        toml::from_str(&content).map_err(|source| ProfileError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path` if given, otherwise from [`Profile::default_path`]
    pub fn resolve(path: Option<&Path>) -> Result<Self, ProfileError> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }
}

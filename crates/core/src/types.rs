//! Storage API data types

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use jiff::civil::DateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// A file or directory entry returned by a listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Object {
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub guid: String,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub storage_zone_name: String,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub path: String,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub object_name: String,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub last_changed: String,

    #[serde(
        rename = "UserId",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "String::is_empty"
    )]
    pub user_id: String,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub date_created: String,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "is_false")]
    pub is_directory: bool,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "is_zero")]
    pub length: u64,

    #[serde(
        rename = "ServerId",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "is_zero"
    )]
    pub server_id: u64,

    #[serde(
        rename = "StorageZoneId",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "is_zero"
    )]
    pub storage_zone_id: u64,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub content_type: String,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub checksum: String,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub replicated_zones: String,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "is_zero")]
    pub array_number: u64,
}

impl Object {
    /// Parsed `LastChanged`, if present and well formed
    pub fn last_changed_at(&self) -> Option<DateTime> {
        parse_timestamp(&self.last_changed)
    }

    /// Parsed `DateCreated`, if present and well formed
    pub fn date_created_at(&self) -> Option<DateTime> {
        parse_timestamp(&self.date_created)
    }
}

/// Timestamps come without a zone, e.g. `2023-08-10T12:34:56.789`
fn parse_timestamp(value: &str) -> Option<DateTime> {
    if value.is_empty() {
        return None;
    }
    value.parse().ok()
}

/// Missing and `null` both decode to the default value
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// Snapshot of one HTTP exchange
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    /// Any 2xx status
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }
}

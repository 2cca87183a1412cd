//! Wire and request types for the menu bot backend

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Shared, immutable list of menu options
pub type MenuOptions = Arc<[MenuOption]>;

/// A selectable node in the bot's menu hierarchy
///
/// Only `id` and `option_number` are required; other fields tolerate `null`
/// so a sparse option is still selectable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuOption {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Display order and selection value within a sibling set
    #[serde(rename = "option_number")]
    pub ordinal: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub response_text: String,
    #[serde(rename = "is_main_menu", default, deserialize_with = "null_as_default")]
    pub is_root: bool,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    /// Attachments offered with this option; never inspected by the client
    #[serde(
        default,
        deserialize_with = "documents_skipping_invalid",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub documents: Vec<Document>,
}

impl MenuOption {
    /// Text the client sends back to select this option
    pub fn selection_value(&self) -> String {
        self.ordinal.to_string()
    }
}

/// Downloadable document attached to a menu option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_size: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mime_type: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn id_text(value: Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(format!("expected a string or number id, got {other}")),
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    id_text(Value::deserialize(deserializer)?)
        .map_err(de::Error::custom)?
        .ok_or_else(|| de::Error::custom("id is null"))
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    id_text(Value::deserialize(deserializer)?).map_err(de::Error::custom)
}

/// Unreadable documents are dropped one by one; the option survives
fn documents_skipping_invalid<'de, D>(deserializer: D) -> Result<Vec<Document>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            tracing::warn!(found = %other, "Ignoring non-array documents");
            return Ok(Vec::new());
        }
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<Document>(item) {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::warn!(index, error = %e, "Dropping malformed document");
                None
            }
        })
        .collect())
}

/// Outbound chat request built from the session's navigation context
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    /// Trimmed user text
    pub message: String,
    /// Current anchor; `None` at the root
    pub anchor_id: Option<String>,
    /// Options shown before this turn; empty when none
    pub last_options: MenuOptions,
}

impl OutboundRequest {
    /// Query parameters for `GET /api/chat/process`
    ///
    /// `parentMenuId` is omitted at the root and `previousMenuItems` is
    /// omitted when no options were shown.
    pub fn query_params(&self) -> Result<Vec<(&'static str, String)>, serde_json::Error> {
        let mut params = vec![("message", self.message.clone())];
        if let Some(anchor) = self.anchor_id.as_deref().filter(|a| !a.is_empty()) {
            params.push(("parentMenuId", anchor.to_string()));
        }
        if !self.last_options.is_empty() {
            params.push((
                "previousMenuItems",
                serde_json::to_string(&*self.last_options)?,
            ));
        }
        Ok(params)
    }
}

/// A response as received from the transport, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
    /// Final URL after redirects
    pub url: String,
}

impl RawResponse {
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: content_type.map(String::from),
            body: body.into(),
            url: String::new(),
        }
    }

    /// JSON response with status 200
    pub fn json(body: impl Into<String>) -> Self {
        Self::new(200, Some("application/json"), body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Where the server says the user is in the hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuContext {
    #[serde(default)]
    pub current_parent_id: Option<String>,
    #[serde(default)]
    pub current_parent_title: Option<String>,
    #[serde(default)]
    pub hierarchy_level: u32,
    #[serde(default)]
    pub path: Vec<String>,
}

/// Backend health from `GET /api/chat/health`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub version: String,
}

/// Parse an RFC 3339 timestamp, falling back to now
pub fn parse_timestamp(value: Option<&str>) -> DateTime<Utc> {
    value
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map_or_else(Utc::now, |dt| dt.with_timezone(&Utc))
}

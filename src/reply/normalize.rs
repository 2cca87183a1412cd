//! Validation and repair of raw backend responses

use super::{
    AnchorUpdate, ConversationReply, FailureKind, GatewayStatus, ReplyContent, ReplyFailure,
    GENERIC_PROCESSING_FAILURE,
};
use crate::backend::{
    parse_timestamp, HealthStatus, MenuContext, MenuOption, MenuOptions, RawResponse,
    TransportError, TransportErrorKind,
};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// Fields searched for the reply text, in order
pub const REPLY_TEXT_FIELDS: [&str; 3] = ["response", "message", "text"];

/// Fields searched for the reason of an explicit failure, in order
const FAILURE_MESSAGE_FIELDS: [&str; 2] = ["error", "message"];

/// Fields searched for a reason on unclassified error statuses, in order
const STATUS_DETAIL_FIELDS: [&str; 3] = ["error", "message", "detail"];

const SUCCESS_FIELD: &str = "success";
const OPTIONS_FIELD: &str = "menuItems";
const ANCHOR_FIELD: &str = "parentMenuId";
const CONTEXT_FIELD: &str = "menuContext";
const TIMESTAMP_FIELD: &str = "timestamp";

/// Longest body excerpt kept in diagnostics
const DETAIL_EXCERPT_CHARS: usize = 200;

/// Convert a transport result into a reply. Never fails.
pub fn normalize(result: Result<RawResponse, TransportError>) -> ConversationReply {
    let reply = match result {
        Ok(raw) => match decode_body(&raw) {
            Ok(body) => normalize_body(&body),
            Err(failure) => ConversationReply::Failure(failure),
        },
        Err(err) => ConversationReply::Failure(classify_transport(&err)),
    };

    if let ConversationReply::Failure(failure) = &reply {
        tracing::warn!(kind = %failure.kind, detail = %failure.detail, "Reply classified as failure");
    }
    reply
}

/// Normalize the top-level menu listing
pub fn normalize_menu(
    result: Result<RawResponse, TransportError>,
) -> Result<MenuOptions, ReplyFailure> {
    let raw = result.map_err(|e| classify_transport(&e))?;
    let body = decode_body(&raw)?;
    if let Some(failure) = explicit_failure(&body) {
        return Err(failure);
    }
    Ok(parse_options(body.get(OPTIONS_FIELD)))
}

/// Normalize a health check response
pub fn normalize_health(
    result: Result<RawResponse, TransportError>,
) -> Result<HealthStatus, ReplyFailure> {
    let raw = result.map_err(|e| classify_transport(&e))?;
    let body = decode_body(&raw)?;
    serde_json::from_value(Value::Object(body))
        .map_err(|e| ReplyFailure::missing_field(format!("missing health status: {e}")))
}

/// Outcome of probing the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionCheck {
    pub ok: bool,
    pub message: String,
}

/// Summarize a health check for display
pub fn summarize_health(result: Result<RawResponse, TransportError>) -> ConnectionCheck {
    match normalize_health(result) {
        Ok(health) => ConnectionCheck {
            ok: true,
            message: if health.version.is_empty() {
                format!("API connection successful ({})", health.status)
            } else {
                format!(
                    "API connection successful ({}, version {})",
                    health.status, health.version
                )
            },
        },
        Err(failure) => ConnectionCheck {
            ok: false,
            message: match failure.kind {
                FailureKind::BadGateway(status) => {
                    format!("API returned {status}. Endpoint may not be configured correctly.")
                }
                FailureKind::NetworkUnreachable | FailureKind::Timeout => {
                    "Cannot reach API. Check your network connection.".to_string()
                }
                _ => format!("Unexpected health response: {}", failure.detail),
            },
        },
    }
}

/// Shared checks for every endpoint: status, markup, content type, JSON object
pub fn decode_body(raw: &RawResponse) -> Result<Map<String, Value>, ReplyFailure> {
    if !raw.is_success() {
        return Err(classify_status(raw));
    }

    let body = raw.body.trim();
    if body.is_empty() {
        return Err(ReplyFailure::malformed("empty response body"));
    }
    if looks_like_html(body) {
        return Err(ReplyFailure::malformed(format!(
            "HTML error page from {}",
            display_url(raw)
        )));
    }
    let content_type = raw.content_type.as_deref().unwrap_or("");
    if !is_json_content_type(content_type) {
        let shown = if content_type.is_empty() {
            "no content type"
        } else {
            content_type
        };
        return Err(ReplyFailure::malformed(format!(
            "non-JSON payload ({shown})"
        )));
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ReplyFailure::malformed(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
        Err(e) => Err(ReplyFailure::malformed(format!("invalid JSON: {e}"))),
    }
}

fn normalize_body(body: &Map<String, Value>) -> ConversationReply {
    if let Some(failure) = explicit_failure(body) {
        return ConversationReply::Failure(failure);
    }

    let Some(text) = find_reply_text(body) else {
        return ConversationReply::Failure(ReplyFailure::missing_field(format!(
            "missing reply text (fields present: {})",
            field_list(body)
        )));
    };

    let menu_context = body.get(CONTEXT_FIELD).and_then(|value| {
        match serde_json::from_value::<MenuContext>(value.clone()) {
            Ok(context) => Some(context),
            Err(e) => {
                if !value.is_null() {
                    tracing::warn!(error = %e, "Dropping unreadable menu context");
                }
                None
            }
        }
    });

    ConversationReply::Success(ReplyContent {
        text,
        options: parse_options(body.get(OPTIONS_FIELD)),
        anchor: parse_anchor(body),
        timestamp: parse_timestamp(body.get(TIMESTAMP_FIELD).and_then(Value::as_str)),
        menu_context,
    })
}

fn classify_transport(err: &TransportError) -> ReplyFailure {
    let kind = match err.kind {
        TransportErrorKind::Timeout => FailureKind::Timeout,
        TransportErrorKind::Unreachable | TransportErrorKind::Setup => {
            FailureKind::NetworkUnreachable
        }
    };
    ReplyFailure::new(kind, format!("network error: {}", err.message))
}

fn classify_status(raw: &RawResponse) -> ReplyFailure {
    let status = GatewayStatus::from_status(raw.status);
    let detail = match status {
        GatewayStatus::Other(code) => status_detail(raw)
            .unwrap_or_else(|| format!("HTTP {code} from {}", display_url(raw))),
        _ => format!("HTTP {} ({status}) from {}", raw.status, display_url(raw)),
    };
    ReplyFailure::new(FailureKind::BadGateway(status), detail)
}

/// Embedded reason from an error-status body, or a short text excerpt
fn status_detail(raw: &RawResponse) -> Option<String> {
    let body = raw.body.trim();
    if body.is_empty() || looks_like_html(body) {
        return None;
    }
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        return first_string(&map, &STATUS_DETAIL_FIELDS);
    }
    Some(body.chars().take(DETAIL_EXCERPT_CHARS).collect())
}

fn explicit_failure(body: &Map<String, Value>) -> Option<ReplyFailure> {
    let failed = match body.get(SUCCESS_FIELD) {
        Some(Value::Bool(success)) => !success,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("false"),
        _ => false,
    };
    failed.then(|| {
        ReplyFailure::server_reported(
            first_string(body, &FAILURE_MESSAGE_FIELDS)
                .unwrap_or_else(|| GENERIC_PROCESSING_FAILURE.to_string()),
        )
    })
}

fn find_reply_text(body: &Map<String, Value>) -> Option<String> {
    REPLY_TEXT_FIELDS.iter().find_map(|field| {
        let text = match body.get(*field)? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        (!text.trim().is_empty()).then_some(text)
    })
}

fn first_string(body: &Map<String, Value>, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| {
        body.get(*field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    })
}

/// Options in received order; malformed entries are dropped
fn parse_options(value: Option<&Value>) -> MenuOptions {
    let Some(Value::Array(items)) = value else {
        if let Some(other) = value.filter(|v| !v.is_null()) {
            tracing::warn!(found = json_type_name(other), "Ignoring non-array menu items");
        }
        return Arc::from(Vec::new());
    };

    let mut options = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match serde_json::from_value::<MenuOption>(item.clone()) {
            Ok(option) => options.push(option),
            Err(e) => tracing::warn!(index, error = %e, "Dropping malformed menu item"),
        }
    }

    let mut seen = HashSet::new();
    for option in &options {
        if !seen.insert(option.ordinal) {
            tracing::warn!(ordinal = option.ordinal, "Duplicate option number in menu");
        }
    }

    Arc::from(options)
}

fn parse_anchor(body: &Map<String, Value>) -> AnchorUpdate {
    match body.get(ANCHOR_FIELD) {
        None => AnchorUpdate::Unchanged,
        Some(Value::Null) => AnchorUpdate::Root,
        Some(Value::String(id)) if id.is_empty() => AnchorUpdate::Root,
        Some(Value::String(id)) => AnchorUpdate::At(id.clone()),
        Some(Value::Number(n)) => AnchorUpdate::At(n.to_string()),
        Some(other) => {
            tracing::warn!(found = json_type_name(other), "Ignoring unreadable parent menu id");
            AnchorUpdate::Unchanged
        }
    }
}

fn looks_like_html(body: &str) -> bool {
    let head: String = body.chars().take(512).collect::<String>().to_ascii_lowercase();
    head.contains("<!doctype") || head.contains("<html")
}

fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

fn display_url(raw: &RawResponse) -> &str {
    if raw.url.is_empty() {
        "backend"
    } else {
        &raw.url
    }
}

fn field_list(body: &Map<String, Value>) -> String {
    if body.is_empty() {
        "none".to_string()
    } else {
        body.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

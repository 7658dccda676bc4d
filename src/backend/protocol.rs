//! Change-feed wire protocol
//!
//! The hosted backend streams row changes over Phoenix channels
//! (JSON serializer, protocol `1.0.0`). A client:
//!
//! 1. connects to `{base}/realtime/v1/websocket?apikey=..&vsn=1.0.0`
//! 2. joins one topic per category with a `postgres_changes` filter
//! 3. sends a heartbeat on topic `phoenix` at a fixed interval
//! 4. receives `postgres_changes` messages until it sends `phx_leave`
//!
//! Shared by the native client and the browser front-end.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use url::Url;

use crate::entries::{Category, ChangeEvent, Entry, EntryId};

/// Protocol version sent in the socket URL
pub const PROTOCOL_VSN: &str = "1.0.0";

/// Path of the change-feed socket
pub const SOCKET_PATH: &str = "realtime/v1/websocket";

/// Topic heartbeats are sent on
pub const HEARTBEAT_TOPIC: &str = "phoenix";

/// Event names
pub mod events {
    pub const JOIN: &str = "phx_join";
    pub const LEAVE: &str = "phx_leave";
    pub const REPLY: &str = "phx_reply";
    pub const ERROR: &str = "phx_error";
    pub const CLOSE: &str = "phx_close";
    pub const HEARTBEAT: &str = "heartbeat";
    pub const POSTGRES_CHANGES: &str = "postgres_changes";
    pub const SYSTEM: &str = "system";
}

/// Socket URL for a backend base URL (`https` becomes `wss`)
pub fn socket_url(base_url: &str, api_key: &str) -> Result<Url, url::ParseError> {
    let base = base_url.trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base.to_string()
    };

    let mut url = Url::parse(&format!("{}/{}", base, SOCKET_PATH))?;
    url.query_pairs_mut()
        .append_pair("apikey", api_key)
        .append_pair("vsn", PROTOCOL_VSN);
    Ok(url)
}

/// Channel topic for one category's feed
pub fn channel_topic(category: Category) -> String {
    format!("realtime:entries_{}", category.tag())
}

/// Which rows a channel wants changes for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeFilter {
    pub schema: String,
    pub table: String,
    pub category: Category,
}

impl ChangeFilter {
    pub fn new(schema: impl Into<String>, table: impl Into<String>, category: Category) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            category,
        }
    }

    /// Row filter expression, e.g. `category=eq.vishnu`
    pub fn expression(&self) -> String {
        format!("category=eq.{}", self.category.tag())
    }
}

/// Monotonic message reference counter
#[derive(Debug, Default)]
pub struct RefCounter(u64);

impl RefCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_ref(&mut self) -> String {
        self.0 += 1;
        self.0.to_string()
    }
}

/// One frame on the socket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoenixMessage {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub msg_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_ref: Option<String>,
}

impl PhoenixMessage {
    /// Join a category channel
    pub fn join(filter: &ChangeFilter, access_token: &str, msg_ref: String) -> Self {
        Self {
            topic: channel_topic(filter.category),
            event: events::JOIN.to_string(),
            payload: json!({
                "config": {
                    "broadcast": { "ack": false, "self": false },
                    "presence": { "key": "" },
                    "postgres_changes": [{
                        "event": "*",
                        "schema": filter.schema,
                        "table": filter.table,
                        "filter": filter.expression(),
                    }],
                },
                "access_token": access_token,
            }),
            join_ref: Some(msg_ref.clone()),
            msg_ref: Some(msg_ref),
        }
    }

    /// Keep the socket alive
    pub fn heartbeat(msg_ref: String) -> Self {
        Self {
            topic: HEARTBEAT_TOPIC.to_string(),
            event: events::HEARTBEAT.to_string(),
            payload: json!({}),
            msg_ref: Some(msg_ref),
            join_ref: None,
        }
    }

    /// Leave a category channel
    pub fn leave(category: Category, join_ref: Option<String>, msg_ref: String) -> Self {
        Self {
            topic: channel_topic(category),
            event: events::LEAVE.to_string(),
            payload: json!({}),
            msg_ref: Some(msg_ref),
            join_ref,
        }
    }

    pub fn to_text(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_text(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// What an incoming frame means to a subscriber
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    /// A row change on a joined channel
    Change(ChangeEvent),
    /// Reply to one of our requests
    Reply {
        msg_ref: Option<String>,
        ok: bool,
        detail: Value,
    },
    /// Informational message from the backend (`system`)
    System { status: String, message: String },
    /// The channel errored or was closed by the backend
    ChannelClosed { reason: String },
    /// Anything else (presence, broadcast, ...)
    Ignored,
}

/// Interpret an incoming frame
pub fn decode(message: &PhoenixMessage) -> Result<Incoming, ProtocolError> {
    match message.event.as_str() {
        events::POSTGRES_CHANGES => decode_change(&message.payload).map(Incoming::Change),
        events::REPLY => {
            let status = message
                .payload
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or_default();
            Ok(Incoming::Reply {
                msg_ref: message.msg_ref.clone(),
                ok: status == "ok",
                detail: message.payload.get("response").cloned().unwrap_or(Value::Null),
            })
        }
        events::SYSTEM => Ok(Incoming::System {
            status: string_field(&message.payload, "status"),
            message: string_field(&message.payload, "message"),
        }),
        events::ERROR | events::CLOSE => Ok(Incoming::ChannelClosed {
            reason: message.event.clone(),
        }),
        _ => Ok(Incoming::Ignored),
    }
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[derive(Debug, Deserialize)]
struct ChangeData {
    #[serde(rename = "type", alias = "eventType")]
    kind: String,
    #[serde(default)]
    record: Option<Value>,
    #[serde(default)]
    old_record: Option<Value>,
}

/// Decode a `postgres_changes` payload.
///
/// Current backends nest the change under `data`; older ones send it flat.
pub fn decode_change(payload: &Value) -> Result<ChangeEvent, ProtocolError> {
    let data = payload.get("data").unwrap_or(payload);
    let data: ChangeData = serde_json::from_value(data.clone())?;

    match data.kind.as_str() {
        "INSERT" => Ok(ChangeEvent::Inserted {
            entry: record(data.record, "record")?,
        }),
        "UPDATE" => Ok(ChangeEvent::Updated {
            entry: record(data.record, "record")?,
        }),
        "DELETE" => {
            let old = data.old_record.ok_or(ProtocolError::MissingRecord("old_record"))?;
            let id = old
                .get("id")
                .cloned()
                .ok_or(ProtocolError::MissingRecord("old_record.id"))?;
            let id: EntryId = serde_json::from_value(id).map_err(ProtocolError::InvalidRecord)?;
            Ok(ChangeEvent::Deleted { id })
        }
        other => Err(ProtocolError::UnknownChangeType(other.to_string())),
    }
}

fn record(value: Option<Value>, name: &'static str) -> Result<Entry, ProtocolError> {
    let value = value.ok_or(ProtocolError::MissingRecord(name))?;
    serde_json::from_value(value).map_err(ProtocolError::InvalidRecord)
}

/// Errors decoding change-feed frames
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Change payload is missing {0}")]
    MissingRecord(&'static str),

    #[error("Change record does not match the entry shape: {0}")]
    InvalidRecord(serde_json::Error),

    #[error("Unknown change type: {0}")]
    UnknownChangeType(String),
}

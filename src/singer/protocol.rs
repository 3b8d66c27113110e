//! Singer output translation
//!
//! The tap prints Singer messages on stdout. Records and state are rewrapped
//! for the host without looking inside the payload; schema and version
//! markers are dropped since the host already has the catalog.

use crate::message::Message;
use crate::types::{JsonValue, LogLevel};
use serde::Deserialize;

/// Message printed by a Singer tap
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SingerMessage {
    Record {
        stream: String,
        record: JsonValue,
        #[serde(default)]
        time_extracted: Option<String>,
    },
    State {
        value: JsonValue,
    },
    Schema {
        stream: String,
        #[serde(default)]
        schema: JsonValue,
        #[serde(default)]
        key_properties: Vec<String>,
    },
    ActivateVersion {
        stream: String,
        version: i64,
    },
}

impl SingerMessage {
    /// Host message for this Singer message, if the host needs one
    pub fn into_message(self) -> Option<Message> {
        match self {
            SingerMessage::Record { stream, record, .. } => Some(Message::record(stream, record)),
            SingerMessage::State { value } => Some(Message::state(value)),
            SingerMessage::Schema { .. } | SingerMessage::ActivateVersion { .. } => None,
        }
    }
}

/// Translate one line of tap stdout
///
/// Lines that are not Singer messages are passed on as `INFO` logs, blank
/// lines are skipped.
pub fn translate_line(line: &str) -> Option<Message> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str::<SingerMessage>(line) {
        Ok(message) => message.into_message(),
        Err(_) => Some(Message::log(LogLevel::Info, line)),
    }
}

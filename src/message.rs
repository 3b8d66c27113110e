//! Host protocol messages and the logger that emits them
//!
//! Everything the connector tells the host goes out as one JSON object per
//! line on stdout. Diagnostics for humans go to stderr through `tracing`.

use crate::catalog::Catalog;
use crate::types::{JsonValue, LogLevel, Status};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

// ============================================================================
// Messages
// ============================================================================

/// Message sent to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Log line
    Log { log: LogMessage },

    /// Connector specification
    Spec { spec: JsonValue },

    /// Result of a connection check
    ConnectionStatus {
        #[serde(rename = "connectionStatus")]
        connection_status: ConnectionStatus,
    },

    /// Discovered catalog
    Catalog { catalog: Catalog },

    /// One record
    Record { record: RecordMessage },

    /// State checkpoint
    State { state: StateMessage },
}

/// Body of a `LOG` message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
    pub level: LogLevel,
    pub message: String,
}

/// Body of a `RECORD` message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMessage {
    /// Stream the record belongs to
    pub stream: String,

    /// Record payload, exactly as the tap produced it
    pub data: JsonValue,

    /// Emission time in epoch milliseconds
    pub emitted_at: i64,
}

/// Body of a `STATE` message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMessage {
    pub data: JsonValue,
}

/// Connection check result reported to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ConnectionStatus {
    /// Successful check
    pub fn succeeded() -> Self {
        Self {
            status: Status::Succeeded,
            message: None,
        }
    }

    /// Failed check with a user-facing message
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: Status::Failed,
            message: Some(message.into()),
        }
    }

    /// Whether the check succeeded
    pub fn is_success(&self) -> bool {
        self.status == Status::Succeeded
    }
}

impl Message {
    /// Create a log message
    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        Self::Log {
            log: LogMessage {
                level,
                message: message.into(),
            },
        }
    }

    /// Create a record message stamped with the current time
    pub fn record(stream: impl Into<String>, data: JsonValue) -> Self {
        Self::Record {
            record: RecordMessage {
                stream: stream.into(),
                data,
                emitted_at: chrono::Utc::now().timestamp_millis(),
            },
        }
    }

    /// Create a state message
    pub fn state(data: JsonValue) -> Self {
        Self::State {
            state: StateMessage { data },
        }
    }

    /// Create a connection status message
    pub fn connection_status(status: ConnectionStatus) -> Self {
        Self::ConnectionStatus {
            connection_status: status,
        }
    }
}

// ============================================================================
// Emitter
// ============================================================================

/// Destination for host messages
#[derive(Debug, Clone)]
pub enum Emitter {
    /// One JSON object per line on stdout
    Stdout {
        /// Pretty-print instead of compact lines
        pretty: bool,
    },

    /// Keep messages in memory
    Capture(Arc<Mutex<Vec<Message>>>),
}

impl Default for Emitter {
    fn default() -> Self {
        Self::Stdout { pretty: false }
    }
}

impl Emitter {
    /// In-memory emitter
    pub fn capture() -> Self {
        Self::Capture(Arc::new(Mutex::new(Vec::new())))
    }

    /// Send a message to the host
    pub fn emit(&self, message: &Message) {
        match self {
            Emitter::Stdout { pretty } => {
                let line = if *pretty {
                    serde_json::to_string_pretty(message)
                } else {
                    serde_json::to_string(message)
                };
                match line {
                    Ok(line) => {
                        let mut out = std::io::stdout().lock();
                        if let Err(e) = writeln!(out, "{line}") {
                            tracing::error!(error = %e, "Failed to write message to stdout");
                        }
                    }
                    Err(e) => tracing::error!(error = %e, "Failed to serialize message"),
                }
            }
            Emitter::Capture(messages) => messages
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(message.clone()),
        }
    }

    /// Messages captured so far (empty for stdout)
    pub fn captured(&self) -> Vec<Message> {
        match self {
            Emitter::Stdout { .. } => Vec::new(),
            Emitter::Capture(messages) => messages
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }
}

// ============================================================================
// Logger
// ============================================================================

/// Logger handed to the source hooks
///
/// Each call emits a host `LOG` message and mirrors it to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    emitter: Emitter,
}

impl Logger {
    /// Create a logger writing through `emitter`
    pub fn new(emitter: Emitter) -> Self {
        Self { emitter }
    }

    /// Emitter this logger writes to
    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    /// Log at the given level
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Trace => tracing::trace!("{message}"),
            LogLevel::Debug => tracing::debug!("{message}"),
            LogLevel::Info => tracing::info!("{message}"),
            LogLevel::Warn => tracing::warn!("{message}"),
            LogLevel::Error => tracing::error!("{message}"),
        }
        self.emitter.emit(&Message::log(level, message));
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }
}

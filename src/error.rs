//! Error types for the Marketo Singer source
//!
//! This module defines the error hierarchy for the whole connector.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the connector
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Tap Process Errors
    // ============================================================================
    #[error("Failed to spawn tap command '{command}': {source}")]
    TapSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Tap command '{command}' exited with {}: {stderr}", exit_code_label(.code))]
    TapFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    // ============================================================================
    // Protocol Errors
    // ============================================================================
    #[error("Invalid catalog: {message}")]
    Catalog { message: String },

    #[error("Stream '{stream}' not found in catalog")]
    StreamNotFound { stream: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (killed by signal)".to_string(),
    }
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a catalog error
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Short, stable name of the error kind, used when logging failures
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config { .. } => "Config",
            Error::MissingConfigField { .. } => "MissingConfigField",
            Error::InvalidConfigValue { .. } => "InvalidConfigValue",
            Error::JsonParse(_) => "JsonParse",
            Error::TapSpawn { .. } => "TapSpawn",
            Error::TapFailed { .. } => "TapFailed",
            Error::Catalog { .. } => "Catalog",
            Error::StreamNotFound { .. } => "StreamNotFound",
            Error::Io(_) => "Io",
            Error::FileNotFound { .. } => "FileNotFound",
            Error::Other(_) => "Other",
            Error::Anyhow(_) => "Anyhow",
        }
    }
}

/// Result type alias for the connector
pub type Result<T> = std::result::Result<T, Error>;

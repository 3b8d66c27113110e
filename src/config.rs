//! Connector configuration
//!
//! The host hands the connector a JSON object with the fields declared in
//! the connection specification. The tap wants the same values under its
//! own key names, written to a file it can read with `-c`.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Field Names
// ============================================================================

/// Marketo REST endpoint, e.g. `https://123-ABC-456.mktorest.com/rest`
pub const ENDPOINT_URL: &str = "endpoint_url";

/// Marketo identity endpoint, e.g. `https://123-ABC-456.mktorest.com/identity`
pub const IDENTITY_URL: &str = "identity_url";

/// OAuth client id of the Marketo custom service
pub const CLIENT_ID: &str = "client_id";

/// OAuth client secret of the Marketo custom service
pub const CLIENT_SECRET: &str = "client_secret";

/// Earliest date to replicate from (`YYYY-MM-DDTHH:MM:SSZ`)
pub const START_DATE: &str = "start_date";

/// Every field the host config must carry
pub const REQUIRED_FIELDS: [&str; 5] = [
    ENDPOINT_URL,
    IDENTITY_URL,
    CLIENT_ID,
    CLIENT_SECRET,
    START_DATE,
];

// ============================================================================
// Tap Config
// ============================================================================

/// Configuration in the shape `tap-marketo` reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapConfig {
    /// REST endpoint
    pub endpoint: String,

    /// Identity endpoint
    pub identity: String,

    /// Client id
    pub client_id: String,

    /// Client secret
    pub client_secret: String,

    /// Replication start date
    pub start_date: String,
}

/// Fetch a required string field from the raw host config
pub fn required_str<'a>(raw_config: &'a JsonValue, field: &str) -> Result<&'a str> {
    let value = raw_config.get(field).ok_or_else(|| Error::missing_field(field))?;
    value
        .as_str()
        .ok_or_else(|| Error::invalid_value(field, format!("expected a string, got {value}")))
}

// ============================================================================
// Config Files
// ============================================================================

/// Load the raw host configuration from a JSON file
pub fn load_config_file(path: impl AsRef<Path>) -> Result<JsonValue> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path)
        .map_err(|e| Error::config(format!("Failed to read config file: {e}")))?;
    let value: JsonValue = serde_json::from_str(&content)
        .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
    if !value.is_object() {
        return Err(Error::config("Config must be a JSON object"));
    }
    Ok(value)
}

/// Raw host config together with the rendered tap config on disk
///
/// The rendered file lives in a private temporary directory that is removed
/// when the container is dropped.
#[derive(Debug)]
pub struct ConfigContainer {
    /// Config as supplied by the host
    pub raw_config: JsonValue,

    /// Path of the rendered tap config file
    pub rendered_config_path: PathBuf,

    workdir: TempDir,
}

impl ConfigContainer {
    /// Render `tap_config` into a fresh scratch directory
    pub fn new(raw_config: JsonValue, tap_config: &TapConfig) -> Result<Self> {
        let workdir = tempfile::Builder::new().prefix("marketo-singer-").tempdir()?;
        let rendered_config_path = workdir.path().join("config.json");
        fs::write(&rendered_config_path, serde_json::to_string(tap_config)?)?;

        Ok(Self {
            raw_config,
            rendered_config_path,
            workdir,
        })
    }

    /// Scratch directory shared by the files written for one run
    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }
}

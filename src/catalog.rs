//! Catalog types
//!
//! Two catalog dialects meet here: the Singer catalog the tap prints on
//! `--discover` and reads back with `-p`, and the host catalog the
//! orchestrator understands. Conversion goes Singer → host for discovery
//! and host selection → Singer for reads.

use crate::error::{Error, Result};
use crate::streams::SyncModeOverride;
use crate::types::{DestinationSyncMode, JsonObject, JsonValue, SyncMode};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ============================================================================
// Host Catalog
// ============================================================================

/// Discovered catalog (available streams)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Available streams
    pub streams: Vec<CatalogStream>,
}

/// Stream in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStream {
    /// Stream name
    pub name: String,

    /// JSON schema for the stream
    #[serde(default)]
    pub json_schema: JsonValue,

    /// Supported sync modes
    #[serde(default)]
    pub supported_sync_modes: Vec<SyncMode>,

    /// Whether the source picks the cursor
    #[serde(default)]
    pub source_defined_cursor: bool,

    /// Default cursor field
    #[serde(default)]
    pub default_cursor_field: Vec<String>,

    /// Source-defined primary key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_defined_primary_key: Option<Vec<Vec<String>>>,
}

impl CatalogStream {
    /// Replace the sync-mode fields with an override entry
    pub fn apply_override(&mut self, entry: &SyncModeOverride) {
        self.supported_sync_modes = entry.supported_sync_modes.clone();
        self.source_defined_cursor = entry.source_defined_cursor;
        self.default_cursor_field = entry.default_cursor_field.clone();
    }
}

impl Catalog {
    /// Apply sync-mode overrides to every stream named in `overrides`
    ///
    /// Overrides for streams the catalog does not contain are ignored.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, SyncModeOverride>) {
        for stream in &mut self.streams {
            if let Some(entry) = overrides.get(&stream.name) {
                stream.apply_override(entry);
            }
        }
    }

    /// Get a stream by name
    pub fn get_stream(&self, name: &str) -> Option<&CatalogStream> {
        self.streams.iter().find(|s| s.name == name)
    }
}

/// Configured catalog (selected streams for sync)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfiguredCatalog {
    /// Selected streams
    pub streams: Vec<ConfiguredStream>,
}

/// Configured stream for sync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfiguredStream {
    /// Stream reference
    pub stream: CatalogStream,

    /// Selected sync mode
    #[serde(default)]
    pub sync_mode: SyncMode,

    /// Destination sync mode
    #[serde(default)]
    pub destination_sync_mode: DestinationSyncMode,

    /// Cursor field to use
    #[serde(default)]
    pub cursor_field: Option<Vec<String>>,
}

impl ConfiguredCatalog {
    /// Load a configured catalog from a JSON file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::catalog(format!("Failed to read catalog {}: {e}", path.display()))
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

// ============================================================================
// Singer Catalog
// ============================================================================

/// Catalog in the format the tap prints and consumes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SingerCatalog {
    /// Streams the tap exposes
    pub streams: Vec<SingerStream>,
}

/// One tap stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingerStream {
    /// Tap-internal stream id
    pub tap_stream_id: String,

    /// Stream name
    pub stream: String,

    /// JSON schema of the records
    #[serde(default)]
    pub schema: JsonValue,

    /// Primary key columns (older taps put them here instead of metadata)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_properties: Option<Vec<String>>,

    /// Per-breadcrumb metadata
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,

    /// Anything else the tap emitted, written back untouched
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// Metadata for one breadcrumb (empty breadcrumb = the stream itself)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    /// Path into the schema
    #[serde(default)]
    pub breadcrumb: Vec<JsonValue>,

    /// Metadata values
    #[serde(default)]
    pub metadata: JsonObject,
}

impl SingerStream {
    /// Metadata attached to the stream itself
    pub fn stream_metadata(&self) -> Option<&JsonObject> {
        self.metadata
            .iter()
            .find(|m| m.breadcrumb.is_empty())
            .map(|m| &m.metadata)
    }

    fn stream_metadata_mut(&mut self) -> &mut JsonObject {
        let idx = match self.metadata.iter().position(|m| m.breadcrumb.is_empty()) {
            Some(idx) => idx,
            None => {
                self.metadata.push(MetadataEntry {
                    breadcrumb: Vec::new(),
                    metadata: JsonObject::new(),
                });
                self.metadata.len() - 1
            }
        };
        &mut self.metadata[idx].metadata
    }

    fn string_list(&self, key: &str) -> Option<Vec<String>> {
        let values = self.stream_metadata()?.get(key)?.as_array()?;
        Some(
            values
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect(),
        )
    }

    /// Replication keys the tap advertises
    pub fn replication_keys(&self) -> Vec<String> {
        self.string_list("valid-replication-keys").unwrap_or_default()
    }

    /// Primary key columns
    pub fn primary_key(&self) -> Vec<String> {
        self.string_list("table-key-properties")
            .or_else(|| self.key_properties.clone())
            .unwrap_or_default()
    }

    /// Convert to a host catalog stream
    pub fn to_catalog_stream(&self) -> CatalogStream {
        let replication_keys = self.replication_keys();
        let primary_key = self.primary_key();

        let mut supported_sync_modes = vec![SyncMode::FullRefresh];
        if !replication_keys.is_empty() {
            supported_sync_modes.push(SyncMode::Incremental);
        }

        CatalogStream {
            name: self.stream.clone(),
            json_schema: self.schema.clone(),
            supported_sync_modes,
            source_defined_cursor: !replication_keys.is_empty(),
            default_cursor_field: replication_keys,
            source_defined_primary_key: if primary_key.is_empty() {
                None
            } else {
                Some(primary_key.into_iter().map(|k| vec![k]).collect())
            },
        }
    }

    /// Mark the stream as selected (or not) with the given sync mode
    pub fn select(&mut self, selected: bool, sync_mode: SyncMode) {
        let metadata = self.stream_metadata_mut();
        metadata.insert("selected".to_string(), JsonValue::Bool(selected));
        if selected {
            metadata.insert(
                "replication-method".to_string(),
                JsonValue::String(sync_mode.replication_method().to_string()),
            );
        }
    }
}

impl SingerCatalog {
    /// Parse the tap's `--discover` output
    pub fn parse(output: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(output.trim())
            .map_err(|e| Error::catalog(format!("Tap printed an unreadable catalog: {e}")))?;
        Ok(catalog)
    }

    /// Convert to the host catalog
    pub fn to_catalog(&self) -> Catalog {
        Catalog {
            streams: self
                .streams
                .iter()
                .map(SingerStream::to_catalog_stream)
                .collect(),
        }
    }

    /// Select the streams named in the configured catalog, deselect the rest
    ///
    /// Fails if the host selected a stream the tap does not know.
    pub fn select_streams(&mut self, configured: &ConfiguredCatalog) -> Result<()> {
        let known: HashSet<&str> = self.streams.iter().map(|s| s.stream.as_str()).collect();
        if let Some(missing) = configured
            .streams
            .iter()
            .find(|c| !known.contains(c.stream.name.as_str()))
        {
            return Err(Error::StreamNotFound {
                stream: missing.stream.name.clone(),
            });
        }

        let modes: HashMap<&str, SyncMode> = configured
            .streams
            .iter()
            .map(|c| (c.stream.name.as_str(), c.sync_mode))
            .collect();

        for stream in &mut self.streams {
            match modes.get(stream.stream.as_str()) {
                Some(mode) => stream.select(true, *mode),
                None => stream.select(false, SyncMode::FullRefresh),
            }
        }
        Ok(())
    }
}

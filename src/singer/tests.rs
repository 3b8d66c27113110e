//! Tests for the default `SingerSource` behaviour, run against the fake tap
//! script in `tests/fixtures`.

#![cfg(unix)]

use super::*;
use crate::catalog::{CatalogStream, ConfiguredStream};
use crate::config::TapConfig;
use crate::error::Error;
use crate::message::{Emitter, Message};
use crate::source::MarketoSource;
use crate::types::{DestinationSyncMode, LogLevel, Status, SyncMode};
use pretty_assertions::assert_eq;
use serde_json::json;

fn fake_tap() -> MarketoSource {
    MarketoSource::with_tap_command(format!(
        "sh {}/tests/fixtures/fake-tap.sh",
        env!("CARGO_MANIFEST_DIR")
    ))
}

fn raw_config(client_secret: &str) -> JsonValue {
    json!({
        "endpoint_url": "https://123-ABC-456.mktorest.com/rest",
        "identity_url": "https://123-ABC-456.mktorest.com/identity",
        "client_id": "client-id",
        "client_secret": client_secret,
        "start_date": "2020-09-25T00:00:00Z"
    })
}

fn configured(name: &str, sync_mode: SyncMode) -> ConfiguredStream {
    ConfiguredStream {
        stream: CatalogStream {
            name: name.to_string(),
            json_schema: json!({}),
            supported_sync_modes: vec![sync_mode],
            source_defined_cursor: true,
            default_cursor_field: Vec::new(),
            source_defined_primary_key: None,
        },
        sync_mode,
        destination_sync_mode: DestinationSyncMode::Append,
        cursor_field: None,
    }
}

/// Source with no overrides, exercising the trait defaults
struct PlainSource(MarketoSource);

#[async_trait]
impl SingerSource for PlainSource {
    fn spec(&self) -> Result<JsonValue> {
        self.0.spec()
    }

    fn transform_config(&self, raw_config: &JsonValue) -> Result<TapConfig> {
        self.0.transform_config(raw_config)
    }

    fn discover_cmd(&self, logger: &Logger, config_path: &Path) -> String {
        self.0.discover_cmd(logger, config_path)
    }

    fn read_cmd(
        &self,
        logger: &Logger,
        config_path: &Path,
        catalog_path: &Path,
        state_path: Option<&Path>,
    ) -> String {
        self.0.read_cmd(logger, config_path, catalog_path, state_path)
    }
}

#[test]
fn test_configure_propagates_missing_field() {
    let mut raw = raw_config("secret");
    raw.as_object_mut().unwrap().remove("identity_url");
    let err = fake_tap().configure(raw).unwrap_err();
    assert!(matches!(err, Error::MissingConfigField { field } if field == "identity_url"));
}

#[tokio::test]
async fn test_discover_applies_overrides() {
    let source = fake_tap();
    let logger = Logger::new(Emitter::capture());
    let config = source.configure(raw_config("secret")).unwrap();

    let catalog = source.discover(&logger, &config).await.unwrap();
    assert_eq!(catalog.streams.len(), 3);

    let leads = catalog.get_stream("leads").unwrap();
    assert_eq!(leads.supported_sync_modes, vec![SyncMode::Incremental]);
    assert!(leads.source_defined_cursor);
    assert!(leads.default_cursor_field.is_empty());

    let lists = catalog.get_stream("lists").unwrap();
    assert_eq!(lists.supported_sync_modes, vec![SyncMode::Incremental]);

    let types = catalog.get_stream("activity_types").unwrap();
    assert_eq!(types.supported_sync_modes, vec![SyncMode::FullRefresh]);
    assert!(!types.source_defined_cursor);
}

#[tokio::test]
async fn test_default_discover_keeps_tap_sync_modes() {
    let source = PlainSource(fake_tap());
    let logger = Logger::new(Emitter::capture());
    let config = source.configure(raw_config("secret")).unwrap();

    let catalog = source.discover(&logger, &config).await.unwrap();
    let leads = catalog.get_stream("leads").unwrap();
    assert_eq!(
        leads.supported_sync_modes,
        vec![SyncMode::FullRefresh, SyncMode::Incremental]
    );
    assert_eq!(leads.default_cursor_field, vec!["updatedAt".to_string()]);
}

#[tokio::test]
async fn test_default_check_reports_error_text() {
    let source = PlainSource(fake_tap());
    let logger = Logger::new(Emitter::capture());
    let config = source.configure(raw_config("bad")).unwrap();

    let status = source.check(&logger, &config).await;
    assert_eq!(status.status, Status::Failed);
    assert!(status.message.unwrap().contains("401 Client Error"));
}

#[tokio::test]
async fn test_check_succeeds() {
    let source = fake_tap();
    let logger = Logger::new(Emitter::capture());
    let config = source.configure(raw_config("secret")).unwrap();

    assert!(source.check(&logger, &config).await.is_success());
}

#[tokio::test]
async fn test_read_relays_records_and_state() {
    let source = fake_tap();
    let logger = Logger::new(Emitter::capture());
    let config = source.configure(raw_config("secret")).unwrap();
    let catalog = ConfiguredCatalog {
        streams: vec![configured("leads", SyncMode::Incremental)],
    };

    source.read(&logger, &config, &catalog, None).await.unwrap();

    let written = std::fs::read_to_string(config.workdir().join("catalog.json")).unwrap();
    let singer = SingerCatalog::parse(&written).unwrap();
    let leads = singer.streams[0].stream_metadata().unwrap();
    assert_eq!(leads["selected"], json!(true));
    assert_eq!(leads["replication-method"], json!("INCREMENTAL"));

    let messages = logger.emitter().captured();
    let records: Vec<_> = messages
        .iter()
        .filter_map(|m| match m {
            Message::Record { record } => Some(record.data.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        records,
        vec![
            json!({"id": 1, "email": "ada@example.com"}),
            json!({"id": 2, "email": "alan@example.com"}),
        ]
    );

    let states: Vec<_> = messages
        .iter()
        .filter(|m| matches!(m, Message::State { .. }))
        .collect();
    assert_eq!(
        states,
        vec![&Message::state(
            json!({"bookmarks": {"leads": {"updatedAt": "2021-01-02T00:00:00Z"}}})
        )]
    );

    assert!(messages.contains(&Message::log(LogLevel::Info, "INFO Starting sync")));
}

#[tokio::test]
async fn test_read_forwards_state_file() {
    let source = fake_tap();
    let logger = Logger::new(Emitter::capture());
    let config = source.configure(raw_config("secret")).unwrap();
    let catalog = ConfiguredCatalog {
        streams: vec![configured("leads", SyncMode::Incremental)],
    };

    let state_path = config.workdir().join("state.json");
    std::fs::write(&state_path, r#"{"bookmarks": {"leads": {"updatedAt": "2020-12-01"}}}"#)
        .unwrap();

    source
        .read(&logger, &config, &catalog, Some(&state_path))
        .await
        .unwrap();

    let first_state = logger
        .emitter()
        .captured()
        .into_iter()
        .find(|m| matches!(m, Message::State { .. }))
        .unwrap();
    assert_eq!(
        first_state,
        Message::state(json!({"bookmarks": {"leads": {"updatedAt": "2020-12-01"}}}))
    );
}

#[tokio::test]
async fn test_read_unknown_stream() {
    let source = fake_tap();
    let logger = Logger::new(Emitter::capture());
    let config = source.configure(raw_config("secret")).unwrap();
    let catalog = ConfiguredCatalog {
        streams: vec![configured("opportunities", SyncMode::FullRefresh)],
    };

    let err = source.read(&logger, &config, &catalog, None).await.unwrap_err();
    assert!(matches!(err, Error::StreamNotFound { .. }));
}

#[tokio::test]
async fn test_read_fails_when_tap_fails() {
    let source = fake_tap();
    let logger = Logger::new(Emitter::capture());
    let config = source.configure(raw_config("secret")).unwrap();

    // Nothing selected: the fake tap refuses to run
    let catalog = ConfiguredCatalog::default();
    let err = source.read(&logger, &config, &catalog, None).await.unwrap_err();
    assert!(matches!(err, Error::TapFailed { code: Some(2), .. }));
}

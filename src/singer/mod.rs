//! Singer tap runtime
//!
//! A [`SingerSource`] only knows how to translate configuration and build
//! command lines. The default methods on the trait do the rest: render the
//! tap config, run discovery, patch the catalog with sync-mode overrides,
//! select streams for a read, and relay tap output to the host.
//!
//! # Overview
//!
//! - `SingerSource` - Hooks a tap-backed source implements
//! - `TapProcess` - Runs a generated command line
//! - `translate_line` - Singer stdout line → host message

mod process;
mod protocol;

pub use process::TapProcess;
pub use protocol::{translate_line, SingerMessage};

use crate::catalog::{Catalog, ConfiguredCatalog, SingerCatalog};
use crate::config::{ConfigContainer, TapConfig};
use crate::error::Result;
use crate::message::{ConnectionStatus, Logger};
use crate::streams::SyncModeOverride;
use crate::types::JsonValue;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// A source backed by an external Singer tap
#[async_trait]
pub trait SingerSource: Send + Sync {
    /// Connection specification shown to users
    fn spec(&self) -> Result<JsonValue>;

    /// Map host configuration onto the tap's configuration
    fn transform_config(&self, raw_config: &JsonValue) -> Result<TapConfig>;

    /// Command line that prints the tap's catalog
    fn discover_cmd(&self, logger: &Logger, config_path: &Path) -> String;

    /// Command line that replicates the selected streams
    fn read_cmd(
        &self,
        logger: &Logger,
        config_path: &Path,
        catalog_path: &Path,
        state_path: Option<&Path>,
    ) -> String;

    /// Sync-mode information that replaces what the tap reports, per stream
    fn get_sync_mode_overrides(&self) -> HashMap<String, SyncModeOverride> {
        HashMap::new()
    }

    /// Transform the host config and write it where the tap can read it
    fn configure(&self, raw_config: JsonValue) -> Result<ConfigContainer> {
        let tap_config = self.transform_config(&raw_config)?;
        ConfigContainer::new(raw_config, &tap_config)
    }

    /// Run the tap's discovery and parse its catalog
    async fn discover_singer_catalog(
        &self,
        logger: &Logger,
        config: &ConfigContainer,
    ) -> Result<SingerCatalog> {
        let cmd = self.discover_cmd(logger, &config.rendered_config_path);
        logger.debug(format!("Discovering with: {cmd}"));
        let output = TapProcess::new(cmd).run_capture().await?;
        SingerCatalog::parse(&output)
    }

    /// Discover the host catalog, with overrides applied
    async fn discover(&self, logger: &Logger, config: &ConfigContainer) -> Result<Catalog> {
        let singer = self.discover_singer_catalog(logger, config).await?;
        let mut catalog = singer.to_catalog();
        catalog.apply_overrides(&self.get_sync_mode_overrides());
        logger.info(format!("Discovered {} streams", catalog.streams.len()));
        Ok(catalog)
    }

    /// Check that the tap can reach its API
    async fn check(&self, logger: &Logger, config: &ConfigContainer) -> ConnectionStatus {
        match self.discover(logger, config).await {
            Ok(_) => ConnectionStatus::succeeded(),
            Err(e) => ConnectionStatus::failed(e.to_string()),
        }
    }

    /// Replicate the configured streams, relaying tap output to the host
    async fn read(
        &self,
        logger: &Logger,
        config: &ConfigContainer,
        catalog: &ConfiguredCatalog,
        state_path: Option<&Path>,
    ) -> Result<()> {
        let mut singer = self.discover_singer_catalog(logger, config).await?;
        singer.select_streams(catalog)?;

        let catalog_path = config.workdir().join("catalog.json");
        fs::write(&catalog_path, serde_json::to_string(&singer)?)?;

        let cmd = self.read_cmd(logger, &config.rendered_config_path, &catalog_path, state_path);
        logger.info(format!("Reading {} streams with: {cmd}", catalog.streams.len()));

        let emitter = logger.emitter().clone();
        TapProcess::new(cmd)
            .run_streaming(logger, |line| {
                if let Some(message) = translate_line(line) {
                    emitter.emit(&message);
                }
            })
            .await
    }
}

#[cfg(test)]
mod tests;

//! Marketo source
//!
//! Adapts `tap-marketo` to the host protocol. All extraction happens in the
//! tap; this type renames config keys, builds the tap's command lines and
//! forces the known Marketo streams into incremental mode.

use crate::config::{
    required_str, ConfigContainer, TapConfig, CLIENT_ID, CLIENT_SECRET, ENDPOINT_URL,
    IDENTITY_URL, START_DATE,
};
use crate::error::{Error, Result};
use crate::message::{ConnectionStatus, Logger};
use crate::singer::SingerSource;
use crate::streams::{incremental_overrides, SyncModeOverride};
use crate::types::JsonValue;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

/// Executable name of the tap
pub const TAP_CMD: &str = "tap-marketo";

/// Message reported to the host for every failed connection check
pub const CHECK_FAILED_MESSAGE: &str =
    "Unable to connect to the Marketo API with the provided credentials.";

/// Connection specification shipped with the connector
const SPEC_JSON: &str = include_str!("spec.json");

// ============================================================================
// Check Outcome
// ============================================================================

/// Why a connection check failed
#[derive(Debug)]
pub enum CheckFailure {
    /// Discovery failed; the cause is kept for logging only
    Unspecified(Error),
}

impl CheckFailure {
    /// The underlying error
    pub fn error(&self) -> &Error {
        match self {
            CheckFailure::Unspecified(e) => e,
        }
    }
}

/// Result of probing the Marketo API through the tap
#[derive(Debug)]
pub enum CheckOutcome {
    Succeeded,
    Failed(CheckFailure),
}

impl CheckOutcome {
    /// Whether the check succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, CheckOutcome::Succeeded)
    }

    /// Status for the host; failure detail never leaves the connector
    pub fn into_status(self) -> ConnectionStatus {
        match self {
            CheckOutcome::Succeeded => ConnectionStatus::succeeded(),
            CheckOutcome::Failed(_) => ConnectionStatus::failed(CHECK_FAILED_MESSAGE),
        }
    }
}

// ============================================================================
// Marketo Source
// ============================================================================

/// Source backed by `tap-marketo`
#[derive(Debug, Clone)]
pub struct MarketoSource {
    tap_command: String,
}

impl Default for MarketoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketoSource {
    /// Source invoking `tap-marketo` from `PATH`
    pub fn new() -> Self {
        Self::with_tap_command(TAP_CMD)
    }

    /// Source invoking a different tap command (wrapper script, pinned path)
    pub fn with_tap_command(tap_command: impl Into<String>) -> Self {
        Self {
            tap_command: tap_command.into(),
        }
    }

    /// The tap command prefix used in generated command lines
    pub fn tap_command(&self) -> &str {
        &self.tap_command
    }

    /// Probe the API by running discovery
    pub async fn check_connection(
        &self,
        logger: &Logger,
        config: &ConfigContainer,
    ) -> CheckOutcome {
        match self.discover(logger, config).await {
            Ok(_) => CheckOutcome::Succeeded,
            Err(e) => CheckOutcome::Failed(CheckFailure::Unspecified(e)),
        }
    }
}

#[async_trait]
impl SingerSource for MarketoSource {
    fn spec(&self) -> Result<JsonValue> {
        Ok(serde_json::from_str(SPEC_JSON)?)
    }

    fn transform_config(&self, raw_config: &JsonValue) -> Result<TapConfig> {
        Ok(TapConfig {
            endpoint: required_str(raw_config, ENDPOINT_URL)?.to_string(),
            identity: required_str(raw_config, IDENTITY_URL)?.to_string(),
            client_id: required_str(raw_config, CLIENT_ID)?.to_string(),
            client_secret: required_str(raw_config, CLIENT_SECRET)?.to_string(),
            start_date: required_str(raw_config, START_DATE)?.to_string(),
        })
    }

    fn discover_cmd(&self, _logger: &Logger, config_path: &Path) -> String {
        format!("{} -c {} --discover", self.tap_command, config_path.display())
    }

    fn read_cmd(
        &self,
        _logger: &Logger,
        config_path: &Path,
        catalog_path: &Path,
        state_path: Option<&Path>,
    ) -> String {
        // State is only forwarded when the host hands one over; without it the
        // tap runs a full refresh since it ignores the replication-method flag.
        let state_opt = state_path
            .map(|p| format!("--state {}", p.display()))
            .unwrap_or_default();
        format!(
            "{} -c {} -p {} {state_opt}",
            self.tap_command,
            config_path.display(),
            catalog_path.display()
        )
    }

    fn get_sync_mode_overrides(&self) -> HashMap<String, SyncModeOverride> {
        incremental_overrides()
    }

    async fn check(&self, logger: &Logger, config: &ConfigContainer) -> ConnectionStatus {
        let outcome = self.check_connection(logger, config).await;
        if let CheckOutcome::Failed(failure) = &outcome {
            let error = failure.error();
            logger.error("Exception while connecting to the Marketo API");
            logger.error(format!("{}: {error}", error.kind()));
        }
        outcome.into_status()
    }
}

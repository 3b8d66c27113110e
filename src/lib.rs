//! # Marketo Singer Source
//!
//! Source connector that runs the `tap-marketo` Singer tap on behalf of an
//! orchestration host. The tap does all the extraction work; this crate
//! translates configuration, builds the tap's command lines, forces the
//! known Marketo streams into incremental mode and relays the tap's output
//! as host protocol messages.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use source_marketo_singer::{Emitter, Logger, MarketoSource, SingerSource};
//!
//! #[tokio::main]
//! async fn main() -> source_marketo_singer::Result<()> {
//!     let source = MarketoSource::new();
//!     let logger = Logger::new(Emitter::default());
//!
//!     let config = source.configure(serde_json::json!({
//!         "endpoint_url": "https://123-ABC-456.mktorest.com/rest",
//!         "identity_url": "https://123-ABC-456.mktorest.com/identity",
//!         "client_id": "...",
//!         "client_secret": "...",
//!         "start_date": "2020-09-25T00:00:00Z"
//!     }))?;
//!
//!     let status = source.check(&logger, &config).await;
//!     let catalog = source.discover(&logger, &config).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        CLI (spec/check/discover/read)        │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┴───────────────────────────────┐
//! │  MarketoSource: transform_config, discover_cmd, read_cmd,    │
//! │                 get_sync_mode_overrides, check               │
//! ├──────────────────────────────────────────────────────────────┤
//! │  SingerSource defaults: configure → discover → select → read │
//! ├──────────────┬───────────────┬───────────────────────────────┤
//! │  TapProcess  │  SingerCatalog│  translate_line → Message     │
//! └──────────────┴───────────────┴───────────────────────────────┘
//!                                │  sh -c "tap-marketo ..."
//!                          ┌─────┴─────┐
//!                          │ tap-marketo│
//!                          └───────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Host configuration and the rendered tap config
pub mod config;

/// Streams forced into incremental mode
pub mod streams;

/// Host and Singer catalogs
pub mod catalog;

/// Host protocol messages and logging
pub mod message;

/// Singer tap runtime
pub mod singer;

/// The Marketo source
pub mod source;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use message::{ConnectionStatus, Emitter, Logger, Message};
pub use singer::SingerSource;
pub use source::{CheckFailure, CheckOutcome, MarketoSource, TAP_CMD};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

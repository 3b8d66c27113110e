//! CLI runner - executes commands

use crate::catalog::ConfiguredCatalog;
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_config_file, ConfigContainer};
use crate::error::Result;
use crate::message::{Emitter, Logger, Message};
use crate::singer::SingerSource;
use crate::source::MarketoSource;
use std::path::Path;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
    source: MarketoSource,
    logger: Logger,
}

impl Runner {
    /// Create a runner writing protocol messages to stdout
    pub fn new(cli: Cli) -> Self {
        let emitter = Emitter::Stdout {
            pretty: cli.format == OutputFormat::Pretty,
        };
        Self::with_emitter(cli, emitter)
    }

    /// Create a runner writing protocol messages to `emitter`
    pub fn with_emitter(cli: Cli, emitter: Emitter) -> Self {
        let source = MarketoSource::with_tap_command(cli.tap_command.clone());
        Self {
            cli,
            source,
            logger: Logger::new(emitter),
        }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Spec => self.spec(),
            Commands::Check { config } => self.check(config).await,
            Commands::Discover { config } => self.discover(config).await,
            Commands::Read {
                config,
                catalog,
                state,
            } => self.read(config, catalog, state.as_deref()).await,
        }
    }

    /// Load the host config and render the tap config
    fn configure(&self, path: &Path) -> Result<ConfigContainer> {
        let raw_config = load_config_file(path)?;
        let container = self.source.configure(raw_config)?;
        debug!(
            path = %container.rendered_config_path.display(),
            "Rendered tap config"
        );
        Ok(container)
    }

    fn emit(&self, message: &Message) {
        self.logger.emitter().emit(message);
    }

    /// Show spec
    fn spec(&self) -> Result<()> {
        let spec = self.source.spec()?;
        self.emit(&Message::Spec { spec });
        Ok(())
    }

    /// Check connection
    async fn check(&self, config: &Path) -> Result<()> {
        let config = self.configure(config)?;
        let status = self.source.check(&self.logger, &config).await;
        self.emit(&Message::connection_status(status));
        Ok(())
    }

    /// Discover streams
    async fn discover(&self, config: &Path) -> Result<()> {
        let config = self.configure(config)?;
        let catalog = self.source.discover(&self.logger, &config).await?;
        self.emit(&Message::Catalog { catalog });
        Ok(())
    }

    /// Read streams
    async fn read(&self, config: &Path, catalog: &Path, state: Option<&Path>) -> Result<()> {
        let config = self.configure(config)?;
        let catalog = ConfiguredCatalog::from_file(catalog)?;
        self.source
            .read(&self.logger, &config, &catalog, state)
            .await
    }
}

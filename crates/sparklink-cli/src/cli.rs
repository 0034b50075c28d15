//! Command-line arguments and the top-level run loop.

use clap::Parser;
use sparklink_app::{App, AppError, Runtime, SystemEnv};
use sparklink_core::{ConfigError, EngineConfig, PeerSelection, delay_from_secs};
use thiserror::Error;
use tracing::info;

use crate::{TerminalDriver, TerminalError};

/// SparkLink: proximity discovery and chat, simulated in the terminal.
#[derive(Debug, Clone, Parser)]
#[command(name = "sparklink", version, about)]
pub struct Args {
    /// Seconds between activating the beacon and finding a peer.
    #[arg(long, default_value_t = 2.0)]
    pub discovery_delay: f64,

    /// Seconds between sending a message and the peer's reply.
    #[arg(long, default_value_t = 1.5)]
    pub reply_delay: f64,

    /// Text of the peer's automatic reply.
    #[arg(long)]
    pub canned_reply: Option<String>,

    /// Draw discovered peers from the built-in catalogue instead of always
    /// finding the same one.
    #[arg(long)]
    pub random_peers: bool,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    pub log_filter: String,
}

impl Args {
    /// Engine configuration described by these arguments.
    pub fn config(&self) -> Result<EngineConfig, ConfigError> {
        let mut config = EngineConfig::default()
            .with_discovery_delay(delay_from_secs("discovery delay", self.discovery_delay)?)
            .with_reply_delay(delay_from_secs("reply delay", self.reply_delay)?);
        if let Some(reply) = &self.canned_reply {
            config = config.with_canned_reply(reply.clone());
        }
        if self.random_peers {
            config = config.with_peer_selection(PeerSelection::Catalog);
        }
        Ok(config)
    }
}

/// Errors that end the program.
#[derive(Debug, Error)]
pub enum CliError {
    /// Arguments describe an invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The app could not be constructed.
    #[error(transparent)]
    App(#[from] AppError),

    /// Terminal I/O failed.
    #[error(transparent)]
    Terminal(#[from] TerminalError),
}

/// Run the shell on stdin and stdout until `/quit` or end of input.
pub async fn run(args: Args) -> Result<(), CliError> {
    let config = args.config()?;
    info!(
        discovery_delay = ?config.discovery_delay,
        reply_delay = ?config.reply_delay,
        peers = ?config.peer_selection,
        "starting"
    );

    let app = App::new(SystemEnv, config)?;
    let mut runtime = Runtime::new(app, TerminalDriver::stdio());
    runtime.run().await?;

    info!("bye");
    Ok(())
}

//! `sparklink` binary.

use clap::Parser;
use sparklink_cli::{Args, CliError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let args = Args::parse();

    // Logs go to stderr so they never interleave with the rendered state.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    sparklink_cli::run(args).await
}

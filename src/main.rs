//! Entry point wiring CLI dispatch to the library modules.

use anyhow::Result;
use textmill::{cli::Cli, config::Settings, logging};
use tracing::{info, instrument};

#[tokio::main]
#[instrument]
async fn main() -> Result<()> {
    logging::init_tracing()?;
    let settings = Settings::load()?;
    let cli = Cli::parse();

    info!(?cli, "starting command");
    cli.dispatch(settings).await
}

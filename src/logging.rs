//! Structured logging bootstrap using `tracing`.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a global tracing subscriber with sensible defaults.
///
/// Batch runs are usually piped to a file, so the format stays single-line
/// with UTC timestamps. `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("textmill=info"))?;

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(fmt_layer).init();
    Ok(())
}

//! Runtime configuration utilities for textmill.

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Root folder for analytic outputs.
    pub outputs_dir: PathBuf,
    /// Default minimum term frequency applied when a subcommand does not set one.
    pub default_min_tf: usize,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let outputs_dir = env::var("OUTPUTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./outputs"));
        let default_min_tf = env::var("DEFAULT_MIN_TF")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);

        std::fs::create_dir_all(&outputs_dir).context("creating outputs dir")?;

        Ok(Self {
            outputs_dir,
            default_min_tf,
        })
    }

    /// Convenience helper for derived output path segments.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.outputs_dir.join(path)
    }
}

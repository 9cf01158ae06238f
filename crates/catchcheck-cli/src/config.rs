//! Configuration assembly for CLI commands

use anyhow::{Context, Result};
use catchcheck_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::{Path, PathBuf};

use crate::cli::Cli;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "catchcheck.toml";

/// Build the layered configuration: defaults, file, environment, CLI flags
pub fn load(cli: &Cli) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    if let Some(path) = config_path(cli.config.as_deref()) {
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
        tracing::debug!(path = %path.display(), "configuration file loaded");
    }

    let mut config = config.load_from_env();
    config.update_from_cli(CliConfigOverrides {
        oracle_model: cli.oracle_model.clone(),
        oracle_url: cli.oracle_url.clone(),
        location_timeout_secs: cli.location_timeout,
        search_limit: cli.search_limit,
    })?;

    Ok(config)
}

fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        }
    }
}

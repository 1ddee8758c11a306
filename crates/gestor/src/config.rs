//! CLI flag overrides on top of `gestor-config`.
//!
//! Core never sees these types -- it receives a pre-built `SessionConfig`
//! from `Config::to_session_config`.

use std::path::PathBuf;

use gestor_config::Config;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Config file in effect: `--config`/`GESTOR_CONFIG`, else the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(gestor_config::config_path)
}

/// Load the file and environment, then apply command-line overrides.
pub fn resolve(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = gestor_config::load_config_from(&config_path(global))?;

    if let Some(ref url) = global.base_url {
        cfg.base_url.clone_from(url);
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout = timeout;
    }
    if global.insecure {
        cfg.insecure = true;
    }
    Ok(cfg)
}

/// `--output` if given, else the config file's `output`, else table.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    use clap::ValueEnum;

    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&cfg.output, true).unwrap_or(OutputFormat::Table)
    })
}

//! Config subcommand handlers.

use std::io::IsTerminal;

use dialoguer::Input;

use gestor_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path(global);

    match args.command {
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }

            let mut cfg = Config::default();
            if let Some(ref url) = global.base_url {
                cfg.base_url.clone_from(url);
            } else if std::io::stdin().is_terminal() && !global.yes {
                cfg.base_url = Input::new()
                    .with_prompt("Backend API URL")
                    .default(cfg.base_url.clone())
                    .interact_text()
                    .map_err(prompt_err)?;
            }
            if let Some(timeout) = global.timeout {
                cfg.timeout = timeout;
            }
            cfg.insecure = global.insecure;

            // Reject an unusable URL before it reaches disk.
            cfg.to_session_config()?;
            gestor_config::save_config_to(&cfg, &path)?;
            if !global.quiet {
                eprintln!("Config written to {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::resolve(global)?;
            let format = config::output_format(global, &cfg);
            let out = match format {
                crate::cli::OutputFormat::Json => output::render_json_pretty(&cfg),
                crate::cli::OutputFormat::JsonCompact => output::render_json_compact(&cfg),
                crate::cli::OutputFormat::Yaml => output::render_yaml(&cfg),
                crate::cli::OutputFormat::Table | crate::cli::OutputFormat::Plain => {
                    toml::to_string_pretty(&cfg).map_err(|e| CliError::Validation {
                        field: "config".into(),
                        reason: format!("failed to serialize config: {e}"),
                    })?
                }
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }
    }
}

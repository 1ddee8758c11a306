mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gestor_core::Session;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a backend
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Entities => {
            let cfg = config::resolve(&cli.global)?;
            commands::entities::handle(&cli.global, config::output_format(&cli.global, &cfg));
            Ok(())
        }

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "gestor", &mut std::io::stdout());
            Ok(())
        }

        // All other commands talk to the backend
        cmd => {
            let cfg = config::resolve(&cli.global)?;
            let format = config::output_format(&cli.global, &cfg);
            let session = Session::new(cfg.to_session_config()?)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &session, &cli.global, format).await
        }
    }
}

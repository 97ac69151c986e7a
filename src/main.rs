//! Flybox - what can I tie with what I have?
//!
//! Main entry point for the flybox CLI application.

use std::process::ExitCode;

use anyhow::Context;
use console::style;
use tracing_subscriber::EnvFilter;

use flybox::cli::{self, Cli, Commands};
use flybox::config::Config;

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Run the application
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Set up logging based on CLI arguments, falling back to the configured level
fn setup_logging(cli: &Cli, config_level: &str) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        config_level
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Main application logic
fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.clone();

    // a broken file must not block `config reset` / `config init --force`
    let config = match (&cli.command, Config::load_from(config_path.as_deref())) {
        (Commands::Config(_), Err(e)) => {
            eprintln!("{} {}", style("Warning:").yellow().bold(), e);
            Config::default()
        }
        (_, loaded) => loaded.with_context(|| match &config_path {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => "Failed to load configuration".to_string(),
        })?,
    };

    setup_logging(&cli, &config.logging.level);
    console::set_colors_enabled(config.logging.color);

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Import(args) => {
            cli::execute_import(&args, &config)
                .with_context(|| format!("Import of {} failed", args.input.display()))?;
        }
        Commands::Export(args) => {
            cli::execute_export(&args, &config)?;
        }
        Commands::Flies(args) => {
            cli::execute_flies(&args, &config)?;
        }
        Commands::Materials(args) => {
            cli::execute_materials(&args, &config)?;
        }
        Commands::Inventory(args) => {
            cli::execute_inventory(&args, &config)?;
        }
        Commands::Tie(args) => {
            cli::execute_tie(&args, &config)?;
        }
        Commands::Unlock(args) => {
            cli::execute_unlock(&args, &config)?;
        }
        Commands::Score(args) => {
            cli::execute_score(&args, &config)?;
        }
        Commands::Config(args) => {
            cli::execute_config(&args, config_path.as_deref())?;
        }
    }

    Ok(())
}

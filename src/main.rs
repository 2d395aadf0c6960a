//! Cloudwire - typed AWS network stacks synthesized to CloudFormation
//!
//! This is the main entry point for the Cloudwire CLI.

use anyhow::Result;
use clap::Parser;
use cloudwire::cli::commands::{CommandContext, Runnable};
use cloudwire::cli::{Cli, Commands};
use cloudwire::config::{Config, LoggingConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application version information
const VERSION: &str = env!("CARGO_PKG_VERSION");
const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).unwrap_or_else(|e| {
        if cli.verbosity() >= 1 {
            eprintln!("Warning: Failed to load config: {:#}", e);
        }
        Config::default()
    });

    // Initialize logging based on verbosity
    init_logging(cli.verbosity(), &config.logging);

    // Display version if verbose
    if cli.verbosity() >= 2 {
        eprintln!("Cloudwire v{} by {}", VERSION, AUTHORS);
    }

    // Create command context
    let mut ctx = CommandContext::new(&cli, config);

    // Execute the appropriate command
    let exit_code = match &cli.command {
        Commands::Synth(args) => args.run(&mut ctx)?,
        Commands::List(args) => args.run(&mut ctx)?,
        Commands::Graph(args) => args.run(&mut ctx)?,
        Commands::Order(args) => args.run(&mut ctx)?,
        Commands::Validate(args) => args.run(&mut ctx)?,
    };

    ctx.output.flush();
    std::process::exit(exit_code);
}

/// Initialize logging based on verbosity level and the logging section
fn init_logging(verbosity: u8, logging: &LoggingConfig) {
    let filter = match verbosity {
        0 => logging.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    if logging.is_json() {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(verbosity >= 3)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
}

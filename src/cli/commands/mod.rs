//! Subcommands module for Cloudwire CLI
//!
//! This module contains all the subcommand implementations.

pub mod graph;
pub mod list;
pub mod order;
pub mod synth;
pub mod validate;

use crate::app::App;
use crate::cli::output::OutputFormatter;
use crate::config::Config;
use anyhow::{Context, Result};

/// Common context shared between commands
pub struct CommandContext {
    /// Configuration
    pub config: Config,
    /// Output formatter
    pub output: OutputFormatter,
    /// Verbosity level
    pub verbosity: u8,
}

impl CommandContext {
    /// Create a new command context from CLI arguments
    pub fn new(cli: &crate::cli::Cli, config: Config) -> Self {
        let use_color = !cli.no_color && config.colors.enabled;
        let output = OutputFormatter::new(use_color, cli.is_json(), cli.verbosity());

        Self {
            config,
            output,
            verbosity: cli.verbosity(),
        }
    }

    /// Build every stack with the configured settings
    pub fn build_app(&self) -> Result<App> {
        let settings = self.config.stack_settings()?;
        App::from_settings(&settings).context("Failed to build stacks")
    }
}

/// A subcommand that can be run against a context
pub trait Runnable {
    /// Execute the command, returning the process exit code
    fn run(&self, ctx: &mut CommandContext) -> Result<i32>;
}

//! CLI module for Cloudwire
//!
//! This module provides the command-line interface for Cloudwire,
//! including argument parsing, configuration loading, and subcommand handling.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Cloudwire - typed AWS network stacks synthesized to CloudFormation
#[derive(Parser, Debug, Clone)]
#[command(name = "cloudwire")]
#[command(author = "Cloudwire Contributors")]
#[command(version)]
#[command(about = "Synthesize the private VPC and simulated on-premises network stacks", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "CLOUDWIRE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Validate stacks and write their templates
    Synth(commands::synth::SynthArgs),

    /// List the known stacks
    List(commands::list::ListArgs),

    /// Print a stack's dependency graph in DOT format
    Graph(commands::graph::GraphArgs),

    /// Print the creation or teardown order of a stack
    Order(commands::order::OrderArgs),

    /// Validate every stack and the cross-stack address plan
    Validate(commands::validate::ValidateArgs),
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-3)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }

    /// Check if JSON output is requested
    pub fn is_json(&self) -> bool {
        matches!(self.output, OutputFormat::Json)
    }
}

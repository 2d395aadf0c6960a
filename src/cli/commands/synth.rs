//! Synth command - write the cloud assembly
//!
//! Validates the selected stacks and writes one template per stack plus
//! `manifest.json` into the output directory.

use super::{CommandContext, Runnable};
use crate::app::TemplateFormat;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Arguments for the synth command
#[derive(Parser, Debug, Clone)]
pub struct SynthArgs {
    /// Stacks to synthesize (all when omitted)
    pub stacks: Vec<String>,

    /// Output directory (defaults to `synth.output_dir`)
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Template format (defaults to `synth.format`)
    #[arg(long)]
    pub format: Option<TemplateFormat>,
}

impl SynthArgs {
    /// Execute the synth command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let app = ctx.build_app()?;
        let directory = self
            .output_dir
            .clone()
            .unwrap_or_else(|| ctx.config.synth.output_dir.clone());
        let format = self.format.unwrap_or(ctx.config.synth.format);

        ctx.output.banner("CLOUDWIRE SYNTH");
        ctx.output
            .info(&format!("Writing cloud assembly to {}", directory.display()));

        let assembly = match app.synth(&directory, format, &self.stacks) {
            Ok(assembly) => assembly,
            Err(e) => {
                ctx.output.error(&e.to_string());
                return Ok(e.exit_code());
            }
        };

        if ctx.output.is_json() {
            ctx.output.json(&serde_json::to_value(&assembly.manifest)?);
        } else {
            let rows: Vec<Vec<String>> = assembly
                .manifest
                .artifacts
                .iter()
                .map(|(name, artifact)| {
                    vec![
                        name.clone(),
                        artifact.template_file.clone(),
                        artifact.resources.to_string(),
                        artifact.outputs.to_string(),
                    ]
                })
                .collect();
            ctx.output
                .table(&["Stack", "Template", "Resources", "Outputs"], &rows);
            ctx.output
                .success(&format!("assembly written to {}", directory.display()));
        }

        Ok(0)
    }
}

impl Runnable for SynthArgs {
    fn run(&self, ctx: &mut CommandContext) -> Result<i32> {
        self.execute(ctx)
    }
}

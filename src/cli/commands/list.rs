//! List command - show the known stacks

use super::{CommandContext, Runnable};
use anyhow::Result;
use clap::Parser;
use serde_json::json;

/// Arguments for the list command
#[derive(Parser, Debug, Clone)]
pub struct ListArgs {}

impl ListArgs {
    /// Execute the list command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let app = ctx.build_app()?;

        if ctx.output.is_json() {
            let stacks: Vec<_> = app
                .stacks()
                .iter()
                .map(|s| {
                    json!({
                        "name": s.name(),
                        "description": s.description(),
                        "resources": s.resource_count(),
                        "outputs": s.outputs().len(),
                    })
                })
                .collect();
            ctx.output.json(&json!({ "stacks": stacks }));
            return Ok(0);
        }

        let rows: Vec<Vec<String>> = app
            .stacks()
            .iter()
            .map(|s| {
                vec![
                    s.name().to_string(),
                    s.resource_count().to_string(),
                    s.outputs().len().to_string(),
                    s.description().unwrap_or_default().to_string(),
                ]
            })
            .collect();
        ctx.output
            .table(&["Stack", "Resources", "Outputs", "Description"], &rows);

        Ok(0)
    }
}

impl Runnable for ListArgs {
    fn run(&self, ctx: &mut CommandContext) -> Result<i32> {
        self.execute(ctx)
    }
}

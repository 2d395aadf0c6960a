//! Graph command - dependency graph of a stack as Graphviz DOT

use super::{CommandContext, Runnable};
use anyhow::Result;
use clap::Parser;
use serde_json::json;

/// Arguments for the graph command
#[derive(Parser, Debug, Clone)]
pub struct GraphArgs {
    /// Stack to render
    pub stack: String,
}

impl GraphArgs {
    /// Execute the graph command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let app = ctx.build_app()?;
        let graph = match app.stack(&self.stack).and_then(|s| s.dependency_graph()) {
            Ok(graph) => graph,
            Err(e) => {
                ctx.output.error(&e.to_string());
                return Ok(e.exit_code());
            }
        };

        for cycle in graph.get_cycles() {
            ctx.output
                .warning(&format!("dependency cycle: {}", cycle.join(" -> ")));
        }

        if ctx.output.is_json() {
            ctx.output.json(&json!({
                "stack": self.stack,
                "nodes": graph.node_count(),
                "edges": graph.edge_count(),
                "dot": graph.to_dot(),
            }));
        } else {
            ctx.output.raw(&graph.to_dot());
        }

        Ok(0)
    }
}

impl Runnable for GraphArgs {
    fn run(&self, ctx: &mut CommandContext) -> Result<i32> {
        self.execute(ctx)
    }
}

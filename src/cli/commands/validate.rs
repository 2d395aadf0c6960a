//! Validate command - check every stack and the cross-stack address plan

use super::{CommandContext, Runnable};
use crate::address_plan;
use crate::error::Error;
use anyhow::Result;
use clap::Parser;
use serde_json::json;

/// Arguments for the validate command
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let app = ctx.build_app()?;
        let mut failures = Vec::new();

        ctx.output.section("Stacks");
        for stack in app.stacks() {
            match stack.validate() {
                Ok(graph) => ctx.output.success(&format!(
                    "{} ({} resources, {} dependencies)",
                    stack.name(),
                    graph.node_count(),
                    graph.edge_count()
                )),
                Err(e) => {
                    let message = failure_message(stack.name(), &e);
                    ctx.output.error(&message);
                    failures.push(message);
                }
            }
        }

        ctx.output.section("Address plan");
        let plan = match address_plan::verify(app.stacks()) {
            Ok(plan) => {
                for network in &plan.networks {
                    ctx.output
                        .success(&format!("{} uses {}", network.stack, network.cidr));
                }
                Some(plan)
            }
            Err(e) => {
                ctx.output.error(&e.to_string());
                failures.push(e.to_string());
                None
            }
        };

        if ctx.output.is_json() {
            ctx.output.json(&json!({
                "valid": failures.is_empty(),
                "failures": failures,
                "networks": plan.map(|p| p.networks),
            }));
        }

        Ok(if failures.is_empty() { 0 } else { 1 })
    }
}

/// Label a stack failure by whether the dependency graph itself is broken.
fn failure_message(stack: &str, error: &Error) -> String {
    let kind = if error.is_ordering_violation() {
        "dependency error"
    } else {
        "declaration error"
    };
    format!("{}: {}: {}", stack, kind, error)
}

impl Runnable for ValidateArgs {
    fn run(&self, ctx: &mut CommandContext) -> Result<i32> {
        self.execute(ctx)
    }
}

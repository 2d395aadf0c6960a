//! Order command - creation or teardown order of a stack

use super::{CommandContext, Runnable};
use anyhow::Result;
use clap::Parser;
use serde_json::json;

/// Arguments for the order command
#[derive(Parser, Debug, Clone)]
pub struct OrderArgs {
    /// Stack to order
    pub stack: String,

    /// Print deletion order instead of creation order
    #[arg(long)]
    pub teardown: bool,
}

impl OrderArgs {
    /// Execute the order command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let app = ctx.build_app()?;
        let order = app.stack(&self.stack).and_then(|s| {
            let graph = s.validate()?;
            if self.teardown {
                graph.teardown_order()
            } else {
                graph.creation_order()
            }
        });
        let order = match order {
            Ok(order) => order,
            Err(e) => {
                ctx.output.error(&e.to_string());
                return Ok(e.exit_code());
            }
        };

        let direction = if self.teardown { "teardown" } else { "creation" };
        if ctx.output.is_json() {
            ctx.output.json(&json!({
                "stack": self.stack,
                "direction": direction,
                "order": order,
            }));
        } else {
            let items: Vec<String> = order
                .iter()
                .enumerate()
                .map(|(i, id)| format!("{:>3}. {}", i + 1, id))
                .collect();
            ctx.output
                .list(&format!("{} order of {}", direction, self.stack), &items);
        }

        Ok(0)
    }
}

impl Runnable for OrderArgs {
    fn run(&self, ctx: &mut CommandContext) -> Result<i32> {
        self.execute(ctx)
    }
}

//! Output formatting module for Cloudwire
//!
//! Provides colored human output and a line-delimited JSON mode.

use colored::Colorize;
use serde_json::Value;
use std::io::{self, Write};

/// Output formatter for different output modes
pub struct OutputFormatter {
    /// Use colored output
    use_color: bool,
    /// JSON output mode
    json_mode: bool,
    /// Verbosity level
    verbosity: u8,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(use_color: bool, json_mode: bool, verbosity: u8) -> Self {
        // Respect NO_COLOR environment variable
        let use_color = use_color && std::env::var("NO_COLOR").is_err();

        Self {
            use_color,
            json_mode,
            verbosity,
        }
    }

    pub fn is_json(&self) -> bool {
        self.json_mode
    }

    fn emit(value: &Value, pretty: bool) -> String {
        let rendered = if pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.unwrap_or_default()
    }

    /// Print a banner/header
    pub fn banner(&self, title: &str) {
        if self.json_mode {
            return;
        }

        let line = "=".repeat(title.len() + 4);
        if self.use_color {
            println!("\n{}", line.bright_blue());
            println!("{}", format!("  {}  ", title).bright_blue().bold());
            println!("{}\n", line.bright_blue());
        } else {
            println!("\n{}", line);
            println!("  {}  ", title);
            println!("{}\n", line);
        }
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        if self.json_mode {
            return;
        }

        if self.use_color {
            println!("\n{}", title.cyan().bold());
            println!("{}", "-".repeat(title.len()).cyan());
        } else {
            println!("\n{}", title);
            println!("{}", "-".repeat(title.len()));
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.json_mode {
            let err = serde_json::json!({
                "type": "error",
                "message": message
            });
            eprintln!("{}", Self::emit(&err, false));
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "ERROR:".red().bold(), message);
        } else {
            eprintln!("ERROR: {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.json_mode {
            let warn = serde_json::json!({
                "type": "warning",
                "message": message
            });
            eprintln!("{}", Self::emit(&warn, false));
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "WARNING:".yellow().bold(), message);
        } else {
            eprintln!("WARNING: {}", message);
        }
    }

    /// Print an info message (respects verbosity)
    pub fn info(&self, message: &str) {
        if self.verbosity < 1 {
            return;
        }

        if self.json_mode {
            let info = serde_json::json!({
                "type": "info",
                "message": message
            });
            println!("{}", Self::emit(&info, false));
            return;
        }

        if self.use_color {
            println!("{} {}", "INFO:".blue(), message);
        } else {
            println!("INFO: {}", message);
        }
    }

    /// Print a success line (always shown in human mode)
    pub fn success(&self, message: &str) {
        if self.json_mode {
            return;
        }

        if self.use_color {
            println!("{} {}", "ok:".green().bold(), message);
        } else {
            println!("ok: {}", message);
        }
    }

    /// Print raw text unchanged, in either mode
    pub fn raw(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a JSON document (JSON mode only)
    pub fn json(&self, value: &Value) {
        if self.json_mode {
            println!("{}", Self::emit(value, true));
        }
    }

    /// Print a list of items
    pub fn list(&self, title: &str, items: &[String]) {
        if self.json_mode {
            let list = serde_json::json!({
                "type": "list",
                "title": title,
                "items": items
            });
            println!("{}", Self::emit(&list, true));
            return;
        }

        if self.use_color {
            println!("\n{}:", title.bright_white().bold());
        } else {
            println!("\n{}:", title);
        }

        for item in items {
            if self.use_color {
                println!("  {} {}", "-".bright_black(), item);
            } else {
                println!("  - {}", item);
            }
        }
    }

    /// Print a table
    pub fn table(&self, headers: &[&str], rows: &[Vec<String>]) {
        if self.json_mode {
            let table = serde_json::json!({
                "type": "table",
                "headers": headers,
                "rows": rows
            });
            println!("{}", Self::emit(&table, true));
            return;
        }

        // Calculate column widths
        let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.len());
                }
            }
        }

        let header_line = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" | ");
        if self.use_color {
            println!("{}", header_line.bright_white().bold());
        } else {
            println!("{}", header_line);
        }

        let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        if self.use_color {
            println!("{}", sep.join("-+-").bright_black());
        } else {
            println!("{}", sep.join("-+-"));
        }

        for row in rows {
            let row_line = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:width$}", cell, width = width))
                .collect::<Vec<_>>()
                .join(" | ");
            println!("{}", row_line);
        }
    }

    /// Flush stdout
    pub fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

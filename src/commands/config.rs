//! Config Command - Configuration inspection
//!
//! Shows the effective configuration and where it is read from.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::Cli;
use crate::config::{self, Config};
use crate::context::CliContext;
use crate::exit_codes;
use crate::output::OutputFormat;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Show configuration file locations
    Path,
}

/// Effective settings for JSON output
#[derive(Debug, Serialize)]
struct EffectiveConfig<'a> {
    project: Option<&'a str>,
    dlp_endpoint: &'a str,
    pubsub_endpoint: &'a str,
    completion_timeout_secs: u64,
    settle_delay_ms: u128,
    pull_interval_ms: u128,
    max_messages: u32,
    file: &'a Config,
}

#[derive(Debug, Serialize)]
struct ConfigPaths {
    active: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
}

/// Run the config command
pub fn run(ctx: &CliContext, cli: &Cli, args: &ConfigArgs) -> Result<i32> {
    match &args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Path => show_path(ctx, cli),
    }
}

fn show_config(ctx: &CliContext) -> Result<i32> {
    match ctx.output.format() {
        OutputFormat::Json => {
            ctx.output.json(&EffectiveConfig {
                project: ctx.project_id.as_deref(),
                dlp_endpoint: &ctx.dlp_endpoint,
                pubsub_endpoint: &ctx.pubsub_endpoint,
                completion_timeout_secs: ctx.watch.completion_timeout.as_secs(),
                settle_delay_ms: ctx.watch.settle_delay.as_millis(),
                pull_interval_ms: ctx.watch.pull_interval.as_millis(),
                max_messages: ctx.watch.max_messages,
                file: &ctx.config,
            })?;
        }
        OutputFormat::Table | OutputFormat::Plain => {
            ctx.output.header("Current Configuration");

            ctx.output.result("[project]");
            ctx.output.result(&format!(
                "  id: {}",
                ctx.project_id.as_deref().unwrap_or("(not set)")
            ));

            ctx.output.result("\n[endpoints]");
            ctx.output.result(&format!("  dlp: {}", ctx.dlp_endpoint));
            ctx.output.result(&format!("  pubsub: {}", ctx.pubsub_endpoint));

            ctx.output.result("\n[watch]");
            ctx.output.result(&format!(
                "  completion_timeout_secs: {}",
                ctx.watch.completion_timeout.as_secs()
            ));
            ctx.output.result(&format!(
                "  settle_delay_ms: {}",
                ctx.watch.settle_delay.as_millis()
            ));
            ctx.output.result(&format!(
                "  pull_interval_ms: {}",
                ctx.watch.pull_interval.as_millis()
            ));
            ctx.output
                .result(&format!("  max_messages: {}", ctx.watch.max_messages));
        }
    }

    Ok(exit_codes::SUCCESS)
}

fn show_path(ctx: &CliContext, cli: &Cli) -> Result<i32> {
    let search_paths = config::search_paths();
    let active = cli
        .config
        .clone()
        .or_else(|| search_paths.iter().find(|p| p.is_file()).cloned());

    match ctx.output.format() {
        OutputFormat::Json => {
            ctx.output.json(&ConfigPaths {
                active,
                search_paths,
            })?;
        }
        OutputFormat::Table | OutputFormat::Plain => {
            match &active {
                Some(path) => ctx.output.result(&format!("Active: {}", path.display())),
                None => ctx.output.result("Active: (none, using defaults)"),
            }
            ctx.output.result("Search paths:");
            for path in &search_paths {
                let marker = if path.is_file() { "✓" } else { " " };
                ctx.output
                    .result(&format!("  {} {}", marker, path.display()));
            }
        }
    }

    Ok(exit_codes::SUCCESS)
}

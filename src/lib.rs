//! bucketscan - Cloud DLP from the command line
//!
//! This crate provides a CLI for the Cloud Data Loss Prevention service:
//! - **Bucket inspection**: submit an inspection job for a Cloud Storage
//!   object, wait for its completion notice on a Pub/Sub subscription, and
//!   print per-detector finding counts
//! - **Content inspection**: inspect a string or local file synchronously
//! - **Masking**: replace sensitive characters in a string with a mask
//!   character
//!
//! The job status query is always authoritative. A missing completion
//! notification only delays the result; it never fails the run.

pub mod application;
pub mod commands;
pub mod config;
pub mod constants;
pub mod context;
pub mod dlp_client;
pub mod dlp_types;
pub mod error;
pub mod http;
pub mod likelihood;
pub mod output;
pub mod pubsub;
pub mod render;
pub mod request;
pub mod watcher;

pub use context::CliContext;
pub use dlp_client::DlpClient;
pub use error::{RemoteError, ScanError};
pub use output::{OutputFormat, OutputWriter};
pub use pubsub::PubSubClient;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// bucketscan - Find and mask sensitive data with Cloud DLP
#[derive(Parser, Debug)]
#[command(
    name = "bucketscan",
    version,
    about = "Find and mask sensitive data with Cloud DLP",
    long_about = "bucketscan inspects Cloud Storage objects, strings and local files for \
                  sensitive data using the Cloud DLP service, and masks sensitive values \
                  in strings.\n\n\
                  Bucket inspection runs as a DLP job. Completion is announced on a Pub/Sub \
                  topic; bucketscan listens on a subscription to that topic, then reports \
                  the job's findings per info type."
)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except results and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Cloud project to run DLP and Pub/Sub calls in
    #[arg(short, long, global = true, env = "GOOGLE_CLOUD_PROJECT")]
    pub project: Option<String>,

    /// OAuth access token (e.g. from `gcloud auth print-access-token`)
    #[arg(
        long,
        global = true,
        env = "GOOGLE_OAUTH_ACCESS_TOKEN",
        hide_env_values = true
    )]
    pub access_token: Option<String>,

    /// Cloud DLP endpoint (default: https://dlp.googleapis.com)
    #[arg(long, global = true, env = "BUCKETSCAN_DLP_ENDPOINT")]
    pub dlp_endpoint: Option<String>,

    /// Cloud Pub/Sub endpoint (default: https://pubsub.googleapis.com)
    #[arg(long, global = true, env = "BUCKETSCAN_PUBSUB_ENDPOINT")]
    pub pubsub_endpoint: Option<String>,

    /// Seconds to wait for a job completion notification before polling
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect a Cloud Storage object, a string, or a local file
    #[command(visible_alias = "i")]
    Inspect(commands::inspect::InspectArgs),

    /// De-identify sensitive data in a string
    #[command(visible_alias = "deid")]
    Deidentify(commands::deidentify::DeidentifyArgs),

    /// Configuration management
    #[command(visible_alias = "cfg")]
    Config(commands::config::ConfigArgs),
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
    context: CliContext,
}

impl CliApp {
    /// Create a new CLI application instance
    pub fn new() -> anyhow::Result<Self> {
        Self::from_cli(Cli::parse())
    }

    /// Create from already-parsed arguments
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let context = CliContext::new(&cli)?;
        Ok(Self { cli, context })
    }

    /// Run the CLI application
    pub async fn run(self) -> anyhow::Result<i32> {
        let context = self.context;

        let exit_code = match self.cli.command {
            Commands::Inspect(ref args) => commands::inspect::run(&context, args).await,
            Commands::Deidentify(ref args) => commands::deidentify::run(&context, args).await,
            Commands::Config(ref args) => commands::config::run(&context, &self.cli, args),
        }?;

        Ok(exit_code)
    }
}

/// Exit codes, one per failing stage
pub mod exit_codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// Configuration or input error (also clap usage errors)
    pub const CONFIG_ERROR: i32 = 2;
    /// The inspection job could not be submitted
    pub const SUBMISSION_ERROR: i32 = 3;
    /// The notification subscription could not be opened
    pub const WATCH_SETUP_ERROR: i32 = 4;
    /// The job status query failed
    pub const STATUS_QUERY_ERROR: i32 = 5;
    /// De-identification failed
    pub const TRANSFORM_ERROR: i32 = 6;
    /// Synchronous content inspection failed
    pub const INSPECT_ERROR: i32 = 7;
    /// Internal error
    pub const INTERNAL_ERROR: i32 = 99;
}

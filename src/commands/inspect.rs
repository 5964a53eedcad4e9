//! Inspect Command - Sensitive data inspection
//!
//! `inspect gcs` submits a DLP job for a Cloud Storage object and waits for
//! its completion notice; `inspect string` and `inspect file` inspect content
//! synchronously.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Subcommand};

use crate::application::exit_policy::{failure_exit_code, success_exit_code};
use crate::application::use_cases::{InspectContentUseCase, InspectStorageUseCase};
use crate::context::CliContext;
use crate::dlp_types::InspectContentRequest;
use crate::error::ScanError;
use crate::exit_codes;
use crate::likelihood::Likelihood;
use crate::output::ProgressIndicator;
use crate::request::{self, DetectorOptions, StorageScanConfig};
use crate::watcher::NotificationChannel;

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(subcommand)]
    pub target: InspectTarget,
}

#[derive(Subcommand, Debug)]
pub enum InspectTarget {
    /// Inspect a Cloud Storage object with a DLP job
    Gcs(GcsArgs),
    /// Inspect a string
    String(StringArgs),
    /// Inspect a local file
    File(FileArgs),
}

/// Detector selection shared by every inspect mode
#[derive(Args, Debug, Clone)]
pub struct DetectorArgs {
    /// Built-in info types to look for (e.g. EMAIL_ADDRESS PHONE_NUMBER)
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub info_types: Vec<String>,

    /// Custom word lists, each a comma-separated list of words
    #[arg(long, num_args = 1..)]
    pub custom_dictionaries: Vec<String>,

    /// Custom regular expressions
    #[arg(long, num_args = 1..)]
    pub custom_regexes: Vec<String>,

    /// Minimum likelihood to report (VERY_UNLIKELY, UNLIKELY, POSSIBLE, LIKELY, VERY_LIKELY)
    #[arg(long, default_value = Likelihood::Unspecified.as_str())]
    pub min_likelihood: String,

    /// Maximum findings to report (0 = service default)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub max_findings: i64,

    /// Include the matched text in findings
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub include_quote: bool,
}

impl DetectorArgs {
    fn to_options(&self) -> DetectorOptions {
        DetectorOptions {
            info_types: self.info_types.clone(),
            custom_dictionaries: self.custom_dictionaries.clone(),
            custom_regexes: self.custom_regexes.clone(),
            min_likelihood: self.min_likelihood.clone(),
            max_findings: self.max_findings,
            include_quote: self.include_quote,
        }
    }
}

#[derive(Args, Debug)]
pub struct GcsArgs {
    /// Bucket holding the object
    #[arg(long)]
    pub bucket: String,

    /// Object name within the bucket
    #[arg(long)]
    pub file: String,

    /// Pub/Sub topic DLP publishes the completion notice to
    #[arg(long)]
    pub topic: String,

    /// Pull subscription on that topic
    #[arg(long)]
    pub subscription: String,

    #[command(flatten)]
    pub detectors: DetectorArgs,
}

#[derive(Args, Debug)]
pub struct StringArgs {
    /// Text to inspect
    pub text: String,

    #[command(flatten)]
    pub detectors: DetectorArgs,
}

#[derive(Args, Debug)]
pub struct FileArgs {
    /// Path of the file to inspect
    pub path: PathBuf,

    #[command(flatten)]
    pub detectors: DetectorArgs,
}

/// Run the inspect command
pub async fn run(ctx: &CliContext, args: &InspectArgs) -> Result<i32> {
    match &args.target {
        InspectTarget::Gcs(gcs) => run_gcs(ctx, gcs).await,
        InspectTarget::String(string) => run_string(ctx, string).await,
        InspectTarget::File(file) => run_file(ctx, file).await,
    }
}

async fn run_gcs(ctx: &CliContext, args: &GcsArgs) -> Result<i32> {
    let project = match ctx.require_project() {
        Ok(project) => project,
        Err(e) => return Ok(failure_exit_code(&ctx.output, &e)),
    };

    let scan = match request::build_scan_request(&StorageScanConfig {
        project_id: project.to_string(),
        bucket: args.bucket.clone(),
        file: args.file.clone(),
        topic: Some(args.topic.clone()),
        detectors: args.detectors.to_options(),
    }) {
        Ok(scan) => scan,
        Err(e) => return Ok(failure_exit_code(&ctx.output, &e)),
    };

    let dlp = ctx.dlp_client()?;
    let channel: Arc<dyn NotificationChannel> =
        Arc::new(ctx.pubsub_client(project, &args.subscription)?);

    ctx.output.header("Cloud Storage Inspection");
    ctx.output.info(&format!("Inspecting {}", scan.storage_url));
    ctx.output
        .debug(&format!("Completion notices on {}", scan.notification_topic));

    let progress = (!ctx.output.is_quiet()).then(|| {
        ProgressIndicator::spinner(&format!(
            "Waiting for job completion (up to {}s)...",
            ctx.watch.completion_timeout.as_secs()
        ))
    });

    let result = InspectStorageUseCase::execute(&dlp, channel, &scan, ctx.watch.clone()).await;

    if let Some(p) = &progress {
        p.finish_and_clear();
    }

    match result {
        Ok(report) => {
            if report.notified {
                ctx.output.success("Completion notification received");
            } else {
                ctx.output
                    .warn("No completion notification received; showing last known job status");
            }
            ctx.output.scan_report(&report)?;
            Ok(success_exit_code())
        }
        Err(e) => Ok(failure_exit_code(&ctx.output, &e)),
    }
}

async fn run_string(ctx: &CliContext, args: &StringArgs) -> Result<i32> {
    let body = request::build_string_inspection(&args.text, &args.detectors.to_options());
    inspect_content(ctx, body).await
}

async fn run_file(ctx: &CliContext, args: &FileArgs) -> Result<i32> {
    let data = match std::fs::read(&args.path) {
        Ok(data) => data,
        Err(e) => {
            ctx.output
                .error(&format!("Failed to read {:?}: {}", args.path, e));
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    ctx.output
        .debug(&format!("Read {} bytes from {:?}", data.len(), args.path));

    let body = request::build_file_inspection(&args.path, &data, &args.detectors.to_options());
    inspect_content(ctx, body).await
}

async fn inspect_content(
    ctx: &CliContext,
    body: Result<InspectContentRequest, ScanError>,
) -> Result<i32> {
    let resolved = ctx
        .require_project()
        .and_then(request::project_parent)
        .and_then(|parent| body.map(|body| (parent, body)));
    let (parent, body) = match resolved {
        Ok(resolved) => resolved,
        Err(e) => return Ok(failure_exit_code(&ctx.output, &e)),
    };

    let dlp = ctx.dlp_client()?;
    match InspectContentUseCase::execute(&dlp, &parent, &body).await {
        Ok(report) => {
            ctx.output
                .content_report(&report)
                .context("Failed to write inspection results")?;
            Ok(success_exit_code())
        }
        Err(e) => Ok(failure_exit_code(&ctx.output, &e)),
    }
}

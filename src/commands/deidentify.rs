//! Deidentify Command - Character masking
//!
//! Sends a string to the DLP service with a character-mask transformation and
//! prints the masked value exactly as returned.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::application::exit_policy::{failure_exit_code, success_exit_code};
use crate::application::use_cases::DeidentifyUseCase;
use crate::context::CliContext;
use crate::output::OutputFormat;
use crate::request::MaskingOptions;

/// Arguments for the deidentify command
#[derive(Args, Debug)]
pub struct DeidentifyArgs {
    #[command(subcommand)]
    pub command: DeidentifyCommand,
}

#[derive(Subcommand, Debug)]
pub enum DeidentifyCommand {
    /// Mask sensitive characters with a masking character
    Mask(MaskArgs),
}

#[derive(Args, Debug)]
pub struct MaskArgs {
    /// Text to de-identify
    pub text: String,

    /// Info types to mask (e.g. US_SOCIAL_SECURITY_NUMBER)
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub info_types: Vec<String>,

    /// Character used to mask sensitive data
    #[arg(long, default_value = "*")]
    pub masking_character: String,

    /// Number of characters to mask (0 = all)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub number_to_mask: i64,

    /// Mask from the end of each match instead of the start
    #[arg(long)]
    pub reverse_order: bool,
}

#[derive(Debug, Serialize)]
struct MaskResult<'a> {
    value: &'a str,
}

/// Run the deidentify command
pub async fn run(ctx: &CliContext, args: &DeidentifyArgs) -> Result<i32> {
    match &args.command {
        DeidentifyCommand::Mask(mask) => run_mask(ctx, mask).await,
    }
}

async fn run_mask(ctx: &CliContext, args: &MaskArgs) -> Result<i32> {
    let project = match ctx.require_project() {
        Ok(project) => project,
        Err(e) => return Ok(failure_exit_code(&ctx.output, &e)),
    };

    let options = MaskingOptions {
        project_id: project.to_string(),
        value: args.text.clone(),
        info_types: args.info_types.clone(),
        masking_character: args.masking_character.clone(),
        number_to_mask: args.number_to_mask,
        reverse_order: args.reverse_order,
    };

    let dlp = ctx.dlp_client()?;
    match DeidentifyUseCase::execute(&dlp, &options).await {
        Ok(masked) => {
            match ctx.output.format() {
                OutputFormat::Json => ctx.output.json(&MaskResult { value: &masked })?,
                OutputFormat::Table | OutputFormat::Plain => ctx.output.result(&masked),
            }
            Ok(success_exit_code())
        }
        Err(e) => Ok(failure_exit_code(&ctx.output, &e)),
    }
}

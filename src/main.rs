//! bucketscan - Main entry point
//!
//! Inspect Cloud Storage objects and mask strings with Cloud DLP.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use bucketscan::{Cli, CliApp, exit_codes};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);

    let app = match CliApp::from_cli(cli) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(exit_codes::CONFIG_ERROR);
        }
    };

    let exit_code = match app.run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_codes::INTERNAL_ERROR
        }
    };

    std::process::exit(exit_code);
}

/// Initialize tracing/logging for the CLI. Logs go to stderr so results on
/// stdout stay machine-readable.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,bucketscan=debug"
    } else {
        "warn,bucketscan=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

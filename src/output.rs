//! Output Formatting - Table, JSON, and plain text output
//!
//! This module provides consistent output formatting across all CLI commands.
//! Results go to stdout; status messages go to stdout unless quiet, and
//! warnings and errors go to stderr.

use std::io;

use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::{Style, style};
use serde::Serialize;

use crate::likelihood::Likelihood;
use crate::render::{ContentReport, Findings, ScanReport};

/// Output format options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table format (default for interactive use)
    #[default]
    Table,
    /// JSON output for machine processing
    Json,
    /// Plain text output (minimal formatting)
    Plain,
}

/// Output writer that handles formatting based on configuration
pub struct OutputWriter {
    format: OutputFormat,
    quiet: bool,
    verbose: bool,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, quiet: bool, verbose: bool) -> Self {
        Self {
            format,
            quiet,
            verbose,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Whether decorative status lines should be printed
    fn chatty(&self) -> bool {
        !self.quiet && self.format != OutputFormat::Json
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if !self.chatty() {
            return;
        }
        println!("{} {}", style("✓").green().bold(), message);
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        if self.quiet {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow().bold(), message);
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red().bold(), message);
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if !self.chatty() {
            return;
        }
        println!("{} {}", style("ℹ").cyan().bold(), message);
    }

    /// Print a debug message (only in verbose mode)
    pub fn debug(&self, message: &str) {
        if !self.verbose || self.format == OutputFormat::Json {
            return;
        }
        println!("{} {}", style("⋯").dim(), style(message).dim());
    }

    /// Print a header/title with styled formatting
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Table => {
                println!("{}", style("─".repeat(50)).dim());
                println!("  {}", style(title).bold().cyan());
                println!("{}", style("─".repeat(50)).dim());
            }
            OutputFormat::Plain | OutputFormat::Json => {}
        }
    }

    /// Print a result value. Results are printed even in quiet mode.
    pub fn result(&self, message: &str) {
        println!("{}", message);
    }

    /// Print JSON output (always prints, ignores quiet)
    pub fn json<T: Serialize + ?Sized>(&self, data: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        println!("{}", json);
        Ok(())
    }

    /// Print a table
    pub fn table(&self, table: &Table) {
        println!("{}", table);
    }

    /// Create a new styled table
    pub fn create_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table
    }

    /// Create a table with headers
    pub fn create_table_with_headers(&self, headers: &[&str]) -> Table {
        let mut table = self.create_table();
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
        table
    }

    /// Output a bucket scan report in the configured format
    pub fn scan_report(&self, report: &ScanReport) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => self.json(report),
            OutputFormat::Plain => {
                for line in report.lines() {
                    self.result(&line);
                }
                Ok(())
            }
            OutputFormat::Table => {
                self.result(&format!(
                    "{} {}",
                    style("Job status:").bold(),
                    state_style(report.state.is_terminal(), report.state.as_str())
                ));
                match &report.findings {
                    Findings::None => self.result(&no_findings()),
                    Findings::Found(summary) => {
                        let mut table = self.create_table_with_headers(&["Info type", "Count"]);
                        for entry in summary.entries() {
                            table.add_row(vec![
                                Cell::new(&entry.info_type),
                                Cell::new(entry.count),
                            ]);
                        }
                        self.table(&table);
                        self.result(&format!(
                            "\n{} {} findings across {} info types",
                            style("Total:").bold(),
                            summary.total(),
                            summary.entries().len()
                        ));
                    }
                }
                for error in &report.errors {
                    self.error(error);
                }
                Ok(())
            }
        }
    }

    /// Output a content inspection report in the configured format
    pub fn content_report(&self, report: &ContentReport) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => self.json(report),
            OutputFormat::Plain => {
                for line in report.lines() {
                    self.result(&line);
                }
                Ok(())
            }
            OutputFormat::Table => {
                if !report.has_findings() {
                    self.result(&no_findings());
                    return Ok(());
                }

                let mut table =
                    self.create_table_with_headers(&["Info type", "Likelihood", "Quote"]);
                for finding in &report.findings {
                    table.add_row(vec![
                        Cell::new(&finding.info_type.name),
                        Cell::new(
                            likelihood_style(finding.likelihood).apply_to(finding.likelihood),
                        ),
                        Cell::new(truncate_string(finding.quote.as_deref().unwrap_or("-"), 50)),
                    ]);
                }
                self.table(&table);
                self.result(&format!(
                    "\n{} {} findings",
                    style("Total:").bold(),
                    report.findings.len()
                ));
                if report.truncated {
                    self.warn("Results truncated by the max findings limit");
                }
                Ok(())
            }
        }
    }
}

/// An empty result still prints, quiet or not
fn no_findings() -> String {
    format!("{} No findings.", style("✓").green().bold())
}

fn state_style(terminal: bool, state: &str) -> console::StyledObject<&str> {
    match state {
        "DONE" => style(state).green().bold(),
        "FAILED" | "CANCELED" => style(state).red().bold(),
        _ if !terminal => style(state).yellow(),
        _ => style(state).dim(),
    }
}

fn likelihood_style(likelihood: Likelihood) -> Style {
    match likelihood {
        Likelihood::VeryLikely => Style::new().red().bold(),
        Likelihood::Likely => Style::new().red(),
        Likelihood::Possible => Style::new().yellow(),
        Likelihood::Unlikely | Likelihood::VeryUnlikely => Style::new().blue(),
        Likelihood::Unspecified => Style::new().dim(),
    }
}

/// Progress indicator for long-running operations
pub struct ProgressIndicator {
    bar: indicatif::ProgressBar,
}

impl ProgressIndicator {
    /// Create a new spinner progress indicator
    pub fn spinner(message: &str) -> Self {
        let bar = indicatif::ProgressBar::new_spinner();
        let template = indicatif::ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]");
        if let Ok(template) = template {
            bar.set_style(template);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { bar }
    }

    /// Finish and clear
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

/// Truncate a string to a maximum length in characters
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

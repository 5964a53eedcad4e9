//! Application layer - Use cases behind the CLI commands
//!
//! Use cases take resolved requests and service clients and return domain
//! results or a [`crate::error::ScanError`]. They never print; the command
//! layer owns output and exit codes.

pub mod exit_policy;
pub mod use_cases;

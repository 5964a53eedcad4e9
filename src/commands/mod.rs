//! CLI Commands Module
//!
//! This module contains all CLI subcommand implementations. Bucket inspection
//! runs as an asynchronous DLP job; string and file inspection and masking are
//! single synchronous calls.

pub mod config;
pub mod deidentify;
pub mod inspect;

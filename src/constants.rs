//! Shared constants for the CLI application
//!
//! This module contains global constants used across the application to ensure
//! consistency and avoid magic strings.

/// Default Cloud DLP REST endpoint
pub const DEFAULT_DLP_ENDPOINT: &str = "https://dlp.googleapis.com";

/// Default Cloud Pub/Sub REST endpoint
pub const DEFAULT_PUBSUB_ENDPOINT: &str = "https://pubsub.googleapis.com";

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default connection timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// How long to wait for a job completion notification before polling
pub const DEFAULT_COMPLETION_TIMEOUT_SECS: u64 = 180;

/// Pause between a completion notification and the status query
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 500;

/// Pause between empty subscription pulls
pub const DEFAULT_PULL_INTERVAL_MS: u64 = 1000;

/// Maximum messages requested per subscription pull
pub const DEFAULT_MAX_MESSAGES: u32 = 50;

/// Pub/Sub attribute carrying the DLP job name on completion notifications
pub const JOB_NAME_ATTRIBUTE: &str = "DlpJobName";

/// Environment variables consulted for the default project, in order
pub const PROJECT_ENV_VARS: [&str; 2] = ["GOOGLE_CLOUD_PROJECT", "GCLOUD_PROJECT"];

/// User agent string
pub const USER_AGENT: &str = concat!("bucketscan/", env!("CARGO_PKG_VERSION"));

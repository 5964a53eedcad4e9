//! CLI Context - Resolved settings and service clients for one invocation
//!
//! Everything ambient (config file, environment, defaults) is resolved here
//! once and handed to commands explicitly. Nothing below this layer reads the
//! environment.

use std::sync::Arc;

use anyhow::Result;

use crate::Cli;
use crate::config::Config;
use crate::constants::PROJECT_ENV_VARS;
use crate::dlp_client::DlpClient;
use crate::error::ScanError;
use crate::output::OutputWriter;
use crate::pubsub::PubSubClient;
use crate::request;
use crate::watcher::WatchSettings;

/// Lightweight context for CLI operations
pub struct CliContext {
    /// Loaded configuration file (or defaults)
    pub config: Arc<Config>,

    /// Output writer configured based on CLI flags
    pub output: OutputWriter,

    /// Project from `--project`, the config file, or the environment
    pub project_id: Option<String>,

    /// Bearer token for service calls; `None` for emulators
    pub access_token: Option<String>,

    pub dlp_endpoint: String,
    pub pubsub_endpoint: String,

    /// Completion watcher timing
    pub watch: WatchSettings,
}

impl CliContext {
    /// Create a new CLI context from parsed CLI arguments
    pub fn new(cli: &Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref())?;
        let output = OutputWriter::new(cli.format, cli.quiet, cli.verbose);

        let project_id = resolve_project(cli.project.as_deref(), &config, |key| {
            std::env::var(key).ok()
        });

        let mut watch = config.watch.to_settings();
        if let Some(secs) = cli.timeout_secs {
            watch.completion_timeout = std::time::Duration::from_secs(secs);
        }

        let dlp_endpoint = cli
            .dlp_endpoint
            .clone()
            .unwrap_or_else(|| config.endpoints.dlp.clone());
        let pubsub_endpoint = cli
            .pubsub_endpoint
            .clone()
            .unwrap_or_else(|| config.endpoints.pubsub.clone());

        tracing::debug!(
            project = ?project_id,
            dlp = %dlp_endpoint,
            pubsub = %pubsub_endpoint,
            "Context resolved"
        );

        Ok(Self {
            config: Arc::new(config),
            output,
            project_id,
            access_token: cli.access_token.clone().filter(|t| !t.is_empty()),
            dlp_endpoint,
            pubsub_endpoint,
            watch,
        })
    }

    /// The resolved project, or a configuration error naming how to set one
    pub fn require_project(&self) -> Result<&str, ScanError> {
        match self.project_id.as_deref() {
            Some(project) if !project.trim().is_empty() => Ok(project.trim()),
            _ => Err(ScanError::invalid(
                "no project specified (use --project or set GOOGLE_CLOUD_PROJECT)",
            )),
        }
    }

    /// DLP client for the resolved endpoint
    pub fn dlp_client(&self) -> Result<DlpClient> {
        DlpClient::with_endpoint(self.dlp_endpoint.clone(), self.access_token.clone())
    }

    /// Pub/Sub client bound to `subscription` in `project`
    pub fn pubsub_client(&self, project: &str, subscription: &str) -> Result<PubSubClient> {
        PubSubClient::with_endpoint(
            self.pubsub_endpoint.clone(),
            request::subscription_path(project, subscription),
            self.access_token.clone(),
        )
    }
}

/// Flag (or its env var), then config file, then the ambient project variables
fn resolve_project(
    flag: Option<&str>,
    config: &Config,
    env: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    let non_empty = |s: &str| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    };

    flag.and_then(non_empty)
        .or_else(|| config.project.id.as_deref().and_then(non_empty))
        .or_else(|| {
            PROJECT_ENV_VARS
                .iter()
                .find_map(|key| env(*key).as_deref().and_then(non_empty))
        })
}

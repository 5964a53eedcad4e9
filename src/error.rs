//! Error taxonomy for scan, watch and de-identification operations.
//!
//! [`RemoteError`] describes why a single call to Cloud DLP or Pub/Sub failed.
//! [`ScanError`] says which stage of the pipeline the failure belongs to, and
//! carries the exit code reported to the shell.

use reqwest::StatusCode;
use thiserror::Error;

use crate::exit_codes;

/// Failure of one remote call.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("authentication failed: {0}")]
    Unauthenticated(String),

    #[error("access denied: {0}")]
    PermissionDenied(String),

    #[error("quota or rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("service error ({status}): {message}")]
    Server { status: StatusCode, message: String },

    #[error("request failed ({status}): {message}")]
    Status { status: StatusCode, message: String },

    #[error("could not reach {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl RemoteError {
    /// Classify a non-success HTTP status with the service's error message.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthenticated(message),
            StatusCode::FORBIDDEN => Self::PermissionDenied(message),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited(message),
            StatusCode::BAD_REQUEST => Self::InvalidRequest(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            s if s.is_server_error() => Self::Server { status, message },
            _ => Self::Status { status, message },
        }
    }

    /// Whether retrying the same call later could succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited(_) | Self::Server { .. } | Self::Transport { .. }
        )
    }
}

/// Pipeline-level failure, one variant per stage.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("failed to submit inspection job: {0}")]
    Submission(#[source] RemoteError),

    #[error("failed to open notification subscription {subscription}: {source}")]
    WatchSetup {
        subscription: String,
        #[source]
        source: RemoteError,
    },

    #[error("failed to query status of job {job}: {source}")]
    StatusQuery {
        job: String,
        #[source]
        source: RemoteError,
    },

    #[error("de-identification failed: {0}")]
    Transform(#[source] RemoteError),

    #[error("content inspection failed: {0}")]
    Inspect(#[source] RemoteError),
}

impl ScanError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Exit code reported for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfiguration(_) => exit_codes::CONFIG_ERROR,
            Self::Submission(_) => exit_codes::SUBMISSION_ERROR,
            Self::WatchSetup { .. } => exit_codes::WATCH_SETUP_ERROR,
            Self::StatusQuery { .. } => exit_codes::STATUS_QUERY_ERROR,
            Self::Transform(_) => exit_codes::TRANSFORM_ERROR,
            Self::Inspect(_) => exit_codes::INSPECT_ERROR,
        }
    }

    /// The underlying remote failure, if this error came from a service call
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            Self::InvalidConfiguration(_) => None,
            Self::Submission(e) | Self::Transform(e) | Self::Inspect(e) => Some(e),
            Self::WatchSetup { source, .. } | Self::StatusQuery { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            RemoteError::from_status(StatusCode::UNAUTHORIZED, "bad token".into()),
            RemoteError::Unauthenticated(_)
        ));
        assert!(matches!(
            RemoteError::from_status(StatusCode::TOO_MANY_REQUESTS, "slow down".into()),
            RemoteError::RateLimited(_)
        ));
        assert!(matches!(
            RemoteError::from_status(StatusCode::SERVICE_UNAVAILABLE, "down".into()),
            RemoteError::Server { .. }
        ));
        assert!(matches!(
            RemoteError::from_status(StatusCode::CONFLICT, "exists".into()),
            RemoteError::Status { .. }
        ));
    }

    #[test]
    fn test_transient_errors() {
        assert!(RemoteError::RateLimited("x".into()).is_transient());
        assert!(!RemoteError::InvalidRequest("x".into()).is_transient());
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            ScanError::invalid("missing bucket"),
            ScanError::Submission(RemoteError::InvalidRequest("x".into())),
            ScanError::WatchSetup {
                subscription: "s".into(),
                source: RemoteError::NotFound("x".into()),
            },
            ScanError::StatusQuery {
                job: "j".into(),
                source: RemoteError::NotFound("x".into()),
            },
            ScanError::Transform(RemoteError::InvalidRequest("x".into())),
            ScanError::Inspect(RemoteError::InvalidRequest("x".into())),
        ];
        let mut codes: Vec<i32> = errors.iter().map(ScanError::exit_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(!codes.contains(&exit_codes::SUCCESS));
    }

    #[test]
    fn test_message_includes_stage() {
        let err = ScanError::Submission(RemoteError::PermissionDenied("no dlp.jobs.create".into()));
        assert_eq!(
            err.to_string(),
            "failed to submit inspection job: access denied: no dlp.jobs.create"
        );
        assert!(err.remote().is_some());
        assert!(ScanError::invalid("x").remote().is_none());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScanError>();
    }
}

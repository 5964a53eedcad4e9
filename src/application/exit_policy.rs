use crate::error::ScanError;
use crate::exit_codes;
use crate::output::OutputWriter;

/// Report a pipeline failure and return the exit code for its stage
pub fn failure_exit_code(output: &OutputWriter, error: &ScanError) -> i32 {
    tracing::debug!(error = ?error, "Command failed");
    output.error(&error.to_string());
    if let Some(remote) = error.remote() {
        if remote.is_transient() {
            output.warn("The service reported a transient failure; retrying later may succeed");
        }
    }
    error.exit_code()
}

/// Exit code for a run that produced its result
pub fn success_exit_code() -> i32 {
    exit_codes::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::output::OutputFormat;

    #[test]
    fn test_failure_exit_code_follows_stage() {
        let output = OutputWriter::new(OutputFormat::Plain, true, false);
        let err = ScanError::WatchSetup {
            subscription: "projects/p/subscriptions/s".into(),
            source: RemoteError::NotFound("no such subscription".into()),
        };
        assert_eq!(failure_exit_code(&output, &err), exit_codes::WATCH_SETUP_ERROR);
        assert_eq!(
            failure_exit_code(&output, &ScanError::invalid("bad")),
            exit_codes::CONFIG_ERROR
        );
    }

    #[test]
    fn test_success_exit_code() {
        assert_eq!(success_exit_code(), exit_codes::SUCCESS);
    }
}

use std::sync::Arc;

use tracing::info;

use crate::dlp_client::DlpClient;
use crate::dlp_types::InspectContentRequest;
use crate::error::ScanError;
use crate::render::{ContentReport, ScanReport};
use crate::request::ScanRequest;
use crate::watcher::{NotificationChannel, WatchSession, WatchSettings};

/// Inspect a Cloud Storage object as a DLP job and wait for its result
pub struct InspectStorageUseCase;

impl InspectStorageUseCase {
    /// Open the subscription, submit the job, wait, then query the job once.
    ///
    /// The subscription is opened first so a fast job's notification is
    /// retained for the listener.
    pub async fn execute(
        dlp: &DlpClient,
        channel: Arc<dyn NotificationChannel>,
        request: &ScanRequest,
        settings: WatchSettings,
    ) -> Result<ScanReport, ScanError> {
        let session = WatchSession::open(channel, settings).await?;

        let job = dlp
            .create_inspect_job(&request.parent, &request.to_job_request())
            .await
            .map_err(ScanError::Submission)?;
        info!(job = %job.name, url = %request.storage_url, "Inspection job submitted");

        let outcome = session.wait_for_job(&job.name, dlp).await?;
        Ok(ScanReport::from_job(&outcome.job, outcome.notified))
    }
}

/// Inspect inline content synchronously
pub struct InspectContentUseCase;

impl InspectContentUseCase {
    pub async fn execute(
        dlp: &DlpClient,
        parent: &str,
        request: &InspectContentRequest,
    ) -> Result<ContentReport, ScanError> {
        let response = dlp
            .inspect_content(parent, request)
            .await
            .map_err(ScanError::Inspect)?;
        Ok(ContentReport::from_response(response))
    }
}

//! DLP Client - HTTP client for the Cloud DLP v2 API
//!
//! This module provides a client for the DLP calls the CLI needs:
//! - Inspection job submission and status lookup
//! - Synchronous content inspection
//! - Content de-identification

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::dlp_types::{
    CreateDlpJobRequest, DeidentifyContentRequest, DeidentifyContentResponse, DlpJob,
    InspectContentRequest, InspectContentResponse,
};
use crate::error::RemoteError;
use crate::http;
use crate::watcher::JobStatusSource;

/// API client for Cloud DLP
#[derive(Clone)]
pub struct DlpClient {
    client: Client,
    endpoint: String,
    access_token: Option<String>,
}

impl DlpClient {
    /// Create a client for `endpoint` (the public API, an emulator, or a mock)
    pub fn with_endpoint(endpoint: String, access_token: Option<String>) -> Result<Self> {
        Ok(Self {
            client: http::build_client()?,
            endpoint,
            access_token,
        })
    }

    /// Submit an inspection job; the returned job carries its assigned name
    pub async fn create_inspect_job(
        &self,
        parent: &str,
        request: &CreateDlpJobRequest,
    ) -> Result<DlpJob, RemoteError> {
        self.post(&format!("v2/{}/dlpJobs", parent), request).await
    }

    /// Fetch a job by its full resource name
    pub async fn get_job(&self, name: &str) -> Result<DlpJob, RemoteError> {
        let url = http::join_url(&self.endpoint, &format!("v2/{}", name));
        let request = http::authorize(self.client.get(&url), self.access_token.as_deref());
        http::send_json(request, &url).await
    }

    /// Inspect inline content synchronously
    pub async fn inspect_content(
        &self,
        parent: &str,
        request: &InspectContentRequest,
    ) -> Result<InspectContentResponse, RemoteError> {
        self.post(&format!("v2/{}/content:inspect", parent), request)
            .await
    }

    /// De-identify inline content
    pub async fn deidentify_content(
        &self,
        parent: &str,
        request: &DeidentifyContentRequest,
    ) -> Result<DeidentifyContentResponse, RemoteError> {
        self.post(&format!("v2/{}/content:deidentify", parent), request)
            .await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, RemoteError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = http::join_url(&self.endpoint, path);
        let request = http::authorize(
            self.client.post(&url).json(body),
            self.access_token.as_deref(),
        );
        http::send_json(request, &url).await
    }
}

#[async_trait]
impl JobStatusSource for DlpClient {
    async fn job_status(&self, job_name: &str) -> Result<DlpJob, RemoteError> {
        self.get_job(job_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_DLP_ENDPOINT;
    use anyhow::Result;

    #[test]
    fn test_client_with_custom_endpoint() -> Result<()> {
        let client = DlpClient::with_endpoint("http://localhost:8080".to_string(), None)?;
        assert_eq!(client.endpoint, "http://localhost:8080");
        assert!(client.access_token.is_none());
        Ok(())
    }

    #[test]
    fn test_client_keeps_access_token() -> Result<()> {
        let client = DlpClient::with_endpoint(
            DEFAULT_DLP_ENDPOINT.to_string(),
            Some("ya29.token".to_string()),
        )?;
        assert_eq!(client.access_token.as_deref(), Some("ya29.token"));
        Ok(())
    }
}

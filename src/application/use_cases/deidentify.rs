use crate::dlp_client::DlpClient;
use crate::error::ScanError;
use crate::request::{self, MaskingOptions};

/// Mask sensitive characters in a string through `content:deidentify`
pub struct DeidentifyUseCase;

impl DeidentifyUseCase {
    /// Returns the service's transformed value exactly as received
    pub async fn execute(dlp: &DlpClient, options: &MaskingOptions) -> Result<String, ScanError> {
        let parent = request::project_parent(&options.project_id)?;
        let body = request::build_masking_request(options)?;

        let response = dlp
            .deidentify_content(&parent, &body)
            .await
            .map_err(ScanError::Transform)?;

        Ok(response.item.value.unwrap_or_default())
    }
}

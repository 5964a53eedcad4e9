//! Cloud DLP v2 wire types
//!
//! Request and response bodies for the subset of the DLP REST API this tool
//! calls. Field names follow the proto3 JSON mapping (camelCase), and 64-bit
//! integers, which the service encodes as JSON strings, are accepted in
//! either form.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::likelihood::Likelihood;

/// Named detector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoType {
    pub name: String,
}

impl InfoType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Word list for a dictionary detector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordList {
    pub words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dictionary {
    pub word_list: WordList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Regex {
    pub pattern: String,
}

/// User-defined detector, either dictionary or pattern based
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomInfoType {
    pub info_type: InfoType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dictionary: Option<Dictionary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<Regex>,
}

impl CustomInfoType {
    pub fn dictionary(name: impl Into<String>, words: Vec<String>) -> Self {
        Self {
            info_type: InfoType::new(name),
            dictionary: Some(Dictionary {
                word_list: WordList { words },
            }),
            regex: None,
        }
    }

    pub fn regex(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            info_type: InfoType::new(name),
            dictionary: None,
            regex: Some(Regex {
                pattern: pattern.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingLimits {
    /// 0 means no limit
    pub max_findings_per_request: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub info_types: Vec<InfoType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_info_types: Vec<CustomInfoType>,
    #[serde(default)]
    pub min_likelihood: Likelihood,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<FindingLimits>,
    #[serde(default)]
    pub include_quote: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSet {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudStorageOptions {
    pub file_set: FileSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    pub cloud_storage_options: CloudStorageOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishToPubSub {
    /// `projects/{project}/topics/{topic}`
    pub topic: String,
}

/// Post-completion action attached to a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub pub_sub: PublishToPubSub,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectJobConfig {
    pub storage_config: StorageConfig,
    pub inspect_config: InspectConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

/// Body of `POST /v2/{parent}/dlpJobs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDlpJobRequest {
    pub inspect_job: InspectJobConfig,
}

/// Job lifecycle state reported by the service
///
/// States this tool does not know are kept verbatim in `Unknown`, so reports
/// show whatever the service sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobState {
    #[default]
    JobStateUnspecified,
    Pending,
    Running,
    Done,
    Canceled,
    Failed,
    Active,
    Unknown(String),
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::Canceled | JobState::Failed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobState::JobStateUnspecified => "JOB_STATE_UNSPECIFIED",
            JobState::Pending => "PENDING",
            JobState::Running => "RUNNING",
            JobState::Done => "DONE",
            JobState::Canceled => "CANCELED",
            JobState::Failed => "FAILED",
            JobState::Active => "ACTIVE",
            JobState::Unknown(raw) => raw,
        }
    }
}

impl From<String> for JobState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "JOB_STATE_UNSPECIFIED" => JobState::JobStateUnspecified,
            "PENDING" => JobState::Pending,
            "RUNNING" => JobState::Running,
            "DONE" => JobState::Done,
            "CANCELED" => JobState::Canceled,
            "FAILED" => JobState::Failed,
            "ACTIVE" => JobState::Active,
            _ => JobState::Unknown(raw),
        }
    }
}

impl From<JobState> for String {
    fn from(state: JobState) -> Self {
        match state {
            JobState::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-detector occurrence count in a finished job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoTypeStats {
    pub info_type: InfoType,
    #[serde(default, deserialize_with = "de_i64")]
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectResult {
    #[serde(default, deserialize_with = "de_i64")]
    pub processed_bytes: i64,
    #[serde(default, deserialize_with = "de_i64")]
    pub total_estimated_bytes: i64,
    #[serde(default)]
    pub info_type_stats: Vec<InfoTypeStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectDataSourceDetails {
    #[serde(default)]
    pub result: Option<InspectResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobError {
    #[serde(default)]
    pub details: Option<Status>,
}

/// A DLP job as returned by create and get
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DlpJob {
    /// `projects/{project}/dlpJobs/{id}`
    pub name: String,
    #[serde(default)]
    pub state: JobState,
    #[serde(default)]
    pub inspect_details: Option<InspectDataSourceDetails>,
    #[serde(default)]
    pub errors: Vec<JobError>,
}

impl DlpJob {
    /// Detector statistics, empty when the job carries no result yet
    pub fn info_type_stats(&self) -> &[InfoTypeStats] {
        self.inspect_details
            .as_ref()
            .and_then(|d| d.result.as_ref())
            .map(|r| r.info_type_stats.as_slice())
            .unwrap_or_default()
    }

    /// Error messages reported by the service for this job
    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .filter_map(|e| e.details.as_ref())
            .map(|s| s.message.clone())
            .filter(|m| !m.is_empty())
            .collect()
    }
}

/// Type tag of a `byteItem`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BytesType {
    BytesTypeUnspecified,
    Image,
    ImageBmp,
    ImageJpeg,
    ImagePng,
    ImageSvg,
    TextUtf8,
}

impl BytesType {
    /// Infer the item type from a file extension
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_lowercase().as_str() {
            "bmp" => BytesType::ImageBmp,
            "jpg" | "jpeg" => BytesType::ImageJpeg,
            "png" => BytesType::ImagePng,
            "svg" => BytesType::ImageSvg,
            "txt" | "text" | "csv" | "tsv" | "log" | "json" | "md" => BytesType::TextUtf8,
            _ => BytesType::BytesTypeUnspecified,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByteContentItem {
    #[serde(rename = "type")]
    pub kind: BytesType,
    /// Base64-encoded content
    pub data: String,
}

/// Inline content to inspect or transform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_item: Option<ByteContentItem>,
}

impl ContentItem {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            byte_item: None,
        }
    }
}

/// Body of `POST /v2/{parent}/content:inspect`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectContentRequest {
    pub inspect_config: InspectConfig,
    pub item: ContentItem,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    #[serde(default, deserialize_with = "de_i64")]
    pub start: i64,
    #[serde(default, deserialize_with = "de_i64")]
    pub end: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub byte_range: Option<Range>,
}

/// One finding from synchronous content inspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub info_type: InfoType,
    #[serde(default)]
    pub likelihood: Likelihood,
    #[serde(default)]
    pub quote: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectContentResult {
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub findings_truncated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InspectContentResponse {
    #[serde(default)]
    pub result: InspectContentResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterMaskConfig {
    pub masking_character: String,
    /// 0 masks every character
    pub number_to_mask: u32,
    #[serde(default)]
    pub reverse_order: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimitiveTransformation {
    pub character_mask_config: CharacterMaskConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoTypeTransformation {
    pub primitive_transformation: PrimitiveTransformation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoTypeTransformations {
    pub transformations: Vec<InfoTypeTransformation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeidentifyConfig {
    pub info_type_transformations: InfoTypeTransformations,
}

/// Body of `POST /v2/{parent}/content:deidentify`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeidentifyContentRequest {
    pub deidentify_config: DeidentifyConfig,
    pub inspect_config: InspectConfig,
    pub item: ContentItem,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeidentifyContentResponse {
    #[serde(default)]
    pub item: ContentItem,
}

/// Google API error envelope
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(i64),
}

fn de_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Number(n) => Ok(n),
        StringOrNumber::String(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

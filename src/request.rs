//! Request Builder - Maps resolved options onto DLP request bodies
//!
//! Everything here is a pure transformation: no network calls, no ambient
//! state. Validation failures surface as [`ScanError::InvalidConfiguration`]
//! before any remote call is made.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::dlp_types::{
    Action, ByteContentItem, BytesType, CharacterMaskConfig, CloudStorageOptions, ContentItem,
    CreateDlpJobRequest, CustomInfoType, DeidentifyConfig, DeidentifyContentRequest, FileSet,
    FindingLimits, InfoType, InfoTypeTransformation, InfoTypeTransformations, InspectConfig,
    InspectContentRequest, InspectJobConfig, PrimitiveTransformation, PublishToPubSub,
    StorageConfig,
};
use crate::error::ScanError;
use crate::likelihood::Likelihood;

/// Detector selection shared by every inspection mode
#[derive(Debug, Clone, Default)]
pub struct DetectorOptions {
    pub info_types: Vec<String>,
    /// Each entry is a comma-separated word list
    pub custom_dictionaries: Vec<String>,
    pub custom_regexes: Vec<String>,
    pub min_likelihood: String,
    pub max_findings: i64,
    pub include_quote: bool,
}

/// Fully resolved bucket scan configuration
#[derive(Debug, Clone)]
pub struct StorageScanConfig {
    pub project_id: String,
    pub bucket: String,
    pub file: String,
    /// Topic the service publishes the completion notice to; required
    pub topic: Option<String>,
    pub detectors: DetectorOptions,
}

/// Immutable description of one bucket scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    /// `projects/{project}`
    pub parent: String,
    /// `gs://{bucket}/{file}`
    pub storage_url: String,
    /// `projects/{project}/topics/{topic}`
    pub notification_topic: String,
    pub inspect_config: InspectConfig,
}

impl ScanRequest {
    /// Body for `POST /v2/{parent}/dlpJobs`
    pub fn to_job_request(&self) -> CreateDlpJobRequest {
        CreateDlpJobRequest {
            inspect_job: InspectJobConfig {
                storage_config: StorageConfig {
                    cloud_storage_options: CloudStorageOptions {
                        file_set: FileSet {
                            url: self.storage_url.clone(),
                        },
                    },
                },
                inspect_config: self.inspect_config.clone(),
                actions: vec![Action {
                    pub_sub: PublishToPubSub {
                        topic: self.notification_topic.clone(),
                    },
                }],
            },
        }
    }
}

/// Character masking options
#[derive(Debug, Clone)]
pub struct MaskingOptions {
    pub project_id: String,
    pub value: String,
    pub info_types: Vec<String>,
    pub masking_character: String,
    pub number_to_mask: i64,
    pub reverse_order: bool,
}

/// `projects/{project}`, rejecting blank or malformed project ids
pub fn project_parent(project_id: &str) -> Result<String, ScanError> {
    let project_id = project_id.trim();
    if project_id.is_empty() {
        return Err(ScanError::invalid(
            "no project specified (use --project or set GOOGLE_CLOUD_PROJECT)",
        ));
    }
    if project_id.contains('/') {
        return Err(ScanError::invalid(format!(
            "project id '{}' must not contain '/'",
            project_id
        )));
    }
    Ok(format!("projects/{}", project_id))
}

/// `projects/{project}/topics/{topic}`; a full resource name passes through
pub fn topic_path(project_id: &str, topic: &str) -> String {
    if topic.starts_with("projects/") {
        topic.to_string()
    } else {
        format!("projects/{}/topics/{}", project_id, topic)
    }
}

/// `projects/{project}/subscriptions/{subscription}`; a full name passes through
pub fn subscription_path(project_id: &str, subscription: &str) -> String {
    if subscription.starts_with("projects/") {
        subscription.to_string()
    } else {
        format!("projects/{}/subscriptions/{}", project_id, subscription)
    }
}

/// Build the inspect configuration shared by jobs and content inspection
pub fn build_inspect_config(options: &DetectorOptions) -> Result<InspectConfig, ScanError> {
    let min_likelihood: Likelihood = options
        .min_likelihood
        .parse()
        .map_err(|e| ScanError::invalid(format!("{}", e)))?;

    if options.max_findings < 0 {
        return Err(ScanError::invalid(format!(
            "max findings must be >= 0 (got {})",
            options.max_findings
        )));
    }
    let max_findings = u32::try_from(options.max_findings).map_err(|_| {
        ScanError::invalid(format!("max findings {} is too large", options.max_findings))
    })?;

    Ok(InspectConfig {
        info_types: build_info_types(&options.info_types)?,
        custom_info_types: build_custom_info_types(
            &options.custom_dictionaries,
            &options.custom_regexes,
        )?,
        min_likelihood,
        limits: Some(FindingLimits {
            max_findings_per_request: max_findings,
        }),
        include_quote: options.include_quote,
    })
}

fn build_info_types(names: &[String]) -> Result<Vec<InfoType>, ScanError> {
    names
        .iter()
        .map(|name| {
            let name = name.trim();
            if name.is_empty() {
                Err(ScanError::invalid("info type names must not be empty"))
            } else {
                Ok(InfoType::new(name))
            }
        })
        .collect()
}

/// Dictionaries become `CUSTOM_DICTIONARY_{i}`, regexes `CUSTOM_REGEX_{i}`
fn build_custom_info_types(
    dictionaries: &[String],
    regexes: &[String],
) -> Result<Vec<CustomInfoType>, ScanError> {
    let mut custom = Vec::with_capacity(dictionaries.len() + regexes.len());

    for (i, dictionary) in dictionaries.iter().enumerate() {
        let words: Vec<String> = dictionary
            .split(',')
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(String::from)
            .collect();
        if words.is_empty() {
            return Err(ScanError::invalid(format!(
                "custom dictionary {} has no words",
                i
            )));
        }
        custom.push(CustomInfoType::dictionary(
            format!("CUSTOM_DICTIONARY_{}", i),
            words,
        ));
    }

    for (i, pattern) in regexes.iter().enumerate() {
        if pattern.is_empty() {
            return Err(ScanError::invalid(format!("custom regex {} is empty", i)));
        }
        custom.push(CustomInfoType::regex(format!("CUSTOM_REGEX_{}", i), pattern));
    }

    Ok(custom)
}

/// Build the scan request for a Cloud Storage object
pub fn build_scan_request(config: &StorageScanConfig) -> Result<ScanRequest, ScanError> {
    let parent = project_parent(&config.project_id)?;

    let bucket = config.bucket.trim().trim_start_matches("gs://").trim_end_matches('/');
    if bucket.is_empty() {
        return Err(ScanError::invalid("storage bucket must not be empty"));
    }
    let file = config.file.trim().trim_start_matches('/');
    if file.is_empty() {
        return Err(ScanError::invalid("storage file name must not be empty"));
    }

    let topic = config
        .topic
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            ScanError::invalid("a notification topic is required to wait for job completion")
        })?;

    Ok(ScanRequest {
        parent,
        storage_url: format!("gs://{}/{}", bucket, file),
        notification_topic: topic_path(config.project_id.trim(), topic),
        inspect_config: build_inspect_config(&config.detectors)?,
    })
}

/// Build a `content:inspect` body for an inline string
pub fn build_string_inspection(
    value: &str,
    options: &DetectorOptions,
) -> Result<InspectContentRequest, ScanError> {
    Ok(InspectContentRequest {
        inspect_config: build_inspect_config(options)?,
        item: ContentItem::text(value),
    })
}

/// Build a `content:inspect` body for a local file's bytes
pub fn build_file_inspection(
    path: &Path,
    data: &[u8],
    options: &DetectorOptions,
) -> Result<InspectContentRequest, ScanError> {
    let kind = path
        .extension()
        .map(|e| BytesType::from_extension(&e.to_string_lossy()))
        .unwrap_or(BytesType::BytesTypeUnspecified);

    Ok(InspectContentRequest {
        inspect_config: build_inspect_config(options)?,
        item: ContentItem {
            value: None,
            byte_item: Some(ByteContentItem {
                kind,
                data: STANDARD.encode(data),
            }),
        },
    })
}

/// Build a `content:deidentify` body applying a character mask
pub fn build_masking_request(
    options: &MaskingOptions,
) -> Result<DeidentifyContentRequest, ScanError> {
    project_parent(&options.project_id)?;

    let mut chars = options.masking_character.chars();
    let masking_character = match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_string(),
        _ => {
            return Err(ScanError::invalid(format!(
                "masking character must be a single character (got '{}')",
                options.masking_character
            )));
        }
    };

    if options.number_to_mask < 0 {
        return Err(ScanError::invalid(format!(
            "number to mask must be >= 0 (got {})",
            options.number_to_mask
        )));
    }
    let number_to_mask = u32::try_from(options.number_to_mask).map_err(|_| {
        ScanError::invalid(format!("number to mask {} is too large", options.number_to_mask))
    })?;

    Ok(DeidentifyContentRequest {
        deidentify_config: DeidentifyConfig {
            info_type_transformations: InfoTypeTransformations {
                transformations: vec![InfoTypeTransformation {
                    primitive_transformation: PrimitiveTransformation {
                        character_mask_config: CharacterMaskConfig {
                            masking_character,
                            number_to_mask,
                            reverse_order: options.reverse_order,
                        },
                    },
                }],
            },
        },
        inspect_config: InspectConfig {
            info_types: build_info_types(&options.info_types)?,
            ..InspectConfig::default()
        },
        item: ContentItem::text(options.value.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn detectors() -> DetectorOptions {
        DetectorOptions {
            info_types: vec!["EMAIL_ADDRESS".into(), "PHONE_NUMBER".into()],
            custom_dictionaries: vec!["alice, bob".into()],
            custom_regexes: vec!["[0-9]{3}-[0-9]{4}".into()],
            min_likelihood: "possible".into(),
            max_findings: 0,
            include_quote: true,
        }
    }

    fn storage_config() -> StorageScanConfig {
        StorageScanConfig {
            project_id: "acme".into(),
            bucket: "records".into(),
            file: "2024/export.csv".into(),
            topic: Some("dlp-done".into()),
            detectors: detectors(),
        }
    }

    #[test]
    fn test_build_scan_request() -> Result<()> {
        let request = build_scan_request(&storage_config())?;
        assert_eq!(request.parent, "projects/acme");
        assert_eq!(request.storage_url, "gs://records/2024/export.csv");
        assert_eq!(request.notification_topic, "projects/acme/topics/dlp-done");
        assert_eq!(request.inspect_config.min_likelihood, Likelihood::Possible);
        assert_eq!(
            request.inspect_config.limits,
            Some(FindingLimits {
                max_findings_per_request: 0
            })
        );
        Ok(())
    }

    #[test]
    fn test_custom_detector_names() -> Result<()> {
        let config = build_inspect_config(&DetectorOptions {
            custom_dictionaries: vec!["a,b".into(), "c".into()],
            custom_regexes: vec!["x+".into()],
            min_likelihood: "LIKELIHOOD_UNSPECIFIED".into(),
            ..DetectorOptions::default()
        })?;
        let names: Vec<&str> = config
            .custom_info_types
            .iter()
            .map(|c| c.info_type.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["CUSTOM_DICTIONARY_0", "CUSTOM_DICTIONARY_1", "CUSTOM_REGEX_0"]
        );
        let words = &config.custom_info_types[0]
            .dictionary
            .as_ref()
            .map(|d| d.word_list.words.clone());
        assert_eq!(words, &Some(vec!["a".to_string(), "b".to_string()]));
        Ok(())
    }

    #[test]
    fn test_job_request_carries_pubsub_action() -> Result<()> {
        let body = serde_json::to_value(build_scan_request(&storage_config())?.to_job_request())?;
        assert_eq!(
            body["inspectJob"]["actions"][0]["pubSub"]["topic"],
            "projects/acme/topics/dlp-done"
        );
        assert_eq!(
            body["inspectJob"]["storageConfig"]["cloudStorageOptions"]["fileSet"]["url"],
            "gs://records/2024/export.csv"
        );
        assert_eq!(body["inspectJob"]["inspectConfig"]["minLikelihood"], "POSSIBLE");
        assert_eq!(
            body["inspectJob"]["inspectConfig"]["limits"]["maxFindingsPerRequest"],
            0
        );
        Ok(())
    }

    #[test]
    fn test_missing_storage_locator_is_invalid() {
        let mut config = storage_config();
        config.bucket = "  ".into();
        assert!(matches!(
            build_scan_request(&config),
            Err(ScanError::InvalidConfiguration(_))
        ));

        let mut config = storage_config();
        config.file = String::new();
        assert!(matches!(
            build_scan_request(&config),
            Err(ScanError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_missing_topic_is_invalid() {
        let mut config = storage_config();
        config.topic = None;
        let err = build_scan_request(&config).unwrap_err();
        assert!(err.to_string().contains("notification topic"));
    }

    #[test]
    fn test_missing_project_is_invalid() {
        let mut config = storage_config();
        config.project_id = String::new();
        assert!(matches!(
            build_scan_request(&config),
            Err(ScanError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_bad_likelihood_and_limits_are_invalid() {
        let mut options = detectors();
        options.min_likelihood = "SOMETIMES".into();
        assert!(build_inspect_config(&options).is_err());

        let mut options = detectors();
        options.max_findings = -1;
        assert!(build_inspect_config(&options).is_err());
    }

    #[test]
    fn test_empty_custom_detectors_are_invalid() {
        let mut options = detectors();
        options.custom_dictionaries = vec![" , ".into()];
        assert!(build_inspect_config(&options).is_err());

        let mut options = detectors();
        options.custom_regexes = vec![String::new()];
        assert!(build_inspect_config(&options).is_err());
    }

    #[test]
    fn test_full_resource_names_pass_through() {
        assert_eq!(
            topic_path("acme", "projects/other/topics/t"),
            "projects/other/topics/t"
        );
        assert_eq!(
            subscription_path("acme", "sub"),
            "projects/acme/subscriptions/sub"
        );
    }

    #[test]
    fn test_file_inspection_encodes_bytes() -> Result<()> {
        let request =
            build_file_inspection(Path::new("notes.txt"), b"call 555-0100", &detectors())?;
        let item = request.item.byte_item.expect("byte item");
        assert_eq!(item.kind, BytesType::TextUtf8);
        assert_eq!(STANDARD.decode(item.data)?, b"call 555-0100");
        Ok(())
    }

    #[test]
    fn test_masking_request() -> Result<()> {
        let request = build_masking_request(&MaskingOptions {
            project_id: "acme".into(),
            value: "My SSN is 123456789".into(),
            info_types: vec!["US_SOCIAL_SECURITY_NUMBER".into()],
            masking_character: "*".into(),
            number_to_mask: 5,
            reverse_order: false,
        })?;
        let body = serde_json::to_value(&request)?;
        let mask = &body["deidentifyConfig"]["infoTypeTransformations"]["transformations"][0]
            ["primitiveTransformation"]["characterMaskConfig"];
        assert_eq!(mask["maskingCharacter"], "*");
        assert_eq!(mask["numberToMask"], 5);
        assert_eq!(body["item"]["value"], "My SSN is 123456789");
        Ok(())
    }

    #[test]
    fn test_masking_character_must_be_single() {
        let options = MaskingOptions {
            project_id: "acme".into(),
            value: "x".into(),
            info_types: Vec::new(),
            masking_character: "**".into(),
            number_to_mask: 0,
            reverse_order: false,
        };
        assert!(build_masking_request(&options).is_err());
    }
}

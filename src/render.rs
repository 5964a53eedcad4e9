//! Result Renderer - Turns DLP job and inspection payloads into reports
//!
//! Reports are plain data; [`crate::output::OutputWriter`] decides how they
//! are printed. An empty result is represented explicitly as
//! [`Findings::None`] so callers can tell "nothing found" from "nothing
//! reported".

use serde::Serialize;

use crate::dlp_types::{DlpJob, Finding, InfoTypeStats, InspectContentResponse, JobState};

/// Occurrence count for one detector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoTypeCount {
    pub info_type: String,
    pub count: i64,
}

/// Ordered per-detector counts, in the order the service reported them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FindingsSummary {
    entries: Vec<InfoTypeCount>,
}

impl FindingsSummary {
    pub fn entries(&self) -> &[InfoTypeCount] {
        &self.entries
    }

    /// Sum of all counts
    pub fn total(&self) -> i64 {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// `(name, count)` pairs in reported order
    pub fn pairs(&self) -> Vec<(&str, i64)> {
        self.entries
            .iter()
            .map(|e| (e.info_type.as_str(), e.count))
            .collect()
    }
}

/// Findings of a job: explicitly none, or a non-empty summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "entries", rename_all = "snake_case")]
pub enum Findings {
    None,
    Found(FindingsSummary),
}

impl Findings {
    pub fn is_none(&self) -> bool {
        matches!(self, Findings::None)
    }

    pub fn summary(&self) -> Option<&FindingsSummary> {
        match self {
            Findings::None => None,
            Findings::Found(summary) => Some(summary),
        }
    }
}

/// Build findings from job statistics. Zero-count rows are kept; an empty
/// list becomes [`Findings::None`].
pub fn summarize(stats: &[InfoTypeStats]) -> Findings {
    if stats.is_empty() {
        return Findings::None;
    }
    Findings::Found(FindingsSummary {
        entries: stats
            .iter()
            .map(|s| InfoTypeCount {
                info_type: s.info_type.name.clone(),
                count: s.count,
            })
            .collect(),
    })
}

/// Final report for a bucket scan
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub job_name: String,
    pub state: JobState,
    /// Whether completion was confirmed by notification before the status query
    pub notified: bool,
    pub findings: Findings,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ScanReport {
    pub fn from_job(job: &DlpJob, notified: bool) -> Self {
        Self {
            job_name: job.name.clone(),
            state: job.state.clone(),
            notified,
            findings: summarize(job.info_type_stats()),
            errors: job.error_messages(),
        }
    }

    /// Plain text lines: the job status, then each detector and its count
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Job status: {}", self.state)];
        match &self.findings {
            Findings::None => lines.push("No findings.".to_string()),
            Findings::Found(summary) => {
                lines.push("Findings:".to_string());
                for entry in summary.entries() {
                    lines.push(format!(
                        "\tInfo type: {}\tCount: {}",
                        entry.info_type, entry.count
                    ));
                }
            }
        }
        for error in &self.errors {
            lines.push(format!("Error: {}", error));
        }
        lines
    }
}

/// Report for synchronous content inspection
#[derive(Debug, Clone, Serialize)]
pub struct ContentReport {
    pub findings: Vec<Finding>,
    pub truncated: bool,
}

impl ContentReport {
    pub fn from_response(response: InspectContentResponse) -> Self {
        Self {
            findings: response.result.findings,
            truncated: response.result.findings_truncated,
        }
    }

    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }

    /// Plain text lines, one per finding, or an explicit "No findings."
    pub fn lines(&self) -> Vec<String> {
        if self.findings.is_empty() {
            return vec!["No findings.".to_string()];
        }
        let mut lines = vec!["Findings:".to_string()];
        for finding in &self.findings {
            let mut line = String::new();
            if let Some(quote) = &finding.quote {
                line.push_str(&format!("\tQuote: {}", quote));
            }
            line.push_str(&format!(
                "\tInfo type: {}\tLikelihood: {}",
                finding.info_type.name, finding.likelihood
            ));
            lines.push(line);
        }
        if self.truncated {
            lines.push("(results truncated by max findings limit)".to_string());
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dlp_types::{InfoType, InspectContentResult, InspectDataSourceDetails, InspectResult};
    use crate::likelihood::Likelihood;

    fn stats(name: &str, count: i64) -> InfoTypeStats {
        InfoTypeStats {
            info_type: InfoType::new(name),
            count,
        }
    }

    fn done_job(stats: Vec<InfoTypeStats>) -> DlpJob {
        DlpJob {
            name: "projects/p/dlpJobs/i-1".into(),
            state: JobState::Done,
            inspect_details: Some(InspectDataSourceDetails {
                result: Some(InspectResult {
                    info_type_stats: stats,
                    ..InspectResult::default()
                }),
            }),
            errors: Vec::new(),
        }
    }

    #[test]
    fn test_zero_findings_is_explicit() {
        let report = ScanReport::from_job(&done_job(Vec::new()), true);
        assert_eq!(report.findings, Findings::None);
        assert!(report.findings.is_none());
        assert_eq!(report.lines(), vec!["Job status: DONE", "No findings."]);
    }

    #[test]
    fn test_job_without_details_has_no_findings() {
        let job = DlpJob {
            name: "projects/p/dlpJobs/i-2".into(),
            state: JobState::Running,
            ..DlpJob::default()
        };
        let report = ScanReport::from_job(&job, false);
        assert!(report.findings.is_none());
        assert_eq!(report.state, JobState::Running);
    }

    #[test]
    fn test_unrecognised_state_is_shown_verbatim() {
        let job = DlpJob {
            name: "projects/p/dlpJobs/i-3".into(),
            state: JobState::Unknown("PAUSED_FOR_REVIEW".into()),
            ..DlpJob::default()
        };
        let report = ScanReport::from_job(&job, false);
        assert_eq!(report.lines()[0], "Job status: PAUSED_FOR_REVIEW");
    }

    #[test]
    fn test_summary_preserves_order_and_counts() {
        let report = ScanReport::from_job(
            &done_job(vec![stats("EMAIL_ADDRESS", 3), stats("PHONE_NUMBER", 1)]),
            true,
        );
        let summary = report.findings.summary().expect("findings");
        assert_eq!(summary.pairs(), vec![("EMAIL_ADDRESS", 3), ("PHONE_NUMBER", 1)]);
        assert_eq!(summary.total(), 4);
        assert_eq!(
            report.lines(),
            vec![
                "Job status: DONE",
                "Findings:",
                "\tInfo type: EMAIL_ADDRESS\tCount: 3",
                "\tInfo type: PHONE_NUMBER\tCount: 1",
            ]
        );
    }

    #[test]
    fn test_findings_json_shape() -> anyhow::Result<()> {
        let none = serde_json::to_value(Findings::None)?;
        assert_eq!(none, serde_json::json!({"status": "none"}));

        let found = serde_json::to_value(summarize(&[stats("EMAIL_ADDRESS", 3)]))?;
        assert_eq!(
            found,
            serde_json::json!({
                "status": "found",
                "entries": [{"info_type": "EMAIL_ADDRESS", "count": 3}]
            })
        );
        Ok(())
    }

    #[test]
    fn test_content_report_lines() {
        let report = ContentReport::from_response(InspectContentResponse {
            result: InspectContentResult {
                findings: vec![Finding {
                    info_type: InfoType::new("EMAIL_ADDRESS"),
                    likelihood: Likelihood::Likely,
                    quote: Some("a@b.com".into()),
                    location: None,
                }],
                findings_truncated: false,
            },
        });
        assert!(report.has_findings());
        assert_eq!(
            report.lines(),
            vec![
                "Findings:",
                "\tQuote: a@b.com\tInfo type: EMAIL_ADDRESS\tLikelihood: LIKELY"
            ]
        );

        let empty = ContentReport::from_response(InspectContentResponse::default());
        assert_eq!(empty.lines(), vec!["No findings."]);
    }
}

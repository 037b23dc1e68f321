use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

use crate::status::StatusCategory;

/// Source code plus run parameters, as sent to the execution backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub source_code: String,
    pub language_id: u32,
    #[serde(default)]
    pub stdin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitOptions {
    /// Run once to harvest stdout, then resubmit with it as the expected output
    pub use_actual_as_expected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusRef {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageRef {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Resource figure as the backend reports it: Judge0 sends `time` as a
/// decimal string and `memory` as a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metric {
    Number(Number),
    Text(String),
}

impl Metric {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Metric::Number(n) => n.as_f64(),
            Metric::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Integer value, truncating any fractional part
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Metric::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            Metric::Text(s) => {
                let s = s.trim();
                let end = s
                    .char_indices()
                    .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
                    .map(|(i, _)| i)
                    .unwrap_or(s.len());
                s[..end].parse::<i64>().ok()
            }
        }
    }
}

/// A submission exactly as the execution backend returns it.
///
/// Fields the relay does not interpret are kept in `extra` so the create
/// path can hand the backend's shape back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSubmission {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub status: Option<StatusRef>,
    #[serde(default)]
    pub language_id: Option<u32>,
    #[serde(default)]
    pub language: Option<LanguageRef>,
    #[serde(default)]
    pub time: Option<Metric>,
    #[serde(default)]
    pub memory: Option<Metric>,
    #[serde(default)]
    pub wall_time: Option<Metric>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
    #[serde(default)]
    pub source_code: Option<String>,
    #[serde(default)]
    pub stdin: Option<String>,
    #[serde(default)]
    pub expected_output: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
    #[serde(rename = "_metadata", default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HarvestMetadata>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawSubmission {
    pub fn status_id(&self) -> Option<u32> {
        self.status.as_ref().and_then(|s| s.id)
    }
}

/// Result of separating program output from diagnostic noise in one stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedOutput {
    pub raw: Option<String>,
    pub actual: Option<String>,
    pub logs: Option<String>,
    pub lines: Vec<String>,
}

impl NormalizedOutput {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputStreams {
    pub stdout: NormalizedOutput,
    pub stderr: NormalizedOutput,
    pub compile_output: NormalizedOutput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difference {
    #[serde(rename = "Length mismatch")]
    LengthMismatch,
    #[serde(rename = "Content difference after trimming")]
    ContentDifference,
    #[serde(rename = "Whitespace differences")]
    WhitespaceDifference,
    #[serde(rename = "Character encoding differences")]
    EncodingDifference,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Difference::LengthMismatch => "Length mismatch",
            Difference::ContentDifference => "Content difference after trimming",
            Difference::WhitespaceDifference => "Whitespace differences",
            Difference::EncodingDifference => "Character encoding differences",
        };
        f.write_str(tag)
    }
}

/// Full multi-tier comparison between two non-empty outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub exact_match: bool,
    pub trimmed_match: bool,
    pub case_insensitive_match: bool,
    pub actual_output: String,
    pub expected_output: String,
    pub actual_length: usize,
    pub expected_length: usize,
    pub differences: Vec<Difference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_char_codes: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_char_codes: Option<Vec<u32>>,
}

/// Returned instead of a `Comparison` when either side is missing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingOutput {
    #[serde(rename = "match")]
    pub matched: bool,
    pub reason: String,
    pub actual_length: usize,
    pub expected_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputComparison {
    Missing(MissingOutput),
    Compared(Comparison),
}

impl OutputComparison {
    pub fn is_exact_match(&self) -> bool {
        matches!(self, OutputComparison::Compared(c) if c.exact_match)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub success: bool,
    pub has_output: bool,
    pub has_errors: bool,
    pub has_compile_errors: bool,
    pub execution_time_ms: Option<f64>,
    pub memory_usage_kb: Option<i64>,
    pub status_category: StatusCategory,
}

/// Attached to the second run of the harvest flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestMetadata {
    pub used_actual_as_expected: bool,
    pub extracted_output: String,
    pub first_submission_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionMetrics {
    pub time: Option<Metric>,
    pub memory: Option<Metric>,
    pub wall_time: Option<Metric>,
}

/// Caller-facing, fully normalized view of one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub token: Option<String>,
    pub status: StatusRef,
    pub language: LanguageRef,
    pub execution: ExecutionMetrics,
    pub output: OutputStreams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_code: Option<String>,
    pub stdin: Option<String>,
    pub expected_output: Option<String>,
    pub created_at: Option<String>,
    pub finished_at: Option<String>,
    pub execution_summary: ExecutionSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_comparison: Option<OutputComparison>,
    #[serde(rename = "_metadata", default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HarvestMetadata>,
}

impl SubmissionResult {
    pub fn with_metadata(mut self, metadata: Option<HarvestMetadata>) -> Self {
        if metadata.is_some() {
            self.metadata = metadata;
        }
        self
    }

    pub fn without_source(mut self) -> Self {
        self.source_code = None;
        self
    }
}

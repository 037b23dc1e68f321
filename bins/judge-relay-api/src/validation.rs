// Request validation
// Rejects malformed input before it reaches the engine; the engine never re-validates

use judge_relay_common::types::{Submission, SubmitOptions};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;

/// Fields shared by single and batch submissions, loosely typed so that
/// shape errors become readable validation messages.
#[derive(Debug, Default, Deserialize)]
pub struct SubmissionFields {
    #[serde(default)]
    pub source_code: Option<Value>,
    #[serde(default)]
    pub language_id: Option<Value>,
    #[serde(default)]
    pub stdin: Option<String>,
    #[serde(default)]
    pub expected_output: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SingleSubmissionRequest {
    #[serde(flatten)]
    pub fields: SubmissionFields,
    #[serde(default)]
    pub use_actual_as_expected: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct BatchSubmissionRequest {
    #[serde(default)]
    pub submissions: Option<Value>,
}

impl SubmissionFields {
    fn into_submission(self, prefix: &str) -> Result<Submission, ApiError> {
        let invalid = |message: &str| ApiError::Validation(format!("{prefix}{message}"));

        let source_code = match self.source_code {
            Some(Value::String(code)) if !code.is_empty() => code,
            Some(Value::String(_)) | Some(Value::Null) | None => {
                return Err(invalid("source_code is required"))
            }
            Some(_) => return Err(invalid("source_code must be a string")),
        };

        let language_id = match self.language_id {
            None | Some(Value::Null) => return Err(invalid("language_id is required")),
            Some(Value::Number(n)) => match n.as_u64() {
                Some(0) => return Err(invalid("language_id is required")),
                Some(id) => u32::try_from(id).map_err(|_| invalid("language_id is out of range"))?,
                None => return Err(invalid("language_id must be a number")),
            },
            Some(_) => return Err(invalid("language_id must be a number")),
        };

        Ok(Submission {
            source_code,
            language_id,
            stdin: self.stdin.unwrap_or_default(),
            expected_output: self.expected_output.filter(|e| !e.is_empty()),
        })
    }
}

impl SingleSubmissionRequest {
    pub fn validate(self) -> Result<(Submission, SubmitOptions), ApiError> {
        let options = SubmitOptions {
            use_actual_as_expected: matches!(self.use_actual_as_expected, Some(Value::Bool(true))),
        };
        Ok((self.fields.into_submission("")?, options))
    }
}

impl BatchSubmissionRequest {
    pub fn validate(self, max_batch_size: usize) -> Result<Vec<Submission>, ApiError> {
        let items = match self.submissions {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ApiError::Validation(
                    "submissions must be an array".to_string(),
                ))
            }
        };

        if items.is_empty() {
            return Err(ApiError::Validation(
                "submissions array cannot be empty".to_string(),
            ));
        }
        if items.len() > max_batch_size {
            return Err(ApiError::Validation(format!(
                "Maximum {max_batch_size} submissions allowed per batch"
            )));
        }

        items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                let prefix = format!("submissions[{idx}]: ");
                let fields = match item {
                    Value::Object(_) => serde_json::from_value::<SubmissionFields>(item)
                        .map_err(|e| ApiError::Validation(format!("{prefix}{e}")))?,
                    // A non-object element has no source_code either
                    _ => SubmissionFields::default(),
                };
                fields.into_submission(&prefix)
            })
            .collect()
    }
}

/// Split a comma-separated token list, dropping blanks
pub fn parse_tokens(raw: Option<&str>) -> Result<Vec<String>, ApiError> {
    let tokens: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if tokens.is_empty() {
        return Err(ApiError::Validation("Missing tokens parameter".to_string()));
    }
    Ok(tokens)
}

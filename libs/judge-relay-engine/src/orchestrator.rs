/// Submission Orchestrator - Backend Coordination
///
/// **Responsibility:**
/// Drive the execution backend and feed each raw result through the
/// normalizer, comparator and summary builder.
///
/// **Architecture:**
/// 1. `submit` returns the backend's raw shape, plus harvest metadata when requested
/// 2. `get` / `batch_get` return the fully normalized `SubmissionResult`
/// 3. `run` composes the two for callers that want a finished, normalized result
///
/// This module is the glue layer - it knows nothing about:
/// - How lines are classified (classifier's job)
/// - How outputs are compared (comparator's job)
/// - How the backend is reached (backend's job)
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use judge_relay_common::types::{
    ExecutionMetrics, HarvestMetadata, LanguageRef, OutputStreams, RawSubmission, Submission,
    SubmissionResult, SubmitOptions,
};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::backend::{ExecutionBackend, LanguageDescriptor, StatusDescriptor};
use crate::comparator::compare;
use crate::error::{RelayError, RelayResult};
use crate::normalizer::normalize;
use crate::summary::summarize;

const HARVEST_OPERATION: &str = "create submission with actual as expected";
const NO_HARVEST_OUTPUT: &str = "No raw output found to use as expected output";

/// Build the caller-facing record from a raw backend result.
///
/// A comparison is attached only when the backend echoed a non-empty
/// expected output and stdout yielded an actual value.
pub fn process_result(raw: RawSubmission) -> SubmissionResult {
    let stdout = normalize(raw.stdout.as_deref());
    let stderr = normalize(raw.stderr.as_deref());
    let compile_output = normalize(raw.compile_output.as_deref());
    let execution_summary = summarize(&raw);

    let output_comparison = match (raw.expected_output.as_deref(), stdout.actual.as_deref()) {
        (Some(expected), Some(actual)) if !expected.is_empty() => {
            Some(compare(Some(actual), Some(expected)))
        }
        _ => None,
    };

    let language = raw.language.unwrap_or_default();

    SubmissionResult {
        token: raw.token,
        status: raw.status.unwrap_or_default(),
        language: LanguageRef {
            id: raw.language_id.or(language.id),
            name: language.name,
        },
        execution: ExecutionMetrics {
            time: raw.time,
            memory: raw.memory,
            wall_time: raw.wall_time,
        },
        output: OutputStreams {
            stdout,
            stderr,
            compile_output,
        },
        source_code: raw.source_code,
        stdin: raw.stdin,
        expected_output: raw.expected_output,
        created_at: raw.created_at,
        finished_at: raw.finished_at,
        execution_summary,
        output_comparison,
        metadata: raw.metadata,
    }
}

/// Put backend results back into the order the tokens were requested in
fn restore_order(tokens: &[String], raws: Vec<RawSubmission>) -> RelayResult<Vec<RawSubmission>> {
    if raws.len() == tokens.len() && raws.iter().all(|raw| raw.token.is_none()) {
        warn!(count = raws.len(), "Batch results carry no tokens, keeping backend order");
        return Ok(raws);
    }

    let mut by_token: HashMap<String, VecDeque<RawSubmission>> = HashMap::new();
    for raw in raws {
        match raw.token.clone() {
            Some(token) => by_token.entry(token).or_default().push_back(raw),
            None => warn!("Dropping batch result without a token"),
        }
    }

    let ordered = tokens
        .iter()
        .map(|token| {
            by_token
                .get_mut(token)
                .and_then(VecDeque::pop_front)
                .ok_or_else(|| {
                    RelayError::backend(
                        "get batch submissions",
                        None,
                        format!("backend returned no result for token {token}"),
                    )
                })
        })
        .collect::<RelayResult<Vec<_>>>()?;

    let unrequested: usize = by_token.values().map(VecDeque::len).sum();
    if unrequested > 0 {
        warn!(unrequested, "Ignoring batch results for tokens that were not requested");
    }

    Ok(ordered)
}

#[derive(Clone)]
pub struct Orchestrator {
    backend: Arc<dyn ExecutionBackend>,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn ExecutionBackend>) -> Self {
        Self { backend }
    }

    /// Submit and wait for completion, returning the backend's raw result.
    ///
    /// With `use_actual_as_expected` this runs the two-phase harvest flow.
    #[instrument(skip(self, submission), fields(language_id = submission.language_id, harvest = options.use_actual_as_expected))]
    pub async fn submit(
        &self,
        submission: &Submission,
        options: SubmitOptions,
    ) -> RelayResult<RawSubmission> {
        if options.use_actual_as_expected {
            return self.harvest(submission).await;
        }

        let raw = self.backend.submit(submission, true).await?;
        info!(token = ?raw.token, status = ?raw.status_id(), "Submission completed");
        Ok(raw)
    }

    /// Run once without an expected value, then resubmit with the trimmed
    /// stdout of that run as the expected output. The two runs are serial.
    async fn harvest(&self, submission: &Submission) -> RelayResult<RawSubmission> {
        let first = Submission {
            expected_output: None,
            ..submission.clone()
        };
        let first_raw = self.backend.submit(&first, true).await?;

        let harvested = first_raw
            .stdout
            .as_deref()
            .map(str::trim)
            .filter(|out| !out.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                warn!(token = ?first_raw.token, "Harvest run produced no stdout");
                RelayError::Extraction {
                    operation: HARVEST_OPERATION,
                    message: NO_HARVEST_OUTPUT.to_string(),
                }
            })?;

        info!(
            first_token = ?first_raw.token,
            harvested_bytes = harvested.len(),
            "Harvested actual output, resubmitting as expected"
        );

        let second = Submission {
            expected_output: Some(harvested.clone()),
            ..submission.clone()
        };
        let mut second_raw = self.backend.submit(&second, true).await?;

        second_raw.metadata = Some(HarvestMetadata {
            used_actual_as_expected: true,
            extracted_output: harvested,
            first_submission_token: first_raw.token.unwrap_or_default(),
        });

        info!(token = ?second_raw.token, "Harvest flow completed");
        Ok(second_raw)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, token: &str) -> RelayResult<SubmissionResult> {
        let raw = self.backend.get_by_token(token).await?;
        let result = process_result(raw);
        info!(
            status = ?result.status.id,
            category = %result.execution_summary.status_category,
            compared = result.output_comparison.is_some(),
            "Submission retrieved"
        );
        Ok(result)
    }

    /// Submit, then fetch the normalized result, keeping any harvest metadata
    pub async fn run(
        &self,
        submission: &Submission,
        options: SubmitOptions,
    ) -> RelayResult<SubmissionResult> {
        let raw = self.submit(submission, options).await?;
        let token = raw.token.clone().ok_or_else(|| {
            RelayError::backend("create submission", None, "backend response carried no token")
        })?;
        let result = self.get(&token).await?;
        Ok(result.with_metadata(raw.metadata))
    }

    /// Pass-through; callers validate the batch size before reaching here
    #[instrument(skip(self, submissions), fields(count = submissions.len()))]
    pub async fn batch_submit(&self, submissions: &[Submission]) -> RelayResult<Value> {
        let response = self.backend.submit_batch(submissions).await?;
        info!("Batch submitted");
        Ok(response)
    }

    /// Results come back in the order the tokens were requested
    #[instrument(skip(self, tokens), fields(count = tokens.len()))]
    pub async fn batch_get(&self, tokens: &[String]) -> RelayResult<Vec<SubmissionResult>> {
        let raws = self.backend.get_batch_by_tokens(tokens).await?;
        let ordered = restore_order(tokens, raws)?;
        Ok(ordered.into_iter().map(process_result).collect())
    }

    pub async fn languages(&self) -> RelayResult<Vec<LanguageDescriptor>> {
        self.backend.list_languages().await
    }

    pub async fn statuses(&self) -> RelayResult<Vec<StatusDescriptor>> {
        self.backend.list_statuses().await
    }
}

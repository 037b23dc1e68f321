//! In-memory fake backend (testing only)
//!
//! `FakeBackend` satisfies the `ExecutionBackend` contract without any
//! network. Submissions are stored by token so later reads find them, and
//! scripted responses or failures can be queued ahead of time.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use judge_relay_common::status::{ACCEPTED, STATUSES};
use judge_relay_common::types::{RawSubmission, StatusRef, Submission};
use serde_json::{json, Value};

use crate::backend::{ExecutionBackend, LanguageDescriptor, StatusDescriptor};
use crate::error::{RelayError, RelayResult};

#[derive(Default)]
struct FakeState {
    scripted: VecDeque<RelayResult<RawSubmission>>,
    stored: HashMap<String, RawSubmission>,
    submitted: Vec<Submission>,
    batches: Vec<Vec<Submission>>,
    next_token: u64,
    reverse_batch_order: bool,
    unavailable: bool,
}

impl FakeState {
    fn token(&mut self) -> String {
        self.next_token += 1;
        format!("fake-token-{}", self.next_token)
    }

    /// Fill in what Judge0 echoes back from the request and remember the result
    fn record(&mut self, submission: &Submission, mut raw: RawSubmission) -> RawSubmission {
        if raw.token.is_none() {
            raw.token = Some(self.token());
        }
        raw.language_id = raw.language_id.or(Some(submission.language_id));
        raw.source_code = raw.source_code.or_else(|| Some(submission.source_code.clone()));
        raw.stdin = raw.stdin.or_else(|| Some(submission.stdin.clone()));
        raw.expected_output = raw.expected_output.or_else(|| submission.expected_output.clone());

        if let Some(token) = &raw.token {
            self.stored.insert(token.clone(), raw.clone());
        }
        raw
    }
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self, operation: &'static str) -> RelayResult<()> {
        if self.state().unavailable {
            let cause = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
            return Err(RelayError::unavailable(operation, cause));
        }
        Ok(())
    }

    /// Queue the result of the next `submit` call
    pub fn push_submit_response(&self, raw: RawSubmission) {
        self.state().scripted.push_back(Ok(raw));
    }

    pub fn push_submit_error(&self, error: RelayError) {
        self.state().scripted.push_back(Err(error));
    }

    /// Make a result readable by token without submitting it
    pub fn insert(&self, raw: RawSubmission) {
        if let Some(token) = raw.token.clone() {
            self.state().stored.insert(token, raw);
        }
    }

    /// Answer batch reads in the reverse of the requested order
    pub fn reverse_batch_order(&self) {
        self.state().reverse_batch_order = true;
    }

    /// Fail every call as if the backend were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state().unavailable = unavailable;
    }

    pub fn submitted(&self) -> Vec<Submission> {
        self.state().submitted.clone()
    }

    pub fn batches(&self) -> Vec<Vec<Submission>> {
        self.state().batches.clone()
    }
}

/// Accepted result with the given stdout
pub fn accepted(stdout: &str) -> RawSubmission {
    RawSubmission {
        status: Some(StatusRef {
            id: Some(ACCEPTED),
            description: Some("Accepted".to_string()),
        }),
        stdout: Some(stdout.to_string()),
        ..Default::default()
    }
}

#[async_trait]
impl ExecutionBackend for FakeBackend {
    async fn submit(&self, submission: &Submission, _wait: bool) -> RelayResult<RawSubmission> {
        self.check_available("create submission")?;
        let mut state = self.state();
        state.submitted.push(submission.clone());
        let scripted = state.scripted.pop_front().unwrap_or_else(|| Ok(accepted("")));
        let raw = scripted?;
        Ok(state.record(submission, raw))
    }

    async fn get_by_token(&self, token: &str) -> RelayResult<RawSubmission> {
        self.check_available("get submission")?;
        self.state().stored.get(token).cloned().ok_or_else(|| {
            RelayError::backend("get submission", Some(404), "Not Found")
        })
    }

    async fn submit_batch(&self, submissions: &[Submission]) -> RelayResult<Value> {
        self.check_available("create batch submissions")?;
        let mut state = self.state();
        state.batches.push(submissions.to_vec());
        let tokens: Vec<Value> = submissions
            .iter()
            .map(|submission| {
                let raw = state.record(submission, RawSubmission::default());
                json!({ "token": raw.token })
            })
            .collect();
        Ok(Value::Array(tokens))
    }

    async fn get_batch_by_tokens(&self, tokens: &[String]) -> RelayResult<Vec<RawSubmission>> {
        self.check_available("get batch submissions")?;
        let state = self.state();
        let mut found: Vec<RawSubmission> = tokens
            .iter()
            .filter_map(|token| state.stored.get(token).cloned())
            .collect();
        if state.reverse_batch_order {
            found.reverse();
        }
        Ok(found)
    }

    async fn list_languages(&self) -> RelayResult<Vec<LanguageDescriptor>> {
        self.check_available("get languages")?;
        Ok(vec![
            LanguageDescriptor {
                id: 71,
                name: "Python (3.8.1)".to_string(),
            },
            LanguageDescriptor {
                id: 73,
                name: "Rust (1.40.0)".to_string(),
            },
        ])
    }

    async fn list_statuses(&self) -> RelayResult<Vec<StatusDescriptor>> {
        self.check_available("get statuses")?;
        Ok(STATUSES
            .iter()
            .map(|s| StatusDescriptor {
                id: s.id,
                description: s.name.to_string(),
            })
            .collect())
    }
}

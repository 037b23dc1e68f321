//! Execution backend contract
//!
//! The orchestrator is the only component that talks to the backend, and it
//! does so exclusively through this trait. Production uses `Judge0Client`;
//! tests use the in-memory fake in `fakes`.

use async_trait::async_trait;
use judge_relay_common::types::{RawSubmission, Submission};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RelayResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageDescriptor {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDescriptor {
    pub id: u32,
    pub description: String,
}

#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Create a submission; with `wait` the call returns once execution finished.
    async fn submit(&self, submission: &Submission, wait: bool) -> RelayResult<RawSubmission>;

    async fn get_by_token(&self, token: &str) -> RelayResult<RawSubmission>;

    /// Create several submissions at once. The response is passed through untouched.
    async fn submit_batch(&self, submissions: &[Submission]) -> RelayResult<Value>;

    /// Fetch several submissions. Result order is whatever the backend returns.
    async fn get_batch_by_tokens(&self, tokens: &[String]) -> RelayResult<Vec<RawSubmission>>;

    async fn list_languages(&self) -> RelayResult<Vec<LanguageDescriptor>>;

    async fn list_statuses(&self) -> RelayResult<Vec<StatusDescriptor>>;
}

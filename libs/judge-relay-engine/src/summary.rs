// Execution summary builder
// Pure mapping from backend status and resource fields to a success/failure view

use judge_relay_common::status::{self, ACCEPTED};
use judge_relay_common::types::{ExecutionSummary, Metric, RawSubmission};

fn has_text(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

pub fn summarize(raw: &RawSubmission) -> ExecutionSummary {
    let status_id = raw.status_id();

    ExecutionSummary {
        success: status_id == Some(ACCEPTED),
        has_output: has_text(&raw.stdout),
        has_errors: has_text(&raw.stderr),
        has_compile_errors: has_text(&raw.compile_output),
        execution_time_ms: raw.time.as_ref().and_then(Metric::as_f64).map(|secs| secs * 1000.0),
        memory_usage_kb: raw.memory.as_ref().and_then(Metric::as_i64),
        status_category: status::status_category(status_id),
    }
}

// Judge0 status table
// Single source of truth for status display names, groups and summary categories

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status id the backend reports for an accepted run
pub const ACCEPTED: u32 = 3;

/// Coarse bucket shown to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusGroup {
    Pending,
    Success,
    Failed,
    Error,
}

/// Category used by the execution summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Queued,
    Processing,
    Success,
    Wrong,
    Timeout,
    CompileError,
    RuntimeError,
    InternalError,
    Unknown,
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatusCategory::Queued => "queued",
            StatusCategory::Processing => "processing",
            StatusCategory::Success => "success",
            StatusCategory::Wrong => "wrong",
            StatusCategory::Timeout => "timeout",
            StatusCategory::CompileError => "compile_error",
            StatusCategory::RuntimeError => "runtime_error",
            StatusCategory::InternalError => "internal_error",
            StatusCategory::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusInfo {
    pub id: u32,
    pub name: &'static str,
    pub group: StatusGroup,
    pub category: StatusCategory,
    pub color: &'static str,
}

const fn status(
    id: u32,
    name: &'static str,
    group: StatusGroup,
    category: StatusCategory,
    color: &'static str,
) -> StatusInfo {
    StatusInfo {
        id,
        name,
        group,
        category,
        color,
    }
}

pub const STATUSES: [StatusInfo; 14] = [
    status(1, "In Queue", StatusGroup::Pending, StatusCategory::Queued, "blue"),
    status(2, "Processing", StatusGroup::Pending, StatusCategory::Processing, "yellow"),
    status(3, "Accepted", StatusGroup::Success, StatusCategory::Success, "green"),
    status(4, "Wrong Answer", StatusGroup::Failed, StatusCategory::Wrong, "red"),
    status(5, "Time Limit Exceeded", StatusGroup::Failed, StatusCategory::Timeout, "orange"),
    status(6, "Compilation Error", StatusGroup::Error, StatusCategory::CompileError, "red"),
    status(7, "Runtime Error (SIGSEGV)", StatusGroup::Error, StatusCategory::RuntimeError, "red"),
    status(8, "Runtime Error (SIGXFSZ)", StatusGroup::Error, StatusCategory::RuntimeError, "red"),
    status(9, "Runtime Error (SIGFPE)", StatusGroup::Error, StatusCategory::RuntimeError, "red"),
    status(10, "Runtime Error (SIGABRT)", StatusGroup::Error, StatusCategory::RuntimeError, "red"),
    status(11, "Runtime Error (NZEC)", StatusGroup::Error, StatusCategory::RuntimeError, "red"),
    status(12, "Runtime Error (Other)", StatusGroup::Error, StatusCategory::RuntimeError, "red"),
    status(13, "Internal Error", StatusGroup::Error, StatusCategory::InternalError, "purple"),
    status(14, "Exec Format Error", StatusGroup::Error, StatusCategory::RuntimeError, "red"),
];

pub fn status_info(id: u32) -> Option<&'static StatusInfo> {
    STATUSES.iter().find(|s| s.id == id)
}

/// Summary category for a status id; absent or unknown ids map to `Unknown`
pub fn status_category(id: Option<u32>) -> StatusCategory {
    id.and_then(status_info)
        .map(|s| s.category)
        .unwrap_or(StatusCategory::Unknown)
}

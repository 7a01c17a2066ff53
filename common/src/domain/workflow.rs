use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::identity::UserId;
use crate::domain::syllabus::SyllabusId;

/// Wrapper to prevent ID confusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepId(pub i64);

impl From<i64> for StepId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Wrapper to prevent ID confusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryId(pub i64);

impl From<i64> for HistoryId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// What was done at a checkpoint. REQUEST_REVISION and ARCHIVE are
/// vocabulary carried for the ledger; the engine never produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowAction {
    Submit,
    Approve,
    Reject,
    RequestRevision,
    Publish,
    Archive,
}

impl WorkflowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowAction::Submit => "SUBMIT",
            WorkflowAction::Approve => "APPROVE",
            WorkflowAction::Reject => "REJECT",
            WorkflowAction::RequestRevision => "REQUEST_REVISION",
            WorkflowAction::Publish => "PUBLISH",
            WorkflowAction::Archive => "ARCHIVE",
        }
    }

    pub fn parse(value: &str) -> Option<WorkflowAction> {
        match value {
            "SUBMIT" => Some(WorkflowAction::Submit),
            "APPROVE" => Some(WorkflowAction::Approve),
            "REJECT" => Some(WorkflowAction::Reject),
            "REQUEST_REVISION" => Some(WorkflowAction::RequestRevision),
            "PUBLISH" => Some(WorkflowAction::Publish),
            "ARCHIVE" => Some(WorkflowAction::Archive),
            _ => None,
        }
    }
}

impl std::fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named checkpoint a history entry is attached to. Steps are created
/// lazily on first use, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub id: StepId,
    pub name: String,
    pub order: i32,
}

/// Total order of the known checkpoints; unknown names sort first.
pub fn step_order(name: &str) -> i32 {
    match name {
        "Draft" => 1,
        "Pending Review" => 2,
        "Pending Approval" => 3,
        "Approved" => 4,
        "Published" => 5,
        _ => 0,
    }
}

/// One immutable row of the workflow ledger: who did what, at which
/// checkpoint, when. Outlives any rewrite of the syllabus working copy.
#[derive(Debug, Clone)]
pub struct WorkflowHistoryEntry {
    pub id: HistoryId,
    pub syllabus_id: SyllabusId,
    pub step: WorkflowStep,
    pub action_by: UserId,
    pub action_by_username: String,
    pub action: WorkflowAction,
    pub comment: Option<String>,
    pub action_time: DateTime<Utc>,
}

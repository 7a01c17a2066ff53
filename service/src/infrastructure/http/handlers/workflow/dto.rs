use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use syllabus_common::{Syllabus, WorkflowHistoryEntry};

use crate::domain::workflow::TransitionSummary;

#[derive(Debug, Default, Deserialize)]
pub struct TransitionRequest {
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResponse {
    pub syllabus_id: i64,
    pub previous_status: String,
    pub new_status: String,
    pub action_by: String,
    pub action: String,
    pub comment: Option<String>,
    pub action_time: DateTime<Utc>,
    pub message: String,
}

impl From<TransitionSummary> for TransitionResponse {
    fn from(summary: TransitionSummary) -> Self {
        Self {
            syllabus_id: summary.syllabus_id.0,
            previous_status: summary.previous_status.as_str().to_string(),
            new_status: summary.new_status.as_str().to_string(),
            action_by: summary.action_by,
            action: summary.action.as_str().to_string(),
            comment: summary.comment,
            action_time: summary.action_time,
            message: summary.message,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyllabusResponse {
    pub syllabus_id: i64,
    pub course_id: i64,
    pub lecturer_id: i64,
    pub academic_year: String,
    pub version_no: i32,
    pub is_latest_version: bool,
    pub previous_version_id: Option<i64>,
    pub current_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<Syllabus> for SyllabusResponse {
    fn from(syllabus: Syllabus) -> Self {
        Self {
            syllabus_id: syllabus.id.0,
            course_id: syllabus.course_id.0,
            lecturer_id: syllabus.lecturer_id.0,
            academic_year: syllabus.academic_year.to_string(),
            version_no: syllabus.version_no,
            is_latest_version: syllabus.is_latest_version,
            previous_version_id: syllabus.previous_version_id.map(|id| id.0),
            current_status: syllabus.current_status.as_str().to_string(),
            created_at: syllabus.created_at,
            updated_at: syllabus.updated_at,
            published_at: syllabus.published_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowHistoryResponse {
    pub history_id: i64,
    pub syllabus_id: i64,
    pub step_name: String,
    pub step_order: i32,
    pub action_by: String,
    pub action: String,
    pub comment: Option<String>,
    pub action_time: DateTime<Utc>,
}

impl From<WorkflowHistoryEntry> for WorkflowHistoryResponse {
    fn from(entry: WorkflowHistoryEntry) -> Self {
        Self {
            history_id: entry.id.0,
            syllabus_id: entry.syllabus_id.0,
            step_name: entry.step.name,
            step_order: entry.step.order,
            action_by: entry.action_by_username,
            action: entry.action.as_str().to_string(),
            comment: entry.comment,
            action_time: entry.action_time,
        }
    }
}

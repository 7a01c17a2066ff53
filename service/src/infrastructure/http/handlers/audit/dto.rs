use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use syllabus_common::AuditRecord;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DateRangeParams {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RecentParams {
    pub days: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogResponse {
    pub id: i64,
    pub syllabus_id: Option<i64>,
    pub action_type: String,
    pub performed_by: String,
    pub performed_by_role: String,
    pub old_status: Option<String>,
    pub new_status: Option<String>,
    pub comments: Option<String>,
    pub changed_fields: Option<String>,
    pub ip_address: String,
    pub user_agent: String,
    pub recorded_at: DateTime<Utc>,
    pub additional_data: Option<String>,
}

impl From<AuditRecord> for AuditLogResponse {
    fn from(record: AuditRecord) -> Self {
        Self {
            id: record.id.0,
            syllabus_id: record.syllabus_id.map(|id| id.0),
            action_type: record.action.as_str().to_string(),
            performed_by: record.performed_by,
            performed_by_role: record.performed_by_role,
            old_status: record.old_status,
            new_status: record.new_status,
            comments: record.comments,
            changed_fields: record.changed_fields,
            ip_address: record.ip_address,
            user_agent: record.user_agent,
            recorded_at: record.recorded_at,
            additional_data: record.additional_data,
        }
    }
}

use chrono::{DateTime, Utc};
use serde::Serialize;

use syllabus_common::Notification;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub notification_id: i64,
    pub syllabus_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub action_url: String,
    pub triggered_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            notification_id: notification.id.0,
            syllabus_id: notification.syllabus_id.map(|id| id.0),
            kind: notification.kind.as_str().to_string(),
            title: notification.title,
            message: notification.message,
            is_read: notification.is_read,
            read_at: notification.read_at,
            action_url: notification.action_url,
            triggered_by: notification.triggered_by,
            created_at: notification.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadResponse {
    pub marked_read: u64,
}

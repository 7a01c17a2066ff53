use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::identity::UserId;
use crate::domain::syllabus::SyllabusId;

/// Wrapper to prevent ID confusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub i64);

impl From<i64> for NotificationId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    SyllabusSubmitted,
    SyllabusApprovedByHod,
    SyllabusRejectedByHod,
    SyllabusApprovedByAa,
    SyllabusRejectedByAa,
    SyllabusPublished,
    SyllabusRejectedByPrincipal,
    PdfUploaded,
    PdfDeleted,
    CommentAdded,
    DeadlineReminder,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::SyllabusSubmitted => "SYLLABUS_SUBMITTED",
            NotificationKind::SyllabusApprovedByHod => "SYLLABUS_APPROVED_BY_HOD",
            NotificationKind::SyllabusRejectedByHod => "SYLLABUS_REJECTED_BY_HOD",
            NotificationKind::SyllabusApprovedByAa => "SYLLABUS_APPROVED_BY_AA",
            NotificationKind::SyllabusRejectedByAa => "SYLLABUS_REJECTED_BY_AA",
            NotificationKind::SyllabusPublished => "SYLLABUS_PUBLISHED",
            NotificationKind::SyllabusRejectedByPrincipal => "SYLLABUS_REJECTED_BY_PRINCIPAL",
            NotificationKind::PdfUploaded => "PDF_UPLOADED",
            NotificationKind::PdfDeleted => "PDF_DELETED",
            NotificationKind::CommentAdded => "COMMENT_ADDED",
            NotificationKind::DeadlineReminder => "DEADLINE_REMINDER",
        }
    }

    pub fn parse(value: &str) -> Option<NotificationKind> {
        match value {
            "SYLLABUS_SUBMITTED" => Some(NotificationKind::SyllabusSubmitted),
            "SYLLABUS_APPROVED_BY_HOD" => Some(NotificationKind::SyllabusApprovedByHod),
            "SYLLABUS_REJECTED_BY_HOD" => Some(NotificationKind::SyllabusRejectedByHod),
            "SYLLABUS_APPROVED_BY_AA" => Some(NotificationKind::SyllabusApprovedByAa),
            "SYLLABUS_REJECTED_BY_AA" => Some(NotificationKind::SyllabusRejectedByAa),
            "SYLLABUS_PUBLISHED" => Some(NotificationKind::SyllabusPublished),
            "SYLLABUS_REJECTED_BY_PRINCIPAL" => Some(NotificationKind::SyllabusRejectedByPrincipal),
            "PDF_UPLOADED" => Some(NotificationKind::PdfUploaded),
            "PDF_DELETED" => Some(NotificationKind::PdfDeleted),
            "COMMENT_ADDED" => Some(NotificationKind::CommentAdded),
            "DEADLINE_REMINDER" => Some(NotificationKind::DeadlineReminder),
            _ => None,
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            NotificationKind::SyllabusRejectedByHod
                | NotificationKind::SyllabusRejectedByAa
                | NotificationKind::SyllabusRejectedByPrincipal
        )
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One alert for one recipient. Immutable after creation except for the
/// read mark; removed only by the retention sweep.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient: UserId,
    pub syllabus_id: Option<SyllabusId>,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub action_url: String,
    pub triggered_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient: UserId,
    pub syllabus_id: Option<SyllabusId>,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub action_url: String,
    pub triggered_by: String,
}

/// Unread breakdown shown in the notification bell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationStats {
    pub total_unread: i64,
    pub pending_reviews: i64,
    pub pending_approvals: i64,
    pub rejected_syllabuses: i64,
}

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::syllabus::SyllabusId;

/// Wrapper to prevent ID confusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuditLogId(pub i64);

impl From<i64> for AuditLogId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Everything the audit ledger can record. Closed set of known actions
/// plus an escape hatch, so rows written by newer deployments still read
/// back without loss.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    CreateSyllabus,
    UpdateSyllabus,
    DeleteSyllabus,
    UploadPdf,
    DeletePdf,
    DownloadPdf,
    SubmitForReview,
    HodApprove,
    HodReject,
    AaApprove,
    AaReject,
    PrincipalApprove,
    PrincipalReject,
    CreateVersion,
    Archive,
    Restore,
    ViewSyllabus,
    ExportSyllabus,
    Other(String),
}

impl AuditAction {
    pub fn as_str(&self) -> &str {
        match self {
            AuditAction::CreateSyllabus => "CREATE_SYLLABUS",
            AuditAction::UpdateSyllabus => "UPDATE_SYLLABUS",
            AuditAction::DeleteSyllabus => "DELETE_SYLLABUS",
            AuditAction::UploadPdf => "UPLOAD_PDF",
            AuditAction::DeletePdf => "DELETE_PDF",
            AuditAction::DownloadPdf => "DOWNLOAD_PDF",
            AuditAction::SubmitForReview => "SUBMIT_FOR_REVIEW",
            AuditAction::HodApprove => "HOD_APPROVE",
            AuditAction::HodReject => "HOD_REJECT",
            AuditAction::AaApprove => "AA_APPROVE",
            AuditAction::AaReject => "AA_REJECT",
            AuditAction::PrincipalApprove => "PRINCIPAL_APPROVE",
            AuditAction::PrincipalReject => "PRINCIPAL_REJECT",
            AuditAction::CreateVersion => "CREATE_VERSION",
            AuditAction::Archive => "ARCHIVE",
            AuditAction::Restore => "RESTORE",
            AuditAction::ViewSyllabus => "VIEW_SYLLABUS",
            AuditAction::ExportSyllabus => "EXPORT_SYLLABUS",
            AuditAction::Other(custom) => custom.as_str(),
        }
    }

    /// Never fails: unrecognized labels land in `Other`.
    pub fn parse(value: &str) -> AuditAction {
        match value {
            "CREATE_SYLLABUS" => AuditAction::CreateSyllabus,
            "UPDATE_SYLLABUS" => AuditAction::UpdateSyllabus,
            "DELETE_SYLLABUS" => AuditAction::DeleteSyllabus,
            "UPLOAD_PDF" => AuditAction::UploadPdf,
            "DELETE_PDF" => AuditAction::DeletePdf,
            "DOWNLOAD_PDF" => AuditAction::DownloadPdf,
            "SUBMIT_FOR_REVIEW" => AuditAction::SubmitForReview,
            "HOD_APPROVE" => AuditAction::HodApprove,
            "HOD_REJECT" => AuditAction::HodReject,
            "AA_APPROVE" => AuditAction::AaApprove,
            "AA_REJECT" => AuditAction::AaReject,
            "PRINCIPAL_APPROVE" => AuditAction::PrincipalApprove,
            "PRINCIPAL_REJECT" => AuditAction::PrincipalReject,
            "CREATE_VERSION" => AuditAction::CreateVersion,
            "ARCHIVE" => AuditAction::Archive,
            "RESTORE" => AuditAction::Restore,
            "VIEW_SYLLABUS" => AuditAction::ViewSyllabus,
            "EXPORT_SYLLABUS" => AuditAction::ExportSyllabus,
            other => AuditAction::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request details captured at the HTTP edge and passed down explicitly.
/// The recorder never reaches into ambient state.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// A row as the ledger persists it. Statuses and extras stay as the
/// strings that were written, so old rows survive vocabulary changes.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub id: AuditLogId,
    pub syllabus_id: Option<SyllabusId>,
    pub action: AuditAction,
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

/// A fully resolved row ready for insertion.
#[derive(Debug, Clone)]
pub struct NewAuditRecord {
    pub syllabus_id: Option<SyllabusId>,
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

/// Aggregate view over the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct AuditStatistics {
    pub total_logs: i64,
    pub count_by_action_type: HashMap<String, i64>,
    pub logs_last_24_hours: i64,
    pub logs_last_7_days: i64,
    pub logs_last_30_days: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_actions_round_trip() {
        for action in [
            AuditAction::SubmitForReview,
            AuditAction::HodApprove,
            AuditAction::PrincipalReject,
            AuditAction::ViewSyllabus,
        ] {
            assert_eq!(AuditAction::parse(action.as_str()), action);
        }
    }

    #[test]
    fn unknown_action_survives_as_other() {
        let parsed = AuditAction::parse("BULK_REINDEX");
        assert_eq!(parsed, AuditAction::Other("BULK_REINDEX".to_string()));
        assert_eq!(parsed.as_str(), "BULK_REINDEX");
    }
}

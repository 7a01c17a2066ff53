use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use nutype::nutype;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::identity::{CourseId, UserId};

/// Wrapper to prevent ID confusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyllabusId(pub i64);

impl From<i64> for SyllabusId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for SyllabusId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

static ACADEMIC_YEAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{4}$").unwrap());

#[nutype(
    sanitize(trim),
    validate(regex = ACADEMIC_YEAR_REGEX),
    derive(
        Clone,
        Debug,
        Display,
        FromStr,
        AsRef,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Serialize,
        Deserialize
    )
)]
pub struct AcademicYear(String);

/// Lifecycle status of a syllabus. ARCHIVE exists in the action
/// vocabulary but no transition reaches an archived status, so there is
/// no variant for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyllabusStatus {
    Draft,
    PendingReview,
    PendingApproval,
    Approved,
    Published,
}

impl SyllabusStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyllabusStatus::Draft => "DRAFT",
            SyllabusStatus::PendingReview => "PENDING_REVIEW",
            SyllabusStatus::PendingApproval => "PENDING_APPROVAL",
            SyllabusStatus::Approved => "APPROVED",
            SyllabusStatus::Published => "PUBLISHED",
        }
    }

    pub fn parse(value: &str) -> Option<SyllabusStatus> {
        match value {
            "DRAFT" => Some(SyllabusStatus::Draft),
            "PENDING_REVIEW" => Some(SyllabusStatus::PendingReview),
            "PENDING_APPROVAL" => Some(SyllabusStatus::PendingApproval),
            "APPROVED" => Some(SyllabusStatus::Approved),
            "PUBLISHED" => Some(SyllabusStatus::Published),
            _ => None,
        }
    }
}

impl std::fmt::Display for SyllabusStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The aggregate whose lifecycle the workflow engine governs. One row per
/// version; versions of one course/year chain through
/// `previous_version_id`.
#[derive(Debug, Clone)]
pub struct Syllabus {
    pub id: SyllabusId,
    pub course_id: CourseId,
    pub lecturer_id: UserId,
    pub academic_year: AcademicYear,
    pub version_no: i32,
    pub is_latest_version: bool,
    pub previous_version_id: Option<SyllabusId>,
    pub version_notes: Option<String>,
    pub description: Option<String>,
    pub current_status: SyllabusStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency counter; bumped by every committed
    /// transition.
    pub lock_version: i32,
}

impl Syllabus {
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.lecturer_id == user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names_round_trip() {
        for status in [
            SyllabusStatus::Draft,
            SyllabusStatus::PendingReview,
            SyllabusStatus::PendingApproval,
            SyllabusStatus::Approved,
            SyllabusStatus::Published,
        ] {
            assert_eq!(SyllabusStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SyllabusStatus::parse("ARCHIVED"), None);
    }

    #[test]
    fn academic_year_requires_full_range() {
        assert!(AcademicYear::try_new("2024-2025").is_ok());
        assert!(AcademicYear::try_new("2024").is_err());
        assert!(AcademicYear::try_new("24-25").is_err());
    }
}

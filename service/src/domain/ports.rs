use chrono::{DateTime, Utc};

use syllabus_common::{
    AuditAction, AuditRecord, AuditStatistics, CourseId, CourseInfo, NewAuditRecord,
    NewNotification, Notification, NotificationId, Role, Syllabus, SyllabusId, SyllabusStatus,
    UserAccount, UserId, Username, WorkflowAction, WorkflowHistoryEntry,
};

/// Limit/offset window for the read endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    pub fn offset(&self) -> i64 {
        i64::from(self.number.saturating_sub(1)) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { number: 1, size: 20 }
    }
}

/// Everything the store must persist atomically for one transition:
/// the status change and exactly one ledger row, or neither.
#[derive(Debug, Clone)]
pub struct TransitionCommit {
    pub syllabus_id: SyllabusId,
    /// `lock_version` observed during the precondition check; the store
    /// must refuse the write when the row has moved on.
    pub expected_version: i32,
    pub new_status: SyllabusStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub step_name: &'static str,
    pub action: WorkflowAction,
    pub action_by: UserId,
    pub comment: Option<String>,
    pub action_time: DateTime<Utc>,
}

#[derive(Debug)]
pub enum StoreError {
    NotFound,
    VersionConflict,
    UniqueViolation(String),
    DatabaseError(String),
}

pub trait SyllabusStore: Send + Sync + 'static {
    fn fetch(
        &self,
        id: SyllabusId,
    ) -> impl Future<Output = Result<Option<Syllabus>, StoreError>> + Send;

    fn list_by_status(
        &self,
        status: SyllabusStatus,
    ) -> impl Future<Output = Result<Vec<Syllabus>, StoreError>> + Send;

    /// Applies the status change and appends the history row in one
    /// transaction, guarded by the optimistic version check.
    fn commit_transition(
        &self,
        commit: TransitionCommit,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Ledger entries for one syllabus, newest first.
    fn history(
        &self,
        id: SyllabusId,
    ) -> impl Future<Output = Result<Vec<WorkflowHistoryEntry>, StoreError>> + Send;
}

/// Identity and organisation lookup. Backed by the shared directory
/// tables here; authentication itself lives at the gateway.
pub trait Directory: Send + Sync + 'static {
    fn resolve_user(
        &self,
        username: &Username,
    ) -> impl Future<Output = Result<Option<UserAccount>, StoreError>> + Send;

    fn user_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<UserAccount>, StoreError>> + Send;

    fn users_with_role(
        &self,
        role: Role,
    ) -> impl Future<Output = Result<Vec<UserAccount>, StoreError>> + Send;

    fn course(
        &self,
        id: CourseId,
    ) -> impl Future<Output = Result<Option<CourseInfo>, StoreError>> + Send;
}

pub trait AuditStore: Send + Sync + 'static {
    fn insert(
        &self,
        record: NewAuditRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn list(
        &self,
        page: Page,
    ) -> impl Future<Output = Result<Vec<AuditRecord>, StoreError>> + Send;

    fn by_syllabus(
        &self,
        id: SyllabusId,
    ) -> impl Future<Output = Result<Vec<AuditRecord>, StoreError>> + Send;

    fn by_actor(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Vec<AuditRecord>, StoreError>> + Send;

    fn by_action(
        &self,
        action: &AuditAction,
    ) -> impl Future<Output = Result<Vec<AuditRecord>, StoreError>> + Send;

    fn in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<AuditRecord>, StoreError>> + Send;

    fn by_academic_year(
        &self,
        year: &str,
    ) -> impl Future<Output = Result<Vec<AuditRecord>, StoreError>> + Send;

    fn since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<AuditRecord>, StoreError>> + Send;

    fn statistics(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<AuditStatistics, StoreError>> + Send;
}

pub trait NotificationStore: Send + Sync + 'static {
    fn insert(
        &self,
        notification: NewNotification,
    ) -> impl Future<Output = Result<NotificationId, StoreError>> + Send;

    fn fetch(
        &self,
        id: NotificationId,
    ) -> impl Future<Output = Result<Option<Notification>, StoreError>> + Send;

    fn list_for(
        &self,
        recipient: UserId,
        page: Page,
    ) -> impl Future<Output = Result<Vec<Notification>, StoreError>> + Send;

    fn unread_for(
        &self,
        recipient: UserId,
    ) -> impl Future<Output = Result<Vec<Notification>, StoreError>> + Send;

    fn mark_read(
        &self,
        id: NotificationId,
        read_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn mark_all_read(
        &self,
        recipient: UserId,
        read_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    fn delete_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;
}

//! In-memory port implementations for the domain tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use syllabus_common::{
    AuditAction, AuditLogId, AuditRecord, AuditStatistics, CourseId, CourseInfo, HistoryId,
    NewAuditRecord, NewNotification, Notification, NotificationId, Role, StepId, Syllabus,
    SyllabusId, SyllabusStatus, UserAccount, UserId, Username, WorkflowHistoryEntry, WorkflowStep,
    step_order,
};

use crate::domain::ports::{
    AuditStore, Directory, NotificationStore, Page, StoreError, SyllabusStore, TransitionCommit,
};

#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    inner: Arc<Mutex<DirectoryInner>>,
}

#[derive(Default)]
struct DirectoryInner {
    users: Vec<UserAccount>,
    courses: HashMap<i64, CourseInfo>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: UserAccount) {
        self.inner.lock().unwrap().users.push(user);
    }

    pub fn add_course(&self, course: CourseInfo) {
        self.inner.lock().unwrap().courses.insert(course.id.0, course);
    }
}

impl Directory for InMemoryDirectory {
    async fn resolve_user(&self, username: &Username) -> Result<Option<UserAccount>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| &u.username == username)
            .cloned())
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<UserAccount>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn users_with_role(&self, role: Role) -> Result<Vec<UserAccount>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .users
            .iter()
            .filter(|u| u.has_role(role))
            .cloned()
            .collect())
    }

    async fn course(&self, id: CourseId) -> Result<Option<CourseInfo>, StoreError> {
        Ok(self.inner.lock().unwrap().courses.get(&id.0).cloned())
    }
}

#[derive(Clone, Default)]
pub struct InMemorySyllabusStore {
    inner: Arc<Mutex<SyllabusInner>>,
    conflict_next_commit: Arc<AtomicBool>,
}

#[derive(Default)]
struct SyllabusInner {
    syllabi: HashMap<i64, Syllabus>,
    history: Vec<WorkflowHistoryEntry>,
    steps: HashMap<String, WorkflowStep>,
    usernames: HashMap<i64, String>,
    next_history_id: i64,
    next_step_id: i64,
}

impl InMemorySyllabusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_syllabus(&self, syllabus: Syllabus) {
        self.inner
            .lock()
            .unwrap()
            .syllabi
            .insert(syllabus.id.0, syllabus);
    }

    /// Maps an actor id to the username shown in ledger entries, the
    /// way the real store joins the users table.
    pub fn register_user(&self, id: UserId, username: &str) {
        self.inner
            .lock()
            .unwrap()
            .usernames
            .insert(id.0, username.to_string());
    }

    pub fn get(&self, id: SyllabusId) -> Option<Syllabus> {
        self.inner.lock().unwrap().syllabi.get(&id.0).cloned()
    }

    pub fn history_rows(&self) -> Vec<WorkflowHistoryEntry> {
        self.inner.lock().unwrap().history.clone()
    }

    /// The next `commit_transition` fails as if another request won the
    /// race for the row.
    pub fn conflict_on_next_commit(&self) {
        self.conflict_next_commit.store(true, Ordering::SeqCst);
    }
}

impl SyllabusStore for InMemorySyllabusStore {
    async fn fetch(&self, id: SyllabusId) -> Result<Option<Syllabus>, StoreError> {
        Ok(self.inner.lock().unwrap().syllabi.get(&id.0).cloned())
    }

    async fn list_by_status(
        &self,
        status: SyllabusStatus,
    ) -> Result<Vec<Syllabus>, StoreError> {
        let mut result: Vec<Syllabus> = self
            .inner
            .lock()
            .unwrap()
            .syllabi
            .values()
            .filter(|s| s.current_status == status)
            .cloned()
            .collect();
        result.sort_by_key(|s| s.id.0);
        Ok(result)
    }

    async fn commit_transition(&self, commit: TransitionCommit) -> Result<(), StoreError> {
        if self.conflict_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::VersionConflict);
        }

        let mut inner = self.inner.lock().unwrap();

        {
            let syllabus = inner
                .syllabi
                .get_mut(&commit.syllabus_id.0)
                .ok_or(StoreError::NotFound)?;
            if syllabus.lock_version != commit.expected_version {
                return Err(StoreError::VersionConflict);
            }
            syllabus.current_status = commit.new_status;
            syllabus.updated_at = Some(commit.action_time);
            if commit.published_at.is_some() {
                syllabus.published_at = commit.published_at;
            }
            syllabus.lock_version += 1;
        }

        let step = if let Some(step) = inner.steps.get(commit.step_name).cloned() {
            step
        } else {
            inner.next_step_id += 1;
            let step = WorkflowStep {
                id: StepId(inner.next_step_id),
                name: commit.step_name.to_string(),
                order: step_order(commit.step_name),
            };
            inner.steps.insert(step.name.clone(), step.clone());
            step
        };

        inner.next_history_id += 1;
        let entry = WorkflowHistoryEntry {
            id: HistoryId(inner.next_history_id),
            syllabus_id: commit.syllabus_id,
            step,
            action_by: commit.action_by,
            action_by_username: inner
                .usernames
                .get(&commit.action_by.0)
                .cloned()
                .unwrap_or_else(|| format!("user-{}", commit.action_by.0)),
            action: commit.action,
            comment: commit.comment,
            action_time: commit.action_time,
        };
        inner.history.push(entry);

        Ok(())
    }

    async fn history(&self, id: SyllabusId) -> Result<Vec<WorkflowHistoryEntry>, StoreError> {
        let mut entries: Vec<WorkflowHistoryEntry> = self
            .inner
            .lock()
            .unwrap()
            .history
            .iter()
            .filter(|h| h.syllabus_id == id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.action_time.cmp(&a.action_time).then(b.id.0.cmp(&a.id.0)));
        Ok(entries)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryAuditStore {
    inner: Arc<Mutex<AuditInner>>,
    fail_inserts: Arc<AtomicBool>,
}

#[derive(Default)]
struct AuditInner {
    rows: Vec<AuditRecord>,
    academic_years: HashMap<i64, String>,
    next_id: i64,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn rows(&self) -> Vec<AuditRecord> {
        self.inner.lock().unwrap().rows.clone()
    }

    pub fn set_academic_year(&self, syllabus: SyllabusId, year: &str) {
        self.inner
            .lock()
            .unwrap()
            .academic_years
            .insert(syllabus.0, year.to_string());
    }
}

impl AuditStore for InMemoryAuditStore {
    async fn insert(&self, record: NewAuditRecord) -> Result<(), StoreError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::DatabaseError("audit store offline".to_string()));
        }
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let row = AuditRecord {
            id: AuditLogId(inner.next_id),
            syllabus_id: record.syllabus_id,
            action: AuditAction::parse(&record.action_type),
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
        };
        inner.rows.push(row);
        Ok(())
    }

    async fn list(&self, page: Page) -> Result<Vec<AuditRecord>, StoreError> {
        let mut rows = self.rows();
        rows.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect())
    }

    async fn by_syllabus(&self, id: SyllabusId) -> Result<Vec<AuditRecord>, StoreError> {
        Ok(self
            .rows()
            .into_iter()
            .filter(|r| r.syllabus_id == Some(id))
            .collect())
    }

    async fn by_actor(&self, username: &str) -> Result<Vec<AuditRecord>, StoreError> {
        Ok(self
            .rows()
            .into_iter()
            .filter(|r| r.performed_by == username)
            .collect())
    }

    async fn by_action(&self, action: &AuditAction) -> Result<Vec<AuditRecord>, StoreError> {
        Ok(self
            .rows()
            .into_iter()
            .filter(|r| &r.action == action)
            .collect())
    }

    async fn in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AuditRecord>, StoreError> {
        Ok(self
            .rows()
            .into_iter()
            .filter(|r| r.recorded_at >= start && r.recorded_at <= end)
            .collect())
    }

    async fn by_academic_year(&self, year: &str) -> Result<Vec<AuditRecord>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .rows
            .iter()
            .filter(|r| {
                r.syllabus_id
                    .and_then(|id| inner.academic_years.get(&id.0))
                    .is_some_and(|y| y == year)
            })
            .cloned()
            .collect())
    }

    async fn since(&self, cutoff: DateTime<Utc>) -> Result<Vec<AuditRecord>, StoreError> {
        Ok(self
            .rows()
            .into_iter()
            .filter(|r| r.recorded_at >= cutoff)
            .collect())
    }

    async fn statistics(&self, now: DateTime<Utc>) -> Result<AuditStatistics, StoreError> {
        let rows = self.rows();
        let mut count_by_action_type: HashMap<String, i64> = HashMap::new();
        for row in &rows {
            *count_by_action_type
                .entry(row.action.as_str().to_string())
                .or_default() += 1;
        }
        let within = |days: i64| {
            rows.iter()
                .filter(|r| r.recorded_at >= now - chrono::Duration::days(days))
                .count() as i64
        };
        Ok(AuditStatistics {
            total_logs: rows.len() as i64,
            count_by_action_type,
            logs_last_24_hours: within(1),
            logs_last_7_days: within(7),
            logs_last_30_days: within(30),
        })
    }
}

#[derive(Clone, Default)]
pub struct InMemoryNotificationStore {
    inner: Arc<Mutex<NotificationInner>>,
    fail_inserts: Arc<AtomicBool>,
}

#[derive(Default)]
struct NotificationInner {
    rows: Vec<Notification>,
    next_id: i64,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn rows(&self) -> Vec<Notification> {
        self.inner.lock().unwrap().rows.clone()
    }
}

impl NotificationStore for InMemoryNotificationStore {
    async fn insert(&self, notification: NewNotification) -> Result<NotificationId, StoreError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::DatabaseError(
                "notification store offline".to_string(),
            ));
        }
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = NotificationId(inner.next_id);
        inner.rows.push(Notification {
            id,
            recipient: notification.recipient,
            syllabus_id: notification.syllabus_id,
            kind: notification.kind,
            title: notification.title,
            message: notification.message,
            is_read: false,
            read_at: None,
            action_url: notification.action_url,
            triggered_by: notification.triggered_by,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn fetch(&self, id: NotificationId) -> Result<Option<Notification>, StoreError> {
        Ok(self.rows().into_iter().find(|n| n.id == id))
    }

    async fn list_for(
        &self,
        recipient: UserId,
        page: Page,
    ) -> Result<Vec<Notification>, StoreError> {
        let mut rows: Vec<Notification> = self
            .rows()
            .into_iter()
            .filter(|n| n.recipient == recipient)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.0.cmp(&a.id.0)));
        Ok(rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect())
    }

    async fn unread_for(&self, recipient: UserId) -> Result<Vec<Notification>, StoreError> {
        Ok(self
            .rows()
            .into_iter()
            .filter(|n| n.recipient == recipient && !n.is_read)
            .collect())
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        read_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let row = inner
            .rows
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(StoreError::NotFound)?;
        row.is_read = true;
        row.read_at = Some(read_at);
        Ok(())
    }

    async fn mark_all_read(
        &self,
        recipient: UserId,
        read_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let mut marked = 0;
        for row in inner
            .rows
            .iter_mut()
            .filter(|n| n.recipient == recipient && !n.is_read)
        {
            row.is_read = true;
            row.read_at = Some(read_at);
            marked += 1;
        }
        Ok(marked)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.rows.len();
        inner.rows.retain(|n| n.created_at >= cutoff);
        Ok((before - inner.rows.len()) as u64)
    }
}

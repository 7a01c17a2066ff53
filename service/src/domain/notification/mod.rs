use chrono::{DateTime, Utc};
use futures::future::join_all;
use itertools::Itertools;

use syllabus_common::{
    CourseInfo, NewNotification, Notification, NotificationId, NotificationKind,
    NotificationStats, Role, Syllabus, SyllabusStatus, UserAccount, UserId, Username,
};

use crate::domain::ports::{Directory, NotificationStore, Page, StoreError};

/// A workflow or collaboration event that fans out into notifications.
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    Submitted {
        syllabus: Syllabus,
        submitted_by: String,
    },
    HodApproved {
        syllabus: Syllabus,
        approved_by: String,
    },
    HodRejected {
        syllabus: Syllabus,
        rejected_by: String,
        reason: Option<String>,
    },
    AaApproved {
        syllabus: Syllabus,
        approved_by: String,
    },
    AaRejected {
        syllabus: Syllabus,
        rejected_by: String,
        reason: Option<String>,
    },
    Published {
        syllabus: Syllabus,
        published_by: String,
    },
    PrincipalRejected {
        syllabus: Syllabus,
        rejected_by: String,
        reason: Option<String>,
    },
    PdfUploaded {
        syllabus: Syllabus,
        uploaded_by: String,
    },
    PdfDeleted {
        syllabus: Syllabus,
        deleted_by: String,
    },
    CommentAdded {
        syllabus: Syllabus,
        commenter: UserAccount,
    },
}

impl NotificationEvent {
    fn syllabus(&self) -> &Syllabus {
        match self {
            NotificationEvent::Submitted { syllabus, .. }
            | NotificationEvent::HodApproved { syllabus, .. }
            | NotificationEvent::HodRejected { syllabus, .. }
            | NotificationEvent::AaApproved { syllabus, .. }
            | NotificationEvent::AaRejected { syllabus, .. }
            | NotificationEvent::Published { syllabus, .. }
            | NotificationEvent::PrincipalRejected { syllabus, .. }
            | NotificationEvent::PdfUploaded { syllabus, .. }
            | NotificationEvent::PdfDeleted { syllabus, .. }
            | NotificationEvent::CommentAdded { syllabus, .. } => syllabus,
        }
    }
}

#[derive(Debug)]
pub enum NotificationError {
    UserNotFound(String),
    NotFound,
    Unauthorized(String),
    Store(StoreError),
}

impl std::fmt::Display for NotificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationError::UserNotFound(username) => {
                write!(f, "User not found with username: {}", username)
            }
            NotificationError::NotFound => f.write_str("Notification not found"),
            NotificationError::Unauthorized(message) => f.write_str(message),
            NotificationError::Store(cause) => write!(f, "storage failure: {:?}", cause),
        }
    }
}

impl From<StoreError> for NotificationError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => NotificationError::NotFound,
            other => NotificationError::Store(other),
        }
    }
}

/// Fan-out of events into per-recipient notification rows, plus the
/// read/mark operations behind the notification bell. Event dispatch is
/// fire-and-forget: it can never fail the operation that raised the
/// event.
#[derive(Clone)]
pub struct NotificationCenter<D, N>
where
    D: Directory,
    N: NotificationStore,
{
    directory: D,
    store: N,
}

impl<D, N> NotificationCenter<D, N>
where
    D: Directory,
    N: NotificationStore,
{
    pub fn new(directory: D, store: N) -> Self {
        Self { directory, store }
    }

    pub async fn notify(&self, event: NotificationEvent) {
        let syllabus_id = event.syllabus().id;
        if let Err(err) = self.dispatch(event).await {
            tracing::error!(
                syllabus = syllabus_id.0,
                "failed to dispatch notification, alert dropped: {:?}",
                err
            );
        }
    }

    async fn dispatch(&self, event: NotificationEvent) -> Result<(), StoreError> {
        match event {
            NotificationEvent::Submitted {
                syllabus,
                submitted_by,
            } => {
                let Some(course) = self.course_of(&syllabus).await? else {
                    return Ok(());
                };
                let Some(hod) = course.head_of_department else {
                    tracing::warn!(
                        department = %course.department_name,
                        "no head of department assigned, submission notification skipped"
                    );
                    return Ok(());
                };
                self.store
                    .insert(build(
                        hod,
                        &syllabus,
                        NotificationKind::SyllabusSubmitted,
                        "New Syllabus Submitted for Review",
                        format!(
                            "Syllabus for {} ({}) v{} has been submitted by {} and requires your review.",
                            course.name, course.code, syllabus.version_no, submitted_by
                        ),
                        &submitted_by,
                    ))
                    .await?;
                Ok(())
            }

            NotificationEvent::HodApproved {
                syllabus,
                approved_by,
            } => {
                self.tell_lecturer(
                    &syllabus,
                    NotificationKind::SyllabusApprovedByHod,
                    "Syllabus Approved by HOD",
                    "Your syllabus has been approved by the Head of Department and forwarded to Academic Affairs."
                        .to_string(),
                    &approved_by,
                )
                .await?;

                let Some(course) = self.course_of(&syllabus).await? else {
                    return Ok(());
                };
                self.tell_role_pool(
                    Role::AcademicAffairs,
                    &syllabus,
                    NotificationKind::SyllabusApprovedByHod,
                    "Syllabus Pending Your Approval",
                    format!(
                        "Syllabus for {} ({}) v{} has been approved by HOD and requires your review.",
                        course.name, course.code, syllabus.version_no
                    ),
                    &approved_by,
                    None,
                )
                .await
            }

            NotificationEvent::HodRejected {
                syllabus,
                rejected_by,
                reason,
            } => {
                let Some(course) = self.course_of(&syllabus).await? else {
                    return Ok(());
                };
                self.tell_lecturer(
                    &syllabus,
                    NotificationKind::SyllabusRejectedByHod,
                    "Syllabus Rejected by HOD",
                    with_reason(
                        format!(
                            "Your syllabus for {} ({}) v{} has been rejected by the Head of Department.",
                            course.name, course.code, syllabus.version_no
                        ),
                        reason.as_deref(),
                    ),
                    &rejected_by,
                )
                .await
            }

            NotificationEvent::AaApproved {
                syllabus,
                approved_by,
            } => {
                self.tell_lecturer(
                    &syllabus,
                    NotificationKind::SyllabusApprovedByAa,
                    "Syllabus Approved by Academic Affairs",
                    "Your syllabus has been approved by Academic Affairs and forwarded to the Principal."
                        .to_string(),
                    &approved_by,
                )
                .await?;

                let Some(course) = self.course_of(&syllabus).await? else {
                    return Ok(());
                };
                self.tell_role_pool(
                    Role::Principal,
                    &syllabus,
                    NotificationKind::SyllabusApprovedByAa,
                    "Syllabus Awaiting Final Approval",
                    format!(
                        "Syllabus for {} ({}) v{} requires your final approval for publication.",
                        course.name, course.code, syllabus.version_no
                    ),
                    &approved_by,
                    None,
                )
                .await
            }

            NotificationEvent::AaRejected {
                syllabus,
                rejected_by,
                reason,
            } => {
                let Some(course) = self.course_of(&syllabus).await? else {
                    return Ok(());
                };
                self.tell_lecturer(
                    &syllabus,
                    NotificationKind::SyllabusRejectedByAa,
                    "Syllabus Rejected by Academic Affairs",
                    with_reason(
                        format!(
                            "Your syllabus for {} ({}) v{} has been rejected by Academic Affairs.",
                            course.name, course.code, syllabus.version_no
                        ),
                        reason.as_deref(),
                    ),
                    &rejected_by,
                )
                .await
            }

            NotificationEvent::Published {
                syllabus,
                published_by,
            } => {
                self.tell_lecturer(
                    &syllabus,
                    NotificationKind::SyllabusPublished,
                    "Syllabus Published",
                    "Congratulations! Your syllabus has been approved and published by the Principal."
                        .to_string(),
                    &published_by,
                )
                .await
            }

            NotificationEvent::PrincipalRejected {
                syllabus,
                rejected_by,
                reason,
            } => {
                let Some(course) = self.course_of(&syllabus).await? else {
                    return Ok(());
                };
                self.tell_lecturer(
                    &syllabus,
                    NotificationKind::SyllabusRejectedByPrincipal,
                    "Syllabus Rejected by Principal",
                    with_reason(
                        format!(
                            "Your syllabus for {} ({}) v{} has been rejected by the Principal.",
                            course.name, course.code, syllabus.version_no
                        ),
                        reason.as_deref(),
                    ),
                    &rejected_by,
                )
                .await
            }

            NotificationEvent::PdfUploaded {
                syllabus,
                uploaded_by,
            } => {
                let Some(course) = self.course_of(&syllabus).await? else {
                    return Ok(());
                };
                self.tell_lecturer(
                    &syllabus,
                    NotificationKind::PdfUploaded,
                    "PDF Uploaded",
                    format!(
                        "PDF document has been uploaded for syllabus {} ({}) v{}.",
                        course.name, course.code, syllabus.version_no
                    ),
                    &uploaded_by,
                )
                .await
            }

            NotificationEvent::PdfDeleted {
                syllabus,
                deleted_by,
            } => {
                let Some(course) = self.course_of(&syllabus).await? else {
                    return Ok(());
                };
                self.tell_lecturer(
                    &syllabus,
                    NotificationKind::PdfDeleted,
                    "PDF Deleted",
                    format!(
                        "PDF document has been deleted from syllabus {} ({}) v{}.",
                        course.name, course.code, syllabus.version_no
                    ),
                    &deleted_by,
                )
                .await
            }

            NotificationEvent::CommentAdded { syllabus, commenter } => {
                self.dispatch_comment(&syllabus, &commenter).await
            }
        }
    }

    async fn dispatch_comment(
        &self,
        syllabus: &Syllabus,
        commenter: &UserAccount,
    ) -> Result<(), StoreError> {
        let Some(course) = self.course_of(syllabus).await? else {
            return Ok(());
        };
        let triggered_by = commenter.username.to_string();

        if syllabus.lecturer_id != commenter.id {
            self.store
                .insert(build(
                    syllabus.lecturer_id,
                    syllabus,
                    NotificationKind::CommentAdded,
                    "New Comment on Your Syllabus",
                    format!(
                        "{} commented on your syllabus: {} ({}) v{}",
                        commenter.full_name, course.name, course.code, syllabus.version_no
                    ),
                    &triggered_by,
                ))
                .await?;
        }

        if let Some(hod) = course.head_of_department
            && hod != commenter.id
        {
            self.store
                .insert(build(
                    hod,
                    syllabus,
                    NotificationKind::CommentAdded,
                    "New Comment on Syllabus",
                    format!(
                        "{} commented on syllabus: {} ({}) v{}",
                        commenter.full_name, course.name, course.code, syllabus.version_no
                    ),
                    &triggered_by,
                ))
                .await?;
        }

        // Academic Affairs joins the thread only once the syllabus has
        // reached their stage of the pipeline.
        if matches!(
            syllabus.current_status,
            SyllabusStatus::PendingApproval | SyllabusStatus::Approved
        ) {
            self.tell_role_pool(
                Role::AcademicAffairs,
                syllabus,
                NotificationKind::CommentAdded,
                "New Comment on Syllabus Under Review",
                format!(
                    "{} commented on syllabus: {} ({}) v{}",
                    commenter.full_name, course.name, course.code, syllabus.version_no
                ),
                &triggered_by,
                Some(commenter.id),
            )
            .await?;
        }

        Ok(())
    }

    /// Notify the external comment subsystem's events; resolves the
    /// commenter and fans out. Fire-and-forget like `notify`.
    pub async fn comment_added(&self, syllabus: Syllabus, commenter: &Username) {
        match self.directory.resolve_user(commenter).await {
            Ok(Some(user)) => {
                self.notify(NotificationEvent::CommentAdded {
                    syllabus,
                    commenter: user,
                })
                .await
            }
            Ok(None) => {
                tracing::warn!(%commenter, "comment notification skipped, unknown commenter")
            }
            Err(err) => {
                tracing::error!(%commenter, "comment notification skipped: {:?}", err)
            }
        }
    }

    async fn course_of(&self, syllabus: &Syllabus) -> Result<Option<CourseInfo>, StoreError> {
        let course = self.directory.course(syllabus.course_id).await?;
        if course.is_none() {
            tracing::error!(
                syllabus = syllabus.id.0,
                course = syllabus.course_id.0,
                "course missing for syllabus, notification skipped"
            );
        }
        Ok(course)
    }

    async fn tell_lecturer(
        &self,
        syllabus: &Syllabus,
        kind: NotificationKind,
        title: &str,
        message: String,
        triggered_by: &str,
    ) -> Result<(), StoreError> {
        let id = self
            .store
            .insert(build(
                syllabus.lecturer_id,
                syllabus,
                kind,
                title,
                message,
                triggered_by,
            ))
            .await?;
        tracing::debug!(
            notification = id.0,
            lecturer = syllabus.lecturer_id.0,
            syllabus = syllabus.id.0,
            "notification sent to lecturer"
        );
        Ok(())
    }

    async fn tell_role_pool(
        &self,
        role: Role,
        syllabus: &Syllabus,
        kind: NotificationKind,
        title: &str,
        message: String,
        triggered_by: &str,
        exclude: Option<UserId>,
    ) -> Result<(), StoreError> {
        let pool = self.users_with_role_except(role, exclude).await?;
        let inserts = pool
            .iter()
            .map(|user| {
                self.store.insert(build(
                    user.id,
                    syllabus,
                    kind,
                    title,
                    message.clone(),
                    triggered_by,
                ))
            })
            .collect::<Vec<_>>();

        join_all(inserts)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            recipients = pool.len(),
            role = %role,
            syllabus = syllabus.id.0,
            "notification fan-out delivered"
        );
        Ok(())
    }

    async fn users_with_role_except(
        &self,
        role: Role,
        exclude: Option<UserId>,
    ) -> Result<Vec<UserAccount>, StoreError> {
        let users = self.directory.users_with_role(role).await?;
        Ok(users
            .into_iter()
            .filter(|user| exclude != Some(user.id))
            .collect())
    }

    // Read and mark operations behind the notification bell.

    pub async fn notifications_for(
        &self,
        username: &Username,
        page: Page,
    ) -> Result<Vec<Notification>, NotificationError> {
        let user = self.require_user(username).await?;
        Ok(self.store.list_for(user.id, page).await?)
    }

    pub async fn unread_for(
        &self,
        username: &Username,
    ) -> Result<Vec<Notification>, NotificationError> {
        let user = self.require_user(username).await?;
        Ok(self.store.unread_for(user.id).await?)
    }

    pub async fn stats_for(
        &self,
        username: &Username,
    ) -> Result<NotificationStats, NotificationError> {
        let user = self.require_user(username).await?;
        let unread = self.store.unread_for(user.id).await?;

        let by_kind = unread.iter().counts_by(|n| n.kind);
        let count = |kind: NotificationKind| by_kind.get(&kind).copied().unwrap_or(0) as i64;

        Ok(NotificationStats {
            total_unread: unread.len() as i64,
            pending_reviews: count(NotificationKind::SyllabusSubmitted),
            pending_approvals: count(NotificationKind::SyllabusApprovedByHod)
                + count(NotificationKind::SyllabusApprovedByAa),
            rejected_syllabuses: unread.iter().filter(|n| n.kind.is_rejection()).count() as i64,
        })
    }

    pub async fn mark_read(
        &self,
        id: NotificationId,
        username: &Username,
    ) -> Result<(), NotificationError> {
        let notification = self
            .store
            .fetch(id)
            .await?
            .ok_or(NotificationError::NotFound)?;
        let user = self.require_user(username).await?;

        if notification.recipient != user.id {
            return Err(NotificationError::Unauthorized(
                "Not authorized to mark this notification as read".to_string(),
            ));
        }

        Ok(self.store.mark_read(id, Utc::now()).await?)
    }

    pub async fn mark_all_read(&self, username: &Username) -> Result<u64, NotificationError> {
        let user = self.require_user(username).await?;
        Ok(self.store.mark_all_read(user.id, Utc::now()).await?)
    }

    /// Retention sweep; returns how many rows were removed.
    pub async fn delete_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, NotificationError> {
        let deleted = self.store.delete_older_than(cutoff).await?;
        if deleted > 0 {
            tracing::info!(deleted, %cutoff, "old notifications removed");
        }
        Ok(deleted)
    }

    async fn require_user(&self, username: &Username) -> Result<UserAccount, NotificationError> {
        self.directory
            .resolve_user(username)
            .await?
            .ok_or_else(|| NotificationError::UserNotFound(username.to_string()))
    }
}

fn build(
    recipient: UserId,
    syllabus: &Syllabus,
    kind: NotificationKind,
    title: &str,
    message: String,
    triggered_by: &str,
) -> NewNotification {
    NewNotification {
        recipient,
        syllabus_id: Some(syllabus.id),
        kind,
        title: title.to_string(),
        message,
        action_url: format!("/api/syllabi/{}", syllabus.id),
        triggered_by: triggered_by.to_string(),
    }
}

fn with_reason(base: String, reason: Option<&str>) -> String {
    match reason.filter(|r| !r.is_empty()) {
        Some(r) => format!("{} Reason: {}", base, r),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::support::{InMemoryDirectory, InMemoryNotificationStore};
    use syllabus_common::test_utils::{make_course, make_syllabus, make_user};

    fn center(
        directory: InMemoryDirectory,
        store: InMemoryNotificationStore,
    ) -> NotificationCenter<InMemoryDirectory, InMemoryNotificationStore> {
        NotificationCenter::new(directory, store)
    }

    fn username(value: &str) -> Username {
        Username::try_new(value).unwrap()
    }

    #[tokio::test]
    async fn hod_approval_fans_out_to_lecturer_and_academic_affairs() {
        let directory = InMemoryDirectory::new();
        directory.add_user(make_user(1, "alice", &[Role::Lecturer]));
        directory.add_user(make_user(2, "aa.one", &[Role::AcademicAffairs]));
        directory.add_user(make_user(3, "aa.two", &[Role::AcademicAffairs]));
        directory.add_course(make_course(10, "CS101", "Intro to CS", 5, Some(4)));
        let store = InMemoryNotificationStore::new();

        center(directory, store.clone())
            .notify(NotificationEvent::HodApproved {
                syllabus: make_syllabus(42, 10, 1, SyllabusStatus::PendingApproval),
                approved_by: "hod.cs".to_string(),
            })
            .await;

        let rows = store.rows();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().any(|n| n.recipient == UserId(1)));
        assert!(rows.iter().any(|n| n.recipient == UserId(2)));
        assert!(rows.iter().any(|n| n.recipient == UserId(3)));
        assert!(rows.iter().all(|n| n.kind == NotificationKind::SyllabusApprovedByHod));
        assert!(rows.iter().all(|n| n.action_url == "/api/syllabi/42"));
    }

    #[tokio::test]
    async fn rejection_notifies_only_lecturer_with_reason() {
        let directory = InMemoryDirectory::new();
        directory.add_user(make_user(1, "alice", &[Role::Lecturer]));
        directory.add_course(make_course(10, "CS101", "Intro to CS", 5, Some(4)));
        let store = InMemoryNotificationStore::new();

        center(directory, store.clone())
            .notify(NotificationEvent::HodRejected {
                syllabus: make_syllabus(42, 10, 1, SyllabusStatus::Draft),
                rejected_by: "hod.cs".to_string(),
                reason: Some("missing assessment plan".to_string()),
            })
            .await;

        let rows = store.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].recipient, UserId(1));
        assert!(rows[0].message.ends_with("Reason: missing assessment plan"));
    }

    #[tokio::test]
    async fn aa_approval_reaches_every_principal() {
        let directory = InMemoryDirectory::new();
        directory.add_user(make_user(1, "alice", &[Role::Lecturer]));
        directory.add_user(make_user(7, "principal", &[Role::Principal]));
        directory.add_course(make_course(10, "CS101", "Intro to CS", 5, None));
        let store = InMemoryNotificationStore::new();

        center(directory, store.clone())
            .notify(NotificationEvent::AaApproved {
                syllabus: make_syllabus(42, 10, 1, SyllabusStatus::Approved),
                approved_by: "aa.one".to_string(),
            })
            .await;

        let rows = store.rows();
        assert_eq!(rows.len(), 2);
        let principal_alert = rows.iter().find(|n| n.recipient == UserId(7)).unwrap();
        assert_eq!(principal_alert.title, "Syllabus Awaiting Final Approval");
    }

    #[tokio::test]
    async fn publish_congratulates_the_lecturer() {
        let directory = InMemoryDirectory::new();
        directory.add_user(make_user(1, "alice", &[Role::Lecturer]));
        let store = InMemoryNotificationStore::new();

        center(directory, store.clone())
            .notify(NotificationEvent::Published {
                syllabus: make_syllabus(42, 10, 1, SyllabusStatus::Published),
                published_by: "principal".to_string(),
            })
            .await;

        let rows = store.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, NotificationKind::SyllabusPublished);
        assert!(rows[0].message.starts_with("Congratulations!"));
    }

    #[tokio::test]
    async fn comment_excludes_commenter_and_adds_aa_in_late_stages() {
        let directory = InMemoryDirectory::new();
        directory.add_user(make_user(1, "alice", &[Role::Lecturer]));
        directory.add_user(make_user(4, "hod.cs", &[Role::HeadOfDepartment]));
        directory.add_user(make_user(2, "aa.one", &[Role::AcademicAffairs]));
        directory.add_user(make_user(3, "aa.two", &[Role::AcademicAffairs]));
        directory.add_course(make_course(10, "CS101", "Intro to CS", 5, Some(4)));
        let store = InMemoryNotificationStore::new();

        // aa.one comments while the syllabus awaits approval: the
        // lecturer, the HOD and the OTHER academic affairs user hear.
        center(directory, store.clone())
            .notify(NotificationEvent::CommentAdded {
                syllabus: make_syllabus(42, 10, 1, SyllabusStatus::PendingApproval),
                commenter: make_user(2, "aa.one", &[Role::AcademicAffairs]),
            })
            .await;

        let rows = store.rows();
        let recipients: Vec<_> = rows.iter().map(|n| n.recipient).collect();
        assert_eq!(rows.len(), 3);
        assert!(recipients.contains(&UserId(1)));
        assert!(recipients.contains(&UserId(4)));
        assert!(recipients.contains(&UserId(3)));
        assert!(!recipients.contains(&UserId(2)));
    }

    #[tokio::test]
    async fn comment_in_draft_keeps_academic_affairs_out() {
        let directory = InMemoryDirectory::new();
        directory.add_user(make_user(1, "alice", &[Role::Lecturer]));
        directory.add_user(make_user(2, "aa.one", &[Role::AcademicAffairs]));
        directory.add_course(make_course(10, "CS101", "Intro to CS", 5, None));
        let store = InMemoryNotificationStore::new();

        center(directory, store.clone())
            .notify(NotificationEvent::CommentAdded {
                syllabus: make_syllabus(42, 10, 1, SyllabusStatus::Draft),
                commenter: make_user(9, "reviewer", &[Role::Lecturer]),
            })
            .await;

        let rows = store.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].recipient, UserId(1));
    }

    #[tokio::test]
    async fn store_failure_never_escapes_notify() {
        let directory = InMemoryDirectory::new();
        directory.add_user(make_user(1, "alice", &[Role::Lecturer]));
        let store = InMemoryNotificationStore::new();
        store.fail_inserts(true);

        center(directory, store.clone())
            .notify(NotificationEvent::Published {
                syllabus: make_syllabus(42, 10, 1, SyllabusStatus::Published),
                published_by: "principal".to_string(),
            })
            .await;

        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn mark_read_is_recipient_only() {
        let directory = InMemoryDirectory::new();
        directory.add_user(make_user(1, "alice", &[Role::Lecturer]));
        directory.add_user(make_user(2, "mallory", &[Role::Lecturer]));
        let store = InMemoryNotificationStore::new();
        let center = center(directory, store.clone());

        center
            .notify(NotificationEvent::Published {
                syllabus: make_syllabus(42, 10, 1, SyllabusStatus::Published),
                published_by: "principal".to_string(),
            })
            .await;
        let id = store.rows()[0].id;

        let denied = center.mark_read(id, &username("mallory")).await;
        assert!(matches!(denied, Err(NotificationError::Unauthorized(_))));
        assert!(!store.rows()[0].is_read);

        center.mark_read(id, &username("alice")).await.unwrap();
        let row = &store.rows()[0];
        assert!(row.is_read);
        assert!(row.read_at.is_some());
    }

    #[tokio::test]
    async fn stats_break_down_unread_by_kind() {
        let directory = InMemoryDirectory::new();
        directory.add_user(make_user(4, "hod.cs", &[Role::HeadOfDepartment]));
        directory.add_user(make_user(1, "alice", &[Role::Lecturer]));
        directory.add_course(make_course(10, "CS101", "Intro to CS", 5, Some(4)));
        let store = InMemoryNotificationStore::new();
        let center = center(directory, store.clone());

        center
            .notify(NotificationEvent::Submitted {
                syllabus: make_syllabus(42, 10, 1, SyllabusStatus::PendingReview),
                submitted_by: "alice".to_string(),
            })
            .await;
        center
            .notify(NotificationEvent::Submitted {
                syllabus: make_syllabus(43, 10, 1, SyllabusStatus::PendingReview),
                submitted_by: "alice".to_string(),
            })
            .await;

        let stats = center.stats_for(&username("hod.cs")).await.unwrap();
        assert_eq!(
            stats,
            NotificationStats {
                total_unread: 2,
                pending_reviews: 2,
                pending_approvals: 0,
                rejected_syllabuses: 0,
            }
        );

        let marked = center.mark_all_read(&username("hod.cs")).await.unwrap();
        assert_eq!(marked, 2);
        assert_eq!(
            center.stats_for(&username("hod.cs")).await.unwrap().total_unread,
            0
        );
    }

    #[tokio::test]
    async fn retention_sweep_removes_old_rows() {
        let directory = InMemoryDirectory::new();
        directory.add_user(make_user(1, "alice", &[Role::Lecturer]));
        let store = InMemoryNotificationStore::new();
        let center = center(directory, store.clone());

        center
            .notify(NotificationEvent::Published {
                syllabus: make_syllabus(42, 10, 1, SyllabusStatus::Published),
                published_by: "principal".to_string(),
            })
            .await;

        let future_cutoff = Utc::now() + chrono::Duration::days(1);
        let deleted = center.delete_older_than(future_cutoff).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(store.rows().is_empty());
    }
}

use chrono::{DateTime, Utc};
use serde::Serialize;

use syllabus_common::{
    AuditAction, Role, RequestContext, Syllabus, SyllabusId, SyllabusStatus, Username,
    WorkflowAction, WorkflowHistoryEntry,
};

use crate::domain::audit::{AuditEntry, AuditRecorder};
use crate::domain::notification::{NotificationCenter, NotificationEvent};
use crate::domain::ports::{
    AuditStore, Directory, NotificationStore, StoreError, SyllabusStore, TransitionCommit,
};

#[cfg(test)]
mod tests;

/// The seven edges of the approval state machine. Each edge knows its
/// source and destination status, the role that may walk it and the
/// ledger vocabulary it is recorded under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Submit,
    HodApprove,
    HodReject,
    AaApprove,
    AaReject,
    PrincipalApprove,
    PrincipalReject,
}

impl TransitionKind {
    pub fn from_status(&self) -> SyllabusStatus {
        match self {
            TransitionKind::Submit => SyllabusStatus::Draft,
            TransitionKind::HodApprove | TransitionKind::HodReject => SyllabusStatus::PendingReview,
            TransitionKind::AaApprove | TransitionKind::AaReject => SyllabusStatus::PendingApproval,
            TransitionKind::PrincipalApprove | TransitionKind::PrincipalReject => {
                SyllabusStatus::Approved
            }
        }
    }

    pub fn to_status(&self) -> SyllabusStatus {
        match self {
            TransitionKind::Submit => SyllabusStatus::PendingReview,
            TransitionKind::HodApprove => SyllabusStatus::PendingApproval,
            TransitionKind::HodReject => SyllabusStatus::Draft,
            TransitionKind::AaApprove => SyllabusStatus::Approved,
            TransitionKind::AaReject => SyllabusStatus::PendingReview,
            TransitionKind::PrincipalApprove => SyllabusStatus::Published,
            TransitionKind::PrincipalReject => SyllabusStatus::PendingApproval,
        }
    }

    pub fn required_role(&self) -> Role {
        match self {
            TransitionKind::Submit => Role::Lecturer,
            TransitionKind::HodApprove | TransitionKind::HodReject => Role::HeadOfDepartment,
            TransitionKind::AaApprove | TransitionKind::AaReject => Role::AcademicAffairs,
            TransitionKind::PrincipalApprove | TransitionKind::PrincipalReject => Role::Principal,
        }
    }

    pub fn action(&self) -> WorkflowAction {
        match self {
            TransitionKind::Submit => WorkflowAction::Submit,
            TransitionKind::HodApprove | TransitionKind::AaApprove => WorkflowAction::Approve,
            TransitionKind::PrincipalApprove => WorkflowAction::Publish,
            TransitionKind::HodReject
            | TransitionKind::AaReject
            | TransitionKind::PrincipalReject => WorkflowAction::Reject,
        }
    }

    /// Checkpoint name the history row is filed under: the destination.
    pub fn step_name(&self) -> &'static str {
        match self.to_status() {
            SyllabusStatus::Draft => "Draft",
            SyllabusStatus::PendingReview => "Pending Review",
            SyllabusStatus::PendingApproval => "Pending Approval",
            SyllabusStatus::Approved => "Approved",
            SyllabusStatus::Published => "Published",
        }
    }

    pub fn audit_action(&self) -> AuditAction {
        match self {
            TransitionKind::Submit => AuditAction::SubmitForReview,
            TransitionKind::HodApprove => AuditAction::HodApprove,
            TransitionKind::HodReject => AuditAction::HodReject,
            TransitionKind::AaApprove => AuditAction::AaApprove,
            TransitionKind::AaReject => AuditAction::AaReject,
            TransitionKind::PrincipalApprove => AuditAction::PrincipalApprove,
            TransitionKind::PrincipalReject => AuditAction::PrincipalReject,
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            TransitionKind::Submit => "Syllabus submitted for HOD review successfully",
            TransitionKind::HodApprove => {
                "Syllabus approved by HOD, now pending Academic Affairs approval"
            }
            TransitionKind::HodReject => "Syllabus rejected by HOD, returned to DRAFT for revision",
            TransitionKind::AaApprove => {
                "Syllabus approved by Academic Affairs, now pending Principal approval"
            }
            TransitionKind::AaReject => {
                "Syllabus rejected by Academic Affairs, returned to PENDING_REVIEW"
            }
            TransitionKind::PrincipalApprove => "Syllabus published successfully by Principal",
            TransitionKind::PrincipalReject => {
                "Syllabus rejected by Principal, returned to PENDING_APPROVAL"
            }
        }
    }
}

#[derive(Debug)]
pub enum WorkflowError {
    SyllabusNotFound(SyllabusId),
    UserNotFound(String),
    Unauthorized(String),
    InvalidState {
        required: SyllabusStatus,
        actual: SyllabusStatus,
    },
    ConcurrentModification(SyllabusId),
    Store(StoreError),
}

impl std::fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowError::SyllabusNotFound(id) => {
                write!(f, "Syllabus not found with syllabusId: {}", id)
            }
            WorkflowError::UserNotFound(username) => {
                write!(f, "User not found with username: {}", username)
            }
            WorkflowError::Unauthorized(message) => f.write_str(message),
            WorkflowError::InvalidState { required, actual } => write!(
                f,
                "Syllabus must be in {} status. Current status: {}",
                required, actual
            ),
            WorkflowError::ConcurrentModification(id) => write!(
                f,
                "Syllabus {} was modified concurrently, please retry",
                id
            ),
            WorkflowError::Store(cause) => write!(f, "storage failure: {:?}", cause),
        }
    }
}

impl From<StoreError> for WorkflowError {
    fn from(value: StoreError) -> Self {
        WorkflowError::Store(value)
    }
}

/// What the caller gets back after a committed transition.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionSummary {
    pub syllabus_id: SyllabusId,
    pub previous_status: SyllabusStatus,
    pub new_status: SyllabusStatus,
    pub action_by: String,
    pub action: WorkflowAction,
    pub comment: Option<String>,
    pub action_time: DateTime<Utc>,
    pub message: String,
}

/// Orchestrates one transition: ordered precondition checks, the atomic
/// status+ledger commit, then best-effort audit and notification
/// side effects outside the transaction.
#[derive(Clone)]
pub struct WorkflowEngine<S, D, A, N>
where
    S: SyllabusStore,
    D: Directory + Clone,
    A: AuditStore,
    N: NotificationStore,
{
    store: S,
    directory: D,
    audit: AuditRecorder<D, A>,
    notifier: NotificationCenter<D, N>,
}

impl<S, D, A, N> WorkflowEngine<S, D, A, N>
where
    S: SyllabusStore,
    D: Directory + Clone,
    A: AuditStore,
    N: NotificationStore,
{
    pub fn new(
        store: S,
        directory: D,
        audit: AuditRecorder<D, A>,
        notifier: NotificationCenter<D, N>,
    ) -> Self {
        Self {
            store,
            directory,
            audit,
            notifier,
        }
    }

    pub async fn execute(
        &self,
        kind: TransitionKind,
        syllabus_id: SyllabusId,
        acting: &Username,
        comment: Option<String>,
        context: RequestContext,
    ) -> Result<TransitionSummary, WorkflowError> {
        tracing::info!(%acting, syllabus = syllabus_id.0, ?kind, "workflow transition requested");

        let syllabus = self
            .store
            .fetch(syllabus_id)
            .await?
            .ok_or(WorkflowError::SyllabusNotFound(syllabus_id))?;

        let user = self
            .directory
            .resolve_user(acting)
            .await?
            .ok_or_else(|| WorkflowError::UserNotFound(acting.to_string()))?;

        let required_role = kind.required_role();
        if !user.has_role(required_role) {
            return Err(WorkflowError::Unauthorized(format!(
                "You must have {} role to perform this action",
                required_role
            )));
        }

        // Ownership is checked on top of the role, not instead of it.
        if kind == TransitionKind::Submit && !syllabus.is_owned_by(user.id) {
            return Err(WorkflowError::Unauthorized(
                "You can only submit your own syllabus".to_string(),
            ));
        }

        let required_status = kind.from_status();
        if syllabus.current_status != required_status {
            return Err(WorkflowError::InvalidState {
                required: required_status,
                actual: syllabus.current_status,
            });
        }

        let now = Utc::now();
        let published_at = (kind == TransitionKind::PrincipalApprove).then_some(now);

        let commit = TransitionCommit {
            syllabus_id,
            expected_version: syllabus.lock_version,
            new_status: kind.to_status(),
            published_at,
            step_name: kind.step_name(),
            action: kind.action(),
            action_by: user.id,
            comment: comment.clone(),
            action_time: now,
        };

        self.store.commit_transition(commit).await.map_err(|err| match err {
            StoreError::VersionConflict => WorkflowError::ConcurrentModification(syllabus_id),
            StoreError::NotFound => WorkflowError::SyllabusNotFound(syllabus_id),
            other => WorkflowError::Store(other),
        })?;

        tracing::info!(
            %acting,
            syllabus = syllabus_id.0,
            action = %kind.action(),
            from = %syllabus.current_status,
            to = %kind.to_status(),
            "workflow transition committed"
        );

        // Side effects run after the commit; neither may undo it.
        self.audit
            .record(
                AuditEntry {
                    syllabus_id: Some(syllabus_id),
                    action: kind.audit_action(),
                    performed_by: acting.clone(),
                    old_status: Some(syllabus.current_status),
                    new_status: Some(kind.to_status()),
                    comments: comment.clone(),
                    changed_fields: None,
                    additional_data: None,
                },
                &context,
            )
            .await;

        self.notifier
            .notify(transition_event(kind, &syllabus, acting, comment.as_deref()))
            .await;

        Ok(TransitionSummary {
            syllabus_id,
            previous_status: syllabus.current_status,
            new_status: kind.to_status(),
            action_by: acting.to_string(),
            action: kind.action(),
            comment,
            action_time: now,
            message: kind.success_message().to_string(),
        })
    }

    pub async fn syllabus(&self, id: SyllabusId) -> Result<Syllabus, WorkflowError> {
        self.store
            .fetch(id)
            .await?
            .ok_or(WorkflowError::SyllabusNotFound(id))
    }

    /// Ledger for one syllabus, newest entry first.
    pub async fn history(
        &self,
        id: SyllabusId,
    ) -> Result<Vec<WorkflowHistoryEntry>, WorkflowError> {
        // missing syllabus reads as an empty ledger, same as the store
        Ok(self.store.history(id).await?)
    }

    /// Syllabi in one status, narrowed to what the asking user may see.
    pub async fn syllabi_by_status(
        &self,
        status: SyllabusStatus,
        acting: &Username,
    ) -> Result<Vec<Syllabus>, WorkflowError> {
        let user = self
            .directory
            .resolve_user(acting)
            .await?
            .ok_or_else(|| WorkflowError::UserNotFound(acting.to_string()))?;

        let syllabi = self.store.list_by_status(status).await?;

        if user.has_role(Role::Admin)
            || user.has_role(Role::AcademicAffairs)
            || user.has_role(Role::Principal)
        {
            return Ok(syllabi);
        }

        if user.has_role(Role::HeadOfDepartment) {
            let Some(department) = user.department_id else {
                return Ok(Vec::new());
            };
            let mut visible = Vec::new();
            for syllabus in syllabi {
                let course = self.directory.course(syllabus.course_id).await?;
                if course.is_some_and(|c| c.department_id == department) {
                    visible.push(syllabus);
                }
            }
            return Ok(visible);
        }

        if user.has_role(Role::Lecturer) {
            return Ok(syllabi
                .into_iter()
                .filter(|s| s.is_owned_by(user.id))
                .collect());
        }

        Ok(Vec::new())
    }
}

fn transition_event(
    kind: TransitionKind,
    syllabus: &Syllabus,
    actor: &Username,
    comment: Option<&str>,
) -> NotificationEvent {
    let syllabus = syllabus.clone();
    let actor = actor.to_string();
    let reason = comment.map(str::to_string);
    match kind {
        TransitionKind::Submit => NotificationEvent::Submitted {
            syllabus,
            submitted_by: actor,
        },
        TransitionKind::HodApprove => NotificationEvent::HodApproved {
            syllabus,
            approved_by: actor,
        },
        TransitionKind::HodReject => NotificationEvent::HodRejected {
            syllabus,
            rejected_by: actor,
            reason,
        },
        TransitionKind::AaApprove => NotificationEvent::AaApproved {
            syllabus,
            approved_by: actor,
        },
        TransitionKind::AaReject => NotificationEvent::AaRejected {
            syllabus,
            rejected_by: actor,
            reason,
        },
        TransitionKind::PrincipalApprove => NotificationEvent::Published {
            syllabus,
            published_by: actor,
        },
        TransitionKind::PrincipalReject => NotificationEvent::PrincipalRejected {
            syllabus,
            rejected_by: actor,
            reason,
        },
    }
}

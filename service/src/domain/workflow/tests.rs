use super::*;
use crate::domain::audit::AuditRecorder;
use crate::domain::notification::NotificationCenter;
use crate::domain::support::{
    InMemoryAuditStore, InMemoryDirectory, InMemoryNotificationStore, InMemorySyllabusStore,
};
use syllabus_common::{NotificationKind, UserId};
use syllabus_common::test_utils::{make_course, make_syllabus, make_user, make_user_in_department};

struct Harness {
    engine: WorkflowEngine<
        InMemorySyllabusStore,
        InMemoryDirectory,
        InMemoryAuditStore,
        InMemoryNotificationStore,
    >,
    store: InMemorySyllabusStore,
    directory: InMemoryDirectory,
    audit: InMemoryAuditStore,
    notifications: InMemoryNotificationStore,
}

fn harness() -> Harness {
    let store = InMemorySyllabusStore::new();
    let directory = InMemoryDirectory::new();
    let audit = InMemoryAuditStore::new();
    let notifications = InMemoryNotificationStore::new();
    let engine = WorkflowEngine::new(
        store.clone(),
        directory.clone(),
        AuditRecorder::new(directory.clone(), audit.clone()),
        NotificationCenter::new(directory.clone(), notifications.clone()),
    );
    Harness {
        engine,
        store,
        directory,
        audit,
        notifications,
    }
}

/// alice lectures CS101 in department 5; hod.cs heads that department
/// (and, like most heads, also lectures).
fn seed_department(h: &Harness) {
    h.directory
        .add_user(make_user_in_department(1, "alice", &[Role::Lecturer], 5));
    h.directory.add_user(make_user_in_department(
        4,
        "hod.cs",
        &[Role::Lecturer, Role::HeadOfDepartment],
        5,
    ));
    h.directory.add_user(make_user(2, "aa.one", &[Role::AcademicAffairs]));
    h.directory.add_user(make_user(7, "principal", &[Role::Principal]));
    h.directory.add_user(make_user(3, "bob", &[Role::Lecturer]));
    h.directory
        .add_course(make_course(10, "CS101", "Intro to CS", 5, Some(4)));
    h.store.register_user(UserId(1), "alice");
    h.store.register_user(UserId(4), "hod.cs");
}

fn username(value: &str) -> Username {
    Username::try_new(value).unwrap()
}

#[tokio::test]
async fn submit_moves_draft_to_pending_review() {
    let h = harness();
    seed_department(&h);
    h.store
        .insert_syllabus(make_syllabus(42, 10, 1, SyllabusStatus::Draft));

    let summary = h
        .engine
        .execute(
            TransitionKind::Submit,
            SyllabusId(42),
            &username("alice"),
            Some("ready".to_string()),
            RequestContext::default(),
        )
        .await
        .unwrap();

    assert_eq!(summary.previous_status, SyllabusStatus::Draft);
    assert_eq!(summary.new_status, SyllabusStatus::PendingReview);
    assert_eq!(summary.action, WorkflowAction::Submit);
    assert_eq!(summary.message, "Syllabus submitted for HOD review successfully");

    let stored = h.store.get(SyllabusId(42)).unwrap();
    assert_eq!(stored.current_status, SyllabusStatus::PendingReview);
    assert!(stored.published_at.is_none());

    let history = h.store.history_rows();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, WorkflowAction::Submit);
    assert_eq!(history[0].step.name, "Pending Review");
    assert_eq!(history[0].step.order, 2);
    assert_eq!(history[0].comment.as_deref(), Some("ready"));
    assert_eq!(history[0].action_by_username, "alice");

    // the department head hears about it
    let alerts = h.notifications.rows();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].recipient, UserId(4));
    assert_eq!(alerts[0].kind, NotificationKind::SyllabusSubmitted);
    assert_eq!(alerts[0].action_url, "/api/syllabi/42");
    assert_eq!(alerts[0].triggered_by, "alice");

    // and the ledger carries the attempt
    let audit_rows = h.audit.rows();
    assert_eq!(audit_rows.len(), 1);
    assert_eq!(audit_rows[0].action, AuditAction::SubmitForReview);
    assert_eq!(audit_rows[0].old_status.as_deref(), Some("DRAFT"));
    assert_eq!(audit_rows[0].new_status.as_deref(), Some("PENDING_REVIEW"));
    assert_eq!(audit_rows[0].performed_by_role, "LECTURER");
}

#[tokio::test]
async fn submit_without_assigned_hod_still_succeeds() {
    let h = harness();
    h.directory
        .add_user(make_user_in_department(1, "alice", &[Role::Lecturer], 6));
    h.directory
        .add_course(make_course(11, "MA201", "Linear Algebra", 6, None));
    h.store
        .insert_syllabus(make_syllabus(50, 11, 1, SyllabusStatus::Draft));

    let result = h
        .engine
        .execute(
            TransitionKind::Submit,
            SyllabusId(50),
            &username("alice"),
            None,
            RequestContext::default(),
        )
        .await;

    assert!(result.is_ok());
    assert_eq!(
        h.store.get(SyllabusId(50)).unwrap().current_status,
        SyllabusStatus::PendingReview
    );
    assert!(h.notifications.rows().is_empty());
}

#[tokio::test]
async fn submit_is_owner_only_even_with_lecturer_role() {
    let h = harness();
    seed_department(&h);
    h.store
        .insert_syllabus(make_syllabus(42, 10, 1, SyllabusStatus::Draft));

    let result = h
        .engine
        .execute(
            TransitionKind::Submit,
            SyllabusId(42),
            &username("bob"),
            None,
            RequestContext::default(),
        )
        .await;

    assert!(matches!(result, Err(WorkflowError::Unauthorized(_))));
    assert_eq!(
        h.store.get(SyllabusId(42)).unwrap().current_status,
        SyllabusStatus::Draft
    );
    assert!(h.store.history_rows().is_empty());
}

#[tokio::test]
async fn hod_approval_rejected_without_role() {
    let h = harness();
    seed_department(&h);
    h.store
        .insert_syllabus(make_syllabus(42, 10, 1, SyllabusStatus::PendingReview));

    let result = h
        .engine
        .execute(
            TransitionKind::HodApprove,
            SyllabusId(42),
            &username("bob"),
            None,
            RequestContext::default(),
        )
        .await;

    match result {
        Err(WorkflowError::Unauthorized(message)) => {
            assert!(message.contains("HEAD_OF_DEPARTMENT"));
        }
        other => panic!("expected Unauthorized, got {:?}", other),
    }
    assert_eq!(
        h.store.get(SyllabusId(42)).unwrap().current_status,
        SyllabusStatus::PendingReview
    );
    assert!(h.store.history_rows().is_empty());
    assert!(h.audit.rows().is_empty());
}

#[tokio::test]
async fn approval_in_wrong_source_state_changes_nothing() {
    let h = harness();
    seed_department(&h);
    h.store
        .insert_syllabus(make_syllabus(42, 10, 1, SyllabusStatus::Draft));

    let result = h
        .engine
        .execute(
            TransitionKind::HodApprove,
            SyllabusId(42),
            &username("hod.cs"),
            None,
            RequestContext::default(),
        )
        .await;

    match result {
        Err(WorkflowError::InvalidState { required, actual }) => {
            assert_eq!(required, SyllabusStatus::PendingReview);
            assert_eq!(actual, SyllabusStatus::Draft);
        }
        other => panic!("expected InvalidState, got {:?}", other),
    }
    assert_eq!(
        h.store.get(SyllabusId(42)).unwrap().current_status,
        SyllabusStatus::Draft
    );
    assert!(h.store.history_rows().is_empty());
}

#[tokio::test]
async fn rejection_round_trip_restores_status_but_not_ledger() {
    let h = harness();
    seed_department(&h);
    h.store
        .insert_syllabus(make_syllabus(42, 10, 1, SyllabusStatus::Draft));

    h.engine
        .execute(
            TransitionKind::Submit,
            SyllabusId(42),
            &username("alice"),
            None,
            RequestContext::default(),
        )
        .await
        .unwrap();
    h.engine
        .execute(
            TransitionKind::HodReject,
            SyllabusId(42),
            &username("hod.cs"),
            Some("needs work".to_string()),
            RequestContext::default(),
        )
        .await
        .unwrap();

    let stored = h.store.get(SyllabusId(42)).unwrap();
    assert_eq!(stored.current_status, SyllabusStatus::Draft);

    let history = h.store.history_rows();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].action, WorkflowAction::Submit);
    assert_eq!(history[1].action, WorkflowAction::Reject);
    assert_eq!(history[1].step.name, "Draft");
    assert_eq!(history[1].comment.as_deref(), Some("needs work"));
}

#[tokio::test]
async fn full_pipeline_publishes_and_stamps_published_at() {
    let h = harness();
    seed_department(&h);
    h.store
        .insert_syllabus(make_syllabus(42, 10, 1, SyllabusStatus::Draft));

    let actor_by_kind = [
        (TransitionKind::Submit, "alice"),
        (TransitionKind::HodApprove, "hod.cs"),
        (TransitionKind::AaApprove, "aa.one"),
    ];
    for (kind, actor) in actor_by_kind {
        h.engine
            .execute(kind, SyllabusId(42), &username(actor), None, RequestContext::default())
            .await
            .unwrap();
        // only the publish transition may stamp the timestamp
        assert!(h.store.get(SyllabusId(42)).unwrap().published_at.is_none());
    }

    let summary = h
        .engine
        .execute(
            TransitionKind::PrincipalApprove,
            SyllabusId(42),
            &username("principal"),
            None,
            RequestContext::default(),
        )
        .await
        .unwrap();
    assert_eq!(summary.action, WorkflowAction::Publish);

    let stored = h.store.get(SyllabusId(42)).unwrap();
    assert_eq!(stored.current_status, SyllabusStatus::Published);
    assert!(stored.published_at.is_some());
    assert_eq!(h.store.history_rows().len(), 4);
}

#[tokio::test]
async fn lost_race_surfaces_as_concurrent_modification() {
    let h = harness();
    seed_department(&h);
    h.store
        .insert_syllabus(make_syllabus(42, 10, 1, SyllabusStatus::Draft));
    h.store.conflict_on_next_commit();

    let result = h
        .engine
        .execute(
            TransitionKind::Submit,
            SyllabusId(42),
            &username("alice"),
            None,
            RequestContext::default(),
        )
        .await;

    assert!(matches!(
        result,
        Err(WorkflowError::ConcurrentModification(SyllabusId(42)))
    ));
    assert_eq!(
        h.store.get(SyllabusId(42)).unwrap().current_status,
        SyllabusStatus::Draft
    );
    assert!(h.store.history_rows().is_empty());
}

#[tokio::test]
async fn audit_outage_does_not_abort_the_transition() {
    let h = harness();
    seed_department(&h);
    h.store
        .insert_syllabus(make_syllabus(42, 10, 1, SyllabusStatus::Draft));
    h.audit.fail_inserts(true);

    let result = h
        .engine
        .execute(
            TransitionKind::Submit,
            SyllabusId(42),
            &username("alice"),
            None,
            RequestContext::default(),
        )
        .await;

    assert!(result.is_ok());
    assert_eq!(
        h.store.get(SyllabusId(42)).unwrap().current_status,
        SyllabusStatus::PendingReview
    );
    assert!(h.audit.rows().is_empty());
    // the notification path is unaffected
    assert_eq!(h.notifications.rows().len(), 1);
}

#[tokio::test]
async fn notification_outage_does_not_abort_the_transition() {
    let h = harness();
    seed_department(&h);
    h.store
        .insert_syllabus(make_syllabus(42, 10, 1, SyllabusStatus::Draft));
    h.notifications.fail_inserts(true);

    let result = h
        .engine
        .execute(
            TransitionKind::Submit,
            SyllabusId(42),
            &username("alice"),
            None,
            RequestContext::default(),
        )
        .await;

    assert!(result.is_ok());
    assert_eq!(h.store.history_rows().len(), 1);
    assert!(h.notifications.rows().is_empty());
}

#[tokio::test]
async fn unknown_syllabus_and_unknown_user_fail_fast() {
    let h = harness();
    seed_department(&h);

    let missing = h
        .engine
        .execute(
            TransitionKind::Submit,
            SyllabusId(999),
            &username("alice"),
            None,
            RequestContext::default(),
        )
        .await;
    assert!(matches!(
        missing,
        Err(WorkflowError::SyllabusNotFound(SyllabusId(999)))
    ));

    h.store
        .insert_syllabus(make_syllabus(42, 10, 1, SyllabusStatus::Draft));
    let ghost = h
        .engine
        .execute(
            TransitionKind::Submit,
            SyllabusId(42),
            &username("ghost"),
            None,
            RequestContext::default(),
        )
        .await;
    assert!(matches!(ghost, Err(WorkflowError::UserNotFound(_))));
}

#[tokio::test]
async fn by_status_projection_depends_on_role() {
    let h = harness();
    seed_department(&h);
    h.directory.add_user(make_user(8, "admin", &[Role::Admin]));
    h.directory.add_user(make_user(9, "student", &[Role::Student]));
    h.directory
        .add_course(make_course(11, "MA201", "Linear Algebra", 6, None));
    h.store
        .insert_syllabus(make_syllabus(42, 10, 1, SyllabusStatus::PendingReview));
    h.store
        .insert_syllabus(make_syllabus(43, 11, 3, SyllabusStatus::PendingReview));

    let all = h
        .engine
        .syllabi_by_status(SyllabusStatus::PendingReview, &username("admin"))
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let hod_view = h
        .engine
        .syllabi_by_status(SyllabusStatus::PendingReview, &username("hod.cs"))
        .await
        .unwrap();
    assert_eq!(hod_view.len(), 1);
    assert_eq!(hod_view[0].id, SyllabusId(42));

    let lecturer_view = h
        .engine
        .syllabi_by_status(SyllabusStatus::PendingReview, &username("alice"))
        .await
        .unwrap();
    assert_eq!(lecturer_view.len(), 1);
    assert_eq!(lecturer_view[0].id, SyllabusId(42));

    let student_view = h
        .engine
        .syllabi_by_status(SyllabusStatus::PendingReview, &username("student"))
        .await
        .unwrap();
    assert!(student_view.is_empty());
}

#[tokio::test]
async fn history_reads_newest_first() {
    let h = harness();
    seed_department(&h);
    h.store
        .insert_syllabus(make_syllabus(42, 10, 1, SyllabusStatus::Draft));

    h.engine
        .execute(
            TransitionKind::Submit,
            SyllabusId(42),
            &username("alice"),
            None,
            RequestContext::default(),
        )
        .await
        .unwrap();
    h.engine
        .execute(
            TransitionKind::HodApprove,
            SyllabusId(42),
            &username("hod.cs"),
            None,
            RequestContext::default(),
        )
        .await
        .unwrap();

    let history = h.engine.history(SyllabusId(42)).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].action, WorkflowAction::Approve);
    assert_eq!(history[0].step.name, "Pending Approval");
    assert_eq!(history[1].action, WorkflowAction::Submit);
}

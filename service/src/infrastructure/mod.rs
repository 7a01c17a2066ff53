use syllabus_common::database::Database;

use crate::domain::AppState;
use crate::domain::audit::AuditRecorder;
use crate::domain::notification::NotificationCenter;
use crate::domain::workflow::WorkflowEngine;
use crate::infrastructure::persistence::{
    PostgresAuditStore, PostgresDirectory, PostgresNotificationStore, PostgresSyllabusStore,
};

pub mod http;
pub mod persistence;
pub mod settings;

#[derive(Clone)]
pub struct AppStateImpl {
    workflow: WorkflowEngine<
        PostgresSyllabusStore,
        PostgresDirectory,
        PostgresAuditStore,
        PostgresNotificationStore,
    >,
    audit: AuditRecorder<PostgresDirectory, PostgresAuditStore>,
    notifications: NotificationCenter<PostgresDirectory, PostgresNotificationStore>,
}

impl AppStateImpl {
    pub fn new(database: &'static Database) -> Self {
        let directory = PostgresDirectory::new(database);
        let audit = AuditRecorder::new(directory.clone(), PostgresAuditStore::new(database));
        let notifications =
            NotificationCenter::new(directory.clone(), PostgresNotificationStore::new(database));
        let workflow = WorkflowEngine::new(
            PostgresSyllabusStore::new(database),
            directory,
            audit.clone(),
            notifications.clone(),
        );

        Self {
            workflow,
            audit,
            notifications,
        }
    }
}

impl AppState for AppStateImpl {
    type S = PostgresSyllabusStore;
    type D = PostgresDirectory;
    type A = PostgresAuditStore;
    type N = PostgresNotificationStore;

    fn workflow(&self) -> &WorkflowEngine<Self::S, Self::D, Self::A, Self::N> {
        &self.workflow
    }

    fn audit(&self) -> &AuditRecorder<Self::D, Self::A> {
        &self.audit
    }

    fn notifications(&self) -> &NotificationCenter<Self::D, Self::N> {
        &self.notifications
    }
}

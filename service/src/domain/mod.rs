pub mod audit;
pub mod notification;
pub mod ports;
pub mod workflow;

#[cfg(test)]
pub mod support;

use crate::domain::audit::AuditRecorder;
use crate::domain::notification::NotificationCenter;
use crate::domain::ports::{AuditStore, Directory, NotificationStore, SyllabusStore};
use crate::domain::workflow::WorkflowEngine;

/// The global application state shared between all request handlers.
pub trait AppState: Clone + Send + Sync + 'static {
    type S: SyllabusStore;
    type D: Directory + Clone;
    type A: AuditStore;
    type N: NotificationStore;

    fn workflow(&self) -> &WorkflowEngine<Self::S, Self::D, Self::A, Self::N>;
    fn audit(&self) -> &AuditRecorder<Self::D, Self::A>;
    fn notifications(&self) -> &NotificationCenter<Self::D, Self::N>;
}

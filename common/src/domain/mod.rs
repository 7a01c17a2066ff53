pub mod audit;
pub mod identity;
pub mod notification;
pub mod syllabus;
pub mod workflow;

pub use audit::{AuditAction, AuditLogId, AuditRecord, AuditStatistics, NewAuditRecord, RequestContext};
pub use identity::{CourseId, CourseInfo, DepartmentId, Role, UserAccount, UserId, Username};
pub use notification::{NewNotification, Notification, NotificationId, NotificationKind, NotificationStats};
pub use syllabus::{AcademicYear, Syllabus, SyllabusId, SyllabusStatus};
pub use workflow::{HistoryId, StepId, WorkflowAction, WorkflowHistoryEntry, WorkflowStep, step_order};

use crate::domain::ports::StoreError;

pub mod audit;
pub mod directory;
pub mod notification;
pub mod syllabus;

pub use audit::PostgresAuditStore;
pub use directory::PostgresDirectory;
pub use notification::PostgresNotificationStore;
pub use syllabus::PostgresSyllabusStore;

pub(crate) fn db_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(cause) if cause.is_unique_violation() => {
            StoreError::UniqueViolation(cause.to_string())
        }
        other => StoreError::DatabaseError(other.to_string()),
    }
}

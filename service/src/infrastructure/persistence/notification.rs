use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::PgRow;

use syllabus_common::database::Database;
use syllabus_common::{
    NewNotification, Notification, NotificationId, NotificationKind, SyllabusId, UserId,
};

use crate::domain::ports::{NotificationStore, Page, StoreError};
use crate::infrastructure::persistence::db_error;

const NOTIFICATION_SELECT: &str = "SELECT notification_id, user_id, syllabus_id, type, title, \
     message, is_read, read_at, action_url, triggered_by, created_at \
     FROM notifications";

#[derive(Clone)]
pub struct PostgresNotificationStore {
    database: &'static Database,
}

impl PostgresNotificationStore {
    pub fn new(database: &'static Database) -> Self {
        Self { database }
    }
}

impl NotificationStore for PostgresNotificationStore {
    async fn insert(&self, notification: NewNotification) -> Result<NotificationId, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO notifications \
             (user_id, syllabus_id, type, title, message, is_read, action_url, triggered_by, created_at) \
             VALUES ($1, $2, $3, $4, $5, FALSE, $6, $7, $8) \
             RETURNING notification_id",
        )
        .bind(notification.recipient.0)
        .bind(notification.syllabus_id.map(|id| id.0))
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.action_url)
        .bind(&notification.triggered_by)
        .bind(Utc::now())
        .fetch_one(self.database.pool())
        .await
        .map_err(db_error)?;

        Ok(NotificationId(id))
    }

    async fn fetch(&self, id: NotificationId) -> Result<Option<Notification>, StoreError> {
        let row = sqlx::query(&format!(
            "{} WHERE notification_id = $1",
            NOTIFICATION_SELECT
        ))
        .bind(id.0)
        .fetch_optional(self.database.pool())
        .await
        .map_err(db_error)?;

        row.map(|row| row_to_notification(&row)).transpose()
    }

    async fn list_for(
        &self,
        recipient: UserId,
        page: Page,
    ) -> Result<Vec<Notification>, StoreError> {
        let rows = sqlx::query(&format!(
            "{} WHERE user_id = $1 ORDER BY created_at DESC, notification_id DESC \
             LIMIT $2 OFFSET $3",
            NOTIFICATION_SELECT
        ))
        .bind(recipient.0)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.database.pool())
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_notification).collect()
    }

    async fn unread_for(&self, recipient: UserId) -> Result<Vec<Notification>, StoreError> {
        let rows = sqlx::query(&format!(
            "{} WHERE user_id = $1 AND is_read = FALSE \
             ORDER BY created_at DESC, notification_id DESC",
            NOTIFICATION_SELECT
        ))
        .bind(recipient.0)
        .fetch_all(self.database.pool())
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_notification).collect()
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        read_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let updated = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = $1 WHERE notification_id = $2",
        )
        .bind(read_at)
        .bind(id.0)
        .execute(self.database.pool())
        .await
        .map_err(db_error)?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn mark_all_read(
        &self,
        recipient: UserId,
        read_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let updated = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = $1 \
             WHERE user_id = $2 AND is_read = FALSE",
        )
        .bind(read_at)
        .bind(recipient.0)
        .execute(self.database.pool())
        .await
        .map_err(db_error)?;

        Ok(updated.rows_affected())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let deleted = sqlx::query("DELETE FROM notifications WHERE created_at < $1")
            .bind(cutoff)
            .execute(self.database.pool())
            .await
            .map_err(db_error)?;

        Ok(deleted.rows_affected())
    }
}

fn row_to_notification(row: &PgRow) -> Result<Notification, StoreError> {
    let kind: String = row.try_get("type").map_err(db_error)?;
    let kind = NotificationKind::parse(&kind).ok_or_else(|| {
        StoreError::DatabaseError(format!("unknown notification type in store: {}", kind))
    })?;

    Ok(Notification {
        id: NotificationId(row.try_get("notification_id").map_err(db_error)?),
        recipient: UserId(row.try_get("user_id").map_err(db_error)?),
        syllabus_id: row
            .try_get::<Option<i64>, _>("syllabus_id")
            .map_err(db_error)?
            .map(SyllabusId),
        kind,
        title: row.try_get("title").map_err(db_error)?,
        message: row.try_get("message").map_err(db_error)?,
        is_read: row.try_get("is_read").map_err(db_error)?,
        read_at: row.try_get("read_at").map_err(db_error)?,
        action_url: row.try_get("action_url").map_err(db_error)?,
        triggered_by: row.try_get("triggered_by").map_err(db_error)?,
        created_at: row.try_get("created_at").map_err(db_error)?,
    })
}

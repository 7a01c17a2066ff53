use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::PgRow;

use syllabus_common::database::Database;
use syllabus_common::{
    AuditAction, AuditLogId, AuditRecord, AuditStatistics, NewAuditRecord, SyllabusId,
};

use crate::domain::ports::{AuditStore, Page, StoreError};
use crate::infrastructure::persistence::db_error;

const AUDIT_SELECT: &str = "SELECT a.id, a.syllabus_id, a.action_type, a.performed_by, \
     a.performed_by_role, a.old_status, a.new_status, a.comments, a.changed_fields, \
     a.ip_address, a.user_agent, a.recorded_at, a.additional_data \
     FROM syllabus_audit_logs a";

#[derive(Clone)]
pub struct PostgresAuditStore {
    database: &'static Database,
}

impl PostgresAuditStore {
    pub fn new(database: &'static Database) -> Self {
        Self { database }
    }

    async fn fetch_with(&self, clause: &str, bind: Option<&str>) -> Result<Vec<AuditRecord>, StoreError> {
        let sql = format!("{} {} ORDER BY a.recorded_at DESC", AUDIT_SELECT, clause);
        let mut query = sqlx::query(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query
            .fetch_all(self.database.pool())
            .await
            .map_err(db_error)?;
        rows.iter().map(row_to_record).collect()
    }
}

impl AuditStore for PostgresAuditStore {
    async fn insert(&self, record: NewAuditRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO syllabus_audit_logs \
             (syllabus_id, action_type, performed_by, performed_by_role, old_status, \
              new_status, comments, changed_fields, ip_address, user_agent, recorded_at, \
              additional_data) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(record.syllabus_id.map(|id| id.0))
        .bind(&record.action_type)
        .bind(&record.performed_by)
        .bind(&record.performed_by_role)
        .bind(&record.old_status)
        .bind(&record.new_status)
        .bind(&record.comments)
        .bind(&record.changed_fields)
        .bind(&record.ip_address)
        .bind(&record.user_agent)
        .bind(record.recorded_at)
        .bind(&record.additional_data)
        .execute(self.database.pool())
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn list(&self, page: Page) -> Result<Vec<AuditRecord>, StoreError> {
        let sql = format!(
            "{} ORDER BY a.recorded_at DESC LIMIT $1 OFFSET $2",
            AUDIT_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.database.pool())
            .await
            .map_err(db_error)?;
        rows.iter().map(row_to_record).collect()
    }

    async fn by_syllabus(&self, id: SyllabusId) -> Result<Vec<AuditRecord>, StoreError> {
        let sql = format!(
            "{} WHERE a.syllabus_id = $1 ORDER BY a.recorded_at DESC",
            AUDIT_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(id.0)
            .fetch_all(self.database.pool())
            .await
            .map_err(db_error)?;
        rows.iter().map(row_to_record).collect()
    }

    async fn by_actor(&self, username: &str) -> Result<Vec<AuditRecord>, StoreError> {
        self.fetch_with("WHERE a.performed_by = $1", Some(username)).await
    }

    async fn by_action(&self, action: &AuditAction) -> Result<Vec<AuditRecord>, StoreError> {
        self.fetch_with("WHERE a.action_type = $1", Some(action.as_str()))
            .await
    }

    async fn in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AuditRecord>, StoreError> {
        let sql = format!(
            "{} WHERE a.recorded_at BETWEEN $1 AND $2 ORDER BY a.recorded_at DESC",
            AUDIT_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(self.database.pool())
            .await
            .map_err(db_error)?;
        rows.iter().map(row_to_record).collect()
    }

    async fn by_academic_year(&self, year: &str) -> Result<Vec<AuditRecord>, StoreError> {
        let sql = format!(
            "{} JOIN syllabus s ON s.syllabus_id = a.syllabus_id \
             WHERE s.academic_year = $1 ORDER BY a.recorded_at DESC",
            AUDIT_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(year)
            .fetch_all(self.database.pool())
            .await
            .map_err(db_error)?;
        rows.iter().map(row_to_record).collect()
    }

    async fn since(&self, cutoff: DateTime<Utc>) -> Result<Vec<AuditRecord>, StoreError> {
        let sql = format!(
            "{} WHERE a.recorded_at >= $1 ORDER BY a.recorded_at DESC",
            AUDIT_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(cutoff)
            .fetch_all(self.database.pool())
            .await
            .map_err(db_error)?;
        rows.iter().map(row_to_record).collect()
    }

    async fn statistics(&self, now: DateTime<Utc>) -> Result<AuditStatistics, StoreError> {
        let total_logs =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM syllabus_audit_logs")
                .fetch_one(self.database.pool())
                .await
                .map_err(db_error)?;

        let grouped = sqlx::query_as::<_, (String, i64)>(
            "SELECT action_type, COUNT(*) FROM syllabus_audit_logs GROUP BY action_type",
        )
        .fetch_all(self.database.pool())
        .await
        .map_err(db_error)?;
        let count_by_action_type: HashMap<String, i64> = grouped.into_iter().collect();

        let count_since = |cutoff: DateTime<Utc>| async move {
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM syllabus_audit_logs WHERE recorded_at >= $1",
            )
            .bind(cutoff)
            .fetch_one(self.database.pool())
            .await
            .map_err(db_error)
        };

        Ok(AuditStatistics {
            total_logs,
            count_by_action_type,
            logs_last_24_hours: count_since(now - chrono::Duration::hours(24)).await?,
            logs_last_7_days: count_since(now - chrono::Duration::days(7)).await?,
            logs_last_30_days: count_since(now - chrono::Duration::days(30)).await?,
        })
    }
}

fn row_to_record(row: &PgRow) -> Result<AuditRecord, StoreError> {
    let action_type: String = row.try_get("action_type").map_err(db_error)?;

    Ok(AuditRecord {
        id: AuditLogId(row.try_get("id").map_err(db_error)?),
        syllabus_id: row
            .try_get::<Option<i64>, _>("syllabus_id")
            .map_err(db_error)?
            .map(SyllabusId),
        action: AuditAction::parse(&action_type),
        performed_by: row.try_get("performed_by").map_err(db_error)?,
        performed_by_role: row.try_get("performed_by_role").map_err(db_error)?,
        old_status: row.try_get("old_status").map_err(db_error)?,
        new_status: row.try_get("new_status").map_err(db_error)?,
        comments: row.try_get("comments").map_err(db_error)?,
        changed_fields: row.try_get("changed_fields").map_err(db_error)?,
        ip_address: row.try_get("ip_address").map_err(db_error)?,
        user_agent: row.try_get("user_agent").map_err(db_error)?,
        recorded_at: row.try_get("recorded_at").map_err(db_error)?,
        additional_data: row.try_get("additional_data").map_err(db_error)?,
    })
}

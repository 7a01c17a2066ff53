use sqlx::Row;
use sqlx::postgres::PgRow;

use syllabus_common::database::Database;
use syllabus_common::{
    AcademicYear, CourseId, HistoryId, StepId, Syllabus, SyllabusId, SyllabusStatus, UserId,
    WorkflowAction, WorkflowHistoryEntry, WorkflowStep, step_order,
};

use crate::domain::ports::{StoreError, SyllabusStore, TransitionCommit};
use crate::infrastructure::persistence::db_error;

const SYLLABUS_SELECT: &str = "SELECT syllabus_id, course_id, lecturer_id, academic_year, \
     version_no, is_latest_version, previous_version_id, version_notes, description, \
     current_status, created_at, updated_at, published_at, archived_at, lock_version \
     FROM syllabus";

#[derive(Clone)]
pub struct PostgresSyllabusStore {
    database: &'static Database,
}

impl PostgresSyllabusStore {
    pub fn new(database: &'static Database) -> Self {
        Self { database }
    }
}

impl SyllabusStore for PostgresSyllabusStore {
    async fn fetch(&self, id: SyllabusId) -> Result<Option<Syllabus>, StoreError> {
        let row = sqlx::query(&format!("{} WHERE syllabus_id = $1", SYLLABUS_SELECT))
            .bind(id.0)
            .fetch_optional(self.database.pool())
            .await
            .map_err(db_error)?;

        row.map(|row| row_to_syllabus(&row)).transpose()
    }

    async fn list_by_status(
        &self,
        status: SyllabusStatus,
    ) -> Result<Vec<Syllabus>, StoreError> {
        let rows = sqlx::query(&format!(
            "{} WHERE current_status = $1 ORDER BY syllabus_id",
            SYLLABUS_SELECT
        ))
        .bind(status.as_str())
        .fetch_all(self.database.pool())
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_syllabus).collect()
    }

    async fn commit_transition(&self, commit: TransitionCommit) -> Result<(), StoreError> {
        let mut tx = self.database.pool().begin().await.map_err(db_error)?;

        let updated = sqlx::query(
            "UPDATE syllabus \
             SET current_status = $1, updated_at = $2, \
                 published_at = COALESCE($3, published_at), \
                 lock_version = lock_version + 1 \
             WHERE syllabus_id = $4 AND lock_version = $5",
        )
        .bind(commit.new_status.as_str())
        .bind(commit.action_time)
        .bind(commit.published_at)
        .bind(commit.syllabus_id.0)
        .bind(commit.expected_version)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        if updated.rows_affected() == 0 {
            // disambiguate a lost race from a vanished row
            let exists = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM syllabus WHERE syllabus_id = $1",
            )
            .bind(commit.syllabus_id.0)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error)?;

            return Err(if exists > 0 {
                StoreError::VersionConflict
            } else {
                StoreError::NotFound
            });
        }

        // checkpoint rows are created lazily, keyed by name
        let step_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO workflow_step (step_name, step_order) VALUES ($1, $2) \
             ON CONFLICT (step_name) DO UPDATE SET step_order = EXCLUDED.step_order \
             RETURNING step_id",
        )
        .bind(commit.step_name)
        .bind(step_order(commit.step_name))
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        sqlx::query(
            "INSERT INTO syllabus_workflow_history \
             (syllabus_id, step_id, action_by, action, comment, action_time) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(commit.syllabus_id.0)
        .bind(step_id)
        .bind(commit.action_by.0)
        .bind(commit.action.as_str())
        .bind(&commit.comment)
        .bind(commit.action_time)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)
    }

    async fn history(&self, id: SyllabusId) -> Result<Vec<WorkflowHistoryEntry>, StoreError> {
        let rows = sqlx::query(
            "SELECT h.history_id, h.syllabus_id, h.action_by, h.action, h.comment, \
                    h.action_time, s.step_id, s.step_name, s.step_order, u.username \
             FROM syllabus_workflow_history h \
             JOIN workflow_step s ON s.step_id = h.step_id \
             JOIN users u ON u.user_id = h.action_by \
             WHERE h.syllabus_id = $1 \
             ORDER BY h.action_time DESC, h.history_id DESC",
        )
        .bind(id.0)
        .fetch_all(self.database.pool())
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_history_entry).collect()
    }
}

fn row_to_syllabus(row: &PgRow) -> Result<Syllabus, StoreError> {
    let status: String = row.try_get("current_status").map_err(db_error)?;
    let current_status = SyllabusStatus::parse(&status).ok_or_else(|| {
        StoreError::DatabaseError(format!("unknown syllabus status in store: {}", status))
    })?;

    let academic_year: String = row.try_get("academic_year").map_err(db_error)?;
    let academic_year = AcademicYear::try_new(academic_year)
        .map_err(|err| StoreError::DatabaseError(format!("bad academic year in store: {}", err)))?;

    Ok(Syllabus {
        id: SyllabusId(row.try_get("syllabus_id").map_err(db_error)?),
        course_id: CourseId(row.try_get("course_id").map_err(db_error)?),
        lecturer_id: UserId(row.try_get("lecturer_id").map_err(db_error)?),
        academic_year,
        version_no: row.try_get("version_no").map_err(db_error)?,
        is_latest_version: row.try_get("is_latest_version").map_err(db_error)?,
        previous_version_id: row
            .try_get::<Option<i64>, _>("previous_version_id")
            .map_err(db_error)?
            .map(SyllabusId),
        version_notes: row.try_get("version_notes").map_err(db_error)?,
        description: row.try_get("description").map_err(db_error)?,
        current_status,
        created_at: row.try_get("created_at").map_err(db_error)?,
        updated_at: row.try_get("updated_at").map_err(db_error)?,
        published_at: row.try_get("published_at").map_err(db_error)?,
        archived_at: row.try_get("archived_at").map_err(db_error)?,
        lock_version: row.try_get("lock_version").map_err(db_error)?,
    })
}

fn row_to_history_entry(row: &PgRow) -> Result<WorkflowHistoryEntry, StoreError> {
    let action: String = row.try_get("action").map_err(db_error)?;
    let action = WorkflowAction::parse(&action).ok_or_else(|| {
        StoreError::DatabaseError(format!("unknown workflow action in store: {}", action))
    })?;

    Ok(WorkflowHistoryEntry {
        id: HistoryId(row.try_get("history_id").map_err(db_error)?),
        syllabus_id: SyllabusId(row.try_get("syllabus_id").map_err(db_error)?),
        step: WorkflowStep {
            id: StepId(row.try_get("step_id").map_err(db_error)?),
            name: row.try_get("step_name").map_err(db_error)?,
            order: row.try_get("step_order").map_err(db_error)?,
        },
        action_by: UserId(row.try_get("action_by").map_err(db_error)?),
        action_by_username: row.try_get("username").map_err(db_error)?,
        action,
        comment: row.try_get("comment").map_err(db_error)?,
        action_time: row.try_get("action_time").map_err(db_error)?,
    })
}

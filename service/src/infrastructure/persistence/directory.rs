use std::collections::HashSet;

use sqlx::Row;
use sqlx::postgres::PgRow;

use syllabus_common::database::Database;
use syllabus_common::{
    CourseId, CourseInfo, DepartmentId, Role, UserAccount, UserId, Username,
};

use crate::domain::ports::{Directory, StoreError};
use crate::infrastructure::persistence::db_error;

const USER_SELECT: &str = "SELECT u.user_id, u.username, u.full_name, u.email, u.department_id, \
     COALESCE(ARRAY_AGG(r.role_name) FILTER (WHERE r.role_name IS NOT NULL), '{}') AS role_names \
     FROM users u \
     LEFT JOIN user_roles ur ON ur.user_id = u.user_id \
     LEFT JOIN roles r ON r.role_id = ur.role_id";

const COURSE_SELECT: &str = "SELECT c.course_id, c.course_code, c.course_name, c.department_id, \
     d.dept_name, d.head_of_department_id \
     FROM courses c \
     JOIN departments d ON d.department_id = c.department_id";

#[derive(Clone)]
pub struct PostgresDirectory {
    database: &'static Database,
}

impl PostgresDirectory {
    pub fn new(database: &'static Database) -> Self {
        Self { database }
    }
}

impl Directory for PostgresDirectory {
    async fn resolve_user(&self, username: &Username) -> Result<Option<UserAccount>, StoreError> {
        let row = sqlx::query(&format!(
            "{} WHERE u.username = $1 GROUP BY u.user_id",
            USER_SELECT
        ))
        .bind(username.as_ref())
        .fetch_optional(self.database.pool())
        .await
        .map_err(db_error)?;

        row.map(|row| row_to_user(&row)).transpose()
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<UserAccount>, StoreError> {
        let row = sqlx::query(&format!(
            "{} WHERE u.user_id = $1 GROUP BY u.user_id",
            USER_SELECT
        ))
        .bind(id.0)
        .fetch_optional(self.database.pool())
        .await
        .map_err(db_error)?;

        row.map(|row| row_to_user(&row)).transpose()
    }

    async fn users_with_role(&self, role: Role) -> Result<Vec<UserAccount>, StoreError> {
        let rows = sqlx::query(&format!(
            "{} WHERE u.user_id IN (\
                SELECT ur2.user_id FROM user_roles ur2 \
                JOIN roles r2 ON r2.role_id = ur2.role_id \
                WHERE r2.role_name = $1) \
             GROUP BY u.user_id ORDER BY u.user_id",
            USER_SELECT
        ))
        .bind(role.as_str())
        .fetch_all(self.database.pool())
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_user).collect()
    }

    async fn course(&self, id: CourseId) -> Result<Option<CourseInfo>, StoreError> {
        let row = sqlx::query(&format!("{} WHERE c.course_id = $1", COURSE_SELECT))
            .bind(id.0)
            .fetch_optional(self.database.pool())
            .await
            .map_err(db_error)?;

        row.map(|row| row_to_course(&row)).transpose()
    }
}

fn row_to_user(row: &PgRow) -> Result<UserAccount, StoreError> {
    let username: String = row.try_get("username").map_err(db_error)?;
    let username = Username::try_new(username)
        .map_err(|err| StoreError::DatabaseError(format!("bad username in store: {}", err)))?;

    let role_names: Vec<String> = row.try_get("role_names").map_err(db_error)?;
    let roles: HashSet<Role> = role_names
        .iter()
        .filter_map(|name| {
            let role = Role::parse(name);
            if role.is_none() {
                tracing::warn!(role = %name, "ignoring unknown role name from directory");
            }
            role
        })
        .collect();

    Ok(UserAccount {
        id: UserId(row.try_get("user_id").map_err(db_error)?),
        username,
        full_name: row.try_get("full_name").map_err(db_error)?,
        email: row.try_get("email").map_err(db_error)?,
        department_id: row
            .try_get::<Option<i64>, _>("department_id")
            .map_err(db_error)?
            .map(DepartmentId),
        roles,
    })
}

fn row_to_course(row: &PgRow) -> Result<CourseInfo, StoreError> {
    Ok(CourseInfo {
        id: CourseId(row.try_get("course_id").map_err(db_error)?),
        code: row.try_get("course_code").map_err(db_error)?,
        name: row.try_get("course_name").map_err(db_error)?,
        department_id: DepartmentId(row.try_get("department_id").map_err(db_error)?),
        department_name: row.try_get("dept_name").map_err(db_error)?,
        head_of_department: row
            .try_get::<Option<i64>, _>("head_of_department_id")
            .map_err(db_error)?
            .map(UserId),
    })
}

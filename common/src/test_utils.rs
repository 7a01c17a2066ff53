use std::collections::HashSet;

use chrono::{TimeZone, Utc};

use crate::domain::{
    AcademicYear, CourseId, CourseInfo, DepartmentId, Role, Syllabus, SyllabusId, SyllabusStatus,
    UserAccount, UserId, Username,
};

/// Fixture builders for the workflow domain.
///
/// Public so that other crates can reuse them for their own tests.
pub fn make_user(id: i64, username: &str, roles: &[Role]) -> UserAccount {
    UserAccount {
        id: UserId(id),
        username: Username::try_new(username).unwrap(),
        full_name: format!("Test {}", username),
        email: format!("{}@university.example", username),
        department_id: None,
        roles: HashSet::from_iter(roles.iter().copied()),
    }
}

pub fn make_user_in_department(
    id: i64,
    username: &str,
    roles: &[Role],
    department: i64,
) -> UserAccount {
    UserAccount {
        department_id: Some(DepartmentId(department)),
        ..make_user(id, username, roles)
    }
}

pub fn make_course(
    id: i64,
    code: &str,
    name: &str,
    department: i64,
    head_of_department: Option<i64>,
) -> CourseInfo {
    CourseInfo {
        id: CourseId(id),
        code: code.to_string(),
        name: name.to_string(),
        department_id: DepartmentId(department),
        department_name: format!("Department {}", department),
        head_of_department: head_of_department.map(UserId),
    }
}

pub fn make_syllabus(
    id: i64,
    course: i64,
    lecturer: i64,
    status: SyllabusStatus,
) -> Syllabus {
    Syllabus {
        id: SyllabusId(id),
        course_id: CourseId(course),
        lecturer_id: UserId(lecturer),
        academic_year: AcademicYear::try_new("2024-2025").unwrap(),
        version_no: 1,
        is_latest_version: true,
        previous_version_id: None,
        version_notes: None,
        description: None,
        current_status: status,
        created_at: Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap(),
        updated_at: None,
        published_at: None,
        archived_at: None,
        lock_version: 0,
    }
}

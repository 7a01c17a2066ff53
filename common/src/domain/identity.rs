use std::collections::HashSet;
use std::sync::LazyLock;

use nutype::nutype;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Wrapper to prevent ID confusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Wrapper to prevent ID confusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepartmentId(pub i64);

impl From<i64> for DepartmentId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Wrapper to prevent ID confusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CourseId(pub i64);

impl From<i64> for CourseId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Za-z0-9._@-]{1,100}$").unwrap());

#[nutype(
    sanitize(trim),
    validate(not_empty, regex = USERNAME_REGEX),
    derive(
        Clone,
        Debug,
        Display,
        FromStr,
        AsRef,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Serialize,
        Deserialize
    )
)]
pub struct Username(String);

/// The roles a user may hold. Membership is a set: a head of department
/// is usually also a lecturer for their own courses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Lecturer,
    HeadOfDepartment,
    AcademicAffairs,
    Principal,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Lecturer => "LECTURER",
            Role::HeadOfDepartment => "HEAD_OF_DEPARTMENT",
            Role::AcademicAffairs => "ACADEMIC_AFFAIRS",
            Role::Principal => "PRINCIPAL",
            Role::Student => "STUDENT",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "ADMIN" => Some(Role::Admin),
            "LECTURER" => Some(Role::Lecturer),
            "HEAD_OF_DEPARTMENT" => Some(Role::HeadOfDepartment),
            "ACADEMIC_AFFAIRS" => Some(Role::AcademicAffairs),
            "PRINCIPAL" => Some(Role::Principal),
            "STUDENT" => Some(Role::Student),
            _ => None,
        }
    }

    /// The role reported as a single label, e.g. in the audit ledger.
    /// Highest responsibility wins when a user holds several.
    pub fn primary(roles: &HashSet<Role>) -> Option<Role> {
        [
            Role::Admin,
            Role::Principal,
            Role::AcademicAffairs,
            Role::HeadOfDepartment,
            Role::Lecturer,
            Role::Student,
        ]
        .into_iter()
        .find(|role| roles.contains(role))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user as the identity directory reports it. Credentials never enter
/// this service; authentication happens at the gateway.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: UserId,
    pub username: Username,
    pub full_name: String,
    pub email: String,
    pub department_id: Option<DepartmentId>,
    pub roles: HashSet<Role>,
}

impl UserAccount {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Course with its owning department, as far as the workflow needs it:
/// notification fan-out and per-department visibility.
#[derive(Debug, Clone)]
pub struct CourseInfo {
    pub id: CourseId,
    pub code: String,
    pub name: String,
    pub department_id: DepartmentId,
    pub department_name: String,
    pub head_of_department: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_round_trip() {
        for role in [
            Role::Admin,
            Role::Lecturer,
            Role::HeadOfDepartment,
            Role::AcademicAffairs,
            Role::Principal,
            Role::Student,
        ] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("REGISTRAR"), None);
    }

    #[test]
    fn primary_role_prefers_highest_responsibility() {
        let roles = HashSet::from([Role::Lecturer, Role::HeadOfDepartment]);
        assert_eq!(Role::primary(&roles), Some(Role::HeadOfDepartment));
        assert_eq!(Role::primary(&HashSet::new()), None);
    }

    #[test]
    fn username_rejects_whitespace_inside() {
        assert!(Username::try_new("alice.nguyen").is_ok());
        assert!(Username::try_new("alice nguyen").is_err());
        assert!(Username::try_new("   ").is_err());
    }
}

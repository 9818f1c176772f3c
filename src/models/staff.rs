use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MealError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    SchoolAdmin,
    Teacher,
    Cook,
    Supervisor,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "System Administrator",
            Role::SchoolAdmin => "School Administrator",
            Role::Teacher => "Teacher",
            Role::Cook => "Cook",
            Role::Supervisor => "Supervisor",
        }
    }

    /// Every role except `Admin` works inside a single school.
    pub fn is_school_scoped(self) -> bool {
        !matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Role {
    type Err = MealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "admin" => Ok(Role::Admin),
            "school_admin" | "principal" => Ok(Role::SchoolAdmin),
            "teacher" => Ok(Role::Teacher),
            "cook" => Ok(Role::Cook),
            "supervisor" => Ok(Role::Supervisor),
            other => Err(MealError::InvalidInput(format!("unknown role '{}'", other))),
        }
    }
}

/// A program user: administrators and school staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    pub username: String,
    pub full_name: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    pub role: Role,

    /// Owning school code; `None` only for administrators.
    #[serde(default)]
    pub school_code: Option<String>,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl StaffMember {
    pub fn new(username: &str, full_name: &str, role: Role, school_code: Option<&str>) -> Self {
        Self {
            username: username.trim().to_string(),
            full_name: full_name.trim().to_string(),
            email: None,
            phone: None,
            role,
            school_code: school_code.map(|c| c.trim().to_string()),
            active: true,
        }
    }

    pub fn key(&self) -> String {
        self.username.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("SCHOOL_ADMIN".parse::<Role>().unwrap(), Role::SchoolAdmin);
        assert_eq!("school-admin".parse::<Role>().unwrap(), Role::SchoolAdmin);
        assert_eq!("cook".parse::<Role>().unwrap(), Role::Cook);
        assert!("janitor".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_matches_wire_names() {
        let json = serde_json::to_string(&Role::SchoolAdmin).unwrap();
        assert_eq!(json, "\"SCHOOL_ADMIN\"");
    }

    #[test]
    fn test_school_scope() {
        assert!(!Role::Admin.is_school_scoped());
        assert!(Role::Teacher.is_school_scoped());
    }
}

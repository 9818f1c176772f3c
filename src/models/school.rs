use serde::{Deserialize, Serialize};

/// A school enrolled in the meal program.
///
/// Schools are identified by their code, compared case-insensitively
/// through [`School::key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub code: String,
    pub name: String,

    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub pincode: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub principal_name: Option<String>,

    #[serde(default)]
    pub total_students: u32,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl School {
    pub fn new(code: &str, name: &str, total_students: u32) -> Self {
        Self {
            code: code.trim().to_string(),
            name: name.trim().to_string(),
            address: None,
            city: None,
            state: None,
            pincode: None,
            phone: None,
            email: None,
            principal_name: None,
            total_students,
            active: true,
        }
    }

    /// Canonical key for lookups (lowercase code).
    pub fn key(&self) -> String {
        self.code.to_lowercase()
    }

    /// Non-empty code and name; a 6-digit pincode when one is given.
    pub fn is_valid(&self) -> bool {
        !self.code.trim().is_empty()
            && !self.name.trim().is_empty()
            && self
                .pincode
                .as_deref()
                .is_none_or(|p| p.len() == 6 && p.chars().all(|c| c.is_ascii_digit()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ignores_case_but_equality_compares_fields() {
        let a = School::new("GPS001", "Government Primary School Pimpri", 340);
        let b = School::new("gps001", "Renamed", 10);
        assert_eq!(a.key(), b.key());
        assert_ne!(a, b);

        let mut c = a.clone();
        c.city = Some("Pimpri".to_string());
        assert_ne!(a, c);
    }

    #[test]
    fn test_is_valid() {
        let mut school = School::new("ZP-DEHU", "Zilla Parishad School Dehu", 420);
        assert!(school.is_valid());

        school.pincode = Some("411 01".to_string());
        assert!(!school.is_valid());

        school.pincode = Some("412109".to_string());
        assert!(school.is_valid());

        assert!(!School::new("", "No code", 0).is_valid());
    }
}

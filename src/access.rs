use crate::error::{MealError, Result};
use crate::models::{MealRecord, Role};

/// Something a user is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ManageSchools,
    ManageStaff,
    ManageHolidays,
    ManageMenus,
    RecordMeals,
    ViewRecords,
    ViewSchoolReports,
    ViewSystemReports,
    PlanMeals,
}

impl Capability {
    pub fn describe(self) -> &'static str {
        match self {
            Capability::ManageSchools => "manage schools",
            Capability::ManageStaff => "manage staff",
            Capability::ManageHolidays => "manage holidays",
            Capability::ManageMenus => "manage menus",
            Capability::RecordMeals => "record meals",
            Capability::ViewRecords => "view meal records",
            Capability::ViewSchoolReports => "view school reports",
            Capability::ViewSystemReports => "view system reports",
            Capability::PlanMeals => "plan meals",
        }
    }
}

/// Capabilities granted to each role.
pub fn capabilities(role: Role) -> &'static [Capability] {
    use Capability::*;
    match role {
        Role::Admin => &[
            ManageSchools,
            ManageStaff,
            ViewRecords,
            ViewSystemReports,
            PlanMeals,
        ],
        Role::SchoolAdmin => &[
            ManageHolidays,
            ManageMenus,
            RecordMeals,
            ViewRecords,
            ViewSchoolReports,
            PlanMeals,
        ],
        Role::Teacher => &[RecordMeals, ViewRecords, ViewSchoolReports, PlanMeals],
        Role::Cook => &[PlanMeals, ViewRecords],
        Role::Supervisor => &[ViewRecords, ViewSchoolReports],
    }
}

/// The acting user's role and school, resolved once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessContext {
    role: Role,
    school_code: Option<String>,
}

impl AccessContext {
    /// School-scoped roles must name a school; admins are never scoped.
    pub fn new(role: Role, school_code: Option<&str>) -> Result<Self> {
        let school_code = match (role.is_school_scoped(), school_code) {
            (true, Some(code)) if !code.trim().is_empty() => Some(code.trim().to_string()),
            (true, _) => {
                return Err(MealError::InvalidInput(format!(
                    "role '{}' must be bound to a school",
                    role
                )));
            }
            (false, _) => None,
        };
        Ok(Self { role, school_code })
    }

    pub fn admin() -> Self {
        Self {
            role: Role::Admin,
            school_code: None,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn school_code(&self) -> Option<&str> {
        self.school_code.as_deref()
    }

    pub fn can(&self, capability: Capability) -> bool {
        capabilities(self.role).contains(&capability)
    }

    pub fn require(&self, capability: Capability) -> Result<()> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(MealError::PermissionDenied(format!(
                "{} cannot {}",
                self.role,
                capability.describe()
            )))
        }
    }

    /// Whether a school's data is within this context's reach.
    pub fn covers_school(&self, code: &str) -> bool {
        self.school_code
            .as_deref()
            .is_none_or(|own| own.eq_ignore_ascii_case(code))
    }

    /// Reject work on a school outside this context.
    pub fn require_school(&self, code: &str) -> Result<()> {
        if self.covers_school(code) {
            Ok(())
        } else {
            Err(MealError::PermissionDenied(format!(
                "{} is not assigned to school {}",
                self.role, code
            )))
        }
    }

    /// Keep only records this context may see.
    pub fn visible<'a>(&self, records: Vec<&'a MealRecord>) -> Vec<&'a MealRecord> {
        records
            .into_iter()
            .filter(|r| self.covers_school(&r.school_code))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_manages_schools_not_meals() {
        let ctx = AccessContext::admin();
        assert!(ctx.can(Capability::ManageSchools));
        assert!(!ctx.can(Capability::RecordMeals));
        assert!(matches!(
            ctx.require(Capability::RecordMeals),
            Err(MealError::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_school_roles_need_school() {
        assert!(AccessContext::new(Role::Teacher, None).is_err());
        assert!(AccessContext::new(Role::Teacher, Some("  ")).is_err());
        let ctx = AccessContext::new(Role::Teacher, Some("GPS001")).unwrap();
        assert_eq!(ctx.school_code(), Some("GPS001"));
    }

    #[test]
    fn test_admin_ignores_school() {
        let ctx = AccessContext::new(Role::Admin, Some("GPS001")).unwrap();
        assert_eq!(ctx.school_code(), None);
        assert!(ctx.covers_school("anything"));
    }

    #[test]
    fn test_school_scope_is_case_insensitive() {
        let ctx = AccessContext::new(Role::SchoolAdmin, Some("gps001")).unwrap();
        assert!(ctx.covers_school("GPS001"));
        assert!(!ctx.covers_school("ZP002"));
        assert!(ctx.require_school("ZP002").is_err());
    }

    #[test]
    fn test_only_school_admin_manages_holidays() {
        for role in [Role::Admin, Role::Teacher, Role::Cook, Role::Supervisor] {
            assert!(!capabilities(role).contains(&Capability::ManageHolidays));
        }
        assert!(capabilities(Role::SchoolAdmin).contains(&Capability::ManageHolidays));
    }
}

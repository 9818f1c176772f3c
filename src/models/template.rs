use serde::{Deserialize, Serialize};

use super::grade::GradeBand;
use super::ingredient::IngredientProfile;

/// Per-student portions carried by a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemplateProfiles {
    /// Catalogue dish with one profile per grade band.
    Predefined {
        primary: IngredientProfile,
        upper_primary: IngredientProfile,
    },
    /// Ad hoc meal: one caller-supplied profile for every band.
    Custom { profile: IngredientProfile },
}

/// A named dish and its ingredient portions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealTemplate {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_marathi: Option<String>,
    pub profiles: TemplateProfiles,
}

impl MealTemplate {
    pub fn predefined(
        id: &str,
        name: &str,
        name_marathi: &str,
        primary: IngredientProfile,
        upper_primary: IngredientProfile,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            name_marathi: Some(name_marathi.to_string()),
            profiles: TemplateProfiles::Predefined {
                primary,
                upper_primary,
            },
        }
    }

    pub fn custom(name: &str, profile: IngredientProfile) -> Self {
        Self {
            id: "custom".to_string(),
            name: name.to_string(),
            name_marathi: None,
            profiles: TemplateProfiles::Custom { profile },
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.profiles, TemplateProfiles::Custom { .. })
    }

    /// Profile used for a grade band. `Both` reads the 1-5 profile.
    pub fn profile_for(&self, band: GradeBand) -> &IngredientProfile {
        match &self.profiles {
            TemplateProfiles::Custom { profile } => profile,
            TemplateProfiles::Predefined {
                primary,
                upper_primary,
            } => match band.effective() {
                GradeBand::UpperPrimary => upper_primary,
                _ => primary,
            },
        }
    }

    /// Case-insensitive match on id or display name.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        self.id.to_lowercase() == q || self.name.to_lowercase() == q
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ingredient;

    fn khichdi() -> MealTemplate {
        MealTemplate::predefined(
            "khichdi",
            "Moong Dal Khichdi",
            "मूग डाळ खिचडी",
            IngredientProfile::new().with(Ingredient::Rice, 100.0),
            IngredientProfile::new().with(Ingredient::Rice, 150.0),
        )
    }

    #[test]
    fn test_profile_for_band() {
        let t = khichdi();
        assert_eq!(t.profile_for(GradeBand::Primary).grams(Ingredient::Rice), 100.0);
        assert_eq!(t.profile_for(GradeBand::UpperPrimary).grams(Ingredient::Rice), 150.0);
        assert_eq!(t.profile_for(GradeBand::Both).grams(Ingredient::Rice), 100.0);
    }

    #[test]
    fn test_custom_ignores_band() {
        let profile = IngredientProfile::new().with(Ingredient::Oil, 5.0);
        let t = MealTemplate::custom("Festival", profile);
        assert!(t.is_custom());
        assert_eq!(t.profile_for(GradeBand::UpperPrimary).grams(Ingredient::Oil), 5.0);
    }

    #[test]
    fn test_matches_case_insensitive() {
        let t = khichdi();
        assert!(t.matches("KHICHDI"));
        assert!(t.matches("moong dal khichdi"));
        assert!(!t.matches("usal"));
    }
}

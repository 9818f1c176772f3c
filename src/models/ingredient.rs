use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MealError;

/// Ingredients a mid-day meal can draw on.
///
/// The set is closed: profiles, price tables, and computed requirements
/// all key on these identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ingredient {
    Rice,
    Soybean,
    MoongDal,
    TurDal,
    MasurDal,
    Matki,
    Moong,
    Chavli,
    Harbhara,
    Watana,
    Jeera,
    Mohari,
    Halad,
    Mirchi,
    Oil,
    Salt,
}

impl Ingredient {
    pub const ALL: [Ingredient; 16] = [
        Ingredient::Rice,
        Ingredient::Soybean,
        Ingredient::MoongDal,
        Ingredient::TurDal,
        Ingredient::MasurDal,
        Ingredient::Matki,
        Ingredient::Moong,
        Ingredient::Chavli,
        Ingredient::Harbhara,
        Ingredient::Watana,
        Ingredient::Jeera,
        Ingredient::Mohari,
        Ingredient::Halad,
        Ingredient::Mirchi,
        Ingredient::Oil,
        Ingredient::Salt,
    ];

    /// Wire identifier (snake_case).
    pub fn as_str(self) -> &'static str {
        match self {
            Ingredient::Rice => "rice",
            Ingredient::Soybean => "soybean",
            Ingredient::MoongDal => "moong_dal",
            Ingredient::TurDal => "tur_dal",
            Ingredient::MasurDal => "masur_dal",
            Ingredient::Matki => "matki",
            Ingredient::Moong => "moong",
            Ingredient::Chavli => "chavli",
            Ingredient::Harbhara => "harbhara",
            Ingredient::Watana => "watana",
            Ingredient::Jeera => "jeera",
            Ingredient::Mohari => "mohari",
            Ingredient::Halad => "halad",
            Ingredient::Mirchi => "mirchi",
            Ingredient::Oil => "oil",
            Ingredient::Salt => "salt",
        }
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Ingredient {
    type Err = MealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        Ingredient::ALL
            .into_iter()
            .find(|i| i.as_str() == key)
            .ok_or_else(|| MealError::InvalidInput(format!("unknown ingredient '{}'", s.trim())))
    }
}

/// Grams of each ingredient served to one student.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientProfile(BTreeMap<Ingredient, f64>);

impl IngredientProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, ingredient: Ingredient, grams: f64) -> Self {
        self.0.insert(ingredient, grams);
        self
    }

    pub fn insert(&mut self, ingredient: Ingredient, grams: f64) {
        self.0.insert(ingredient, grams);
    }

    /// Grams per student; absent ingredients read as zero.
    pub fn grams(&self, ingredient: Ingredient) -> f64 {
        self.0.get(&ingredient).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ingredient, f64)> + '_ {
        self.0.iter().map(|(i, g)| (*i, *g))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse `rice=100,oil=5` into a profile.
    pub fn parse_pairs(s: &str) -> Result<Self, MealError> {
        let mut profile = Self::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, grams) = part.split_once('=').ok_or_else(|| {
                MealError::InvalidInput(format!("expected ingredient=grams, got '{}'", part))
            })?;
            let ingredient: Ingredient = name.parse()?;
            let grams: f64 = grams.trim().parse().map_err(|_| {
                MealError::InvalidInput(format!("invalid grams for {}: '{}'", ingredient, grams))
            })?;
            profile.insert(ingredient, grams);
        }
        Ok(profile)
    }
}

impl FromIterator<(Ingredient, f64)> for IngredientProfile {
    fn from_iter<T: IntoIterator<Item = (Ingredient, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ingredient_variants() {
        assert_eq!("rice".parse::<Ingredient>().unwrap(), Ingredient::Rice);
        assert_eq!("Moong Dal".parse::<Ingredient>().unwrap(), Ingredient::MoongDal);
        assert_eq!("tur-dal".parse::<Ingredient>().unwrap(), Ingredient::TurDal);
        assert!("paneer".parse::<Ingredient>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&Ingredient::MasurDal).unwrap();
        assert_eq!(json, "\"masur_dal\"");
    }

    #[test]
    fn test_missing_ingredient_reads_zero() {
        let profile = IngredientProfile::new().with(Ingredient::Rice, 100.0);
        assert_eq!(profile.grams(Ingredient::Oil), 0.0);
        assert_eq!(profile.grams(Ingredient::Rice), 100.0);
    }

    #[test]
    fn test_parse_pairs() {
        let profile = IngredientProfile::parse_pairs("rice=100, oil=5").unwrap();
        assert_eq!(profile.len(), 2);
        assert_eq!(profile.grams(Ingredient::Oil), 5.0);

        assert!(IngredientProfile::parse_pairs("rice").is_err());
        assert!(IngredientProfile::parse_pairs("rice=lots").is_err());
    }
}

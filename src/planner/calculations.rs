use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MealError, Result};
use crate::models::{ComputedRequirement, GradeBand, Ingredient, IngredientProfile, MealTemplate};
use crate::planner::constants::*;

/// Government per-student subsidy for each grade band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    /// Grades 1-5.
    pub primary: f64,
    /// Grades 6-8.
    pub upper_primary: f64,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            primary: DEFAULT_PRIMARY_RATE,
            upper_primary: DEFAULT_UPPER_PRIMARY_RATE,
        }
    }
}

impl RateTable {
    /// Rate for a band; `Both` uses the 1-5 rate.
    pub fn rate_for(&self, band: GradeBand) -> f64 {
        match band.effective() {
            GradeBand::UpperPrimary => self.upper_primary,
            _ => self.primary,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !non_negative(self.primary) || !non_negative(self.upper_primary) {
            return Err(MealError::InvalidInput(
                "subsidy rates must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Price per kilogram for each ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostTable(HashMap<Ingredient, f64>);

impl Default for CostTable {
    fn default() -> Self {
        Self(DEFAULT_COST_PER_KG.clone())
    }
}

impl CostTable {
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    pub fn with(mut self, ingredient: Ingredient, per_kg: f64) -> Self {
        self.0.insert(ingredient, per_kg);
        self
    }

    /// Price per kg; unpriced ingredients cost nothing.
    pub fn per_kg(&self, ingredient: Ingredient) -> f64 {
        self.0.get(&ingredient).copied().unwrap_or(0.0)
    }

    /// Overlay prices from `other` on top of this table.
    pub fn merge(&mut self, other: &CostTable) {
        for (ingredient, price) in &other.0 {
            self.0.insert(*ingredient, *price);
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.0.iter().find(|(_, p)| !non_negative(**p)) {
            Some((ingredient, price)) => Err(MealError::InvalidInput(format!(
                "price for {} must be finite and non-negative, got {}",
                ingredient, price
            ))),
            None => Ok(()),
        }
    }
}

/// How `estimated_cost` is derived. Chosen by the caller, never inferred.
#[derive(Debug, Clone, Copy)]
pub enum CostStrategy<'a> {
    /// Subsidy rate times headcount; ignores ingredient quantities.
    FixedRate(&'a RateTable),
    /// Sum of quantity (kg) times price per kg.
    Itemized(&'a CostTable),
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn validate_count(student_count: i64) -> Result<f64> {
    if student_count < 0 {
        return Err(MealError::InvalidInput(format!(
            "student count must be non-negative, got {}",
            student_count
        )));
    }
    Ok(student_count as f64)
}

fn validate_profile(profile: &IngredientProfile) -> Result<()> {
    match profile.iter().find(|(_, g)| !non_negative(*g)) {
        Some((ingredient, grams)) => Err(MealError::InvalidInput(format!(
            "grams per student for {} must be finite and non-negative, got {}",
            ingredient, grams
        ))),
        None => Ok(()),
    }
}

/// Kilograms needed for `students` at `grams_per_student`, rounded to 2 dp.
#[inline]
pub fn scale_to_kg(grams_per_student: f64, students: f64) -> f64 {
    round2(grams_per_student * students / GRAMS_PER_KG)
}

/// Total kilograms per ingredient for every key in the profile.
pub fn ingredient_totals(
    profile: &IngredientProfile,
    student_count: i64,
) -> Result<BTreeMap<Ingredient, f64>> {
    let students = validate_count(student_count)?;
    validate_profile(profile)?;

    Ok(profile
        .iter()
        .map(|(ingredient, grams)| (ingredient, scale_to_kg(grams, students)))
        .collect())
}

/// Fixed-rate cost: `round2(rate[band] * student_count)`.
pub fn fixed_rate_cost(rates: &RateTable, band: GradeBand, student_count: i64) -> Result<f64> {
    let students = validate_count(student_count)?;
    rates.validate()?;
    Ok(round2(rates.rate_for(band) * students))
}

/// Itemized cost: `Σ kg * price_per_kg`, rounded to 2 dp.
pub fn itemized_cost(ingredients: &BTreeMap<Ingredient, f64>, prices: &CostTable) -> Result<f64> {
    prices.validate()?;
    let total: f64 = ingredients
        .iter()
        .map(|(ingredient, kg)| kg * prices.per_kg(*ingredient))
        .sum();
    Ok(round2(total))
}

/// Compute ingredient totals and estimated cost for one meal.
///
/// The profile comes from `template` for `band` (`Both` reads the 1-5
/// profile). Pure: identical inputs always give identical output.
pub fn compute_requirement(
    template: &MealTemplate,
    band: GradeBand,
    student_count: i64,
    strategy: CostStrategy<'_>,
) -> Result<ComputedRequirement> {
    let profile = template.profile_for(band);
    let ingredients = ingredient_totals(profile, student_count)?;

    let estimated_cost = match strategy {
        CostStrategy::FixedRate(rates) => fixed_rate_cost(rates, band, student_count)?,
        CostStrategy::Itemized(prices) => itemized_cost(&ingredients, prices)?,
    };

    debug!(
        template = %template.id,
        band = %band,
        student_count,
        estimated_cost,
        "computed meal requirement"
    );

    Ok(ComputedRequirement {
        ingredients,
        estimated_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(profile: IngredientProfile) -> MealTemplate {
        MealTemplate::custom("Custom", profile)
    }

    #[test]
    fn test_scale_to_kg() {
        assert_eq!(scale_to_kg(100.0, 10.0), 1.0);
        assert_eq!(scale_to_kg(5.0, 10.0), 0.05);
        assert_eq!(scale_to_kg(2.5, 121.0), 0.3);
    }

    #[test]
    fn test_negative_count_rejected() {
        let t = custom(IngredientProfile::new().with(Ingredient::Rice, 100.0));
        let prices = CostTable::default();
        let err = compute_requirement(&t, GradeBand::Primary, -1, CostStrategy::Itemized(&prices));
        assert!(matches!(err, Err(MealError::InvalidInput(_))));
    }

    #[test]
    fn test_negative_grams_rejected() {
        let t = custom(IngredientProfile::new().with(Ingredient::Oil, -5.0));
        let rates = RateTable::default();
        let err = compute_requirement(&t, GradeBand::Primary, 10, CostStrategy::FixedRate(&rates));
        assert!(matches!(err, Err(MealError::InvalidInput(_))));
    }

    #[test]
    fn test_zero_entries_kept() {
        let t = custom(
            IngredientProfile::new()
                .with(Ingredient::Rice, 100.0)
                .with(Ingredient::Jeera, 0.0),
        );
        let prices = CostTable::default();
        let req =
            compute_requirement(&t, GradeBand::Both, 20, CostStrategy::Itemized(&prices)).unwrap();
        assert_eq!(req.ingredients.len(), 2);
        assert_eq!(req.kilograms(Ingredient::Jeera), 0.0);
        assert_eq!(req.nonzero().count(), 1);
    }

    #[test]
    fn test_unpriced_ingredient_costs_nothing() {
        let mut ingredients = BTreeMap::new();
        ingredients.insert(Ingredient::Rice, 2.0);
        ingredients.insert(Ingredient::Salt, 1.0);
        let prices = CostTable::empty().with(Ingredient::Rice, 40.0);
        assert_eq!(itemized_cost(&ingredients, &prices).unwrap(), 80.0);
    }

    #[test]
    fn test_rate_for_both_uses_primary() {
        let rates = RateTable::default();
        assert_eq!(rates.rate_for(GradeBand::Both), DEFAULT_PRIMARY_RATE);
        assert_eq!(rates.rate_for(GradeBand::UpperPrimary), DEFAULT_UPPER_PRIMARY_RATE);
    }

    #[test]
    fn test_invalid_rates_rejected() {
        let rates = RateTable {
            primary: -1.0,
            upper_primary: 3.88,
        };
        assert!(fixed_rate_cost(&rates, GradeBand::Primary, 10).is_err());
    }
}

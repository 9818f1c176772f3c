use std::collections::HashMap;
use std::sync::LazyLock;

use crate::models::Ingredient;

/// Government subsidy per student per day, grades 1-5.
pub const DEFAULT_PRIMARY_RATE: f64 = 2.59;

/// Government subsidy per student per day, grades 6-8.
pub const DEFAULT_UPPER_PRIMARY_RATE: f64 = 3.88;

/// Grams in a kilogram.
pub const GRAMS_PER_KG: f64 = 1000.0;

// ─────────────────────────────────────────────────────────────────────────────
// Display thresholds
// ─────────────────────────────────────────────────────────────────────────────

/// Attendance below this share of enrolment is flagged in reports.
pub const LOW_ATTENDANCE_PERCENT: f64 = 75.0;

/// Jaro-Winkler score needed before a typed name is offered as a match.
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.7;

/// Market price per kilogram used by the itemized cost strategy.
pub static DEFAULT_COST_PER_KG: LazyLock<HashMap<Ingredient, f64>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert(Ingredient::Rice, 45.0);
    m.insert(Ingredient::Soybean, 90.0);
    m.insert(Ingredient::MoongDal, 110.0);
    m.insert(Ingredient::TurDal, 120.0);
    m.insert(Ingredient::MasurDal, 95.0);
    m.insert(Ingredient::Matki, 100.0);
    m.insert(Ingredient::Moong, 105.0);
    m.insert(Ingredient::Chavli, 90.0);
    m.insert(Ingredient::Harbhara, 80.0);
    m.insert(Ingredient::Watana, 85.0);
    m.insert(Ingredient::Jeera, 300.0);
    m.insert(Ingredient::Mohari, 120.0);
    m.insert(Ingredient::Halad, 200.0);
    m.insert(Ingredient::Mirchi, 250.0);
    m.insert(Ingredient::Oil, 180.0);
    m.insert(Ingredient::Salt, 20.0);
    m
});

/// Round to two decimal places.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

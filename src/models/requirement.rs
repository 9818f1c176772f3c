use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::grade::GradeBand;
use super::ingredient::Ingredient;

/// Headcount for a meal being planned.
///
/// `student_count` is signed so that bad input from forms and flags
/// reaches the calculator and is rejected there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttendanceInput {
    pub date: NaiveDate,
    pub grade_band: GradeBand,
    pub student_count: i64,
}

impl AttendanceInput {
    pub fn new(date: NaiveDate, grade_band: GradeBand, student_count: i64) -> Self {
        Self {
            date,
            grade_band,
            student_count,
        }
    }
}

/// Total ingredients (kg) and estimated cost for one meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedRequirement {
    pub ingredients: BTreeMap<Ingredient, f64>,
    pub estimated_cost: f64,
}

impl ComputedRequirement {
    /// Kilograms of an ingredient; zero when absent.
    pub fn kilograms(&self, ingredient: Ingredient) -> f64 {
        self.ingredients.get(&ingredient).copied().unwrap_or(0.0)
    }

    /// Entries worth showing (non-zero quantities).
    pub fn nonzero(&self) -> impl Iterator<Item = (Ingredient, f64)> + '_ {
        self.ingredients
            .iter()
            .filter(|(_, kg)| **kg > 0.0)
            .map(|(i, kg)| (*i, *kg))
    }

    pub fn total_kilograms(&self) -> f64 {
        self.ingredients.values().sum()
    }
}

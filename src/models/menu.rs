use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::MealError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Snack,
    Dinner,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Snack,
        MealType::Dinner,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Snack => "snack",
            MealType::Dinner => "dinner",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = MealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        MealType::ALL
            .into_iter()
            .find(|m| m.as_str() == key)
            .ok_or_else(|| MealError::InvalidInput(format!("unknown meal type '{}'", s.trim())))
    }
}

/// A dish scheduled for a date and meal slot.
///
/// At most one active plan exists per (date, meal type). Deactivated
/// plans stay in the data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuPlan {
    pub id: u64,
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub template_id: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub description_marathi: Option<String>,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl MenuPlan {
    /// Whether this plan occupies the slot `(date, meal_type)`.
    pub fn occupies(&self, date: NaiveDate, meal_type: MealType) -> bool {
        self.active && self.date == date && self.meal_type == meal_type
    }
}

/// Fields supplied when a menu is planned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMenuPlan {
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub template_id: String,
    pub description: Option<String>,
    pub description_marathi: Option<String>,
}

/// Partial change to a planned menu.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuPlanUpdate {
    pub date: Option<NaiveDate>,
    pub meal_type: Option<MealType>,
    pub template_id: Option<String>,
    pub description: Option<String>,
    pub description_marathi: Option<String>,
}

impl MenuPlanUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::grade::GradeBand;
use crate::error::MealError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealQuality {
    Excellent,
    Good,
    Average,
    Poor,
}

impl MealQuality {
    pub const ALL: [MealQuality; 4] = [
        MealQuality::Excellent,
        MealQuality::Good,
        MealQuality::Average,
        MealQuality::Poor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MealQuality::Excellent => "excellent",
            MealQuality::Good => "good",
            MealQuality::Average => "average",
            MealQuality::Poor => "poor",
        }
    }
}

impl fmt::Display for MealQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MealQuality {
    type Err = MealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        MealQuality::ALL
            .into_iter()
            .find(|q| q.as_str() == key)
            .ok_or_else(|| MealError::InvalidInput(format!("unknown meal quality '{}'", s.trim())))
    }
}

/// One day's meal service at one school.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    pub id: u64,
    pub school_code: String,
    pub template_id: String,
    pub date: NaiveDate,
    pub grade_band: GradeBand,
    pub students_present: u32,
    pub meals_served: u32,

    #[serde(default)]
    pub teacher_in_charge: Option<String>,

    #[serde(default)]
    pub remarks: Option<String>,

    #[serde(default)]
    pub meal_quality: Option<MealQuality>,

    /// Fixed-rate cost at the time of recording.
    pub estimated_cost: f64,
}

/// Fields supplied when a meal record is created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMealRecord {
    pub school_code: String,
    pub template_id: String,
    pub date: NaiveDate,
    pub grade_band: GradeBand,
    pub students_present: u32,
    pub meals_served: u32,
    pub teacher_in_charge: Option<String>,
    pub remarks: Option<String>,
    pub meal_quality: Option<MealQuality>,
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MealRecordUpdate {
    pub students_present: Option<u32>,
    pub meals_served: Option<u32>,
    pub teacher_in_charge: Option<String>,
    pub remarks: Option<String>,
    pub meal_quality: Option<MealQuality>,
}

impl MealRecordUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_parse() {
        assert_eq!("Excellent".parse::<MealQuality>().unwrap(), MealQuality::Excellent);
        assert!("fine".parse::<MealQuality>().is_err());
    }

    #[test]
    fn test_update_is_empty() {
        assert!(MealRecordUpdate::default().is_empty());
        let update = MealRecordUpdate {
            meals_served: Some(10),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}

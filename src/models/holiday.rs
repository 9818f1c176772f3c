use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::MealError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayKind {
    National,
    Religious,
    Local,
}

impl FromStr for HolidayKind {
    type Err = MealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "national" => Ok(HolidayKind::National),
            "religious" => Ok(HolidayKind::Religious),
            "local" => Ok(HolidayKind::Local),
            other => Err(MealError::InvalidInput(format!("unknown holiday kind '{}'", other))),
        }
    }
}

/// A calendar holiday and whether meals are still served on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,

    #[serde(default)]
    pub name_marathi: Option<String>,

    pub kind: HolidayKind,

    #[serde(default)]
    pub description: Option<String>,

    /// False when the meal service is suspended for the day.
    #[serde(default)]
    pub meal_service: bool,
}

impl Holiday {
    pub fn new(date: NaiveDate, name: &str, kind: HolidayKind, meal_service: bool) -> Self {
        Self {
            date,
            name: name.trim().to_string(),
            name_marathi: None,
            kind,
            description: None,
            meal_service,
        }
    }
}

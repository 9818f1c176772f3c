use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MealError;

/// Grade band selection for a meal.
///
/// `Both` has no profile or rate of its own; lookups resolve it to
/// `Primary` (see [`GradeBand::effective`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GradeBand {
    #[serde(rename = "1-5")]
    Primary,
    #[serde(rename = "6-8")]
    UpperPrimary,
    #[serde(rename = "both")]
    Both,
}

impl GradeBand {
    /// Concrete band used for profile and rate lookups.
    pub fn effective(self) -> GradeBand {
        match self {
            GradeBand::Both => GradeBand::Primary,
            band => band,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GradeBand::Primary => "1-5",
            GradeBand::UpperPrimary => "6-8",
            GradeBand::Both => "both",
        }
    }
}

impl fmt::Display for GradeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for GradeBand {
    type Err = MealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1-5" | "primary" => Ok(GradeBand::Primary),
            "6-8" | "upper" | "upper_primary" => Ok(GradeBand::UpperPrimary),
            "both" | "all" => Ok(GradeBand::Both),
            other => Err(MealError::InvalidInput(format!(
                "unknown grade band '{}' (expected 1-5, 6-8 or both)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_resolves_to_primary() {
        assert_eq!(GradeBand::Both.effective(), GradeBand::Primary);
        assert_eq!(GradeBand::UpperPrimary.effective(), GradeBand::UpperPrimary);
    }

    #[test]
    fn test_parse_and_serialize() {
        assert_eq!("6-8".parse::<GradeBand>().unwrap(), GradeBand::UpperPrimary);
        assert_eq!("BOTH".parse::<GradeBand>().unwrap(), GradeBand::Both);
        assert!("9-10".parse::<GradeBand>().is_err());
        assert_eq!(serde_json::to_string(&GradeBand::Primary).unwrap(), "\"1-5\"");
    }
}

use dialoguer::{Confirm, Input, Select};
use strsim::jaro_winkler;

use crate::error::{MealError, Result};
use crate::models::{GradeBand, MealQuality, School};
use crate::planner::constants::FUZZY_MATCH_THRESHOLD;
use crate::planner::TEMPLATE_CATALOGUE;

/// Prompt for a non-negative count.
pub fn prompt_count(prompt: &str, default: Option<u32>) -> Result<u32> {
    let mut input = Input::<String>::new().with_prompt(prompt);
    if let Some(d) = default {
        input = input.default(d.to_string());
    }
    let text = input.interact_text()?;

    text.trim()
        .parse()
        .map_err(|_| MealError::InvalidInput(format!("'{}' is not a valid count", text.trim())))
}

/// Prompt for an optional free-text field.
pub fn prompt_optional(prompt: &str) -> Result<Option<String>> {
    let text: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;

    let text = text.trim();
    Ok((!text.is_empty()).then(|| text.to_string()))
}

/// Pick a school by code, with fuzzy matching on code and name.
pub fn prompt_school<'a>(schools: &[&'a School]) -> Result<&'a School> {
    if schools.is_empty() {
        return Err(MealError::InvalidInput("no active schools".to_string()));
    }

    loop {
        let input: String = Input::new()
            .with_prompt("School code")
            .interact_text()?;
        let input = input.trim().to_lowercase();

        // Try exact match first (case-insensitive)
        if let Some(school) = schools.iter().find(|s| s.key() == input) {
            return Ok(*school);
        }

        let mut candidates: Vec<(&School, f64)> = schools
            .iter()
            .map(|s| {
                let score = jaro_winkler(&s.key(), &input)
                    .max(jaro_winkler(&s.name.to_lowercase(), &input));
                (*s, score)
            })
            .filter(|(_, score)| *score > FUZZY_MATCH_THRESHOLD)
            .collect();

        candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        if candidates.is_empty() {
            println!("No school matches '{}'", input);
            continue;
        }

        let mut options: Vec<String> = candidates
            .iter()
            .take(5)
            .map(|(s, _)| format!("{} ({})", s.name, s.code))
            .collect();
        options.push("None of these".to_string());

        let selection = Select::new()
            .with_prompt("Which school did you mean?")
            .items(&options)
            .default(0)
            .interact()?;

        if selection < options.len() - 1 {
            return Ok(candidates[selection].0);
        }
    }
}

/// Pick a predefined meal template. Returns its id.
pub fn prompt_template() -> Result<String> {
    let options: Vec<String> = TEMPLATE_CATALOGUE
        .iter()
        .map(|t| match &t.name_marathi {
            Some(m) => format!("{} / {}", t.name, m),
            None => t.name.clone(),
        })
        .collect();

    let selection = Select::new()
        .with_prompt("Menu served")
        .items(&options)
        .default(0)
        .interact()?;

    Ok(TEMPLATE_CATALOGUE[selection].id.clone())
}

/// Pick a grade band.
pub fn prompt_grade_band() -> Result<GradeBand> {
    let bands = [GradeBand::Primary, GradeBand::UpperPrimary, GradeBand::Both];
    let options: Vec<String> = bands.iter().map(|b| format!("Grades {}", b)).collect();

    let selection = Select::new()
        .with_prompt("Grade band")
        .items(&options)
        .default(0)
        .interact()?;

    Ok(bands[selection])
}

/// Pick a meal quality rating, or skip.
pub fn prompt_quality() -> Result<Option<MealQuality>> {
    let mut options: Vec<String> = MealQuality::ALL.iter().map(|q| q.to_string()).collect();
    options.push("skip".to_string());

    let selection = Select::new()
        .with_prompt("Meal quality")
        .items(&options)
        .default(1)
        .interact()?;

    Ok(MealQuality::ALL.get(selection).copied())
}

/// Simple yes/no confirmation.
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

use std::sync::LazyLock;

use strsim::jaro_winkler;

use crate::error::{MealError, Result};
use crate::models::{Ingredient, IngredientProfile, MealTemplate};
use crate::planner::constants::FUZZY_MATCH_THRESHOLD;

use Ingredient::*;

/// Tempering common to every dish: jeera, mohari, halad, mirchi, oil, salt.
fn tadka(scale: f64) -> IngredientProfile {
    IngredientProfile::new()
        .with(Jeera, 0.5 * scale)
        .with(Mohari, 0.5 * scale)
        .with(Halad, 0.2 * scale)
        .with(Mirchi, 0.5 * scale)
        .with(Oil, 5.0 * scale)
        .with(Salt, 2.0 * scale)
}

/// Rice plus a pulse, in the norms for each grade band.
///
/// 1-5: 100 g rice, `pulse_g` pulse. 6-8: 150 g rice, 1.5x pulse and tadka.
fn rice_and_pulse(pulse: Ingredient, pulse_g: f64) -> (IngredientProfile, IngredientProfile) {
    let primary = tadka(1.0).with(Rice, 100.0).with(pulse, pulse_g);
    let upper = tadka(1.5).with(Rice, 150.0).with(pulse, pulse_g * 1.5);
    (primary, upper)
}

fn dish(id: &str, name: &str, marathi: &str, pulse: Ingredient, pulse_g: f64) -> MealTemplate {
    let (primary, upper) = rice_and_pulse(pulse, pulse_g);
    MealTemplate::predefined(id, name, marathi, primary, upper)
}

/// Predefined dishes on the meal program's rotation.
pub static TEMPLATE_CATALOGUE: LazyLock<Vec<MealTemplate>> = LazyLock::new(|| {
    vec![
        dish("varan_bhat", "Varan Bhat", "वरण भात", TurDal, 20.0),
        dish("moong_dal_khichdi", "Moong Dal Khichdi", "मूग डाळ खिचडी", MoongDal, 20.0),
        dish("masur_dal_bhat", "Masur Dal Bhat", "मसूर डाळ भात", MasurDal, 20.0),
        dish("matki_usal", "Matki Usal", "मटकी उसळ", Matki, 20.0),
        dish("moong_usal", "Moong Usal", "मूग उसळ", Moong, 20.0),
        dish("chavli_usal", "Chavli Usal", "चवळी उसळ", Chavli, 20.0),
        dish("harbhara_usal", "Harbhara Usal", "हरभरा उसळ", Harbhara, 20.0),
        dish("masale_bhat", "Masale Bhat (Watana)", "मसाले भात", Watana, 20.0),
        dish("soybean_pulao", "Soybean Pulao", "सोयाबीन पुलाव", Soybean, 15.0),
    ]
});

/// Look up a predefined template by id or name (case-insensitive).
pub fn find_template(query: &str) -> Option<&'static MealTemplate> {
    TEMPLATE_CATALOGUE.iter().find(|t| t.matches(query))
}

/// Catalogue templates whose id or name resembles `query`, best first.
pub fn suggest_templates(query: &str) -> Vec<&'static MealTemplate> {
    let q = query.trim().to_lowercase();
    let mut scored: Vec<(&MealTemplate, f64)> = TEMPLATE_CATALOGUE
        .iter()
        .map(|t| {
            let score = jaro_winkler(&t.id, &q).max(jaro_winkler(&t.name.to_lowercase(), &q));
            (t, score)
        })
        .filter(|(_, score)| *score > FUZZY_MATCH_THRESHOLD)
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().map(|(t, _)| t).collect()
}

/// Like [`find_template`], but an error that names close matches on a miss.
pub fn require_template(query: &str) -> Result<&'static MealTemplate> {
    if let Some(t) = find_template(query) {
        return Ok(t);
    }

    let suggestions: Vec<&str> = suggest_templates(query)
        .into_iter()
        .take(3)
        .map(|t| t.id.as_str())
        .collect();

    let detail = if suggestions.is_empty() {
        query.to_string()
    } else {
        format!("{} (did you mean: {}?)", query, suggestions.join(", "))
    };
    Err(MealError::TemplateNotFound(detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GradeBand;

    #[test]
    fn test_catalogue_ids_unique() {
        let mut ids: Vec<&str> = TEMPLATE_CATALOGUE.iter().map(|t| t.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), TEMPLATE_CATALOGUE.len());
    }

    #[test]
    fn test_upper_primary_portions_larger() {
        for t in TEMPLATE_CATALOGUE.iter() {
            let primary = t.profile_for(GradeBand::Primary);
            let upper = t.profile_for(GradeBand::UpperPrimary);
            assert!(upper.grams(Rice) > primary.grams(Rice), "{}", t.id);
        }
    }

    #[test]
    fn test_find_by_name_or_id() {
        assert!(find_template("varan_bhat").is_some());
        assert!(find_template("Matki Usal").is_some());
        assert!(find_template("pizza").is_none());
    }

    #[test]
    fn test_require_template_suggests() {
        let err = require_template("matki usl").unwrap_err();
        match err {
            MealError::TemplateNotFound(msg) => assert!(msg.contains("matki_usal")),
            other => panic!("unexpected error: {other}"),
        }
    }
}

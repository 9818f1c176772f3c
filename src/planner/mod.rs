pub mod calculations;
pub mod constants;
pub mod templates;

pub use calculations::{
    compute_requirement, fixed_rate_cost, ingredient_totals, itemized_cost, scale_to_kg,
    CostStrategy, CostTable, RateTable,
};
pub use constants::*;
pub use templates::{find_template, require_template, suggest_templates, TEMPLATE_CATALOGUE};

pub mod prompts;
pub mod render;

pub use prompts::{
    prompt_count, prompt_grade_band, prompt_optional, prompt_quality, prompt_school,
    prompt_template, prompt_yes_no,
};
pub use render::{
    display_holidays, display_menus, display_records, display_report, display_requirement,
    display_schools, display_staff, display_templates,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MealError {
    #[error("School not found: {0}")]
    SchoolNotFound(String),

    #[error("Meal record not found: {0}")]
    RecordNotFound(u64),

    #[error("Menu not found: {0}")]
    MenuNotFound(u64),

    #[error("Meal template not found: {0}")]
    TemplateNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Duplicate meal record for {school} / {template} on {date}")]
    DuplicateRecord {
        school: String,
        template: String,
        date: chrono::NaiveDate,
    },

    #[error("Meal service suspended on {0}")]
    MealServiceSuspended(chrono::NaiveDate),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, MealError>;

pub mod access;
pub mod cli;
pub mod config;
pub mod error;
pub mod interface;
pub mod models;
pub mod planner;
pub mod report;
pub mod state;

pub use error::{MealError, Result};
pub use models::{ComputedRequirement, GradeBand, Ingredient, IngredientProfile, MealTemplate};

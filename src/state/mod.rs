mod manager;
mod persistence;
mod store;

pub use manager::{week_bounds, MealRegistry};
pub use persistence::{demo_database, load_database, save_database, Database, SCHEMA_VERSION};
pub use store::{JsonFileStore, MealStore, MemoryStore};

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::state::persistence::{load_database, save_database, Database};

/// Where the program state lives. Injected into [`MealRegistry`].
///
/// [`MealRegistry`]: crate::state::MealRegistry
pub trait MealStore {
    fn load(&self) -> Result<Database>;
    fn save(&mut self, db: &Database) -> Result<()>;
}

/// JSON document on disk. A missing file loads as an empty database.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl MealStore for JsonFileStore {
    fn load(&self) -> Result<Database> {
        if !self.path.exists() {
            info!("{} not found, starting with an empty database", self.path.display());
            return Ok(Database::default());
        }
        load_database(&self.path)
    }

    fn save(&mut self, db: &Database) -> Result<()> {
        save_database(&self.path, db)?;
        info!("saved database to {}", self.path.display());
        Ok(())
    }
}

/// Volatile store for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    db: Database,
    saves: usize,
}

impl MemoryStore {
    pub fn new(db: Database) -> Self {
        Self { db, saves: 0 }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Number of times `save` was called.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl MealStore for MemoryStore {
    fn load(&self) -> Result<Database> {
        Ok(self.db.clone())
    }

    fn save(&mut self, db: &Database) -> Result<()> {
        self.db = db.clone();
        self.saves += 1;
        Ok(())
    }
}

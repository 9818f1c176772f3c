use std::collections::{HashMap, HashSet};
use std::fs;
use std::hash::Hash;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{MealError, Result};
use crate::models::{Holiday, HolidayKind, MealRecord, MenuPlan, Role, School, StaffMember};

/// Version written by this build. v2 added menu plans.
pub const SCHEMA_VERSION: u32 = 2;

/// The whole persisted program state. Single owner of the on-disk schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub schema_version: u32,

    #[serde(default)]
    pub schools: Vec<School>,

    #[serde(default)]
    pub staff: Vec<StaffMember>,

    #[serde(default)]
    pub holidays: Vec<Holiday>,

    #[serde(default)]
    pub menus: Vec<MenuPlan>,

    #[serde(default)]
    pub records: Vec<MealRecord>,

    /// Next id handed to a new meal record.
    #[serde(default = "first_id")]
    pub next_record_id: u64,

    /// Next id handed to a new menu plan.
    #[serde(default = "first_id")]
    pub next_menu_id: u64,
}

fn first_id() -> u64 {
    1
}

impl Default for Database {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            schools: Vec::new(),
            staff: Vec::new(),
            holidays: Vec::new(),
            menus: Vec::new(),
            records: Vec::new(),
            next_record_id: first_id(),
            next_menu_id: first_id(),
        }
    }
}

impl Database {
    /// Drop duplicate schools, staff and holidays (last occurrence wins),
    /// sort by date, and move the id counters past every stored id.
    ///
    /// Duplicate record or menu ids are an error: there is no way to tell
    /// which copy is right.
    pub fn normalize(&mut self) -> Result<()> {
        self.schools = dedup_by_key(std::mem::take(&mut self.schools), School::key);
        self.staff = dedup_by_key(std::mem::take(&mut self.staff), StaffMember::key);
        self.holidays = dedup_by_key(std::mem::take(&mut self.holidays), |h| h.date);
        self.holidays.sort_by_key(|h| h.date);

        ensure_unique_ids("meal record", self.records.iter().map(|r| r.id))?;
        ensure_unique_ids("menu", self.menus.iter().map(|m| m.id))?;
        self.records.sort_by_key(|r| (r.date, r.id));
        self.menus.sort_by_key(|m| (m.date, m.meal_type, m.id));

        self.next_record_id = next_free_id(
            "meal record",
            self.next_record_id,
            self.records.iter().map(|r| r.id),
        )?;
        self.next_menu_id =
            next_free_id("menu", self.next_menu_id, self.menus.iter().map(|m| m.id))?;
        Ok(())
    }
}

/// `current` if it is past every id in `ids`, else the largest id plus one.
pub(crate) fn next_free_id(
    what: &str,
    current: u64,
    ids: impl Iterator<Item = u64>,
) -> Result<u64> {
    match ids.max() {
        Some(max_id) if current <= max_id => max_id.checked_add(1).ok_or_else(|| {
            MealError::InvalidInput(format!("{} id {} leaves no room for new ids", what, max_id))
        }),
        _ => Ok(current),
    }
}

fn ensure_unique_ids(what: &str, ids: impl Iterator<Item = u64>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(MealError::InvalidInput(format!(
                "{} id {} appears more than once",
                what, id
            )));
        }
    }
    Ok(())
}

/// Sample schools, staff and holidays for trying the tool out.
pub fn demo_database() -> Database {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();

    let mut pimpri = School::new("GPS001", "Government Primary School Pimpri", 340);
    pimpri.city = Some("Pimpri".to_string());
    pimpri.state = Some("Maharashtra".to_string());
    pimpri.principal_name = Some("Mrs. Sunita Sharma".to_string());

    let mut avaghad = School::new("MSA001", "Municipal School Avaghad", 275);
    avaghad.state = Some("Maharashtra".to_string());

    let mut dehu = School::new("ZPD001", "Zilla Parishad School Dehu", 420);
    dehu.city = Some("Dehu".to_string());
    dehu.state = Some("Maharashtra".to_string());

    let mut chinchwad = School::new("GHS001", "Government High School Chinchwad", 650);
    chinchwad.city = Some("Chinchwad".to_string());
    chinchwad.state = Some("Maharashtra".to_string());

    let mut diwali = Holiday::new(date(2024, 11, 1), "Diwali", HolidayKind::Religious, false);
    diwali.name_marathi = Some("दिवाळी".to_string());

    let principal = StaffMember::new(
        "principal_gps001",
        "Mrs. Sunita Sharma",
        Role::SchoolAdmin,
        Some("GPS001"),
    );
    let teacher = StaffMember::new(
        "teacher_gps001",
        "Mr. Ganesh Bhosale",
        Role::Teacher,
        Some("GPS001"),
    );

    // Already unique and in date order.
    Database {
        schools: vec![pimpri, avaghad, dehu, chinchwad],
        staff: vec![principal, teacher],
        holidays: vec![
            Holiday::new(date(2024, 8, 15), "Independence Day", HolidayKind::National, true),
            Holiday::new(date(2024, 10, 2), "Gandhi Jayanti", HolidayKind::National, false),
            diwali,
        ],
        ..Database::default()
    }
}

/// Keep the last item per key, preserving first-seen order.
fn dedup_by_key<T, K: Eq + Hash>(items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        let k = key(&item);
        match slots.get(&k) {
            Some(&idx) => out[idx] = item,
            None => {
                slots.insert(k, out.len());
                out.push(item);
            }
        }
    }
    out
}

/// Load the database from a JSON file.
pub fn load_database<P: AsRef<Path>>(path: P) -> Result<Database> {
    let content = fs::read_to_string(path)?;
    let mut db: Database = serde_json::from_str(&content)?;

    if db.schema_version > SCHEMA_VERSION {
        return Err(MealError::InvalidInput(format!(
            "data file schema v{} is newer than supported v{}",
            db.schema_version, SCHEMA_VERSION
        )));
    }
    if db.schema_version < SCHEMA_VERSION {
        warn!(
            "upgrading data file schema v{} to v{}",
            db.schema_version, SCHEMA_VERSION
        );
        db.schema_version = SCHEMA_VERSION;
    }

    db.normalize()?;
    debug!(
        schools = db.schools.len(),
        staff = db.staff.len(),
        holidays = db.holidays.len(),
        menus = db.menus.len(),
        records = db.records.len(),
        "loaded database"
    );
    Ok(db)
}

/// Save the database to a JSON file.
pub fn save_database<P: AsRef<Path>>(path: P, db: &Database) -> Result<()> {
    let mut db = db.clone();
    db.normalize()?;
    let json = serde_json::to_string_pretty(&db)?;
    fs::write(path, json)?;
    Ok(())
}

use chrono::{Datelike, Duration, NaiveDate};
use tracing::{info, warn};

use crate::error::{MealError, Result};
use crate::models::{
    Holiday, MealRecord, MealRecordUpdate, MealType, MenuPlan, MenuPlanUpdate, NewMealRecord,
    NewMenuPlan, School, StaffMember,
};
use crate::planner::{fixed_rate_cost, require_template, RateTable};
use crate::state::persistence::Database;
use crate::state::store::MealStore;

/// Monday and Sunday of the week containing `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = date.weekday().num_days_from_monday() as i64;
    let start = date - Duration::days(offset);
    (start, start + Duration::days(6))
}

/// Schools, staff, holidays and meal records over an injected store.
///
/// Changes are held in memory until [`MealRegistry::commit`].
pub struct MealRegistry<S: MealStore> {
    store: S,
    db: Database,
    rates: RateTable,
    dirty: bool,
}

impl<S: MealStore> MealRegistry<S> {
    /// Load state from `store`. `rates` price new and updated records.
    pub fn open(store: S, rates: RateTable) -> Result<Self> {
        rates.validate()?;
        let db = store.load()?;
        Ok(Self {
            store,
            db,
            rates,
            dirty: false,
        })
    }

    /// Persist pending changes. Returns whether anything was written.
    pub fn commit(&mut self) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.store.save(&self.db)?;
        self.dirty = false;
        Ok(true)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    // ── Schools ─────────────────────────────────────────────────────────────

    /// Get a school by code (case-insensitive).
    pub fn find_school(&self, code: &str) -> Option<&School> {
        let key = code.trim().to_lowercase();
        self.db.schools.iter().find(|s| s.key() == key)
    }

    fn school_mut(&mut self, code: &str) -> Result<&mut School> {
        let key = code.trim().to_lowercase();
        self.db
            .schools
            .iter_mut()
            .find(|s| s.key() == key)
            .ok_or_else(|| MealError::SchoolNotFound(code.to_string()))
    }

    /// Active schools, or all of them with `include_inactive`.
    pub fn schools(&self, include_inactive: bool) -> Vec<&School> {
        self.db
            .schools
            .iter()
            .filter(|s| include_inactive || s.active)
            .collect()
    }

    pub fn add_school(&mut self, school: School) -> Result<()> {
        if !school.is_valid() {
            return Err(MealError::InvalidInput(format!(
                "school '{}' needs a code, a name and a 6-digit pincode if any",
                school.code
            )));
        }
        if self.find_school(&school.code).is_some() {
            return Err(MealError::InvalidInput(format!(
                "school code {} already exists",
                school.code
            )));
        }

        info!(code = %school.code, "added school {}", school.name);
        self.db.schools.push(school);
        self.dirty = true;
        Ok(())
    }

    pub fn deactivate_school(&mut self, code: &str) -> Result<()> {
        let school = self.school_mut(code)?;
        school.active = false;
        info!(code = %school.code, "deactivated school");
        self.dirty = true;
        Ok(())
    }

    fn active_school(&self, code: &str) -> Result<&School> {
        match self.find_school(code) {
            Some(s) if s.active => Ok(s),
            Some(s) => Err(MealError::InvalidInput(format!(
                "school {} is inactive",
                s.code
            ))),
            None => Err(MealError::SchoolNotFound(code.to_string())),
        }
    }

    // ── Staff ───────────────────────────────────────────────────────────────

    pub fn find_staff(&self, username: &str) -> Option<&StaffMember> {
        let key = username.trim().to_lowercase();
        self.db.staff.iter().find(|m| m.key() == key)
    }

    /// Staff list, optionally limited to one school.
    pub fn staff(&self, school_code: Option<&str>) -> Vec<&StaffMember> {
        self.db
            .staff
            .iter()
            .filter(|m| match school_code {
                Some(code) => m
                    .school_code
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(code)),
                None => true,
            })
            .collect()
    }

    pub fn add_staff(&mut self, mut member: StaffMember) -> Result<()> {
        if member.username.is_empty() || member.full_name.is_empty() {
            return Err(MealError::InvalidInput(
                "staff need a username and a full name".to_string(),
            ));
        }
        if self.find_staff(&member.username).is_some() {
            return Err(MealError::InvalidInput(format!(
                "username {} already exists",
                member.username
            )));
        }

        if member.role.is_school_scoped() {
            let code = member.school_code.as_deref().ok_or_else(|| {
                MealError::InvalidInput(format!("{} must belong to a school", member.role))
            })?;
            // Store the canonical spelling of the code.
            member.school_code = Some(self.active_school(code)?.code.clone());
        } else {
            member.school_code = None;
        }

        info!(username = %member.username, role = ?member.role, "added staff member");
        self.db.staff.push(member);
        self.dirty = true;
        Ok(())
    }

    pub fn deactivate_staff(&mut self, username: &str) -> Result<()> {
        let key = username.trim().to_lowercase();
        let member = self
            .db
            .staff
            .iter_mut()
            .find(|m| m.key() == key)
            .ok_or_else(|| MealError::InvalidInput(format!("no staff member {}", username)))?;
        member.active = false;
        self.dirty = true;
        Ok(())
    }

    // ── Holidays ────────────────────────────────────────────────────────────

    pub fn holiday_on(&self, date: NaiveDate) -> Option<&Holiday> {
        self.db.holidays.iter().find(|h| h.date == date)
    }

    /// False only when a holiday on `date` suspends the meal service.
    pub fn meal_service_on(&self, date: NaiveDate) -> bool {
        self.holiday_on(date).is_none_or(|h| h.meal_service)
    }

    pub fn holidays(&self, year: Option<i32>) -> Vec<&Holiday> {
        self.db
            .holidays
            .iter()
            .filter(|h| year.is_none_or(|y| h.date.year() == y))
            .collect()
    }

    pub fn add_holiday(&mut self, holiday: Holiday) -> Result<()> {
        if holiday.name.is_empty() {
            return Err(MealError::InvalidInput("holiday needs a name".to_string()));
        }
        if let Some(existing) = self.holiday_on(holiday.date) {
            return Err(MealError::InvalidInput(format!(
                "{} is already a holiday ({})",
                holiday.date, existing.name
            )));
        }

        info!(
            date = %holiday.date,
            meal_service = holiday.meal_service,
            "added holiday {}",
            holiday.name
        );
        let pos = self.db.holidays.partition_point(|h| h.date < holiday.date);
        self.db.holidays.insert(pos, holiday);
        self.dirty = true;
        Ok(())
    }

    // ── Menus ───────────────────────────────────────────────────────────────

    pub fn menu(&self, id: u64) -> Option<&MenuPlan> {
        self.db.menus.iter().find(|m| m.id == id)
    }

    /// The active plan for a date and meal slot.
    pub fn menu_on(&self, date: NaiveDate, meal_type: MealType) -> Option<&MenuPlan> {
        self.db.menus.iter().find(|m| m.occupies(date, meal_type))
    }

    /// Every plan ever made, including deactivated ones.
    pub fn all_menus(&self) -> Vec<&MenuPlan> {
        self.db.menus.iter().collect()
    }

    /// Active plans dated within `[from, to]`, inclusive.
    pub fn menus_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<&MenuPlan> {
        self.db
            .menus
            .iter()
            .filter(|m| m.active && m.date >= from && m.date <= to)
            .collect()
    }

    pub fn menus_this_week(&self, today: NaiveDate) -> Vec<&MenuPlan> {
        let (start, end) = week_bounds(today);
        self.menus_between(start, end)
    }

    pub fn menus_for_month(&self, year: i32, month: u32) -> Vec<&MenuPlan> {
        self.db
            .menus
            .iter()
            .filter(|m| m.active && m.date.year() == year && m.date.month() == month)
            .collect()
    }

    /// Schedule a catalogue dish. The slot must not hold another active plan.
    pub fn add_menu(&mut self, new: NewMenuPlan) -> Result<&MenuPlan> {
        let template_id = require_template(&new.template_id)?.id.clone();
        self.ensure_menu_slot_free(new.date, new.meal_type, None)?;

        let id = self.db.next_menu_id;
        self.db.next_menu_id = next_id("menu", id)?;

        let plan = MenuPlan {
            id,
            date: new.date,
            meal_type: new.meal_type,
            template_id,
            description: new.description,
            description_marathi: new.description_marathi,
            active: true,
        };

        info!(id, date = %plan.date, meal = %plan.meal_type, "planned menu {}", plan.template_id);
        let key = (plan.date, plan.meal_type, plan.id);
        let pos = self
            .db
            .menus
            .partition_point(|m| (m.date, m.meal_type, m.id) < key);
        self.db.menus.insert(pos, plan);
        self.dirty = true;
        Ok(&self.db.menus[pos])
    }

    /// Move, re-dish or re-describe an active plan.
    pub fn update_menu(&mut self, id: u64, update: MenuPlanUpdate) -> Result<&MenuPlan> {
        if update.is_empty() {
            return Err(MealError::InvalidInput("nothing to update".to_string()));
        }

        let current = self.menu(id).ok_or(MealError::MenuNotFound(id))?;
        if !current.active {
            return Err(MealError::InvalidInput(format!("menu {} is inactive", id)));
        }
        let date = update.date.unwrap_or(current.date);
        let meal_type = update.meal_type.unwrap_or(current.meal_type);
        let template_id = match update.template_id.as_deref() {
            Some(query) => Some(require_template(query)?.id.clone()),
            None => None,
        };
        self.ensure_menu_slot_free(date, meal_type, Some(id))?;

        let plan = self
            .db
            .menus
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(MealError::MenuNotFound(id))?;
        plan.date = date;
        plan.meal_type = meal_type;
        if let Some(template_id) = template_id {
            plan.template_id = template_id;
        }
        if update.description.is_some() {
            plan.description = update.description;
        }
        if update.description_marathi.is_some() {
            plan.description_marathi = update.description_marathi;
        }

        info!(id, "updated menu");
        self.db.menus.sort_by_key(|m| (m.date, m.meal_type, m.id));
        self.dirty = true;
        self.menu(id).ok_or(MealError::MenuNotFound(id))
    }

    /// Soft-delete a plan, freeing its slot.
    pub fn deactivate_menu(&mut self, id: u64) -> Result<()> {
        let plan = self
            .db
            .menus
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(MealError::MenuNotFound(id))?;
        plan.active = false;
        info!(id, "deactivated menu");
        self.dirty = true;
        Ok(())
    }

    fn ensure_menu_slot_free(
        &self,
        date: NaiveDate,
        meal_type: MealType,
        except: Option<u64>,
    ) -> Result<()> {
        let taken = self
            .db
            .menus
            .iter()
            .find(|m| m.occupies(date, meal_type) && Some(m.id) != except);
        match taken {
            Some(existing) => Err(MealError::InvalidInput(format!(
                "{} {} is already planned as menu {} ({})",
                date, meal_type, existing.id, existing.template_id
            ))),
            None => Ok(()),
        }
    }

    // ── Meal records ────────────────────────────────────────────────────────

    pub fn record(&self, id: u64) -> Option<&MealRecord> {
        self.db.records.iter().find(|r| r.id == id)
    }

    /// The record for a school, template and date, if one exists.
    pub fn find_record(
        &self,
        school_code: &str,
        template_id: &str,
        date: NaiveDate,
    ) -> Option<&MealRecord> {
        self.db.records.iter().find(|r| {
            r.date == date
                && r.school_code.eq_ignore_ascii_case(school_code)
                && r.template_id == template_id
        })
    }

    pub fn records(&self) -> Vec<&MealRecord> {
        self.db.records.iter().collect()
    }

    pub fn records_on(&self, date: NaiveDate) -> Vec<&MealRecord> {
        self.records_between(date, date)
    }

    /// Records dated within `[from, to]`, inclusive.
    pub fn records_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<&MealRecord> {
        self.db
            .records
            .iter()
            .filter(|r| r.date >= from && r.date <= to)
            .collect()
    }

    pub fn records_for_school(
        &self,
        school_code: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<&MealRecord> {
        self.records_between(from, to)
            .into_iter()
            .filter(|r| r.school_code.eq_ignore_ascii_case(school_code))
            .collect()
    }

    /// Records in the Monday–Sunday week containing `today`.
    pub fn records_this_week(&self, today: NaiveDate) -> Vec<&MealRecord> {
        let (start, end) = week_bounds(today);
        self.records_between(start, end)
    }

    /// Validate and store a new meal record, pricing it at the fixed rate.
    pub fn add_record(&mut self, new: NewMealRecord) -> Result<&MealRecord> {
        let school_code = self.active_school(&new.school_code)?.code.clone();
        let template = require_template(&new.template_id)?;

        if !self.meal_service_on(new.date) {
            return Err(MealError::MealServiceSuspended(new.date));
        }
        if self.find_record(&school_code, &template.id, new.date).is_some() {
            return Err(MealError::DuplicateRecord {
                school: school_code,
                template: template.id.clone(),
                date: new.date,
            });
        }
        if new.meals_served > new.students_present {
            warn!(
                school = %school_code,
                date = %new.date,
                "meals served ({}) exceed students present ({})",
                new.meals_served,
                new.students_present
            );
        }

        let estimated_cost =
            fixed_rate_cost(&self.rates, new.grade_band, new.students_present as i64)?;
        let id = self.db.next_record_id;
        self.db.next_record_id = next_id("meal record", id)?;

        let record = MealRecord {
            id,
            school_code,
            template_id: template.id.clone(),
            date: new.date,
            grade_band: new.grade_band,
            students_present: new.students_present,
            meals_served: new.meals_served,
            teacher_in_charge: new.teacher_in_charge,
            remarks: new.remarks,
            meal_quality: new.meal_quality,
            estimated_cost,
        };

        info!(id, school = %record.school_code, date = %record.date, "recorded meal");
        let pos = self
            .db
            .records
            .partition_point(|r| (r.date, r.id) < (record.date, record.id));
        self.db.records.insert(pos, record);
        self.dirty = true;
        Ok(&self.db.records[pos])
    }

    /// Apply a partial update; the estimated cost is recomputed.
    pub fn update_record(&mut self, id: u64, update: MealRecordUpdate) -> Result<&MealRecord> {
        if update.is_empty() {
            return Err(MealError::InvalidInput("nothing to update".to_string()));
        }

        let rates = self.rates;
        let record = self
            .db
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(MealError::RecordNotFound(id))?;

        if let Some(present) = update.students_present {
            record.students_present = present;
        }
        if let Some(served) = update.meals_served {
            record.meals_served = served;
        }
        if update.teacher_in_charge.is_some() {
            record.teacher_in_charge = update.teacher_in_charge;
        }
        if update.remarks.is_some() {
            record.remarks = update.remarks;
        }
        if update.meal_quality.is_some() {
            record.meal_quality = update.meal_quality;
        }
        record.estimated_cost =
            fixed_rate_cost(&rates, record.grade_band, record.students_present as i64)?;

        if record.meals_served > record.students_present {
            warn!(id, "meals served exceed students present after update");
        }

        info!(id, "updated meal record");
        self.dirty = true;
        Ok(record)
    }

    pub fn delete_record(&mut self, id: u64) -> Result<MealRecord> {
        let pos = self
            .db
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(MealError::RecordNotFound(id))?;
        info!(id, "deleted meal record");
        self.dirty = true;
        Ok(self.db.records.remove(pos))
    }

    /// Total meals served within `[from, to]`.
    pub fn total_meals_served(&self, from: NaiveDate, to: NaiveDate) -> u64 {
        self.records_between(from, to)
            .iter()
            .map(|r| r.meals_served as u64)
            .sum()
    }

    /// Total students present within `[from, to]`.
    pub fn total_students_present(&self, from: NaiveDate, to: NaiveDate) -> u64 {
        self.records_between(from, to)
            .iter()
            .map(|r| r.students_present as u64)
            .sum()
    }
}

fn next_id(what: &str, current: u64) -> Result<u64> {
    current
        .checked_add(1)
        .ok_or_else(|| MealError::InvalidInput(format!("no {} ids left after {}", what, current)))
}

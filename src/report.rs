use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::access::{AccessContext, Capability};
use crate::error::{MealError, Result};
use crate::models::{MealRecord, School};
use crate::planner::constants::round2;
use crate::state::{MealRegistry, MealStore};

/// Per-school totals over a reporting period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchoolSummary {
    pub school_code: String,
    pub school_name: String,
    pub records: usize,
    pub meal_days: usize,
    pub meals_served: u64,
    pub students_present: u64,
    /// Mean daily attendance against enrolment; `None` without enrolment.
    pub attendance_percent: Option<f64>,
    pub estimated_cost: f64,
}

/// Totals for a reporting period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub records: usize,
    pub meal_days: usize,
    pub meals_served: u64,
    pub students_present: u64,
    pub estimated_cost: f64,
    pub schools: Vec<SchoolSummary>,
}

impl PeriodReport {
    /// Schools reporting at least one record.
    pub fn reporting_schools(&self) -> usize {
        self.schools.iter().filter(|s| s.records > 0).count()
    }
}

/// Summarize `records` dated in `[from, to]`.
///
/// Every school in `schools` gets a row, including ones with no records.
/// Records for unknown schools get a row named after their code.
pub fn build_period_report(
    records: &[&MealRecord],
    schools: &[&School],
    from: NaiveDate,
    to: NaiveDate,
) -> Result<PeriodReport> {
    if from > to {
        return Err(MealError::InvalidInput(format!(
            "report period starts ({}) after it ends ({})",
            from, to
        )));
    }

    let in_period: Vec<&MealRecord> = records
        .iter()
        .copied()
        .filter(|r| r.date >= from && r.date <= to)
        .collect();

    let mut by_school: BTreeMap<String, Vec<&MealRecord>> = schools
        .iter()
        .map(|s| (s.key(), Vec::new()))
        .collect();
    for record in in_period.iter().copied() {
        by_school
            .entry(record.school_code.to_lowercase())
            .or_default()
            .push(record);
    }

    let summaries = by_school
        .into_iter()
        .map(|(key, recs)| {
            let school = schools.iter().find(|s| s.key() == key);
            summarize_school(school.copied(), &key, &recs)
        })
        .collect();

    let meal_days: BTreeSet<NaiveDate> = in_period.iter().map(|r| r.date).collect();

    Ok(PeriodReport {
        from,
        to,
        records: in_period.len(),
        meal_days: meal_days.len(),
        meals_served: in_period.iter().map(|r| r.meals_served as u64).sum(),
        students_present: in_period.iter().map(|r| r.students_present as u64).sum(),
        estimated_cost: round2(in_period.iter().map(|r| r.estimated_cost).sum()),
        schools: summaries,
    })
}

fn summarize_school(school: Option<&School>, key: &str, records: &[&MealRecord]) -> SchoolSummary {
    let (code, name, enrolled) = match school {
        Some(s) => (s.code.clone(), s.name.clone(), s.total_students),
        None => (key.to_uppercase(), key.to_uppercase(), 0),
    };

    // Several templates on one day count once toward attendance.
    let mut daily: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for r in records {
        let present = daily.entry(r.date).or_insert(0);
        *present = (*present).max(r.students_present);
    }

    let attendance_percent = if enrolled > 0 && !daily.is_empty() {
        let mean = daily.values().map(|p| *p as f64).sum::<f64>() / daily.len() as f64;
        Some(round2(mean / enrolled as f64 * 100.0))
    } else {
        None
    };

    SchoolSummary {
        school_code: code,
        school_name: name,
        records: records.len(),
        meal_days: daily.len(),
        meals_served: records.iter().map(|r| r.meals_served as u64).sum(),
        students_present: records.iter().map(|r| r.students_present as u64).sum(),
        attendance_percent,
        estimated_cost: round2(records.iter().map(|r| r.estimated_cost).sum()),
    }
}

/// Period report as seen by `ctx`.
///
/// Covers every active school within reach, plus deactivated schools that
/// still have records in the period so their rows keep name and enrolment.
pub fn scoped_period_report<S: MealStore>(
    registry: &MealRegistry<S>,
    ctx: &AccessContext,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<PeriodReport> {
    if !ctx.can(Capability::ViewSystemReports) {
        ctx.require(Capability::ViewSchoolReports)?;
    }

    let records = ctx.visible(registry.records_between(from, to));
    let has_records =
        |s: &School| records.iter().any(|r| r.school_code.eq_ignore_ascii_case(&s.code));
    let schools: Vec<&School> = registry
        .schools(true)
        .into_iter()
        .filter(|s| ctx.covers_school(&s.code))
        .filter(|s| s.active || has_records(*s))
        .collect();

    build_period_report(&records, &schools, from, to)
}

/// Write one CSV row per school.
pub fn write_report_csv<W: Write>(report: &PeriodReport, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for summary in &report.schools {
        wtr.serialize(summary)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GradeBand, NewMealRecord, Role};
    use crate::planner::RateTable;
    use crate::state::MemoryStore;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    fn record(id: u64, school: &str, day: u32, present: u32, cost: f64) -> MealRecord {
        MealRecord {
            id,
            school_code: school.to_string(),
            template_id: "varan_bhat".to_string(),
            date: date(day),
            grade_band: GradeBand::Primary,
            students_present: present,
            meals_served: present,
            teacher_in_charge: None,
            remarks: None,
            meal_quality: None,
            estimated_cost: cost,
        }
    }

    #[test]
    fn test_period_totals() {
        let gps = School::new("GPS001", "Government Primary School Pimpri", 200);
        let zp = School::new("ZP002", "Zilla Parishad School Dehu", 100);
        let recs = [
            record(1, "GPS001", 23, 180, 466.2),
            record(2, "GPS001", 24, 160, 414.4),
            record(3, "ZP002", 24, 90, 233.1),
            record(4, "GPS001", 2, 150, 388.5),
        ];
        let refs: Vec<&MealRecord> = recs.iter().collect();

        let report = build_period_report(&refs, &[&gps, &zp], date(20), date(30)).unwrap();
        assert_eq!(report.records, 3);
        assert_eq!(report.meal_days, 2);
        assert_eq!(report.meals_served, 430);
        assert_eq!(report.estimated_cost, 1113.7);
        assert_eq!(report.reporting_schools(), 2);

        let gps_row = report.schools.iter().find(|s| s.school_code == "GPS001").unwrap();
        assert_eq!(gps_row.records, 2);
        assert_eq!(gps_row.attendance_percent, Some(85.0));
    }

    #[test]
    fn test_school_without_records_listed() {
        let gps = School::new("GPS001", "Government Primary School Pimpri", 200);
        let report = build_period_report(&[], &[&gps], date(1), date(30)).unwrap();
        assert_eq!(report.schools.len(), 1);
        assert_eq!(report.schools[0].attendance_percent, None);
        assert_eq!(report.reporting_schools(), 0);
    }

    #[test]
    fn test_inverted_period_rejected() {
        assert!(build_period_report(&[], &[], date(30), date(1)).is_err());
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let gps = School::new("GPS001", "Government Primary School Pimpri", 200);
        let recs = [record(1, "GPS001", 23, 180, 466.2)];
        let refs: Vec<&MealRecord> = recs.iter().collect();
        let report = build_period_report(&refs, &[&gps], date(1), date(30)).unwrap();

        let mut out = Vec::new();
        write_report_csv(&report, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("school_code,school_name,records"));
        assert!(lines.next().unwrap().starts_with("GPS001,"));
    }

    #[test]
    fn test_deactivated_school_keeps_its_row() {
        let mut reg = MealRegistry::open(MemoryStore::default(), RateTable::default()).unwrap();
        reg.add_school(School::new("GPS001", "Government Primary School Pimpri", 200))
            .unwrap();
        reg.add_school(School::new("MSA001", "Municipal School Avaghad", 275))
            .unwrap();
        reg.add_record(NewMealRecord {
            school_code: "GPS001".to_string(),
            template_id: "varan_bhat".to_string(),
            date: date(10),
            grade_band: GradeBand::Primary,
            students_present: 150,
            meals_served: 150,
            teacher_in_charge: None,
            remarks: None,
            meal_quality: None,
        })
        .unwrap();
        reg.deactivate_school("GPS001").unwrap();
        reg.deactivate_school("MSA001").unwrap();

        let report =
            scoped_period_report(&reg, &AccessContext::admin(), date(1), date(30)).unwrap();
        assert_eq!(report.schools.len(), 1);
        let row = &report.schools[0];
        assert_eq!(row.school_name, "Government Primary School Pimpri");
        assert_eq!(row.attendance_percent, Some(75.0));
    }

    #[test]
    fn test_scoped_report_needs_report_capability() {
        let reg = MealRegistry::open(MemoryStore::default(), RateTable::default()).unwrap();
        let cook = AccessContext::new(Role::Cook, Some("GPS001")).unwrap();
        assert!(matches!(
            scoped_period_report(&reg, &cook, date(1), date(30)),
            Err(MealError::PermissionDenied(_))
        ));
    }
}

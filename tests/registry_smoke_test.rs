use chrono::NaiveDate;
use tempfile::TempDir;

use midday_meal_rs::access::{AccessContext, Capability};
use midday_meal_rs::models::{
    GradeBand, Holiday, HolidayKind, MealRecordUpdate, MealType, NewMealRecord, NewMenuPlan, Role,
    School,
};
use midday_meal_rs::planner::RateTable;
use midday_meal_rs::report::{scoped_period_report, write_report_csv};
use midday_meal_rs::state::{demo_database, JsonFileStore, MealRegistry, MealStore};
use midday_meal_rs::MealError;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
}

fn meal(school: &str, template: &str, date: NaiveDate, present: u32) -> NewMealRecord {
    NewMealRecord {
        school_code: school.to_string(),
        template_id: template.to_string(),
        date,
        grade_band: GradeBand::Primary,
        students_present: present,
        meals_served: present,
        teacher_in_charge: Some("Mr. Ganesh Bhosale".to_string()),
        remarks: None,
        meal_quality: None,
    }
}

#[test]
fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("midday_data.json");

    let mut store = JsonFileStore::new(&path);
    store.save(&demo_database()).unwrap();

    let mut registry = MealRegistry::open(JsonFileStore::new(&path), RateTable::default()).unwrap();
    let id = registry
        .add_record(meal("GPS001", "varan_bhat", day(1), 121))
        .unwrap()
        .id;
    registry
        .add_record(meal("gps001", "Matki Usal", day(2), 118))
        .unwrap();
    assert!(registry.commit().unwrap());
    assert!(!registry.commit().unwrap());

    let reopened = MealRegistry::open(JsonFileStore::new(&path), RateTable::default()).unwrap();
    let record = reopened.record(id).unwrap();
    assert_eq!(record.school_code, "GPS001");
    assert_eq!(record.estimated_cost, 313.39);
    assert_eq!(reopened.records_between(day(1), day(31)).len(), 2);
    assert_eq!(reopened.total_meals_served(day(1), day(31)), 239);
}

#[test]
fn test_duplicate_and_suspended_days_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");

    let mut registry = MealRegistry::open(JsonFileStore::new(&path), RateTable::default()).unwrap();
    registry
        .add_school(School::new("ZPD001", "Zilla Parishad School Dehu", 420))
        .unwrap();
    registry
        .add_holiday(Holiday::new(day(17), "Ashadhi Ekadashi", HolidayKind::Religious, false))
        .unwrap();

    registry
        .add_record(meal("ZPD001", "moong_usal", day(16), 380))
        .unwrap();
    assert!(matches!(
        registry.add_record(meal("ZPD001", "moong_usal", day(16), 390)),
        Err(MealError::DuplicateRecord { .. })
    ));
    assert!(matches!(
        registry.add_record(meal("ZPD001", "moong_usal", day(17), 390)),
        Err(MealError::MealServiceSuspended(_))
    ));
    assert!(matches!(
        registry.add_record(meal("NOPE01", "moong_usal", day(18), 10)),
        Err(MealError::SchoolNotFound(_))
    ));
}

#[test]
fn test_update_reprices_and_delete_removes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");
    let mut store = JsonFileStore::new(&path);
    store.save(&demo_database()).unwrap();

    let mut registry = MealRegistry::open(JsonFileStore::new(&path), RateTable::default()).unwrap();
    let id = registry
        .add_record(meal("MSA001", "masale_bhat", day(3), 100))
        .unwrap()
        .id;

    let update = MealRecordUpdate {
        students_present: Some(121),
        ..MealRecordUpdate::default()
    };
    let updated = registry.update_record(id, update).unwrap();
    assert_eq!(updated.estimated_cost, 313.39);
    assert_eq!(updated.meals_served, 100);

    registry.delete_record(id).unwrap();
    assert!(registry.record(id).is_none());
    assert!(matches!(
        registry.delete_record(id),
        Err(MealError::RecordNotFound(_))
    ));
}

#[test]
fn test_school_scoped_report_and_csv() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");
    let mut store = JsonFileStore::new(&path);
    store.save(&demo_database()).unwrap();

    let mut registry = MealRegistry::open(JsonFileStore::new(&path), RateTable::default()).unwrap();
    registry
        .add_record(meal("GPS001", "varan_bhat", day(8), 300))
        .unwrap();
    registry
        .add_record(meal("GHS001", "varan_bhat", day(8), 600))
        .unwrap();

    let teacher = AccessContext::new(Role::Teacher, Some("GPS001")).unwrap();
    assert!(teacher.can(Capability::ViewSchoolReports));
    assert!(!teacher.can(Capability::ViewSystemReports));

    let report = scoped_period_report(&registry, &teacher, day(1), day(31)).unwrap();
    assert_eq!(report.schools.len(), 1);
    assert_eq!(report.meals_served, 300);
    assert_eq!(report.reporting_schools(), 1);

    let mut out = Vec::new();
    write_report_csv(&report, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains("GPS001"));
    assert!(!text.contains("GHS001"));
}

#[test]
fn test_planned_menus_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");
    let mut store = JsonFileStore::new(&path);
    store.save(&demo_database()).unwrap();

    let mut registry = MealRegistry::open(JsonFileStore::new(&path), RateTable::default()).unwrap();
    let plan = |date, template: &str| NewMenuPlan {
        date,
        meal_type: MealType::Lunch,
        template_id: template.to_string(),
        description: None,
        description_marathi: Some("वरण भात".to_string()),
    };
    let kept = registry.add_menu(plan(day(22), "Varan Bhat")).unwrap().id;
    let dropped = registry.add_menu(plan(day(23), "matki_usal")).unwrap().id;
    registry.deactivate_menu(dropped).unwrap();
    assert!(registry.commit().unwrap());

    let reopened = MealRegistry::open(JsonFileStore::new(&path), RateTable::default()).unwrap();
    let lunch = reopened.menu_on(day(22), MealType::Lunch).unwrap();
    assert_eq!(lunch.id, kept);
    assert_eq!(lunch.template_id, "varan_bhat");
    assert!(reopened.menu_on(day(23), MealType::Lunch).is_none());
    assert_eq!(reopened.menus_this_week(day(24)).len(), 1);
    assert_eq!(reopened.all_menus().len(), 2);
}

#[test]
fn test_scoped_user_cannot_touch_other_school() {
    let cook = AccessContext::new(Role::Cook, Some("GPS001")).unwrap();
    assert!(cook.require(Capability::RecordMeals).is_err());

    let teacher = AccessContext::new(Role::Teacher, Some("GPS001")).unwrap();
    assert!(teacher.require_school("gps001").is_ok());
    assert!(matches!(
        teacher.require_school("ZPD001"),
        Err(MealError::PermissionDenied(_))
    ));

    assert!(AccessContext::new(Role::Supervisor, None).is_err());
    assert!(AccessContext::admin().covers_school("ZPD001"));
}

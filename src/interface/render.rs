use crate::models::{
    ComputedRequirement, GradeBand, Holiday, MealRecord, MealTemplate, MenuPlan, School,
    StaffMember,
};
use crate::planner::constants::LOW_ATTENDANCE_PERCENT;
use crate::report::PeriodReport;

/// Display ingredient totals and cost for one planned meal.
pub fn display_requirement(
    template: &MealTemplate,
    band: GradeBand,
    students: i64,
    requirement: &ComputedRequirement,
) {
    println!();
    println!("=== {} - grades {}, {} students ===", template.name, band, students);
    println!();

    let rows: Vec<_> = requirement.nonzero().collect();
    if rows.is_empty() {
        println!("  (no ingredients needed)");
    }

    let width = rows.iter().map(|(i, _)| i.as_str().len()).max().unwrap_or(10);
    for (ingredient, kg) in &rows {
        println!("  {:<width$}  {:>9.2} kg", ingredient.as_str(), kg, width = width);
    }

    println!();
    println!("Total weight: {:.2} kg", requirement.total_kilograms());
    println!("Estimated cost: {:.2}", requirement.estimated_cost);
    println!();
}

/// Display the predefined template catalogue.
pub fn display_templates(templates: &[MealTemplate]) {
    println!();
    println!("=== Meal Templates ({} items) ===", templates.len());
    println!();

    let width = templates.iter().map(|t| t.id.len()).max().unwrap_or(10);
    for t in templates {
        let marathi = t.name_marathi.as_deref().unwrap_or("");
        println!("  {:<width$}  {} {}", t.id, t.name, marathi, width = width);
    }
    println!();
}

/// Display meal records in a table.
pub fn display_records(records: &[&MealRecord]) {
    if records.is_empty() {
        println!("No meal records found.");
        return;
    }

    println!();
    println!(
        "{:>5}  {:<10}  {:<10}  {:<18}  {:>5}  {:>7}  {:>6}  {:>9}  {}",
        "id", "date", "school", "menu", "band", "present", "served", "cost", "quality"
    );
    for r in records {
        let quality = r.meal_quality.map(|q| q.to_string()).unwrap_or_default();
        println!(
            "{:>5}  {:<10}  {:<10}  {:<18}  {:>5}  {:>7}  {:>6}  {:>9.2}  {}",
            r.id,
            r.date,
            r.school_code,
            r.template_id,
            r.grade_band,
            r.students_present,
            r.meals_served,
            r.estimated_cost,
            quality
        );
    }

    let total: f64 = records.iter().map(|r| r.estimated_cost).sum();
    println!();
    println!("Records: {}  Total cost: {:.2}", records.len(), total);
    println!();
}

/// Display a list of schools.
pub fn display_schools(schools: &[&School]) {
    if schools.is_empty() {
        println!("Schools: (none)");
        return;
    }

    println!();
    println!("=== Schools ({} items) ===", schools.len());
    println!();
    for s in schools {
        let city = s.city.as_deref().unwrap_or("-");
        let status = if s.active { "" } else { "  [inactive]" };
        println!(
            "  {:<10} {} ({}) - {} students{}",
            s.code, s.name, city, s.total_students, status
        );
    }
    println!();
}

/// Display staff members.
pub fn display_staff(staff: &[&StaffMember]) {
    if staff.is_empty() {
        println!("Staff: (none)");
        return;
    }

    println!();
    for m in staff {
        let school = m.school_code.as_deref().unwrap_or("-");
        let status = if m.active { "" } else { "  [inactive]" };
        println!(
            "  {:<18} {:<24} {:<20} {}{}",
            m.username, m.full_name, m.role, school, status
        );
    }
    println!();
}

/// Display holidays.
pub fn display_holidays(holidays: &[&Holiday]) {
    if holidays.is_empty() {
        println!("Holidays: (none)");
        return;
    }

    println!();
    for h in holidays {
        let service = if h.meal_service { "meals served" } else { "meals suspended" };
        println!("  {}  {:<28} {:?}, {}", h.date, h.name, h.kind, service);
    }
    println!();
}

/// Display planned menus.
pub fn display_menus(menus: &[&MenuPlan]) {
    if menus.is_empty() {
        println!("Menus: (none)");
        return;
    }

    println!();
    for m in menus {
        let status = if m.active { "" } else { "  [inactive]" };
        let note = m
            .description_marathi
            .as_deref()
            .or(m.description.as_deref())
            .unwrap_or("");
        println!(
            "  #{:<4} {}  {:<9} {:<18} {}{}",
            m.id, m.date, m.meal_type, m.template_id, note, status
        );
    }
    println!();
}

/// Display a period report.
pub fn display_report(report: &PeriodReport) {
    println!();
    println!("=== Report {} to {} ===", report.from, report.to);
    println!();

    for s in &report.schools {
        let attendance = match s.attendance_percent {
            Some(p) if p < LOW_ATTENDANCE_PERCENT => format!("{:.1}% [low]", p),
            Some(p) => format!("{:.1}%", p),
            None => "-".to_string(),
        };
        println!(
            "  {:<10} {:<36} days {:>3}  served {:>6}  attendance {:>12}  cost {:>10.2}",
            s.school_code, s.school_name, s.meal_days, s.meals_served, attendance, s.estimated_cost
        );
    }

    println!();
    println!("--- Summary ---");
    println!("Schools reporting: {}/{}", report.reporting_schools(), report.schools.len());
    println!("Records: {}", report.records);
    println!("Meal days: {}", report.meal_days);
    println!("Meals served: {}", report.meals_served);
    println!("Students present: {}", report.students_present);
    println!("Estimated cost: {:.2}", report.estimated_cost);
    println!();
}

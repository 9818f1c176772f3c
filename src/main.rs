use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use midday_meal_rs::access::{AccessContext, Capability};
use midday_meal_rs::cli::{
    CalcArgs, Cli, Command, HolidayCommand, MenuCommand, RecordAddArgs, RecordCommand,
    SchoolCommand, StaffCommand, StrategyArg,
};
use midday_meal_rs::config::{Config, DEFAULT_CONFIG_TOML};
use midday_meal_rs::error::{MealError, Result};
use midday_meal_rs::interface::{
    display_holidays, display_menus, display_records, display_report, display_requirement,
    display_schools, display_staff, display_templates, prompt_count, prompt_grade_band,
    prompt_optional, prompt_quality, prompt_school, prompt_template, prompt_yes_no,
};
use midday_meal_rs::models::{
    AttendanceInput, Holiday, IngredientProfile, MealRecordUpdate, MealTemplate, MealType,
    MenuPlanUpdate, NewMealRecord, NewMenuPlan, School, StaffMember,
};
use midday_meal_rs::planner::{
    compute_requirement, require_template, CostStrategy, TEMPLATE_CATALOGUE,
};
use midday_meal_rs::report::{scoped_period_report, write_report_csv};
use midday_meal_rs::state::{demo_database, Database, JsonFileStore, MealRegistry, MealStore};

type Registry = MealRegistry<JsonFileStore>;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;
    let data_file = cli.data.clone().unwrap_or_else(|| config.data_file.clone());
    let ctx = AccessContext::new(cli.role, cli.school.as_deref())?;
    debug!(role = ?ctx.role(), school = ?ctx.school_code(), "resolved access context");

    let open = || MealRegistry::open(JsonFileStore::new(&data_file), config.rates);

    match cli.command {
        Command::Calc(args) => cmd_calc(&ctx, &config, args),
        Command::Templates => {
            display_templates(&TEMPLATE_CATALOGUE);
            Ok(())
        }
        Command::Init { demo, force } => cmd_init(&cli.config, &data_file, demo, force),
        Command::School(cmd) => with_registry(open()?, |reg| cmd_school(&ctx, reg, cmd)),
        Command::Staff(cmd) => with_registry(open()?, |reg| cmd_staff(&ctx, reg, cmd)),
        Command::Holiday(cmd) => with_registry(open()?, |reg| cmd_holiday(&ctx, reg, cmd)),
        Command::Menu(cmd) => with_registry(open()?, |reg| cmd_menu(&ctx, reg, cmd)),
        Command::Record(cmd) => with_registry(open()?, |reg| cmd_record(&ctx, reg, cmd)),
        Command::Report { from, to, csv } => cmd_report(&ctx, &open()?, from, to, csv),
    }
}

/// Run a command against the data file and save whatever it changed.
fn with_registry<F>(mut registry: Registry, command: F) -> Result<()>
where
    F: FnOnce(&mut Registry) -> Result<()>,
{
    command(&mut registry)?;
    if registry.commit()? {
        println!("Saved {}.", registry.store().path().display());
    }
    Ok(())
}

/// Compute requirements for a predefined or custom meal.
fn cmd_calc(ctx: &AccessContext, config: &Config, args: CalcArgs) -> Result<()> {
    ctx.require(Capability::PlanMeals)?;

    let template = match (&args.template, &args.custom) {
        (Some(query), _) => require_template(query)?.clone(),
        (None, Some(pairs)) => {
            MealTemplate::custom("Custom meal", IngredientProfile::parse_pairs(pairs)?)
        }
        (None, None) => {
            return Err(MealError::InvalidInput(
                "pass --template or --custom".to_string(),
            ));
        }
    };

    let strategy = match args.strategy {
        Some(s) => s,
        None if template.is_custom() => StrategyArg::Itemized,
        None => StrategyArg::Fixed,
    };
    let strategy = match strategy {
        StrategyArg::Fixed => CostStrategy::FixedRate(&config.rates),
        StrategyArg::Itemized => CostStrategy::Itemized(&config.cost_per_kg),
    };

    let input = AttendanceInput::new(args.date.unwrap_or_else(today), args.band, args.students);
    info!(date = %input.date, template = %template.id, "planning meal");
    let requirement =
        compute_requirement(&template, input.grade_band, input.student_count, strategy)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&requirement)?);
    } else {
        display_requirement(&template, input.grade_band, input.student_count, &requirement);
    }
    Ok(())
}

/// Write the default config and a data file.
fn cmd_init(config_path: &Path, data_file: &Path, demo: bool, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        println!("{} already exists, leaving it alone.", config_path.display());
    } else {
        fs::write(config_path, DEFAULT_CONFIG_TOML)?;
        println!("Wrote {}.", config_path.display());
    }

    let mut store = JsonFileStore::new(data_file);
    if store.exists() && !force {
        println!("{} already exists, leaving it alone.", data_file.display());
        return Ok(());
    }

    let db = if demo { demo_database() } else { Database::default() };
    store.save(&db)?;
    println!(
        "Wrote {} ({} schools, {} holidays).",
        data_file.display(),
        db.schools.len(),
        db.holidays.len()
    );
    Ok(())
}

fn cmd_school(ctx: &AccessContext, registry: &mut Registry, cmd: SchoolCommand) -> Result<()> {
    match cmd {
        SchoolCommand::Add {
            code,
            name,
            students,
            address,
            city,
            state,
            pincode,
            phone,
            email,
            principal,
        } => {
            ctx.require(Capability::ManageSchools)?;
            let mut school = School::new(&code, &name, students);
            school.address = address;
            school.city = city;
            school.state = state;
            school.pincode = pincode;
            school.phone = phone;
            school.email = email;
            school.principal_name = principal;
            registry.add_school(school)?;
            println!("Added school {}.", code);
        }
        SchoolCommand::List { all } => {
            let schools: Vec<&School> = registry
                .schools(all)
                .into_iter()
                .filter(|s| ctx.covers_school(&s.code))
                .collect();
            display_schools(&schools);
        }
        SchoolCommand::Deactivate { code } => {
            ctx.require(Capability::ManageSchools)?;
            registry.deactivate_school(&code)?;
            println!("Deactivated school {}.", code);
        }
    }
    Ok(())
}

fn cmd_staff(ctx: &AccessContext, registry: &mut Registry, cmd: StaffCommand) -> Result<()> {
    ctx.require(Capability::ManageStaff)?;

    match cmd {
        StaffCommand::Add {
            username,
            name,
            staff_role,
            at_school,
            email,
            phone,
        } => {
            let mut member = StaffMember::new(&username, &name, staff_role, at_school.as_deref());
            member.email = email;
            member.phone = phone;
            registry.add_staff(member)?;
            println!("Added {} ({}).", username, staff_role);
        }
        StaffCommand::List { at_school } => display_staff(&registry.staff(at_school.as_deref())),
        StaffCommand::Deactivate { username } => {
            registry.deactivate_staff(&username)?;
            println!("Deactivated {}.", username);
        }
    }
    Ok(())
}

fn cmd_holiday(ctx: &AccessContext, registry: &mut Registry, cmd: HolidayCommand) -> Result<()> {
    match cmd {
        HolidayCommand::Add {
            date,
            name,
            name_marathi,
            kind,
            description,
            meal_service,
        } => {
            ctx.require(Capability::ManageHolidays)?;
            let mut holiday = Holiday::new(date, &name, kind, meal_service);
            holiday.name_marathi = name_marathi;
            holiday.description = description;
            registry.add_holiday(holiday)?;
            println!("Added holiday {} on {}.", name, date);
        }
        HolidayCommand::List { year } => display_holidays(&registry.holidays(year)),
    }
    Ok(())
}

fn cmd_menu(ctx: &AccessContext, registry: &mut Registry, cmd: MenuCommand) -> Result<()> {
    match cmd {
        MenuCommand::Add {
            date,
            meal_type,
            template,
            description,
            description_marathi,
        } => {
            ctx.require(Capability::ManageMenus)?;
            let plan = registry.add_menu(NewMenuPlan {
                date,
                meal_type,
                template_id: template,
                description,
                description_marathi,
            })?;
            println!(
                "Planned menu {}: {} {} on {}.",
                plan.id, plan.template_id, plan.meal_type, plan.date
            );
        }
        MenuCommand::List {
            week,
            from,
            to,
            all,
        } => {
            let now = today();
            let menus = if week {
                registry.menus_this_week(now)
            } else if all {
                registry.all_menus()
            } else if from.is_none() && to.is_none() {
                registry.menus_for_month(now.year(), now.month())
            } else {
                let from = from.unwrap_or(NaiveDate::MIN);
                let to = to.unwrap_or(NaiveDate::MAX);
                registry.menus_between(from, to)
            };
            display_menus(&menus);
        }
        MenuCommand::Update {
            id,
            date,
            meal_type,
            template,
            description,
            description_marathi,
        } => {
            ctx.require(Capability::ManageMenus)?;
            let update = MenuPlanUpdate {
                date,
                meal_type,
                template_id: template,
                description,
                description_marathi,
            };
            let plan = registry.update_menu(id, update)?;
            println!(
                "Updated menu {}: {} {} on {}.",
                plan.id, plan.template_id, plan.meal_type, plan.date
            );
        }
        MenuCommand::Deactivate { id } => {
            ctx.require(Capability::ManageMenus)?;
            registry.deactivate_menu(id)?;
            println!("Deactivated menu {}.", id);
        }
    }
    Ok(())
}

fn cmd_record(ctx: &AccessContext, registry: &mut Registry, cmd: RecordCommand) -> Result<()> {
    match cmd {
        RecordCommand::Add(args) => cmd_record_add(ctx, registry, args),
        RecordCommand::List {
            today: only_today,
            week,
            from,
            to,
            at_school,
        } => {
            ctx.require(Capability::ViewRecords)?;
            if let Some(code) = at_school.as_deref() {
                ctx.require_school(code)?;
            }

            let now = today();
            let records = if only_today {
                registry.records_on(now)
            } else if week {
                registry.records_this_week(now)
            } else if from.is_none() && to.is_none() && at_school.is_none() {
                registry.records()
            } else {
                let from = from.unwrap_or(NaiveDate::MIN);
                let to = to.unwrap_or(NaiveDate::MAX);
                match at_school.as_deref() {
                    Some(code) => registry.records_for_school(code, from, to),
                    None => registry.records_between(from, to),
                }
            };

            let records: Vec<_> = ctx
                .visible(records)
                .into_iter()
                .filter(|r| {
                    at_school
                        .as_deref()
                        .is_none_or(|c| r.school_code.eq_ignore_ascii_case(c))
                })
                .collect();
            display_records(&records);
            Ok(())
        }
        RecordCommand::Update {
            id,
            present,
            served,
            teacher,
            remarks,
            quality,
        } => {
            ctx.require(Capability::RecordMeals)?;
            let record = registry.record(id).ok_or(MealError::RecordNotFound(id))?;
            ctx.require_school(&record.school_code)?;

            let update = MealRecordUpdate {
                students_present: present,
                meals_served: served,
                teacher_in_charge: teacher,
                remarks,
                meal_quality: quality,
            };
            let record = registry.update_record(id, update)?;
            println!("Updated record {} (cost {:.2}).", record.id, record.estimated_cost);
            Ok(())
        }
        RecordCommand::Delete { id } => {
            ctx.require(Capability::RecordMeals)?;
            let record = registry.record(id).ok_or(MealError::RecordNotFound(id))?;
            ctx.require_school(&record.school_code)?;
            registry.delete_record(id)?;
            println!("Deleted record {}.", id);
            Ok(())
        }
    }
}

/// Record a meal, prompting for whatever the flags left out.
fn cmd_record_add(
    ctx: &AccessContext,
    registry: &mut Registry,
    args: RecordAddArgs,
) -> Result<()> {
    ctx.require(Capability::RecordMeals)?;

    let date = args.date.unwrap_or_else(today);
    let planned = registry
        .menu_on(date, MealType::Lunch)
        .map(|m| m.template_id.clone());
    let interactive = !args.no_input && !args.is_complete(planned.is_some());

    let school_code = match (args.at_school.as_deref(), ctx.school_code()) {
        (Some(code), _) => code.to_string(),
        (None, Some(own)) => own.to_string(),
        (None, None) if interactive => prompt_school(&registry.schools(false))?.code.clone(),
        (None, None) => return Err(missing("--at")),
    };
    ctx.require_school(&school_code)?;

    let template_id = match (args.template, planned) {
        (Some(t), _) => t,
        (None, Some(t)) => {
            println!("Using the planned lunch for {}: {}", date, t);
            t
        }
        (None, None) if interactive => prompt_template()?,
        (None, None) => return Err(missing("--template")),
    };
    let grade_band = match args.band {
        Some(b) => b,
        None if interactive => prompt_grade_band()?,
        None => return Err(missing("--band")),
    };
    let students_present = match args.present {
        Some(n) => n,
        None if interactive => prompt_count("Students present", None)?,
        None => return Err(missing("--present")),
    };
    let meals_served = match args.served {
        Some(n) => n,
        None if interactive => prompt_count("Meals served", Some(students_present))?,
        None => return Err(missing("--served")),
    };

    let (teacher_in_charge, remarks, meal_quality) = if interactive {
        (
            args.teacher.map_or_else(|| prompt_optional("Teacher in charge"), |t| Ok(Some(t)))?,
            args.remarks.map_or_else(|| prompt_optional("Remarks"), |r| Ok(Some(r)))?,
            args.quality.map_or_else(prompt_quality, |q| Ok(Some(q)))?,
        )
    } else {
        (args.teacher, args.remarks, args.quality)
    };

    let new = NewMealRecord {
        school_code,
        template_id,
        date,
        grade_band,
        students_present,
        meals_served,
        teacher_in_charge,
        remarks,
        meal_quality,
    };

    if interactive && !prompt_yes_no("Save meal record?", true)? {
        println!("Discarded.");
        return Ok(());
    }

    let record = registry.add_record(new)?;
    println!(
        "Recorded meal {} for {} on {} (cost {:.2}).",
        record.id, record.school_code, record.date, record.estimated_cost
    );
    Ok(())
}

fn missing(flag: &str) -> MealError {
    MealError::InvalidInput(format!("{} is required with --no-input", flag))
}

fn cmd_report(
    ctx: &AccessContext,
    registry: &Registry,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    csv: Option<PathBuf>,
) -> Result<()> {
    let to = to.unwrap_or_else(today);
    let from = from.unwrap_or_else(|| to.with_day(1).unwrap_or(to));

    let report = scoped_period_report(registry, ctx, from, to)?;
    display_report(&report);

    if let Some(path) = csv {
        let file = fs::File::create(&path)?;
        write_report_csv(&report, file)?;
        println!("Wrote {}.", path.display());
    }
    Ok(())
}

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::models::{GradeBand, HolidayKind, MealQuality, MealType, Role};

/// Mid-day meal administration: plan meal requirements, record attendance, and report.
#[derive(Parser, Debug)]
#[command(name = "midday_meal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the data file (overrides `data_file` in the config).
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,

    /// Path to the TOML config file.
    #[arg(short, long, global = true, default_value = "midday.toml")]
    pub config: PathBuf,

    /// Role to act as.
    #[arg(long, global = true, default_value = "admin")]
    pub role: Role,

    /// School the acting user belongs to (required for non-admin roles).
    #[arg(long, global = true)]
    pub school: Option<String>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute ingredient quantities and cost for a meal.
    Calc(CalcArgs),

    /// List predefined meal templates.
    Templates,

    /// Write a default config and an empty data file.
    Init {
        /// Seed a few sample schools and holidays.
        #[arg(long)]
        demo: bool,

        /// Overwrite existing files.
        #[arg(long)]
        force: bool,
    },

    /// Manage schools.
    #[command(subcommand)]
    School(SchoolCommand),

    /// Manage staff accounts.
    #[command(subcommand)]
    Staff(StaffCommand),

    /// Manage holidays.
    #[command(subcommand)]
    Holiday(HolidayCommand),

    /// Plan dated menus.
    #[command(subcommand)]
    Menu(MenuCommand),

    /// Record and review daily meal service.
    #[command(subcommand)]
    Record(RecordCommand),

    /// Summarize meal service over a period.
    Report {
        /// First day of the period (default: first of this month).
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day of the period (default: today).
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Also write per-school rows to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Government subsidy rate times headcount.
    Fixed,
    /// Ingredient quantities times market price.
    Itemized,
}

#[derive(Args, Debug)]
pub struct CalcArgs {
    /// Predefined template id or name.
    #[arg(long, conflicts_with = "custom", required_unless_present = "custom")]
    pub template: Option<String>,

    /// Custom ingredient profile in grams per student, e.g. `rice=100,oil=5`.
    #[arg(long)]
    pub custom: Option<String>,

    /// Grade band: 1-5, 6-8 or both.
    #[arg(long, default_value = "1-5")]
    pub band: GradeBand,

    /// Number of students.
    #[arg(long, allow_negative_numbers = true)]
    pub students: i64,

    /// Date of the meal (default: today).
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Cost strategy (default: fixed for templates, itemized for custom).
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum SchoolCommand {
    /// Register a school.
    Add {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        /// Enrolled students.
        #[arg(long, default_value_t = 0)]
        students: u32,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        pincode: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        principal: Option<String>,
    },

    /// List schools.
    List {
        /// Include inactive schools.
        #[arg(long)]
        all: bool,
    },

    /// Mark a school inactive.
    Deactivate { code: String },
}

#[derive(Subcommand, Debug)]
pub enum StaffCommand {
    /// Add a staff account.
    Add {
        #[arg(long)]
        username: String,
        #[arg(long)]
        name: String,
        #[arg(long = "staff-role")]
        staff_role: Role,
        /// School the account belongs to.
        #[arg(long = "at")]
        at_school: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },

    /// List staff, optionally for one school.
    List {
        #[arg(long = "at")]
        at_school: Option<String>,
    },

    /// Disable a staff account.
    Deactivate { username: String },
}

#[derive(Subcommand, Debug)]
pub enum HolidayCommand {
    /// Add a holiday.
    Add {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        name: String,
        #[arg(long)]
        name_marathi: Option<String>,
        /// national, religious or local.
        #[arg(long, default_value = "national")]
        kind: HolidayKind,
        #[arg(long)]
        description: Option<String>,
        /// Meals are still served on this day.
        #[arg(long)]
        meal_service: bool,
    },

    /// List holidays.
    List {
        #[arg(long)]
        year: Option<i32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum MenuCommand {
    /// Schedule a catalogue dish for a date.
    Add {
        #[arg(long)]
        date: NaiveDate,
        /// breakfast, lunch, snack or dinner.
        #[arg(long = "meal", default_value = "lunch")]
        meal_type: MealType,
        /// Template id or name.
        #[arg(long)]
        template: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        description_marathi: Option<String>,
    },

    /// List planned menus (default: this month).
    List {
        /// Only this week's menus (Monday to Sunday).
        #[arg(long, conflicts_with_all = ["from", "to", "all"])]
        week: bool,

        #[arg(long)]
        from: Option<NaiveDate>,

        #[arg(long)]
        to: Option<NaiveDate>,

        /// Every menu ever planned, including deactivated ones.
        #[arg(long, conflicts_with_all = ["from", "to"])]
        all: bool,
    },

    /// Change a planned menu.
    Update {
        id: u64,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long = "meal")]
        meal_type: Option<MealType>,
        #[arg(long)]
        template: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        description_marathi: Option<String>,
    },

    /// Withdraw a planned menu.
    Deactivate { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum RecordCommand {
    /// Record a day's meal service. Missing fields are prompted for.
    Add(RecordAddArgs),

    /// List meal records.
    List {
        /// Only today's records.
        #[arg(long, conflicts_with_all = ["week", "from", "to"])]
        today: bool,

        /// Only this week's records (Monday to Sunday).
        #[arg(long, conflicts_with_all = ["from", "to"])]
        week: bool,

        #[arg(long)]
        from: Option<NaiveDate>,

        #[arg(long)]
        to: Option<NaiveDate>,

        /// Limit to one school.
        #[arg(long = "at")]
        at_school: Option<String>,
    },

    /// Change counts or notes on a record.
    Update {
        id: u64,
        #[arg(long)]
        present: Option<u32>,
        #[arg(long)]
        served: Option<u32>,
        #[arg(long)]
        teacher: Option<String>,
        #[arg(long)]
        remarks: Option<String>,
        #[arg(long)]
        quality: Option<MealQuality>,
    },

    /// Delete a record.
    Delete { id: u64 },
}

#[derive(Args, Debug, Default)]
pub struct RecordAddArgs {
    /// School code (defaults to the acting user's school).
    #[arg(long = "at")]
    pub at_school: Option<String>,

    /// Template id or name.
    #[arg(long)]
    pub template: Option<String>,

    #[arg(long)]
    pub band: Option<GradeBand>,

    #[arg(long)]
    pub present: Option<u32>,

    #[arg(long)]
    pub served: Option<u32>,

    /// Date of service (default: today).
    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long)]
    pub teacher: Option<String>,

    #[arg(long)]
    pub remarks: Option<String>,

    #[arg(long)]
    pub quality: Option<MealQuality>,

    /// Never prompt; fail if a required field is missing.
    #[arg(long)]
    pub no_input: bool,
}

impl RecordAddArgs {
    /// Whether every required field came from flags. A lunch menu planned
    /// for the date stands in for `--template`.
    pub fn is_complete(&self, lunch_planned: bool) -> bool {
        (self.template.is_some() || lunch_planned)
            && self.band.is_some()
            && self.present.is_some()
            && self.served.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn args(line: &str) -> Vec<&str> {
        line.split_whitespace().collect()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_calc_accepts_negative_students() {
        let line = "midday_meal calc --template varan_bhat --students -3";
        let cli = Cli::try_parse_from(args(line)).unwrap();
        match cli.command {
            Command::Calc(calc) => assert_eq!(calc.students, -3),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_calc_requires_template_or_custom() {
        assert!(Cli::try_parse_from(args("midday_meal calc --students 10")).is_err());

        let line = "midday_meal calc --template x --custom rice=1 --students 1";
        assert!(Cli::try_parse_from(args(line)).is_err());
    }

    #[test]
    fn test_global_role_and_school() {
        let line = "midday_meal record list --today --role teacher --school GPS001";
        let cli = Cli::try_parse_from(args(line)).unwrap();
        assert_eq!(cli.role, Role::Teacher);
        assert_eq!(cli.school.as_deref(), Some("GPS001"));
    }

    #[test]
    fn test_menu_add_defaults_to_lunch() {
        let line = "midday_meal menu add --date 2024-07-01 --template matki_usal";
        let cli = Cli::try_parse_from(args(line)).unwrap();
        match cli.command {
            Command::Menu(MenuCommand::Add { meal_type, date, .. }) => {
                assert_eq!(meal_type, MealType::Lunch);
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

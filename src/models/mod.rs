mod grade;
mod holiday;
mod ingredient;
mod menu;
mod record;
mod requirement;
mod school;
mod staff;
mod template;

pub use grade::GradeBand;
pub use holiday::{Holiday, HolidayKind};
pub use ingredient::{Ingredient, IngredientProfile};
pub use menu::{MealType, MenuPlan, MenuPlanUpdate, NewMenuPlan};
pub use record::{MealQuality, MealRecord, MealRecordUpdate, NewMealRecord};
pub use requirement::{AttendanceInput, ComputedRequirement};
pub use school::School;
pub use staff::{Role, StaffMember};
pub use template::{MealTemplate, TemplateProfiles};

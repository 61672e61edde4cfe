pub mod prompts;
pub mod render;

pub use prompts::{confirm_destructive, prompt_yes_no, resolve_food};
pub use render::{
    display_daily_totals, display_food_list, display_limits, display_optimization_report,
    display_plan,
};

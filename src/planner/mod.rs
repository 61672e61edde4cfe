pub mod alternatives;
pub mod constants;
pub mod optimizer;
pub mod ordering;
pub mod totals;

pub use alternatives::{
    add_alternative, add_item, remove_alternative, remove_item, switch_alternative,
    update_quantity,
};
pub use constants::*;
pub use optimizer::{
    effective_limits, optimize, scale_quantities, OptimizationReport, OptimizerConfig,
    ScaleOutcome,
};
pub use ordering::reorder;
pub use totals::{
    active_totals, alternative_totals, daily_overview, daily_totals, exceeds_limits, DailyRow,
    LimitBreaches, Totals,
};

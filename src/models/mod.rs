mod food;
mod ids;
mod nutrients;
mod plan;

pub use food::{Food, FoodId, NewFood};
pub use ids::{IdSource, ItemId, SequentialIds};
pub use nutrients::{round2, Macro, Nutrients};
pub use plan::{
    parse_quantity, validate_quantity, Alternative, MacroLimits, MealItem, MealPlan, MealSlot,
    PlanDocument, SlotState,
};

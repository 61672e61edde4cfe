mod catalog;
mod manager;
mod persistence;

pub use catalog::{FoodCatalog, InMemoryCatalog};
pub use manager::PlanManager;
pub use persistence::{
    export_plan, import_plan, load_catalog, load_optimizer_config, load_plan, save_catalog,
    save_plan, ImportedPlan, PLAN_FORMAT_VERSION,
};

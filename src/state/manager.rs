use tracing::{info, warn};

use crate::error::{PlanError, Result};
use crate::models::{
    FoodId, IdSource, ItemId, Macro, MacroLimits, MealPlan, MealSlot, PlanDocument, SequentialIds,
};
use crate::planner::{self, OptimizationReport, OptimizerConfig};
use crate::state::persistence::ImportedPlan;
use crate::state::FoodCatalog;

/// Owns one open plan document and the id source for its items.
///
/// Every mutation takes `&mut self`, so callers sharing a plan have to
/// serialize access through whoever owns the manager.
#[derive(Debug)]
pub struct PlanManager<I: IdSource = SequentialIds> {
    doc: PlanDocument,
    ids: I,
}

impl PlanManager<SequentialIds> {
    /// Manage `doc`, handing out ids from its first free id on. Ids of
    /// items removed in earlier sessions stay retired as long as the
    /// document carries its mark.
    pub fn new(mut doc: PlanDocument) -> Self {
        doc.next_item_id = doc.first_free_id();
        let ids = SequentialIds::starting_at(doc.next_item_id);
        Self { doc, ids }
    }

    /// Replace the whole document with an imported plan.
    ///
    /// Limits set in the file override the current ones; limits the file
    /// leaves unset keep their current value.
    pub fn replace_with(&mut self, imported: ImportedPlan) {
        let mut limits = self.doc.limits;
        if let Some(file_limits) = &imported.limits {
            limits.merge(file_limits);
        }
        let retired = self.doc.first_free_id();
        self.doc = PlanDocument {
            plan: imported.plan,
            limits,
            notes: imported.notes,
            next_item_id: imported.next_item_id.max(retired),
        };
        self.doc.next_item_id = self.doc.first_free_id();
        self.ids = SequentialIds::starting_at(self.doc.next_item_id);
        info!(version = %imported.version, rekeyed = imported.rekeyed, "imported plan");
    }
}

impl<I: IdSource> PlanManager<I> {
    /// Manage `doc` with a caller-provided id source. The source must not
    /// produce ids already present in `doc`.
    pub fn with_ids(doc: PlanDocument, ids: I) -> Self {
        Self { doc, ids }
    }

    pub fn document(&self) -> &PlanDocument {
        &self.doc
    }

    pub fn plan(&self) -> &MealPlan {
        &self.doc.plan
    }

    pub fn limits(&self) -> &MacroLimits {
        &self.doc.limits
    }

    pub fn notes(&self) -> &str {
        &self.doc.notes
    }

    pub fn into_document(self) -> PlanDocument {
        self.doc
    }

    /// Add `quantity` grams of catalog food `food_id` to alternative `alt`
    /// of `slot`.
    pub fn add_food(
        &mut self,
        slot: MealSlot,
        alt: usize,
        food_id: FoodId,
        quantity: f64,
        catalog: &impl FoodCatalog,
    ) -> Result<ItemId> {
        let food = catalog
            .food(food_id)
            .ok_or(PlanError::FoodNotFound(food_id))?;
        let plan = &mut self.doc.plan;
        let id = planner::add_item(plan, slot, alt, food, quantity, &mut self.ids)
            .inspect_err(|e| warn!(%slot, alt, error = %e, "add food rejected"))?;
        self.record_issued_ids();
        Ok(id)
    }

    pub fn update_quantity(
        &mut self,
        slot: MealSlot,
        alt: usize,
        item: ItemId,
        quantity: f64,
        catalog: &impl FoodCatalog,
    ) -> Result<bool> {
        planner::update_quantity(&mut self.doc.plan, slot, alt, item, quantity, catalog)
            .inspect_err(|e| warn!(%slot, alt, %item, error = %e, "quantity update rejected"))
    }

    pub fn remove_item(&mut self, slot: MealSlot, alt: usize, item: ItemId) -> bool {
        planner::remove_item(&mut self.doc.plan, slot, alt, item)
    }

    pub fn add_alternative(&mut self, slot: MealSlot) -> usize {
        let index = planner::add_alternative(&mut self.doc.plan, slot, &mut self.ids);
        self.record_issued_ids();
        index
    }

    pub fn remove_alternative(&mut self, slot: MealSlot, index: usize) -> Result<()> {
        planner::remove_alternative(&mut self.doc.plan, slot, index)
            .inspect_err(|e| warn!(%slot, index, error = %e, "remove alternative rejected"))
    }

    pub fn switch_alternative(&mut self, index: usize) -> Vec<MealSlot> {
        planner::switch_alternative(&mut self.doc.plan, index)
    }

    pub fn reorder(&mut self, slot: MealSlot, alt: usize, moved: ItemId, target: ItemId) -> bool {
        planner::reorder(&mut self.doc.plan, slot, alt, moved, target)
    }

    /// Fit alternative `alt` to the current limits.
    pub fn optimize(
        &mut self,
        alt: usize,
        catalog: &impl FoodCatalog,
        config: &OptimizerConfig,
    ) -> Result<Option<OptimizationReport>> {
        let limits = self.doc.limits;
        planner::optimize(&mut self.doc.plan, alt, catalog, &limits, config)
    }

    /// Set or unset one macro limit. Values must be positive numbers.
    pub fn set_limit(&mut self, m: Macro, value: Option<f64>) -> Result<()> {
        if let Some(v) = value {
            if !(v.is_finite() && v > 0.0) {
                return Err(PlanError::InvalidInput(format!(
                    "{} limit must be a positive number, got {}",
                    m, v
                )));
            }
        }
        self.doc.limits.set(m, value);
        Ok(())
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.doc.notes = notes.into();
    }

    /// Drop every meal, keeping limits and notes.
    pub fn clear(&mut self) {
        self.doc.plan = MealPlan::new();
        info!("cleared meal plan");
    }

    /// Move the document's mark past every id handed out so far. Fresh ids
    /// always land in the plan, so its highest id bounds them.
    fn record_issued_ids(&mut self) {
        self.doc.next_item_id = self.doc.first_free_id();
    }
}

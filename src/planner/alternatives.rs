use tracing::debug;

use crate::error::{PlanError, Result};
use crate::models::{
    validate_quantity, Alternative, Food, IdSource, ItemId, MealItem, MealPlan, MealSlot,
};
use crate::state::FoodCatalog;

/// Duplicate the active alternative of `slot` with fresh item ids, append it
/// and make it active. Returns the new index.
///
/// Only `slot` changes its active index.
pub fn add_alternative(plan: &mut MealPlan, slot: MealSlot, ids: &mut impl IdSource) -> usize {
    let state = plan.slot_mut(slot);
    let copy: Vec<MealItem> = state
        .active_alternative()
        .items()
        .iter()
        .map(|item| item.duplicate(ids.next_id()))
        .collect();

    state.alternatives.push(Alternative::new(copy));
    state.active = state.alternatives.len() - 1;

    debug!(%slot, index = state.active, "added alternative");
    state.active
}

/// Remove alternative `index` of `slot`.
///
/// The only alternative of a slot can't be removed. The active index is
/// shifted or clamped so it keeps pointing at a valid alternative.
pub fn remove_alternative(plan: &mut MealPlan, slot: MealSlot, index: usize) -> Result<()> {
    let state = plan.slot_mut(slot);

    if state.alternatives.len() <= 1 {
        return Err(PlanError::LastAlternative(slot));
    }
    if index >= state.alternatives.len() {
        return Err(PlanError::AlternativeNotFound { slot, index });
    }

    state.alternatives.remove(index);

    if state.active >= state.alternatives.len() {
        state.active = state.alternatives.len() - 1;
    } else if state.active > index {
        state.active -= 1;
    }

    debug!(%slot, index, active = state.active, "removed alternative");
    Ok(())
}

/// Make `index` the active alternative of every slot that has one at that
/// index. Slots with fewer alternatives keep their current active index, so
/// slots can end up disagreeing on which alternative is active.
///
/// Returns the slots whose active index is now `index`.
pub fn switch_alternative(plan: &mut MealPlan, index: usize) -> Vec<MealSlot> {
    let mut switched = Vec::new();
    for slot in MealSlot::ALL {
        let state = plan.slot_mut(slot);
        if index < state.alternatives.len() {
            state.active = index;
            switched.push(slot);
        }
    }
    debug!(index, ?switched, "switched active alternative");
    switched
}

/// Append `quantity` grams of `food` to alternative `alt` of `slot`.
pub fn add_item(
    plan: &mut MealPlan,
    slot: MealSlot,
    alt: usize,
    food: &Food,
    quantity: f64,
    ids: &mut impl IdSource,
) -> Result<ItemId> {
    let quantity = validate_quantity(quantity)?;
    let alternative = plan
        .alternative_mut(slot, alt)
        .ok_or(PlanError::AlternativeNotFound { slot, index: alt })?;

    let item = MealItem::new(ids.next_id(), food, quantity);
    let id = item.id;
    alternative.items.push(item);

    debug!(%slot, alt, %id, food = %food.name, quantity, "added item");
    Ok(id)
}

/// Set the quantity of an item and refresh its nutrient snapshot.
///
/// Returns `Ok(false)` when the item does not exist (stale reference).
pub fn update_quantity(
    plan: &mut MealPlan,
    slot: MealSlot,
    alt: usize,
    item_id: ItemId,
    quantity: f64,
    catalog: &impl FoodCatalog,
) -> Result<bool> {
    let quantity = validate_quantity(quantity)?;

    let Some(item) = plan
        .alternative_mut(slot, alt)
        .and_then(|a| a.items.iter_mut().find(|item| item.id == item_id))
    else {
        debug!(%slot, alt, %item_id, "quantity update for unknown item ignored");
        return Ok(false);
    };

    let food = catalog
        .food(item.food_id)
        .ok_or(PlanError::FoodNotFound(item.food_id))?;
    item.set_quantity(&food.per_100g, quantity);

    debug!(%slot, alt, %item_id, quantity, "updated quantity");
    Ok(true)
}

/// Remove an item. Returns false when it does not exist.
pub fn remove_item(plan: &mut MealPlan, slot: MealSlot, alt: usize, item_id: ItemId) -> bool {
    let Some(alternative) = plan.alternative_mut(slot, alt) else {
        return false;
    };
    let before = alternative.items.len();
    alternative.items.retain(|item| item.id != item_id);
    let removed = alternative.items.len() < before;

    debug!(%slot, alt, %item_id, removed, "remove item");
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FoodId, Nutrients, SequentialIds};
    use crate::state::InMemoryCatalog;

    fn egg() -> Food {
        Food {
            id: FoodId(1),
            name: "Egg".to_string(),
            category: "Protein".to_string(),
            per_100g: Nutrients {
                energy: 143.0,
                protein: 12.6,
                carbohydrate: 0.7,
                fat: 9.5,
                fiber: 0.0,
                sugar: 0.4,
            },
        }
    }

    fn plan_with_alternatives(slot: MealSlot, count: usize, ids: &mut SequentialIds) -> MealPlan {
        let mut plan = MealPlan::new();
        add_item(&mut plan, slot, 0, &egg(), 100.0, ids).unwrap();
        for _ in 1..count {
            add_alternative(&mut plan, slot, ids);
        }
        plan
    }

    #[test]
    fn test_add_alternative_deep_copies_with_new_ids() {
        let mut ids = SequentialIds::new();
        let mut plan = MealPlan::new();
        add_item(&mut plan, MealSlot::Lunch, 0, &egg(), 60.0, &mut ids).unwrap();

        let index = add_alternative(&mut plan, MealSlot::Lunch, &mut ids);
        assert_eq!(index, 1);

        let lunch = plan.slot(MealSlot::Lunch);
        assert_eq!(lunch.len(), 2);
        assert_eq!(lunch.active(), 1);

        let original = &lunch.alternatives()[0].items()[0];
        let copy = &lunch.alternatives()[1].items()[0];
        assert_ne!(original.id, copy.id);
        assert_eq!(original.quantity, copy.quantity);
        assert_eq!(original.nutrients, copy.nutrients);

        // other slots untouched
        assert_eq!(plan.slot(MealSlot::Dinner).len(), 1);
        assert_eq!(plan.slot(MealSlot::Dinner).active(), 0);
    }

    #[test]
    fn test_remove_last_alternative_rejected() {
        let mut plan = MealPlan::new();
        let result = remove_alternative(&mut plan, MealSlot::Dinner, 0);
        assert!(matches!(result, Err(PlanError::LastAlternative(MealSlot::Dinner))));
        assert_eq!(plan.slot(MealSlot::Dinner).len(), 1);
    }

    #[test]
    fn test_remove_out_of_range_rejected() {
        let mut ids = SequentialIds::new();
        let mut plan = plan_with_alternatives(MealSlot::Dinner, 2, &mut ids);
        let before = plan.clone();
        assert!(matches!(
            remove_alternative(&mut plan, MealSlot::Dinner, 5),
            Err(PlanError::AlternativeNotFound { index: 5, .. })
        ));
        assert_eq!(plan, before);
    }

    #[test]
    fn test_remove_active_last_clamps() {
        let mut ids = SequentialIds::new();
        let mut plan = plan_with_alternatives(MealSlot::Breakfast, 3, &mut ids);
        assert_eq!(plan.slot(MealSlot::Breakfast).active(), 2);

        remove_alternative(&mut plan, MealSlot::Breakfast, 2).unwrap();
        assert_eq!(plan.slot(MealSlot::Breakfast).len(), 2);
        assert_eq!(plan.slot(MealSlot::Breakfast).active(), 1);
    }

    #[test]
    fn test_remove_before_active_shifts_down() {
        let mut ids = SequentialIds::new();
        let mut plan = plan_with_alternatives(MealSlot::Breakfast, 4, &mut ids);
        switch_alternative(&mut plan, 2);

        remove_alternative(&mut plan, MealSlot::Breakfast, 0).unwrap();
        assert_eq!(plan.slot(MealSlot::Breakfast).len(), 3);
        assert_eq!(plan.slot(MealSlot::Breakfast).active(), 1);
    }

    #[test]
    fn test_remove_after_active_keeps_index() {
        let mut ids = SequentialIds::new();
        let mut plan = plan_with_alternatives(MealSlot::Breakfast, 3, &mut ids);
        switch_alternative(&mut plan, 0);

        remove_alternative(&mut plan, MealSlot::Breakfast, 2).unwrap();
        assert_eq!(plan.slot(MealSlot::Breakfast).active(), 0);
    }

    #[test]
    fn test_switch_is_asymmetric_for_shorter_slots() {
        let mut ids = SequentialIds::new();
        let mut plan = MealPlan::new();
        add_alternative(&mut plan, MealSlot::Breakfast, &mut ids);
        add_alternative(&mut plan, MealSlot::Dinner, &mut ids);
        add_alternative(&mut plan, MealSlot::Dinner, &mut ids);
        add_alternative(&mut plan, MealSlot::Lunch, &mut ids);
        add_alternative(&mut plan, MealSlot::Lunch, &mut ids);
        switch_alternative(&mut plan, 0);

        let switched = switch_alternative(&mut plan, 2);
        assert_eq!(switched, vec![MealSlot::Lunch, MealSlot::Dinner]);
        assert_eq!(plan.slot(MealSlot::Lunch).active(), 2);
        assert_eq!(plan.slot(MealSlot::Dinner).active(), 2);
        assert_eq!(plan.slot(MealSlot::Breakfast).active(), 0);
        assert_eq!(plan.slot(MealSlot::Snacks).active(), 0);
    }

    #[test]
    fn test_add_item_rejects_bad_quantity_and_alternative() {
        let mut ids = SequentialIds::new();
        let mut plan = MealPlan::new();
        assert!(matches!(
            add_item(&mut plan, MealSlot::Snacks, 0, &egg(), 0.0, &mut ids),
            Err(PlanError::InvalidQuantity(_))
        ));
        assert!(matches!(
            add_item(&mut plan, MealSlot::Snacks, 1, &egg(), 50.0, &mut ids),
            Err(PlanError::AlternativeNotFound { .. })
        ));
        assert!(!plan.has_items());
    }

    #[test]
    fn test_update_quantity() {
        let mut ids = SequentialIds::new();
        let catalog = InMemoryCatalog::new(vec![egg()]);
        let mut plan = MealPlan::new();
        let id = add_item(&mut plan, MealSlot::Lunch, 0, &egg(), 100.0, &mut ids).unwrap();

        assert!(update_quantity(&mut plan, MealSlot::Lunch, 0, id, 50.0, &catalog).unwrap());
        let item = plan.alternative(MealSlot::Lunch, 0).unwrap().item(id).unwrap();
        assert_eq!(item.quantity, 50.0);
        assert_eq!(item.nutrients.energy, 71.5);
        assert_eq!(item.nutrients.protein, 6.3);

        // unknown id is a silent no-op
        assert!(!update_quantity(&mut plan, MealSlot::Lunch, 0, ItemId(99), 50.0, &catalog).unwrap());

        // invalid quantity leaves the item untouched
        assert!(update_quantity(&mut plan, MealSlot::Lunch, 0, id, -3.0, &catalog).is_err());
        let item = plan.alternative(MealSlot::Lunch, 0).unwrap().item(id).unwrap();
        assert_eq!(item.quantity, 50.0);
    }

    #[test]
    fn test_update_quantity_missing_food() {
        let mut ids = SequentialIds::new();
        let catalog = InMemoryCatalog::new(vec![]);
        let mut plan = MealPlan::new();
        let id = add_item(&mut plan, MealSlot::Lunch, 0, &egg(), 100.0, &mut ids).unwrap();

        let result = update_quantity(&mut plan, MealSlot::Lunch, 0, id, 20.0, &catalog);
        assert!(matches!(result, Err(PlanError::FoodNotFound(FoodId(1)))));
        let item = plan.alternative(MealSlot::Lunch, 0).unwrap().item(id).unwrap();
        assert_eq!(item.quantity, 100.0);
    }

    #[test]
    fn test_remove_item() {
        let mut ids = SequentialIds::new();
        let mut plan = MealPlan::new();
        let id = add_item(&mut plan, MealSlot::Dinner, 0, &egg(), 100.0, &mut ids).unwrap();

        assert!(!remove_item(&mut plan, MealSlot::Dinner, 0, ItemId(42)));
        assert!(!remove_item(&mut plan, MealSlot::Dinner, 3, id));
        assert!(remove_item(&mut plan, MealSlot::Dinner, 0, id));
        assert!(!plan.has_items());
    }
}

use tracing::debug;

use crate::models::{ItemId, MealPlan, MealSlot};

/// Move item `moved` to the position currently held by `target` within one
/// alternative.
///
/// This is a single-element list move: the item is taken out and reinserted
/// at the target's original index, so a forward move lands just after the
/// target and a backward move just before it. Returns false, leaving the
/// plan untouched, when the alternative or either id is missing.
pub fn reorder(
    plan: &mut MealPlan,
    slot: MealSlot,
    alt: usize,
    moved: ItemId,
    target: ItemId,
) -> bool {
    let Some(alternative) = plan.alternative_mut(slot, alt) else {
        debug!(%slot, alt, "reorder in unknown alternative ignored");
        return false;
    };

    let (Some(from), Some(to)) = (alternative.position(moved), alternative.position(target))
    else {
        debug!(%slot, alt, %moved, %target, "reorder with stale item ids ignored");
        return false;
    };

    if from == to {
        return false;
    }

    let item = alternative.items.remove(from);
    alternative.items.insert(to, item);

    debug!(%slot, alt, %moved, from, to, "reordered item");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Food, FoodId, Nutrients, SequentialIds};
    use crate::planner::alternatives::add_item;

    fn food(id: u64, name: &str) -> Food {
        Food {
            id: FoodId(id),
            name: name.to_string(),
            category: "Test".to_string(),
            per_100g: Nutrients {
                energy: 100.0 * id as f64,
                protein: 1.0,
                carbohydrate: 2.0,
                fat: 3.0,
                fiber: 0.5,
                sugar: 0.25,
            },
        }
    }

    /// Plan whose breakfast alternative 0 holds items a, b, c, d.
    fn sample_plan() -> (MealPlan, Vec<ItemId>) {
        let mut ids = SequentialIds::new();
        let mut plan = MealPlan::new();
        let item_ids: Vec<ItemId> = ["a", "b", "c", "d"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                add_item(
                    &mut plan,
                    MealSlot::Breakfast,
                    0,
                    &food(i as u64 + 1, name),
                    50.0 + i as f64,
                    &mut ids,
                )
                .unwrap()
            })
            .collect();
        (plan, item_ids)
    }

    fn names(plan: &MealPlan) -> Vec<String> {
        plan.alternative(MealSlot::Breakfast, 0)
            .unwrap()
            .items()
            .iter()
            .map(|item| item.name.clone())
            .collect()
    }

    #[test]
    fn test_move_backward_lands_before_target() {
        let (mut plan, ids) = sample_plan();
        assert!(reorder(&mut plan, MealSlot::Breakfast, 0, ids[3], ids[1]));
        assert_eq!(names(&plan), ["a", "d", "b", "c"]);
    }

    #[test]
    fn test_move_forward_takes_target_index() {
        let (mut plan, ids) = sample_plan();
        assert!(reorder(&mut plan, MealSlot::Breakfast, 0, ids[0], ids[2]));
        assert_eq!(names(&plan), ["b", "c", "a", "d"]);
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let (mut plan, ids) = sample_plan();
        let before = plan.clone();
        assert!(!reorder(&mut plan, MealSlot::Breakfast, 0, ItemId(99), ids[0]));
        assert!(!reorder(&mut plan, MealSlot::Breakfast, 0, ids[0], ItemId(99)));
        assert!(!reorder(&mut plan, MealSlot::Breakfast, 1, ids[0], ids[1]));
        assert!(!reorder(&mut plan, MealSlot::Lunch, 0, ids[0], ids[1]));
        assert_eq!(plan, before);
    }

    #[test]
    fn test_reorder_preserves_items() {
        let (mut plan, ids) = sample_plan();
        let mut before = plan.alternative(MealSlot::Breakfast, 0).unwrap().items().to_vec();

        reorder(&mut plan, MealSlot::Breakfast, 0, ids[1], ids[3]);
        reorder(&mut plan, MealSlot::Breakfast, 0, ids[2], ids[0]);

        let mut after = plan.alternative(MealSlot::Breakfast, 0).unwrap().items().to_vec();
        assert_ne!(before, after);

        before.sort_by_key(|item| item.id);
        after.sort_by_key(|item| item.id);
        assert_eq!(before, after);
    }
}

#[macro_use]
extern crate assert_float_eq;

use meal_plan_rs::models::{Food, FoodId, Macro, MacroLimits, MealSlot, Nutrients, PlanDocument};
use meal_plan_rs::planner::{effective_limits, scale_quantities, OptimizerConfig, HEADROOM};
use meal_plan_rs::state::{InMemoryCatalog, PlanManager};

fn food(id: u64, name: &str, energy: f64, protein: f64, carbohydrate: f64, fat: f64) -> Food {
    Food {
        id: FoodId(id),
        name: name.to_string(),
        category: "Test".to_string(),
        per_100g: Nutrients {
            energy,
            protein,
            carbohydrate,
            fat,
            fiber: 0.0,
            sugar: 0.0,
        },
    }
}

fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new(vec![
        food(1, "Crackers", 100.0, 5.0, 10.0, 2.0),
        food(2, "Pasta", 350.0, 12.0, 72.0, 1.5),
        food(3, "Chicken breast", 165.0, 31.0, 0.0, 3.6),
    ])
}

fn quantities(manager: &PlanManager, alt: usize) -> Vec<f64> {
    MealSlot::ALL
        .iter()
        .filter_map(|slot| manager.plan().alternative(*slot, alt))
        .flat_map(|a| a.items().iter().map(|item| item.quantity))
        .collect()
}

#[test]
fn test_single_item_over_energy_limit_ends_at_48g() {
    let catalog = catalog();
    let mut manager = PlanManager::new(PlanDocument::default());
    manager
        .add_food(MealSlot::Breakfast, 0, FoodId(1), 100.0, &catalog)
        .unwrap();
    manager.set_limit(Macro::Energy, Some(50.0)).unwrap();

    let report = manager
        .optimize(0, &catalog, &OptimizerConfig::default())
        .unwrap()
        .unwrap();

    assert!(report.downscaled);
    assert_eq!(report.iterations, 0);
    assert_eq!(report.limiting_macro, Macro::Energy);

    let item = &manager.plan().slot(MealSlot::Breakfast).active_alternative().items()[0];
    assert_eq!(item.quantity, 48.0);
    assert_float_absolute_eq!(item.nutrients.energy, 48.0, 1e-9);
    assert_float_absolute_eq!(item.nutrients.protein, 2.4, 1e-9);
}

#[test]
fn test_growth_across_slots() {
    let catalog = catalog();
    let mut manager = PlanManager::new(PlanDocument::default());
    manager
        .add_food(MealSlot::Lunch, 0, FoodId(2), 80.0, &catalog)
        .unwrap();
    manager
        .add_food(MealSlot::Dinner, 0, FoodId(3), 100.0, &catalog)
        .unwrap();

    let report = manager
        .optimize(0, &catalog, &OptimizerConfig::default())
        .unwrap()
        .unwrap();

    assert!(!report.downscaled);
    assert_eq!(report.iterations, 4);
    assert_eq!(report.items_adjusted, 2);
    assert_eq!(report.limiting_macro, Macro::Protein);
    assert_eq!(quantities(&manager, 0), vec![290.0, 362.0]);
    assert_float_absolute_eq!(report.totals.nutrients.protein, 147.02, 1e-6);
    assert_float_absolute_eq!(report.utilization_pct(), 98.0, 1e-6);
}

#[test]
fn test_optimizing_twice_changes_nothing() {
    let catalog = catalog();
    let config = OptimizerConfig::default();
    let mut manager = PlanManager::new(PlanDocument::default());
    manager
        .add_food(MealSlot::Lunch, 0, FoodId(2), 80.0, &catalog)
        .unwrap();
    manager
        .add_food(MealSlot::Dinner, 0, FoodId(3), 100.0, &catalog)
        .unwrap();

    manager.optimize(0, &catalog, &config).unwrap();
    let first = manager.plan().clone();

    let second = manager.optimize(0, &catalog, &config).unwrap().unwrap();
    assert_eq!(second.iterations, 0);
    assert!(!second.downscaled);
    assert_eq!(manager.plan(), &first);
}

#[test]
fn test_scaling_keeps_proportions() {
    let coefficients = [
        food(0, "x", 100.0, 5.0, 10.0, 2.0).per_100g,
        food(0, "y", 350.0, 12.0, 72.0, 1.5).per_100g,
        food(0, "z", 165.0, 31.0, 0.0, 3.6).per_100g,
    ];
    let start = [30.0, 80.0, 100.0];
    let outcome = scale_quantities(
        &coefficients,
        &start,
        &effective_limits(&MacroLimits::default()),
        &OptimizerConfig::default(),
    );

    assert!(outcome.iterations > 0);
    let ratio = outcome.quantities[0] / start[0];
    for (scaled, original) in outcome.quantities.iter().zip(start) {
        assert_float_relative_eq!(scaled / original, ratio, 1e-9);
    }
}

#[test]
fn test_downscale_floors_small_items() {
    let limits = [100.0, 150.0, 300.0, 80.0];
    let coefficients = [
        food(0, "big", 400.0, 0.0, 0.0, 0.0).per_100g,
        food(0, "small", 400.0, 0.0, 0.0, 0.0).per_100g,
    ];
    let outcome = scale_quantities(
        &coefficients,
        &[100.0, 20.0],
        &limits,
        &OptimizerConfig::default(),
    );

    assert!(outcome.downscaled);
    assert_eq!(outcome.iterations, 0);
    assert_eq!(outcome.limiting_macro, Macro::Energy);
    assert_float_absolute_eq!(outcome.quantities[0], 100.0 * 0.95 / 4.8, 1e-9);
    assert_eq!(outcome.quantities[1], 10.0);

    // The floored item keeps the pool over the energy limit
    assert!(outcome.limiting_factor > 1.0);
    assert_float_absolute_eq!(outcome.limiting_factor, 1.191_666_666, 1e-6);
}

#[test]
fn test_growth_never_passes_headroom() {
    let limits = [1800.0, 120.0, 220.0, 60.0];
    let coefficients = [
        food(0, "a", 350.0, 12.0, 72.0, 1.5).per_100g,
        food(0, "b", 165.0, 31.0, 0.0, 3.6).per_100g,
        food(0, "c", 884.0, 0.0, 0.0, 100.0).per_100g,
    ];
    let outcome = scale_quantities(
        &coefficients,
        &[50.0, 60.0, 5.0],
        &limits,
        &OptimizerConfig::default(),
    );

    for (i, limit) in limits.iter().enumerate() {
        let total: f64 = coefficients
            .iter()
            .zip(&outcome.quantities)
            .map(|(c, q)| c.macro_value(Macro::ALL[i]) * q / 100.0)
            .sum();
        assert!(
            total <= limit * HEADROOM + 1e-6,
            "{} total {} over {}",
            Macro::ALL[i],
            total,
            limit * HEADROOM
        );
    }
}

#[test]
fn test_empty_alternative_is_not_optimized() {
    let catalog = catalog();
    let mut manager = PlanManager::new(PlanDocument::default());
    manager
        .add_food(MealSlot::Lunch, 0, FoodId(2), 80.0, &catalog)
        .unwrap();

    let config = OptimizerConfig::default();
    assert!(manager.optimize(1, &catalog, &config).unwrap().is_none());

    manager.remove_item(MealSlot::Lunch, 0, manager.plan().max_item_id().unwrap());
    assert!(manager.optimize(0, &catalog, &config).unwrap().is_none());
}

#[test]
fn test_unknown_food_leaves_plan_untouched() {
    let mut manager = PlanManager::new(PlanDocument::default());
    manager
        .add_food(MealSlot::Lunch, 0, FoodId(2), 80.0, &catalog())
        .unwrap();
    manager
        .add_food(MealSlot::Dinner, 0, FoodId(3), 100.0, &catalog())
        .unwrap();
    let before = manager.plan().clone();

    // Chicken is missing from this catalog
    let partial = InMemoryCatalog::new(vec![food(2, "Pasta", 350.0, 12.0, 72.0, 1.5)]);
    let result = manager.optimize(0, &partial, &OptimizerConfig::default());

    assert!(result.is_err());
    assert_eq!(manager.plan(), &before);
}

#[test]
fn test_only_the_chosen_alternative_moves() {
    let catalog = catalog();
    let mut manager = PlanManager::new(PlanDocument::default());
    manager
        .add_food(MealSlot::Lunch, 0, FoodId(2), 80.0, &catalog)
        .unwrap();
    manager.add_alternative(MealSlot::Lunch);

    manager
        .optimize(1, &catalog, &OptimizerConfig::default())
        .unwrap()
        .unwrap();

    assert_eq!(quantities(&manager, 0), vec![80.0]);
    assert_ne!(quantities(&manager, 1), vec![80.0]);
}

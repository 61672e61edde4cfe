use std::ops::AddAssign;

use crate::models::{Alternative, Macro, MacroLimits, MealPlan, MealSlot, Nutrients};

/// Summed quantity and nutrients of a group of items.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    /// Grams.
    pub quantity: f64,
    pub nutrients: Nutrients,
}

impl AddAssign for Totals {
    fn add_assign(&mut self, rhs: Totals) {
        self.quantity += rhs.quantity;
        self.nutrients += rhs.nutrients;
    }
}

/// Per-macro flags for totals strictly above a set limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LimitBreaches {
    pub energy: bool,
    pub protein: bool,
    pub carbohydrate: bool,
    pub fat: bool,
}

impl LimitBreaches {
    pub fn get(&self, m: Macro) -> bool {
        match m {
            Macro::Energy => self.energy,
            Macro::Protein => self.protein,
            Macro::Carbohydrate => self.carbohydrate,
            Macro::Fat => self.fat,
        }
    }

    pub fn any(&self) -> bool {
        self.energy || self.protein || self.carbohydrate || self.fat
    }
}

/// One row of the daily comparison: an alternative index summed over all
/// slots.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRow {
    pub alternative: usize,
    pub totals: Totals,
    pub breaches: LimitBreaches,
    /// Some slot has this alternative active.
    pub is_active: bool,
}

fn sum_alternative(alternative: &Alternative) -> Totals {
    alternative
        .items()
        .iter()
        .fold(Totals::default(), |mut totals, item| {
            totals.quantity += item.quantity;
            totals.nutrients += item.nutrients;
            totals
        })
}

/// Totals of alternative `alt` of `slot`; zero if the slot has no such
/// alternative.
pub fn alternative_totals(plan: &MealPlan, slot: MealSlot, alt: usize) -> Totals {
    plan.alternative(slot, alt)
        .map(sum_alternative)
        .unwrap_or_default()
}

/// Totals of the active alternative of `slot`.
pub fn active_totals(plan: &MealPlan, slot: MealSlot) -> Totals {
    sum_alternative(plan.slot(slot).active_alternative())
}

/// Totals of alternative index `alt` across all four slots.
pub fn daily_totals(plan: &MealPlan, alt: usize) -> Totals {
    MealSlot::ALL
        .iter()
        .fold(Totals::default(), |mut totals, slot| {
            totals += alternative_totals(plan, *slot, alt);
            totals
        })
}

/// Flag each macro whose total strictly exceeds its set limit.
pub fn exceeds_limits(totals: &Totals, limits: &MacroLimits) -> LimitBreaches {
    let over = |m: Macro| {
        limits
            .get(m)
            .is_some_and(|limit| totals.nutrients.macro_value(m) > limit)
    };
    LimitBreaches {
        energy: over(Macro::Energy),
        protein: over(Macro::Protein),
        carbohydrate: over(Macro::Carbohydrate),
        fat: over(Macro::Fat),
    }
}

/// One row per alternative index, up to the largest alternative count of
/// any slot.
pub fn daily_overview(plan: &MealPlan, limits: &MacroLimits) -> Vec<DailyRow> {
    (0..plan.max_alternatives())
        .map(|alt| {
            let totals = daily_totals(plan, alt);
            DailyRow {
                alternative: alt,
                totals,
                breaches: exceeds_limits(&totals, limits),
                is_active: MealSlot::ALL
                    .iter()
                    .any(|slot| plan.slot(*slot).active() == alt),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Food, FoodId, SequentialIds};
    use crate::planner::alternatives::{add_alternative, add_item, switch_alternative};

    fn rice() -> Food {
        Food {
            id: FoodId(1),
            name: "Rice".to_string(),
            category: "Cereals".to_string(),
            per_100g: Nutrients {
                energy: 130.0,
                protein: 2.7,
                carbohydrate: 28.0,
                fat: 0.3,
                fiber: 0.4,
                sugar: 0.1,
            },
        }
    }

    fn chicken() -> Food {
        Food {
            id: FoodId(2),
            name: "Chicken".to_string(),
            category: "Meat".to_string(),
            per_100g: Nutrients {
                energy: 165.0,
                protein: 31.0,
                carbohydrate: 0.0,
                fat: 3.6,
                fiber: 0.0,
                sugar: 0.0,
            },
        }
    }

    #[test]
    fn test_alternative_totals() {
        let mut ids = SequentialIds::new();
        let mut plan = MealPlan::new();
        add_item(&mut plan, MealSlot::Lunch, 0, &rice(), 200.0, &mut ids).unwrap();
        add_item(&mut plan, MealSlot::Lunch, 0, &chicken(), 150.0, &mut ids).unwrap();

        let totals = alternative_totals(&plan, MealSlot::Lunch, 0);
        assert_eq!(totals.quantity, 350.0);
        assert!((totals.nutrients.energy - 507.5).abs() < 1e-9);
        assert!((totals.nutrients.protein - 51.9).abs() < 1e-9);

        assert_eq!(alternative_totals(&plan, MealSlot::Lunch, 4), Totals::default());
    }

    #[test]
    fn test_daily_totals_skips_missing_alternatives() {
        let mut ids = SequentialIds::new();
        let mut plan = MealPlan::new();
        add_item(&mut plan, MealSlot::Lunch, 0, &rice(), 100.0, &mut ids).unwrap();
        add_item(&mut plan, MealSlot::Dinner, 0, &chicken(), 100.0, &mut ids).unwrap();
        add_alternative(&mut plan, MealSlot::Dinner, &mut ids);

        let day0 = daily_totals(&plan, 0);
        assert!((day0.nutrients.energy - 295.0).abs() < 1e-9);

        // only dinner has alternative 1
        let day1 = daily_totals(&plan, 1);
        assert!((day1.nutrients.energy - 165.0).abs() < 1e-9);
        assert_eq!(day1.quantity, 100.0);
    }

    #[test]
    fn test_exceeds_limits() {
        let totals = Totals {
            quantity: 500.0,
            nutrients: Nutrients {
                energy: 2100.0,
                protein: 80.0,
                carbohydrate: 300.0,
                fat: 90.0,
                fiber: 40.0,
                sugar: 90.0,
            },
        };
        let limits = MacroLimits {
            energy: Some(2000.0),
            protein: Some(100.0),
            carbohydrate: Some(300.0),
            fat: None,
        };
        let breaches = exceeds_limits(&totals, &limits);
        assert!(breaches.energy);
        assert!(!breaches.protein);
        // equal is not a breach
        assert!(!breaches.carbohydrate);
        // unset limit never breaches
        assert!(!breaches.fat);
        assert!(breaches.any());

        assert!(!exceeds_limits(&totals, &MacroLimits::default()).any());
    }

    #[test]
    fn test_daily_overview_marks_active() {
        let mut ids = SequentialIds::new();
        let mut plan = MealPlan::new();
        add_item(&mut plan, MealSlot::Breakfast, 0, &rice(), 100.0, &mut ids).unwrap();
        add_alternative(&mut plan, MealSlot::Breakfast, &mut ids);
        add_alternative(&mut plan, MealSlot::Breakfast, &mut ids);
        switch_alternative(&mut plan, 1);

        let limits = MacroLimits {
            energy: Some(100.0),
            ..Default::default()
        };
        let rows = daily_overview(&plan, &limits);
        assert_eq!(rows.len(), 3);
        // alternative 0 is still active for lunch, dinner and snacks
        assert!(rows[0].is_active);
        assert!(rows[1].is_active);
        assert!(!rows[2].is_active);
        assert!(rows.iter().all(|row| row.breaches.energy));
    }
}

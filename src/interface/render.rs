use crate::models::{Food, Macro, MacroLimits, MealPlan, MealSlot, Nutrients};
use crate::planner::{active_totals, DailyRow, OptimizationReport};

fn macros_line(n: &Nutrients) -> String {
    format!(
        "{:>6.0} kcal | P:{:>5.1} C:{:>5.1} F:{:>5.1} Fi:{:>4.1} S:{:>4.1}",
        n.energy, n.protein, n.carbohydrate, n.fat, n.fiber, n.sugar
    )
}

/// Display every slot, each alternative with its items. The active
/// alternative is marked with `*`.
pub fn display_plan(plan: &MealPlan) {
    if !plan.has_items() {
        println!("The meal plan is empty. Use 'add' to put foods in a meal.");
        return;
    }

    println!();
    println!("=== Meal Plan ===");

    let name_width = plan.items().map(|i| i.name.len()).max().unwrap_or(10);

    for slot in MealSlot::ALL {
        let state = plan.slot(slot);
        println!();
        println!("--- {} ---", slot);

        for (index, alternative) in state.alternatives().iter().enumerate() {
            let marker = if index == state.active() { '*' } else { ' ' };
            if state.len() > 1 {
                println!(" {} Alternative {}", marker, index + 1);
            }
            if alternative.is_empty() {
                println!("     (empty)");
                continue;
            }
            for item in alternative.items() {
                println!(
                    "   [{:>3}] {:<width$} {:>6.0} g  {}",
                    item.id.0,
                    item.name,
                    item.quantity,
                    macros_line(&item.nutrients),
                    width = name_width
                );
            }
        }

        let totals = active_totals(plan, slot);
        if totals.quantity > 0.0 {
            println!("   Total: {:>6.0} g  {}", totals.quantity, macros_line(&totals.nutrients));
        }
    }

    println!();
}

/// Display per-alternative daily totals next to the limits, flagging
/// every macro over its limit with `!`.
pub fn display_daily_totals(rows: &[DailyRow], limits: &MacroLimits) {
    println!();
    println!("=== Daily Totals ===");
    println!();

    for row in rows {
        let active = if row.is_active { " (active)" } else { "" };
        println!("Alternative {}{}", row.alternative + 1, active);
        println!("  Quantity: {:.0} g", row.totals.quantity);

        for m in Macro::ALL {
            let value = row.totals.nutrients.macro_value(m);
            let flag = if row.breaches.get(m) { " !" } else { "" };
            match limits.get(m) {
                Some(limit) => println!(
                    "  {:<13} {:>7.1} / {:.0} {}{}",
                    m,
                    value,
                    limit,
                    m.unit(),
                    flag
                ),
                None => println!("  {:<13} {:>7.1} {}", m, value, m.unit()),
            }
        }
        println!(
            "  {:<13} {:>7.1} g",
            "fiber", row.totals.nutrients.fiber
        );
        println!(
            "  {:<13} {:>7.1} g",
            "sugar", row.totals.nutrients.sugar
        );
        println!();
    }
}

/// Display the outcome of an optimizer run.
pub fn display_optimization_report(report: &OptimizationReport) {
    println!();
    println!("=== Optimized alternative {} ===", report.alternative + 1);
    println!("Items adjusted: {}", report.items_adjusted);
    println!("Growth rounds: {}", report.iterations);
    if report.downscaled {
        println!("Quantities were scaled down to fit the limits first.");
    }
    println!(
        "Limiting macro: {} ({:.1}% of limit)",
        report.limiting_macro,
        report.utilization_pct()
    );

    for (m, limit) in Macro::ALL.iter().zip(report.limits) {
        println!(
            "  {:<13} {:>7.1} / {:.0} {}",
            m,
            report.totals.nutrients.macro_value(*m),
            limit,
            m.unit()
        );
    }
    println!();
}

/// Display the current limits; unset ones are shown as such.
pub fn display_limits(limits: &MacroLimits) {
    for m in Macro::ALL {
        match limits.get(m) {
            Some(value) => println!("  {:<13} {:.0} {}", m, value, m.unit()),
            None => println!("  {:<13} (unset)", m),
        }
    }
}

/// Display a simple list of foods with their per-100 g values.
pub fn display_food_list(foods: &[&Food], title: &str) {
    if foods.is_empty() {
        println!("{}: (none)", title);
        return;
    }

    println!();
    println!("=== {} ({} items) ===", title, foods.len());
    println!();

    let mut category = "";
    for food in foods {
        if food.category != category {
            category = &food.category;
            println!("{}:", category);
        }
        println!(
            "  [{:>4}] {} - {}",
            food.id.0,
            food.name,
            macros_line(&food.per_100g)
        );
    }

    println!();
}

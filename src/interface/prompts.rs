use dialoguer::{Confirm, Select};

use crate::error::{PlanError, Result};
use crate::models::{Food, FoodId};
use crate::planner::constants::{FUZZY_MATCH_THRESHOLD, MAX_FUZZY_CANDIDATES};
use crate::state::{FoodCatalog, InMemoryCatalog};

/// Prompt for yes/no confirmation.
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Ask before a destructive change unless `assume_yes` is set.
pub fn confirm_destructive(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    prompt_yes_no(prompt, false)
}

/// Resolve a food argument: a catalog id, an exact name, or a fuzzy match
/// the user picks from.
pub fn resolve_food<'a>(catalog: &'a InMemoryCatalog, input: &str) -> Result<&'a Food> {
    let input = input.trim();

    if let Ok(raw) = input.parse::<u64>() {
        let id = FoodId(raw);
        return catalog.food(id).ok_or(PlanError::FoodNotFound(id));
    }

    if let Some(food) = catalog.find_by_name(input) {
        return Ok(food);
    }

    let candidates: Vec<&Food> = catalog
        .search(input, FUZZY_MATCH_THRESHOLD)
        .into_iter()
        .take(MAX_FUZZY_CANDIDATES)
        .map(|(food, _)| food)
        .collect();

    let no_match = || PlanError::InvalidInput(format!("no food matching '{}'", input));

    match candidates.as_slice() {
        [] => Err(no_match()),
        [food] => {
            if prompt_yes_no(&format!("Did you mean '{}'?", food.name), true)? {
                Ok(*food)
            } else {
                Err(no_match())
            }
        }
        _ => {
            let mut options: Vec<String> = candidates
                .iter()
                .map(|f| format!("{} ({})", f.name, f.category))
                .collect();
            options.push("None of these".to_string());

            let selection = Select::new()
                .with_prompt("Which did you mean?")
                .items(&options)
                .default(0)
                .interact()?;

            candidates.get(selection).copied().ok_or_else(no_match)
        }
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::Parser;
use tracing::info;

use meal_plan_rs::cli::{Cli, Command, MacroArg};
use meal_plan_rs::error::Result;
use meal_plan_rs::interface::{
    confirm_destructive, display_daily_totals, display_food_list, display_limits,
    display_optimization_report, display_plan, resolve_food,
};
use meal_plan_rs::logging;
use meal_plan_rs::models::{ItemId, Macro, MealSlot, NewFood, Nutrients};
use meal_plan_rs::planner::{daily_overview, OptimizerConfig, FUZZY_MATCH_THRESHOLD};
use meal_plan_rs::state::{
    export_plan, import_plan, load_catalog, load_optimizer_config, load_plan, save_catalog,
    save_plan, FoodCatalog, InMemoryCatalog, PlanManager,
};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        if e.is_rejection() {
            eprintln!("Warning: {}", e);
        } else {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// File locations shared by every command.
struct Context {
    plan: PathBuf,
    catalog: PathBuf,
    optimizer_config: Option<PathBuf>,
}

impl Context {
    fn open_plan(&self) -> Result<PlanManager> {
        Ok(PlanManager::new(load_plan(&self.plan)?))
    }

    fn save(&self, manager: &PlanManager) -> Result<()> {
        save_plan(&self.plan, manager.document(), Utc::now())
    }

    fn open_catalog(&self) -> Result<InMemoryCatalog> {
        if !self.catalog.exists() {
            eprintln!("Food catalog not found: {}", self.catalog.display());
            return Ok(InMemoryCatalog::default());
        }
        load_catalog(&self.catalog)
    }

    fn optimizer_config(&self) -> Result<OptimizerConfig> {
        match &self.optimizer_config {
            Some(path) => load_optimizer_config(path),
            None => Ok(OptimizerConfig::default()),
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let ctx = Context {
        plan: cli.plan,
        catalog: cli.catalog,
        optimizer_config: cli.optimizer_config,
    };

    match cli.command.unwrap_or_default() {
        Command::Show => cmd_show(&ctx),
        Command::Foods { search } => cmd_foods(&ctx, search.as_deref()),
        Command::AddFood {
            name,
            category,
            energy,
            protein,
            carbohydrate,
            fat,
            fiber,
            sugar,
        } => cmd_add_food(
            &ctx,
            NewFood {
                name,
                category,
                per_100g: Nutrients {
                    energy,
                    protein,
                    carbohydrate,
                    fat,
                    fiber,
                    sugar,
                },
            },
        ),
        Command::Add {
            slot,
            food,
            grams,
            alt,
        } => cmd_add(&ctx, slot, alt, &food, grams),
        Command::SetQuantity {
            slot,
            item,
            grams,
            alt,
        } => cmd_set_quantity(&ctx, slot, alt, ItemId(item), grams),
        Command::Remove { slot, item, alt } => cmd_remove(&ctx, slot, alt, ItemId(item)),
        Command::AddAlt { slot } => cmd_add_alt(&ctx, slot),
        Command::RemoveAlt { slot, alt, yes } => cmd_remove_alt(&ctx, slot, alt, yes),
        Command::Switch { alt } => cmd_switch(&ctx, alt),
        Command::Move {
            slot,
            item,
            target,
            alt,
        } => cmd_move(&ctx, slot, alt, ItemId(item), ItemId(target)),
        Command::Optimize { alt } => cmd_optimize(&ctx, alt),
        Command::Totals => cmd_totals(&ctx),
        Command::Limits {
            energy,
            protein,
            carbohydrate,
            fat,
            unset,
        } => cmd_limits(&ctx, [energy, protein, carbohydrate, fat], &unset),
        Command::Notes { text } => cmd_notes(&ctx, text),
        Command::Clear { yes } => cmd_clear(&ctx, yes),
        Command::Export { file } => cmd_export(&ctx, &file),
        Command::Import { file, yes } => cmd_import(&ctx, &file, yes),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let manager = ctx.open_plan()?;
    display_plan(manager.plan());

    if !manager.notes().is_empty() {
        println!("Notes: {}", manager.notes());
    }
    Ok(())
}

fn cmd_foods(ctx: &Context, search: Option<&str>) -> Result<()> {
    let catalog = ctx.open_catalog()?;

    match search {
        Some(query) => {
            let matches: Vec<_> = catalog
                .search(query, FUZZY_MATCH_THRESHOLD)
                .into_iter()
                .map(|(food, _)| food)
                .collect();
            display_food_list(&matches, &format!("Foods like '{}'", query));
        }
        None => display_food_list(&catalog.foods(), "Foods"),
    }
    Ok(())
}

/// Add a food to the catalog, creating the catalog file if needed.
fn cmd_add_food(ctx: &Context, new_food: NewFood) -> Result<()> {
    let mut catalog = if ctx.catalog.exists() {
        load_catalog(&ctx.catalog)?
    } else {
        InMemoryCatalog::default()
    };

    let (id, name) = {
        let food = catalog.insert(new_food)?;
        (food.id, food.name.clone())
    };
    save_catalog(&ctx.catalog, &catalog)?;

    println!("Added {} to the catalog as {}.", name, id);
    Ok(())
}

fn cmd_add(ctx: &Context, slot: MealSlot, alt: usize, food: &str, grams: f64) -> Result<()> {
    let catalog = ctx.open_catalog()?;
    let food = resolve_food(&catalog, food)?;
    let mut manager = ctx.open_plan()?;

    let item = manager.add_food(slot, alt, food.id, grams, &catalog)?;
    ctx.save(&manager)?;

    println!(
        "Added {:.0} g of {} to {} (alternative {}) as item {}.",
        grams,
        food.name,
        slot,
        alt + 1,
        item
    );
    Ok(())
}

fn cmd_set_quantity(
    ctx: &Context,
    slot: MealSlot,
    alt: usize,
    item: ItemId,
    grams: f64,
) -> Result<()> {
    let catalog = ctx.open_catalog()?;
    let mut manager = ctx.open_plan()?;

    if manager.update_quantity(slot, alt, item, grams, &catalog)? {
        ctx.save(&manager)?;
        println!("Item {} is now {:.0} g.", item, grams);
    } else {
        println!("No item {} in {} alternative {}.", item, slot, alt + 1);
    }
    Ok(())
}

fn cmd_remove(ctx: &Context, slot: MealSlot, alt: usize, item: ItemId) -> Result<()> {
    let mut manager = ctx.open_plan()?;

    if manager.remove_item(slot, alt, item) {
        ctx.save(&manager)?;
        println!("Removed item {} from {}.", item, slot);
    } else {
        println!("No item {} in {} alternative {}.", item, slot, alt + 1);
    }
    Ok(())
}

fn cmd_add_alt(ctx: &Context, slot: MealSlot) -> Result<()> {
    let mut manager = ctx.open_plan()?;
    let index = manager.add_alternative(slot);
    ctx.save(&manager)?;

    println!("{} now has alternative {}.", slot, index + 1);
    Ok(())
}

fn cmd_remove_alt(ctx: &Context, slot: MealSlot, alt: usize, yes: bool) -> Result<()> {
    let mut manager = ctx.open_plan()?;

    // Reject before asking.
    if manager.plan().alternative(slot, alt).is_none() || manager.plan().slot(slot).len() == 1 {
        return manager.remove_alternative(slot, alt);
    }

    let prompt = format!("Remove alternative {} of {}?", alt + 1, slot);
    if !confirm_destructive(&prompt, yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    manager.remove_alternative(slot, alt)?;
    ctx.save(&manager)?;
    println!("Removed alternative {} of {}.", alt + 1, slot);
    Ok(())
}

fn cmd_switch(ctx: &Context, alt: usize) -> Result<()> {
    let mut manager = ctx.open_plan()?;
    let switched = manager.switch_alternative(alt);

    if switched.is_empty() {
        println!("No slot has alternative {}.", alt + 1);
        return Ok(());
    }

    ctx.save(&manager)?;
    let names: Vec<String> = switched.iter().map(|s| s.to_string()).collect();
    println!("Alternative {} active for: {}", alt + 1, names.join(", "));
    Ok(())
}

fn cmd_move(ctx: &Context, slot: MealSlot, alt: usize, item: ItemId, target: ItemId) -> Result<()> {
    let mut manager = ctx.open_plan()?;

    if manager.reorder(slot, alt, item, target) {
        ctx.save(&manager)?;
        println!("Moved item {} to the position of item {}.", item, target);
    } else {
        println!("Nothing moved.");
    }
    Ok(())
}

fn cmd_optimize(ctx: &Context, alt: usize) -> Result<()> {
    let config = ctx.optimizer_config()?;
    info!(settings = %config.display(), "optimizer config");
    let catalog = ctx.open_catalog()?;
    let mut manager = ctx.open_plan()?;

    match manager.optimize(alt, &catalog, &config)? {
        Some(report) => {
            ctx.save(&manager)?;
            display_optimization_report(&report);
        }
        None => println!("Alternative {} has no items to optimize.", alt + 1),
    }
    Ok(())
}

fn cmd_totals(ctx: &Context) -> Result<()> {
    let manager = ctx.open_plan()?;
    let rows = daily_overview(manager.plan(), manager.limits());
    display_daily_totals(&rows, manager.limits());
    Ok(())
}

/// Show the limits, or apply the given changes and then show them.
fn cmd_limits(ctx: &Context, values: [Option<f64>; 4], unset: &[MacroArg]) -> Result<()> {
    let mut manager = ctx.open_plan()?;
    let changed = values.iter().any(Option::is_some) || !unset.is_empty();

    if changed {
        for (m, value) in Macro::ALL.into_iter().zip(values) {
            if value.is_some() {
                manager.set_limit(m, value)?;
            }
        }
        for arg in unset {
            manager.set_limit(Macro::from(*arg), None)?;
        }
        ctx.save(&manager)?;
    }

    println!("Daily limits:");
    display_limits(manager.limits());
    Ok(())
}

fn cmd_notes(ctx: &Context, text: Option<String>) -> Result<()> {
    let mut manager = ctx.open_plan()?;

    match text {
        Some(text) => {
            manager.set_notes(text);
            ctx.save(&manager)?;
            println!("Notes saved.");
        }
        None if manager.notes().is_empty() => println!("(no notes)"),
        None => println!("{}", manager.notes()),
    }
    Ok(())
}

fn cmd_clear(ctx: &Context, yes: bool) -> Result<()> {
    let mut manager = ctx.open_plan()?;

    if !manager.plan().has_items() {
        println!("The meal plan is already empty.");
        return Ok(());
    }
    if !confirm_destructive("Remove every meal from the plan?", yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    manager.clear();
    ctx.save(&manager)?;
    println!("Meal plan cleared.");
    Ok(())
}

fn cmd_export(ctx: &Context, file: &Path) -> Result<()> {
    let manager = ctx.open_plan()?;
    let json = export_plan(manager.document(), Utc::now())?;
    fs::write(file, json)?;

    println!("Plan exported to {}.", file.display());
    Ok(())
}

fn cmd_import(ctx: &Context, file: &Path, yes: bool) -> Result<()> {
    let contents = fs::read_to_string(file)?;
    let imported = import_plan(&contents)?;
    let mut manager = ctx.open_plan()?;

    if manager.plan().has_items()
        && !confirm_destructive("Replace the current plan with the imported one?", yes)?
    {
        println!("Cancelled.");
        return Ok(());
    }

    let version = imported.version.clone();
    let rekeyed = imported.rekeyed;
    manager.replace_with(imported);
    ctx.save(&manager)?;

    println!("Imported plan (format {}) from {}.", version, file.display());
    if rekeyed {
        println!("Item ids in the file were not usable and have been renumbered.");
    }
    Ok(())
}

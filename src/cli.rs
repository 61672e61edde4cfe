use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::models::{parse_quantity, Macro, MealSlot};

/// MealPlan: plan a day of meals with alternative menus, fit quantities to
/// macro limits, and move plans between machines.
#[derive(Parser, Debug)]
#[command(name = "meal_plan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the working plan JSON file.
    #[arg(short, long, default_value = "meal_plan.json", global = true)]
    pub plan: PathBuf,

    /// Path to the food catalog (.json or .csv).
    #[arg(short, long, default_value = "foods.json", global = true)]
    pub catalog: PathBuf,

    /// Optional JSON file overriding optimizer constants.
    #[arg(long, global = true)]
    pub optimizer_config: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show every slot with its alternatives.
    Show,

    /// List catalog foods.
    Foods {
        /// Only foods whose name resembles this text.
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Add a new food to the catalog (values per 100 g).
    AddFood {
        name: String,
        category: String,
        #[arg(long)]
        energy: f64,
        #[arg(long)]
        protein: f64,
        #[arg(long)]
        carbohydrate: f64,
        #[arg(long)]
        fat: f64,
        #[arg(long, default_value_t = 0.0)]
        fiber: f64,
        #[arg(long, default_value_t = 0.0)]
        sugar: f64,
    },

    /// Add a food to a meal.
    Add {
        slot: MealSlot,
        /// Catalog id or name.
        food: String,
        #[arg(value_parser = parse_grams)]
        grams: f64,
        /// Alternative number.
        #[arg(short, long, default_value = "1", value_parser = parse_alternative)]
        alt: usize,
    },

    /// Change the quantity of an item.
    SetQuantity {
        slot: MealSlot,
        item: u64,
        #[arg(value_parser = parse_grams)]
        grams: f64,
        #[arg(short, long, default_value = "1", value_parser = parse_alternative)]
        alt: usize,
    },

    /// Remove an item from a meal.
    Remove {
        slot: MealSlot,
        item: u64,
        #[arg(short, long, default_value = "1", value_parser = parse_alternative)]
        alt: usize,
    },

    /// Add an alternative to a slot, copying the active one.
    AddAlt { slot: MealSlot },

    /// Remove an alternative from a slot.
    RemoveAlt {
        slot: MealSlot,
        #[arg(value_parser = parse_alternative)]
        alt: usize,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Make an alternative active in every slot that has it.
    Switch {
        #[arg(value_parser = parse_alternative)]
        alt: usize,
    },

    /// Move an item to the position of another item.
    Move {
        slot: MealSlot,
        item: u64,
        target: u64,
        #[arg(short, long, default_value = "1", value_parser = parse_alternative)]
        alt: usize,
    },

    /// Scale an alternative's quantities to fit the macro limits.
    Optimize {
        #[arg(value_parser = parse_alternative)]
        alt: usize,
    },

    /// Compare daily totals of each alternative against the limits.
    Totals,

    /// Show or change the daily macro limits.
    Limits {
        #[arg(long)]
        energy: Option<f64>,
        #[arg(long)]
        protein: Option<f64>,
        #[arg(long)]
        carbohydrate: Option<f64>,
        #[arg(long)]
        fat: Option<f64>,
        /// Remove a limit.
        #[arg(long, value_enum)]
        unset: Vec<MacroArg>,
    },

    /// Show or replace the plan notes.
    Notes { text: Option<String> },

    /// Remove every meal, keeping limits and notes.
    Clear {
        #[arg(short, long)]
        yes: bool,
    },

    /// Write the plan to a portable file.
    Export { file: PathBuf },

    /// Replace the plan with one read from a file.
    Import {
        file: PathBuf,
        #[arg(short, long)]
        yes: bool,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Show
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroArg {
    Energy,
    Protein,
    Carbohydrate,
    Fat,
}

impl From<MacroArg> for Macro {
    fn from(arg: MacroArg) -> Self {
        match arg {
            MacroArg::Energy => Macro::Energy,
            MacroArg::Protein => Macro::Protein,
            MacroArg::Carbohydrate => Macro::Carbohydrate,
            MacroArg::Fat => Macro::Fat,
        }
    }
}

/// Alternatives are numbered from 1 on the command line.
fn parse_alternative(s: &str) -> std::result::Result<usize, String> {
    let n: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not an alternative number", s))?;
    n.checked_sub(1)
        .ok_or_else(|| "alternatives are numbered from 1".to_string())
}

fn parse_grams(s: &str) -> std::result::Result<f64, String> {
    parse_quantity(s).map_err(|e| e.to_string())
}

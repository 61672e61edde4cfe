use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{PlanError, Result};
use crate::models::{
    validate_quantity, Alternative, Food, FoodId, IdSource, ItemId, MacroLimits, MealItem,
    MealPlan, Nutrients, PlanDocument, SequentialIds, SlotState,
};
use crate::planner::OptimizerConfig;
use crate::state::InMemoryCatalog;

/// Version written into exported plan files.
pub const PLAN_FORMAT_VERSION: &str = "2.0";

// ─────────────────────────────────────────────────────────────────────────────
// Catalog files
// ─────────────────────────────────────────────────────────────────────────────

/// Catalog JSON is either a bare array or the `{success, data}` envelope the
/// catalog service answers with.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogJson {
    Envelope { data: Vec<Food> },
    List(Vec<Food>),
}

/// Flat catalog row for CSV files.
#[derive(Debug, Serialize, Deserialize)]
struct CsvFoodRow {
    id: u64,
    name: String,
    category: String,
    energy: f64,
    protein: f64,
    carbohydrate: f64,
    fat: f64,
    #[serde(default)]
    fiber: f64,
    #[serde(default)]
    sugar: f64,
}

impl From<CsvFoodRow> for Food {
    fn from(row: CsvFoodRow) -> Self {
        Food {
            id: FoodId(row.id),
            name: row.name,
            category: row.category,
            per_100g: Nutrients {
                energy: row.energy,
                protein: row.protein,
                carbohydrate: row.carbohydrate,
                fat: row.fat,
                fiber: row.fiber,
                sugar: row.sugar,
            },
        }
    }
}

impl From<&Food> for CsvFoodRow {
    fn from(food: &Food) -> Self {
        CsvFoodRow {
            id: food.id.0,
            name: food.name.clone(),
            category: food.category.clone(),
            energy: food.per_100g.energy,
            protein: food.per_100g.protein,
            carbohydrate: food.per_100g.carbohydrate,
            fat: food.per_100g.fat,
            fiber: food.per_100g.fiber,
            sugar: food.per_100g.sugar,
        }
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Load a catalog from a `.json` or `.csv` file.
///
/// Duplicate ids: last occurrence wins.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<InMemoryCatalog> {
    let path = path.as_ref();

    let foods: Vec<Food> = if is_csv(path) {
        let mut reader = csv::Reader::from_path(path)?;
        let mut foods = Vec::new();
        for row in reader.deserialize::<CsvFoodRow>() {
            foods.push(row?.into());
        }
        foods
    } else {
        let content = fs::read_to_string(path)?;
        match serde_json::from_str::<CatalogJson>(&content)? {
            CatalogJson::Envelope { data } => data,
            CatalogJson::List(foods) => foods,
        }
    };

    debug!(path = %path.display(), count = foods.len(), "loaded catalog");
    Ok(InMemoryCatalog::new(foods))
}

/// Save a catalog as `.json` or `.csv`, in listing order.
pub fn save_catalog<P: AsRef<Path>>(path: P, catalog: &InMemoryCatalog) -> Result<()> {
    let path = path.as_ref();
    let foods = catalog.to_foods();

    if is_csv(path) {
        let mut writer = csv::Writer::from_path(path)?;
        for food in &foods {
            writer.serialize(CsvFoodRow::from(food))?;
        }
        writer.flush()?;
    } else {
        let json = serde_json::to_string_pretty(&foods)?;
        fs::write(path, json)?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Plan files
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct PlanFileOut<'a> {
    version: &'a str,
    #[serde(rename = "exportDate")]
    export_date: String,
    #[serde(rename = "mealPlan")]
    meal_plan: &'a MealPlan,
    #[serde(rename = "macroLimits")]
    macro_limits: &'a MacroLimits,
    notes: &'a str,
    #[serde(rename = "nextItemId", skip_serializing_if = "is_zero")]
    next_item_id: u64,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

#[derive(Deserialize)]
struct PlanFileIn {
    #[serde(default)]
    version: Option<String>,
    #[serde(rename = "mealPlan", default)]
    meal_plan: Option<RawMealPlan>,
    #[serde(rename = "macroLimits", default)]
    macro_limits: Option<MacroLimits>,
    #[serde(default)]
    notes: Option<String>,
    /// Absent from files written before ids were tracked across sessions.
    #[serde(rename = "nextItemId", default)]
    next_item_id: u64,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawMealPlan {
    #[serde(alias = "breakfast")]
    colazione: Option<RawSlot>,
    #[serde(alias = "lunch")]
    pranzo: Option<RawSlot>,
    #[serde(alias = "dinner")]
    cena: Option<RawSlot>,
    #[serde(alias = "snacks")]
    spuntini: Option<RawSlot>,
}

/// A slot as stored on disk: current files keep parallel alternatives,
/// version 1.0 files keep one flat item list.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSlot {
    Current {
        alternatives: Vec<Vec<RawItem>>,
        #[serde(default)]
        active: usize,
    },
    Legacy(Vec<RawItem>),
}

impl RawSlot {
    fn into_parts(self) -> (Vec<Vec<RawItem>>, usize) {
        match self {
            RawSlot::Current {
                alternatives,
                active,
            } => (alternatives, active),
            RawSlot::Legacy(items) => (vec![items], 0),
        }
    }
}

#[derive(Deserialize)]
struct RawItem {
    /// Older files used fractional timestamps as ids.
    #[serde(default)]
    id: serde_json::Value,
    #[serde(rename = "foodId")]
    food_id: FoodId,
    #[serde(rename = "nome", alias = "name", default)]
    name: String,
    quantity: f64,
    #[serde(flatten)]
    nutrients: Nutrients,
}

/// A parsed plan file, not yet applied to any document.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedPlan {
    pub version: String,
    pub plan: MealPlan,
    /// Limits stored in the file, if the file carries any.
    pub limits: Option<MacroLimits>,
    pub notes: String,
    /// Recorded first free item id; zero when absent or when ids were
    /// reassigned.
    pub next_item_id: u64,
    /// Item ids in the file were unusable and have been reassigned.
    pub rekeyed: bool,
}

impl ImportedPlan {
    /// The document this file describes on its own.
    pub fn into_document(self) -> PlanDocument {
        PlanDocument {
            plan: self.plan,
            limits: self.limits.unwrap_or_default(),
            notes: self.notes,
            next_item_id: self.next_item_id,
        }
    }
}

fn render_plan(doc: &PlanDocument, export_date: DateTime<Utc>) -> Result<String> {
    let file = PlanFileOut {
        version: PLAN_FORMAT_VERSION,
        export_date: export_date.to_rfc3339_opts(SecondsFormat::Millis, true),
        meal_plan: &doc.plan,
        macro_limits: &doc.limits,
        notes: &doc.notes,
        next_item_id: doc.next_item_id,
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Serialize a plan document in the current file format.
///
/// A plan without any item is not exported.
pub fn export_plan(doc: &PlanDocument, export_date: DateTime<Utc>) -> Result<String> {
    if !doc.plan.has_items() {
        return Err(PlanError::EmptyPlan);
    }
    render_plan(doc, export_date)
}

/// Parse a plan file, upgrading version 1.0 layouts.
///
/// Nothing is applied anywhere; a rejected file leaves every plan as it was.
pub fn import_plan(contents: &str) -> Result<ImportedPlan> {
    let file: PlanFileIn = serde_json::from_str(contents)
        .map_err(|e| PlanError::InvalidPlanFile(e.to_string()))?;

    let raw = file
        .meal_plan
        .ok_or_else(|| PlanError::InvalidPlanFile("missing mealPlan".to_string()))?;

    let version = file.version.unwrap_or_else(|| "1.0".to_string());
    let raw_slots = [raw.colazione, raw.pranzo, raw.cena, raw.spuntini]
        .map(|slot| slot.map(RawSlot::into_parts));

    // Keep the stored ids only when every one is a distinct integer.
    let mut seen = HashSet::new();
    let ids_usable = raw_slots
        .iter()
        .flatten()
        .flat_map(|(alternatives, _)| alternatives.iter().flatten())
        .all(|item| item.id.as_u64().is_some_and(|id| seen.insert(id)));

    let mut fresh_ids = SequentialIds::new();
    let mut slots = Vec::with_capacity(4);
    for parts in raw_slots {
        let Some((raw_alternatives, active)) = parts else {
            slots.push(SlotState::default());
            continue;
        };

        let mut alternatives = Vec::with_capacity(raw_alternatives.len());
        for raw_items in raw_alternatives {
            let mut items = Vec::with_capacity(raw_items.len());
            for raw_item in raw_items {
                let quantity = validate_quantity(raw_item.quantity)
                    .map_err(|e| PlanError::InvalidPlanFile(e.to_string()))?;
                let id = match raw_item.id.as_u64() {
                    Some(id) if ids_usable => ItemId(id),
                    _ => fresh_ids.next_id(),
                };
                items.push(MealItem {
                    id,
                    food_id: raw_item.food_id,
                    name: raw_item.name,
                    quantity,
                    nutrients: raw_item.nutrients,
                });
            }
            alternatives.push(Alternative::new(items));
        }
        slots.push(SlotState::from_parts(alternatives, active)?);
    }

    let [breakfast, lunch, dinner, snacks]: [SlotState; 4] = slots
        .try_into()
        .map_err(|_| PlanError::InvalidPlanFile("expected four meal slots".to_string()))?;

    if !ids_usable {
        warn!("plan file item ids were not unique integers, reassigned");
    }

    Ok(ImportedPlan {
        version,
        plan: MealPlan::from_slots(breakfast, lunch, dinner, snacks),
        limits: file.macro_limits,
        notes: file.notes.unwrap_or_default(),
        next_item_id: if ids_usable { file.next_item_id } else { 0 },
        rekeyed: !ids_usable,
    })
}

/// Load the working plan from `path`; a missing file is an empty plan.
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<PlanDocument> {
    let path = path.as_ref();
    if !path.exists() {
        info!(path = %path.display(), "no plan file, starting empty");
        return Ok(PlanDocument::default());
    }
    let content = fs::read_to_string(path)?;
    Ok(import_plan(&content)?.into_document())
}

/// Write the working plan to `path`, empty or not.
pub fn save_plan<P: AsRef<Path>>(path: P, doc: &PlanDocument, saved_at: DateTime<Utc>) -> Result<()> {
    let json = render_plan(doc, saved_at)?;
    fs::write(path.as_ref(), json)?;
    debug!(path = %path.as_ref().display(), "saved plan");
    Ok(())
}

/// Load optimizer settings from a JSON file; absent fields keep defaults.
pub fn load_optimizer_config<P: AsRef<Path>>(path: P) -> Result<OptimizerConfig> {
    let content = fs::read_to_string(path)?;
    let config: OptimizerConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

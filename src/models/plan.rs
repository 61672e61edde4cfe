use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};
use crate::models::{Food, FoodId, ItemId, Macro, Nutrients};

/// One of the four fixed meal slots of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MealSlot {
    #[serde(rename = "colazione", alias = "breakfast")]
    Breakfast,
    #[serde(rename = "pranzo", alias = "lunch")]
    Lunch,
    #[serde(rename = "cena", alias = "dinner")]
    Dinner,
    #[serde(rename = "spuntini", alias = "snacks")]
    Snacks,
}

impl MealSlot {
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::Snacks,
    ];

    /// Key used in plan files.
    pub fn wire_name(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "colazione",
            MealSlot::Lunch => "pranzo",
            MealSlot::Dinner => "cena",
            MealSlot::Snacks => "spuntini",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::Lunch => "Lunch",
            MealSlot::Dinner => "Dinner",
            MealSlot::Snacks => "Snacks",
        };
        f.write_str(name)
    }
}

impl FromStr for MealSlot {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" | "colazione" => Ok(MealSlot::Breakfast),
            "lunch" | "pranzo" => Ok(MealSlot::Lunch),
            "dinner" | "cena" => Ok(MealSlot::Dinner),
            "snacks" | "snack" | "spuntini" => Ok(MealSlot::Snacks),
            other => Err(PlanError::InvalidInput(format!("unknown meal slot '{}'", other))),
        }
    }
}

/// Parse a user-entered gram quantity.
pub fn parse_quantity(input: &str) -> Result<f64> {
    let quantity: f64 = input
        .trim()
        .parse()
        .map_err(|_| PlanError::InvalidQuantity(format!("'{}' is not a number", input.trim())))?;
    validate_quantity(quantity)
}

/// Quantities must be finite and strictly positive.
pub fn validate_quantity(quantity: f64) -> Result<f64> {
    if quantity.is_finite() && quantity > 0.0 {
        Ok(quantity)
    } else {
        Err(PlanError::InvalidQuantity(format!(
            "{} g (must be greater than 0)",
            quantity
        )))
    }
}

/// A food placed in a meal, with nutrients snapshotted for its quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealItem {
    pub id: ItemId,

    #[serde(rename = "foodId")]
    pub food_id: FoodId,

    #[serde(rename = "nome", alias = "name", default)]
    pub name: String,

    /// Grams.
    pub quantity: f64,

    #[serde(flatten)]
    pub nutrients: Nutrients,
}

impl MealItem {
    /// New item for `quantity` grams of `food`. The quantity must already be
    /// validated.
    pub fn new(id: ItemId, food: &Food, quantity: f64) -> Self {
        Self {
            id,
            food_id: food.id,
            name: food.name.clone(),
            quantity,
            nutrients: food.nutrients_for(quantity),
        }
    }

    /// Change the quantity and refresh the nutrient snapshot.
    pub fn set_quantity(&mut self, per_100g: &Nutrients, quantity: f64) {
        self.quantity = quantity;
        self.nutrients = Nutrients::snapshot(per_100g, quantity);
    }

    /// Copy of this item under a new id.
    pub fn duplicate(&self, id: ItemId) -> Self {
        Self { id, ..self.clone() }
    }
}

/// One candidate set of items for a slot, in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Alternative {
    pub(crate) items: Vec<MealItem>,
}

impl Alternative {
    pub fn new(items: Vec<MealItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[MealItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&MealItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The alternatives of one slot and which of them is active.
///
/// Always holds at least one alternative and `active` always indexes one of
/// them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotState {
    pub(crate) alternatives: Vec<Alternative>,
    pub(crate) active: usize,
}

impl Default for SlotState {
    fn default() -> Self {
        Self {
            alternatives: vec![Alternative::default()],
            active: 0,
        }
    }
}

impl SlotState {
    /// Build a slot from loaded parts, checking the slot invariants.
    pub fn from_parts(alternatives: Vec<Alternative>, active: usize) -> Result<Self> {
        if alternatives.is_empty() {
            return Err(PlanError::InvalidPlanFile(
                "a meal slot has no alternatives".to_string(),
            ));
        }
        if active >= alternatives.len() {
            return Err(PlanError::InvalidPlanFile(format!(
                "active alternative {} out of range ({} alternatives)",
                active,
                alternatives.len()
            )));
        }
        Ok(Self {
            alternatives,
            active,
        })
    }

    pub fn alternatives(&self) -> &[Alternative] {
        &self.alternatives
    }

    pub fn alternative(&self, index: usize) -> Option<&Alternative> {
        self.alternatives.get(index)
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn active_alternative(&self) -> &Alternative {
        &self.alternatives[self.active]
    }

    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    /// Whether the slot invariants hold.
    pub fn is_consistent(&self) -> bool {
        !self.alternatives.is_empty() && self.active < self.alternatives.len()
    }
}

/// Four meal slots, each with parallel alternatives.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MealPlan {
    #[serde(rename = "colazione")]
    breakfast: SlotState,
    #[serde(rename = "pranzo")]
    lunch: SlotState,
    #[serde(rename = "cena")]
    dinner: SlotState,
    #[serde(rename = "spuntini")]
    snacks: SlotState,
}

impl MealPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_slots(
        breakfast: SlotState,
        lunch: SlotState,
        dinner: SlotState,
        snacks: SlotState,
    ) -> Self {
        Self {
            breakfast,
            lunch,
            dinner,
            snacks,
        }
    }

    pub fn slot(&self, slot: MealSlot) -> &SlotState {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Dinner => &self.dinner,
            MealSlot::Snacks => &self.snacks,
        }
    }

    pub(crate) fn slot_mut(&mut self, slot: MealSlot) -> &mut SlotState {
        match slot {
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::Dinner => &mut self.dinner,
            MealSlot::Snacks => &mut self.snacks,
        }
    }

    /// Alternative `index` of `slot`, if that slot has one.
    pub fn alternative(&self, slot: MealSlot, index: usize) -> Option<&Alternative> {
        self.slot(slot).alternative(index)
    }

    pub(crate) fn alternative_mut(
        &mut self,
        slot: MealSlot,
        index: usize,
    ) -> Option<&mut Alternative> {
        self.slot_mut(slot).alternatives.get_mut(index)
    }

    /// Largest alternative count across slots.
    pub fn max_alternatives(&self) -> usize {
        MealSlot::ALL
            .iter()
            .map(|s| self.slot(*s).len())
            .max()
            .unwrap_or(1)
    }

    /// Whether any alternative of any slot holds an item.
    pub fn has_items(&self) -> bool {
        self.items().next().is_some()
    }

    /// Every item in the plan, slot by slot.
    pub fn items(&self) -> impl Iterator<Item = &MealItem> {
        MealSlot::ALL.into_iter().flat_map(move |slot| {
            self.slot(slot)
                .alternatives
                .iter()
                .flat_map(|alt| alt.items.iter())
        })
    }

    /// Highest item id in the plan.
    pub fn max_item_id(&self) -> Option<ItemId> {
        self.items().map(|item| item.id).max()
    }

    pub fn is_consistent(&self) -> bool {
        MealSlot::ALL.iter().all(|s| self.slot(*s).is_consistent())
    }
}

/// Optional daily ceilings for the four bounded macros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroLimits {
    #[serde(rename = "calorie", alias = "energy")]
    pub energy: Option<f64>,

    #[serde(rename = "proteine", alias = "protein")]
    pub protein: Option<f64>,

    #[serde(rename = "carboidrati", alias = "carbohydrate")]
    pub carbohydrate: Option<f64>,

    #[serde(rename = "grassi", alias = "fat")]
    pub fat: Option<f64>,
}

impl MacroLimits {
    /// The ceiling for `m`, if one is set. Zero or negative counts as unset.
    pub fn get(&self, m: Macro) -> Option<f64> {
        let value = match m {
            Macro::Energy => self.energy,
            Macro::Protein => self.protein,
            Macro::Carbohydrate => self.carbohydrate,
            Macro::Fat => self.fat,
        };
        value.filter(|v| v.is_finite() && *v > 0.0)
    }

    pub fn set(&mut self, m: Macro, value: Option<f64>) {
        let slot = match m {
            Macro::Energy => &mut self.energy,
            Macro::Protein => &mut self.protein,
            Macro::Carbohydrate => &mut self.carbohydrate,
            Macro::Fat => &mut self.fat,
        };
        *slot = value;
    }

    /// Take every limit `other` sets; keep ours where it is unset.
    pub fn merge(&mut self, other: &MacroLimits) {
        for m in Macro::ALL {
            if let Some(value) = other.get(m) {
                self.set(m, Some(value));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        Macro::ALL.iter().all(|m| self.get(*m).is_none())
    }
}

/// Everything that is exported and imported together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanDocument {
    pub plan: MealPlan,
    pub limits: MacroLimits,
    pub notes: String,
    /// Lowest item id not yet handed out for this plan, removed items
    /// included. Zero when not recorded.
    pub next_item_id: u64,
}

impl PlanDocument {
    /// First id that is safe to hand out: above every id in the plan and
    /// not below the recorded mark.
    pub fn first_free_id(&self) -> u64 {
        let after_max = self.plan.max_item_id().map_or(1, |id| id.0 + 1);
        self.next_item_id.max(after_max)
    }
}

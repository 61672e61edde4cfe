use std::collections::HashMap;

use strsim::jaro_winkler;
use tracing::debug;

use crate::error::{PlanError, Result};
use crate::models::{Food, FoodId, NewFood};

/// Read access to per-100g food coefficients.
pub trait FoodCatalog {
    fn food(&self, id: FoodId) -> Option<&Food>;

    /// All foods, ordered by category then name.
    fn foods(&self) -> Vec<&Food>;
}

/// Catalog held in memory, keyed by food id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    foods: HashMap<FoodId, Food>,
}

impl InMemoryCatalog {
    /// Build a catalog from a list of foods. Later duplicates of an id win.
    pub fn new(foods: Vec<Food>) -> Self {
        let mut map = HashMap::new();
        for food in foods {
            map.insert(food.id, food);
        }
        Self { foods: map }
    }

    /// Find a food by exact name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<&Food> {
        let key = name.trim().to_lowercase();
        self.foods.values().find(|f| f.key() == key)
    }

    /// Foods whose name is similar to `query`, best match first.
    pub fn search(&self, query: &str, threshold: f64) -> Vec<(&Food, f64)> {
        let query = query.trim().to_lowercase();
        let mut candidates: Vec<(&Food, f64)> = self
            .foods
            .values()
            .map(|f| (f, jaro_winkler(&f.key(), &query)))
            .filter(|(_, score)| *score > threshold)
            .collect();

        candidates.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });
        candidates
    }

    /// Validate and add a new food under the next free id.
    pub fn insert(&mut self, new_food: NewFood) -> Result<&Food> {
        new_food.validate().map_err(PlanError::InvalidFood)?;

        let id = FoodId(self.foods.keys().map(|id| id.0).max().unwrap_or(0) + 1);
        let food = new_food.into_food(id);
        debug!(food = %food.debug_string(), "inserted catalog food");

        Ok(self.foods.entry(id).or_insert(food))
    }

    /// Foods for serialization, in listing order.
    pub fn to_foods(&self) -> Vec<Food> {
        self.foods().into_iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }
}

impl FoodCatalog for InMemoryCatalog {
    fn food(&self, id: FoodId) -> Option<&Food> {
        self.foods.get(&id)
    }

    fn foods(&self) -> Vec<&Food> {
        let mut foods: Vec<&Food> = self.foods.values().collect();
        foods.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
        foods
    }
}

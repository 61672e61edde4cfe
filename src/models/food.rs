use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Nutrients;

/// Catalog key of a food.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FoodId(pub u64);

impl fmt::Display for FoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A catalog food with nutrient coefficients per 100 g.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: FoodId,

    #[serde(rename = "nome", alias = "name")]
    pub name: String,

    #[serde(rename = "categoria", alias = "category")]
    pub category: String,

    #[serde(flatten)]
    pub per_100g: Nutrients,
}

impl Food {
    /// Nutrients contributed by `quantity` grams of this food.
    pub fn nutrients_for(&self, quantity: f64) -> Nutrients {
        Nutrients::snapshot(&self.per_100g, quantity)
    }

    /// Canonical key for name lookups (lowercase name).
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Debug string for logging.
    pub fn debug_string(&self) -> String {
        format!(
            "{} {} [{}]: {} kcal, P:{} C:{} F:{} Fi:{} S:{}",
            self.id,
            self.name,
            self.category,
            self.per_100g.energy,
            self.per_100g.protein,
            self.per_100g.carbohydrate,
            self.per_100g.fat,
            self.per_100g.fiber,
            self.per_100g.sugar
        )
    }
}

/// A food submitted for insertion into the catalog; the id is assigned on
/// insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFood {
    pub name: String,
    pub category: String,
    pub per_100g: Nutrients,
}

impl NewFood {
    /// Check name and category are non-empty and every nutrient is a
    /// non-negative number. Returns the reason on failure.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() || self.category.trim().is_empty() {
            return Err("name and category are required".to_string());
        }
        if !self.per_100g.is_valid() {
            return Err("nutrient values must be non-negative".to_string());
        }
        Ok(())
    }

    /// Build the catalog record under `id`, trimming name and category.
    pub fn into_food(self, id: FoodId) -> Food {
        Food {
            id,
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            per_100g: self.per_100g,
        }
    }
}

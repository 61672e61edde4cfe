use thiserror::Error;

use crate::models::{FoodId, MealSlot};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Food not found: {0}")]
    FoodNotFound(FoodId),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Cannot remove the only alternative of {0}")]
    LastAlternative(MealSlot),

    #[error("{slot} has no alternative {}", .index + 1)]
    AlternativeNotFound { slot: MealSlot, index: usize },

    #[error("Invalid food: {0}")]
    InvalidFood(String),

    #[error("Invalid plan file: {0}")]
    InvalidPlanFile(String),

    #[error("The meal plan has no items")]
    EmptyPlan,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PlanError {
    /// Whether this is a rejected user operation rather than an I/O failure.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            PlanError::Io(_) | PlanError::Json(_) | PlanError::Prompt(_) | PlanError::Csv(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;

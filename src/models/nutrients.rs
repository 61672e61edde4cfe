use std::fmt;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// The six tracked nutrient values.
///
/// Catalog foods store these per 100 g; meal items store the snapshot for
/// their own quantity. Wire names follow the plan file format; missing
/// values read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nutrients {
    /// Energy in kcal.
    #[serde(rename = "calorie", alias = "energy")]
    pub energy: f64,

    #[serde(rename = "proteine", alias = "protein")]
    pub protein: f64,

    #[serde(rename = "carboidrati", alias = "carbohydrate")]
    pub carbohydrate: f64,

    #[serde(rename = "grassi", alias = "fat")]
    pub fat: f64,

    #[serde(rename = "fibre", alias = "fiber")]
    pub fiber: f64,

    #[serde(rename = "zuccheri", alias = "sugar")]
    pub sugar: f64,
}

impl Nutrients {
    /// Nutrients of `quantity` grams of a food with the given per-100g
    /// coefficients, each rounded to 2 decimal places.
    ///
    /// Every path that sets an item quantity goes through here so the stored
    /// snapshot never drifts from the quantity.
    pub fn snapshot(per_100g: &Nutrients, quantity: f64) -> Nutrients {
        let multiplier = quantity / 100.0;
        Nutrients {
            energy: round2(per_100g.energy * multiplier),
            protein: round2(per_100g.protein * multiplier),
            carbohydrate: round2(per_100g.carbohydrate * multiplier),
            fat: round2(per_100g.fat * multiplier),
            fiber: round2(per_100g.fiber * multiplier),
            sugar: round2(per_100g.sugar * multiplier),
        }
    }

    /// Value of one of the four bounded macros.
    #[inline]
    pub fn macro_value(&self, m: Macro) -> f64 {
        match m {
            Macro::Energy => self.energy,
            Macro::Protein => self.protein,
            Macro::Carbohydrate => self.carbohydrate,
            Macro::Fat => self.fat,
        }
    }

    /// All values are finite and non-negative.
    pub fn is_valid(&self) -> bool {
        [
            self.energy,
            self.protein,
            self.carbohydrate,
            self.fat,
            self.fiber,
            self.sugar,
        ]
        .iter()
        .all(|v| v.is_finite() && *v >= 0.0)
    }
}

impl Add for Nutrients {
    type Output = Nutrients;

    fn add(mut self, rhs: Nutrients) -> Nutrients {
        self += rhs;
        self
    }
}

impl AddAssign for Nutrients {
    fn add_assign(&mut self, rhs: Nutrients) {
        self.energy += rhs.energy;
        self.protein += rhs.protein;
        self.carbohydrate += rhs.carbohydrate;
        self.fat += rhs.fat;
        self.fiber += rhs.fiber;
        self.sugar += rhs.sugar;
    }
}

/// The four macros that can carry a daily ceiling.
///
/// Fiber and sugar are tracked but never constrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Macro {
    Energy,
    Protein,
    Carbohydrate,
    Fat,
}

impl Macro {
    pub const ALL: [Macro; 4] = [Macro::Energy, Macro::Protein, Macro::Carbohydrate, Macro::Fat];

    pub fn unit(self) -> &'static str {
        match self {
            Macro::Energy => "kcal",
            _ => "g",
        }
    }
}

impl fmt::Display for Macro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Macro::Energy => "energy",
            Macro::Protein => "protein",
            Macro::Carbohydrate => "carbohydrate",
            Macro::Fat => "fat",
        };
        f.pad(name)
    }
}

/// Round to 2 decimal places.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

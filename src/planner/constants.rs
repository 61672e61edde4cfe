use crate::models::Macro;

// ─────────────────────────────────────────────────────────────────────────────
// Fallback daily limits used by the optimizer when a limit is unset
// ─────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_ENERGY_LIMIT: f64 = 2500.0;
pub const DEFAULT_PROTEIN_LIMIT: f64 = 150.0;
pub const DEFAULT_CARBOHYDRATE_LIMIT: f64 = 300.0;
pub const DEFAULT_FAT_LIMIT: f64 = 80.0;

// ─────────────────────────────────────────────────────────────────────────────
// Quantity optimizer
// ─────────────────────────────────────────────────────────────────────────────

/// Utilization the one-off downscale aims for when the pool starts over a limit.
pub const DOWNSCALE_TARGET: f64 = 0.95;

/// Growth rounds stop once the limiting factor reaches this utilization.
pub const CONVERGENCE_THRESHOLD: f64 = 0.95;

/// Fraction of each limit a growth round may fill.
pub const HEADROOM: f64 = 0.98;

/// A growth round needs a scale above `1 + TOLERANCE` to be worth applying.
pub const SCALE_TOLERANCE: f64 = 0.01;

/// Largest per-round growth factor.
pub const MAX_GROWTH_PER_ROUND: f64 = 1.5;

/// Items never drop below this many grams during a downscale.
pub const MIN_QUANTITY_GRAMS: f64 = 10.0;

/// Upper bound on growth rounds.
pub const MAX_ITERATIONS: usize = 100;

// ─────────────────────────────────────────────────────────────────────────────
// Catalog search
// ─────────────────────────────────────────────────────────────────────────────

/// Minimum Jaro-Winkler similarity for a fuzzy food-name match.
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.7;

/// Maximum number of fuzzy candidates offered to the user.
pub const MAX_FUZZY_CANDIDATES: usize = 5;

/// Fallback limit for a macro.
pub fn default_limit(m: Macro) -> f64 {
    match m {
        Macro::Energy => DEFAULT_ENERGY_LIMIT,
        Macro::Protein => DEFAULT_PROTEIN_LIMIT,
        Macro::Carbohydrate => DEFAULT_CARBOHYDRATE_LIMIT,
        Macro::Fat => DEFAULT_FAT_LIMIT,
    }
}

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PlanError, Result};
use crate::models::{MacroLimits, Macro, MealPlan, MealSlot, Nutrients};
use crate::planner::constants::*;
use crate::planner::totals::{daily_totals, Totals};
use crate::state::FoodCatalog;

/// Runtime-configurable optimizer constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub downscale_target: f64,
    pub convergence_threshold: f64,
    pub headroom: f64,
    pub tolerance: f64,
    pub max_growth_per_round: f64,
    pub min_quantity: f64,
    pub max_iterations: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            downscale_target: DOWNSCALE_TARGET,
            convergence_threshold: CONVERGENCE_THRESHOLD,
            headroom: HEADROOM,
            tolerance: SCALE_TOLERANCE,
            max_growth_per_round: MAX_GROWTH_PER_ROUND,
            min_quantity: MIN_QUANTITY_GRAMS,
            max_iterations: MAX_ITERATIONS,
        }
    }
}

impl OptimizerConfig {
    /// Reject values that would make the scaling loop meaningless.
    pub fn validate(&self) -> Result<()> {
        let fractions = [
            ("downscale_target", self.downscale_target),
            ("convergence_threshold", self.convergence_threshold),
            ("headroom", self.headroom),
        ];
        for (name, value) in fractions {
            if !(value > 0.0 && value <= 1.0) {
                return Err(PlanError::InvalidInput(format!(
                    "{} must be in (0, 1], got {}",
                    name, value
                )));
            }
        }
        if !(self.tolerance >= 0.0) {
            return Err(PlanError::InvalidInput("tolerance must be >= 0".to_string()));
        }
        if !(self.max_growth_per_round > 1.0) {
            return Err(PlanError::InvalidInput(
                "max_growth_per_round must be > 1".to_string(),
            ));
        }
        if !(self.min_quantity > 0.0) {
            return Err(PlanError::InvalidInput("min_quantity must be > 0".to_string()));
        }
        Ok(())
    }

    /// Format the config as a compact string for display.
    pub fn display(&self) -> String {
        format!(
            "down={:.3} conv={:.3} head={:.3} tol={:.3} growth={:.2} min={:.0}g iters={}",
            self.downscale_target,
            self.convergence_threshold,
            self.headroom,
            self.tolerance,
            self.max_growth_per_round,
            self.min_quantity,
            self.max_iterations
        )
    }
}

/// Limits the optimizer works against: the user's where set, defaults
/// elsewhere. Indexed in `Macro::ALL` order.
pub fn effective_limits(limits: &MacroLimits) -> [f64; 4] {
    Macro::ALL.map(|m| limits.get(m).unwrap_or_else(|| default_limit(m)))
}

/// Outcome of the pure scaling run over a list of quantities.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleOutcome {
    /// Unrounded quantities, same order as the input.
    pub quantities: Vec<f64>,
    pub iterations: usize,
    pub downscaled: bool,
    pub limiting_factor: f64,
    pub limiting_macro: Macro,
}

/// Summary of an optimization run, for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationReport {
    pub alternative: usize,
    pub items_adjusted: usize,
    pub iterations: usize,
    pub downscaled: bool,
    /// Highest total/limit ratio over the bounded macros when scaling stopped.
    pub limiting_factor: f64,
    pub limiting_macro: Macro,
    /// Limits the run worked against.
    pub limits: [f64; 4],
    /// Daily totals of the alternative after rounding.
    pub totals: Totals,
}

impl OptimizationReport {
    /// Limiting factor as a percentage.
    pub fn utilization_pct(&self) -> f64 {
        self.limiting_factor * 100.0
    }
}

fn macro_totals(coefficients: &[Nutrients], quantities: &[f64]) -> [f64; 4] {
    Macro::ALL.map(|m| {
        coefficients
            .iter()
            .zip(quantities)
            .fold(0.0, |sum, (c, q)| sum + c.macro_value(m) * q / 100.0)
    })
}

/// Highest total/limit ratio and the macro that produces it.
fn limiting_factor(totals: &[f64; 4], limits: &[f64; 4]) -> (f64, Macro) {
    let mut best = (totals[0] / limits[0], Macro::ALL[0]);
    for i in 1..4 {
        let ratio = totals[i] / limits[i];
        if ratio > best.0 {
            best = (ratio, Macro::ALL[i]);
        }
    }
    best
}

/// Scale `quantities` proportionally towards the limits.
///
/// If the pool starts over a limit it is scaled down once to
/// `downscale_target` utilization, with each quantity floored at
/// `min_quantity`. It then grows by a common factor per round, each round
/// filling at most `headroom` of the tightest limit and growing at most
/// `max_growth_per_round`, until the limiting factor reaches
/// `convergence_threshold`, growth falls within `tolerance`, or
/// `max_iterations` rounds have run.
///
/// A pool whose totals are zero for every macro is returned unchanged with
/// no growth rounds. No limit bounds its growth, so a loop capped only by
/// rounds would multiply it by `max_growth_per_round` on each of
/// `max_iterations` rounds instead.
pub fn scale_quantities(
    coefficients: &[Nutrients],
    quantities: &[f64],
    limits: &[f64; 4],
    config: &OptimizerConfig,
) -> ScaleOutcome {
    let mut quantities = quantities.to_vec();
    let mut totals = macro_totals(coefficients, &quantities);
    let (mut factor, mut limiting) = limiting_factor(&totals, limits);
    let mut downscaled = false;

    if factor > 1.0 {
        let scale = config.downscale_target / factor;
        for q in quantities.iter_mut() {
            *q = (*q * scale).max(config.min_quantity);
        }
        totals = macro_totals(coefficients, &quantities);
        (factor, limiting) = limiting_factor(&totals, limits);
        downscaled = true;
        debug!(scale, factor, "downscaled pool");
    }

    let mut iterations = 0;
    while iterations < config.max_iterations && factor < config.convergence_threshold {
        let max_scale = (0..4)
            .map(|i| {
                if totals[i] > 0.0 {
                    limits[i] * config.headroom / totals[i]
                } else {
                    f64::INFINITY
                }
            })
            .fold(f64::INFINITY, f64::min);

        // Nothing in the pool counts against any limit, so growth is unbounded.
        if !max_scale.is_finite() {
            break;
        }
        if max_scale <= 1.0 + config.tolerance {
            break;
        }

        let growth = max_scale.min(config.max_growth_per_round);
        for q in quantities.iter_mut() {
            *q *= growth;
        }
        totals = macro_totals(coefficients, &quantities);
        (factor, limiting) = limiting_factor(&totals, limits);
        iterations += 1;
        debug!(iterations, growth, factor, "growth round");
    }

    ScaleOutcome {
        quantities,
        iterations,
        downscaled,
        limiting_factor: factor,
        limiting_macro: limiting,
    }
}

/// Where a pooled item lives, and its catalog coefficients.
struct PoolEntry {
    slot: MealSlot,
    position: usize,
    per_100g: Nutrients,
}

/// Fit the quantities of every item of alternative `alt`, across all four
/// slots, to the daily limits.
///
/// Slots without that alternative contribute nothing. Returns `Ok(None)`
/// without touching the plan when the pool is empty. Every item's catalog
/// food is resolved before anything is changed.
pub fn optimize(
    plan: &mut MealPlan,
    alt: usize,
    catalog: &impl FoodCatalog,
    limits: &MacroLimits,
    config: &OptimizerConfig,
) -> Result<Option<OptimizationReport>> {
    let mut pool = Vec::new();
    let mut quantities = Vec::new();

    for slot in MealSlot::ALL {
        let Some(alternative) = plan.alternative(slot, alt) else {
            continue;
        };
        for (position, item) in alternative.items().iter().enumerate() {
            let food = catalog
                .food(item.food_id)
                .ok_or(PlanError::FoodNotFound(item.food_id))?;
            pool.push(PoolEntry {
                slot,
                position,
                per_100g: food.per_100g,
            });
            quantities.push(item.quantity);
        }
    }

    if pool.is_empty() {
        info!(alternative = alt, "nothing to optimize");
        return Ok(None);
    }

    let limits = effective_limits(limits);
    let coefficients: Vec<Nutrients> = pool.iter().map(|entry| entry.per_100g).collect();
    let outcome = scale_quantities(&coefficients, &quantities, &limits, config);

    for (entry, quantity) in pool.iter().zip(&outcome.quantities) {
        // Rounding must not produce an empty item.
        let grams = quantity.round().max(1.0);
        if let Some(item) = plan
            .alternative_mut(entry.slot, alt)
            .and_then(|a| a.items.get_mut(entry.position))
        {
            item.set_quantity(&entry.per_100g, grams);
        }
    }

    let report = OptimizationReport {
        alternative: alt,
        items_adjusted: pool.len(),
        iterations: outcome.iterations,
        downscaled: outcome.downscaled,
        limiting_factor: outcome.limiting_factor,
        limiting_macro: outcome.limiting_macro,
        limits,
        totals: daily_totals(plan, alt),
    };

    info!(
        alternative = alt,
        items = report.items_adjusted,
        iterations = report.iterations,
        utilization = report.utilization_pct(),
        limiting = %report.limiting_macro,
        "optimized quantities"
    );
    Ok(Some(report))
}

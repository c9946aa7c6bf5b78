//! `HardSoftScore`, grounded on the teacher's `HardSoftDecimalScore` (the
//! score type `solverforge`'s constraint streams produce) but reimplemented
//! as a plain penalty pair since the model is scored by hand rather than by
//! a constraint-stream engine: hard constraints that can't be enforced
//! structurally by `solver::model::Model::is_legal` (monthly bounds, strict
//! bands) contribute to `hard`; coverage shortage/overstaff and unmet
//! preferences contribute to `soft`. Lower is better in both fields, and
//! `hard` is compared first so a single hard violation always outweighs any
//! amount of soft penalty.

use crate::domain::WINDOW_LABELS;

use super::coverage;
use super::model::{Model, Solution};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct HardSoftScore {
    pub hard: i64,
    pub soft: i64,
}

impl HardSoftScore {
    pub const ZERO: HardSoftScore = HardSoftScore { hard: 0, soft: 0 };

    pub fn is_feasible(&self) -> bool {
        self.hard == 0
    }
}

/// Full re-evaluation of `solution` against `model`. The model is small
/// enough (tens of people, ~31 days) that recomputing from scratch on every
/// move proposal is simpler to reason about than maintaining incremental
/// deltas, at the cost of doing more work per move than a production CP-SAT
/// backend would.
pub fn evaluate(model: &Model, solution: &Solution) -> HardSoftScore {
    let mut hard = 0i64;
    let mut soft = 0i64;

    for (p_idx, person) in model.people.iter().enumerate() {
        let mut total = 0i32;
        for d in 0..model.num_days {
            if model.worked(solution, p_idx, d as i32) {
                total += 1;
            }
        }
        if total < person.monthly_min {
            hard += (person.monthly_min - total) as i64;
        }
        if total > person.monthly_max {
            hard += (total - person.monthly_max) as i64;
        }
    }

    let breakdown = coverage::breakdown(model, solution);
    for (d, row) in breakdown.iter().enumerate() {
        for &label in WINDOW_LABELS.iter() {
            let cell = &row[label];
            if cell.shortage > 0 {
                soft += cell.shortage as i64 * model.weights.shortage_weight(label);
            }
            if cell.actual > cell.need {
                soft += (cell.actual - cell.need) as i64 * model.weights.w_overstaff_gt_need_plus1;
            }

            if let Some(band) = model.strict_bands.get(label) {
                let actual = coverage::actual(model, solution, d as i32, label);
                if let Some(min) = band.min {
                    if actual < min {
                        hard += (min - actual) as i64;
                    }
                }
                if let Some(max) = band.max {
                    if actual > max {
                        hard += (actual - max) as i64;
                    }
                }
            }
        }
    }

    if model.weights.w_requested_off_violation > 0 {
        for (p_idx, prefs) in model.shift_preferences.iter().enumerate() {
            for (&day, &preferred) in prefs {
                if day >= model.num_days || !model.eligible[p_idx][preferred] {
                    continue;
                }
                if solution.assignment[p_idx][day] != Some(preferred) {
                    soft += model.weights.w_requested_off_violation;
                }
            }
        }
    }

    HardSoftScore { hard, soft }
}

//! Shared `actual(d, label)` coverage formula (`spec.md` §4.2/§4.4), used by
//! both the soft-objective scorer and the result renderer so the two can
//! never disagree about what was actually staffed on a given day.

use std::collections::HashMap;

use crate::domain::{CoverageBreakdown, CoverageCell, WINDOW_LABELS};

use super::model::{Model, Solution};

/// `actual(d, label)`: same-day coverage plus the portion carried over from
/// the previous day's late-running shifts (or, for day 0, from
/// `previousMonthNightCarry`).
pub fn actual(model: &Model, solution: &Solution, day: i32, label: &str) -> i32 {
    let mut total = 0;

    for code in model.windows.same_day_codes(label) {
        let Some(&s_idx) = model.shift_index.get(code) else { continue };
        for p in 0..model.people.len() {
            if solution.assignment[p][day as usize] == Some(s_idx) {
                total += 1;
            }
        }
    }

    if day > 0 {
        for code in model.windows.carry_over_codes(label) {
            let Some(&s_idx) = model.shift_index.get(code) else { continue };
            for p in 0..model.people.len() {
                if solution.assignment[p][(day - 1) as usize] == Some(s_idx) {
                    total += 1;
                }
            }
        }
    } else {
        for code in model.windows.carry_over_codes(label) {
            let Some(&s_idx) = model.shift_index.get(code) else { continue };
            if let Some(people) = model.previous_month_night_carry.get(&s_idx) {
                total += people.len() as i32;
            }
        }
    }

    total
}

/// `coverageBreakdown[day(1-based)][label] = {need, actual, shortage}`.
pub fn breakdown(model: &Model, solution: &Solution) -> CoverageBreakdown {
    (0..model.num_days)
        .map(|d| {
            let day_type = model.day_type_by_date[d];
            let needs = model.need_template.for_day_type(day_type);
            let mut row: HashMap<String, CoverageCell> = HashMap::new();
            for &label in WINDOW_LABELS.iter() {
                let need = needs.get(label);
                let act = actual(model, solution, d as i32, label);
                let shortage = (need - act).max(0);
                row.insert(
                    label.to_string(),
                    CoverageCell {
                        need,
                        actual: act,
                        shortage,
                    },
                );
            }
            row
        })
        .collect()
}

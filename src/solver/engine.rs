//! Solver driver (`spec.md` §4.3).
//!
//! The teacher's `employee-scheduling` crate hands its model to
//! `solverforge`'s own local-search implementation. With that dependency
//! dropped (see `DESIGN.md`), this module is the replacement: a greedy
//! construction pass followed by simulated-annealing repair, grounded on
//! `other_examples/`'s `asimihsan-constraint-solver` (iterated local search
//! over a scored solution) and `guwidoe-GroupMixer` (state mutated in place,
//! rescored after each accepted move).
//!
//! The CP-SAT API surface spec.md's Design Notes ask to hide behind "a
//! narrow constraint-emitter interface" is `Model::is_legal` plus
//! `score::evaluate` — an alternative backend only needs to reproduce those
//! two contracts.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::SolverStatus;

use super::model::{Cell, Model, Solution};
use super::score::{self, HardSoftScore};

#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    pub time_budget: Duration,
    pub seed: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_budget: Duration::from_secs(60),
            seed: 0,
        }
    }
}

pub struct SolveOutcome {
    pub solution: Solution,
    pub status: SolverStatus,
}

pub fn solve(model: &Model, config: SolverConfig) -> SolveOutcome {
    if model.num_days == 0 {
        return SolveOutcome {
            solution: Solution::empty(model.people.len(), 0),
            status: SolverStatus::Optimal,
        };
    }

    if let Some(_reason) = detect_model_invalid(model) {
        return SolveOutcome {
            solution: Solution::empty(model.people.len(), model.num_days),
            status: SolverStatus::ModelInvalid,
        };
    }

    if config.time_budget.is_zero() {
        let solution = Solution::empty(model.people.len(), model.num_days);
        let status = if model.people.is_empty() {
            SolverStatus::Optimal
        } else {
            SolverStatus::Unknown
        };
        return SolveOutcome { solution, status };
    }

    let deadline = Instant::now() + config.time_budget;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut solution = construct(model);
    let mut score = score::evaluate(model, &solution);

    repair(model, &mut solution, &mut score, &mut rng, deadline);

    let status = if score.is_feasible() {
        if score.soft == 0 {
            SolverStatus::Optimal
        } else {
            SolverStatus::Feasible
        }
    } else {
        SolverStatus::Infeasible
    };

    SolveOutcome { solution, status }
}

/// Model-level contradictions a CP-SAT backend would reject at build time
/// (`MODEL_INVALID`), rather than something a search loop could ever climb
/// out of.
fn detect_model_invalid(model: &Model) -> Option<String> {
    for person in &model.people {
        if person.monthly_min > person.monthly_max {
            return Some(format!(
                "{}: monthlyMin {} exceeds monthlyMax {}",
                person.id, person.monthly_min, person.monthly_max
            ));
        }
        if person.weekly_min > person.weekly_max {
            return Some(format!(
                "{}: weeklyMin {} exceeds weeklyMax {}",
                person.id, person.weekly_min, person.weekly_max
            ));
        }
        if person.consec_max < 0 {
            return Some(format!("{}: consecMax is negative", person.id));
        }
    }
    None
}

/// Greedy construction: for each day, for each window label in descending
/// order of remaining shortage, assign an available eligible person to a
/// shift covering that window, preferring people with more remaining
/// monthly-minimum slack. People in input order, days ascending, per
/// `spec.md` §5's determinism requirement.
fn construct(model: &Model) -> Solution {
    let mut solution = Solution::empty(model.people.len(), model.num_days);

    for day in 0..model.num_days {
        let mut people_order: Vec<usize> = (0..model.people.len()).collect();
        people_order.sort_by_key(|&p| remaining_monthly_min(model, &solution, p, day));

        for &p in &people_order {
            if solution.assignment[p][day].is_some() {
                continue;
            }
            let mut candidates = model.candidates(p, day);
            candidates.retain(|&c| c.is_some());
            if candidates.is_empty() {
                continue;
            }

            let preferred = model.shift_preferences[p].get(&day).copied();
            candidates.sort_by_key(|c| {
                let s = c.unwrap();
                let want_more = if Some(s) == preferred { 0 } else { 1 };
                (want_more, shortage_rank(model, &solution, day, s))
            });

            for choice in candidates {
                if model.is_legal(&solution, p, day, choice) {
                    solution.assignment[p][day] = choice;
                    break;
                }
            }
        }
    }

    solution
}

fn remaining_monthly_min(model: &Model, solution: &Solution, person: usize, upto_day: usize) -> i32 {
    let worked_so_far = (0..upto_day)
        .filter(|&d| model.worked(solution, person, d as i32))
        .count() as i32;
    model.people[person].monthly_min - worked_so_far
}

fn shortage_rank(model: &Model, solution: &Solution, day: usize, shift: usize) -> i32 {
    let mut rank = 0;
    for &label in crate::domain::WINDOW_LABELS.iter() {
        if model.windows.same_day_codes(label).iter().any(|c| model.shift_index.get(c) == Some(&shift)) {
            let breakdown_cell = super::coverage::actual(model, solution, day as i32, label);
            let needs = model.need_template.for_day_type(model.day_type_by_date[day]);
            rank -= (needs.get(label) - breakdown_cell).max(0);
        }
    }
    rank
}

/// Simulated-annealing repair: propose a random (person, day) change,
/// accept immediately if it doesn't worsen the score, otherwise accept with
/// probability `exp(-delta / temperature)` where `delta` is measured on the
/// soft score alone once the solution is already hard-feasible (accepting a
/// hard regression is never worth it once feasible).
fn repair(
    model: &Model,
    solution: &mut Solution,
    score: &mut HardSoftScore,
    rng: &mut StdRng,
    deadline: Instant,
) {
    if model.people.is_empty() {
        return;
    }

    let initial_temperature = 4.0f64;
    let mut iteration = 0u64;

    while Instant::now() < deadline {
        iteration += 1;
        let temperature = initial_temperature / (1.0 + iteration as f64 * 0.001);

        let person = rng.gen_range(0..model.people.len());
        let day = rng.gen_range(0..model.num_days);
        let candidates = model.candidates(person, day);
        if candidates.len() <= 1 {
            continue;
        }
        let choice = candidates[rng.gen_range(0..candidates.len())];
        if choice == solution.assignment[person][day] {
            continue;
        }
        if !model.is_legal(solution, person, day, choice) {
            continue;
        }

        let previous = solution.assignment[person][day];
        solution.assignment[person][day] = choice;
        let candidate_score = score::evaluate(model, solution);

        let accept = if candidate_score <= *score {
            true
        } else if candidate_score.hard > score.hard {
            false
        } else {
            let delta = (candidate_score.soft - score.soft) as f64;
            rng.gen::<f64>() < (-delta / temperature.max(0.01)).exp()
        };

        if accept {
            *score = candidate_score;
        } else {
            solution.assignment[person][day] = previous;
        }

        if iteration % 4096 == 0 && Instant::now() >= deadline {
            break;
        }
    }
}

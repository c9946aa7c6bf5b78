//! Result rendering (`spec.md` §4.4): turns a solved [`crate::solver::Solution`]
//! into the wire-facing [`ScheduleResponse`], sharing the coverage formula
//! with `solver::score` so the two can never disagree about a shortage
//! number.
//!
//! Cell priority per person/day, in order: night-recovery token, paid-leave
//! token, the first eligible shift actually assigned, else `null`. Response
//! day numbers are 1-based; everything upstream of this module is 0-based.

use crate::domain::{
    CoverageCell, PersonSchedule, ScheduleResponse, ShortageInfo, SolverStatus, WINDOW_LABELS,
    NIGHT_RECOVERY_TOKEN, PAID_LEAVE_TOKEN,
};
use crate::solver::{coverage, Model, Solution};

/// Renders a solved model into the response the `generateSchedule` and
/// `draft` endpoints return. When `status` doesn't render a schedule
/// (`spec.md` §4.3: `INFEASIBLE`/`MODEL_INVALID`/`UNKNOWN`), the schedule and
/// coverage fields are empty and `message` carries a human-readable note.
pub fn render(model: &Model, solution: &Solution, status: SolverStatus) -> ScheduleResponse {
    if !status.renders_schedule() {
        return ScheduleResponse {
            schedule: Default::default(),
            shortages: Vec::new(),
            coverage_breakdown: Vec::new(),
            status: status.name().to_string(),
            message: Some(infeasible_message(status)),
        };
    }

    let schedule = model
        .people
        .iter()
        .enumerate()
        .map(|(p_idx, person)| (person.id.clone(), render_person(model, solution, p_idx)))
        .collect();

    let breakdown = coverage::breakdown(model, solution);
    let shortages = shortages_from(&breakdown);

    ScheduleResponse {
        schedule,
        shortages,
        coverage_breakdown: breakdown,
        status: status.name().to_string(),
        message: None,
    }
}

fn render_person(model: &Model, solution: &Solution, person: usize) -> PersonSchedule {
    (0..model.num_days)
        .map(|day| render_cell(model, solution, person, day))
        .collect()
}

fn render_cell(model: &Model, solution: &Solution, person: usize, day: usize) -> Option<String> {
    let (_, recovery) = model.night_status(solution, person, day as i32);
    if recovery {
        return Some(NIGHT_RECOVERY_TOKEN.to_string());
    }
    if model.paid_leave[person][day] {
        return Some(PAID_LEAVE_TOKEN.to_string());
    }
    solution.assignment[person][day].map(|s| model.shift_code(s).to_string())
}

fn shortages_from(breakdown: &[std::collections::HashMap<String, CoverageCell>]) -> Vec<ShortageInfo> {
    let mut out = Vec::new();
    for (idx, row) in breakdown.iter().enumerate() {
        for &label in WINDOW_LABELS.iter() {
            let cell = &row[label];
            if cell.shortage > 0 {
                out.push(ShortageInfo {
                    day: idx as i32 + 1,
                    time_range: label.to_string(),
                    shortage: cell.shortage,
                });
            }
        }
    }
    out
}

fn infeasible_message(status: SolverStatus) -> String {
    match status {
        SolverStatus::Infeasible => {
            "No schedule satisfies every hard constraint within the given inputs.".to_string()
        }
        SolverStatus::ModelInvalid => {
            "The request contains contradictory constraints (e.g. monthlyMin exceeds monthlyMax)."
                .to_string()
        }
        SolverStatus::Unknown => {
            "The solver ran out of time before finding a feasible schedule.".to_string()
        }
        SolverStatus::Optimal | SolverStatus::Feasible => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use crate::domain::*;
    use crate::solver::{Model, Solution};
    use crate::windows::TimeWindowMap;

    use super::*;

    fn detail(v: i32) -> NeedTemplateDetail {
        NeedTemplateDetail {
            seven_to_nine: v,
            nine_to_fifteen: v,
            sixteen_to_eighteen: v,
            eighteen_to_twenty_four: v,
            zero_to_seven: v,
        }
    }

    fn data() -> InitialData {
        InitialData {
            year: 2024,
            month: 1,
            days: 3,
            weekday_of_day1: 0,
            shifts: vec![
                Shift { code: "D".into(), name: "Day".into(), start: 7, end: 15 },
                Shift { code: "NA".into(), name: "Night A".into(), start: 22, end: 31 },
            ],
            need_template: NeedTemplate {
                bath_day: detail(1),
                normal_day: detail(1),
                wednesday: detail(1),
            },
            day_type_by_date: vec![DayType::NormalDay; 3],
            people: vec![],
            rules: Rules {
                no_early_after_day_ab: false,
                night_rest: HashMap::from([("NA".to_string(), 2)]),
                night_recovery_counts: HashMap::new(),
                pair_shift_conflicts: vec![],
            },
            weights: Weights {
                w_shortage: 10,
                ..Default::default()
            },
            wish_offs: HashMap::new(),
            strict_night: HashMap::new(),
        }
    }

    fn person(id: &str) -> Person {
        Person {
            id: id.to_string(),
            can_work: HashSet::from(["D".to_string(), "NA".to_string()]),
            fixed_off_weekdays: HashSet::new(),
            weekly_min: 0,
            weekly_max: 99,
            monthly_min: 0,
            monthly_max: 99,
            consec_max: 0,
        }
    }

    #[test]
    fn paid_leave_overrides_recovery_on_the_same_day() {
        let d = data();
        let windows = TimeWindowMap::build(&d.shifts);
        let mut request = ScheduleRequest {
            people: vec![person("alice")],
            ..Default::default()
        };
        request.paid_leaves.insert("alice".to_string(), vec![1]);

        let model = Model::build(&d, &request, &windows);
        let mut solution = Solution::empty(1, 3);
        let na = model.shift_index["NA"];
        solution.assignment[0][0] = Some(na);

        let response = render(&model, &solution, SolverStatus::Optimal);
        let alice = &response.schedule["alice"];
        assert_eq!(alice[0].as_deref(), Some("NA"));
        // day 1 would otherwise tokenise as recovery, but hard constraint 8
        // forces night_recovery to 0 on a paid-leave day, so it renders as
        // paid leave instead.
        assert_eq!(alice[1].as_deref(), Some(PAID_LEAVE_TOKEN));
        assert_eq!(alice[2], None);
    }

    #[test]
    fn infeasible_status_renders_empty_schedule_with_message() {
        let d = data();
        let windows = TimeWindowMap::build(&d.shifts);
        let request = ScheduleRequest {
            people: vec![person("alice")],
            ..Default::default()
        };
        let model = Model::build(&d, &request, &windows);
        let solution = Solution::empty(1, 3);

        let response = render(&model, &solution, SolverStatus::Infeasible);
        assert!(response.schedule.is_empty());
        assert!(response.coverage_breakdown.is_empty());
        assert_eq!(response.status, "INFEASIBLE");
        assert!(response.message.is_some());
    }

    #[test]
    fn shortages_collect_only_positive_cells_with_one_based_days() {
        let d = data();
        let windows = TimeWindowMap::build(&d.shifts);
        let request = ScheduleRequest {
            people: vec![person("alice")],
            ..Default::default()
        };
        let model = Model::build(&d, &request, &windows);
        let solution = Solution::empty(1, 3);

        let response = render(&model, &solution, SolverStatus::Feasible);
        assert!(response.shortages.iter().all(|s| s.day >= 1));
        assert!(response.shortages.iter().any(|s| s.time_range == "7-9"));
    }
}

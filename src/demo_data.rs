//! Demo data generators, grounded on the teacher's `demo_data.rs`
//! (`DemoData::{Small, Large}` parameter sets, a seeded `StdRng`, weighted
//! count distributions) but producing this crate's `InitialData`/
//! `ScheduleRequest` pair instead of the teacher's `EmployeeSchedule`.
//!
//! Used by `bin/bench.rs` and as a sanity fixture; the seed tests in
//! `solver::tests::seed_scenarios` build their own minimal fixtures instead,
//! since they each need to control one specific rule.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::{
    DayType, InitialData, NeedTemplate, NeedTemplateDetail, Person, Rules, ScheduleRequest, Shift,
    Weekday, Weights,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoData {
    Small,
    Large,
}

impl std::str::FromStr for DemoData {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SMALL" => Ok(DemoData::Small),
            "LARGE" => Ok(DemoData::Large),
            _ => Err(()),
        }
    }
}

impl DemoData {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemoData::Small => "SMALL",
            DemoData::Large => "LARGE",
        }
    }

    fn parameters(&self) -> DemoDataParameters {
        match self {
            DemoData::Small => DemoDataParameters {
                days: 14,
                employee_count: 10,
                need_distribution: vec![(1, 3.0), (2, 1.0)],
            },
            DemoData::Large => DemoDataParameters {
                days: 30,
                employee_count: 40,
                need_distribution: vec![(2, 2.0), (3, 3.0), (4, 1.0)],
            },
        }
    }
}

struct DemoDataParameters {
    days: i32,
    employee_count: usize,
    need_distribution: Vec<(i32, f64)>,
}

/// List of available demo data sets.
pub fn list_demo_data() -> Vec<&'static str> {
    vec!["SMALL", "LARGE"]
}

const NIGHT_CODES: [&str; 2] = ["NA", "NC"];

fn shift_table() -> Vec<Shift> {
    vec![
        Shift { code: "D".into(), name: "Day".into(), start: 7, end: 15 },
        Shift { code: "EA".into(), name: "Evening A".into(), start: 16, end: 24 },
        Shift { code: "NA".into(), name: "Night A".into(), start: 22, end: 31 },
        Shift { code: "NC".into(), name: "Night C".into(), start: 18, end: 31 },
    ]
}

fn pick_count(rng: &mut StdRng, distribution: &[(i32, f64)]) -> i32 {
    let total_weight: f64 = distribution.iter().map(|(_, w)| w).sum();
    let mut choice = rng.gen::<f64>() * total_weight;
    for (count, weight) in distribution {
        if choice < *weight {
            return *count;
        }
        choice -= weight;
    }
    distribution.last().map(|(c, _)| *c).unwrap_or(1)
}

/// `weekdayOfDay1` for the 1st of `(year, month)`, per `spec.md` §4.2's
/// Mon..Sun calendar (`Weekday::ORDER`).
fn weekday_of_day1(year: i32, month: u32) -> i32 {
    match NaiveDate::from_ymd_opt(year, month, 1)
        .expect("valid year/month")
        .weekday()
    {
        chrono::Weekday::Mon => 0,
        chrono::Weekday::Tue => 1,
        chrono::Weekday::Wed => 2,
        chrono::Weekday::Thu => 3,
        chrono::Weekday::Fri => 4,
        chrono::Weekday::Sat => 5,
        chrono::Weekday::Sun => 6,
    }
}

/// Generates a demo `(InitialData, ScheduleRequest)` pair for the given size.
pub fn generate(demo: DemoData) -> (InitialData, ScheduleRequest) {
    let params = demo.parameters();
    let mut rng = StdRng::seed_from_u64(0);

    let shifts = shift_table();
    let need_detail = || -> NeedTemplateDetail {
        NeedTemplateDetail {
            seven_to_nine: pick_count(&mut rng, &params.need_distribution),
            nine_to_fifteen: pick_count(&mut rng, &params.need_distribution),
            sixteen_to_eighteen: pick_count(&mut rng, &params.need_distribution),
            eighteen_to_twenty_four: pick_count(&mut rng, &params.need_distribution),
            zero_to_seven: pick_count(&mut rng, &params.need_distribution),
        }
    };

    let need_template = NeedTemplate {
        bath_day: need_detail(),
        normal_day: need_detail(),
        wednesday: need_detail(),
    };

    let weekday_of_day1 = weekday_of_day1(2024, 1);
    let day_type_by_date: Vec<DayType> = (0..params.days)
        .map(|d| match Weekday::of_day(weekday_of_day1, d) {
            Weekday::Wed => DayType::Wednesday,
            _ if d % 10 == 0 => DayType::BathDay,
            _ => DayType::NormalDay,
        })
        .collect();

    let mut people = Vec::with_capacity(params.employee_count);
    for i in 0..params.employee_count {
        let mut can_work: HashSet<String> = HashSet::from(["D".to_string(), "EA".to_string()]);
        if i % 3 == 0 {
            can_work.insert("NA".to_string());
        }
        if i % 4 == 0 {
            can_work.insert("NC".to_string());
        }
        people.push(Person {
            id: format!("person-{i:03}"),
            can_work,
            fixed_off_weekdays: if i % 7 == 0 {
                HashSet::from([Weekday::Sun])
            } else {
                HashSet::new()
            },
            weekly_min: 0,
            weekly_max: 48,
            monthly_min: 14,
            monthly_max: 22,
            consec_max: 5,
        });
    }

    let mut night_rest = HashMap::new();
    for code in NIGHT_CODES {
        night_rest.insert(code.to_string(), 2);
    }

    let data = InitialData {
        year: 2024,
        month: 1,
        days: params.days,
        weekday_of_day1,
        shifts,
        need_template,
        day_type_by_date,
        people: people.clone(),
        rules: Rules {
            no_early_after_day_ab: false,
            night_rest,
            night_recovery_counts: HashMap::new(),
            pair_shift_conflicts: Vec::new(),
        },
        weights: Weights {
            w_shortage: 10,
            w_overstaff_gt_need_plus1: 2,
            w_requested_off_violation: 4,
            shortage_time_range_weights: HashMap::new(),
            ..Default::default()
        },
        wish_offs: HashMap::new(),
        strict_night: HashMap::new(),
    };

    let mut wish_offs = HashMap::new();
    for (i, person) in people.iter().enumerate() {
        if i % 5 == 0 {
            wish_offs.insert(person.id.clone(), vec![(i % params.days as usize) as i32]);
        }
    }

    let request = ScheduleRequest {
        people,
        wish_offs,
        paid_leaves: HashMap::new(),
        shift_preferences: HashMap::new(),
        previous_month_night_carry: HashMap::new(),
        pair_shift_conflicts: Vec::new(),
    };

    (data, request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_demo_has_expected_shape() {
        let (data, request) = generate(DemoData::Small);
        assert_eq!(data.days, 14);
        assert_eq!(request.people.len(), 10);
        assert_eq!(data.day_type_by_date.len(), 14);
    }

    #[test]
    fn large_demo_has_expected_shape() {
        let (data, request) = generate(DemoData::Large);
        assert_eq!(data.days, 30);
        assert_eq!(request.people.len(), 40);
    }

    #[test]
    fn demo_data_from_str_is_case_insensitive() {
        assert_eq!("SMALL".parse::<DemoData>(), Ok(DemoData::Small));
        assert_eq!("small".parse::<DemoData>(), Ok(DemoData::Small));
        assert_eq!("LARGE".parse::<DemoData>(), Ok(DemoData::Large));
        assert!("invalid".parse::<DemoData>().is_err());
    }

    #[test]
    fn every_person_is_eligible_for_at_least_one_shift() {
        let (_, request) = generate(DemoData::Small);
        assert!(request.people.iter().all(|p| !p.can_work.is_empty()));
    }
}

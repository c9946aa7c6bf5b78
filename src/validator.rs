//! Rule post-validator (`spec.md` §4.6), grounded on
//! `original_source/api/validation.py::validate_schedule_rules`. Applied to
//! externally-edited schedules rather than solver output, so it re-derives
//! consecutive-day, weekly, and monthly totals from the rendered cells
//! instead of consulting `solver::Model`.
//!
//! One divergence from the original: it resets `consecutive_days` on any
//! non-shift cell, including `"明"`/`"有給"`. `spec.md` §4.6 is explicit that
//! those tokens count as work and must NOT reset the counter, so that's
//! what this module does.

use std::collections::HashMap;

use crate::domain::{InitialData, PersonSchedule, Weekday, NIGHT_RECOVERY_TOKEN, PAID_LEAVE_TOKEN};
use crate::error::ScheduleError;

/// Validates `schedule` against `data`'s people and shift table, returning
/// `Ok(())` when every hard rule holds and `Err(RuleViolation)` with the
/// aggregated Japanese violation strings otherwise.
pub fn validate_schedule_rules(
    data: &InitialData,
    schedule: &HashMap<String, PersonSchedule>,
) -> Result<(), ScheduleError> {
    let shift_hours: HashMap<&str, i32> = data
        .shifts
        .iter()
        .map(|s| (s.code.as_str(), s.duration_hours()))
        .collect();

    let mut violations = Vec::new();
    let empty: PersonSchedule = Vec::new();

    for person in &data.people {
        let days = schedule.get(&person.id).unwrap_or(&empty);

        let mut consecutive_days = 0i32;
        let mut weekly_hours = 0i32;
        let mut monthly_hours = 0i32;

        for day_index in 0..data.days.max(0) as usize {
            let cell = days.get(day_index).cloned().flatten();

            let (worked, hours) = match cell.as_deref() {
                Some(NIGHT_RECOVERY_TOKEN) | Some(PAID_LEAVE_TOKEN) => (true, 0),
                Some(code) => (true, *shift_hours.get(code).unwrap_or(&0)),
                None => (false, 0),
            };

            if worked {
                consecutive_days += 1;
                if person.consec_max > 0 && consecutive_days > person.consec_max {
                    violations.push(format!(
                        "{}: {}日を超える連勤 (day {})",
                        person.id,
                        person.consec_max,
                        day_index + 1
                    ));
                }
            } else {
                consecutive_days = 0;
            }

            weekly_hours += hours;
            monthly_hours += hours;

            if Weekday::of_day(data.weekday_of_day1, day_index as i32).is_week_end() {
                if weekly_hours > person.weekly_max {
                    violations.push(format!(
                        "{}: 週の労働時間上限 {}h を超過",
                        person.id, person.weekly_max
                    ));
                }
                weekly_hours = 0;
            }
        }

        if weekly_hours > person.weekly_max {
            violations.push(format!(
                "{}: 週の労働時間上限 {}h を超過",
                person.id, person.weekly_max
            ));
        }
        if monthly_hours > person.monthly_max {
            violations.push(format!(
                "{}: 月の労働時間上限 {}h を超過",
                person.id, person.monthly_max
            ));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ScheduleError::RuleViolation { violations })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use crate::domain::*;

    use super::*;

    fn data_with(people: Vec<Person>) -> InitialData {
        let detail = NeedTemplateDetail {
            seven_to_nine: 0,
            nine_to_fifteen: 0,
            sixteen_to_eighteen: 0,
            eighteen_to_twenty_four: 0,
            zero_to_seven: 0,
        };
        InitialData {
            year: 2024,
            month: 1,
            days: 8,
            weekday_of_day1: 0,
            shifts: vec![Shift { code: "D".into(), name: "Day".into(), start: 7, end: 15 }],
            need_template: NeedTemplate {
                bath_day: detail.clone(),
                normal_day: detail.clone(),
                wednesday: detail,
            },
            day_type_by_date: vec![DayType::NormalDay; 8],
            people,
            rules: Rules::default(),
            weights: Weights::default(),
            wish_offs: HashMap::new(),
            strict_night: HashMap::new(),
        }
    }

    fn person(consec_max: i32) -> Person {
        Person {
            id: "alice".to_string(),
            can_work: HashSet::from(["D".to_string()]),
            fixed_off_weekdays: HashSet::new(),
            weekly_min: 0,
            weekly_max: 999,
            monthly_min: 0,
            monthly_max: 999,
            consec_max,
        }
    }

    #[test]
    fn flags_runs_longer_than_consec_max() {
        let data = data_with(vec![person(3)]);
        let schedule = HashMap::from([(
            "alice".to_string(),
            vec![
                Some("D".to_string()),
                Some("D".to_string()),
                Some("D".to_string()),
                Some("D".to_string()),
                None,
                None,
                None,
                None,
            ],
        )]);

        let err = validate_schedule_rules(&data, &schedule).unwrap_err();
        match err {
            ScheduleError::RuleViolation { violations } => {
                assert_eq!(violations.len(), 1);
                assert!(violations[0].contains("連勤"));
            }
            other => panic!("expected RuleViolation, got {other:?}"),
        }
    }

    #[test]
    fn recovery_and_paid_leave_tokens_do_not_reset_consecutive_count() {
        let data = data_with(vec![person(3)]);
        let schedule = HashMap::from([(
            "alice".to_string(),
            vec![
                Some("D".to_string()),
                Some(NIGHT_RECOVERY_TOKEN.to_string()),
                Some(PAID_LEAVE_TOKEN.to_string()),
                Some("D".to_string()),
                None,
                None,
                None,
                None,
            ],
        )]);

        let err = validate_schedule_rules(&data, &schedule).unwrap_err();
        assert!(matches!(err, ScheduleError::RuleViolation { .. }));
    }

    #[test]
    fn schedule_within_bounds_passes() {
        let data = data_with(vec![person(2)]);
        let schedule = HashMap::from([(
            "alice".to_string(),
            vec![
                Some("D".to_string()),
                Some("D".to_string()),
                None,
                Some("D".to_string()),
                Some("D".to_string()),
                None,
                None,
                None,
            ],
        )]);

        assert!(validate_schedule_rules(&data, &schedule).is_ok());
    }
}

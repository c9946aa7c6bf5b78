//! Time-window mapper (`spec.md` §4.1).
//!
//! Converts the shift table into, for each of the five fixed windows, the
//! list of shift codes that cover it on the day the shift starts
//! (`same_day`) and the list that cover it by carrying over from the
//! previous day (`carry_over`). Ported from
//! `original_source/api/solver.py::_build_time_ranges` /
//! `_normalize_interval` / `_covers_interval`.

use std::collections::HashMap;

use crate::domain::{Shift, WINDOW_LABELS};

/// `[start, end)` in hours, already normalised per window semantics.
type Interval = (i32, i32);

/// Same-day interval: the `0-7` window is `[24, 31)` when matching against
/// the shifts that *start* on this day (a `21-31` shift covers `0-7` of its
/// own starting day).
fn same_day_interval(label: &str) -> Interval {
    let (start, end) = split_label(label);
    if start == 0 {
        (24, end + 24)
    } else {
        (start, end)
    }
}

/// Carry-over interval: the plain `[0, 7)` window used against the
/// post-midnight portion of the *previous* day's shifts.
fn carry_over_interval(label: &str) -> Interval {
    split_label(label)
}

fn split_label(label: &str) -> Interval {
    let (start_str, end_str) = label.split_once('-').expect("window label is `a-b`");
    (
        start_str.parse().expect("window label start is an integer"),
        end_str.parse().expect("window label end is an integer"),
    )
}

/// Strict overlap: `max(a_start, b_start) < min(a_end, b_end)`.
fn overlaps(shift_start: i32, shift_end: i32, interval: Interval) -> bool {
    shift_start.max(interval.0) < shift_end.min(interval.1)
}

#[derive(Debug, Clone, Default)]
pub struct TimeWindowMap {
    /// Shift codes whose same-day portion covers the window, in input order.
    pub same_day: HashMap<&'static str, Vec<String>>,
    /// Shift codes whose post-midnight portion covers the window, in input order.
    pub carry_over: HashMap<&'static str, Vec<String>>,
}

impl TimeWindowMap {
    pub fn build(shifts: &[Shift]) -> Self {
        let mut same_day: HashMap<&'static str, Vec<String>> = HashMap::new();
        let mut carry_over: HashMap<&'static str, Vec<String>> = HashMap::new();

        for &label in WINDOW_LABELS.iter() {
            let same = same_day_interval(label);
            let carry = carry_over_interval(label);

            let mut same_codes = Vec::new();
            let mut carry_codes = Vec::new();
            for shift in shifts {
                let day_end = shift.end.min(24);
                if overlaps(shift.start, day_end, same) && !same_codes.contains(&shift.code) {
                    same_codes.push(shift.code.clone());
                }

                if shift.crosses_midnight() {
                    let carry_start = shift.start.max(24) - 24;
                    let carry_end = shift.end - 24;
                    if overlaps(carry_start, carry_end, carry) && !carry_codes.contains(&shift.code) {
                        carry_codes.push(shift.code.clone());
                    }
                }
            }

            same_day.insert(label, same_codes);
            carry_over.insert(label, carry_codes);
        }

        Self { same_day, carry_over }
    }

    pub fn same_day_codes(&self, label: &str) -> &[String] {
        self.same_day.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn carry_over_codes(&self, label: &str) -> &[String] {
        self.carry_over.get(label).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shift(code: &str, start: i32, end: i32) -> Shift {
        Shift {
            code: code.to_string(),
            name: code.to_string(),
            start,
            end,
        }
    }

    #[test]
    fn day_shift_covers_its_own_windows() {
        // 7-15 covers "7-9" and "9-15", not "16-18"/"18-24"/"0-7".
        let map = TimeWindowMap::build(&[shift("D", 7, 15)]);
        assert_eq!(map.same_day_codes("7-9"), ["D".to_string()]);
        assert_eq!(map.same_day_codes("9-15"), ["D".to_string()]);
        assert!(map.same_day_codes("16-18").is_empty());
        assert!(map.same_day_codes("0-7").is_empty());
    }

    #[test]
    fn night_shift_crossing_midnight_carries_over() {
        // 21-31 (21:00 to 07:00 next day): covers "18-24" same-day and "0-7"
        // same-day (since 0-7 is [24,31) for same-day matching), and "0-7"
        // carry-over for the following day.
        let map = TimeWindowMap::build(&[shift("NA", 21, 31)]);
        assert_eq!(map.same_day_codes("18-24"), ["NA".to_string()]);
        assert_eq!(map.same_day_codes("0-7"), ["NA".to_string()]);
        assert_eq!(map.carry_over_codes("0-7"), ["NA".to_string()]);
        assert!(map.carry_over_codes("7-9").is_empty());
    }

    #[test]
    fn strict_overlap_excludes_touching_boundaries() {
        // A shift ending exactly at 9 does not cover "9-15".
        let map = TimeWindowMap::build(&[shift("M", 7, 9)]);
        assert!(map.same_day_codes("9-15").is_empty());
        assert_eq!(map.same_day_codes("7-9"), ["M".to_string()]);
    }

    #[test]
    fn dedup_preserves_insertion_order() {
        // "M" touches the 9-15 boundary (strict overlap excludes it); "B" and
        // "C" both genuinely overlap and must appear in input order.
        let map = TimeWindowMap::build(&[shift("M", 7, 9), shift("B", 8, 16), shift("C", 10, 14)]);
        assert_eq!(
            map.same_day_codes("9-15"),
            ["B".to_string(), "C".to_string()]
        );
    }
}

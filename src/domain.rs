//! Domain model for the shift-scheduling core.
//!
//! Types mirror the wire schema consumed by the transport layer. Day indices
//! are 0-based everywhere in this module; the renderer (`crate::render`) is
//! responsible for the 1-based convention used in responses.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// A named shift, e.g. `{code: "NA", name: "Night A", start: 22, end: 31}`.
///
/// `end` may exceed 24, in which case the shift crosses midnight and its
/// `[24, end)` portion attributes to the day the shift *starts*.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Shift {
    pub code: String,
    pub name: String,
    pub start: i32,
    pub end: i32,
}

impl Shift {
    /// `end - start`, in hours. Zero-hour tokens ("明", "有給") are not `Shift`s.
    pub fn duration_hours(&self) -> i32 {
        self.end - self.start
    }

    pub fn crosses_midnight(&self) -> bool {
        self.end > 24
    }
}

/// A roster member and the rules that constrain their own assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    #[serde(rename = "canWork")]
    pub can_work: HashSet<String>,
    #[serde(rename = "fixedOffWeekdays")]
    pub fixed_off_weekdays: HashSet<Weekday>,
    #[serde(rename = "weeklyMin")]
    pub weekly_min: i32,
    #[serde(rename = "weeklyMax")]
    pub weekly_max: i32,
    #[serde(rename = "monthlyMin")]
    pub monthly_min: i32,
    #[serde(rename = "monthlyMax")]
    pub monthly_max: i32,
    #[serde(rename = "consecMax")]
    pub consec_max: i32,
}

/// Mon..Sun, serialized using the glyphs `月火水木金土日`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(rename = "月")]
    Mon,
    #[serde(rename = "火")]
    Tue,
    #[serde(rename = "水")]
    Wed,
    #[serde(rename = "木")]
    Thu,
    #[serde(rename = "金")]
    Fri,
    #[serde(rename = "土")]
    Sat,
    #[serde(rename = "日")]
    Sun,
}

impl Weekday {
    pub const ORDER: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// `weekday(d)` per `spec.md` §4.2: `(weekdayOfDay1 + d) mod 7`.
    pub fn of_day(weekday_of_day1: i32, day: i32) -> Weekday {
        let idx = (weekday_of_day1 + day).rem_euclid(7) as usize;
        Weekday::ORDER[idx]
    }

    /// `true` when this is the Sunday boundary used to reset weekly-hours
    /// accumulators in the rule post-validator (`(weekdayOfDay1 + d) mod 7 == 6`).
    pub fn is_week_end(self) -> bool {
        matches!(self, Weekday::Sun)
    }
}

/// One of the five fixed coverage windows, in the order they must be
/// iterated for deterministic model construction.
pub const WINDOW_LABELS: [&str; 5] = ["7-9", "9-15", "16-18", "18-24", "0-7"];

/// Headcount needed per window for a given day-type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeedTemplateDetail {
    #[serde(rename = "7-9")]
    pub seven_to_nine: i32,
    #[serde(rename = "9-15")]
    pub nine_to_fifteen: i32,
    #[serde(rename = "16-18")]
    pub sixteen_to_eighteen: i32,
    #[serde(rename = "18-24")]
    pub eighteen_to_twenty_four: i32,
    #[serde(rename = "0-7")]
    pub zero_to_seven: i32,
}

impl NeedTemplateDetail {
    pub fn get(&self, label: &str) -> i32 {
        match label {
            "7-9" => self.seven_to_nine,
            "9-15" => self.nine_to_fifteen,
            "16-18" => self.sixteen_to_eighteen,
            "18-24" => self.eighteen_to_twenty_four,
            "0-7" => self.zero_to_seven,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeedTemplate {
    #[serde(rename = "bathDay")]
    pub bath_day: NeedTemplateDetail,
    #[serde(rename = "normalDay")]
    pub normal_day: NeedTemplateDetail,
    pub wednesday: NeedTemplateDetail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DayType {
    BathDay,
    NormalDay,
    Wednesday,
}

impl NeedTemplate {
    pub fn for_day_type(&self, day_type: DayType) -> &NeedTemplateDetail {
        match day_type {
            DayType::BathDay => &self.bath_day,
            DayType::NormalDay => &self.normal_day,
            DayType::Wednesday => &self.wednesday,
        }
    }
}

/// Per-code night-rest window, in days, e.g. `{"NA": 2, "NB": 2, "NC": 1}`.
pub type NightRest = HashMap<String, i32>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairConflictDayRule {
    #[serde(rename = "firstPersonShifts")]
    pub first_person_shifts: Vec<String>,
    #[serde(rename = "secondPersonShifts")]
    pub second_person_shifts: Vec<String>,
    #[serde(rename = "dayOffset")]
    pub day_offset: i32,
}

/// `pairShiftConflicts` entry: forbids A working `firstPersonShifts` on day d
/// together with B working `secondPersonShifts` on day `d + dayOffset`.
///
/// Normalised at the edge (Design Note §9: "duck-typed pydantic conversion")
/// so the builder only ever sees this single tagged shape, regardless of
/// whether the request sent typed objects or plain maps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairShiftConflict {
    pub people: (String, String),
    pub rules: Vec<PairConflictDayRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Rules {
    /// Reserved — declared by the source schema but not consulted by the
    /// solver (spec.md §9 Open Question). Never read by this crate.
    #[serde(rename = "noEarlyAfterDayAB", default)]
    pub no_early_after_day_ab: bool,
    #[serde(rename = "nightRest", default)]
    pub night_rest: NightRest,
    /// Optional per-code override of how many of `nightRest[code]` rest days
    /// render as the "明" token rather than a plain, untokenised day off.
    /// Clamped into `[0, rest_days]` at load time (`crate::config`).
    #[serde(rename = "nightRecoveryCounts", default)]
    pub night_recovery_counts: HashMap<String, i32>,
    #[serde(rename = "pairShiftConflicts", default)]
    pub pair_shift_conflicts: Vec<PairShiftConflict>,
}

impl Rules {
    /// How many of a night code's rest days render as "明" (`spec.md` §3/§4.2 rule 4).
    pub fn recovery_count(&self, night_code: &str) -> i32 {
        let rest_days = *self.night_rest.get(night_code).unwrap_or(&0);
        let requested = self
            .night_recovery_counts
            .get(night_code)
            .copied()
            .unwrap_or(rest_days);
        requested.clamp(0, rest_days)
    }
}

/// Optional per-window hard headcount band, parsed from the reference
/// configuration's `strictNight` map (`"<label>_min"`/`"<label>_max"` or a
/// bare `"<label>"` entry meaning an exact band).
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictBand {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Weights {
    #[serde(rename = "W_shortage")]
    pub w_shortage: i64,
    #[serde(rename = "W_overstaff_gt_need_plus1")]
    pub w_overstaff_gt_need_plus1: i64,
    /// Reserved — no penalty term reads this weight (spec.md §9 Open Question).
    #[serde(rename = "W_balance_workdays", default)]
    pub w_balance_workdays: i64,
    /// Reserved — see above.
    #[serde(rename = "W_prefer_fill_morning7_9", default)]
    pub w_prefer_fill_morning7_9: i64,
    /// Reserved — see above.
    #[serde(rename = "W_fill_9_15", default)]
    pub w_fill_9_15: i64,
    #[serde(rename = "W_requested_off_violation")]
    pub w_requested_off_violation: i64,
    #[serde(rename = "shortageTimeRangeWeights", default)]
    pub shortage_time_range_weights: HashMap<String, i64>,
}

impl Weights {
    pub fn shortage_weight(&self, label: &str) -> i64 {
        self.w_shortage + self.shortage_time_range_weights.get(label).copied().unwrap_or(0)
    }
}

/// The reference configuration, loaded once per process and injected into
/// the builder (Design Note §9: "the data loader is a collaborator, not a
/// module global").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialData {
    pub year: i32,
    pub month: i32,
    pub days: i32,
    #[serde(rename = "weekdayOfDay1")]
    pub weekday_of_day1: i32,
    pub shifts: Vec<Shift>,
    #[serde(rename = "needTemplate")]
    pub need_template: NeedTemplate,
    #[serde(rename = "dayTypeByDate")]
    pub day_type_by_date: Vec<DayType>,
    pub people: Vec<Person>,
    pub rules: Rules,
    pub weights: Weights,
    #[serde(rename = "wishOffs", default)]
    pub wish_offs: HashMap<String, Vec<i32>>,
    /// Optional strict per-window headcount bands, e.g. `{"18-24_min": 2}`.
    #[serde(rename = "strictNight", default)]
    pub strict_night: HashMap<String, i32>,
}

impl InitialData {
    /// Parses `strictNight` into per-label `{min, max}` bands
    /// (`spec.md` §4.2 hard constraint 10).
    pub fn strict_bands(&self) -> HashMap<String, StrictBand> {
        let mut bands: HashMap<String, StrictBand> = HashMap::new();
        for (label, value) in &self.strict_night {
            if let Some(base) = label.strip_suffix("_min") {
                bands.entry(base.to_string()).or_default().min = Some(*value);
            } else if let Some(base) = label.strip_suffix("_max") {
                bands.entry(base.to_string()).or_default().max = Some(*value);
            } else {
                let band = bands.entry(label.clone()).or_default();
                band.min = Some(*value);
                band.max = Some(*value);
            }
        }
        bands
    }
}

/// Request for `generateSchedule`. Day indices are 0-based.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScheduleRequest {
    pub people: Vec<Person>,
    #[serde(rename = "wishOffs", default)]
    pub wish_offs: HashMap<String, Vec<i32>>,
    #[serde(rename = "paidLeaves", default)]
    pub paid_leaves: HashMap<String, Vec<i32>>,
    #[serde(rename = "shiftPreferences", default)]
    pub shift_preferences: HashMap<String, HashMap<i32, String>>,
    #[serde(rename = "previousMonthNightCarry", default)]
    pub previous_month_night_carry: HashMap<String, Vec<String>>,
    #[serde(rename = "pairShiftConflicts", default)]
    pub pair_shift_conflicts: Vec<PairShiftConflict>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShortageInfo {
    /// 1-based, per the wire convention for responses.
    pub day: i32,
    pub time_range: String,
    pub shortage: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverageCell {
    pub need: i32,
    pub actual: i32,
    pub shortage: i32,
}

/// `coverageBreakdown[day(1-based)][label]`.
pub type CoverageBreakdown = Vec<HashMap<String, CoverageCell>>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SolverStatus {
    Optimal,
    Feasible,
    Infeasible,
    ModelInvalid,
    Unknown,
}

impl SolverStatus {
    pub fn name(self) -> &'static str {
        match self {
            SolverStatus::Optimal => "OPTIMAL",
            SolverStatus::Feasible => "FEASIBLE",
            SolverStatus::Infeasible => "INFEASIBLE",
            SolverStatus::ModelInvalid => "MODEL_INVALID",
            SolverStatus::Unknown => "UNKNOWN",
        }
    }

    /// Statuses for which the renderer emits an actual schedule rather than
    /// an empty one (`spec.md` §4.3).
    pub fn renders_schedule(self) -> bool {
        matches!(self, SolverStatus::Optimal | SolverStatus::Feasible)
    }
}

/// One person's rendered day cells: a shift code, `"明"`, `"有給"`, or `null`.
pub type PersonSchedule = Vec<Option<String>>;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ScheduleResponse {
    pub schedule: HashMap<String, PersonSchedule>,
    pub shortages: Vec<ShortageInfo>,
    #[serde(rename = "coverageBreakdown")]
    pub coverage_breakdown: CoverageBreakdown,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Persisted schedule state (`spec.md` §3/§4.5). Cell contents use the same
/// `null`/shift-code/`"明"`/`"有給"` vocabulary as `ScheduleResponse`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleState {
    pub version: u64,
    pub locked: bool,
    pub schedule: HashMap<String, PersonSchedule>,
}

impl Default for ScheduleState {
    fn default() -> Self {
        Self {
            version: 1,
            locked: false,
            schedule: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSaveRequest {
    pub schedule: HashMap<String, PersonSchedule>,
    #[serde(rename = "baseVersion", default)]
    pub base_version: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleChange {
    #[serde(rename = "personId")]
    pub person_id: String,
    #[serde(rename = "dayIndex")]
    pub day_index: usize,
    pub previous: Option<String>,
    pub updated: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSaveResponse {
    pub version: u64,
    pub locked: bool,
    pub changes: Vec<ScheduleChange>,
}

/// The night-recovery token rendered the day after a night shift.
pub const NIGHT_RECOVERY_TOKEN: &str = "明";
/// The paid-leave token rendered on days in `paidLeaves[person]`.
pub const PAID_LEAVE_TOKEN: &str = "有給";

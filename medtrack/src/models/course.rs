use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Scheduled slot within a day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DoseTime {
    Morning,
    Midday,
    Evening,
}

impl std::fmt::Display for DoseTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Morning => write!(f, "morning"),
            Self::Midday => write!(f, "midday"),
            Self::Evening => write!(f, "evening"),
        }
    }
}

impl std::str::FromStr for DoseTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "morning" => Ok(Self::Morning),
            "midday" | "noon" | "lunch" => Ok(Self::Midday),
            "evening" => Ok(Self::Evening),
            _ => Err(format!("Unknown dose time: {s}")),
        }
    }
}

/// Sorts and de-duplicates dose slots.
pub fn normalize_dose_times(times: &[DoseTime]) -> Vec<DoseTime> {
    let mut out = times.to_vec();
    out.sort();
    out.dedup();
    out
}

/// Whether a dose-day has been taken.
///
/// Only `Pending -> Taken` is reachable today; an un-take is a
/// `Taken -> Pending` transition through the same store call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DoseState {
    #[default]
    Pending,
    Taken,
}

impl DoseState {
    pub fn from_flag(taken: bool) -> Self {
        if taken {
            Self::Taken
        } else {
            Self::Pending
        }
    }

    pub fn is_taken(self) -> bool {
        matches!(self, Self::Taken)
    }

    /// Marking taken is idempotent.
    pub fn take(self) -> Self {
        Self::Taken
    }
}

/// Shared attributes of every dose-day in a course. Persisted once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub patient_name: String,
    pub patient_age: Option<i32>,
    pub owner_user_id: Option<String>,
    pub drug_names: Vec<String>,
    pub facility: Option<String>,
    pub notes_payload: serde_json::Value,
    pub start_date: NaiveDate,
    pub duration_days: u32,
    pub dose_times: Vec<DoseTime>,
    pub created_at: DateTime<Utc>,
}

impl Course {
    pub fn end_date(&self) -> Option<NaiveDate> {
        course_end_date(self.start_date, self.duration_days)
    }

    /// Date of the dose-day at `offset` (0 for the first day).
    pub fn day(&self, offset: u32) -> Option<NaiveDate> {
        self.start_date.checked_add_days(Days::new(u64::from(offset)))
    }
}

/// Last dose-day of a course, or `None` when it is not representable.
pub fn course_end_date(start: NaiveDate, duration_days: u32) -> Option<NaiveDate> {
    start.checked_add_days(Days::new(u64::from(duration_days.max(1)) - 1))
}

/// Dates are stored as `YYYY-MM-DD` text, so only four-digit years sort and parse.
pub const MIN_STORED_YEAR: i32 = 1000;
pub const MAX_STORED_YEAR: i32 = 9999;

pub fn is_storable_date(date: NaiveDate) -> bool {
    (MIN_STORED_YEAR..=MAX_STORED_YEAR).contains(&date.year())
}

/// Input for starting a course.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewCourse {
    #[validate(length(min = 1, max = 200))]
    pub patient_name: String,
    pub patient_age: Option<i32>,
    pub owner_user_id: Option<String>,
    #[serde(default)]
    pub drug_names: Vec<String>,
    pub facility: Option<String>,
    #[serde(default)]
    pub notes_payload: serde_json::Value,
    pub start_date: NaiveDate,
    pub duration_days: u32,
    pub dose_times: Vec<DoseTime>,
}

/// A dose-day row as written to the store.
#[derive(Debug, Clone)]
pub struct NewDose {
    pub course_id: String,
    pub scan_date: NaiveDate,
    pub is_expansion_copy: bool,
    pub parent_record_id: Option<String>,
}

/// One dose-day joined with its course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationRecord {
    pub id: String,
    pub course_id: String,
    pub patient_name: String,
    pub patient_age: Option<i32>,
    pub owner_user_id: Option<String>,
    pub drug_names: Vec<String>,
    pub facility: Option<String>,
    pub notes_payload: serde_json::Value,
    pub scan_date: NaiveDate,
    pub dose_times: Vec<DoseTime>,
    pub course_duration_days: u32,
    pub course_end_date: NaiveDate,
    pub is_expansion_copy: bool,
    pub parent_record_id: Option<String>,
    pub state: DoseState,
    pub created_at: DateTime<Utc>,
}

impl MedicationRecord {
    pub fn taken(&self) -> bool {
        self.state.is_taken()
    }
}

/// Outcome of starting a course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseCreated {
    pub course_id: String,
    pub parent_record_id: String,
    pub requested_days: u32,
    pub created_days: u32,
}

impl CourseCreated {
    pub fn is_complete(&self) -> bool {
        self.created_days == self.requested_days
    }
}

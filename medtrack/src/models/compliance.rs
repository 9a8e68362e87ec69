use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::MedicationRecord;

/// Adherence over an inclusive date window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComplianceReport {
    pub patient_name: String,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub total_records: u32,
    pub taken_records: u32,
    pub rate: f64,
}

impl ComplianceReport {
    pub fn from_records(
        patient_name: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
        records: &[MedicationRecord],
    ) -> Self {
        let total_records = records.len() as u32;
        let taken_records = records.iter().filter(|r| r.taken()).count() as u32;
        Self {
            patient_name: patient_name.to_string(),
            window_start,
            window_end,
            total_records,
            taken_records,
            rate: compliance_rate(taken_records, total_records),
        }
    }
}

/// `taken / total`, or 0 for an empty window.
pub fn compliance_rate(taken: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(taken) / f64::from(total)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordSummary {
    pub total_records: u32,
    pub today_records: u32,
    pub last_seven_days: u32,
}

/// Today's dose-days for one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodayStatus {
    pub user_id: String,
    pub name: String,
    pub age: Option<i32>,
    pub records: Vec<MedicationRecord>,
    pub taken: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_is_zero_without_records() {
        assert_eq!(compliance_rate(0, 0), 0.0);
    }

    #[test]
    fn test_rate_fraction() {
        assert!((compliance_rate(1, 3) - 0.3333).abs() < 1e-3);
        assert_eq!(compliance_rate(3, 3), 1.0);
    }
}

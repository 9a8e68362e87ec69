use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use tracing::debug;

use crate::db::RecordStore;
use crate::error::{MedtrackError, Result};
use crate::models::{ComplianceReport, MedicationRecord, RecordSummary};

/// Read-only adherence queries over dose-day records.
#[derive(Clone)]
pub struct AdherenceService {
    records: Arc<dyn RecordStore>,
}

impl AdherenceService {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }

    /// Taken vs. total over `[window_start, window_end]`, both inclusive.
    pub async fn compute_compliance(
        &self,
        patient_name: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<ComplianceReport> {
        if window_end < window_start {
            return Err(MedtrackError::Validation(format!(
                "Window end {window_end} is before start {window_start}"
            )));
        }

        let records = self
            .range(patient_name, window_start, next_day(window_end)?)
            .await?;
        let report = ComplianceReport::from_records(patient_name, window_start, window_end, &records);

        debug!(
            "Compliance for {} {}..{}: {}/{}",
            patient_name, window_start, window_end, report.taken_records, report.total_records
        );
        Ok(report)
    }

    /// Days of `month` that have at least one record.
    pub async fn calendar_days(
        &self,
        patient_name: &str,
        year: i32,
        month: u32,
    ) -> Result<BTreeSet<u32>> {
        let (start, end) = month_bounds(year, month)?;
        let records = self.range(patient_name, start, end).await?;
        Ok(records.iter().map(|r| r.scan_date.day()).collect())
    }

    pub async fn records_on(
        &self,
        patient_name: &str,
        date: NaiveDate,
    ) -> Result<Vec<MedicationRecord>> {
        self.range(patient_name, date, next_day(date)?).await
    }

    /// Every record for a patient, newest first.
    pub async fn history(&self, patient_name: &str) -> Result<Vec<MedicationRecord>> {
        self.records
            .records_for_patient(patient_name)
            .await
            .map_err(MedtrackError::store_unavailable)
    }

    pub async fn summary(&self, patient_name: &str, today: NaiveDate) -> Result<RecordSummary> {
        let history = self.history(patient_name).await?;
        let week_start = today - Duration::days(6);

        Ok(RecordSummary {
            total_records: history.len() as u32,
            today_records: history.iter().filter(|r| r.scan_date == today).count() as u32,
            last_seven_days: history
                .iter()
                .filter(|r| r.scan_date >= week_start && r.scan_date <= today)
                .count() as u32,
        })
    }

    /// Records owned by an account on `date`.
    pub async fn owned_on(
        &self,
        owner_user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<MedicationRecord>> {
        self.records
            .records_for_owner_in_range(owner_user_id, date, next_day(date)?)
            .await
            .map_err(MedtrackError::store_unavailable)
    }

    async fn range(
        &self,
        patient_name: &str,
        start: NaiveDate,
        end_exclusive: NaiveDate,
    ) -> Result<Vec<MedicationRecord>> {
        self.records
            .records_for_patient_in_range(patient_name, start, end_exclusive)
            .await
            .map_err(MedtrackError::store_unavailable)
    }
}

fn next_day(date: NaiveDate) -> Result<NaiveDate> {
    date.succ_opt()
        .ok_or_else(|| MedtrackError::Validation(format!("Date {date} is out of range")))
}

/// First day of `month` and first day of the following month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    if !(1..=12).contains(&month) {
        return Err(MedtrackError::Validation(format!(
            "Month must be between 1 and 12, got {month}"
        )));
    }
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| MedtrackError::Validation(format!("Invalid month {year}-{month}")))?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or_else(|| MedtrackError::Validation(format!("Invalid month {year}-{month}")))?;
    Ok((start, end))
}

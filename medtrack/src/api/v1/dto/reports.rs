//! Adherence report DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models;

/// Query for `GET /v1/compliance`. Both bounds are inclusive.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceQuery {
    pub patient: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceResponse {
    pub patient_name: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total: u32,
    pub taken: u32,
    /// `taken / total`, 0 when there are no records.
    pub rate: f64,
}

impl From<models::ComplianceReport> for ComplianceResponse {
    fn from(report: models::ComplianceReport) -> Self {
        Self {
            patient_name: report.patient_name,
            from: report.window_start,
            to: report.window_end,
            total: report.total_records,
            taken: report.taken_records,
            rate: report.rate,
        }
    }
}

/// Query for `GET /v1/calendar`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CalendarQuery {
    pub patient: String,
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarResponse {
    pub year: i32,
    pub month: u32,
    /// Days of the month with at least one record, ascending.
    pub days: Vec<u32>,
}

/// Query for `GET /v1/summary`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub patient: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub total_records: u32,
    pub today_records: u32,
    pub last_seven_days: u32,
}

impl From<models::RecordSummary> for SummaryResponse {
    fn from(summary: models::RecordSummary) -> Self {
        Self {
            total_records: summary.total_records,
            today_records: summary.today_records,
            last_seven_days: summary.last_seven_days,
        }
    }
}

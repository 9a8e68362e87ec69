//! Course and dose-day record DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MedtrackError, Result};
use crate::models::{self, DoseTime, NewCourse};

/// Request body for `POST /v1/courses`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub patient_name: String,
    pub patient_age: Option<i32>,
    /// Account that owns the course. Observers of this account are notified
    /// when a dose-day is taken.
    pub owner_user_id: Option<String>,
    #[serde(default)]
    pub drug_names: Vec<String>,
    pub facility: Option<String>,
    /// Free-form payload stored alongside the course (e.g. drug details).
    #[serde(default)]
    #[schema(value_type = Object)]
    pub notes: serde_json::Value,
    pub start_date: NaiveDate,
    pub duration_days: u32,
    /// `morning`, `midday` (or `noon`, `lunch`) and `evening`.
    pub dose_times: Vec<String>,
}

impl CreateCourseRequest {
    pub fn into_new_course(self) -> Result<NewCourse> {
        let dose_times = self
            .dose_times
            .iter()
            .map(|t| t.parse::<DoseTime>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(MedtrackError::Validation)?;

        Ok(NewCourse {
            patient_name: self.patient_name,
            patient_age: self.patient_age,
            owner_user_id: self.owner_user_id.filter(|id| !id.trim().is_empty()),
            drug_names: self.drug_names,
            facility: self.facility,
            notes_payload: self.notes,
            start_date: self.start_date,
            duration_days: self.duration_days,
            dose_times,
        })
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseCreatedResponse {
    pub course_id: String,
    pub parent_record_id: String,
    pub requested_days: u32,
    pub created_days: u32,
    /// `false` when some dose-day copies could not be written.
    pub complete: bool,
}

impl From<models::CourseCreated> for CourseCreatedResponse {
    fn from(created: models::CourseCreated) -> Self {
        let complete = created.is_complete();
        Self {
            course_id: created.course_id,
            parent_record_id: created.parent_record_id,
            requested_days: created.requested_days,
            created_days: created.created_days,
            complete,
        }
    }
}

/// One dose-day.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    pub id: String,
    pub course_id: String,
    pub patient_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<String>,
    pub drug_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility: Option<String>,
    #[schema(value_type = Object)]
    pub notes: serde_json::Value,
    pub scan_date: NaiveDate,
    pub dose_times: Vec<String>,
    pub course_duration_days: u32,
    pub course_end_date: NaiveDate,
    pub is_expansion_copy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_record_id: Option<String>,
    pub taken: bool,
    pub created_at: DateTime<Utc>,
}

impl From<models::MedicationRecord> for RecordResponse {
    fn from(record: models::MedicationRecord) -> Self {
        let taken = record.taken();
        Self {
            id: record.id,
            course_id: record.course_id,
            patient_name: record.patient_name,
            patient_age: record.patient_age,
            owner_user_id: record.owner_user_id,
            drug_names: record.drug_names,
            facility: record.facility,
            notes: record.notes_payload,
            scan_date: record.scan_date,
            dose_times: record.dose_times.iter().map(ToString::to_string).collect(),
            course_duration_days: record.course_duration_days,
            course_end_date: record.course_end_date,
            is_expansion_copy: record.is_expansion_copy,
            parent_record_id: record.parent_record_id,
            taken,
            created_at: record.created_at,
        }
    }
}

/// Query for `GET /v1/records`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListRecordsQuery {
    pub patient: String,
    /// Only records for this day. Omit for the full history, newest first.
    pub date: Option<NaiveDate>,
}

/// Result of `POST /v1/records/{recordId}/take`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TakeRecordResponse {
    pub record_id: String,
    pub taken: bool,
    pub observers_notified: u32,
    pub push_attempts: u32,
}

impl From<crate::services::CompletionReport> for TakeRecordResponse {
    fn from(report: crate::services::CompletionReport) -> Self {
        Self {
            record_id: report.record_id,
            taken: true,
            observers_notified: report.notifications_written,
            push_attempts: report.deliveries_attempted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_course_request_parses_dose_times() {
        let req: CreateCourseRequest = serde_json::from_value(json!({
            "patientName": "Kim",
            "startDate": "2024-03-01",
            "durationDays": 3,
            "doseTimes": ["evening", "noon"],
            "ownerUserId": "  "
        }))
        .unwrap();

        let course = req.into_new_course().unwrap();
        assert_eq!(course.dose_times, vec![DoseTime::Evening, DoseTime::Midday]);
        assert_eq!(course.owner_user_id, None);
        assert!(course.notes_payload.is_null());
    }

    #[test]
    fn unknown_dose_time_is_validation_error() {
        let req: CreateCourseRequest = serde_json::from_value(json!({
            "patientName": "Kim",
            "startDate": "2024-03-01",
            "durationDays": 3,
            "doseTimes": ["bedtime"]
        }))
        .unwrap();

        assert!(matches!(
            req.into_new_course(),
            Err(MedtrackError::Validation(_))
        ));
    }
}

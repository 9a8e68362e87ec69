use std::sync::Arc;

use chrono::Utc;
use nanoid::nanoid;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::config::CourseConfig;
use crate::db::RecordStore;
use crate::error::{MedtrackError, Result};
use crate::models::{
    course_end_date, is_storable_date, normalize_dose_times, Course, CourseCreated, NewCourse,
    NewDose, MAX_STORED_YEAR, MIN_STORED_YEAR,
};

/// Expands a course into one record per calendar day.
#[derive(Clone)]
pub struct CourseService {
    records: Arc<dyn RecordStore>,
    config: CourseConfig,
}

impl CourseService {
    pub fn new(records: Arc<dyn RecordStore>, config: CourseConfig) -> Self {
        Self { records, config }
    }

    fn validate(&self, input: &NewCourse) -> Result<()> {
        input
            .validate()
            .map_err(|e| MedtrackError::Validation(e.to_string()))?;

        if input.patient_name.trim().is_empty() {
            return Err(MedtrackError::Validation(
                "Patient name must not be blank".to_string(),
            ));
        }
        if input.duration_days < 1 {
            return Err(MedtrackError::Validation(
                "Course duration must be at least one day".to_string(),
            ));
        }
        if input.duration_days > self.config.max_duration_days {
            return Err(MedtrackError::Validation(format!(
                "Course duration {} exceeds the maximum of {} days",
                input.duration_days, self.config.max_duration_days
            )));
        }
        if input.dose_times.is_empty() {
            return Err(MedtrackError::Validation(
                "At least one dose time is required".to_string(),
            ));
        }
        if !is_storable_date(input.start_date) {
            return Err(MedtrackError::Validation(format!(
                "Start date {} must have a year between {MIN_STORED_YEAR} and {MAX_STORED_YEAR}",
                input.start_date
            )));
        }
        match course_end_date(input.start_date, input.duration_days) {
            Some(end) if is_storable_date(end) => Ok(()),
            _ => Err(MedtrackError::Validation(format!(
                "A {}-day course starting {} ends after {MAX_STORED_YEAR}-12-31",
                input.duration_days, input.start_date
            ))),
        }
    }

    /// Creates the course, its day-1 record, then one copy per remaining day.
    ///
    /// Writes are independent. A failed copy is logged and skipped, so
    /// `created_days` may be less than `requested_days`. Failing to write the
    /// course row or the day-1 record is an error and nothing further is
    /// attempted.
    pub async fn start_course(&self, input: NewCourse) -> Result<CourseCreated> {
        self.validate(&input)?;

        let course = Course {
            id: nanoid!(),
            patient_name: input.patient_name.trim().to_string(),
            patient_age: input.patient_age,
            owner_user_id: input.owner_user_id,
            drug_names: input.drug_names,
            facility: input.facility,
            notes_payload: input.notes_payload,
            start_date: input.start_date,
            duration_days: input.duration_days,
            dose_times: normalize_dose_times(&input.dose_times),
            created_at: Utc::now(),
        };

        info!(
            course_id = %course.id,
            patient = %course.patient_name,
            start = %course.start_date,
            end = ?course.end_date(),
            days = course.duration_days,
            "Starting course"
        );

        self.records
            .insert_course(&course)
            .await
            .map_err(|e| MedtrackError::CourseStart(format!("course row: {e}")))?;

        let parent_record_id = self
            .records
            .insert_dose(&NewDose {
                course_id: course.id.clone(),
                scan_date: course.start_date,
                is_expansion_copy: false,
                parent_record_id: None,
            })
            .await
            .map_err(|e| MedtrackError::CourseStart(format!("day-1 record: {e}")))?;

        let mut created_days = 1u32;
        let mut error_count = 0u32;

        for offset in 1..course.duration_days {
            let Some(scan_date) = course.day(offset) else {
                warn!(course_id = %course.id, offset, "Dose-day date out of range, stopping");
                break;
            };
            let dose = NewDose {
                course_id: course.id.clone(),
                scan_date,
                is_expansion_copy: true,
                parent_record_id: Some(parent_record_id.clone()),
            };

            match self.records.insert_dose(&dose).await {
                Ok(id) => {
                    debug!("Created dose-day {} for {}: id={}", offset + 1, dose.scan_date, id);
                    created_days += 1;
                }
                Err(e) => {
                    warn!(
                        course_id = %course.id,
                        date = %dose.scan_date,
                        error = %e,
                        "Failed to create dose-day, continuing"
                    );
                    error_count += 1;
                }
            }
        }

        info!(
            "Course {} created: {} of {} days, {} errors",
            course.id, created_days, course.duration_days, error_count
        );

        Ok(CourseCreated {
            course_id: course.id,
            parent_record_id,
            requested_days: course.duration_days,
            created_days,
        })
    }

    /// Removes a single dose-day. Siblings are untouched.
    pub async fn delete_record(&self, record_id: &str) -> Result<()> {
        if self.records.delete_record(record_id).await? {
            info!("Deleted record {}", record_id);
            Ok(())
        } else {
            Err(MedtrackError::NotFound(format!("Record {record_id} not found")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_backend;
    use crate::models::{DoseState, DoseTime, MedicationRecord};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_course(start: NaiveDate, days: u32) -> NewCourse {
        NewCourse {
            patient_name: "Kim".to_string(),
            patient_age: Some(70),
            owner_user_id: None,
            drug_names: vec!["Aspirin".to_string()],
            facility: None,
            notes_payload: serde_json::Value::Null,
            start_date: start,
            duration_days: days,
            dose_times: vec![DoseTime::Morning],
        }
    }

    fn service(records: Arc<dyn RecordStore>) -> CourseService {
        CourseService::new(records, CourseConfig::default())
    }

    /// Records inserts and fails the configured call numbers (1-based).
    #[derive(Default)]
    struct FlakyStore {
        doses: Mutex<Vec<NewDose>>,
        fail_on: Vec<usize>,
        fail_course: bool,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl RecordStore for FlakyStore {
        async fn insert_course(&self, _course: &Course) -> Result<()> {
            if self.fail_course {
                return Err(MedtrackError::StoreUnavailable("down".to_string()));
            }
            Ok(())
        }
        async fn insert_dose(&self, dose: &NewDose) -> Result<String> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                *calls
            };
            if self.fail_on.contains(&call) {
                return Err(MedtrackError::StoreUnavailable("write failed".to_string()));
            }
            self.doses.lock().unwrap().push(dose.clone());
            Ok(format!("r{call}"))
        }
        async fn get_record(&self, _id: &str) -> Result<Option<MedicationRecord>> {
            Ok(None)
        }
        async fn set_dose_state(&self, _id: &str, _state: DoseState) -> Result<bool> {
            Ok(false)
        }
        async fn delete_record(&self, _id: &str) -> Result<bool> {
            Ok(false)
        }
        async fn records_for_patient_in_range(
            &self,
            _patient_name: &str,
            _start: NaiveDate,
            _end_exclusive: NaiveDate,
        ) -> Result<Vec<MedicationRecord>> {
            Ok(Vec::new())
        }
        async fn records_for_patient(&self, _patient_name: &str) -> Result<Vec<MedicationRecord>> {
            Ok(Vec::new())
        }
        async fn records_for_owner_in_range(
            &self,
            _owner_user_id: &str,
            _start: NaiveDate,
            _end_exclusive: NaiveDate,
        ) -> Result<Vec<MedicationRecord>> {
            Ok(Vec::new())
        }
        async fn link_unowned_courses(&self, _patient_name: &str, _owner: &str) -> Result<u64> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_three_day_course_creates_consecutive_records() {
        // Given
        let (backend, _tmp) = temp_backend().await;
        let svc = service(backend.clone());

        // When
        let created = svc.start_course(new_course(date(2024, 1, 1), 3)).await.unwrap();

        // Then
        assert_eq!(created.requested_days, 3);
        assert_eq!(created.created_days, 3);
        assert!(created.is_complete());

        let records = backend
            .records_for_patient_in_range("Kim", date(2024, 1, 1), date(2024, 1, 4))
            .await
            .unwrap();
        let dates: Vec<_> = records.iter().map(|r| r.scan_date).collect();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]);

        let parents: Vec<_> = records.iter().filter(|r| !r.is_expansion_copy).collect();
        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].id, created.parent_record_id);
        for copy in records.iter().filter(|r| r.is_expansion_copy) {
            assert_eq!(copy.parent_record_id.as_deref(), Some(created.parent_record_id.as_str()));
        }
        assert!(records.iter().all(|r| r.course_end_date == date(2024, 1, 3)));
        assert!(records.iter().all(|r| !r.taken()));
    }

    #[tokio::test]
    async fn test_single_day_course_has_no_copies() {
        let (backend, _tmp) = temp_backend().await;
        let svc = service(backend.clone());

        let created = svc.start_course(new_course(date(2024, 5, 10), 1)).await.unwrap();

        assert_eq!(created.created_days, 1);
        let records = backend.records_for_patient("Kim").await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].is_expansion_copy);
        assert_eq!(records[0].course_end_date, date(2024, 5, 10));
    }

    #[tokio::test]
    async fn test_course_crosses_month_boundary() {
        let (backend, _tmp) = temp_backend().await;
        let svc = service(backend.clone());

        svc.start_course(new_course(date(2024, 1, 30), 3)).await.unwrap();

        let records = backend.records_for_patient("Kim").await.unwrap();
        let mut dates: Vec<_> = records.iter().map(|r| r.scan_date).collect();
        dates.sort();
        assert_eq!(dates, vec![date(2024, 1, 30), date(2024, 1, 31), date(2024, 2, 1)]);
    }

    #[tokio::test]
    async fn test_validation_rejects_before_writing() {
        let store = Arc::new(FlakyStore::default());
        let svc = service(store.clone());

        let err = svc.start_course(new_course(date(2024, 1, 1), 0)).await.unwrap_err();
        assert!(matches!(err, MedtrackError::Validation(_)));

        let err = svc.start_course(new_course(date(2024, 1, 1), 91)).await.unwrap_err();
        assert!(matches!(err, MedtrackError::Validation(_)));

        let mut no_times = new_course(date(2024, 1, 1), 3);
        no_times.dose_times.clear();
        let err = svc.start_course(no_times).await.unwrap_err();
        assert!(matches!(err, MedtrackError::Validation(_)));

        let mut blank = new_course(date(2024, 1, 1), 3);
        blank.patient_name = "   ".to_string();
        assert!(svc.start_course(blank).await.is_err());

        assert!(store.doses.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_max_duration_is_accepted() {
        let store = Arc::new(FlakyStore::default());
        let svc = service(store.clone());

        let created = svc.start_course(new_course(date(2024, 1, 1), 90)).await.unwrap();
        assert_eq!(created.created_days, 90);
    }

    #[tokio::test]
    async fn test_failed_copy_is_skipped_and_counted() {
        // Given: the third insert (day 3) fails
        let store = Arc::new(FlakyStore {
            fail_on: vec![3],
            ..Default::default()
        });
        let svc = service(store.clone());

        // When
        let created = svc.start_course(new_course(date(2024, 1, 1), 5)).await.unwrap();

        // Then
        assert_eq!(created.requested_days, 5);
        assert_eq!(created.created_days, 4);
        assert!(!created.is_complete());
        let dates: Vec<_> = store.doses.lock().unwrap().iter().map(|d| d.scan_date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 4), date(2024, 1, 5)]
        );
    }

    #[tokio::test]
    async fn test_day_one_failure_is_an_error() {
        let store = Arc::new(FlakyStore {
            fail_on: vec![1],
            ..Default::default()
        });
        let svc = service(store.clone());

        let err = svc.start_course(new_course(date(2024, 1, 1), 3)).await.unwrap_err();

        assert!(matches!(err, MedtrackError::CourseStart(_)));
        assert!(store.doses.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_course_row_failure_is_an_error() {
        let store = Arc::new(FlakyStore {
            fail_course: true,
            ..Default::default()
        });
        let svc = service(store.clone());

        let err = svc.start_course(new_course(date(2024, 1, 1), 3)).await.unwrap_err();
        assert!(matches!(err, MedtrackError::CourseStart(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_only_one_day() {
        let (backend, _tmp) = temp_backend().await;
        let svc = service(backend.clone());
        let created = svc.start_course(new_course(date(2024, 1, 1), 3)).await.unwrap();

        svc.delete_record(&created.parent_record_id).await.unwrap();

        let remaining = backend.records_for_patient("Kim").await.unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(matches!(
            svc.delete_record(&created.parent_record_id).await,
            Err(MedtrackError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unrepresentable_end_date_is_rejected() {
        let store = Arc::new(FlakyStore::default());
        let svc = service(store.clone());

        let err = svc
            .start_course(new_course(NaiveDate::MAX, 2))
            .await
            .unwrap_err();

        assert!(matches!(err, MedtrackError::Validation(_)));
        assert!(store.doses.lock().unwrap().is_empty());
        assert_eq!(*store.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_five_digit_years_are_rejected() {
        // Given: a patient with a valid course
        let (backend, _tmp) = temp_backend().await;
        let svc = service(backend.clone());
        svc.start_course(new_course(date(2024, 1, 1), 2)).await.unwrap();

        // When: a course starts in year 10000, or runs past 9999-12-31
        let far = svc.start_course(new_course(date(10000, 1, 1), 2)).await;
        let spill = svc.start_course(new_course(date(9999, 12, 31), 2)).await;

        // Then: both are rejected and history still reads
        assert!(matches!(far, Err(MedtrackError::Validation(_))));
        assert!(matches!(spill, Err(MedtrackError::Validation(_))));
        let history = backend.records_for_patient("Kim").await.unwrap();
        assert_eq!(history.len(), 2);

        let last_day = svc.start_course(new_course(date(9999, 12, 31), 1)).await;
        assert!(last_day.is_ok());
    }
}

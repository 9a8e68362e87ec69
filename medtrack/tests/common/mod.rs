#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::NamedTempFile;

use medtrack::config::DatabaseConfig;
use medtrack::db::{Database, LibSqlBackend};
use medtrack::models::{DoseTime, NewCourse};

/// File-backed backend with the schema applied. Keep the temp file alive for
/// the duration of the test.
pub async fn backend() -> (Arc<LibSqlBackend>, NamedTempFile) {
    let tmp = NamedTempFile::new().expect("temp file");
    let config = DatabaseConfig {
        url: tmp.path().to_string_lossy().to_string(),
        auth_token: None,
        local_path: None,
        sync_interval_secs: 60,
    };
    let db = Database::new(&config).await.expect("database");
    (Arc::new(LibSqlBackend::new(db)), tmp)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn course(patient: &str, start: NaiveDate, days: u32) -> NewCourse {
    NewCourse {
        patient_name: patient.to_string(),
        patient_age: Some(70),
        owner_user_id: None,
        drug_names: vec!["Tylenol".to_string(), "Amoxicillin".to_string()],
        facility: Some("Seoul Clinic".to_string()),
        notes_payload: serde_json::json!({"source": "scan"}),
        start_date: start,
        duration_days: days,
        dose_times: vec![DoseTime::Morning, DoseTime::Evening],
    }
}

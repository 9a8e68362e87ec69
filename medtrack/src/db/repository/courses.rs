use chrono::{NaiveDate, Utc};
use libsql::{params, Connection};
use nanoid::nanoid;

use super::{day_start, noon_timestamp, parse_stored_date, parse_timestamp};
use crate::error::{MedtrackError, Result};
use crate::models::{course_end_date, Course, DoseState, MedicationRecord, NewDose};

const RECORD_COLUMNS: &str = r#"
    r.id, r.course_id, c.patient_name, c.patient_age, c.owner_user_id, c.drug_names,
    c.facility, c.notes_payload, r.scan_date, c.dose_times, c.duration_days, c.start_date,
    r.is_expansion_copy, r.parent_record_id, r.taken, r.created_at
"#;

pub struct CourseRepository;

impl CourseRepository {
    pub async fn create_course(conn: &Connection, course: &Course) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO courses (
                id, patient_name, patient_age, owner_user_id, drug_names, facility,
                notes_payload, start_date, duration_days, dose_times, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                course.id.clone(),
                course.patient_name.clone(),
                course.patient_age,
                course.owner_user_id.clone(),
                serde_json::to_string(&course.drug_names)?,
                course.facility.clone(),
                serde_json::to_string(&course.notes_payload)?,
                course.start_date.to_string(),
                i64::from(course.duration_days),
                serde_json::to_string(&course.dose_times)?,
                course.created_at.to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn create_dose(conn: &Connection, dose: &NewDose) -> Result<String> {
        let id = nanoid!();

        conn.execute(
            r#"
            INSERT INTO medication_records (
                id, course_id, scan_date, is_expansion_copy, parent_record_id, taken, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)
            "#,
            params![
                id.clone(),
                dose.course_id.clone(),
                noon_timestamp(dose.scan_date),
                dose.is_expansion_copy as i32,
                dose.parent_record_id.clone(),
                Utc::now().to_rfc3339(),
            ],
        )
        .await?;

        Ok(id)
    }

    pub async fn get_record(conn: &Connection, id: &str) -> Result<Option<MedicationRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM medication_records r \
             JOIN courses c ON c.id = r.course_id WHERE r.id = ?1"
        );
        let mut rows = conn.query(&sql, params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_record(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn set_state(conn: &Connection, id: &str, state: DoseState) -> Result<bool> {
        let rows_affected = conn
            .execute(
                "UPDATE medication_records SET taken = ?2 WHERE id = ?1",
                params![id, state.is_taken() as i32],
            )
            .await?;

        Ok(rows_affected > 0)
    }

    pub async fn delete_record(conn: &Connection, id: &str) -> Result<bool> {
        let rows_affected = conn
            .execute("DELETE FROM medication_records WHERE id = ?1", params![id])
            .await?;

        Ok(rows_affected > 0)
    }

    pub async fn by_patient_in_range(
        conn: &Connection,
        patient_name: &str,
        start: NaiveDate,
        end_exclusive: NaiveDate,
    ) -> Result<Vec<MedicationRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM medication_records r \
             JOIN courses c ON c.id = r.course_id \
             WHERE c.patient_name = ?1 AND r.scan_date >= ?2 AND r.scan_date < ?3 \
             ORDER BY r.scan_date ASC, r.created_at ASC"
        );
        let rows = conn
            .query(
                &sql,
                params![patient_name, day_start(start), day_start(end_exclusive)],
            )
            .await?;

        Self::collect(rows).await
    }

    pub async fn by_patient(conn: &Connection, patient_name: &str) -> Result<Vec<MedicationRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM medication_records r \
             JOIN courses c ON c.id = r.course_id \
             WHERE c.patient_name = ?1 \
             ORDER BY r.scan_date DESC, r.created_at DESC"
        );
        let rows = conn.query(&sql, params![patient_name]).await?;

        Self::collect(rows).await
    }

    pub async fn by_owner_in_range(
        conn: &Connection,
        owner_user_id: &str,
        start: NaiveDate,
        end_exclusive: NaiveDate,
    ) -> Result<Vec<MedicationRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM medication_records r \
             JOIN courses c ON c.id = r.course_id \
             WHERE c.owner_user_id = ?1 AND r.scan_date >= ?2 AND r.scan_date < ?3 \
             ORDER BY r.scan_date ASC, r.created_at ASC"
        );
        let rows = conn
            .query(
                &sql,
                params![owner_user_id, day_start(start), day_start(end_exclusive)],
            )
            .await?;

        Self::collect(rows).await
    }

    pub async fn link_unowned(
        conn: &Connection,
        patient_name: &str,
        owner_user_id: &str,
    ) -> Result<u64> {
        let rows_affected = conn
            .execute(
                "UPDATE courses SET owner_user_id = ?2 WHERE patient_name = ?1 AND owner_user_id IS NULL",
                params![patient_name, owner_user_id],
            )
            .await?;

        Ok(rows_affected)
    }

    async fn collect(mut rows: libsql::Rows) -> Result<Vec<MedicationRecord>> {
        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_record(&row)?);
        }
        Ok(results)
    }

    fn row_to_record(row: &libsql::Row) -> Result<MedicationRecord> {
        let raw_duration = row.get::<i64>(10)?;
        let duration_days = u32::try_from(raw_duration)
            .ok()
            .filter(|days| *days >= 1)
            .ok_or_else(|| {
                MedtrackError::Internal(format!("Invalid stored course duration: {raw_duration}"))
            })?;
        let start_date = parse_stored_date(&row.get::<String>(11)?)?;
        let course_end_date = course_end_date(start_date, duration_days).ok_or_else(|| {
            MedtrackError::Internal(format!(
                "Course starting {start_date} with {duration_days} days has no end date"
            ))
        })?;

        Ok(MedicationRecord {
            id: row.get(0)?,
            course_id: row.get(1)?,
            patient_name: row.get(2)?,
            patient_age: row.get(3)?,
            owner_user_id: row.get(4)?,
            drug_names: serde_json::from_str(&row.get::<String>(5)?)?,
            facility: row.get(6)?,
            notes_payload: serde_json::from_str(&row.get::<String>(7)?)?,
            scan_date: parse_stored_date(&row.get::<String>(8)?)?,
            dose_times: serde_json::from_str(&row.get::<String>(9)?)?,
            course_duration_days: duration_days,
            course_end_date,
            is_expansion_copy: row.get::<i32>(12)? != 0,
            parent_record_id: row.get(13)?,
            state: DoseState::from_flag(row.get::<i32>(14)? != 0),
            created_at: parse_timestamp(&row.get::<String>(15)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::init_schema;
    use crate::models::DoseTime;

    async fn setup_test_db() -> (libsql::Database, Connection) {
        let db = libsql::Builder::new_local(":memory:").build().await.unwrap();
        let conn = db.connect().unwrap();
        init_schema(&conn).await.unwrap();
        (db, conn)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn course(id: &str, patient: &str, start: NaiveDate, days: u32) -> Course {
        Course {
            id: id.to_string(),
            patient_name: patient.to_string(),
            patient_age: Some(72),
            owner_user_id: None,
            drug_names: vec!["Amoxicillin".to_string()],
            facility: Some("Central Pharmacy".to_string()),
            notes_payload: serde_json::json!({"note": "after meals"}),
            start_date: start,
            duration_days: days,
            dose_times: vec![DoseTime::Morning, DoseTime::Evening],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_record_joins_course_fields() {
        let (_db, conn) = setup_test_db().await;
        let c = course("c1", "Kim", date(2024, 1, 1), 3);
        CourseRepository::create_course(&conn, &c).await.unwrap();

        let id = CourseRepository::create_dose(
            &conn,
            &NewDose {
                course_id: "c1".to_string(),
                scan_date: date(2024, 1, 2),
                is_expansion_copy: true,
                parent_record_id: Some("p".to_string()),
            },
        )
        .await
        .unwrap();

        let record = CourseRepository::get_record(&conn, &id).await.unwrap().unwrap();
        assert_eq!(record.patient_name, "Kim");
        assert_eq!(record.scan_date, date(2024, 1, 2));
        assert_eq!(record.course_end_date, date(2024, 1, 3));
        assert_eq!(record.dose_times, vec![DoseTime::Morning, DoseTime::Evening]);
        assert_eq!(record.parent_record_id.as_deref(), Some("p"));
        assert!(record.is_expansion_copy);
        assert!(!record.taken());
    }

    #[tokio::test]
    async fn test_range_is_end_exclusive() {
        let (_db, conn) = setup_test_db().await;
        CourseRepository::create_course(&conn, &course("c1", "Kim", date(2024, 1, 1), 3))
            .await
            .unwrap();
        for day in 1..=3 {
            CourseRepository::create_dose(
                &conn,
                &NewDose {
                    course_id: "c1".to_string(),
                    scan_date: date(2024, 1, day),
                    is_expansion_copy: day > 1,
                    parent_record_id: None,
                },
            )
            .await
            .unwrap();
        }

        let records =
            CourseRepository::by_patient_in_range(&conn, "Kim", date(2024, 1, 2), date(2024, 1, 3))
                .await
                .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].scan_date, date(2024, 1, 2));

        let other = CourseRepository::by_patient_in_range(
            &conn,
            "Lee",
            date(2024, 1, 1),
            date(2024, 2, 1),
        )
        .await
        .unwrap();
        assert!(other.is_empty());

        let history = CourseRepository::by_patient(&conn, "Kim").await.unwrap();
        assert_eq!(history.first().unwrap().scan_date, date(2024, 1, 3));
    }

    #[tokio::test]
    async fn test_set_state_and_delete_touch_one_row() {
        let (_db, conn) = setup_test_db().await;
        CourseRepository::create_course(&conn, &course("c1", "Kim", date(2024, 1, 1), 2))
            .await
            .unwrap();
        let mut ids = Vec::new();
        for day in 1..=2 {
            ids.push(
                CourseRepository::create_dose(
                    &conn,
                    &NewDose {
                        course_id: "c1".to_string(),
                        scan_date: date(2024, 1, day),
                        is_expansion_copy: day > 1,
                        parent_record_id: None,
                    },
                )
                .await
                .unwrap(),
            );
        }

        assert!(CourseRepository::set_state(&conn, &ids[0], DoseState::Taken)
            .await
            .unwrap());
        assert!(!CourseRepository::set_state(&conn, "missing", DoseState::Taken)
            .await
            .unwrap());
        let sibling = CourseRepository::get_record(&conn, &ids[1]).await.unwrap().unwrap();
        assert!(!sibling.taken());

        assert!(CourseRepository::delete_record(&conn, &ids[0]).await.unwrap());
        assert!(CourseRepository::get_record(&conn, &ids[1]).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_link_unowned_only_touches_unowned() {
        let (_db, conn) = setup_test_db().await;
        CourseRepository::create_course(&conn, &course("c1", "Kim", date(2024, 1, 1), 1))
            .await
            .unwrap();
        let mut owned = course("c2", "Kim", date(2024, 1, 1), 1);
        owned.owner_user_id = Some("someone".to_string());
        CourseRepository::create_course(&conn, &owned).await.unwrap();

        let linked = CourseRepository::link_unowned(&conn, "Kim", "u1").await.unwrap();
        assert_eq!(linked, 1);
    }

    #[tokio::test]
    async fn test_corrupt_course_columns_are_errors() {
        let (_db, conn) = setup_test_db().await;
        CourseRepository::create_course(&conn, &course("c1", "Kim", date(2024, 1, 1), 2))
            .await
            .unwrap();
        let id = CourseRepository::create_dose(
            &conn,
            &NewDose {
                course_id: "c1".to_string(),
                scan_date: date(2024, 1, 1),
                is_expansion_copy: false,
                parent_record_id: None,
            },
        )
        .await
        .unwrap();

        conn.execute("UPDATE courses SET drug_names = 'not json' WHERE id = 'c1'", ())
            .await
            .unwrap();
        let err = CourseRepository::get_record(&conn, &id).await.unwrap_err();
        assert!(matches!(err, MedtrackError::Json(_)));

        conn.execute(
            "UPDATE courses SET drug_names = '[]', duration_days = -3 WHERE id = 'c1'",
            (),
        )
        .await
        .unwrap();
        let err = CourseRepository::get_record(&conn, &id).await.unwrap_err();
        assert!(matches!(err, MedtrackError::Internal(_)));
    }
}

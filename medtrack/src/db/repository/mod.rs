mod courses;
mod family;
mod notifications;
mod users;

pub use courses::CourseRepository;
pub use family::FamilyRepository;
pub use notifications::NotificationRepository;
pub use users::UserRepository;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{MedtrackError, Result};

/// Dose-days are stored at a fixed noon timestamp.
pub(crate) fn noon_timestamp(date: NaiveDate) -> String {
    format!("{date}T12:00:00")
}

pub(crate) fn day_start(date: NaiveDate) -> String {
    format!("{date}T00:00:00")
}

pub(crate) fn parse_stored_date(value: &str) -> Result<NaiveDate> {
    value
        .get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .ok_or_else(|| MedtrackError::Internal(format!("Invalid stored date: {value}")))
}

pub(crate) fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_date_round_trip() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(noon_timestamp(date), "2024-03-09T12:00:00");
        assert_eq!(parse_stored_date(&noon_timestamp(date)).unwrap(), date);
        assert!(parse_stored_date("03/09").is_err());
    }

    #[test]
    fn test_noon_sorts_inside_day_bounds() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let next = date.succ_opt().unwrap();
        assert!(noon_timestamp(date) >= day_start(date));
        assert!(noon_timestamp(date) < day_start(next));
    }
}

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{
    Course, DoseState, FamilyLink, LinkedAccount, MedicationRecord, NewDose, Notification,
    NotificationCategory, NotificationSettings, Role, UserAccount,
};

// ---------------------------------------------------------------------------
// Individual store traits
// ---------------------------------------------------------------------------

/// Courses and their dose-day records.
///
/// Every write is a single row. Date ranges are `[start, end_exclusive)` on
/// the calendar date of the record.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_course(&self, course: &Course) -> Result<()>;

    /// Inserts one dose-day and returns its assigned id.
    async fn insert_dose(&self, dose: &NewDose) -> Result<String>;

    async fn get_record(&self, id: &str) -> Result<Option<MedicationRecord>>;

    /// Returns `false` when no record has this id.
    async fn set_dose_state(&self, id: &str, state: DoseState) -> Result<bool>;

    /// Removes exactly one dose-day.
    async fn delete_record(&self, id: &str) -> Result<bool>;

    async fn records_for_patient_in_range(
        &self,
        patient_name: &str,
        start: NaiveDate,
        end_exclusive: NaiveDate,
    ) -> Result<Vec<MedicationRecord>>;

    /// Newest first.
    async fn records_for_patient(&self, patient_name: &str) -> Result<Vec<MedicationRecord>>;

    async fn records_for_owner_in_range(
        &self,
        owner_user_id: &str,
        start: NaiveDate,
        end_exclusive: NaiveDate,
    ) -> Result<Vec<MedicationRecord>>;

    /// Attaches courses with no owner and a matching patient name to `owner_user_id`.
    async fn link_unowned_courses(&self, patient_name: &str, owner_user_id: &str) -> Result<u64>;
}

/// Account lookup and creation.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: &UserAccount) -> Result<()>;
    async fn get_user(&self, id: &str) -> Result<Option<UserAccount>>;
    async fn get_user_by_name(&self, name: &str) -> Result<Option<UserAccount>>;
    async fn list_users_by_role(&self, role: Role) -> Result<Vec<UserAccount>>;
}

/// Primary/observer links.
#[async_trait]
pub trait FamilyGraph: Send + Sync {
    async fn link_exists(&self, primary_user_id: &str, observer_user_id: &str) -> Result<bool>;
    async fn create_link(&self, primary_user_id: &str, observer_user_id: &str)
        -> Result<FamilyLink>;

    /// Observers linked to a primary account. May be empty.
    async fn linked_observers(&self, primary_user_id: &str) -> Result<Vec<LinkedAccount>>;

    async fn linked_primaries(&self, observer_user_id: &str) -> Result<Vec<LinkedAccount>>;
}

/// Inbox rows.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(
        &self,
        recipient_user_id: &str,
        message: &str,
        category: NotificationCategory,
    ) -> Result<Notification>;
    async fn unread_notifications(&self, recipient_user_id: &str) -> Result<Vec<Notification>>;
    async fn recent_notifications(
        &self,
        recipient_user_id: &str,
        limit: u32,
    ) -> Result<Vec<Notification>>;
    async fn mark_notification_read(&self, id: &str) -> Result<bool>;
    async fn mark_all_notifications_read(&self, recipient_user_id: &str) -> Result<u64>;
}

/// Per-user push delivery settings.
#[async_trait]
pub trait NotificationSettingsStore: Send + Sync {
    async fn get_settings(&self, user_id: &str) -> Result<Option<NotificationSettings>>;
    async fn upsert_settings(&self, settings: &NotificationSettings) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Unified backend supertrait
// ---------------------------------------------------------------------------

/// A complete database backend that combines all store traits plus lifecycle
/// operations.
#[async_trait]
pub trait DatabaseBackend:
    RecordStore + UserStore + FamilyGraph + NotificationStore + NotificationSettingsStore
{
    /// Sync with remote (e.g. Turso replication). No-op for local-only backends.
    async fn sync(&self) -> Result<()>;
}

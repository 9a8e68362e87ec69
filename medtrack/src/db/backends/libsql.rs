use crate::db::connection::Database;
use crate::db::repository::{
    CourseRepository, FamilyRepository, NotificationRepository, UserRepository,
};
use crate::db::traits::{
    DatabaseBackend, FamilyGraph, NotificationSettingsStore, NotificationStore, RecordStore,
    UserStore,
};
use crate::error::Result;
use crate::models::{
    Course, DoseState, FamilyLink, LinkedAccount, MedicationRecord, NewDose, Notification,
    NotificationCategory, NotificationSettings, Role, UserAccount,
};
use async_trait::async_trait;
use chrono::NaiveDate;

pub struct LibSqlBackend {
    db: Database,
}

impl LibSqlBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordStore for LibSqlBackend {
    async fn insert_course(&self, course: &Course) -> Result<()> {
        let conn = self.db.connect()?;
        CourseRepository::create_course(&conn, course).await
    }
    async fn insert_dose(&self, dose: &NewDose) -> Result<String> {
        let conn = self.db.connect()?;
        CourseRepository::create_dose(&conn, dose).await
    }
    async fn get_record(&self, id: &str) -> Result<Option<MedicationRecord>> {
        let conn = self.db.connect()?;
        CourseRepository::get_record(&conn, id).await
    }
    async fn set_dose_state(&self, id: &str, state: DoseState) -> Result<bool> {
        let conn = self.db.connect()?;
        CourseRepository::set_state(&conn, id, state).await
    }
    async fn delete_record(&self, id: &str) -> Result<bool> {
        let conn = self.db.connect()?;
        CourseRepository::delete_record(&conn, id).await
    }
    async fn records_for_patient_in_range(
        &self,
        patient_name: &str,
        start: NaiveDate,
        end_exclusive: NaiveDate,
    ) -> Result<Vec<MedicationRecord>> {
        let conn = self.db.connect()?;
        CourseRepository::by_patient_in_range(&conn, patient_name, start, end_exclusive).await
    }
    async fn records_for_patient(&self, patient_name: &str) -> Result<Vec<MedicationRecord>> {
        let conn = self.db.connect()?;
        CourseRepository::by_patient(&conn, patient_name).await
    }
    async fn records_for_owner_in_range(
        &self,
        owner_user_id: &str,
        start: NaiveDate,
        end_exclusive: NaiveDate,
    ) -> Result<Vec<MedicationRecord>> {
        let conn = self.db.connect()?;
        CourseRepository::by_owner_in_range(&conn, owner_user_id, start, end_exclusive).await
    }
    async fn link_unowned_courses(&self, patient_name: &str, owner_user_id: &str) -> Result<u64> {
        let conn = self.db.connect()?;
        CourseRepository::link_unowned(&conn, patient_name, owner_user_id).await
    }
}

#[async_trait]
impl UserStore for LibSqlBackend {
    async fn create_user(&self, user: &UserAccount) -> Result<()> {
        let conn = self.db.connect()?;
        UserRepository::create(&conn, user).await
    }
    async fn get_user(&self, id: &str) -> Result<Option<UserAccount>> {
        let conn = self.db.connect()?;
        UserRepository::get_by_id(&conn, id).await
    }
    async fn get_user_by_name(&self, name: &str) -> Result<Option<UserAccount>> {
        let conn = self.db.connect()?;
        UserRepository::get_by_name(&conn, name).await
    }
    async fn list_users_by_role(&self, role: Role) -> Result<Vec<UserAccount>> {
        let conn = self.db.connect()?;
        UserRepository::list_by_role(&conn, role).await
    }
}

#[async_trait]
impl FamilyGraph for LibSqlBackend {
    async fn link_exists(&self, primary_user_id: &str, observer_user_id: &str) -> Result<bool> {
        let conn = self.db.connect()?;
        FamilyRepository::exists(&conn, primary_user_id, observer_user_id).await
    }
    async fn create_link(
        &self,
        primary_user_id: &str,
        observer_user_id: &str,
    ) -> Result<FamilyLink> {
        let conn = self.db.connect()?;
        FamilyRepository::create(&conn, primary_user_id, observer_user_id).await
    }
    async fn linked_observers(&self, primary_user_id: &str) -> Result<Vec<LinkedAccount>> {
        let conn = self.db.connect()?;
        FamilyRepository::observers_of(&conn, primary_user_id).await
    }
    async fn linked_primaries(&self, observer_user_id: &str) -> Result<Vec<LinkedAccount>> {
        let conn = self.db.connect()?;
        FamilyRepository::primaries_of(&conn, observer_user_id).await
    }
}

#[async_trait]
impl NotificationStore for LibSqlBackend {
    async fn insert_notification(
        &self,
        recipient_user_id: &str,
        message: &str,
        category: NotificationCategory,
    ) -> Result<Notification> {
        let conn = self.db.connect()?;
        NotificationRepository::create(&conn, recipient_user_id, message, category).await
    }
    async fn unread_notifications(&self, recipient_user_id: &str) -> Result<Vec<Notification>> {
        let conn = self.db.connect()?;
        NotificationRepository::unread(&conn, recipient_user_id).await
    }
    async fn recent_notifications(
        &self,
        recipient_user_id: &str,
        limit: u32,
    ) -> Result<Vec<Notification>> {
        let conn = self.db.connect()?;
        NotificationRepository::recent(&conn, recipient_user_id, limit).await
    }
    async fn mark_notification_read(&self, id: &str) -> Result<bool> {
        let conn = self.db.connect()?;
        NotificationRepository::mark_read(&conn, id).await
    }
    async fn mark_all_notifications_read(&self, recipient_user_id: &str) -> Result<u64> {
        let conn = self.db.connect()?;
        NotificationRepository::mark_all_read(&conn, recipient_user_id).await
    }
}

#[async_trait]
impl NotificationSettingsStore for LibSqlBackend {
    async fn get_settings(&self, user_id: &str) -> Result<Option<NotificationSettings>> {
        let conn = self.db.connect()?;
        NotificationRepository::get_settings(&conn, user_id).await
    }
    async fn upsert_settings(&self, settings: &NotificationSettings) -> Result<()> {
        let conn = self.db.connect()?;
        NotificationRepository::upsert_settings(&conn, settings).await
    }
}

#[async_trait]
impl DatabaseBackend for LibSqlBackend {
    async fn sync(&self) -> Result<()> {
        self.db.sync().await
    }
}

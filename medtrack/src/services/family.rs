use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use nanoid::nanoid;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::AdherenceService;
use crate::db::{FamilyGraph, RecordStore, UserStore};
use crate::error::{MedtrackError, Result};
use crate::models::{FamilyLink, LinkedAccount, Role, TodayStatus, UserAccount};

#[derive(Debug, Clone)]
pub struct SignUp {
    pub name: String,
    pub age: Option<i32>,
    pub role: Role,
    pub pin: String,
}

/// Accounts and the primary/observer graph.
#[derive(Clone)]
pub struct FamilyService {
    users: Arc<dyn UserStore>,
    family: Arc<dyn FamilyGraph>,
    records: Arc<dyn RecordStore>,
    adherence: AdherenceService,
}

impl FamilyService {
    pub fn new(
        users: Arc<dyn UserStore>,
        family: Arc<dyn FamilyGraph>,
        records: Arc<dyn RecordStore>,
        adherence: AdherenceService,
    ) -> Self {
        Self {
            users,
            family,
            records,
            adherence,
        }
    }

    pub async fn sign_up(&self, request: SignUp) -> Result<UserAccount> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(MedtrackError::Validation("Name must not be blank".to_string()));
        }
        validate_pin(&request.pin)?;

        if self.users.get_user_by_name(name).await?.is_some() {
            return Err(MedtrackError::Conflict(format!("User '{name}' already exists")));
        }

        let user = UserAccount {
            id: nanoid!(),
            name: name.to_string(),
            age: match request.role {
                Role::Primary => request.age,
                Role::Observer => None,
            },
            role: request.role,
            credential_hash: hash_pin(&request.pin),
            created_at: Utc::now(),
        };
        self.users.create_user(&user).await?;
        info!("Created {} account {}", user.role, user.id);

        self.backfill(&user).await;
        Ok(user)
    }

    pub async fn sign_in(&self, name: &str, pin: &str) -> Result<UserAccount> {
        let user = self.authenticate(name, pin).await?;
        self.backfill(&user).await;
        Ok(user)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<UserAccount> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or_else(|| MedtrackError::NotFound(format!("User {user_id} not found")))
    }

    /// Links an observer to a primary account. The observer proves identity
    /// with their own PIN. Re-linking an existing pair is a no-op.
    pub async fn connect(
        &self,
        primary_user_id: &str,
        observer_name: &str,
        observer_pin: &str,
    ) -> Result<Option<FamilyLink>> {
        let primary = self.get_user(primary_user_id).await?;
        if primary.role != Role::Primary {
            return Err(MedtrackError::Validation(format!(
                "User {primary_user_id} is not a primary account"
            )));
        }

        let observer = self.authenticate(observer_name, observer_pin).await?;
        if observer.role != Role::Observer {
            return Err(MedtrackError::Validation(format!(
                "User '{observer_name}' is not an observer account"
            )));
        }

        if self.family.link_exists(&primary.id, &observer.id).await? {
            return Ok(None);
        }

        let link = self.family.create_link(&primary.id, &observer.id).await?;
        info!("Linked observer {} to primary {}", observer.id, primary.id);
        Ok(Some(link))
    }

    pub async fn linked_observers(&self, primary_user_id: &str) -> Result<Vec<LinkedAccount>> {
        self.family.linked_observers(primary_user_id).await
    }

    pub async fn linked_primaries(&self, observer_user_id: &str) -> Result<Vec<LinkedAccount>> {
        self.family.linked_primaries(observer_user_id).await
    }

    /// Today's dose-days of every primary this observer follows.
    pub async fn observer_dashboard(
        &self,
        observer_user_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<TodayStatus>> {
        let primaries = self.family.linked_primaries(observer_user_id).await?;

        let mut statuses = Vec::with_capacity(primaries.len());
        for primary in primaries {
            let records = self.adherence.owned_on(&primary.user_id, today).await?;
            let taken = records.iter().filter(|r| r.taken()).count() as u32;
            statuses.push(TodayStatus {
                user_id: primary.user_id,
                name: primary.name,
                age: primary.age,
                records,
                taken,
            });
        }
        Ok(statuses)
    }

    async fn authenticate(&self, name: &str, pin: &str) -> Result<UserAccount> {
        let user = self
            .users
            .get_user_by_name(name.trim())
            .await?
            .ok_or_else(|| MedtrackError::Unauthorized("Invalid name or PIN".to_string()))?;

        if user.credential_hash != hash_pin(pin) {
            return Err(MedtrackError::Unauthorized("Invalid name or PIN".to_string()));
        }
        Ok(user)
    }

    /// Attaches unowned courses recorded under this account's name.
    async fn backfill(&self, user: &UserAccount) {
        if user.role != Role::Primary {
            return;
        }
        match self.records.link_unowned_courses(&user.name, &user.id).await {
            Ok(0) => {}
            Ok(n) => info!("Linked {} existing courses to {}", n, user.id),
            Err(e) => warn!(user = %user.id, error = %e, "Failed to link existing courses"),
        }
    }
}

/// PINs are 4 to 8 ASCII digits.
pub fn validate_pin(pin: &str) -> Result<()> {
    if (4..=8).contains(&pin.len()) && pin.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(MedtrackError::Validation(
            "PIN must be 4 to 8 digits".to_string(),
        ))
    }
}

pub fn hash_pin(pin: &str) -> String {
    let digest = Sha256::digest(pin.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CourseConfig;
    use crate::db::test_support::temp_backend;
    use crate::db::LibSqlBackend;
    use crate::models::{DoseTime, NewCourse};
    use crate::services::CourseService;

    fn service(backend: &Arc<LibSqlBackend>) -> FamilyService {
        FamilyService::new(
            backend.clone(),
            backend.clone(),
            backend.clone(),
            AdherenceService::new(backend.clone()),
        )
    }

    fn signup(name: &str, role: Role) -> SignUp {
        SignUp {
            name: name.to_string(),
            age: Some(70),
            role,
            pin: "1234".to_string(),
        }
    }

    #[test]
    fn test_pin_rules() {
        assert!(validate_pin("1234").is_ok());
        assert!(validate_pin("12345678").is_ok());
        assert!(validate_pin("123").is_err());
        assert!(validate_pin("12a4").is_err());
        assert_eq!(hash_pin("1234").len(), 64);
    }

    #[tokio::test]
    async fn test_sign_up_and_sign_in() {
        let (backend, _tmp) = temp_backend().await;
        let svc = service(&backend);

        let user = svc.sign_up(signup("Kim", Role::Primary)).await.unwrap();
        assert_eq!(user.age, Some(70));

        let observer = svc.sign_up(signup("Lee", Role::Observer)).await.unwrap();
        assert_eq!(observer.age, None);

        assert!(matches!(
            svc.sign_up(signup("Kim", Role::Primary)).await,
            Err(MedtrackError::Conflict(_))
        ));
        assert_eq!(svc.sign_in("Kim", "1234").await.unwrap().id, user.id);
        assert!(matches!(
            svc.sign_in("Kim", "9999").await,
            Err(MedtrackError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_requires_observer_pin_and_is_idempotent() {
        let (backend, _tmp) = temp_backend().await;
        let svc = service(&backend);
        let primary = svc.sign_up(signup("Kim", Role::Primary)).await.unwrap();
        let observer = svc.sign_up(signup("Lee", Role::Observer)).await.unwrap();

        assert!(svc.connect(&primary.id, "Lee", "0000").await.is_err());
        assert!(svc.connect(&primary.id, "Lee", "1234").await.unwrap().is_some());
        assert!(svc.connect(&primary.id, "Lee", "1234").await.unwrap().is_none());

        let observers = svc.linked_observers(&primary.id).await.unwrap();
        assert_eq!(observers.len(), 1);
        assert_eq!(observers[0].user_id, observer.id);

        let primaries = svc.linked_primaries(&observer.id).await.unwrap();
        assert_eq!(primaries[0].name, "Kim");
    }

    #[tokio::test]
    async fn test_connect_rejects_wrong_roles() {
        let (backend, _tmp) = temp_backend().await;
        let svc = service(&backend);
        let primary = svc.sign_up(signup("Kim", Role::Primary)).await.unwrap();
        svc.sign_up(signup("Park", Role::Primary)).await.unwrap();

        let err = svc.connect(&primary.id, "Park", "1234").await.unwrap_err();
        assert!(matches!(err, MedtrackError::Validation(_)));
    }

    #[tokio::test]
    async fn test_sign_up_backfills_and_dashboard_shows_today() {
        // Given: a course recorded before the account existed
        let (backend, _tmp) = temp_backend().await;
        let today = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        CourseService::new(backend.clone(), CourseConfig::default())
            .start_course(NewCourse {
                patient_name: "Kim".to_string(),
                patient_age: None,
                owner_user_id: None,
                drug_names: vec![],
                facility: None,
                notes_payload: serde_json::Value::Null,
                start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                duration_days: 3,
                dose_times: vec![DoseTime::Morning],
            })
            .await
            .unwrap();
        let svc = service(&backend);

        // When
        let primary = svc.sign_up(signup("Kim", Role::Primary)).await.unwrap();
        let observer = svc.sign_up(signup("Lee", Role::Observer)).await.unwrap();
        svc.connect(&primary.id, "Lee", "1234").await.unwrap();

        // Then
        let dashboard = svc.observer_dashboard(&observer.id, today).await.unwrap();
        assert_eq!(dashboard.len(), 1);
        assert_eq!(dashboard[0].records.len(), 1);
        assert_eq!(dashboard[0].taken, 0);
    }
}

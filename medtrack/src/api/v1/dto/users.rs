//! Account and family-link DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RecordResponse;
use crate::models::{self, Role};

/// Wire form of [`Role`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum V1Role {
    Primary,
    Observer,
}

impl From<V1Role> for Role {
    fn from(role: V1Role) -> Self {
        match role {
            V1Role::Primary => Role::Primary,
            V1Role::Observer => Role::Observer,
        }
    }
}

impl From<Role> for V1Role {
    fn from(role: Role) -> Self {
        match role {
            Role::Primary => V1Role::Primary,
            Role::Observer => V1Role::Observer,
        }
    }
}

/// Request body for `POST /v1/users:signup`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub name: String,
    /// Ignored for observer accounts.
    pub age: Option<i32>,
    pub role: V1Role,
    /// 4 to 8 digits.
    pub pin: String,
}

/// Request body for `POST /v1/users:signin`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub name: String,
    pub pin: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    pub role: V1Role,
    pub created_at: DateTime<Utc>,
}

impl From<models::UserAccount> for UserResponse {
    fn from(user: models::UserAccount) -> Self {
        Self {
            id: user.id,
            name: user.name,
            age: user.age,
            role: user.role.into(),
            created_at: user.created_at,
        }
    }
}

/// Request body for `POST /v1/family:connect`.
///
/// The observer proves their identity with their own name and PIN.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub primary_user_id: String,
    pub observer_name: String,
    pub observer_pin: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResponse {
    /// `false` when the pair was already linked.
    pub linked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkedAccountResponse {
    pub user_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
}

impl From<models::LinkedAccount> for LinkedAccountResponse {
    fn from(account: models::LinkedAccount) -> Self {
        Self {
            user_id: account.user_id,
            name: account.name,
            age: account.age,
        }
    }
}

/// One followed account on an observer's dashboard.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodayStatusResponse {
    pub user_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    pub records: Vec<RecordResponse>,
    pub taken: u32,
    pub total: u32,
}

impl From<models::TodayStatus> for TodayStatusResponse {
    fn from(status: models::TodayStatus) -> Self {
        let total = status.records.len() as u32;
        Self {
            user_id: status.user_id,
            name: status.name,
            age: status.age,
            records: status.records.into_iter().map(Into::into).collect(),
            taken: status.taken,
            total,
        }
    }
}

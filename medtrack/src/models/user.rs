use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `Primary` accounts are tracked; `Observer` accounts follow them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Primary,
    Observer,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Observer => write!(f, "observer"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "primary" | "parent" => Ok(Self::Primary),
            "observer" | "child" => Ok(Self::Observer),
            _ => Err(format!("Unknown role: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub name: String,
    pub age: Option<i32>,
    pub role: Role,
    #[serde(skip_serializing)]
    pub credential_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyLink {
    pub id: String,
    pub primary_user_id: String,
    pub observer_user_id: String,
    pub created_at: DateTime<Utc>,
}

/// An account on the other side of a family link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkedAccount {
    pub user_id: String,
    pub name: String,
    pub age: Option<i32>,
}

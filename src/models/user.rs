use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Accounts are provisioned by the external auth service; this row is read
// for identity checks and the owner-email join on HR listings.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Employee,
    Hr,
}

impl UserRole {
    // The auth service writes 'HR' for reviewers; anything else is a
    // regular employee account.
    pub fn from_role_str(role: &str) -> Self {
        if role.trim().eq_ignore_ascii_case("hr") {
            UserRole::Hr
        } else {
            UserRole::Employee
        }
    }
}

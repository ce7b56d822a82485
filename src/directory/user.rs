//! User record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Access level of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Guest,
    #[default]
    User,
    Admin,
    Superadmin,
}

/// A user as stored in the directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    password_hash: Option<String>,
}

impl User {
    pub fn new(id: u64, username: String, email: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            email,
            role,
            active: true,
            created_at: now,
            updated_at: now,
            password_hash: None,
        }
    }

    /// Stores an opaque marker for the password. Not a real hash.
    pub fn set_password(&mut self, password: &str) {
        self.password_hash = Some(format!("hashed:{password}"));
    }

    pub fn check_password(&self, password: &str) -> bool {
        self.password_hash.as_deref() == Some(format!("hashed:{password}").as_str())
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::Superadmin)
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

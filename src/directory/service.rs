//! User directory service.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::info;

use super::user::{User, UserRole};
use super::validate::{validate_email, validate_username};
use crate::error::{PipelineError, Result};

/// Fields accepted when creating a user.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub password: Option<String>,
}

/// Fields accepted when updating a user. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub active: Option<bool>,
    pub password: Option<String>,
}

/// In-memory user store with sequential ids starting at 1.
#[derive(Debug)]
pub struct UserDirectory {
    users: BTreeMap<u64, User>,
    next_id: u64,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self {
            users: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Validates and stores a new user.
    pub fn create(&mut self, data: NewUser) -> Result<User> {
        if !validate_email(&data.email) {
            return Err(PipelineError::InvalidRequest("Invalid email address".into()));
        }
        if !validate_username(&data.username) {
            return Err(PipelineError::InvalidRequest("Invalid username".into()));
        }
        if self.get_by_email(&data.email).is_some() {
            return Err(PipelineError::Conflict(format!(
                "Email '{}' is already registered",
                data.email
            )));
        }

        let mut user = User::new(self.next_id, data.username, data.email, data.role);
        if let Some(password) = &data.password {
            user.set_password(password);
        }
        self.next_id += 1;

        info!(id = user.id, username = %user.username, "user created");
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn get_by_id(&self, id: u64) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn get_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email == email)
    }

    /// All users in id order, optionally only active ones.
    pub fn get_all(&self, active_only: bool) -> Vec<&User> {
        self.users
            .values()
            .filter(|u| !active_only || u.active)
            .collect()
    }

    /// Applies `changes` to user `id`. `Ok(None)` if there is no such user.
    pub fn update(&mut self, id: u64, changes: UserUpdate) -> Result<Option<User>> {
        if !self.users.contains_key(&id) {
            return Ok(None);
        }

        if let Some(email) = &changes.email {
            if !validate_email(email) {
                return Err(PipelineError::InvalidRequest("Invalid email address".into()));
            }
            if self.get_by_email(email).is_some_and(|other| other.id != id) {
                return Err(PipelineError::Conflict(format!(
                    "Email '{email}' is already registered"
                )));
            }
        }
        if let Some(username) = &changes.username {
            if !validate_username(username) {
                return Err(PipelineError::InvalidRequest("Invalid username".into()));
            }
        }

        let Some(user) = self.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(active) = changes.active {
            user.active = active;
        }
        if let Some(password) = &changes.password {
            user.set_password(password);
        }
        user.touch();

        Ok(Some(user.clone()))
    }

    /// Soft delete: marks the user inactive. Returns whether the user exists.
    pub fn delete(&mut self, id: u64) -> bool {
        match self.users.get_mut(&id) {
            Some(user) => {
                user.active = false;
                user.touch();
                true
            }
            None => false,
        }
    }

    pub fn count(&self, active_only: bool) -> usize {
        self.get_all(active_only).len()
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

const USERNAME_MAX_LEN: usize = 64;
const PASSWORD_MIN_LEN: usize = 6;
const PASSWORD_MAX_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Accepts surrounding whitespace and any letter case.
    pub(crate) fn parse(raw: &str) -> Result<Self, DomainError> {
        match raw.trim().to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(DomainError::validation(
                "role",
                "invalid role, must be 'admin' or 'user'",
            )),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity resolved from a verified session token for the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Principal {
    pub(crate) user_id: i64,
    pub(crate) role: Role,
}

impl Principal {
    pub(crate) fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Owner-or-admin rule.
    pub(crate) fn may_modify(&self, owner_id: i64) -> bool {
        match self.role {
            Role::Admin => true,
            Role::User => self.user_id == owner_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) confirm_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl LoginRequest {
    /// Empty or over-long fields are reported as bad credentials so callers
    /// never learn which part was wrong.
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = self.username.trim();
        if username.is_empty()
            || self.password.is_empty()
            || username.len() > USERNAME_MAX_LEN
            || self.password.len() > PASSWORD_MAX_LEN
        {
            return Err(DomainError::InvalidCredentials);
        }
        Ok(Self {
            username: username.to_string(),
            password: self.password,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) role: Role,
    pub(crate) created_at: DateTime<Utc>,
}

impl User {
    pub(crate) fn new(
        id: i64,
        username: impl Into<String>,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::validation("id", "must be > 0"));
        }
        let username = normalize_username(&username.into())?;

        Ok(Self {
            id,
            username,
            role,
            created_at,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct UserStats {
    pub(crate) total_users: i64,
    pub(crate) admin_count: i64,
    pub(crate) user_count: i64,
}

pub(crate) fn normalize_username(username: &str) -> Result<String, DomainError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(DomainError::validation("username", "must not be empty"));
    }
    if username.len() > USERNAME_MAX_LEN {
        return Err(DomainError::validation("username", "must be at most 64 chars"));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(DomainError::validation(
            "username",
            "can only contain letters, numbers, and underscores",
        ));
    }
    Ok(username.to_string())
}

/// Returns the trimmed password once it is long enough and matches its confirmation.
pub(crate) fn normalize_new_password(
    password: &str,
    confirm_password: &str,
) -> Result<String, DomainError> {
    let password = password.trim();
    if password.is_empty() {
        return Err(DomainError::validation("password", "must not be empty"));
    }
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(DomainError::validation(
            "password",
            "must be at least 6 characters long",
        ));
    }
    if password != confirm_password.trim() {
        return Err(DomainError::validation(
            "confirm_password",
            "passwords do not match",
        ));
    }
    Ok(password.to_string())
}

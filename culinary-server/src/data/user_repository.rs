use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::user::{Role, User};

#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub(crate) user: User,
    pub(crate) password_hash: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NewUser {
    pub(crate) username: String,
    pub(crate) password_hash: String,
    pub(crate) role: Role,
}

/// Aggregate counts as returned by storage; the plain-user count is derived by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RoleCounts {
    pub(crate) total: i64,
    pub(crate) admins: i64,
}

#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>, DomainError>;
    /// Case-insensitive substring match on username or role, newest first.
    async fn list_users(&self, search: Option<&str>) -> Result<Vec<User>, DomainError>;
    async fn role_counts(&self) -> Result<RoleCounts, DomainError>;
    async fn update_role(&self, user_id: i64, role: Role) -> Result<Option<User>, DomainError>;
    async fn delete_user(&self, user_id: i64) -> Result<bool, DomainError>;
}

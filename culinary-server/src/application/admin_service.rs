use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::user::{Role, User, UserStats};

/// User management operations reserved for administrators. The acting
/// admin's id is passed explicitly so self-targeting can be refused.
pub(crate) struct AdminService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> AdminService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    pub(crate) async fn list_users(&self, search: Option<&str>) -> Result<Vec<User>, DomainError> {
        let search = search.map(str::trim).filter(|term| !term.is_empty());
        self.repo.list_users(search).await
    }

    pub(crate) async fn stats(&self) -> Result<UserStats, DomainError> {
        let counts = self.repo.role_counts().await?;
        Ok(UserStats {
            total_users: counts.total,
            admin_count: counts.admins,
            user_count: counts.total - counts.admins,
        })
    }

    pub(crate) async fn update_role(
        &self,
        target_id: i64,
        acting_admin_id: i64,
        new_role: &str,
    ) -> Result<User, DomainError> {
        if target_id == acting_admin_id {
            return Err(DomainError::validation(
                "id",
                "action denied: you can't change your own role",
            ));
        }
        let role = Role::parse(new_role)?;

        self.repo
            .update_role(target_id, role)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {target_id}")))
    }

    pub(crate) async fn delete_user(
        &self,
        target_id: i64,
        acting_admin_id: i64,
    ) -> Result<(), DomainError> {
        if target_id == acting_admin_id {
            return Err(DomainError::validation(
                "id",
                "action denied: you can't delete your own account",
            ));
        }

        if !self.repo.delete_user(target_id).await? {
            return Err(DomainError::NotFound(format!("user id: {target_id}")));
        }
        Ok(())
    }
}

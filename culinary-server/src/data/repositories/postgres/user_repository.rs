use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::error;

use crate::data::user_repository::{NewUser, RoleCounts, UserCredentials, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{Role, User};
use crate::infrastructure::database::DbPools;

#[derive(Debug, Clone)]
pub(crate) struct PostgresUserRepository {
    pools: DbPools,
}

impl PostgresUserRepository {
    pub(crate) fn new(pools: DbPools) -> Self {
        Self { pools }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    role: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct UserCredentialsRow {
    id: i64,
    username: String,
    role: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, username, role, created_at
            "#,
        )
        .bind(&input.username)
        .bind(&input.password_hash)
        .bind(input.role.as_str())
        .fetch_one(&self.pools.write)
        .await
        .map_err(|err| map_user_db_error("users.create", err))?;

        map_row_to_user(row)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        let row = sqlx::query_as::<_, UserCredentialsRow>(
            r#"
            SELECT
            id,
            username,
            role,
            password_hash,
            created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pools.read)
        .await
        .map_err(|err| map_user_db_error("users.find_by_username", err))?;

        let Some(r) = row else {
            return Ok(None);
        };
        let user = map_row_to_user(UserRow {
            id: r.id,
            username: r.username,
            role: r.role,
            created_at: r.created_at,
        })?;

        Ok(Some(UserCredentials {
            user,
            password_hash: r.password_hash,
        }))
    }

    async fn list_users(&self, search: Option<&str>) -> Result<Vec<User>, DomainError> {
        let rows = match search {
            Some(term) => {
                sqlx::query_as::<_, UserRow>(
                    r#"
                    SELECT id, username, role, created_at
                    FROM users
                    WHERE username ILIKE $1 OR role ILIKE $1
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .bind(like_pattern(term))
                .fetch_all(&self.pools.read)
                .await
            }
            None => {
                sqlx::query_as::<_, UserRow>(
                    r#"
                    SELECT id, username, role, created_at
                    FROM users
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .fetch_all(&self.pools.read)
                .await
            }
        }
        .map_err(|err| map_user_db_error("users.list", err))?;

        rows.into_iter().map(map_row_to_user).collect()
    }

    async fn role_counts(&self) -> Result<RoleCounts, DomainError> {
        let (total, admins) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                COUNT(*) AS total,
                COALESCE(SUM(CASE WHEN role = 'admin' THEN 1 ELSE 0 END), 0) AS admins
            FROM users
            "#,
        )
        .fetch_one(&self.pools.read)
        .await
        .map_err(|err| map_user_db_error("users.role_counts", err))?;

        Ok(RoleCounts { total, admins })
    }

    async fn update_role(&self, user_id: i64, role: Role) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET role = $2
            WHERE id = $1
            RETURNING id, username, role, created_at
            "#,
        )
        .bind(user_id)
        .bind(role.as_str())
        .fetch_optional(&self.pools.write)
        .await
        .map_err(|err| map_user_db_error("users.update_role", err))?;

        row.map(map_row_to_user).transpose()
    }

    async fn delete_user(&self, user_id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pools.write)
        .await
        .map_err(|err| map_user_db_error("users.delete", err))?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_row_to_user(row: UserRow) -> Result<User, DomainError> {
    let role = Role::parse(&row.role)
        .map_err(|_| DomainError::Unexpected(format!("unknown role '{}' in storage", row.role)))?;
    User::new(row.id, row.username, role, row.created_at)
        .map_err(|err| DomainError::Unexpected(err.to_string()))
}

/// Wraps a search term for ILIKE, escaping the pattern metacharacters.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn map_user_db_error(operation: &'static str, err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23505")
        && db_err.constraint() == Some("users_username_key")
    {
        return DomainError::validation("username", "username is already taken");
    }
    error!(operation, error = %err, "user storage operation failed");
    DomainError::Unexpected(err.to_string())
}
